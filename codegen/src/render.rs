//! Spells class definitions as PHP source.

use super::ir::{
    ClassDefinition, ClassRef, Constant, DocBlock, DocLine, Expr, Guard, Literal, Method,
    Parameter, Property, ScalarType, Slot, Statement, Visibility,
};

const INDENT: &str = "    ";

pub fn render(class: &ClassDefinition) -> String {
    let mut renderer = Renderer::default();
    renderer.class(class);
    renderer.output
}

/// File name the class is written to.
pub fn file_name(class: &ClassDefinition) -> String {
    format!("{}.php", class.name)
}

#[derive(Default)]
struct Renderer {
    output: String,
    depth: usize,
}

impl Renderer {
    fn line<S: AsRef<str>>(&mut self, line: S) {
        let line = line.as_ref();
        if !line.is_empty() {
            for _ in 0..self.depth {
                self.output.push_str(INDENT);
            }
            self.output.push_str(line);
        }
        self.output.push('\n');
    }

    fn indented(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn class(&mut self, class: &ClassDefinition) {
        self.line("<?php");
        self.line("");

        if let Some(namespace) = &class.namespace {
            self.line(format!("namespace {};", namespace));
            self.line("");
        }

        self.doc(&class.doc);

        let mut header = String::new();
        if class.is_abstract {
            header.push_str("abstract ");
        }
        header.push_str("class ");
        header.push_str(&class.name);
        if let Some(extends) = &class.extends {
            header.push_str(" extends ");
            header.push_str(extends);
        }
        self.line(header);
        self.line("{");

        self.indented(|renderer| {
            for constant in &class.constants {
                renderer.constant(constant);
            }
            for property in &class.properties {
                renderer.property(property);
            }
            for method in &class.methods {
                renderer.method(method);
            }
        });

        self.line("}");
    }

    fn doc(&mut self, doc: &DocBlock) {
        if doc.is_empty() {
            return;
        }

        self.line("/**");
        for line in &doc.lines {
            match line {
                DocLine::Text(text) => self.line(format!(" * {}", text)),
                DocLine::Annotation { tag, value } => {
                    self.line(format!(" * @{} {}", tag.name(), value))
                }
            }
        }
        self.line(" */");
    }

    fn constant(&mut self, constant: &Constant) {
        self.doc(&constant.doc);
        self.line(format!(
            "const {} = {};",
            constant.name,
            literal(&constant.value)
        ));
    }

    fn property(&mut self, property: &Property) {
        self.doc(&property.doc);
        match &property.default {
            Some(default) => self.line(format!(
                "{} ${} = {};",
                visibility(property.visibility),
                property.name,
                literal(default)
            )),
            None => self.line(format!(
                "{} ${};",
                visibility(property.visibility),
                property.name
            )),
        }
    }

    fn method(&mut self, method: &Method) {
        self.doc(&method.doc);

        let mut header = String::new();
        if method.is_final {
            header.push_str("final ");
        }
        header.push_str(visibility(method.visibility));
        header.push(' ');
        if method.is_static {
            header.push_str("static ");
        }
        header.push_str("function ");
        header.push_str(&method.name);
        header.push('(');
        header.push_str(
            &method
                .parameters
                .iter()
                .map(parameter)
                .collect::<Vec<_>>()
                .join(", "),
        );
        header.push(')');

        self.line(header);
        self.line("{");
        self.indented(|renderer| renderer.statements(&method.body));
        self.line("}");
    }

    fn statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Guard(guard) => self.guard(guard),
            Statement::Assign { slot, value } => {
                let mut line = String::new();
                for key in keys(slot) {
                    line.push_str(&key);
                    line.push_str(" = ");
                }
                line.push_str(&self.expr(value));
                line.push(';');
                self.line(line);
            }
            Statement::Unset { slot } => {
                self.line(format!("unset({});", keys(slot).join(", ")));
            }
            Statement::Append { slot, value } => {
                let value = self.expr(value);
                for key in keys(slot) {
                    self.line(format!("{}[] = {};", key, value));
                }
            }
            Statement::If {
                condition,
                then,
                otherwise,
            } => {
                let condition = self.expr(condition);
                self.line(format!("if {} {{", parenthesized(condition)));
                self.indented(|renderer| renderer.statements(then));
                if !otherwise.is_empty() {
                    self.line("} else {");
                    self.indented(|renderer| renderer.statements(otherwise));
                }
                self.line("}");
            }
            Statement::LazyParseXml { slot, setter } => {
                let field = field(slot);
                self.line(format!(
                    "if (!empty({0}) && !({0} instanceof \\DOMDocument)) {{",
                    field
                ));
                self.indented(|renderer| {
                    renderer.line("$dom = new \\DOMDocument('1.0', 'UTF-8');");
                    renderer.line("$dom->formatOutput = true;");
                    renderer.line(format!("if ($dom->loadXML({})) {{", field));
                    renderer.indented(|renderer| {
                        renderer.line(format!("$this->{}($dom);", setter));
                    });
                    renderer.line("}");
                    renderer.line("unset($dom);");
                });
                self.line("}");
            }
            Statement::CallChain { receiver, calls } => {
                let receiver = self.expr(receiver);
                self.line(receiver);
                self.indented(|renderer| {
                    for (index, call) in calls.iter().enumerate() {
                        let arguments = renderer.arguments(&call.arguments);
                        let end = if index + 1 == calls.len() { ";" } else { "" };
                        renderer.line(format!("->{}({}){}", call.method, arguments, end));
                    }
                });
            }
            Statement::Return(value) => {
                let value = self.expr(value);
                self.line(format!("return {};", value));
            }
        }
    }

    fn guard(&mut self, guard: &Guard) {
        match guard {
            Guard::ValidValue {
                value,
                restriction,
                nullable,
            } => {
                let check = format!("!{}::valueIsValid(${})", restriction, value);
                let condition = if *nullable {
                    format!("(!is_null(${}) && {})", value, check)
                } else {
                    format!("({})", check)
                };
                self.line(format!("if {} {{", condition));
                self.indented(|renderer| renderer.invalid_value(value, restriction));
                self.line("}");
            }
            Guard::ValidValues { value, restriction } => {
                let item = format!("{}Item", value);
                self.line(format!("foreach ((is_array(${0}) ? ${0} : array()) as ${1}) {{", value, item));
                self.indented(|renderer| {
                    renderer.line(format!("if (!{}::valueIsValid(${})) {{", restriction, item));
                    renderer.indented(|renderer| renderer.invalid_value(&item, restriction));
                    renderer.line("}");
                });
                self.line("}");
            }
            Guard::Array { value } => {
                self.line(format!("if (!is_null(${0}) && !is_array(${0})) {{", value));
                self.indented(|renderer| {
                    renderer.line(format!(
                        "throw new \\InvalidArgumentException(sprintf('Invalid value, please provide an array, \"%s\" given', gettype(${})), __LINE__);",
                        value
                    ));
                });
                self.line("}");
            }
            Guard::Scalar {
                value,
                ty,
                nullable,
            } => {
                let check = match ty {
                    ScalarType::String => format!("is_string(${})", value),
                    ScalarType::Int => format!("is_int(${})", value),
                    ScalarType::Float => format!("(is_float(${0}) || is_int(${0}))", value),
                    ScalarType::Bool => format!("is_bool(${})", value),
                };
                let condition = if *nullable {
                    format!("(!is_null(${}) && !{})", value, check)
                } else {
                    format!("(!{})", check)
                };
                self.line(format!("if {} {{", condition));
                self.indented(|renderer| {
                    renderer.line(format!(
                        "throw new \\InvalidArgumentException(sprintf('Invalid value, please provide a {}, \"%s\" given', gettype(${})), __LINE__);",
                        ty.name(),
                        value
                    ));
                });
                self.line("}");
            }
        }
    }

    fn invalid_value(&mut self, value: &str, restriction: &str) {
        self.line(format!(
            "throw new \\InvalidArgumentException(sprintf('Value \"%s\" is invalid, please use one of: %s', ${}, implode(', ', {}::getValidValues())), __LINE__);",
            value, restriction
        ));
    }

    fn arguments(&self, arguments: &[Expr]) -> String {
        arguments
            .iter()
            .map(|argument| self.expr(argument))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::This => "$this".to_owned(),
            Expr::Null => "null".to_owned(),
            Expr::Literal(value) => literal(value),
            Expr::Variable(name) => format!("${}", name),
            Expr::Field(slot) => field(slot),
            Expr::IsNull(value) => format!("is_null({})", self.expr(value)),
            Expr::IsSet(value) => format!("isset({})", self.expr(value)),
            Expr::IsEmptyArray(value) => {
                format!("(is_array({0}) && empty({0}))", self.expr(value))
            }
            Expr::IsDocument(value) => format!("({} instanceof \\DOMDocument)", self.expr(value)),
            Expr::HasChildNodes(value) => format!("{}->hasChildNodes()", self.expr(value)),
            Expr::FirstChildXml(value) => {
                format!("{0}->saveXML({0}->childNodes->item(0))", self.expr(value))
            }
            Expr::Not(value) => format!("!{}", self.expr(value)),
            Expr::And(values) => self.join(values, " && "),
            Expr::Or(values) => self.join(values, " || "),
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => format!(
                "({} ? {} : {})",
                self.expr(condition),
                self.expr(then),
                self.expr(otherwise)
            ),
            Expr::StaticCall {
                class,
                method,
                arguments,
            } => format!(
                "{}::{}({})",
                class_ref(class),
                method,
                self.arguments(arguments)
            ),
            Expr::ClassConstant { class, name } => format!("{}::{}", class_ref(class), name),
            Expr::InArray { value, list } => format!(
                "in_array({}, {}, true)",
                self.expr(value),
                self.expr(list)
            ),
            Expr::List(items) => {
                let items: Vec<_> = items.iter().map(|item| self.expr(item)).collect();
                self.array(items)
            }
            Expr::Map(entries) => {
                let entries = entries
                    .iter()
                    .map(|(key, value)| format!("{} => {}", string(key), string(value)))
                    .collect();
                self.array(entries)
            }
        }
    }

    fn join(&self, values: &[Expr], separator: &str) -> String {
        let values: Vec<_> = values.iter().map(|value| self.expr(value)).collect();
        format!("({})", values.join(separator))
    }

    /// Array literal, one item per line, closed at the current depth.
    fn array(&self, items: Vec<String>) -> String {
        if items.is_empty() {
            return "array()".to_owned();
        }

        let outer = INDENT.repeat(self.depth);
        let mut array = String::from("array(\n");
        for item in items {
            array.push_str(&outer);
            array.push_str(INDENT);
            array.push_str(&item);
            array.push_str(",\n");
        }
        array.push_str(&outer);
        array.push(')');
        array
    }
}

fn visibility(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "public",
        Visibility::Protected => "protected",
        Visibility::Private => "private",
    }
}

fn parameter(parameter: &Parameter) -> String {
    let mut rendered = String::new();
    if let Some(ty) = &parameter.ty {
        rendered.push_str(ty);
        rendered.push(' ');
    }
    rendered.push('$');
    rendered.push_str(&parameter.name);
    if let Some(default) = &parameter.default {
        rendered.push_str(" = ");
        rendered.push_str(&literal(default));
    }
    rendered
}

fn literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "null".to_owned(),
        Literal::Bool(value) => value.to_string(),
        Literal::Number(value) => value.clone(),
        Literal::Str(value) => string(value),
    }
}

fn string(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn class_ref(class: &ClassRef) -> &str {
    match class {
        ClassRef::Own => "self",
        ClassRef::Parent => "parent",
        ClassRef::Named(name) => name,
    }
}

fn field(slot: &Slot) -> String {
    format!("$this->{}", slot.access)
}

/// Every key of a slot as a property access.
fn keys(slot: &Slot) -> Vec<String> {
    let mut keys = vec![field(slot)];
    if let Some(storage) = &slot.storage {
        keys.push(format!("$this->{{{}}}", string(storage)));
    }
    keys
}

fn parenthesized(expr: String) -> String {
    if expr.starts_with('(') && expr.ends_with(')') {
        expr
    } else {
        format!("({})", expr)
    }
}
