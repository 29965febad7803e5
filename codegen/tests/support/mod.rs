//! A small interpreter for generated classes, so tests can call accessors
//! and observe object state without a PHP runtime.

#![allow(dead_code)]

use std::collections::BTreeMap;

use soapgen_codegen::ir::{
    ClassDefinition, ClassRef, Expr, Guard, Literal, Method, ScalarType, Slot, Statement,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Map(Vec<(String, String)>),
    /// A parsed XML document holding its root element.
    Document(String),
    /// The receiver of the current call.
    Receiver,
}

/// An invalid argument error raised by a guard.
#[derive(Debug, Clone, PartialEq)]
pub struct Thrown(pub String);

pub type Fields = BTreeMap<String, Value>;

pub struct Object<'c> {
    pub class: &'c ClassDefinition,
    pub fields: Fields,
}

pub struct Runtime<'c> {
    classes: &'c [ClassDefinition],
}

impl Value {
    pub fn str(value: &str) -> Self {
        Value::Str(value.to_owned())
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(value) => *value,
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Str(value) => !value.is_empty() && value != "0",
            Value::Array(items) => !items.is_empty(),
            Value::Map(entries) => !entries.is_empty(),
            Value::Document(_) | Value::Receiver => true,
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "NULL",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::Str(_) => "string",
            Value::Array(_) | Value::Map(_) => "array",
            Value::Document(_) | Value::Receiver => "object",
        }
    }

    fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_owned(),
            Value::Bool(false) => String::new(),
            Value::Int(value) => value.to_string(),
            Value::Float(value) => value.to_string(),
            Value::Str(value) => value.clone(),
            _ => self.type_name().to_owned(),
        }
    }
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Null => Value::Null,
            Literal::Bool(value) => Value::Bool(*value),
            Literal::Number(value) => match value.parse::<i64>() {
                Ok(value) => Value::Int(value),
                Err(_) => Value::Float(value.parse().unwrap_or_default()),
            },
            Literal::Str(value) => Value::Str(value.clone()),
        }
    }
}

/// Parses a document the way `loadXML` accepts it: one well formed root.
fn load_xml(xml: &str) -> Option<Value> {
    let xml = xml.trim();
    if xml.starts_with('<') && xml.ends_with('>') && xml.len() > 2 {
        Some(Value::Document(xml.to_owned()))
    } else {
        None
    }
}

impl<'c> Runtime<'c> {
    pub fn new(classes: &'c [ClassDefinition]) -> Self {
        Self { classes }
    }

    pub fn class(&self, name: &str) -> &'c ClassDefinition {
        self.classes
            .iter()
            .find(|class| class.name == name || class.qualified_name() == name)
            .unwrap_or_else(|| panic!("no class {}", name))
    }

    fn parent(&self, class: &ClassDefinition) -> Option<&'c ClassDefinition> {
        let extends = class.extends.as_deref()?;
        self.classes
            .iter()
            .find(|candidate| candidate.qualified_name() == extends || candidate.name == extends)
    }

    fn find_method(
        &self,
        mut class: &'c ClassDefinition,
        name: &str,
    ) -> (&'c ClassDefinition, &'c Method) {
        loop {
            if let Some(method) = class.method(name) {
                return (class, method);
            }

            class = self
                .parent(class)
                .unwrap_or_else(|| panic!("no method {} on {}", name, class.name));
        }
    }

    /// Creates an object with every declared property set to null, then runs
    /// its constructor.
    pub fn instantiate(&self, name: &str, arguments: Vec<Value>) -> Result<Object<'c>, Thrown> {
        let class = self.class(name);
        let mut fields = Fields::new();

        let mut current = Some(class);
        while let Some(declaring) = current {
            for property in &declaring.properties {
                fields.insert(property.name.clone(), Value::Null);
            }
            current = self.parent(declaring);
        }

        let mut object = Object { class, fields };
        self.call(&mut object, "__construct", arguments)?;
        Ok(object)
    }

    pub fn call(
        &self,
        object: &mut Object<'c>,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value, Thrown> {
        let (class, method) = self.find_method(object.class, method);
        self.invoke(class, &mut object.fields, method, arguments)
    }

    pub fn call_static(
        &self,
        class: &str,
        method: &str,
        arguments: Vec<Value>,
    ) -> Result<Value, Thrown> {
        let (class, method) = self.find_method(self.class(class), method);
        self.invoke(class, &mut Fields::new(), method, arguments)
    }

    fn invoke(
        &self,
        class: &'c ClassDefinition,
        fields: &mut Fields,
        method: &Method,
        arguments: Vec<Value>,
    ) -> Result<Value, Thrown> {
        let mut arguments = arguments.into_iter();
        let mut locals = Fields::new();

        for parameter in &method.parameters {
            let value = match (arguments.next(), &parameter.default) {
                (Some(value), _) => value,
                (None, Some(default)) => Value::from(default),
                (None, None) => panic!("missing argument {} of {}", parameter.name, method.name),
            };
            locals.insert(parameter.name.clone(), value);
        }

        let mut frame = Frame {
            runtime: self,
            class,
            fields,
            locals,
        };

        Ok(frame.block(&method.body)?.unwrap_or(Value::Null))
    }
}

struct Frame<'r, 'c> {
    runtime: &'r Runtime<'c>,
    class: &'c ClassDefinition,
    fields: &'r mut Fields,
    locals: Fields,
}

impl<'r, 'c> Frame<'r, 'c> {
    fn block(&mut self, statements: &[Statement]) -> Result<Option<Value>, Thrown> {
        for statement in statements {
            if let Some(value) = self.statement(statement)? {
                return Ok(Some(value));
            }
        }

        Ok(None)
    }

    fn statement(&mut self, statement: &Statement) -> Result<Option<Value>, Thrown> {
        match statement {
            Statement::Guard(guard) => self.guard(guard)?,
            Statement::Assign { slot, value } => {
                let value = self.expr(value)?;
                for key in slot.keys() {
                    self.fields.insert(key.to_owned(), value.clone());
                }
            }
            Statement::Unset { slot } => {
                for key in slot.keys() {
                    self.fields.remove(key);
                }
            }
            Statement::Append { slot, value } => {
                let value = self.expr(value)?;
                for key in slot.keys() {
                    let entry = self.fields.entry(key.to_owned()).or_insert(Value::Null);
                    match entry {
                        Value::Array(items) => items.push(value.clone()),
                        _ => *entry = Value::Array(vec![value.clone()]),
                    }
                }
            }
            Statement::If {
                condition,
                then,
                otherwise,
            } => {
                let branch = if self.expr(condition)?.truthy() {
                    then
                } else {
                    otherwise
                };
                return self.block(branch);
            }
            Statement::LazyParseXml { slot, setter } => {
                if let Some(Value::Str(raw)) = self.read(slot) {
                    if let Some(document) = load_xml(&raw) {
                        self.call_own(setter, vec![document])?;
                    }
                }
            }
            Statement::CallChain { receiver, calls } => {
                assert_eq!(*receiver, Expr::This);
                for call in calls {
                    let arguments = call
                        .arguments
                        .iter()
                        .map(|argument| self.expr(argument))
                        .collect::<Result<Vec<_>, _>>()?;
                    let result = self.call_own(&call.method, arguments)?;
                    assert_eq!(result, Value::Receiver, "{} is not chainable", call.method);
                }
            }
            Statement::Return(value) => return Ok(Some(self.expr(value)?)),
        }

        Ok(None)
    }

    fn call_own(&mut self, method: &str, arguments: Vec<Value>) -> Result<Value, Thrown> {
        let (class, method) = self.runtime.find_method(self.class, method);
        self.runtime.invoke(class, self.fields, method, arguments)
    }

    fn read(&self, slot: &Slot) -> Option<Value> {
        self.fields.get(&slot.access).cloned()
    }

    fn guard(&mut self, guard: &Guard) -> Result<(), Thrown> {
        match guard {
            Guard::ValidValue {
                value,
                restriction,
                nullable,
            } => {
                let value = self.local(value);
                if !(*nullable && value == Value::Null) {
                    self.check_value(restriction, value)?;
                }
            }
            Guard::ValidValues { value, restriction } => {
                if let Value::Array(items) = self.local(value) {
                    for item in items {
                        self.check_value(restriction, item)?;
                    }
                }
            }
            Guard::Array { value } => match self.local(value) {
                Value::Null | Value::Array(_) => {}
                other => {
                    return Err(Thrown(format!(
                        "Invalid value, please provide an array, \"{}\" given",
                        other.type_name()
                    )))
                }
            },
            Guard::Scalar {
                value,
                ty,
                nullable,
            } => {
                let value = self.local(value);
                let valid = match (ty, &value) {
                    (_, Value::Null) => *nullable,
                    (ScalarType::String, Value::Str(_)) => true,
                    (ScalarType::Int, Value::Int(_)) => true,
                    (ScalarType::Float, Value::Float(_) | Value::Int(_)) => true,
                    (ScalarType::Bool, Value::Bool(_)) => true,
                    _ => false,
                };

                if !valid {
                    return Err(Thrown(format!(
                        "Invalid value, please provide a {}, \"{}\" given",
                        ty.name(),
                        value.type_name()
                    )));
                }
            }
        }

        Ok(())
    }

    fn check_value(&self, restriction: &str, value: Value) -> Result<(), Thrown> {
        let valid = self
            .runtime
            .call_static(restriction, "valueIsValid", vec![value.clone()])?;

        if valid.truthy() {
            return Ok(());
        }

        let values = match self.runtime.call_static(restriction, "getValidValues", Vec::new())? {
            Value::Array(values) => values,
            other => panic!("unexpected valid values {:?}", other),
        };
        let values: Vec<_> = values.iter().map(Value::display).collect();

        Err(Thrown(format!(
            "Value \"{}\" is invalid, please use one of: {}",
            value.display(),
            values.join(", ")
        )))
    }

    fn local(&self, name: &str) -> Value {
        self.locals.get(name).cloned().unwrap_or(Value::Null)
    }

    fn class_ref(&self, class: &ClassRef) -> &'c ClassDefinition {
        match class {
            ClassRef::Own => self.class,
            ClassRef::Parent => self
                .runtime
                .parent(self.class)
                .unwrap_or_else(|| panic!("{} has no known parent", self.class.name)),
            ClassRef::Named(name) => self.runtime.class(name),
        }
    }

    fn expr(&mut self, expr: &Expr) -> Result<Value, Thrown> {
        Ok(match expr {
            Expr::This => Value::Receiver,
            Expr::Null => Value::Null,
            Expr::Literal(literal) => Value::from(literal),
            Expr::Variable(name) => self.local(name),
            Expr::Field(slot) => self.read(slot).unwrap_or(Value::Null),
            Expr::IsNull(value) => Value::Bool(self.expr(value)? == Value::Null),
            Expr::IsSet(value) => {
                let set = match value.as_ref() {
                    Expr::Field(slot) => matches!(self.read(slot), Some(value) if value != Value::Null),
                    other => self.expr(other)? != Value::Null,
                };
                Value::Bool(set)
            }
            Expr::IsEmptyArray(value) => {
                Value::Bool(matches!(self.expr(value)?, Value::Array(items) if items.is_empty()))
            }
            Expr::IsDocument(value) => {
                Value::Bool(matches!(self.expr(value)?, Value::Document(_)))
            }
            Expr::HasChildNodes(value) => {
                Value::Bool(matches!(self.expr(value)?, Value::Document(root) if !root.is_empty()))
            }
            Expr::FirstChildXml(value) => match self.expr(value)? {
                Value::Document(root) => Value::Str(root),
                other => panic!("serializing {:?}", other),
            },
            Expr::Not(value) => Value::Bool(!self.expr(value)?.truthy()),
            Expr::And(values) => {
                for value in values {
                    if !self.expr(value)?.truthy() {
                        return Ok(Value::Bool(false));
                    }
                }
                Value::Bool(true)
            }
            Expr::Or(values) => {
                for value in values {
                    if self.expr(value)?.truthy() {
                        return Ok(Value::Bool(true));
                    }
                }
                Value::Bool(false)
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.expr(condition)?.truthy() {
                    self.expr(then)?
                } else {
                    self.expr(otherwise)?
                }
            }
            Expr::StaticCall {
                class,
                method,
                arguments,
            } => {
                let class = self.class_ref(class);
                let arguments = arguments
                    .iter()
                    .map(|argument| self.expr(argument))
                    .collect::<Result<Vec<_>, _>>()?;
                let (class, method) = self.runtime.find_method(class, method);
                self.runtime
                    .invoke(class, &mut Fields::new(), method, arguments)?
            }
            Expr::ClassConstant { class, name } => {
                let class = self.class_ref(class);
                let constant = class
                    .constants
                    .iter()
                    .find(|constant| constant.name == *name)
                    .unwrap_or_else(|| panic!("no constant {}", name));
                Value::from(&constant.value)
            }
            Expr::InArray { value, list } => {
                let value = self.expr(value)?;
                match self.expr(list)? {
                    Value::Array(items) => Value::Bool(items.contains(&value)),
                    other => panic!("in_array over {:?}", other),
                }
            }
            Expr::List(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.expr(item))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Map(entries) => Value::Map(entries.clone()),
        })
    }
}
