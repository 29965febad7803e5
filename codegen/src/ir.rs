//! Language level description of generated classes.
//!
//! Nothing here is text: bodies are statements over expressions, so that tests
//! can inspect them and the renderer alone decides how they are spelled.

use serde::Serialize;
use soapgen_wsdl::Attribute;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassDefinition {
    pub name: String,
    pub namespace: Option<String>,
    /// Fully qualified name of the parent class.
    pub extends: Option<String>,
    pub is_abstract: bool,
    pub doc: DocBlock,
    pub constants: Vec<Constant>,
    pub properties: Vec<Property>,
    pub methods: Vec<Method>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    pub value: Literal,
    pub doc: DocBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub visibility: Visibility,
    pub name: String,
    pub default: Option<Literal>,
    pub doc: DocBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    /// Type declaration, absent for scalars.
    pub ty: Option<String>,
    /// `None` when the parameter is mandatory.
    pub default: Option<Literal>,
}

/// What a method is for, and which attribute it serves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MethodKind {
    Constructor,
    Getter { attribute: String },
    Setter { attribute: String },
    AddTo { attribute: String },
    SetState,
    ValueIsValid,
    GetValidValues,
    ClassMap,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub name: String,
    pub kind: MethodKind,
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_final: bool,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Statement>,
    /// The method returns its receiver, allowing calls to be chained.
    pub returns_self: bool,
    pub doc: DocBlock,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    Null,
    Bool(bool),
    /// Already formatted numeric literal.
    Number(String),
    Str(String),
}

/// The backing storage of one attribute.
///
/// Values are read through the `access` key, the clean name. When the schema
/// name is not a valid identifier it is kept as a second `storage` key, and
/// every write goes to both keys so that either one can be used to reach the
/// value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Slot {
    pub access: String,
    pub storage: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ClassRef {
    /// The class being defined.
    Own,
    Parent,
    Named(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScalarType {
    String,
    Int,
    Float,
    Bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expr {
    This,
    Null,
    Literal(Literal),
    Variable(String),
    /// Reads a slot through its access key.
    Field(Slot),
    IsNull(Box<Expr>),
    IsSet(Box<Expr>),
    /// An array without any element.
    IsEmptyArray(Box<Expr>),
    IsDocument(Box<Expr>),
    HasChildNodes(Box<Expr>),
    /// Serialization of the first child node of a document.
    FirstChildXml(Box<Expr>),
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    StaticCall {
        class: ClassRef,
        method: String,
        arguments: Vec<Expr>,
    },
    ClassConstant {
        class: ClassRef,
        name: String,
    },
    InArray {
        value: Box<Expr>,
        list: Box<Expr>,
    },
    List(Vec<Expr>),
    Map(Vec<(String, String)>),
}

/// Precondition checked by a mutator before it touches any field.
///
/// Failing guards raise an invalid argument error carrying the rejected value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Guard {
    /// The value is one of the restriction's values.
    ValidValue {
        value: String,
        restriction: String,
        nullable: bool,
    },
    /// Every element of the array is one of the restriction's values.
    ValidValues { value: String, restriction: String },
    /// The value is an array, or null.
    Array { value: String },
    Scalar {
        value: String,
        ty: ScalarType,
        nullable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Call {
    pub method: String,
    pub arguments: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Guard(Guard),
    /// Writes the value to every key of the slot.
    Assign { slot: Slot, value: Expr },
    /// Removes every key of the slot from the object.
    Unset { slot: Slot },
    /// Appends the value to the array held by every key of the slot.
    Append { slot: Slot, value: Expr },
    If {
        condition: Expr,
        then: Vec<Statement>,
        otherwise: Vec<Statement>,
    },
    /// Parses a non-empty raw XML string held by the slot and hands the
    /// document to `setter`; documents are left alone.
    LazyParseXml { slot: Slot, setter: String },
    /// Calls every method in turn on `receiver`, each on the previous result.
    CallChain { receiver: Expr, calls: Vec<Call> },
    Return(Expr),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocBlock {
    pub lines: Vec<DocLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum DocLine {
    Text(String),
    Annotation { tag: Tag, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tag {
    Param,
    Return,
    See,
    Uses,
    Throws,
    Var,
}

impl Slot {
    pub fn for_attribute(attribute: &Attribute) -> Self {
        Self {
            access: attribute.clean_name().to_owned(),
            storage: if attribute.name_is_clean() {
                None
            } else {
                Some(attribute.name().to_owned())
            },
        }
    }

    /// Every key a write goes to, access key first.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = vec![self.access.as_str()];
        keys.extend(self.storage.as_deref());
        keys
    }
}

impl Expr {
    pub fn variable<S: Into<String>>(name: S) -> Self {
        Expr::Variable(name.into())
    }

    pub fn boxed(self) -> Box<Self> {
        Box::new(self)
    }
}

impl Method {
    pub fn new<S: Into<String>>(name: S, kind: MethodKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            is_static: false,
            is_final: false,
            parameters: Vec::new(),
            body: Vec::new(),
            returns_self: false,
            doc: DocBlock::default(),
        }
    }

    /// The attribute this method reads or writes, if any.
    pub fn attribute(&self) -> Option<&str> {
        match &self.kind {
            MethodKind::Getter { attribute }
            | MethodKind::Setter { attribute }
            | MethodKind::AddTo { attribute } => Some(attribute),
            _ => None,
        }
    }

    pub fn guards(&self) -> impl Iterator<Item = &Guard> {
        self.body.iter().filter_map(|statement| match statement {
            Statement::Guard(guard) => Some(guard),
            _ => None,
        })
    }
}

impl ClassDefinition {
    /// Name including the namespace, with a leading separator when namespaced.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("\\{}\\{}", namespace, self.name),
            None => self.name.clone(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn methods_of_kind<'a>(
        &'a self,
        matches: impl Fn(&MethodKind) -> bool + 'a,
    ) -> impl Iterator<Item = &'a Method> + 'a {
        self.methods
            .iter()
            .filter(move |method| matches(&method.kind))
    }
}

impl DocBlock {
    pub fn text<S: Into<String>>(&mut self, text: S) -> &mut Self {
        self.lines.push(DocLine::Text(text.into()));
        self
    }

    pub fn annotation<S: Into<String>>(&mut self, tag: Tag, value: S) -> &mut Self {
        self.lines.push(DocLine::Annotation {
            tag,
            value: value.into(),
        });
        self
    }

    pub fn annotations(&self, tag: Tag) -> impl Iterator<Item = &str> {
        self.lines.iter().filter_map(move |line| match line {
            DocLine::Annotation { tag: found, value } if *found == tag => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Param => "param",
            Tag::Return => "return",
            Tag::See => "see",
            Tag::Uses => "uses",
            Tag::Throws => "throws",
            Tag::Var => "var",
        }
    }
}

impl ScalarType {
    /// Maps a built-in schema type, `None` for types with no scalar counterpart.
    pub fn from_schema(ty: &str) -> Option<Self> {
        match ty {
            "int" | "integer" | "long" | "short" | "byte" | "nonNegativeInteger"
            | "positiveInteger" | "negativeInteger" | "nonPositiveInteger" | "unsignedLong"
            | "unsignedInt" | "unsignedShort" | "unsignedByte" => Some(ScalarType::Int),
            "decimal" | "float" | "double" => Some(ScalarType::Float),
            "boolean" => Some(ScalarType::Bool),
            "string" | "normalizedString" | "token" | "language" | "Name" | "NCName" | "ID"
            | "IDREF" | "NMTOKEN" | "anyURI" | "QName" | "date" | "dateTime" | "time"
            | "duration" | "gYear" | "gYearMonth" | "gMonth" | "gMonthDay" | "gDay"
            | "base64Binary" | "hexBinary" => Some(ScalarType::String),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Int => "int",
            ScalarType::Float => "float",
            ScalarType::Bool => "bool",
        }
    }
}
