use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to parse provided URL")]
    UrlParseError(#[from] url::ParseError),

    #[error("Unable to convert provided path")]
    PathConversionError(Option<std::io::Error>),

    #[error("Unable to open file")]
    FileOpenError(quick_xml::Error),

    #[error("Unsupported URL scheme {0}, only local files can be read")]
    UnsupportedScheme(String),

    #[error("Error parsing XML input")]
    XmlParseError(#[from] quick_xml::Error),

    #[error("Element <{element}> is missing its \"{attribute}\" attribute")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Struct \"{struct_name}\" already has an attribute named \"{attribute}\"")]
    DuplicateAttribute {
        struct_name: String,
        attribute: String,
    },

    #[error(
        "Attributes \"{attribute}\" and \"{existing}\" of struct \"{struct_name}\" both clean to \"{clean_name}\""
    )]
    NameCollision {
        struct_name: String,
        attribute: String,
        existing: String,
        clean_name: String,
    },

    #[error("Struct \"{struct_name}\" extends \"{parent}\" which is not defined")]
    UnresolvedParent { struct_name: String, parent: String },

    #[error("Struct \"{0}\" transitively extends itself")]
    InheritanceCycle(String),
}
