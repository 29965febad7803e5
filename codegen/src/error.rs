use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error reading the schema")]
    Schema(#[from] soapgen_wsdl::error::Error),

    #[error(
        "Unable to create function parameter for struct \"{struct_name}\" with type {ty:?} for attribute \"{attribute}\""
    )]
    Parameter {
        struct_name: String,
        ty: String,
        attribute: String,
    },

    #[error("Struct \"{struct_name}\" has no attribute \"{attribute}\"")]
    UnknownAttribute {
        struct_name: String,
        attribute: String,
    },

    #[error("Struct \"{0}\" is neither a composite type nor a restriction and has no class")]
    NotGenerated(String),
}
