use std::path::Path;
use url::Url;

mod parser;

pub mod error;
pub mod naming;
pub mod registry;
pub mod types;

pub use registry::Registry;
pub use types::{Attribute, Struct};

/// Reads a WSDL or XSD document, and every schema it includes, from a path or `file://` URL.
pub fn parse<S: AsRef<str>>(url: S) -> Result<Registry, error::Error> {
    let url = {
        match Url::parse(url.as_ref()) {
            Ok(url) => url,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::from_file_path(
                Path::new(url.as_ref())
                    .canonicalize()
                    .map_err(|err| error::Error::PathConversionError(Some(err)))?,
            )
            .map_err(|()| error::Error::PathConversionError(None))?,
            Err(err) => return Err(err.into()),
        }
    };

    parser::parse(url)
}

/// Reads a single in-memory document; relative imports are skipped.
pub fn parse_str(xml: &str) -> Result<Registry, error::Error> {
    parser::parse_str(xml)
}
