use soapgen_wsdl::{self as wsdl, Registry};

mod preprocessor;

pub mod classmap;
pub mod codegen;
pub mod docs;
pub mod enumeration;
pub mod error;
pub mod ir;
pub mod options;
pub mod render;
pub mod rules;
pub mod types;

pub use codegen::{Codegen, Context, StructClass};
pub use enumeration::EnumerationClass;
pub use error::Error;
pub use ir::ClassDefinition;
pub use options::GeneratorOptions;

pub fn from_url<S: AsRef<str>>(
    url: S,
    options: &GeneratorOptions,
) -> Result<Vec<ClassDefinition>, Error> {
    let registry = wsdl::parse(url)?;
    from_registry(&registry, options)
}

/// Every class of a binding: structs, enumerations and the class map.
pub fn from_registry(
    registry: &Registry,
    options: &GeneratorOptions,
) -> Result<Vec<ClassDefinition>, Error> {
    let selection = preprocessor::preprocess(registry)?;
    let context = Context::new(registry, options);
    let mut classes = Vec::with_capacity(selection.structs.len() + selection.enumerations.len() + 1);

    for model in selection.structs.iter().copied() {
        classes.push(StructClass(model).codegen(&context)?);
    }

    for model in selection.enumerations.iter().copied() {
        classes.push(EnumerationClass(model).codegen(&context)?);
    }

    classes.push(classmap::class_map(&context, selection.structs));

    log::info!("generated {} classes", classes.len());
    Ok(classes)
}

/// One class per composite struct, in registry order.
///
/// Stops at the first struct which cannot be generated.
pub fn generate_all(
    registry: &Registry,
    options: &GeneratorOptions,
) -> Result<Vec<ClassDefinition>, Error> {
    let selection = preprocessor::preprocess(registry)?;
    let context = Context::new(registry, options);

    selection
        .structs
        .into_iter()
        .map(|model| StructClass(model).codegen(&context))
        .collect()
}
