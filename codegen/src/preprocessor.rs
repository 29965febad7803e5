use soapgen_wsdl::{Registry, Struct};

use super::error::Error;

/// The structs which get a class, in registry order.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    pub structs: Vec<&'a Struct>,
    pub enumerations: Vec<&'a Struct>,
}

/// Checks the registry is consistent and picks the structs to generate.
///
/// Aliases of built-in types have no class of their own; attributes using
/// them are generated with the underlying type.
pub fn preprocess(registry: &Registry) -> Result<Selection<'_>, Error> {
    registry.check()?;

    let mut selection = Selection::default();

    for model in registry.structs() {
        if model.is_restriction {
            selection.enumerations.push(model);
        } else if model.is_struct {
            for attribute in model.attributes() {
                if attribute.type_is_unresolved() {
                    log::warn!(
                        "attribute {} of struct {} has no resolved type",
                        attribute.name(),
                        model.name()
                    );
                }
            }

            selection.structs.push(model);
        } else {
            log::trace!("struct {} is an alias and has no class", model.name());
        }
    }

    Ok(selection)
}
