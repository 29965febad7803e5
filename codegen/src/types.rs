//! Projections of an attribute's schema type onto generated signatures and documentation.
//!
//! Both projections are computed from the same lookup, so a documented type
//! always describes the value a signature accepts.

use soapgen_wsdl::{naming, Attribute, Struct};

use super::{codegen::Context, error::Error, ir::ScalarType};

/// Whether a type describes an attribute's whole value or one element of an array attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRequest {
    Whole,
    Item,
}

const ARRAY_TYPE: &str = "array";
const XML_TYPE: &str = "\\DOMDocument|string";

/// The composite struct an attribute holds, if it holds one.
pub fn struct_type<'a>(context: &Context<'a>, attribute: &Attribute) -> Option<&'a Struct> {
    context
        .registry
        .get(&attribute.ty)
        .filter(|model| model.is_struct && !model.is_restriction)
}

/// The scalar type behind an attribute, following aliases and restrictions.
pub fn scalar_type(context: &Context<'_>, attribute: &Attribute) -> Option<ScalarType> {
    if attribute.is_xml || struct_type(context, attribute).is_some() {
        return None;
    }

    ScalarType::from_schema(context.registry.base_type(&attribute.ty))
}

/// Type declaration used in a parameter list, `None` when the value cannot be declared.
pub fn signature_type(
    context: &Context<'_>,
    model: &Struct,
    attribute: &Attribute,
    request: TypeRequest,
) -> Result<Option<String>, Error> {
    let ty = if attribute.is_array && request == TypeRequest::Whole {
        Some(ARRAY_TYPE.to_owned())
    } else if attribute.is_xml {
        None
    } else {
        struct_type(context, attribute).map(|target| context.options.packaged_name(target))
    };

    match ty {
        Some(ty) if ty != ARRAY_TYPE && !naming::is_class_path(&ty) => Err(Error::Parameter {
            struct_name: model.name().to_owned(),
            ty,
            attribute: attribute.name().to_owned(),
        }),
        ty => Ok(ty),
    }
}

/// Type written in documentation blocks.
pub fn doc_type(context: &Context<'_>, attribute: &Attribute, request: TypeRequest) -> String {
    let element = if attribute.is_xml {
        XML_TYPE.to_owned()
    } else if let Some(target) = struct_type(context, attribute) {
        context.options.packaged_name(target)
    } else {
        scalar_type(context, attribute)
            .unwrap_or(ScalarType::String)
            .name()
            .to_owned()
    };

    match request {
        TypeRequest::Whole if attribute.is_array && element.contains('|') => {
            ARRAY_TYPE.to_owned()
        }
        TypeRequest::Whole if attribute.is_array => format!("{}[]", element),
        _ => element,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::GeneratorOptions;
    use soapgen_wsdl::Registry;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.add(Struct::new("Line"));
        registry.add(Struct::restriction("Color", "string").with_value("A"));
        registry.add(Struct::alias("Quantity", "unsignedInt"));
        registry
    }

    #[test]
    fn test_projections_agree() {
        let registry = registry();
        let options = GeneratorOptions {
            namespace: Some("Shop".to_owned()),
            ..Default::default()
        };
        let context = Context::new(&registry, &options);
        let owner = Struct::new("Order");

        let lines = Attribute::new("lines", "Line").with_array(true);
        assert_eq!(
            signature_type(&context, &owner, &lines, TypeRequest::Whole).unwrap(),
            Some("array".to_owned())
        );
        assert_eq!(doc_type(&context, &lines, TypeRequest::Whole), "\\Shop\\Line[]");
        assert_eq!(
            signature_type(&context, &owner, &lines, TypeRequest::Item).unwrap(),
            Some("\\Shop\\Line".to_owned())
        );
        assert_eq!(doc_type(&context, &lines, TypeRequest::Item), "\\Shop\\Line");

        let color = Attribute::new("color", "Color");
        assert_eq!(
            signature_type(&context, &owner, &color, TypeRequest::Whole).unwrap(),
            None
        );
        assert_eq!(doc_type(&context, &color, TypeRequest::Whole), "string");

        let quantity = Attribute::new("quantity", "Quantity");
        assert_eq!(doc_type(&context, &quantity, TypeRequest::Whole), "int");
        assert_eq!(scalar_type(&context, &quantity), Some(ScalarType::Int));

        let any = Attribute::new("any", "anyType").with_xml(true);
        assert_eq!(signature_type(&context, &owner, &any, TypeRequest::Whole).unwrap(), None);
        assert_eq!(doc_type(&context, &any, TypeRequest::Whole), "\\DOMDocument|string");
        assert_eq!(
            doc_type(&context, &any.clone().with_array(true), TypeRequest::Whole),
            "array"
        );
    }

    #[test]
    fn test_invalid_class_path() {
        let registry = registry();
        let options = GeneratorOptions {
            namespace: Some("My-Shop".to_owned()),
            ..Default::default()
        };
        let context = Context::new(&registry, &options);
        let owner = Struct::new("Order");

        let line = Attribute::new("line", "Line");
        match signature_type(&context, &owner, &line, TypeRequest::Whole) {
            Err(Error::Parameter {
                struct_name,
                ty,
                attribute,
            }) => {
                assert_eq!(struct_name, "Order");
                assert_eq!(ty, "\\My-Shop\\Line");
                assert_eq!(attribute, "line");
            }
            other => panic!("unexpected result {:?}", other),
        }

        // scalars carry no declaration and cannot fail
        let note = Attribute::new("note", "string");
        assert!(signature_type(&context, &owner, &note, TypeRequest::Whole).is_ok());
    }
}
