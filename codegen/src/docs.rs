//! Documentation blocks of generated classes, properties and methods.
//!
//! Method documentation is derived from the method itself: its kind names the
//! attribute it serves and its body tells which guards were injected, so the
//! documented exceptions always match the code.

use soapgen_wsdl::{Attribute, Struct};

use super::{
    codegen::{Context, PARAMETER_ARRAY, PARAMETER_ITEM},
    error::Error,
    ir::{DocBlock, Expr, Guard, Method, MethodKind, Statement, Tag},
    types::{self, TypeRequest},
};

const INVALID_ARGUMENT: &str = "\\InvalidArgumentException";
const XML_PARAMETER_TYPE: &str = "\\DOMDocument";

const REMOVABLE_SETTER: &str = "This property is removable from request (nillable=true+minOccurs=0), therefore if the value assigned to this property is null, it is removed from this object";
const REMOVABLE_GETTER: &str = "An additional test has been added (isset) before returning the property value as this property may have been unset before, due to the fact that this property is removable from the request (nillable=true+minOccurs=0)";

pub const METHOD_VALUE_IS_VALID: &str = "valueIsValid";
pub const METHOD_GET_VALID_VALUES: &str = "getValidValues";

pub fn class_doc(model: &Struct) -> DocBlock {
    let mut doc = DocBlock::default();
    doc.text(format!(
        "This class stands for {} originally named {}",
        model.clean_name(),
        model.name()
    ));
    documentation(&mut doc, model.documentation.as_deref());
    meta(&mut doc, model.meta.iter());
    doc
}

pub fn enumeration_doc(model: &Struct) -> DocBlock {
    let mut doc = DocBlock::default();
    doc.text(format!("This class stands for {} EnumType", model.name()));
    documentation(&mut doc, model.documentation.as_deref());
    meta(&mut doc, model.meta.iter());
    doc
}

pub fn constant_doc(value: &str) -> DocBlock {
    let mut doc = DocBlock::default();
    doc.text(format!("Constant for value '{}'", value))
        .annotation(Tag::Return, format!("string '{}'", value));
    doc
}

pub fn class_map_doc() -> DocBlock {
    let mut doc = DocBlock::default();
    doc.text("Class which returns the class map definition");
    doc
}

pub fn property_doc(context: &Context<'_>, attribute: &Attribute) -> DocBlock {
    let mut doc = DocBlock::default();
    doc.text(format!("The {}", attribute.clean_name()));
    documentation(&mut doc, attribute.documentation.as_deref());
    meta(&mut doc, attribute.meta.iter());
    doc.annotation(Tag::Var, value_type(context, attribute));
    doc
}

/// Documentation of a method generated for `model`.
pub fn method_doc(context: &Context<'_>, model: &Struct, method: &Method) -> Result<DocBlock, Error> {
    let class = context.options.packaged_name(model);
    let mut doc = DocBlock::default();

    match &method.kind {
        MethodKind::Constructor => {
            doc.text(format!("Constructor method for {}", model.name()));
            let attributes = context.registry.attributes(model, true, true)?;

            for attribute in &attributes {
                doc.annotation(
                    Tag::Uses,
                    format!("{}::{}()", class, attribute.setter_name()),
                );
            }
            for attribute in &attributes {
                doc.annotation(
                    Tag::Param,
                    format!(
                        "{} ${}",
                        parameter_type(context, attribute),
                        attribute.parameter_name()
                    ),
                );
            }
        }
        MethodKind::Getter { attribute } => {
            let attribute = find(model, attribute)?;
            doc.text(format!("Get {} value", attribute.clean_name()));

            if attribute.removable_from_request {
                doc.text(REMOVABLE_GETTER);
            }

            if attribute.is_xml {
                doc.annotation(Tag::Uses, "\\DOMDocument::loadXML()")
                    .annotation(Tag::Uses, "\\DOMDocument::hasChildNodes()")
                    .annotation(Tag::Uses, "\\DOMDocument::saveXML()")
                    .annotation(Tag::Uses, "\\DOMNode::item()")
                    .annotation(
                        Tag::Uses,
                        format!("{}::{}()", class, attribute.setter_name()),
                    )
                    .annotation(
                        Tag::Param,
                        "bool $asString true: returns XML string, false: returns \\DOMDocument",
                    );
            }

            doc.annotation(Tag::Return, value_type(context, attribute));
        }
        MethodKind::Setter { attribute } => {
            let attribute = find(model, attribute)?;
            doc.text(format!("Set {} value", attribute.clean_name()));

            if attribute.removable_from_request {
                doc.text(REMOVABLE_SETTER);
            }

            guards(&mut doc, method);
            doc.annotation(
                Tag::Param,
                format!(
                    "{} ${}",
                    parameter_type(context, attribute),
                    attribute.parameter_name()
                ),
            )
            .annotation(Tag::Return, class);
        }
        MethodKind::AddTo { attribute } => {
            let attribute = find(model, attribute)?;
            doc.text(format!("Add item to {} value", attribute.clean_name()));

            guards(&mut doc, method);
            doc.annotation(
                Tag::Param,
                format!(
                    "{} ${}",
                    types::doc_type(context, attribute, TypeRequest::Item),
                    PARAMETER_ITEM
                ),
            )
            .annotation(Tag::Return, class);
        }
        MethodKind::SetState => {
            let extends = match context.registry.parent(model)? {
                Some(parent) if parent.is_struct => context.options.packaged_name(parent),
                _ => context.options.qualify(&context.options.base_class),
            };

            doc.text("Method called when an object has been exported with var_export() functions")
                .text("It allows to return an object instantiated with the values")
                .annotation(Tag::See, format!("{}::__set_state()", extends))
                .annotation(Tag::Uses, format!("{}::__set_state()", extends))
                .annotation(
                    Tag::Param,
                    format!("array ${} the exported values", PARAMETER_ARRAY),
                )
                .annotation(Tag::Return, class);
        }
        MethodKind::ValueIsValid => {
            doc.text("Return true if value is allowed")
                .annotation(Tag::Uses, format!("self::{}()", METHOD_GET_VALID_VALUES))
                .annotation(Tag::Param, "mixed $value value")
                .annotation(Tag::Return, "bool true|false");
        }
        MethodKind::GetValidValues => {
            doc.text("Return allowed values");
            for statement in &method.body {
                if let Statement::Return(Expr::List(items)) = statement {
                    for item in items {
                        if let Expr::ClassConstant { name, .. } = item {
                            doc.annotation(Tag::Uses, format!("self::{}", name));
                        }
                    }
                }
            }
            doc.annotation(Tag::Return, "string[]");
        }
        MethodKind::ClassMap => return Ok(class_map_method_doc()),
    }

    Ok(doc)
}

pub fn class_map_method_doc() -> DocBlock {
    let mut doc = DocBlock::default();
    doc.text("Returns the mapping between the WSDL Structs and generated Structs' classes")
        .text("This array is sent to the \\SoapClient when calling the WS")
        .annotation(Tag::Return, "string[]");
    doc
}

fn find<'a>(model: &'a Struct, attribute: &str) -> Result<&'a Attribute, Error> {
    model
        .attribute(attribute)
        .ok_or_else(|| Error::UnknownAttribute {
            struct_name: model.name().to_owned(),
            attribute: attribute.to_owned(),
        })
}

/// Uses and throws annotations for the guards at the top of `method`.
fn guards(doc: &mut DocBlock, method: &Method) {
    let mut throws = false;

    for guard in method.guards() {
        match guard {
            Guard::ValidValue { restriction, .. } | Guard::ValidValues { restriction, .. } => {
                doc.annotation(
                    Tag::Uses,
                    format!("{}::{}()", restriction, METHOD_VALUE_IS_VALID),
                )
                .annotation(
                    Tag::Uses,
                    format!("{}::{}()", restriction, METHOD_GET_VALID_VALUES),
                );
            }
            Guard::Array { .. } | Guard::Scalar { .. } => {}
        }

        throws = true;
    }

    if throws {
        doc.annotation(Tag::Throws, INVALID_ARGUMENT);
    }
}

/// Type of the value held by the attribute, as a getter returns it.
fn value_type(context: &Context<'_>, attribute: &Attribute) -> String {
    let ty = types::doc_type(context, attribute, TypeRequest::Whole);

    if attribute.removable_from_request {
        format!("{}|null", ty)
    } else {
        ty
    }
}

/// Type accepted by the setter and the constructor.
fn parameter_type(context: &Context<'_>, attribute: &Attribute) -> String {
    if attribute.is_xml && !attribute.is_array {
        XML_PARAMETER_TYPE.to_owned()
    } else {
        types::doc_type(context, attribute, TypeRequest::Whole)
    }
}

fn documentation(doc: &mut DocBlock, documentation: Option<&str>) {
    if let Some(documentation) = documentation {
        for line in documentation.lines().map(str::trim).filter(|line| !line.is_empty()) {
            doc.text(line);
        }
    }
}

fn meta<'a>(doc: &mut DocBlock, meta: impl Iterator<Item = (&'a String, &'a String)>) {
    let mut meta = meta.peekable();

    if meta.peek().is_some() {
        doc.text("Meta information extracted from the WSDL");
        for (key, value) in meta {
            doc.text(format!("- {}: {}", key, value));
        }
    }
}
