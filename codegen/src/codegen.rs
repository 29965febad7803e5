use soapgen_wsdl::{types::Attribute, Registry, Struct};

use super::{
    docs,
    error::Error,
    ir::{
        Call, ClassDefinition, ClassRef, Expr, Literal, Method, MethodKind, Parameter, Property,
        ScalarType, Slot, Statement, Visibility,
    },
    options::GeneratorOptions,
    rules::Rules,
    types::{self, TypeRequest},
};

pub const METHOD_CONSTRUCT: &str = "__construct";
pub const METHOD_SET_STATE: &str = "__set_state";
pub const PARAMETER_AS_STRING: &str = "asString";
pub const PARAMETER_ITEM: &str = "item";
pub const PARAMETER_ARRAY: &str = "array";

/// Everything a generator may look at besides the struct it generates.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub registry: &'a Registry,
    pub options: &'a GeneratorOptions,
}

impl<'a> Context<'a> {
    pub fn new(registry: &'a Registry, options: &'a GeneratorOptions) -> Self {
        Self { registry, options }
    }
}

pub trait Codegen {
    fn codegen(&self, context: &Context<'_>) -> Result<ClassDefinition, Error>;
}

/// The class of a composite struct: properties, constructor, accessors and
/// state restoration.
pub struct StructClass<'a>(pub &'a Struct);

impl Codegen for StructClass<'_> {
    fn codegen(&self, context: &Context<'_>) -> Result<ClassDefinition, Error> {
        let model = self.0;
        let options = context.options;

        let extends = match context.registry.parent(model)? {
            Some(parent) if parent.is_struct => options.packaged_name(parent),
            _ => options.qualify(&options.base_class),
        };

        let properties = model
            .attributes()
            .iter()
            .map(|attribute| property(context, attribute))
            .collect();

        let mut methods = vec![constructor(context, model)?];

        for attribute in model.attributes() {
            methods.push(getter(attribute));
            methods.push(setter(context, model, attribute)?);

            if attribute.is_array {
                methods.push(add_to(context, model, attribute)?);
            }
        }

        methods.push(set_state());

        for method in &mut methods {
            method.doc = docs::method_doc(context, model, method)?;
        }

        log::debug!(
            "generated class {} with {} methods",
            options.packaged_name(model),
            methods.len()
        );

        Ok(ClassDefinition {
            name: options.class_name(model),
            namespace: options.namespace().map(ToOwned::to_owned),
            extends: Some(extends),
            is_abstract: model.is_abstract,
            doc: docs::class_doc(model),
            constants: Vec::new(),
            properties,
            methods,
        })
    }
}

/// Literal for a schema default value, typed after the attribute.
///
/// Struct typed attributes can only default to `null`.
pub fn default_literal(context: &Context<'_>, attribute: &Attribute) -> Literal {
    let value = match &attribute.default_value {
        Some(value) if !attribute.is_array => value,
        _ => return Literal::Null,
    };

    if types::struct_type(context, attribute).is_some() {
        return Literal::Null;
    }

    scalar_literal(types::scalar_type(context, attribute), value)
}

/// Literal for a schema value of type `ty`, a string when it does not parse as one.
pub fn scalar_literal(ty: Option<ScalarType>, value: &str) -> Literal {
    match ty {
        Some(ScalarType::Int) if value.parse::<i64>().is_ok() => Literal::Number(value.to_owned()),
        Some(ScalarType::Float) if value.parse::<f64>().is_ok() => Literal::Number(value.to_owned()),
        Some(ScalarType::Bool) => Literal::Bool(value == "true" || value == "1"),
        _ => Literal::Str(value.to_owned()),
    }
}

fn property(context: &Context<'_>, attribute: &Attribute) -> Property {
    Property {
        visibility: Visibility::Public,
        name: attribute.clean_name().to_owned(),
        default: None,
        doc: docs::property_doc(context, attribute),
    }
}

fn parameter(
    context: &Context<'_>,
    model: &Struct,
    attribute: &Attribute,
    default: Literal,
) -> Result<Parameter, Error> {
    Ok(Parameter {
        name: attribute.parameter_name(),
        ty: types::signature_type(context, model, attribute, TypeRequest::Whole)?,
        default: Some(default),
    })
}

fn constructor(context: &Context<'_>, model: &Struct) -> Result<Method, Error> {
    let mut method = Method::new(METHOD_CONSTRUCT, MethodKind::Constructor);
    let attributes = context.registry.attributes(model, true, true)?;
    let mut calls = Vec::with_capacity(attributes.len());

    for attribute in attributes {
        let parameter = parameter(context, model, attribute, default_literal(context, attribute))?;

        calls.push(Call {
            method: attribute.setter_name(),
            arguments: vec![Expr::variable(&parameter.name)],
        });
        method.parameters.push(parameter);
    }

    if !calls.is_empty() {
        method.body.push(Statement::CallChain {
            receiver: Expr::This,
            calls,
        });
    }

    Ok(method)
}

fn getter(attribute: &Attribute) -> Method {
    let mut method = Method::new(
        attribute.getter_name(),
        MethodKind::Getter {
            attribute: attribute.name().to_owned(),
        },
    );

    let slot = Slot::for_attribute(attribute);
    let field = Expr::Field(slot.clone());

    let stored = if attribute.removable_from_request {
        Expr::Conditional {
            condition: Expr::IsSet(field.clone().boxed()).boxed(),
            then: field.clone().boxed(),
            otherwise: Expr::Null.boxed(),
        }
    } else {
        field.clone()
    };

    let returned = if attribute.is_xml {
        method.parameters.push(Parameter {
            name: PARAMETER_AS_STRING.to_owned(),
            ty: None,
            default: Some(Literal::Bool(true)),
        });
        method.body.push(Statement::LazyParseXml {
            slot,
            setter: attribute.setter_name(),
        });

        let mut condition = vec![Expr::variable(PARAMETER_AS_STRING)];
        if attribute.removable_from_request {
            condition.push(Expr::IsSet(field.clone().boxed()));
        }
        condition.push(Expr::IsDocument(field.clone().boxed()));
        condition.push(Expr::HasChildNodes(field.clone().boxed()));

        Expr::Conditional {
            condition: Expr::And(condition).boxed(),
            then: Expr::FirstChildXml(field.boxed()).boxed(),
            otherwise: stored.boxed(),
        }
    } else {
        stored
    };

    method.body.push(Statement::Return(returned));
    method
}

fn setter(context: &Context<'_>, model: &Struct, attribute: &Attribute) -> Result<Method, Error> {
    let mut method = Method::new(
        attribute.setter_name(),
        MethodKind::Setter {
            attribute: attribute.name().to_owned(),
        },
    );

    let parameter = parameter(context, model, attribute, Literal::Null)?;
    let value = Expr::variable(&parameter.name);
    let slot = Slot::for_attribute(attribute);

    if context.options.validation {
        method.body.extend(
            Rules::new(context, model, attribute).apply(&parameter.name, TypeRequest::Whole),
        );
    }

    let assignment = Statement::Assign {
        slot: slot.clone(),
        value: value.clone(),
    };

    if attribute.removable_from_request {
        method.body.push(Statement::If {
            condition: Expr::Or(vec![
                Expr::IsNull(value.clone().boxed()),
                Expr::IsEmptyArray(value.boxed()),
            ]),
            then: vec![Statement::Unset { slot }],
            otherwise: vec![assignment],
        });
    } else {
        method.body.push(assignment);
    }

    method.parameters.push(parameter);
    method.body.push(Statement::Return(Expr::This));
    method.returns_self = true;
    Ok(method)
}

fn add_to(context: &Context<'_>, model: &Struct, attribute: &Attribute) -> Result<Method, Error> {
    let mut method = Method::new(
        attribute.add_to_name(),
        MethodKind::AddTo {
            attribute: attribute.name().to_owned(),
        },
    );

    method.parameters.push(Parameter {
        name: PARAMETER_ITEM.to_owned(),
        ty: types::signature_type(context, model, attribute, TypeRequest::Item)?,
        default: None,
    });

    if context.options.validation {
        method.body.extend(
            Rules::new(context, model, attribute).apply(PARAMETER_ITEM, TypeRequest::Item),
        );
    }

    method.body.push(Statement::Append {
        slot: Slot::for_attribute(attribute),
        value: Expr::variable(PARAMETER_ITEM),
    });
    method.body.push(Statement::Return(Expr::This));
    method.returns_self = true;
    Ok(method)
}

fn set_state() -> Method {
    let mut method = Method::new(METHOD_SET_STATE, MethodKind::SetState);
    method.is_static = true;
    method.parameters.push(Parameter {
        name: PARAMETER_ARRAY.to_owned(),
        ty: Some("array".to_owned()),
        default: None,
    });
    method.body.push(Statement::Return(Expr::StaticCall {
        class: ClassRef::Parent,
        method: METHOD_SET_STATE.to_owned(),
        arguments: vec![Expr::variable(PARAMETER_ARRAY)],
    }));
    method
}
