use soapgen_wsdl::Struct;

use super::{
    codegen::{self, Codegen, Context},
    docs::{self, METHOD_GET_VALID_VALUES, METHOD_VALUE_IS_VALID},
    error::Error,
    ir::{
        ClassDefinition, ClassRef, Constant, Expr, Method, MethodKind, Parameter, ScalarType,
        Statement,
    },
};

pub const PARAMETER_VALUE: &str = "value";

/// Name of the constant holding one valid value of a restriction.
pub fn constant_name(value: &str) -> String {
    let mut name = String::from("VALUE_");

    for c in value.chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_uppercase());
        } else {
            name.push('_');
        }
    }

    name
}

/// The class of a restriction: one constant per valid value and the two
/// predicates validation guards call.
pub struct EnumerationClass<'a>(pub &'a Struct);

impl Codegen for EnumerationClass<'_> {
    fn codegen(&self, context: &Context<'_>) -> Result<ClassDefinition, Error> {
        let model = self.0;
        if !model.is_restriction {
            return Err(Error::NotGenerated(model.name().to_owned()));
        }

        // constants hold values of the restricted type so strict comparison accepts them
        let scalar = ScalarType::from_schema(context.registry.base_type(model.name()));

        let mut constants: Vec<Constant> = Vec::with_capacity(model.values().len());
        for value in model.values() {
            let mut name = constant_name(value);

            // distinct values may still map to the same identifier
            let base = name.clone();
            let mut index = 1;
            while constants.iter().any(|constant| constant.name == name) {
                name = format!("{}_{}", base, index);
                index += 1;
            }

            constants.push(Constant {
                name,
                value: codegen::scalar_literal(scalar, value),
                doc: docs::constant_doc(value),
            });
        }

        let mut value_is_valid = Method::new(METHOD_VALUE_IS_VALID, MethodKind::ValueIsValid);
        value_is_valid.is_static = true;
        value_is_valid.parameters.push(Parameter {
            name: PARAMETER_VALUE.to_owned(),
            ty: None,
            default: None,
        });
        value_is_valid.body.push(Statement::Return(Expr::InArray {
            value: Expr::variable(PARAMETER_VALUE).boxed(),
            list: Expr::StaticCall {
                class: ClassRef::Own,
                method: METHOD_GET_VALID_VALUES.to_owned(),
                arguments: Vec::new(),
            }
            .boxed(),
        }));

        let mut get_valid_values =
            Method::new(METHOD_GET_VALID_VALUES, MethodKind::GetValidValues);
        get_valid_values.is_static = true;
        get_valid_values.body.push(Statement::Return(Expr::List(
            constants
                .iter()
                .map(|constant| Expr::ClassConstant {
                    class: ClassRef::Own,
                    name: constant.name.clone(),
                })
                .collect(),
        )));

        let mut methods = vec![value_is_valid, get_valid_values];
        for method in &mut methods {
            method.doc = docs::method_doc(context, model, method)?;
        }

        log::debug!(
            "generated enumeration {} with {} values",
            context.options.packaged_name(model),
            constants.len()
        );

        Ok(ClassDefinition {
            name: context.options.class_name(model),
            namespace: context.options.namespace().map(ToOwned::to_owned),
            extends: None,
            is_abstract: false,
            doc: docs::enumeration_doc(model),
            constants,
            properties: Vec::new(),
            methods,
        })
    }
}
