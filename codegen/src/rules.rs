use soapgen_wsdl::{Attribute, Struct};

use super::{
    codegen::Context,
    ir::{Guard, Statement},
    types::{self, TypeRequest},
};

/// Builds the guards of one mutator.
///
/// Guards only ever precede the rest of a body, so leaving them out yields the
/// same method without validation.
pub struct Rules<'a, 'c> {
    context: &'a Context<'c>,
    model: &'a Struct,
    attribute: &'a Attribute,
}

impl<'a, 'c> Rules<'a, 'c> {
    pub fn new(context: &'a Context<'c>, model: &'a Struct, attribute: &'a Attribute) -> Self {
        Self {
            context,
            model,
            attribute,
        }
    }

    /// Guards checking `parameter`, which holds either the whole value or, for
    /// `TypeRequest::Item`, one element to add to an array.
    pub fn apply(&self, parameter: &str, request: TypeRequest) -> Vec<Statement> {
        if self.attribute.is_xml {
            return Vec::new();
        }

        let item = request == TypeRequest::Item;
        let whole_array = self.attribute.is_array && !item;
        let mut guards = Vec::new();

        if whole_array {
            guards.push(Guard::Array {
                value: parameter.to_owned(),
            });
        }

        if let Some(restriction) = self.restriction(item) {
            let restriction = self.context.options.packaged_name(restriction);

            guards.push(if whole_array {
                Guard::ValidValues {
                    value: parameter.to_owned(),
                    restriction,
                }
            } else {
                Guard::ValidValue {
                    value: parameter.to_owned(),
                    restriction,
                    nullable: !item,
                }
            });
        } else if !whole_array {
            if let Some(ty) = types::scalar_type(self.context, self.attribute) {
                guards.push(Guard::Scalar {
                    value: parameter.to_owned(),
                    ty,
                    nullable: !item,
                });
            }
        }

        guards.into_iter().map(Statement::Guard).collect()
    }

    /// The restriction values are checked against.
    ///
    /// Array wrapper structs only check single items, which `addTo`
    /// validates on their way in.
    fn restriction(&self, item: bool) -> Option<&'c Struct> {
        if self.model.is_array && !item {
            return None;
        }

        self.context.registry.restriction_for(self.attribute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ir::ScalarType, options::GeneratorOptions};
    use soapgen_wsdl::Registry;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.add(
            Struct::restriction("Color", "string")
                .with_value("A")
                .with_value("B"),
        );
        registry.add(Struct::new("Line"));
        registry
    }

    fn guards(model: &Struct, attribute: &Attribute, request: TypeRequest) -> Vec<Statement> {
        let registry = registry();
        let options = GeneratorOptions::default();
        let context = Context::new(&registry, &options);
        Rules::new(&context, model, attribute).apply("value", request)
    }

    #[test]
    fn test_restriction_rule() {
        let model = Struct::new("Item");
        let color = Attribute::new("color", "Color");

        assert_eq!(
            guards(&model, &color, TypeRequest::Whole),
            [Statement::Guard(Guard::ValidValue {
                value: "value".to_owned(),
                restriction: "Color".to_owned(),
                nullable: true,
            })]
        );
    }

    #[test]
    fn test_array_rules() {
        let model = Struct::new("Item");
        let colors = Attribute::new("colors", "Color").with_array(true);

        assert_eq!(
            guards(&model, &colors, TypeRequest::Whole),
            [
                Statement::Guard(Guard::Array {
                    value: "value".to_owned()
                }),
                Statement::Guard(Guard::ValidValues {
                    value: "value".to_owned(),
                    restriction: "Color".to_owned(),
                }),
            ]
        );

        assert_eq!(
            guards(&model, &colors, TypeRequest::Item),
            [Statement::Guard(Guard::ValidValue {
                value: "value".to_owned(),
                restriction: "Color".to_owned(),
                nullable: false,
            })]
        );
    }

    #[test]
    fn test_array_wrapper_checks_items_only() {
        let mut model = Struct::new("ArrayOfColor");
        model.is_array = true;
        let colors = Attribute::new("Color", "Color").with_array(true);

        assert_eq!(
            guards(&model, &colors, TypeRequest::Whole),
            [Statement::Guard(Guard::Array {
                value: "value".to_owned()
            })]
        );
        assert_eq!(
            guards(&model, &colors, TypeRequest::Item),
            [Statement::Guard(Guard::ValidValue {
                value: "value".to_owned(),
                restriction: "Color".to_owned(),
                nullable: false,
            })]
        );
    }

    #[test]
    fn test_scalar_and_struct_rules() {
        let model = Struct::new("Item");

        assert_eq!(
            guards(&model, &Attribute::new("count", "int"), TypeRequest::Whole),
            [Statement::Guard(Guard::Scalar {
                value: "value".to_owned(),
                ty: ScalarType::Int,
                nullable: true,
            })]
        );

        assert!(guards(&model, &Attribute::new("line", "Line"), TypeRequest::Whole).is_empty());
        assert!(guards(&model, &Attribute::new("odd", "unknown"), TypeRequest::Whole).is_empty());
        assert!(guards(
            &model,
            &Attribute::new("any", "anyType").with_xml(true),
            TypeRequest::Whole
        )
        .is_empty());
    }
}
