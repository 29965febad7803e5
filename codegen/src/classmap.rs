use soapgen_wsdl::Struct;

use super::{
    codegen::Context,
    docs,
    ir::{ClassDefinition, Expr, Method, MethodKind, Statement},
};

pub const METHOD_GET: &str = "get";

/// The class mapping every schema type name to the class generated for it.
pub fn class_map<'a>(
    context: &Context<'_>,
    structs: impl IntoIterator<Item = &'a Struct>,
) -> ClassDefinition {
    let entries: Vec<_> = structs
        .into_iter()
        .map(|model| {
            (
                model.name().to_owned(),
                context.options.packaged_name(model),
            )
        })
        .collect();

    log::debug!("class map lists {} structs", entries.len());

    let mut get = Method::new(METHOD_GET, MethodKind::ClassMap);
    get.is_static = true;
    get.is_final = true;
    get.body.push(Statement::Return(Expr::Map(entries)));
    get.doc = docs::class_map_method_doc();

    ClassDefinition {
        name: context.options.class_map_name.clone(),
        namespace: context.options.namespace().map(ToOwned::to_owned),
        extends: None,
        is_abstract: false,
        doc: docs::class_map_doc(),
        constants: Vec::new(),
        properties: Vec::new(),
        methods: vec![get],
    }
}
