use indexmap::IndexMap;
use quick_xml::{
    events::{BytesStart, BytesText, Event},
    Reader,
};
use std::{
    collections::{HashMap, HashSet},
    io::BufRead,
};
use url::Url;

use super::{
    error,
    registry::Registry,
    types::{Attribute, Struct, UNKNOWN_TYPE},
};

const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Prefix used for arrays whose only element repeats.
const ARRAY_PREFIX: &str = "ArrayOf";

/// Element attributes with a meaning of their own, never stored as meta.
const MODELED_ATTRIBUTES: &[&str] = &["name", "type", "ref", "default", "use"];

fn get_attributes<B: BufRead>(
    reader: &Reader<B>,
    start: &BytesStart<'_>,
) -> Result<IndexMap<String, String>, error::Error> {
    let mut result = IndexMap::new();

    for attribute in start.attributes() {
        let attribute = attribute?;
        let key = reader.decode(attribute.key)?;
        let value = reader.decode(attribute.value.as_ref())?;
        result.insert(key.to_owned(), value.to_owned());
    }

    Ok(result)
}

fn split_namespaced_name(prefixed_name: &str) -> (Option<&str>, &str) {
    match prefixed_name.split_once(':') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, prefixed_name),
    }
}

fn required_attribute(
    attributes: &IndexMap<String, String>,
    element: &'static str,
    attribute: &'static str,
) -> Result<String, error::Error> {
    attributes
        .get(attribute)
        .cloned()
        .ok_or(error::Error::MissingAttribute { element, attribute })
}

fn is_array_occurs(max_occurs: Option<&str>) -> bool {
    match max_occurs {
        Some("unbounded") => true,
        Some(value) => value.parse::<u64>().map(|max| max > 1).unwrap_or(false),
        None => false,
    }
}

#[derive(Debug)]
enum ParseState {
    Definitions,
    Types,
    Schema,

    /// A top-level element, which names a struct of its own.
    Element {
        name: String,
    },
    ComplexType {
        model: Struct,
    },
    ComplexContent,
    SimpleContent,
    Extension,
    Group {
        choice: bool,
    },
    /// An element or attribute of the enclosing complex type.
    Field {
        attribute: Attribute,
        reference: Option<String>,
    },
    SimpleType {
        name: Option<String>,
        base: Option<String>,
        values: Vec<String>,
        documentation: Option<String>,
    },
    Restriction,
    Documentation(Option<String>),

    Other(String),
}

/// A type reference which is only known once the whole schema is read.
#[derive(Debug)]
struct PendingType {
    struct_name: String,
    attribute: String,
    reference: String,
    is_builtin: bool,
}

struct Parser {
    registry: Registry,
    namespaces: HashMap<Option<String>, String>,
    visited: HashSet<Url>,
    pending: Vec<PendingType>,
}

impl Parser {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            namespaces: HashMap::new(),
            visited: HashSet::new(),
            pending: Vec::new(),
        }
    }

    /// Local name of a type reference, and whether it names a built-in schema type.
    fn resolve_reference(&self, prefixed_name: &str) -> (String, bool) {
        let (prefix, local_name) = split_namespaced_name(prefixed_name);
        let namespace = self.namespaces.get(&prefix.map(ToOwned::to_owned));

        (
            local_name.to_owned(),
            namespace.map(|ns| ns == XSD_NAMESPACE).unwrap_or(false),
        )
    }

    fn finish(mut self) -> Registry {
        for pending in std::mem::take(&mut self.pending) {
            let resolved = self
                .registry
                .resolve_attribute_type(UNKNOWN_TYPE, &pending.reference)
                .or_else(|| {
                    (pending.is_builtin || self.registry.contains(&pending.reference))
                        .then(|| pending.reference.clone())
                });

            let attribute = self
                .registry
                .get_mut(&pending.struct_name)
                .and_then(|model| {
                    model
                        .attributes_mut()
                        .find(|attribute| attribute.name() == pending.attribute)
                });

            match (attribute, resolved) {
                (Some(attribute), Some(resolved)) => {
                    log::trace!(
                        "resolved {}.{} to {}",
                        pending.struct_name,
                        pending.attribute,
                        resolved
                    );
                    attribute.ty = resolved;
                }
                (Some(_), None) => log::warn!(
                    "unable to resolve type {} of {}.{}",
                    pending.reference,
                    pending.struct_name,
                    pending.attribute
                ),
                (None, _) => (),
            }
        }

        self.registry
    }

    fn parse_url(&mut self, url: Url) -> Result<(), error::Error> {
        if !self.visited.insert(url.clone()) {
            return Ok(());
        }

        log::debug!("parsing {}", url);

        match url.scheme() {
            "file" => {
                let reader = Reader::from_file(
                    url.to_file_path()
                        .map_err(|()| error::Error::PathConversionError(None))?,
                )
                .map_err(error::Error::FileOpenError)?;

                self.parse_xml(Some(&url), reader)
            }

            other => Err(error::Error::UnsupportedScheme(other.into())),
        }
    }

    fn parse_xml<B: BufRead>(
        &mut self,
        url: Option<&Url>,
        mut reader: Reader<B>,
    ) -> Result<(), error::Error> {
        let mut stack = Vec::new();
        let mut buffer = Vec::new();

        reader.trim_text(true);

        loop {
            match reader.read_event(&mut buffer)? {
                Event::Start(start) => self.handle_start(&mut stack, &reader, &start, url)?,
                Event::End(..) => self.handle_end(&mut stack)?,

                Event::Empty(start) => {
                    self.handle_start(&mut stack, &reader, &start, url)?;
                    self.handle_end(&mut stack)?;
                }

                Event::Text(text) => self.handle_text(&mut stack, &reader, text)?,
                Event::Eof => break,

                _ => (),
            }

            buffer.clear();
        }

        Ok(())
    }

    fn handle_start<B: BufRead>(
        &mut self,
        stack: &mut Vec<ParseState>,
        reader: &Reader<B>,
        start: &BytesStart<'_>,
        url: Option<&Url>,
    ) -> Result<(), error::Error> {
        let (_, local_name) = split_namespaced_name(reader.decode(start.name())?);
        let attributes = get_attributes(reader, start)?;

        for (key, value) in &attributes {
            match split_namespaced_name(key) {
                (Some("xmlns"), prefix) => {
                    self.namespaces.insert(Some(prefix.to_owned()), value.clone());
                }
                (None, "xmlns") => {
                    self.namespaces.insert(None, value.clone());
                }
                _ => (),
            }
        }

        let mut new_state = ParseState::Other(local_name.to_owned());

        match stack.last_mut() {
            None => match local_name {
                "definitions" => new_state = ParseState::Definitions,
                "schema" => new_state = ParseState::Schema,
                _ => log::trace!("ignoring document root {}", local_name),
            },

            Some(ParseState::Definitions) => match local_name {
                "types" => new_state = ParseState::Types,
                "import" => self.import(attributes.get("location"), url)?,
                _ => (),
            },

            Some(ParseState::Types) => match local_name {
                "schema" => new_state = ParseState::Schema,
                _ => log::trace!("found {} inside types block", local_name),
            },

            Some(ParseState::Schema) => match local_name {
                "element" => {
                    let name = required_attribute(&attributes, "element", "name")?;

                    if let Some(ty) = attributes.get("type") {
                        let (ty, _) = self.resolve_reference(ty);
                        if ty != name {
                            self.registry.add(Struct::alias(name.clone(), ty));
                        }
                    }

                    new_state = ParseState::Element { name };
                }

                "complexType" => {
                    let name = required_attribute(&attributes, "complexType", "name")?;
                    new_state = ParseState::ComplexType {
                        model: new_complex_type(name, &attributes),
                    };
                }

                "simpleType" => {
                    let name = required_attribute(&attributes, "simpleType", "name")?;
                    new_state = ParseState::SimpleType {
                        name: Some(name),
                        base: None,
                        values: Vec::new(),
                        documentation: None,
                    };
                }

                "import" | "include" => self.import(attributes.get("schemaLocation"), url)?,
                _ => log::trace!("found {} inside schema block", local_name),
            },

            Some(ParseState::Element { name }) => match local_name {
                "complexType" => {
                    new_state = ParseState::ComplexType {
                        model: new_complex_type(name.clone(), &attributes),
                    }
                }
                _ => (),
            },

            Some(ParseState::ComplexType { model }) => match local_name {
                "sequence" | "all" => new_state = ParseState::Group { choice: false },
                "choice" => new_state = ParseState::Group { choice: true },
                "complexContent" => new_state = ParseState::ComplexContent,
                "simpleContent" => new_state = ParseState::SimpleContent,
                "attribute" => new_state = self.new_attribute(&attributes)?,
                "annotation" | "documentation" => new_state = ParseState::Documentation(None),
                _ => log::trace!("found {} inside complex type {}", local_name, model.name()),
            },

            Some(ParseState::ComplexContent) => match local_name {
                "extension" | "restriction" => {
                    let base = required_attribute(&attributes, "extension", "base")?;
                    let (base, _) = self.resolve_reference(&base);

                    if let Some(model) = enclosing_complex_type(stack) {
                        model.inheritance = Some(base);
                    }

                    new_state = ParseState::Extension;
                }
                _ => (),
            },

            Some(ParseState::SimpleContent) => match local_name {
                "extension" | "restriction" => {
                    let base = required_attribute(&attributes, "extension", "base")?;
                    let (base, _) = self.resolve_reference(&base);

                    if let Some(model) = enclosing_complex_type(stack) {
                        model.add_attribute(Attribute::new("_", base))?;
                    }

                    new_state = ParseState::Extension;
                }
                _ => (),
            },

            Some(ParseState::Extension) => match local_name {
                "sequence" | "all" => new_state = ParseState::Group { choice: false },
                "choice" => new_state = ParseState::Group { choice: true },
                "attribute" => new_state = self.new_attribute(&attributes)?,
                _ => (),
            },

            Some(ParseState::Group { choice }) => match local_name {
                "element" => new_state = self.new_element(&attributes, *choice)?,
                "any" => {
                    let attribute = Attribute::new("any", "anyType")
                        .with_xml(true)
                        .with_required(!*choice && min_occurs(&attributes) > 0)
                        .with_array(is_array_occurs(
                            attributes.get("maxOccurs").map(String::as_str),
                        ));

                    new_state = ParseState::Field {
                        attribute,
                        reference: None,
                    };
                }
                "sequence" | "all" => new_state = ParseState::Group { choice: *choice },
                "choice" => new_state = ParseState::Group { choice: true },
                _ => (),
            },

            Some(ParseState::Field { attribute, .. }) => match local_name {
                "complexType" => {
                    new_state = ParseState::ComplexType {
                        model: new_complex_type(attribute.name().to_owned(), &attributes),
                    }
                }
                "simpleType" => {
                    new_state = ParseState::SimpleType {
                        name: None,
                        base: None,
                        values: Vec::new(),
                        documentation: None,
                    }
                }
                "annotation" | "documentation" => new_state = ParseState::Documentation(None),
                _ => (),
            },

            Some(ParseState::SimpleType { base, .. }) => match local_name {
                "restriction" => {
                    *base = attributes.get("base").cloned();
                    new_state = ParseState::Restriction;
                }
                "list" | "union" => *base = Some("string".to_owned()),
                "annotation" | "documentation" => new_state = ParseState::Documentation(None),
                _ => (),
            },

            Some(ParseState::Restriction) => match local_name {
                "enumeration" => {
                    let value = required_attribute(&attributes, "enumeration", "value")?;
                    if let Some(ParseState::SimpleType { values, .. }) =
                        stack.iter_mut().rev().nth(1)
                    {
                        values.push(value);
                    }
                }
                _ => (),
            },

            Some(ParseState::Documentation(_)) => match local_name {
                "documentation" => new_state = ParseState::Documentation(None),
                _ => (),
            },

            Some(ParseState::Other(parent)) => {
                log::trace!("skipping {} inside {}", local_name, parent)
            }
        }

        stack.push(new_state);
        Ok(())
    }

    fn handle_end(&mut self, stack: &mut Vec<ParseState>) -> Result<(), error::Error> {
        let finished_state = stack.pop();

        match finished_state {
            Some(ParseState::ComplexType { mut model }) => {
                if model.name().starts_with(ARRAY_PREFIX)
                    && model.attributes().len() == 1
                    && model.attributes()[0].is_array
                {
                    model.is_array = true;
                }

                match stack.last_mut() {
                    Some(ParseState::Field { attribute, .. }) => {
                        if self.registry.contains(model.name()) {
                            log::warn!(
                                "anonymous type of {} shadows a named type and is ignored",
                                model.name()
                            );
                        } else {
                            attribute.ty = model.name().to_owned();
                            self.registry.add(model);
                        }
                    }
                    _ => {
                        log::trace!("read struct {}", model.name());
                        self.registry.add(model);
                    }
                }
            }

            Some(ParseState::SimpleType {
                name,
                base,
                values,
                documentation,
            }) => match name {
                Some(name) => {
                    let base = base
                        .map(|base| self.resolve_reference(&base).0)
                        .unwrap_or_else(|| "string".to_owned());
                    let mut model = if values.is_empty() {
                        Struct::alias(name, base)
                    } else {
                        Struct::restriction(name, base)
                    };

                    for value in values {
                        model.add_value(value);
                    }

                    model.documentation = documentation;
                    self.registry.add(model);
                }
                None => {
                    if let Some(ParseState::Field { attribute, reference }) = stack.last_mut() {
                        attribute.ty = UNKNOWN_TYPE.to_owned();
                        *reference = base;
                    }
                }
            },

            Some(ParseState::Field {
                attribute,
                reference,
            }) => {
                let model = enclosing_complex_type(stack);

                if let Some(model) = model {
                    if let Some(reference) = reference {
                        let (reference, is_builtin) = self.resolve_reference(&reference);
                        self.pending.push(PendingType {
                            struct_name: model.name().to_owned(),
                            attribute: attribute.name().to_owned(),
                            reference,
                            is_builtin,
                        });
                    }

                    model.add_attribute(attribute)?;
                }
            }

            Some(ParseState::Documentation(Some(text))) => match stack.last_mut() {
                Some(ParseState::Documentation(docs)) => *docs = Some(text),
                Some(ParseState::ComplexType { model }) => model.documentation = Some(text),
                Some(ParseState::Field { attribute, .. }) => attribute.documentation = Some(text),
                Some(ParseState::SimpleType { documentation, .. }) => {
                    *documentation = Some(text)
                }
                _ => (),
            },

            _ => (),
        }

        Ok(())
    }

    fn handle_text<B: BufRead>(
        &mut self,
        stack: &mut [ParseState],
        reader: &Reader<B>,
        text: BytesText<'_>,
    ) -> Result<(), error::Error> {
        let unescaped = text.unescaped()?;
        let text = reader.decode(unescaped.as_ref())?;

        if let Some(ParseState::Documentation(docs)) = stack.last_mut() {
            *docs = Some(text.trim().to_owned());
        }

        Ok(())
    }

    fn import(&mut self, location: Option<&String>, url: Option<&Url>) -> Result<(), error::Error> {
        match (location, url) {
            (Some(location), Some(url)) => {
                let imported = url.join(location)?;
                self.parse_url(imported)?;
                log::debug!("back to {}", url);
                Ok(())
            }
            (Some(location), None) => {
                log::warn!("cannot resolve {} without a document location", location);
                Ok(())
            }
            (None, _) => Ok(()),
        }
    }

    fn new_element(
        &self,
        attributes: &IndexMap<String, String>,
        choice: bool,
    ) -> Result<ParseState, error::Error> {
        let (name, ty, reference) = match (attributes.get("name"), attributes.get("ref")) {
            (Some(name), _) => {
                let ty = attributes
                    .get("type")
                    .map(|ty| self.resolve_reference(ty).0)
                    .unwrap_or_else(|| UNKNOWN_TYPE.to_owned());
                (name.clone(), ty, None)
            }
            // the referenced element may be declared later, its type is settled in `finish`
            (None, Some(reference)) => {
                let (name, _) = self.resolve_reference(reference);
                (name, UNKNOWN_TYPE.to_owned(), Some(reference.clone()))
            }
            (None, None) => {
                return Err(error::Error::MissingAttribute {
                    element: "element",
                    attribute: "name",
                })
            }
        };

        let min_occurs = min_occurs(attributes);
        let nillable = attributes.get("nillable").map(String::as_str) == Some("true");
        let is_xml = ty == "anyType";

        let mut attribute = Attribute::new(name, ty)
            .with_required(!choice && min_occurs > 0)
            .with_removable_from_request(nillable && min_occurs == 0)
            .with_array(is_array_occurs(
                attributes.get("maxOccurs").map(String::as_str),
            ))
            .with_xml(is_xml);

        if let Some(default) = attributes.get("default") {
            attribute.default_value = Some(default.clone());
        }

        for (key, value) in attributes {
            if !MODELED_ATTRIBUTES.contains(&key.as_str()) && !key.starts_with("xmlns") {
                attribute.add_meta(key.clone(), value.clone());
            }
        }

        Ok(ParseState::Field {
            attribute,
            reference,
        })
    }

    fn new_attribute(
        &self,
        attributes: &IndexMap<String, String>,
    ) -> Result<ParseState, error::Error> {
        let name = match (attributes.get("name"), attributes.get("ref")) {
            (Some(name), _) => name.clone(),
            (None, Some(reference)) => self.resolve_reference(reference).0,
            (None, None) => {
                return Err(error::Error::MissingAttribute {
                    element: "attribute",
                    attribute: "name",
                })
            }
        };

        let ty = attributes
            .get("type")
            .map(|ty| self.resolve_reference(ty).0)
            .unwrap_or_else(|| UNKNOWN_TYPE.to_owned());

        let required = attributes.get("use").map(String::as_str) == Some("required");
        let mut attribute = Attribute::new(name, ty).with_required(required);

        if let Some(default) = attributes.get("default") {
            attribute.default_value = Some(default.clone());
        }

        for (key, value) in attributes {
            if !MODELED_ATTRIBUTES.contains(&key.as_str()) && !key.starts_with("xmlns") {
                attribute.add_meta(key.clone(), value.clone());
            }
        }

        Ok(ParseState::Field {
            attribute,
            reference: None,
        })
    }
}

fn min_occurs(attributes: &IndexMap<String, String>) -> u64 {
    attributes
        .get("minOccurs")
        .and_then(|value| value.parse().ok())
        .unwrap_or(1)
}

fn new_complex_type(name: String, attributes: &IndexMap<String, String>) -> Struct {
    let mut model = Struct::new(name);

    for (key, value) in attributes {
        match key.as_str() {
            "name" => (),
            "abstract" => model.is_abstract = value == "true" || value == "1",
            key if key.starts_with("xmlns") => (),
            _ => model.add_meta(key.to_owned(), value.clone()),
        }
    }

    model
}

fn enclosing_complex_type(stack: &mut [ParseState]) -> Option<&mut Struct> {
    stack.iter_mut().rev().find_map(|state| match state {
        ParseState::ComplexType { model } => Some(model),
        _ => None,
    })
}

pub fn parse(url: Url) -> Result<Registry, error::Error> {
    let mut parser = Parser::new();
    parser.parse_url(url)?;
    Ok(parser.finish())
}

pub fn parse_str(xml: &str) -> Result<Registry, error::Error> {
    let mut parser = Parser::new();
    parser.parse_xml(None, Reader::from_str(xml))?;
    Ok(parser.finish())
}
