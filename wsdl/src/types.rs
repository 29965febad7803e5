use indexmap::IndexMap;
use serde::Serialize;

use super::{error::Error, naming};

/// Type name used by the schema reader when the declared type is not yet known.
pub const UNKNOWN_TYPE: &str = "unknown";

/// One field of a [`Struct`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    name: String,
    clean_name: String,

    pub ty: String,
    pub is_array: bool,
    pub is_xml: bool,
    pub required: bool,
    pub removable_from_request: bool,
    pub default_value: Option<String>,
    pub documentation: Option<String>,
    pub meta: IndexMap<String, String>,
}

/// A schema complex type, simple type or enumeration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Struct {
    name: String,
    clean_name: String,
    attributes: Vec<Attribute>,
    values: Vec<String>,

    pub inheritance: Option<String>,
    pub is_struct: bool,
    pub is_restriction: bool,
    pub is_array: bool,
    pub is_abstract: bool,
    pub documentation: Option<String>,
    pub meta: IndexMap<String, String>,
}

impl Attribute {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, ty: T) -> Self {
        let name = name.into();

        Self {
            clean_name: naming::clean_name(&name),
            name,
            ty: ty.into(),
            is_array: false,
            is_xml: false,
            required: false,
            removable_from_request: false,
            default_value: None,
            documentation: None,
            meta: IndexMap::new(),
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        if required {
            self.removable_from_request = false;
        }
        self
    }

    pub fn with_array(mut self, is_array: bool) -> Self {
        self.is_array = is_array;
        self
    }

    pub fn with_xml(mut self, is_xml: bool) -> Self {
        self.is_xml = is_xml;
        self
    }

    /// Marks the attribute as `nillable` and optional, which also makes it not required.
    pub fn with_removable_from_request(mut self, removable: bool) -> Self {
        self.removable_from_request = removable;
        if removable {
            self.required = false;
        }
        self
    }

    pub fn with_default_value<S: Into<String>>(mut self, value: S) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_meta<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.add_meta(key, value);
        self
    }

    pub fn add_meta<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.meta.insert(key.into(), value.into());
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clean_name(&self) -> &str {
        &self.clean_name
    }

    pub fn name_is_clean(&self) -> bool {
        self.name == self.clean_name
    }

    /// True while the schema reader has not settled on a type for this attribute.
    pub fn type_is_unresolved(&self) -> bool {
        self.ty.is_empty() || self.ty.eq_ignore_ascii_case(UNKNOWN_TYPE)
    }

    pub fn getter_name(&self) -> String {
        format!("get{}", naming::upper_first(&self.clean_name))
    }

    pub fn setter_name(&self) -> String {
        format!("set{}", naming::upper_first(&self.clean_name))
    }

    pub fn add_to_name(&self) -> String {
        format!("addTo{}", naming::upper_first(&self.clean_name))
    }

    /// Name of the parameter carrying this attribute's value in generated signatures.
    pub fn parameter_name(&self) -> String {
        naming::lower_first(&self.clean_name)
    }
}

impl Struct {
    /// A composite type, the only kind which is generated as a class with accessors.
    pub fn new<N: Into<String>>(name: N) -> Self {
        let name = name.into();

        Self {
            clean_name: naming::clean_name(&name),
            name,
            attributes: Vec::new(),
            values: Vec::new(),
            inheritance: None,
            is_struct: true,
            is_restriction: false,
            is_array: false,
            is_abstract: false,
            documentation: None,
            meta: IndexMap::new(),
        }
    }

    /// A simple type which only renames `base`.
    pub fn alias<N: Into<String>, B: Into<String>>(name: N, base: B) -> Self {
        let mut alias = Self::new(name);
        alias.is_struct = false;
        alias.inheritance = Some(base.into());
        alias
    }

    /// An enumeration over `base`, filled through [`Struct::add_value`].
    pub fn restriction<N: Into<String>, B: Into<String>>(name: N, base: B) -> Self {
        let mut restriction = Self::alias(name, base);
        restriction.is_restriction = true;
        restriction
    }

    pub fn with_inheritance<S: Into<String>>(mut self, parent: S) -> Self {
        self.inheritance = Some(parent.into());
        self
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Result<Self, Error> {
        self.add_attribute(attribute)?;
        Ok(self)
    }

    pub fn with_value<S: Into<String>>(mut self, value: S) -> Self {
        self.add_value(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn clean_name(&self) -> &str {
        &self.clean_name
    }

    /// Appends an attribute, keeping declaration order.
    ///
    /// Raw names must be unique within the struct, and clean names unique
    /// regardless of case, as generated accessors are named after the clean
    /// name and method names are case-insensitive.
    pub fn add_attribute(&mut self, attribute: Attribute) -> Result<&mut Attribute, Error> {
        for existing in &self.attributes {
            if existing.name == attribute.name {
                return Err(Error::DuplicateAttribute {
                    struct_name: self.name.clone(),
                    attribute: attribute.name,
                });
            }

            if existing.clean_name.eq_ignore_ascii_case(&attribute.clean_name) {
                return Err(Error::NameCollision {
                    struct_name: self.name.clone(),
                    attribute: attribute.name,
                    existing: existing.name.clone(),
                    clean_name: attribute.clean_name,
                });
            }
        }

        self.attributes.push(attribute);
        let index = self.attributes.len() - 1;
        Ok(&mut self.attributes[index])
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attributes_mut(&mut self) -> impl Iterator<Item = &mut Attribute> {
        self.attributes.iter_mut()
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attribute| attribute.name == name)
    }

    pub fn add_value<S: Into<String>>(&mut self, value: S) {
        let value = value.into();
        if !self.values.contains(&value) {
            self.values.push(value);
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn add_meta<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.meta.insert(key.into(), value.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_names() {
        let clean = Attribute::new("amount", "decimal");
        assert!(clean.name_is_clean());
        assert_eq!(clean.getter_name(), "getAmount");
        assert_eq!(clean.setter_name(), "setAmount");
        assert_eq!(clean.add_to_name(), "addToAmount");
        assert_eq!(clean.parameter_name(), "amount");

        let dirty = Attribute::new("Item-Code", "string");
        assert!(!dirty.name_is_clean());
        assert_eq!(dirty.clean_name(), "ItemCode");
        assert_eq!(dirty.setter_name(), "setItemCode");
        assert_eq!(dirty.parameter_name(), "itemCode");
    }

    #[test]
    fn test_required_and_removable_exclusive() {
        let attribute = Attribute::new("a", "string")
            .with_required(true)
            .with_removable_from_request(true);
        assert!(attribute.removable_from_request);
        assert!(!attribute.required);

        let attribute = Attribute::new("a", "string")
            .with_removable_from_request(true)
            .with_required(true);
        assert!(!attribute.removable_from_request);
        assert!(attribute.required);
    }

    #[test]
    fn test_unresolved_type() {
        assert!(Attribute::new("a", "").type_is_unresolved());
        assert!(Attribute::new("a", "Unknown").type_is_unresolved());
        assert!(!Attribute::new("a", "string").type_is_unresolved());
    }

    #[test]
    fn test_duplicate_attribute() {
        let result = Struct::new("Item")
            .with_attribute(Attribute::new("id", "string"))
            .and_then(|s| s.with_attribute(Attribute::new("id", "int")));

        assert!(matches!(result, Err(Error::DuplicateAttribute { .. })));
    }

    #[test]
    fn test_clean_name_collision() {
        let result = Struct::new("Item")
            .with_attribute(Attribute::new("item-id", "string"))
            .and_then(|s| s.with_attribute(Attribute::new("item.id", "string")));

        match result {
            Err(Error::NameCollision {
                struct_name,
                attribute,
                existing,
                clean_name,
            }) => {
                assert_eq!(struct_name, "Item");
                assert_eq!(attribute, "item.id");
                assert_eq!(existing, "item-id");
                assert_eq!(clean_name, "itemid");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_case_only_collision() {
        let result = Struct::new("Pair")
            .with_attribute(Attribute::new("Foo", "string"))
            .and_then(|s| s.with_attribute(Attribute::new("foo", "string")));

        match result {
            Err(Error::NameCollision {
                attribute,
                existing,
                ..
            }) => {
                assert_eq!(attribute, "foo");
                assert_eq!(existing, "Foo");
            }
            other => panic!("unexpected result {:?}", other),
        }

        assert!(Struct::new("Pair")
            .with_attribute(Attribute::new("foo", "string"))
            .and_then(|s| s.with_attribute(Attribute::new("foo_bar", "string")))
            .is_ok());
    }

    #[test]
    fn test_restriction_values() {
        let restriction = Struct::restriction("Color", "string")
            .with_value("A")
            .with_value("B")
            .with_value("A");

        assert!(restriction.is_restriction);
        assert!(!restriction.is_struct);
        assert_eq!(restriction.values(), ["A", "B"]);
        assert_eq!(restriction.inheritance.as_deref(), Some("string"));
    }
}
