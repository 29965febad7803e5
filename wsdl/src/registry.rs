use indexmap::IndexMap;

use super::{
    error::Error,
    types::{Attribute, Struct},
};

/// Every struct read from a schema, by schema name, in the order they were defined.
///
/// Filled once by the schema reader and only read afterwards. Structs refer to
/// each other by name through the registry so that forward references and
/// recursive types need no special handling.
#[derive(Default, Debug, Clone)]
pub struct Registry {
    structs: IndexMap<String, Struct>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a struct, replacing any previous struct with the same name.
    pub fn add(&mut self, model: Struct) -> &mut Struct {
        let entry = self.structs.entry(model.name().to_owned());
        match entry {
            indexmap::map::Entry::Occupied(mut occupied) => {
                log::warn!("struct {} is defined more than once", model.name());
                occupied.insert(model);
                occupied.into_mut()
            }
            indexmap::map::Entry::Vacant(vacant) => vacant.insert(model),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Struct> {
        self.structs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Struct> {
        self.structs.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    pub fn structs(&self) -> impl Iterator<Item = &Struct> {
        self.structs.values()
    }

    pub fn len(&self) -> usize {
        self.structs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }

    /// The struct `model` extends, if it extends a registered struct.
    ///
    /// Composite structs must extend a registered struct. Simple types and
    /// restrictions usually derive from a built-in schema type, which is not
    /// registered, so a missing parent is not an error for them.
    pub fn parent(&self, model: &Struct) -> Result<Option<&Struct>, Error> {
        match &model.inheritance {
            None => Ok(None),
            Some(parent) => match self.get(parent) {
                Some(parent) => Ok(Some(parent)),
                None if model.is_struct => Err(Error::UnresolvedParent {
                    struct_name: model.name().to_owned(),
                    parent: parent.clone(),
                }),
                None => Ok(None),
            },
        }
    }

    /// Every struct `model` inherits from, root first.
    pub fn ancestors(&self, model: &Struct) -> Result<Vec<&Struct>, Error> {
        let mut ancestors = Vec::new();
        let mut current = model;

        while let Some(parent) = self.parent(current)? {
            if parent.name() == model.name()
                || ancestors
                    .iter()
                    .any(|ancestor: &&Struct| ancestor.name() == parent.name())
            {
                return Err(Error::InheritanceCycle(model.name().to_owned()));
            }

            ancestors.push(parent);
            current = parent;
        }

        ancestors.reverse();
        Ok(ancestors)
    }

    /// The attributes of `model`, optionally preceded by the inherited ones.
    ///
    /// With `required_first` the list is stably partitioned so that required
    /// attributes come first, each partition keeping inherited attributes
    /// before the struct's own ones and declaration order otherwise.
    pub fn attributes<'a>(
        &'a self,
        model: &'a Struct,
        include_inherited: bool,
        required_first: bool,
    ) -> Result<Vec<&'a Attribute>, Error> {
        let mut attributes = Vec::new();

        if include_inherited {
            for ancestor in self.ancestors(model)? {
                attributes.extend(ancestor.attributes());
            }
        }

        attributes.extend(model.attributes());

        // a redeclared attribute replaces the inherited one
        let mut index = 0;
        while index < attributes.len() {
            let shadowed = attributes[index + 1..]
                .iter()
                .any(|later| {
                    later
                        .clean_name()
                        .eq_ignore_ascii_case(attributes[index].clean_name())
                });

            if shadowed {
                attributes.remove(index);
            } else {
                index += 1;
            }
        }

        if required_first {
            let (required, optional): (Vec<_>, Vec<_>) = attributes
                .into_iter()
                .partition(|attribute| attribute.required);
            attributes = required;
            attributes.extend(optional);
        }

        Ok(attributes)
    }

    /// The concrete type an attribute referencing `reference` should take.
    ///
    /// Only applies while `declared` is still unresolved: a restriction stands
    /// for itself, while a simple type which merely derives from another type
    /// is replaced by its parent.
    pub fn resolve_attribute_type(&self, declared: &str, reference: &str) -> Option<String> {
        if !(declared.is_empty() || declared.eq_ignore_ascii_case(super::types::UNKNOWN_TYPE)) {
            return None;
        }

        let model = self.get(reference)?;

        if model.is_restriction {
            Some(model.name().to_owned())
        } else if !model.is_struct {
            model.inheritance.clone()
        } else {
            None
        }
    }

    /// The restriction struct an attribute's type stands for, if any.
    ///
    /// Aliases are followed, so an attribute typed with a simple type deriving
    /// from an enumeration is still validated against it.
    pub fn restriction_for(&self, attribute: &Attribute) -> Option<&Struct> {
        let mut current = self.get(&attribute.ty)?;
        let mut hops = 0;

        loop {
            if current.is_restriction {
                return Some(current);
            }

            if current.is_struct || hops > self.structs.len() {
                return None;
            }

            current = self.get(current.inheritance.as_deref()?)?;
            hops += 1;
        }
    }

    /// The built-in type a chain of aliases and restrictions ends in.
    pub fn base_type<'a>(&'a self, ty: &'a str) -> &'a str {
        let mut current = ty;

        for _ in 0..=self.structs.len() {
            match self.get(current) {
                Some(model) if !model.is_struct => match &model.inheritance {
                    Some(parent) => current = parent.as_str(),
                    None => return current,
                },
                _ => return current,
            }
        }

        current
    }

    /// Checks that every composite struct's inheritance chain resolves.
    pub fn check(&self) -> Result<(), Error> {
        for model in self.structs.values().filter(|model| model.is_struct) {
            self.ancestors(model)?;
        }

        Ok(())
    }
}
