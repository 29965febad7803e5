use serde::Deserialize;
use soapgen_wsdl::{naming, Struct};

pub const DEFAULT_BASE_CLASS: &str = "AbstractStructBase";
pub const DEFAULT_CLASS_MAP_NAME: &str = "ClassMap";

/// Settings shared by every generator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct GeneratorOptions {
    /// Inject guards into mutators.
    pub validation: bool,
    pub prefix: String,
    pub suffix: String,
    /// Namespace of every generated class, `\` separated.
    pub namespace: Option<String>,
    /// Class extended by structs which do not extend another struct.
    pub base_class: String,
    pub class_map_name: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            validation: true,
            prefix: String::new(),
            suffix: String::new(),
            namespace: None,
            base_class: DEFAULT_BASE_CLASS.to_owned(),
            class_map_name: DEFAULT_CLASS_MAP_NAME.to_owned(),
        }
    }
}

impl GeneratorOptions {
    /// Unqualified class name generated for `model`.
    pub fn class_name(&self, model: &Struct) -> String {
        if self.prefix.is_empty() && self.suffix.is_empty() {
            naming::class_name(model.name())
        } else {
            naming::class_name(&format!(
                "{}{}{}",
                self.prefix,
                naming::upper_first(model.clean_name()),
                self.suffix
            ))
        }
    }

    /// Class name of `model` qualified with the namespace, if any.
    pub fn packaged_name(&self, model: &Struct) -> String {
        self.qualify(&self.class_name(model))
    }

    pub fn qualify(&self, class_name: &str) -> String {
        match self.namespace() {
            Some(namespace) => format!("\\{}\\{}", namespace, class_name),
            None => class_name.to_owned(),
        }
    }

    /// The configured namespace without surrounding separators, if not empty.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace
            .as_deref()
            .map(|namespace| namespace.trim_matches('\\'))
            .filter(|namespace| !namespace.is_empty())
    }
}
