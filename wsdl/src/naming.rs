//! Identifier derivation for generated code.
//!
//! Schema names may contain characters which are not valid in identifiers of
//! the target language (`first-name`, `ns.value`, `2ndLine`). Everything here is
//! a pure function of its input so that the same schema always yields the same
//! names.

/// Words which cannot be used as a class name in the target language.
const RESERVED_WORDS: &[&str] = &[
    "__halt_compiler", "abstract", "and", "array", "as", "bool", "break", "callable", "case",
    "catch", "class", "clone", "const", "continue", "declare", "default", "die", "do", "echo",
    "else", "elseif", "empty", "enddeclare", "endfor", "endforeach", "endif", "endswitch",
    "endwhile", "eval", "exit", "extends", "false", "final", "finally", "float", "fn", "for",
    "foreach", "function", "global", "goto", "if", "implements", "include", "include_once",
    "instanceof", "insteadof", "int", "interface", "isset", "iterable", "list", "match",
    "mixed", "namespace", "new", "null", "object", "or", "print", "private", "protected",
    "public", "readonly", "require", "require_once", "return", "static", "string", "switch",
    "throw", "trait", "true", "try", "unset", "use", "var", "void", "while", "xor", "yield",
];

/// Strips every character that is not an ASCII letter, digit or underscore.
///
/// A leading digit is prefixed with `_` and an empty result becomes `_`.
pub fn clean_name(name: &str) -> String {
    let mut clean: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();

    if clean.is_empty() {
        clean.push('_');
    } else if clean.starts_with(|c: char| c.is_ascii_digit()) {
        clean.insert(0, '_');
    }

    clean
}

pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

pub fn is_reserved_word(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    RESERVED_WORDS.contains(&lower.as_str())
}

/// Class name for a schema type: clean, upper-first, and escaped when reserved.
///
/// The escape keeps the original casing, so `list` becomes `_list` and not `_List`.
pub fn class_name(name: &str) -> String {
    let clean = clean_name(name);
    if is_reserved_word(&clean) {
        format!("_{}", clean)
    } else {
        upper_first(&clean)
    }
}

pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// A `\`-separated class path (`\Ns\Sub\Class`), optionally fully qualified.
pub fn is_class_path(path: &str) -> bool {
    let path = path.strip_prefix('\\').unwrap_or(path);
    !path.is_empty() && path.split('\\').all(is_identifier)
}
