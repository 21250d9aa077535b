//! Identifier transformations for code generation

use std::collections::HashSet;

use heck::ToPascalCase;

/// Replaces characters that cannot appear in an identifier with `_`,
/// keeping the original casing.
///
/// `comes-from-header` becomes `comes_from_header`.
pub fn to_identifier(s: &str) -> String {
    let mut identifier: String = s
        .chars()
        .map(|ch| if ch.is_alphanumeric() || ch == '_' { ch } else { '_' })
        .collect();
    if identifier.is_empty() || identifier.starts_with(|ch: char| ch.is_ascii_digit()) {
        identifier.insert(0, '_');
    }
    identifier
}

/// PascalCase name for a type or member.
///
/// Names that already are identifiers keep their spelling apart from the
/// first letter (`getHTTPResponse` becomes `GetHTTPResponse`); anything
/// else is split into words first.
///
/// # Examples
/// ```
/// use swaggen::generation::naming::to_pascal_identifier;
///
/// assert_eq!(to_pascal_identifier("find_pets_by_status"), "Find_pets_by_status");
/// assert_eq!(to_pascal_identifier("find pets by status"), "FindPetsByStatus");
/// ```
pub fn to_pascal_identifier(s: &str) -> String {
    let is_identifier = s.starts_with(|ch: char| ch.is_alphabetic())
        && s.chars().all(|ch| ch.is_alphanumeric() || ch == '_');
    if is_identifier {
        let mut chars = s.chars();
        return match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        };
    }
    match s.to_pascal_case() {
        name if name.starts_with(|ch: char| ch.is_ascii_digit()) => format!("_{name}"),
        name => name,
    }
}

const CSHARP_KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

const TYPESCRIPT_RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
    "import", "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw",
    "true", "try", "typeof", "var", "void", "while", "with", "let", "static", "yield", "await",
];

/// Escapes C# keywords with a verbatim `@` prefix
pub fn csharp_identifier(s: &str) -> String {
    let identifier = to_identifier(s);
    if CSHARP_KEYWORDS.contains(&identifier.as_str()) {
        format!("@{identifier}")
    } else {
        identifier
    }
}

/// Appends `_` to TypeScript reserved words
pub fn typescript_identifier(s: &str) -> String {
    let identifier = to_identifier(s);
    if TYPESCRIPT_RESERVED.contains(&identifier.as_str()) {
        format!("{identifier}_")
    } else {
        identifier
    }
}

/// Hands out names that are unique within one scope.
///
/// The first claim of a name gets it unchanged; later claims get a numeric
/// suffix starting at 2, in claim order.
#[derive(Debug, Default)]
pub struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{name}{counter}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifiers() {
        assert_eq!(to_identifier("comes-from-header"), "comes_from_header");
        assert_eq!(to_identifier("comesFromHeader"), "comesFromHeader");
        assert_eq!(to_identifier("1st"), "_1st");
        assert_eq!(csharp_identifier("class"), "@class");
        assert_eq!(csharp_identifier("pet"), "pet");
        assert_eq!(typescript_identifier("delete"), "delete_");
    }

    #[test]
    fn test_to_pascal_identifier() {
        assert_eq!(to_pascal_identifier("getHTTPResponse"), "GetHTTPResponse");
        assert_eq!(to_pascal_identifier("pet-store"), "PetStore");
        assert_eq!(to_pascal_identifier("2fa"), "_2fa");
        assert_eq!(to_pascal_identifier("/pets/{petId}"), "PetsPetId");
        assert_eq!(to_pascal_identifier("FIND PETS"), "FindPets");
        assert_eq!(to_pascal_identifier(""), "");
    }

    #[test]
    fn test_unique_names_suffix_in_claim_order() {
        let mut names = UniqueNames::new();
        assert_eq!(names.claim("Get"), "Get");
        assert_eq!(names.claim("Get"), "Get2");
        assert_eq!(names.claim("Get2"), "Get22");
        assert_eq!(names.claim("Get"), "Get3");
    }
}
