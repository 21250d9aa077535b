//! Sanitizers for text placed into generated documentation comments
//!
//! Descriptions come straight from the API document and may contain
//! characters that break the comment syntax of the target language.

use once_cell::sync::Lazy;
use regex::Regex;

static TYPOGRAPHIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Normalizes description text into comment lines.
///
/// - Replaces smart quotes and dashes with their ASCII forms
/// - Collapses whitespace inside each line
/// - Removes empty lines
pub fn doc_lines(input: &str) -> Vec<String> {
    input
        .lines()
        .map(|line| {
            let line = TYPOGRAPHIC.replace_all(line, |caps: &regex::Captures| match &caps[0] {
                "\u{2018}" | "\u{2019}" => "'",
                "\u{201C}" | "\u{201D}" => "\"",
                _ => "-",
            });
            WHITESPACE.replace_all(line.trim(), " ").to_string()
        })
        .filter(|line| !line.is_empty())
        .collect()
}

/// Escapes text for C# XML documentation comments
pub fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Keeps text from closing a JSDoc block early
pub fn escape_jsdoc(input: &str) -> String {
    input.replace("*/", "*\\/")
}

/// Escapes a value placed inside a double-quoted string literal
pub fn escape_string_literal(input: &str) -> String {
    input.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_lines() {
        assert_eq!(
            doc_lines("This is a \u{201C}smart quote\u{201D} example\u{2014}with dash"),
            vec!["This is a \"smart quote\" example-with dash"]
        );
        assert_eq!(
            doc_lines("Line one\n\n   Line   two\n   \nLine three"),
            vec!["Line one", "Line two", "Line three"]
        );
    }

    #[test]
    fn test_escapes() {
        assert_eq!(escape_xml("List<Pet> & more"), "List&lt;Pet&gt; &amp; more");
        assert_eq!(escape_jsdoc("ends */ here"), "ends *\\/ here");
        assert_eq!(escape_string_literal(r#"a "b" \c"#), r#"a \"b\" \\c"#);
    }
}
