//! `$ref` slots.

use super::arena::Id;

/// Which loaded document a pointer string is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeId {
    /// The document being worked on
    Root,
    /// An externally loaded document, by position in `Document::externals`
    External(usize),
}

/// A reference slot: the pointer text as written in the source plus the
/// linked node once the resolver has run.
///
/// The link is non-owning; the target is owned by the document's arena.
#[derive(Debug, Clone)]
pub struct Reference<T> {
    /// Pointer text, e.g. `#/definitions/Pet` or `common.json#/definitions/Error`.
    /// Empty when the link was created programmatically.
    pub pointer: String,
    /// Document the pointer is relative to
    pub scope: ScopeId,
    /// Linked node
    pub target: Option<Id<T>>,
}

impl<T> Reference<T> {
    /// An unresolved pointer read from `scope`
    pub fn unresolved(pointer: impl Into<String>, scope: ScopeId) -> Self {
        Self {
            pointer: pointer.into(),
            scope,
            target: None,
        }
    }

    /// A programmatic link to an existing node
    pub fn to(target: Id<T>) -> Self {
        Self {
            pointer: String::new(),
            scope: ScopeId::Root,
            target: Some(target),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    /// Splits the pointer into its document part and its fragment part.
    ///
    /// `other.json#/definitions/A` gives `("other.json", "/definitions/A")`,
    /// `#/definitions/A` gives `("", "/definitions/A")` and `other.json`
    /// gives `("other.json", "")`.
    pub fn split(&self) -> (&str, &str) {
        match self.pointer.split_once('#') {
            Some((document, fragment)) => (document, fragment),
            None => (self.pointer.as_str(), ""),
        }
    }

    /// Whether the pointer targets the document it was written in
    pub fn is_local(&self) -> bool {
        self.pointer.starts_with('#')
    }
}
