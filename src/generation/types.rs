//! Core types for the generation domain

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::Error;

/// Supported target languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    CSharp,
    TypeScript,
}

impl Language {
    /// Get the display name for this language
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::CSharp => "C#",
            Language::TypeScript => "TypeScript",
        }
    }

    /// Get the file extension for this language
    pub fn file_extension(&self) -> &'static str {
        match self {
            Language::CSharp => "cs",
            Language::TypeScript => "ts",
        }
    }

    /// Class name template used when the settings do not give one.
    /// C# defaults to server controllers, TypeScript always emits clients.
    pub fn default_class_name(&self) -> &'static str {
        match self {
            Language::CSharp => "{controller}Controller",
            Language::TypeScript => "{controller}Client",
        }
    }

    /// Get all supported languages
    pub fn all() -> Vec<Language> {
        vec![Language::CSharp, Language::TypeScript]
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::CSharp => write!(f, "csharp"),
            Language::TypeScript => write!(f, "typescript"),
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csharp" | "c#" | "cs" => Ok(Language::CSharp),
            "typescript" | "ts" => Ok(Language::TypeScript),
            _ => Err(Error::config(format!("Unsupported language: {s}"))),
        }
    }
}

/// One generated source file. Writing it anywhere is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedFile {
    /// Suggested file name, e.g. `PetstoreControllers.cs`
    pub name: String,
    pub language: Language,
    pub content: String,
}
