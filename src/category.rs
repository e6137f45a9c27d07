//! Content categories
//!
//! Each corpus section is a content flavor with its own sandbox template and entry
//! file convention. The set is fixed at compile time.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sandbox template declared on the generated component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Template {
    Vanilla,
    VanillaTs,
    React,
}

impl Template {
    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Vanilla => "vanilla",
            Template::VanillaTs => "vanilla-ts",
            Template::React => "react",
        }
    }

    /// Entry filename inside the generated sandbox
    pub fn entry_file(&self) -> &'static str {
        match self {
            Template::React => "/App.tsx",
            Template::Vanilla | Template::VanillaTs => "/index.html",
        }
    }

    /// Prompt description of what the entry file should contain
    pub fn entry_description(&self) -> &'static str {
        match self {
            Template::React => "a single App.tsx file with a React component",
            Template::Vanilla | Template::VanillaTs => {
                "a single HTML file with inline styles and script"
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Corpus section selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentCategory {
    Javascript,
    Typescript,
    Css,
    Html,
    Php,
    React,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 6] = [
        ContentCategory::Javascript,
        ContentCategory::Typescript,
        ContentCategory::Css,
        ContentCategory::Html,
        ContentCategory::Php,
        ContentCategory::React,
    ];

    /// Section name, also the content directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::Javascript => "javascript",
            ContentCategory::Typescript => "typescript",
            ContentCategory::Css => "css",
            ContentCategory::Html => "html",
            ContentCategory::Php => "php",
            ContentCategory::React => "react",
        }
    }

    pub fn template(&self) -> Template {
        match self {
            ContentCategory::Typescript => Template::VanillaTs,
            ContentCategory::React => Template::React,
            ContentCategory::Javascript
            | ContentCategory::Css
            | ContentCategory::Html
            | ContentCategory::Php => Template::Vanilla,
        }
    }

    pub fn entry_file(&self) -> &'static str {
        self.template().entry_file()
    }

    fn available() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ApiError::UnknownCategory {
                name: s.to_string(),
                available: Self::available(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_mapping() {
        assert_eq!(ContentCategory::Javascript.template(), Template::Vanilla);
        assert_eq!(ContentCategory::Css.template(), Template::Vanilla);
        assert_eq!(ContentCategory::Html.template(), Template::Vanilla);
        assert_eq!(ContentCategory::Php.template(), Template::Vanilla);
        assert_eq!(ContentCategory::Typescript.template(), Template::VanillaTs);
        assert_eq!(ContentCategory::React.template(), Template::React);
    }

    #[test]
    fn test_entry_files() {
        assert_eq!(ContentCategory::React.entry_file(), "/App.tsx");
        assert_eq!(ContentCategory::Typescript.entry_file(), "/index.html");
        assert_eq!(ContentCategory::Html.entry_file(), "/index.html");
    }

    #[test]
    fn test_from_str_round_trips_every_category() {
        for category in ContentCategory::ALL {
            let parsed: ContentCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_unknown_category_lists_available() {
        let err = "rust".parse::<ContentCategory>().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("rust"));
        assert!(message.contains("javascript, typescript, css, html, php, react"));
    }

    #[test]
    fn test_template_serialization() {
        let serialized = serde_json::to_string(&Template::VanillaTs).unwrap();
        assert_eq!(serialized, "\"vanilla-ts\"");
    }
}
