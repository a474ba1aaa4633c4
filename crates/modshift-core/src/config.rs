//! Options shared by the path canonicalizer, the reference locator and the
//! declaration editor.
//!
//! Every field has a default matching plain CommonJS/ESM code registered
//! through `angular.module`, so most callers use `RewriteOptions::default()`.
//! Hosts that embed modshift in their own configuration can deserialize the
//! options from JSON; missing fields fall back to their defaults.
//!
//! ```
//! use modshift_core::config::{Quote, RewriteOptions};
//!
//! let options = RewriteOptions::from_json(r#"{"source_extensions": [".js", ".mjs"]}"#).unwrap();
//! assert_eq!(options.source_extensions, vec![".js", ".mjs"]);
//! assert_eq!(options.require_name, "require");
//! assert_eq!(options.default_quote, Quote::Single);
//! ```

use serde::{Deserialize, Serialize};

/// Quote character of a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quote {
    /// `'...'`
    Single,
    /// `"..."`
    Double,
}

impl Quote {
    /// The quote character.
    pub fn as_char(&self) -> char {
        match self {
            Quote::Single => '\'',
            Quote::Double => '"',
        }
    }

    /// Quote style of a raw literal, from its first character.
    pub fn from_raw(raw: &str) -> Option<Quote> {
        match raw.chars().next()? {
            '\'' => Some(Quote::Single),
            '"' => Some(Quote::Double),
            _ => None,
        }
    }

    /// Render `value` as a literal using this quote character.
    ///
    /// Backslashes, the quote character itself and line terminators are
    /// escaped; everything else is emitted verbatim.
    pub fn wrap(&self, value: &str) -> String {
        let quote = self.as_char();
        let mut out = String::with_capacity(value.len() + 2);
        out.push(quote);
        for ch in value.chars() {
            match ch {
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\u{2028}' => out.push_str("\\u2028"),
                '\u{2029}' => out.push_str("\\u2029"),
                c if c == quote => {
                    out.push('\\');
                    out.push(c);
                }
                c => out.push(c),
            }
        }
        out.push(quote);
        out
    }
}

/// Shape of the dependency-injection module registry.
///
/// The defaults describe `angular.module(name, deps)` declarations and the
/// entity kinds that can be chained onto them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryOptions {
    /// Object holding the registry entry point (`angular`).
    pub object: String,
    /// Registry-creation method (`module`).
    pub method: String,
    /// Method names that register an entity on a declaration.
    pub entity_methods: Vec<String>,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        RegistryOptions {
            object: "angular".to_string(),
            method: "module".to_string(),
            entity_methods: [
                "animation",
                "component",
                "config",
                "constant",
                "controller",
                "decorator",
                "directive",
                "factory",
                "filter",
                "provider",
                "run",
                "service",
                "value",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl RegistryOptions {
    /// Whether `name` is a recognized entity registration method.
    pub fn is_entity_method(&self, name: &str) -> bool {
        self.entity_methods.iter().any(|m| m == name)
    }
}

/// Options for module reference rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewriteOptions {
    /// Source extensions stripped during canonicalization. At most one is
    /// stripped, the first that matches.
    pub source_extensions: Vec<String>,
    /// Basename of directory index modules (`index`).
    pub index_name: String,
    /// Name of the ambient require primitive.
    pub require_name: String,
    /// Property of the require primitive that takes a directory context.
    pub context_property: String,
    /// Quote used for new literals when the file offers nothing to copy.
    pub default_quote: Quote,
    /// Module registry recognized by the declaration editor.
    pub registry: RegistryOptions,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        RewriteOptions {
            source_extensions: vec![".js".to_string()],
            index_name: "index".to_string(),
            require_name: "require".to_string(),
            context_property: "context".to_string(),
            default_quote: Quote::Single,
            registry: RegistryOptions::default(),
        }
    }
}

impl RewriteOptions {
    /// Create options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse options from a JSON object. Missing fields use defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Replace the stripped source extensions.
    pub fn with_source_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the quote used for newly created literals.
    pub fn with_default_quote(mut self, quote: Quote) -> Self {
        self.default_quote = quote;
        self
    }

    /// Set the registry shape used by the declaration editor.
    pub fn with_registry(mut self, registry: RegistryOptions) -> Self {
        self.registry = registry;
        self
    }
}
