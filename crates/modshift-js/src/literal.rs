//! String literal values and raw text.

use modshift_core::config::Quote;
use modshift_core::span::Span;
use serde::Serialize;
use tree_sitter::Node;

use crate::parse::{node_span, JsModule};

/// A string literal located in a module.
///
/// Holds the raw source text (quotes included) so replacements can reuse the
/// original quote character, plus the decoded value used for comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringLiteral {
    /// Byte span of the literal, quotes included.
    pub span: Span,
    /// Raw source text, quotes included.
    pub raw: String,
    /// Decoded string value.
    pub value: String,
    /// Quote character of the raw text.
    pub quote: Quote,
}

impl StringLiteral {
    /// Read a `string` node. Returns `None` for any other node kind.
    pub fn from_node(module: &JsModule, node: Node<'_>) -> Option<Self> {
        if node.kind() != "string" {
            return None;
        }
        let raw = module.text(node);
        let quote = Quote::from_raw(raw)?;
        let body = raw
            .get(1..raw.len().saturating_sub(1))
            .unwrap_or_default();
        Some(StringLiteral {
            span: node_span(node),
            raw: raw.to_string(),
            value: unescape(body),
            quote,
        })
    }

    /// Raw text for `value` in this literal's quote style.
    pub fn requoted(&self, value: &str) -> String {
        self.quote.wrap(value)
    }
}

/// Decode the escape sequences of a string literal body.
///
/// Malformed escapes decode to their literal characters.
pub fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escaped) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !chars.peek().is_some_and(|c| c.is_ascii_digit()) => out.push('\0'),
            // Line continuation
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            'x' => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) if hex.len() == 2 => out.push(c),
                    _ => {
                        out.push('x');
                        out.push_str(&hex);
                    }
                }
            }
            'u' => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|c| *c != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(c) => out.push(c),
                    None => {
                        out.push('u');
                        out.push_str(&hex);
                    }
                }
            }
            other => out.push(other),
        }
    }

    out
}
