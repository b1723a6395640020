//! Template compiler: placeholder extraction and rendering
//!
//! Templates contain named placeholders written as single-bracketed tokens,
//! for example `Summarize {text} in {language}`. A doubled delimiter (`{{` or
//! `}}`) stands for a literal brace character.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use promptdeck::template::{extract_variables, render};
//!
//! let text = "Translate {text} into {language}. Keep {text} short.";
//! assert_eq!(extract_variables(text).unwrap(), vec!["text", "language"]);
//!
//! let values = HashMap::from([
//!     ("text".to_string(), "hello".to_string()),
//!     ("language".to_string(), "French".to_string()),
//! ]);
//! assert_eq!(
//!     render(text, &values).unwrap(),
//!     "Translate hello into French. Keep hello short."
//! );
//! ```

use crate::error::{PromptdeckError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static VARIABLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("Invalid variable regex"));

/// Delimiter characters that mark a placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderSyntax {
    /// Opening delimiter
    pub open: char,
    /// Closing delimiter
    pub close: char,
}

impl Default for PlaceholderSyntax {
    fn default() -> Self {
        Self {
            open: '{',
            close: '}',
        }
    }
}

impl PlaceholderSyntax {
    /// Create a syntax with custom delimiters
    ///
    /// # Errors
    ///
    /// Returns `Config` if the delimiters are identical or alphanumeric.
    pub fn new(open: char, close: char) -> Result<Self> {
        if open == close {
            return Err(PromptdeckError::Config(format!(
                "placeholder delimiters must differ, got '{}' twice",
                open
            )));
        }
        if open.is_alphanumeric() || close.is_alphanumeric() || open == '_' || close == '_' {
            return Err(PromptdeckError::Config(format!(
                "placeholder delimiters must be punctuation, got '{}' and '{}'",
                open, close
            )));
        }
        Ok(Self { open, close })
    }
}

/// One lexical piece of a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// Compiles template text using a fixed placeholder syntax
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateCompiler {
    syntax: PlaceholderSyntax,
}

impl TemplateCompiler {
    /// Create a compiler for the given placeholder syntax
    pub fn new(syntax: PlaceholderSyntax) -> Self {
        Self { syntax }
    }

    /// The placeholder syntax this compiler understands
    pub fn syntax(&self) -> PlaceholderSyntax {
        self.syntax
    }

    /// Distinct variable names in first-occurrence order
    ///
    /// # Errors
    ///
    /// Returns `TemplateSyntax` for an unclosed placeholder, a stray closing
    /// delimiter, an empty placeholder, or an invalid variable name.
    pub fn extract_variables(&self, text: &str) -> Result<Vec<String>> {
        let mut names: Vec<String> = Vec::new();
        for segment in self.parse(text)? {
            if let Segment::Variable(name) = segment {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        Ok(names)
    }

    /// Substitute every placeholder with its value
    ///
    /// The whole template is validated before substitution, so a syntax error
    /// anywhere wins over a missing value. Keys in `values` that the template
    /// does not reference are ignored.
    ///
    /// # Errors
    ///
    /// Returns `TemplateSyntax` for malformed templates and `MissingVariable`
    /// naming the first variable (in template order) without a value.
    pub fn render(&self, text: &str, values: &HashMap<String, String>) -> Result<String> {
        let segments = self.parse(text)?;

        if let Some(missing) = segments.iter().find_map(|s| match s {
            Segment::Variable(name) if !values.contains_key(name) => Some(name),
            _ => None,
        }) {
            return Err(PromptdeckError::MissingVariable(missing.clone()));
        }

        let mut output = String::with_capacity(text.len());
        for segment in &segments {
            match segment {
                Segment::Literal(s) => output.push_str(s),
                // Presence checked above
                Segment::Variable(name) => output.push_str(&values[name]),
            }
        }
        Ok(output)
    }

    fn parse(&self, text: &str) -> Result<Vec<Segment>> {
        let open = self.syntax.open;
        let close = self.syntax.close;
        let chars: Vec<(usize, char)> = text.char_indices().collect();
        let len = chars.len();

        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < len {
            let (start, c) = chars[i];

            if c == open {
                if i + 1 < len && chars[i + 1].1 == open {
                    literal.push(open);
                    i += 2;
                    continue;
                }

                // Scan to the matching close delimiter
                let mut j = i + 1;
                while j < len && chars[j].1 != close {
                    if chars[j].1 == open {
                        let end = chars.get(j + 1).map(|(b, _)| *b).unwrap_or(text.len());
                        return Err(syntax_error(
                            &text[start..end],
                            "nested placeholder opening",
                        ));
                    }
                    j += 1;
                }
                if j == len {
                    return Err(syntax_error(
                        &text[start..],
                        "unclosed placeholder",
                    ));
                }

                let fragment_end = chars.get(j + 1).map(|(b, _)| *b).unwrap_or(text.len());
                let fragment = &text[start..fragment_end];
                let name = &text[chars[i + 1].0..chars[j].0];

                if name.is_empty() {
                    return Err(syntax_error(fragment, "empty placeholder"));
                }
                if !VARIABLE_NAME.is_match(name) {
                    return Err(syntax_error(fragment, "invalid variable name"));
                }

                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.to_string()));
                i = j + 1;
            } else if c == close {
                if i + 1 < len && chars[i + 1].1 == close {
                    literal.push(close);
                    i += 2;
                    continue;
                }
                let context_start = chars[i.saturating_sub(8)].0;
                let end = chars.get(i + 1).map(|(b, _)| *b).unwrap_or(text.len());
                return Err(syntax_error(
                    &text[context_start..end],
                    "unmatched closing delimiter",
                ));
            } else {
                literal.push(c);
                i += 1;
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }
        Ok(segments)
    }
}

fn syntax_error(fragment: &str, message: &str) -> PromptdeckError {
    PromptdeckError::TemplateSyntax {
        fragment: fragment.to_string(),
        message: message.to_string(),
    }
}

/// Extract variable names using the default `{name}` syntax
pub fn extract_variables(text: &str) -> Result<Vec<String>> {
    TemplateCompiler::default().extract_variables(text)
}

/// Render using the default `{name}` syntax
pub fn render(text: &str, values: &HashMap<String, String>) -> Result<String> {
    TemplateCompiler::default().render(text, values)
}
