//! # Route Templates
//!
//! Compilation of route templates into anchored matchers, and the reverse
//! direction: rendering a concrete path from a template plus parameter values.
//!
//! ## Template Kinds
//!
//! - `Literal` - plain path, matched exactly (`/users`)
//! - `Placeholder` - path with `{token}` segments (`/users/{name}`)
//! - `RawPattern` - a regular expression supplied verbatim (`/test/(a|b|c)`)
//! - `AutoPrefix` - catch-all prefix marked with `[auto]` (`/docs/[auto]`)
//!
//! Matching is always done against the request path with surrounding `/`
//! trimmed, so `/users`, `/users/` and `users` are the same request.

use crate::error::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Reserved marker turning a template into an auto-prefix route
pub const DEFAULT_AUTO_MARKER: &str = "[auto]";

/// Capture used for tokens without a custom pattern
pub const DEFAULT_TOKEN_PATTERN: &str = r"([\w-]+)";

/// Maximum size for a compiled route regex (in bytes).
const MAX_TEMPLATE_REGEX_SIZE: usize = 1 << 20;

/// Characters that make an untokenized template a regular expression
const REGEX_META: &[char] = &['\\', '.', '+', '*', '?', '(', ')', '[', ']', '{', '}', '^', '$', '|'];

fn token_regex() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| Regex::new(r"\{([\w-]+)\}").expect("token syntax regex is valid"))
}

/// How a template is interpreted when compiled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    /// Exact path, no pattern syntax
    Literal,
    /// Path containing `{token}` placeholders
    Placeholder,
    /// Regular expression used as-is
    RawPattern,
    /// Prefix match, trailing segments captured verbatim
    AutoPrefix,
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => write!(f, "literal"),
            Self::Placeholder => write!(f, "placeholder"),
            Self::RawPattern => write!(f, "raw"),
            Self::AutoPrefix => write!(f, "auto"),
        }
    }
}

/// A route template as registered, tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Template exactly as supplied by the caller
    source: String,
    /// Template with the auto marker removed
    body: String,
    kind: TemplateKind,
}

impl Template {
    /// Classify a template using the given auto-prefix marker
    #[must_use]
    pub fn parse(source: &str, auto_marker: &str) -> Self {
        if !auto_marker.is_empty() && source.contains(auto_marker) {
            return Self {
                source: source.to_string(),
                body: source.replace(auto_marker, ""),
                kind: TemplateKind::AutoPrefix,
            };
        }

        let kind = if token_regex().is_match(source) {
            TemplateKind::Placeholder
        } else if source.contains(REGEX_META) {
            TemplateKind::RawPattern
        } else {
            TemplateKind::Literal
        };

        Self {
            source: source.to_string(),
            body: source.to_string(),
            kind,
        }
    }

    /// Classify a template using [`DEFAULT_AUTO_MARKER`]
    ///
    /// Any regex metacharacter without a `{token}` makes the template a
    /// `RawPattern`, so a stray brace such as `/a{b` fails to compile. Use
    /// [`Template::literal`] for paths that must be matched as plain text.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self::parse(source, DEFAULT_AUTO_MARKER)
    }

    /// A literal path; pattern metacharacters are matched as text
    #[must_use]
    pub fn literal(source: &str) -> Self {
        Self {
            source: source.to_string(),
            body: source.to_string(),
            kind: TemplateKind::Literal,
        }
    }

    /// A regular expression; `{n}` is left alone as a quantifier
    #[must_use]
    pub fn raw(source: &str) -> Self {
        Self {
            source: source.to_string(),
            body: source.to_string(),
            kind: TemplateKind::RawPattern,
        }
    }

    /// Original template string
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Template string without the auto-prefix marker
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Template kind
    #[must_use]
    pub fn kind(&self) -> TemplateKind {
        self.kind
    }

    /// Distinct token names in order of first appearance
    #[must_use]
    pub fn tokens(&self) -> Vec<String> {
        if !self.substitutes_tokens() {
            return Vec::new();
        }

        let mut names: Vec<String> = Vec::new();
        for caps in token_regex().captures_iter(&self.body) {
            let name = &caps[1];
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    fn substitutes_tokens(&self) -> bool {
        matches!(
            self.kind,
            TemplateKind::Placeholder | TemplateKind::AutoPrefix
        )
    }

    /// Compile the template into an anchored matcher
    ///
    /// `token_patterns` overrides the default capture for individual tokens.
    /// An override without a capture group of its own is wrapped in one.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedTemplate` if an override or the resulting
    /// expression does not compile
    pub fn compile(&self, token_patterns: &HashMap<String, String>) -> Result<CompiledTemplate> {
        let trimmed = self.body.trim_matches('/');
        let tokens = self.tokens();

        let expression = match self.kind {
            TemplateKind::Literal => regex::escape(trimmed),
            TemplateKind::RawPattern => trimmed.to_string(),
            TemplateKind::Placeholder | TemplateKind::AutoPrefix => {
                let mut captures = HashMap::with_capacity(tokens.len());
                for token in &tokens {
                    let capture = match token_patterns.get(token) {
                        Some(pattern) => token_capture(pattern)?,
                        None => DEFAULT_TOKEN_PATTERN.to_string(),
                    };
                    captures.insert(token.as_str(), capture);
                }
                token_regex()
                    .replace_all(trimmed, |caps: &regex::Captures<'_>| {
                        captures
                            .get(&caps[1])
                            .cloned()
                            .unwrap_or_else(|| caps[0].to_string())
                    })
                    .into_owned()
            }
        };

        let prefix = self.kind == TemplateKind::AutoPrefix;
        let anchored = if prefix {
            if expression.is_empty() {
                "^".to_string()
            } else {
                format!("^(?:{expression})(?:/|$)")
            }
        } else {
            format!("^(?:{expression})$")
        };

        let regex = build_regex(&anchored).map_err(|reason| Error::MalformedTemplate {
            template: self.source.clone(),
            reason,
        })?;

        Ok(CompiledTemplate {
            regex,
            tokens,
            prefix,
        })
    }
}

impl From<&str> for Template {
    fn from(source: &str) -> Self {
        Self::new(source)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn build_regex(expression: &str) -> std::result::Result<Regex, String> {
    RegexBuilder::new(expression)
        .size_limit(MAX_TEMPLATE_REGEX_SIZE)
        .build()
        .map_err(|e| e.to_string())
}

/// Validate a per-token override and confine it to the token's slot
///
/// Overrides without a group of their own become one capture; others are
/// wrapped in a non-capturing group so alternations stay inside the slot.
fn token_capture(pattern: &str) -> Result<String> {
    let compiled = build_regex(pattern).map_err(|reason| Error::MalformedTemplate {
        template: pattern.to_string(),
        reason,
    })?;

    if compiled.captures_len() > 1 {
        Ok(format!("(?:{pattern})"))
    } else {
        Ok(format!("({pattern})"))
    }
}

/// A template compiled into an anchored regular expression
#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    regex: Regex,
    tokens: Vec<String>,
    prefix: bool,
}

impl CompiledTemplate {
    /// The anchored expression used for matching
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Token names in order of first appearance
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether this matcher only anchors at the start
    #[must_use]
    pub fn is_prefix(&self) -> bool {
        self.prefix
    }

    /// Match a request path, returning positional parameters
    ///
    /// Every capture group contributes one parameter, in order; a group that
    /// did not participate yields an empty string. For prefix matchers the
    /// path segments after the prefix follow, unvalidated.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Vec<String>> {
        let path = path.trim_matches('/');
        let caps = self.regex.captures(path)?;

        let mut params: Vec<String> = caps
            .iter()
            .skip(1)
            .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
            .collect();

        if self.prefix {
            let end = caps.get(0).map_or(0, |m| m.end());
            let rest = path[end..].trim_start_matches('/');
            if !rest.is_empty() {
                params.extend(rest.split('/').map(str::to_string));
            }
        }

        Some(params)
    }
}

/// Render a template with the given parameter values
///
/// Each `{key}` is replaced by its value verbatim (no escaping). Tokens without
/// a value are dropped.
#[must_use]
pub fn render(template: &str, params: &[(&str, &str)]) -> String {
    token_regex()
        .replace_all(template, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

/// Collapse runs of `/` into a single separator
#[must_use]
pub fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(c);
    }
    out
}
