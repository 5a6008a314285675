//! Token parsing and substitution for the html stage.
//!
//! `index.html` may reference values that are only known once the environment
//! and application config have been resolved. This module parses those
//! tokens and substitutes resolved values.
//!
//! # Token Formats
//!
//! - `{{rootURL}}` - the application's root URL (always ends in `/`)
//! - `{{modulePrefix}}` - the application name
//! - `{{environment}}` - the build environment name
//!
//! Whitespace inside the braces is ignored, so `{{ rootURL }}` works too.
//!
//! # Unknown Tokens
//!
//! Any other `{{...}}` sequence passes through unchanged, so templates for
//! client-side tooling survive the html stage untouched. An unclosed `{{` is
//! literal text as well.
//!
//! # Escaping
//!
//! `\{{` produces a literal `{{` even when a known token follows.
//!
//! # Example
//!
//! ```
//! use arbor_lib::placeholder::{parse, Placeholder, Segment};
//!
//! let segments = parse("<script src=\"{{rootURL}}app.js\"></script>");
//! assert_eq!(segments, vec![
//!     Segment::Literal("<script src=\"".to_string()),
//!     Segment::Placeholder(Placeholder::RootUrl),
//!     Segment::Literal("app.js\"></script>".to_string()),
//! ]);
//! ```

/// A parsed token reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
  /// `{{rootURL}}`
  RootUrl,

  /// `{{modulePrefix}}`
  ModulePrefix,

  /// `{{environment}}`
  Environment,
}

impl Placeholder {
  fn from_token(token: &str) -> Option<Self> {
    match token.trim() {
      "rootURL" => Some(Placeholder::RootUrl),
      "modulePrefix" => Some(Placeholder::ModulePrefix),
      "environment" => Some(Placeholder::Environment),
      _ => None,
    }
  }
}

/// A segment of parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
  /// Literal text (no tokens)
  Literal(String),

  /// A token to be resolved
  Placeholder(Placeholder),
}

/// Supplies the values tokens resolve to.
pub trait Resolver {
  fn resolve_root_url(&self) -> &str;

  fn resolve_module_prefix(&self) -> &str;

  fn resolve_environment(&self) -> &str;
}

/// Parse a string containing tokens into segments.
///
/// Parsing never fails: anything that is not a known token is literal text.
pub fn parse(input: &str) -> Vec<Segment> {
  let mut segments = Vec::new();
  let mut literal = String::new();
  let mut rest = input;

  while let Some(pos) = rest.find("{{") {
    let escaped = rest[..pos].ends_with('\\');
    if escaped {
      // Drop the backslash, keep the braces.
      literal.push_str(&rest[..pos - 1]);
      literal.push_str("{{");
      rest = &rest[pos + 2..];
      continue;
    }

    literal.push_str(&rest[..pos]);
    let after_open = &rest[pos + 2..];

    let Some(close) = after_open.find("}}") else {
      literal.push_str(&rest[pos..]);
      rest = "";
      break;
    };

    let token = &after_open[..close];
    match Placeholder::from_token(token) {
      Some(placeholder) => {
        if !literal.is_empty() {
          segments.push(Segment::Literal(std::mem::take(&mut literal)));
        }
        segments.push(Segment::Placeholder(placeholder));
      }
      None => {
        literal.push_str("{{");
        literal.push_str(token);
        literal.push_str("}}");
      }
    }
    rest = &after_open[close + 2..];
  }

  literal.push_str(rest);
  if !literal.is_empty() {
    segments.push(Segment::Literal(literal));
  }

  segments
}

/// Substitute all tokens in a string using the provided resolver.
pub fn substitute(input: &str, resolver: &impl Resolver) -> String {
  substitute_segments(&parse(input), resolver)
}

/// Substitute tokens in pre-parsed segments.
pub fn substitute_segments(segments: &[Segment], resolver: &impl Resolver) -> String {
  let mut result = String::new();

  for segment in segments {
    match segment {
      Segment::Literal(s) => result.push_str(s),
      Segment::Placeholder(p) => {
        let value = match p {
          Placeholder::RootUrl => resolver.resolve_root_url(),
          Placeholder::ModulePrefix => resolver.resolve_module_prefix(),
          Placeholder::Environment => resolver.resolve_environment(),
        };
        result.push_str(value);
      }
    }
  }

  result
}
