//! JavaScript parsing shared by the script rewrites and the bundler.
//!
//! Rewrites never regenerate code from the AST. They collect `(start, end,
//! replacement)` edits against the parsed source and splice them in, so
//! untouched code keeps its exact formatting.

use oxc_allocator::Allocator;
use oxc_ast::ast::{Program, Statement};
use oxc_parser::Parser;
use oxc_span::SourceType;

use super::TransformError;

/// Module source type for `path`; `.ts` files also accept type syntax.
pub fn source_type_for(path: &str) -> SourceType {
  SourceType::default()
    .with_module(true)
    .with_typescript(path.ends_with(".ts"))
}

/// Parse `source` as an ES module, reporting the first syntax error.
pub fn parse<'a>(
  allocator: &'a Allocator,
  path: &str,
  source: &'a str,
  source_type: SourceType,
) -> Result<Program<'a>, TransformError> {
  let ret = Parser::new(allocator, source, source_type).parse();
  if let Some(error) = ret.errors.first() {
    return Err(TransformError::Syntax {
      path: path.to_string(),
      message: error.to_string(),
    });
  }
  Ok(ret.program)
}

/// A replacement of `source[start..end]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
  pub start: u32,
  pub end: u32,
  pub text: String,
}

impl Edit {
  pub fn new(start: u32, end: u32, text: impl Into<String>) -> Self {
    Edit {
      start,
      end,
      text: text.into(),
    }
  }
}

/// Apply non-overlapping edits to `source`.
pub fn apply_edits(source: &str, mut edits: Vec<Edit>) -> String {
  edits.sort_by(|a, b| b.start.cmp(&a.start));
  let mut out = source.to_string();
  for edit in edits {
    out.replace_range(edit.start as usize..edit.end as usize, &edit.text);
  }
  out
}

/// Module specifiers `code` imports or re-exports, in order of appearance.
///
/// Type-only imports and exports are skipped. Dynamic `import()` is not a
/// static dependency and is not reported.
///
/// Bundled code may still carry type annotations when the transpiler passes
/// TypeScript through, so it is scanned with type syntax enabled.
pub fn module_sources(path: &str, code: &str) -> Result<Vec<String>, TransformError> {
  let allocator = Allocator::default();
  let source_type = SourceType::default().with_module(true).with_typescript(true);
  let program = parse(&allocator, path, code, source_type)?;

  let mut sources = Vec::new();
  for stmt in &program.body {
    match stmt {
      Statement::ImportDeclaration(decl) if !decl.import_kind.is_type() => {
        sources.push(decl.source.value.to_string());
      }
      Statement::ExportNamedDeclaration(decl) if !decl.export_kind.is_type() => {
        if let Some(source) = &decl.source {
          sources.push(source.value.to_string());
        }
      }
      Statement::ExportAllDeclaration(decl) if !decl.export_kind.is_type() => {
        sources.push(decl.source.value.to_string());
      }
      _ => {}
    }
  }
  Ok(sources)
}
