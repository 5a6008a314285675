//! Build-time macro rewriting for application scripts.
//!
//! Two virtual modules are replaced by constants:
//!
//! ```js
//! import { DEBUG } from '@arbor/env';        // const DEBUG = true;
//! import { NEW_NAV } from '@arbor/features'; // const NEW_NAV = false;
//! ```
//!
//! `assert(...)` call statements are removed in production and guarded as
//! `(DEBUG && assert(...));` everywhere else.

use std::collections::{BTreeMap, BTreeSet};

use oxc_allocator::{Allocator, Vec as ArenaVec};
use oxc_ast::ast::{
  BindingPattern, Declaration, Expression, ExpressionStatement, ImportDeclaration, ImportDeclarationSpecifier,
  ModuleExportName, Statement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

use super::TransformError;
use super::syntax::{Edit, apply_edits, parse, source_type_for};
use crate::config::Environment;
use crate::consts::{ENV_MACRO_MODULE, FEATURES_MACRO_MODULE};

const ENV_EXPORTS: [&str; 1] = ["DEBUG"];
const DEBUG_BINDING: &str = "DEBUG";
const ASSERT_CALLEE: &str = "assert";

/// Values the macros expand to.
#[derive(Debug, Clone, Copy)]
pub struct MacroContext<'a> {
  pub environment: Environment,
  pub feature_flags: &'a BTreeMap<String, bool>,
}

impl MacroContext<'_> {
  fn debug(&self) -> bool {
    !self.environment.is_production()
  }
}

/// Rewrite macro imports and asserts in `source`.
///
/// `path` selects the parser (`.ts` accepts type syntax) and names the file in
/// errors.
pub fn rewrite(path: &str, source: &str, ctx: &MacroContext<'_>) -> Result<String, TransformError> {
  let allocator = Allocator::default();
  let program = parse(&allocator, path, source, source_type_for(path))?;

  let mut edits = Vec::new();
  let mut bindings = BTreeSet::new();

  for stmt in &program.body {
    match stmt {
      Statement::ImportDeclaration(decl) if is_macro_module(decl) => {
        let names = imported_names(path, decl)?;
        let mut consts = Vec::with_capacity(names.len());
        for (imported, local) in names {
          let value = macro_value(path, decl.source.value.as_str(), &imported, ctx)?;
          consts.push(format!("const {} = {};", local, value));
          bindings.insert(local);
        }
        edits.push(Edit::new(decl.span.start, decl.span.end, consts.join("\n")));
      }
      _ => top_level_bindings(stmt, &mut bindings),
    }
  }

  let mut asserts = AssertCollector::default();
  asserts.visit_statements(&program.body);

  for found in &asserts.found {
    if ctx.debug() {
      let call = &source[found.call.start as usize..found.call.end as usize];
      edits.push(Edit::new(
        found.statement.start,
        found.statement.end,
        format!("({} && {});", DEBUG_BINDING, call),
      ));
    } else if found.in_list {
      let (start, end) = whole_line(source, found.statement);
      edits.push(Edit::new(start, end, ""));
    } else {
      // `if (x) assert(y);` still needs a statement body.
      edits.push(Edit::new(found.statement.start, found.statement.end, ";"));
    }
  }

  let mut out = apply_edits(source, edits);
  if ctx.debug() && !asserts.found.is_empty() && !bindings.contains(DEBUG_BINDING) {
    out.insert_str(0, "const DEBUG = true;\n");
  }
  Ok(out)
}

fn is_macro_module(decl: &ImportDeclaration<'_>) -> bool {
  let module = decl.source.value.as_str();
  module == ENV_MACRO_MODULE || module == FEATURES_MACRO_MODULE
}

/// `(imported, local)` pairs of a macro import. Only named imports exist on
/// macro modules.
fn imported_names(path: &str, decl: &ImportDeclaration<'_>) -> Result<Vec<(String, String)>, TransformError> {
  let mut names = Vec::new();
  for specifier in decl.specifiers.iter().flatten() {
    let (imported, local) = match specifier {
      ImportDeclarationSpecifier::ImportSpecifier(s) => {
        let imported = match &s.imported {
          ModuleExportName::IdentifierName(id) => id.name.to_string(),
          ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
          _ => s.local.name.to_string(),
        };
        (imported, s.local.name.to_string())
      }
      ImportDeclarationSpecifier::ImportDefaultSpecifier(_) => ("default".to_string(), String::new()),
      ImportDeclarationSpecifier::ImportNamespaceSpecifier(_) => ("*".to_string(), String::new()),
    };
    if local.is_empty() {
      return Err(TransformError::UnknownMacro {
        path: path.to_string(),
        module: decl.source.value.to_string(),
        name: imported,
      });
    }
    names.push((imported, local));
  }
  Ok(names)
}

fn macro_value(path: &str, module: &str, imported: &str, ctx: &MacroContext<'_>) -> Result<bool, TransformError> {
  if module == ENV_MACRO_MODULE {
    if !ENV_EXPORTS.contains(&imported) {
      return Err(TransformError::UnknownMacro {
        path: path.to_string(),
        module: module.to_string(),
        name: imported.to_string(),
      });
    }
    return Ok(ctx.debug());
  }

  ctx
    .feature_flags
    .get(imported)
    .copied()
    .ok_or_else(|| TransformError::UnknownFeature {
      path: path.to_string(),
      flag: imported.to_string(),
    })
}

/// Names a top-level statement binds in module scope.
fn top_level_bindings(stmt: &Statement<'_>, names: &mut BTreeSet<String>) {
  match stmt {
    Statement::ImportDeclaration(decl) => {
      for specifier in decl.specifiers.iter().flatten() {
        let local = match specifier {
          ImportDeclarationSpecifier::ImportSpecifier(s) => &s.local,
          ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => &s.local,
          ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => &s.local,
        };
        names.insert(local.name.to_string());
      }
    }
    Statement::VariableDeclaration(var) => {
      for decl in &var.declarations {
        pattern_bindings(&decl.id, names);
      }
    }
    Statement::FunctionDeclaration(func) => {
      if let Some(id) = &func.id {
        names.insert(id.name.to_string());
      }
    }
    Statement::ClassDeclaration(class) => {
      if let Some(id) = &class.id {
        names.insert(id.name.to_string());
      }
    }
    Statement::ExportNamedDeclaration(export) => match &export.declaration {
      Some(Declaration::VariableDeclaration(var)) => {
        for decl in &var.declarations {
          pattern_bindings(&decl.id, names);
        }
      }
      Some(Declaration::FunctionDeclaration(func)) => {
        if let Some(id) = &func.id {
          names.insert(id.name.to_string());
        }
      }
      Some(Declaration::ClassDeclaration(class)) => {
        if let Some(id) = &class.id {
          names.insert(id.name.to_string());
        }
      }
      _ => {}
    },
    _ => {}
  }
}

fn pattern_bindings(pattern: &BindingPattern<'_>, names: &mut BTreeSet<String>) {
  match pattern {
    BindingPattern::BindingIdentifier(id) => {
      names.insert(id.name.to_string());
    }
    BindingPattern::ObjectPattern(obj) => {
      for prop in &obj.properties {
        pattern_bindings(&prop.value, names);
      }
      if let Some(rest) = &obj.rest {
        pattern_bindings(&rest.argument, names);
      }
    }
    BindingPattern::ArrayPattern(arr) => {
      for pattern in arr.elements.iter().flatten() {
        pattern_bindings(pattern, names);
      }
      if let Some(rest) = &arr.rest {
        pattern_bindings(&rest.argument, names);
      }
    }
    _ => {}
  }
}

struct FoundAssert {
  statement: Span,
  call: Span,
  /// Directly inside a statement list, so it can be dropped outright.
  in_list: bool,
}

/// Finds `assert(...)` expression statements at any depth.
#[derive(Default)]
struct AssertCollector {
  found: Vec<FoundAssert>,
}

impl AssertCollector {
  fn matches(stmt: &ExpressionStatement<'_>) -> Option<Span> {
    match &stmt.expression {
      Expression::CallExpression(call) => match &call.callee {
        Expression::Identifier(id) if id.name.as_str() == ASSERT_CALLEE => Some(call.span),
        _ => None,
      },
      _ => None,
    }
  }
}

impl<'a> Visit<'a> for AssertCollector {
  fn visit_statements(&mut self, stmts: &ArenaVec<'a, Statement<'a>>) {
    for stmt in stmts {
      if let Statement::ExpressionStatement(expr) = stmt
        && let Some(call) = Self::matches(expr)
      {
        self.found.push(FoundAssert {
          statement: expr.span,
          call,
          in_list: true,
        });
        continue;
      }
      self.visit_statement(stmt);
    }
  }

  fn visit_expression_statement(&mut self, stmt: &ExpressionStatement<'a>) {
    match Self::matches(stmt) {
      Some(call) => self.found.push(FoundAssert {
        statement: stmt.span,
        call,
        in_list: false,
      }),
      None => walk::walk_expression_statement(self, stmt),
    }
  }
}

/// Widen `span` to its whole line when nothing else shares that line.
fn whole_line(source: &str, span: Span) -> (u32, u32) {
  let (start, end) = (span.start as usize, span.end as usize);
  let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
  let line_end = source[end..].find('\n').map_or(source.len(), |i| end + i + 1);

  let alone = source[line_start..start].trim().is_empty() && source[end..line_end].trim().is_empty();
  if alone {
    (line_start as u32, line_end as u32)
  } else {
    (span.start, span.end)
  }
}
