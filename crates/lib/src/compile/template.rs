use rayon::prelude::*;
use tracing::debug;

use super::{TemplateCompiler, TransformError, source_text};
use crate::tree::{FileTree, TreeBuilder};
use crate::util::hash::hash_bytes;

/// Default template compiler.
///
/// Emits a module exporting the raw template with a content-derived id:
///
/// ```js
/// export default {
///   id: "3f1c0a9e2b7d4c5a6e8f",
///   block: "<p>{{@name}}</p>",
///   meta: { specifier: "ui/components/greeting/template" }
/// };
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleTemplateCompiler;

impl TemplateCompiler for ModuleTemplateCompiler {
  fn compile(&self, path: &str, specifier: &str, source: &str) -> Result<String, TransformError> {
    let mut id_input = Vec::with_capacity(path.len() + source.len() + 1);
    id_input.extend_from_slice(path.as_bytes());
    id_input.push(0);
    id_input.extend_from_slice(source.as_bytes());
    let id = hash_bytes(&id_input);

    let block = serde_json::to_string(source).map_err(|e| TransformError::failed(path, e))?;
    let specifier = serde_json::to_string(specifier).map_err(|e| TransformError::failed(path, e))?;

    Ok(format!(
      "export default {{\n  id: \"{}\",\n  block: {},\n  meta: {{ specifier: {} }}\n}};\n",
      id.short(),
      block,
      specifier
    ))
  }
}

/// Strip the extension from a tree path.
pub fn specifier_for(path: &str) -> &str {
  match path.rfind('.') {
    Some(dot) if !path[dot..].contains('/') => &path[..dot],
    _ => path,
  }
}

/// Compile every template in `templates`, renaming `*.hbs` to `*.js`.
///
/// Templates compile in parallel, but results are collected in path order, so
/// the output and the reported error (the lowest failing path) are the same as
/// a sequential run.
pub fn compile_templates(compiler: &dyn TemplateCompiler, templates: &FileTree) -> Result<FileTree, TransformError> {
  let entries: Vec<(&str, &[u8])> = templates.iter().collect();

  let compiled: Vec<Result<(String, String), TransformError>> = entries
    .par_iter()
    .map(|(path, bytes)| {
      let source = source_text(path, bytes)?;
      let specifier = specifier_for(path);
      let module = compiler.compile(path, specifier, source)?;
      Ok((format!("{}.js", specifier), module))
    })
    .collect();

  let mut builder = TreeBuilder::new();
  for result in compiled {
    let (path, module) = result?;
    builder
      .add(&path, module)
      .map_err(|e| TransformError::failed(path.clone(), e))?;
  }

  let tree = builder.build();
  debug!(templates = tree.len(), "compiled templates");
  Ok(tree)
}
