use super::{ScriptTranspiler, TransformError};

/// Default transpiler: `.ts` files are renamed to `.js`, sources pass through.
///
/// Enough for projects that already write browser-ready modules; type-aware
/// transpilation needs a real toolchain.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranspiler;

impl ScriptTranspiler for PassthroughTranspiler {
  fn transpile(&self, path: &str, source: &str) -> Result<(String, String), TransformError> {
    let out_path = match path.strip_suffix(".ts") {
      Some(stem) => format!("{}.js", stem),
      None => path.to_string(),
    };
    Ok((out_path, source.to_string()))
  }
}
