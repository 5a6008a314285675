use tracing::warn;

use super::{StyleCompiler, TransformError, source_text};
use crate::tree::FileTree;

/// Default style compiler: concatenates every `.css` file in path order.
///
/// Preprocessor sources (`.scss`, `.less`, ...) are skipped with a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatStyleCompiler;

impl StyleCompiler for ConcatStyleCompiler {
  fn compile(&self, styles: &FileTree) -> Result<Option<String>, TransformError> {
    let mut css = String::new();
    let mut count = 0;

    for (path, bytes) in styles.iter() {
      if !path.ends_with(".css") {
        warn!(path, "skipping style source the default compiler cannot handle");
        continue;
      }
      let source = source_text(path, bytes)?;
      css.push_str(&format!("/* {} */\n", path));
      css.push_str(source);
      if !source.ends_with('\n') {
        css.push('\n');
      }
      count += 1;
    }

    if count == 0 {
      return Ok(None);
    }
    Ok(Some(css))
  }
}
