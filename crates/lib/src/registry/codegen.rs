use std::fmt::Write;

use super::{ModuleRegistry, ResolverConfiguration};

/// Source of `config/module-map.js`.
///
/// Imports are relative to `config/` and appear in identifier order, so the
/// output only changes when the registry does.
pub fn module_map_source(registry: &ModuleRegistry) -> String {
  let mut imports = String::new();
  let mut map = String::new();

  for (i, entry) in registry.entries().enumerate() {
    let binding = format!("__module{}__", i);
    let _ = writeln!(imports, "import {} from '../{}';", binding, entry.specifier);
    let _ = writeln!(map, "  {}: {},", json_string(&entry.identifier), binding);
  }

  if imports.is_empty() {
    return "export default {};\n".to_string();
  }
  format!("{}\nexport default {{\n{}}};\n", imports, map)
}

/// Source of `config/resolver-configuration.js`.
pub fn resolver_configuration_source(config: &ResolverConfiguration) -> String {
  let json = serde_json::to_string_pretty(config).unwrap_or_else(|_| "{}".to_string());
  format!("export default {};\n", json)
}

fn json_string(s: &str) -> String {
  serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s))
}
