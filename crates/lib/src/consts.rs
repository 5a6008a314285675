//! Well-known names, paths and defaults shared across the crate.

/// Environment variable consulted by callers when no environment is given explicitly.
pub const ENV_VAR: &str = "ARBOR_ENV";

/// Build configuration file at the project root.
pub const BUILD_CONFIG_FILE: &str = "arbor.json";

/// Package metadata file at the project root.
pub const PACKAGE_FILE: &str = "package.json";

/// Application configuration file, relative to the project root.
pub const APP_CONFIG_FILE: &str = "config/environment.json";

/// Default source root, relative to the project root.
pub const SRC_DIR: &str = "src";

/// Default static asset directory, relative to the project root.
pub const PUBLIC_DIR: &str = "public";

/// Default package directory, relative to the project root.
pub const NODE_MODULES_DIR: &str = "node_modules";

/// Styles directory, relative to the source root.
pub const STYLES_DIR: &str = "ui/styles";

/// Components directory, relative to the source root.
pub const COMPONENTS_DIR: &str = "ui/components";

/// HTML entry template, relative to the source root.
pub const INDEX_HTML: &str = "ui/index.html";

/// Generated module map, relative to the script tree.
pub const MODULE_MAP_PATH: &str = "config/module-map.js";

/// Generated resolver configuration, relative to the script tree.
pub const RESOLVER_CONFIGURATION_PATH: &str = "config/resolver-configuration.js";

/// Generated application configuration module, relative to the script tree.
pub const ENVIRONMENT_MODULE_PATH: &str = "config/environment.js";

/// Default output names for the three application artifacts.
pub const DEFAULT_HTML_OUTPUT: &str = "index.html";
pub const DEFAULT_CSS_OUTPUT: &str = "app.css";
pub const DEFAULT_JS_OUTPUT: &str = "app.js";

/// Default `rootURL` when the application config does not set one.
pub const DEFAULT_ROOT_URL: &str = "/";

/// Module specifier that exposes the `DEBUG` flag to application code.
pub const ENV_MACRO_MODULE: &str = "@arbor/env";

/// Module specifier that exposes feature flags to application code.
pub const FEATURES_MACRO_MODULE: &str = "@arbor/features";

/// Length of the truncated hashes used for template ids.
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Version of the built-in collection set emitted in the resolver configuration.
pub const RESOLVER_COLLECTIONS_VERSION: u32 = 1;
