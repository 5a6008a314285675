//! Stage transforms.

use tracing::debug;

use super::types::{StageError, StageName, StageSpec};
use super::{Builder, Inputs, Run};
use crate::addon::TreeType;
use crate::compile::macros::{self, MacroContext};
use crate::compile::{BundleInput, TransformError, apply_plugins, compile_templates, source_text};
use crate::consts::{
  DEFAULT_CSS_OUTPUT, DEFAULT_HTML_OUTPUT, ENVIRONMENT_MODULE_PATH, INDEX_HTML, MODULE_MAP_PATH,
  RESOLVER_CONFIGURATION_PATH,
};
use crate::placeholder::substitute;
use crate::registry::{ModuleRegistry, RegistryError, module_map_source, resolver_configuration_source};
use crate::tree::{FileTree, TreeBuilder};

const RESERVED_PATHS: [&str; 3] = [MODULE_MAP_PATH, RESOLVER_CONFIGURATION_PATH, ENVIRONMENT_MODULE_PATH];

fn is_script(path: &str) -> bool {
  path.ends_with(".js") || path.ends_with(".ts")
}

impl Builder {
  pub(super) fn run_stage(&self, spec: &StageSpec, inputs: &Inputs, run: &mut Run) -> Result<FileTree, StageError> {
    match spec.name {
      StageName::TemplateCompile => self.template_compile(spec, inputs, run),
      StageName::ScriptCompile => {
        let templates = run.output(StageName::TemplateCompile)?;
        self.script_compile(spec, &inputs.src, templates)
      }
      StageName::ModuleRegistry => {
        let scripts = run.output(StageName::ScriptCompile)?;
        let (tree, registry) = self.module_registry(scripts)?;
        run.registry = Some(registry);
        Ok(tree)
      }
      StageName::Bundle => {
        let scripts = run.output(StageName::ScriptCompile)?;
        let modules = run.output(StageName::ModuleRegistry)?;
        self.bundle(scripts, modules, &inputs.node_modules)
      }
      StageName::Style => self.style(spec, &inputs.styles),
      StageName::Html => self.html(spec, &inputs.src),
      StageName::Public => self.public(&inputs.public),
    }
  }

  /// Run `transform` between the stage's pre- and postprocess hooks.
  fn hooked(
    &self,
    spec: &StageSpec,
    tree: FileTree,
    transform: impl FnOnce(FileTree) -> Result<FileTree, StageError>,
  ) -> Result<FileTree, StageError> {
    let tree = match spec.before {
      Some(tree_type) => self.addons.preprocess_tree(tree_type, tree)?,
      None => tree,
    };
    let tree = transform(tree)?;
    match spec.after {
      Some(tree_type) => Ok(self.addons.postprocess_tree(tree_type, tree)?),
      None => Ok(tree),
    }
  }

  fn lint(&self, tree_type: TreeType, tree: &FileTree, run: &mut Run) -> Result<(), StageError> {
    if !self.options.lint.is_enabled() {
      return Ok(());
    }
    let results = self.addons.lint_tree(tree_type, tree)?;
    if !results.is_empty() {
      run.lint.push((format!("lintTree(\"{}\")", tree_type), results));
    }
    Ok(())
  }

  fn template_compile(&self, spec: &StageSpec, inputs: &Inputs, run: &mut Run) -> Result<FileTree, StageError> {
    self.lint(TreeType::Src, &inputs.src, run)?;

    let templates = inputs.src.filter(|path| path.ends_with(".hbs"));
    let compiled = self.hooked(spec, templates, |templates| {
      Ok(compile_templates(self.toolchain.templates.as_ref(), &templates)?)
    })?;

    self.lint(TreeType::Templates, &compiled, run)?;
    Ok(compiled)
  }

  fn script_compile(&self, spec: &StageSpec, src: &FileTree, templates: &FileTree) -> Result<FileTree, StageError> {
    let scripts = src.filter(is_script);
    let merged = FileTree::merge([("source scripts", &scripts), ("compiled templates", templates)])?;

    let ctx = MacroContext {
      environment: self.options.environment,
      feature_flags: &self.app_config.feature_flags,
    };

    self.hooked(spec, merged, |tree| {
      let mut builder = TreeBuilder::new();
      for (path, bytes) in tree.iter() {
        if !is_script(path) {
          builder.add(path, bytes)?;
          continue;
        }

        let source = source_text(path, bytes)?;
        let (out_path, code) = self.toolchain.transpiler.transpile(path, source)?;
        let code = macros::rewrite(path, &code, &ctx)?;
        let code = apply_plugins(&self.options.babel.plugins, &out_path, code)?;
        builder
          .add(&out_path, code)
          .map_err(|e| TransformError::failed(out_path.clone(), e))?;
      }
      Ok(builder.build())
    })
  }

  fn module_registry(&self, scripts: &FileTree) -> Result<(FileTree, ModuleRegistry), StageError> {
    if let Some(reserved) = RESERVED_PATHS.iter().find(|path| scripts.contains(path)) {
      return Err(RegistryError::ReservedPath(reserved.to_string()).into());
    }

    let registry = ModuleRegistry::build(scripts, &self.resolver_config)?;
    let tree = scripts
      .insert(MODULE_MAP_PATH, module_map_source(&registry))?
      .insert(RESOLVER_CONFIGURATION_PATH, resolver_configuration_source(&self.resolver_config))?
      .insert(ENVIRONMENT_MODULE_PATH, self.app_config.to_module_source())?;

    debug!(modules = registry.len(), "derived module registry");
    Ok((tree, registry))
  }

  fn bundle(&self, scripts: &FileTree, modules: &FileTree, node_modules: &FileTree) -> Result<FileTree, StageError> {
    // Generated registry modules alone are not an application.
    if scripts.is_empty() {
      debug!("no application modules, skipping bundle");
      return Ok(FileTree::new());
    }

    let input = BundleInput {
      app_name: self.project.name(),
      modules,
      node_modules,
      plugins: &self.options.rollup.plugins,
    };
    Ok(self.toolchain.bundler.bundle(&input)?)
  }

  fn style(&self, spec: &StageSpec, styles: &FileTree) -> Result<FileTree, StageError> {
    self.hooked(spec, styles.clone(), |styles| match self.toolchain.styles.compile(&styles)? {
      Some(css) => Ok(FileTree::from_files([(DEFAULT_CSS_OUTPUT, css)])?),
      None => Ok(FileTree::new()),
    })
  }

  fn html(&self, spec: &StageSpec, src: &FileTree) -> Result<FileTree, StageError> {
    let bytes = src.get(INDEX_HTML).ok_or(StageError::MissingInput(INDEX_HTML))?;
    let template = source_text(INDEX_HTML, bytes)?;
    let html = substitute(template, &self.app_config);

    self.hooked(spec, FileTree::from_files([(DEFAULT_HTML_OUTPUT, html)])?, Ok)
  }

  fn public(&self, project_public: &FileTree) -> Result<FileTree, StageError> {
    let contributions = self.addons.tree_for(TreeType::Public)?;
    let layers = std::iter::once(("project public", project_public))
      .chain(contributions.iter().map(|(label, tree)| (label.as_str(), tree)));
    Ok(FileTree::merge(layers)?)
  }
}
