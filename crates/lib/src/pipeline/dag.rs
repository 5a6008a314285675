//! Stage graph.
//!
//! Stages form a DAG over their declared inputs. The graph is checked for
//! cycles and unknown inputs when it is built, and ordered topologically with
//! declaration order breaking ties, so the order is a pure function of the
//! declarations.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::addon::TreeType;

use super::types::{BuildError, StageInput, StageName, StageSpec};

/// Declarations of the standard pipeline, in order.
///
/// The style stage is only declared when there is a style source.
pub fn standard_stages(has_styles: bool) -> Vec<StageSpec> {
  let mut specs = vec![
    StageSpec {
      name: StageName::TemplateCompile,
      inputs: vec![StageInput::Source],
      before: Some(TreeType::Template),
      after: Some(TreeType::Template),
    },
    StageSpec {
      name: StageName::ScriptCompile,
      inputs: vec![StageInput::Source, StageInput::Stage(StageName::TemplateCompile)],
      before: Some(TreeType::Js),
      after: Some(TreeType::Js),
    },
    StageSpec {
      name: StageName::ModuleRegistry,
      inputs: vec![StageInput::Stage(StageName::ScriptCompile)],
      before: None,
      after: None,
    },
    StageSpec {
      name: StageName::Bundle,
      inputs: vec![
        StageInput::Stage(StageName::ScriptCompile),
        StageInput::Stage(StageName::ModuleRegistry),
        StageInput::NodeModules,
      ],
      before: None,
      after: None,
    },
  ];

  if has_styles {
    specs.push(StageSpec {
      name: StageName::Style,
      inputs: vec![StageInput::Styles],
      before: Some(TreeType::Css),
      after: Some(TreeType::Css),
    });
  }

  specs.push(StageSpec {
    name: StageName::Html,
    inputs: vec![StageInput::Source],
    before: None,
    after: Some(TreeType::Html),
  });
  specs.push(StageSpec {
    name: StageName::Public,
    inputs: vec![StageInput::Public],
    before: None,
    after: None,
  });

  specs
}

/// A verified, ordered stage graph.
#[derive(Debug)]
pub struct StageGraph {
  /// Node weights index into `specs`.
  graph: DiGraph<usize, ()>,
  specs: Vec<StageSpec>,
  nodes: HashMap<StageName, NodeIndex>,
}

impl StageGraph {
  /// Build the graph from declarations.
  ///
  /// # Errors
  ///
  /// `DuplicateStage`, `UnknownStageInput` or `CycleDetected`.
  pub fn new(specs: Vec<StageSpec>) -> Result<Self, BuildError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    for (i, spec) in specs.iter().enumerate() {
      let idx = graph.add_node(i);
      if nodes.insert(spec.name, idx).is_some() {
        return Err(BuildError::DuplicateStage(spec.name));
      }
    }

    for spec in &specs {
      let dependent = nodes[&spec.name];
      for input in &spec.inputs {
        if let StageInput::Stage(dep) = input {
          let Some(&dep_idx) = nodes.get(dep) else {
            return Err(BuildError::UnknownStageInput {
              stage: spec.name,
              input: *dep,
            });
          };
          // Edge from dependency to dependent
          graph.add_edge(dep_idx, dependent, ());
        }
      }
    }

    toposort(&graph, None).map_err(|_| BuildError::CycleDetected)?;

    Ok(Self { graph, specs, nodes })
  }

  /// Stages in execution order.
  ///
  /// Kahn's algorithm, always taking the earliest-declared ready stage.
  pub fn order(&self) -> Vec<&StageSpec> {
    let mut in_degree: HashMap<NodeIndex, usize> = self
      .graph
      .node_indices()
      .map(|idx| (idx, self.graph.neighbors_directed(idx, Direction::Incoming).count()))
      .collect();

    let mut ready: BTreeSet<usize> = in_degree
      .iter()
      .filter(|&(_, &deg)| deg == 0)
      .map(|(&idx, _)| self.graph[idx])
      .collect();

    let mut order = Vec::with_capacity(self.specs.len());
    while let Some(next) = ready.pop_first() {
      let spec = &self.specs[next];
      order.push(spec);

      let idx = self.nodes[&spec.name];
      for dependent in self.graph.neighbors_directed(idx, Direction::Outgoing) {
        if let Some(deg) = in_degree.get_mut(&dependent) {
          *deg -= 1;
          if *deg == 0 {
            ready.insert(self.graph[dependent]);
          }
        }
      }
    }

    order
  }

  pub fn contains(&self, name: StageName) -> bool {
    self.nodes.contains_key(&name)
  }

  /// Stages `name` reads from directly.
  pub fn dependencies(&self, name: StageName) -> Vec<StageName> {
    let Some(&idx) = self.nodes.get(&name) else {
      return Vec::new();
    };
    let mut deps: Vec<StageName> = self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .map(|dep| self.specs[self.graph[dep]].name)
      .collect();
    deps.sort();
    deps
  }
}
