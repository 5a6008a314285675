use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::consts::RESOLVER_COLLECTIONS_VERSION;

/// Metadata the runtime resolver uses to interpret identifiers.
///
/// The collection set is closed and versioned: changing it means bumping
/// `RESOLVER_COLLECTIONS_VERSION`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfiguration {
  pub version: u32,
  pub app: AppInfo,
  pub types: BTreeMap<String, TypeConfig>,
  pub collections: BTreeMap<String, CollectionConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppInfo {
  pub name: String,
  pub root_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeConfig {
  pub definitive_collection: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub group: Option<String>,
  #[serde(default)]
  pub types: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub default_type: Option<String>,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub private_collections: Vec<String>,
  #[serde(default, skip_serializing_if = "std::ops::Not::not")]
  pub unresolvable: bool,
}

impl CollectionConfig {
  /// Source directory holding this collection's modules, if it has one.
  pub fn directory(&self, name: &str) -> Option<String> {
    self.group.as_ref().map(|group| format!("{}/{}", group, name))
  }
}

fn strings(values: &[&str]) -> Vec<String> {
  values.iter().map(|s| s.to_string()).collect()
}

impl ResolverConfiguration {
  /// The standard configuration for an application named `app_name`.
  pub fn new(app_name: &str) -> Self {
    let mut collections = BTreeMap::new();
    collections.insert(
      "main".to_string(),
      CollectionConfig {
        types: strings(&["application", "renderer"]),
        ..Default::default()
      },
    );
    collections.insert(
      "components".to_string(),
      CollectionConfig {
        group: Some("ui".to_string()),
        types: strings(&["component", "template", "helper", "component-manager"]),
        default_type: Some("component".to_string()),
        private_collections: strings(&["utils"]),
        ..Default::default()
      },
    );
    collections.insert(
      "styles".to_string(),
      CollectionConfig {
        group: Some("ui".to_string()),
        unresolvable: true,
        ..Default::default()
      },
    );
    collections.insert(
      "utils".to_string(),
      CollectionConfig {
        unresolvable: true,
        ..Default::default()
      },
    );

    let mut types = BTreeMap::new();
    for (collection_name, collection) in &collections {
      for ty in &collection.types {
        types.insert(
          ty.clone(),
          TypeConfig {
            definitive_collection: collection_name.clone(),
          },
        );
      }
    }

    Self {
      version: RESOLVER_COLLECTIONS_VERSION,
      app: AppInfo {
        name: app_name.to_string(),
        root_name: app_name.to_string(),
      },
      types,
      collections,
    }
  }

  /// Collections that map source files to identifiers, with their directories.
  pub fn scanned_collections(&self) -> impl Iterator<Item = (String, &CollectionConfig)> {
    self
      .collections
      .iter()
      .filter(|(_, c)| !c.unresolvable)
      .filter_map(|(name, c)| c.directory(name).map(|dir| (dir, c)))
  }
}
