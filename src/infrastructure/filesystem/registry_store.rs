use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::entities::{group::Group, project::Project, registry::Registry};

/// Registry store related errors
#[derive(Debug, Error)]
pub enum RegistryStoreError {
    #[error("Failed to read registry file '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write registry file '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Registry file '{path}' is not valid YAML: {source}")]
    YamlParsingFailed {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Registry serialization failed: {0}")]
    YamlSerializationFailed(#[source] serde_yaml::Error),
}

/// On-disk shape of the registry file
///
/// ```yaml
/// projects:
///   foo: { name: foo, type: git, url: https://github.com/acme/foo.git }
/// groups:
///   backend: [foo, bar]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub projects: BTreeMap<String, Project>,

    #[serde(default)]
    pub groups: BTreeMap<String, Vec<String>>,
}

impl From<&Registry> for RegistryDocument {
    fn from(registry: &Registry) -> Self {
        Self {
            projects: registry
                .projects()
                .map(|project| (project.name.clone(), project.clone()))
                .collect(),
            groups: registry
                .groups()
                .map(|group| (group.name.clone(), group.members().to_vec()))
                .collect(),
        }
    }
}

impl From<RegistryDocument> for Registry {
    fn from(document: RegistryDocument) -> Self {
        let mut registry = Registry::new();
        for (key, mut project) in document.projects {
            // The map key is the project's identity
            project.name = key;
            registry.set_project(project);
        }
        for (name, members) in document.groups {
            registry.set_group(Group::with_members(name, members));
        }
        registry
    }
}

/// Loads and saves the registry as a YAML file
#[derive(Debug, Clone)]
pub struct RegistryStore {
    path: PathBuf,
}

impl RegistryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the registry
    ///
    /// A missing file yields an empty registry. A file that exists but cannot
    /// be parsed is an error so that a later save does not wipe it.
    pub fn load(&self) -> Result<Registry, RegistryStoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "Registry file not found, starting empty");
            return Ok(Registry::new());
        }

        let contents =
            fs::read_to_string(&self.path).map_err(|source| RegistryStoreError::ReadFailed {
                path: self.path.clone(),
                source,
            })?;

        if contents.trim().is_empty() {
            return Ok(Registry::new());
        }

        let document: RegistryDocument = serde_yaml::from_str(&contents).map_err(|source| {
            RegistryStoreError::YamlParsingFailed {
                path: self.path.clone(),
                source,
            }
        })?;

        debug!(
            path = %self.path.display(),
            projects = document.projects.len(),
            groups = document.groups.len(),
            "Loaded registry"
        );
        Ok(document.into())
    }

    /// Write the registry, creating parent directories as needed
    pub fn save(&self, registry: &Registry) -> Result<(), RegistryStoreError> {
        let document = RegistryDocument::from(registry);
        let yaml_content =
            serde_yaml::to_string(&document).map_err(RegistryStoreError::YamlSerializationFailed)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| RegistryStoreError::WriteFailed {
                path: self.path.clone(),
                source,
            })?;
        }

        fs::write(&self.path, yaml_content).map_err(|source| RegistryStoreError::WriteFailed {
            path: self.path.clone(),
            source,
        })?;

        debug!(path = %self.path.display(), "Saved registry");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::project_type::ProjectType;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_file_returns_empty_registry() {
        let temp_dir = TempDir::new().unwrap();
        let store = RegistryStore::new(temp_dir.path().join(".wildfire.yaml"));

        let registry = store.load().unwrap();
        assert_eq!(registry, Registry::new());
    }

    #[test]
    fn test_load_document_without_groups() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.yaml");
        fs::write(
            &path,
            "projects:\n  foo:\n    name: foo\n    type: gitlab\n    url: https://gitlab.com/acme/foo.git\n",
        )
        .unwrap();

        let registry = RegistryStore::new(&path).load().unwrap();
        let foo = registry.get_project("foo").unwrap();
        assert_eq!(foo.project_type, ProjectType::GitLab);
        assert_eq!(registry.groups().count(), 0);
    }

    #[test]
    fn test_group_may_reference_unknown_project() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.yaml");
        fs::write(&path, "groups:\n  web: [foo, zaz]\n").unwrap();

        let registry = RegistryStore::new(&path).load().unwrap();
        let web = registry.get_group("web").unwrap();
        assert_eq!(web.members(), &["foo".to_string(), "zaz".to_string()]);
        assert!(!registry.has_project("zaz"));
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.yaml");
        fs::write(&path, "projects: [this is: not: valid").unwrap();

        let result = RegistryStore::new(&path).load();
        assert!(matches!(
            result,
            Err(RegistryStoreError::YamlParsingFailed { .. })
        ));
    }

    #[test]
    fn test_save_then_load_preserves_group_order() {
        let temp_dir = TempDir::new().unwrap();
        let store = RegistryStore::new(temp_dir.path().join("nested").join("registry.yaml"));

        let mut registry = Registry::new();
        registry
            .add_project(Project::new("zaz", ProjectType::BitBucket, "https://bitbucket.org/acme/zaz"))
            .unwrap();
        registry.add_project(Project::git("foo", "https://github.com/acme/foo")).unwrap();
        registry.set_group(Group::with_members("web", ["zaz", "foo"]));

        store.save(&registry).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, registry);
        assert_eq!(
            loaded.get_group("web").unwrap().members(),
            &["zaz".to_string(), "foo".to_string()]
        );
    }

    #[test]
    fn test_saved_file_uses_type_key() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("registry.yaml");
        let mut registry = Registry::new();
        registry.add_project(Project::git("foo", "https://github.com/acme/foo")).unwrap();

        RegistryStore::new(&path).save(&registry).unwrap();
        let contents = fs::read_to_string(&path).unwrap();

        assert!(contents.contains("projects:"));
        assert!(contents.contains("type: git"));
        assert!(contents.contains("groups: {}"));
    }
}
