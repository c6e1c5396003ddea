//! Test fixtures for creating test data
//!
//! Registries, registry files and local git repositories used as clone sources.

use std::fs;
use std::path::{Path, PathBuf};
use git2::{Repository, Signature};
use tempfile::TempDir;
use wildfire::domain::entities::{group::Group, project::Project, registry::Registry};
use wildfire::infrastructure::filesystem::registry_store::RegistryStore;

/// Test fixture for creating registries
pub struct RegistryFixture;

impl RegistryFixture {
    /// Registry containing git projects with the given names
    pub fn with_projects(names: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for name in names {
            registry
                .add_project(Project::git(*name, format!("https://github.com/acme/{}.git", name)))
                .unwrap();
        }
        registry
    }

    /// Registry with projects `foo` and `bar`, and group `g` = [foo, bar, zaz]
    pub fn with_dangling_member() -> (Registry, Group) {
        let registry = Self::with_projects(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo", "bar", "zaz"]);
        (registry, group)
    }
}

/// Temporary workspace holding a registry file
pub struct WorkspaceFixture {
    pub temp_dir: TempDir,
}

impl WorkspaceFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.path().join(".wildfire.yaml")
    }

    pub fn store(&self) -> RegistryStore {
        RegistryStore::new(self.config_path())
    }

    pub fn write_registry(&self, registry: &Registry) {
        self.store().save(registry).unwrap();
    }

    pub fn read_registry(&self) -> Registry {
        self.store().load().unwrap()
    }

    /// Create a git repository with one commit under `<workspace>/sources/<name>`
    /// and return its `file://` URL
    pub fn create_source_repository(&self, name: &str) -> String {
        let dir = self.path().join("sources").join(name);
        fs::create_dir_all(&dir).unwrap();

        let repo = Repository::init(&dir).unwrap();
        fs::write(dir.join("README.md"), format!("# {}\n", name)).unwrap();

        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README.md")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let signature = Signature::now("Test User", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
            .unwrap();

        format!("file://{}", dir.display())
    }
}
