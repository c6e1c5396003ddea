use std::collections::BTreeMap;

use super::{print_structured, update_registry};
use crate::common::error::WildfireError;
use crate::common::result::{OptionExt, WildfireResult};
use crate::domain::entities::registry::{Registry, RegistryError};
use crate::infrastructure::filesystem::registry_store::RegistryStore;
use crate::presentation::cli::OutputFormat;
use crate::presentation::ui::display::DisplayHelper;

/// Handler for the group subcommands
pub struct GroupCommand<'a> {
    store: &'a RegistryStore,
    display: &'a DisplayHelper,
}

impl<'a> GroupCommand<'a> {
    pub fn new(store: &'a RegistryStore, display: &'a DisplayHelper) -> Self {
        Self { store, display }
    }

    /// Create a group with optional initial members
    ///
    /// Nothing is saved unless every listed project exists.
    pub fn create(&self, name: &str, projects: &[String]) -> WildfireResult<()> {
        update_registry(self.store, self.display, |registry| {
            if registry.has_group(name) {
                return Err(RegistryError::GroupAlreadyExists(name.to_string()).into());
            }
            self.ensure_projects_exist(registry, projects)?;

            registry.create_group(name)?;
            self.display.success(&format!("Group '{}' has been created", name));
            self.add_members(registry, name, projects)?;
            Ok(true)
        })
    }

    pub fn delete(&self, name: &str) -> WildfireResult<()> {
        update_registry(self.store, self.display, |registry| {
            registry.delete_group(name)?;
            self.display.success(&format!("Group '{}' has been deleted", name));
            Ok(true)
        })
    }

    pub fn list(&self, output: OutputFormat) -> WildfireResult<()> {
        let registry = self.store.load()?;

        if output != OutputFormat::Text {
            let groups: BTreeMap<&str, &[String]> = registry
                .groups()
                .map(|group| (group.name.as_str(), group.members()))
                .collect();
            return print_structured(&groups, output);
        }

        let names = registry.group_names();
        if names.is_empty() {
            println!("No groups were found in configuration.");
            return Ok(());
        }

        println!("Found {} groups in configuration:", names.len());
        for group in registry.groups() {
            println!("- {} ({} projects)", group.name, group.len());
        }
        Ok(())
    }

    /// Add projects to an existing group; all-or-nothing
    pub fn add_projects(&self, name: &str, projects: &[String]) -> WildfireResult<()> {
        update_registry(self.store, self.display, |registry| {
            registry
                .get_group(name)
                .ok_or_wildfire(RegistryError::GroupNotFound(name.to_string()))?;
            self.ensure_projects_exist(registry, projects)?;

            self.add_members(registry, name, projects)?;
            Ok(true)
        })
    }

    pub fn remove_projects(&self, name: &str, projects: &[String]) -> WildfireResult<()> {
        update_registry(self.store, self.display, |registry| {
            let mut changed = false;
            for project in projects {
                if registry.remove_project_from_group(name, project)? {
                    changed = true;
                    self.display.success(&format!(
                        "Project '{}' has been removed from group '{}'",
                        project, name
                    ));
                } else {
                    self.display.warning(&format!(
                        "Project '{}' is not part of group '{}'",
                        project, name
                    ));
                }
            }
            Ok(changed)
        })
    }

    fn ensure_projects_exist(&self, registry: &Registry, projects: &[String]) -> WildfireResult<()> {
        let missing: Vec<&str> = projects
            .iter()
            .filter(|project| !registry.has_project(project))
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            return Ok(());
        }

        for project in &missing {
            self.display.error(&format!(
                "Project '{}' does not exist in this configuration.",
                project
            ));
        }
        Err(WildfireError::validation_error(
            "projects",
            "group was not updated, resolve issues and try again",
            Some(missing.join(", ")),
        ))
    }

    fn add_members(&self, registry: &mut Registry, name: &str, projects: &[String]) -> WildfireResult<()> {
        for project in projects {
            if registry.add_project_to_group(name, project)? {
                self.display.success(&format!(
                    "Project '{}' has been added to group '{}'",
                    project, name
                ));
            } else {
                self.display.warning(&format!(
                    "Project '{}' is already part of group '{}'",
                    project, name
                ));
            }
        }
        Ok(())
    }
}
