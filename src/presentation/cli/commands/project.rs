use super::{print_structured, update_registry};
use crate::common::result::WildfireResult;
use crate::domain::entities::project::Project;
use crate::domain::value_objects::project_type::ProjectType;
use crate::infrastructure::filesystem::registry_store::RegistryStore;
use crate::presentation::cli::OutputFormat;
use crate::presentation::ui::display::DisplayHelper;

/// Handler for the project subcommands
pub struct ProjectCommand<'a> {
    store: &'a RegistryStore,
    display: &'a DisplayHelper,
}

impl<'a> ProjectCommand<'a> {
    pub fn new(store: &'a RegistryStore, display: &'a DisplayHelper) -> Self {
        Self { store, display }
    }

    /// Add a new project; fails if the name is taken
    pub fn add(&self, name: &str, project_type: ProjectType, url: &str) -> WildfireResult<()> {
        update_registry(self.store, self.display, |registry| {
            let project = registry.add_project(Project::new(name, project_type, url))?;
            self.print_project("Adding new project!", project);
            Ok(true)
        })
    }

    /// Update or create a project
    ///
    /// Overwriting an existing project needs `yes`; otherwise nothing changes.
    pub fn set(
        &self,
        name: &str,
        project_type: ProjectType,
        url: &str,
        yes: bool,
    ) -> WildfireResult<()> {
        update_registry(self.store, self.display, |registry| {
            if registry.has_project(name) && !yes {
                self.display.warning(&format!(
                    "Project '{}' already exists. Re-run with --yes to overwrite it.",
                    name
                ));
                return Ok(false);
            }

            let project = Project::new(name, project_type, url);
            self.print_project("Setting project!", &project);
            registry.set_project(project);
            Ok(true)
        })
    }

    /// Remove projects and sweep them out of every group
    pub fn remove(&self, names: &[String]) -> WildfireResult<()> {
        update_registry(self.store, self.display, |registry| {
            let mut changed = false;
            for name in names {
                if registry.remove_project(name).is_some() {
                    changed = true;
                    self.display.success(&format!(
                        "Removed project: {}",
                        self.display.format_project(name)
                    ));
                } else {
                    self.display.warning(&format!(
                        "Project '{}' does not exist in configuration.",
                        name
                    ));
                }

                for group in registry.remove_project_from_groups(name) {
                    changed = true;
                    self.display
                        .print_indented(&format!("Removed project '{}' from group '{}'", name, group), 1);
                }
            }
            Ok(changed)
        })
    }

    /// List registered projects
    pub fn list(&self, output: OutputFormat) -> WildfireResult<()> {
        let registry = self.store.load()?;
        let projects: Vec<&Project> = registry.projects().collect();

        if output != OutputFormat::Text {
            return print_structured(&projects, output);
        }

        if projects.is_empty() {
            println!("No projects were found in configuration.");
            return Ok(());
        }

        println!("Found {} projects in configuration:", projects.len());
        for project in projects {
            println!(
                "- {} ({}) {}",
                self.display.format_project(&project.name),
                project.project_type,
                project.url
            );
        }
        Ok(())
    }

    fn print_project(&self, headline: &str, project: &Project) {
        self.display.info(headline);
        self.display.print_indented(&format!("-> Name: {}", project.name), 1);
        self.display
            .print_indented(&format!("-> Type: {}", project.project_type), 1);
        self.display.print_indented(&format!("-> URL: {}", project.url), 1);
    }
}
