use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::warn;

use crate::application::use_cases::pull_repositories::ProjectRepositoryService;
use crate::application::use_cases::run_command::{CommandLine, CommandRunReport, CommandRunner};
use crate::common::error::WildfireError;
use crate::common::result::{OptionExt, ResultExt, WildfireResult};
use crate::domain::entities::registry::RegistryError;
use crate::infrastructure::filesystem::registry_store::RegistryStore;
use crate::infrastructure::scm::{cloner::Cloner, git_cloner::GitCloner};
use crate::presentation::ui::{display::DisplayHelper, progress::IndicatifProgress};

/// Flags of `clone group`
#[derive(Debug, Clone, Default)]
pub struct CloneGroupOptions {
    /// Only clone these members
    pub some: Vec<String>,
    /// Clear an existing destination first
    pub force: bool,
    /// Concurrency cap for clones and commands
    pub jobs: Option<usize>,
    /// Command to run across the clones
    pub exec: Option<String>,
    /// Per-project time limit for the command, in seconds
    pub exec_timeout: Option<u64>,
    /// Projects whose command output is printed
    pub show_output: Vec<String>,
    /// Remove the clones at the end
    pub clean: bool,
}

/// Handler for the clone subcommands
pub struct CloneCommand<'a> {
    store: &'a RegistryStore,
    display: &'a DisplayHelper,
    cloner: Arc<dyn Cloner>,
}

impl<'a> CloneCommand<'a> {
    /// Use the libgit2 cloner, checking out `branch` when given
    pub fn new(store: &'a RegistryStore, display: &'a DisplayHelper, branch: Option<&str>) -> Self {
        let cloner = match branch {
            Some(branch) => GitCloner::new().with_branch(branch),
            None => GitCloner::new(),
        };
        Self::with_cloner(store, display, Arc::new(cloner))
    }

    pub fn with_cloner(
        store: &'a RegistryStore,
        display: &'a DisplayHelper,
        cloner: Arc<dyn Cloner>,
    ) -> Self {
        Self {
            store,
            display,
            cloner,
        }
    }

    /// Clone a single project into `<base>/<name>/<name>`
    ///
    /// A non-empty destination is only cleared with `force`. On failure only
    /// directories created by this call are removed.
    pub async fn project(&self, name: &str, path: Option<&Path>, force: bool) -> WildfireResult<()> {
        let registry = self.store.load()?;
        let project = registry
            .get_project(name)
            .ok_or_wildfire(RegistryError::ProjectNotFound(name.to_string()))?;

        let root = base_path(path)?.join(name);
        let destination = root.join(name);
        if is_non_empty_dir(&destination) {
            if !force {
                return Err(WildfireError::filesystem_error(
                    format!(
                        "destination '{}' already exists, use --force to clear it",
                        destination.display()
                    ),
                    Some(destination),
                ));
            }
            clear_path(&destination).with_filesystem_error(
                "failed to clear destination",
                Some(destination.clone()),
            )?;
        }
        let created_root = !root.exists();

        self.display.info(&format!(
            "Cloning project {}",
            self.display.format_project(name)
        ));

        let service = ProjectRepositoryService::new(&registry, self.cloner.clone());
        if let Err(e) = service.pull_project(&destination, project).await {
            self.clear_path_or_warn(if created_root { &root } else { &destination });
            return Err(WildfireError::clone_error(name, e));
        }

        self.display.success(&format!(
            "Project '{}' has been cloned to '{}'",
            name,
            self.display.format_path(&destination.display().to_string())
        ));
        Ok(())
    }

    /// Clone a group into `<base>/<group>/<project>` and optionally run a command across it
    pub async fn group(
        &self,
        name: &str,
        path: Option<&Path>,
        options: &CloneGroupOptions,
    ) -> WildfireResult<()> {
        let registry = self.store.load()?;
        let group = registry
            .get_group(name)
            .ok_or_wildfire(RegistryError::GroupNotFound(name.to_string()))?;

        let root = base_path(path)?.join(name);
        if root.exists() {
            if !options.force {
                return Err(WildfireError::filesystem_error(
                    format!(
                        "destination '{}' already exists, use --force to clear it",
                        root.display()
                    ),
                    Some(root),
                ));
            }
            clear_path(&root)
                .with_filesystem_error("failed to clear destination", Some(root.clone()))?;
        }

        let selected: Vec<String> = if options.some.is_empty() {
            group.members().to_vec()
        } else {
            self.display
                .info(&format!("Selected: {}", options.some.join(", ")));
            options.some.clone()
        };

        let progress = Arc::new(IndicatifProgress::new(self.display, "Cloning repositories:"));
        let mut service =
            ProjectRepositoryService::new(&registry, self.cloner.clone()).with_progress(progress);
        if let Some(jobs) = options.jobs {
            service = service.with_max_parallel(jobs);
        }

        let result = if options.some.is_empty() {
            service.pull_group(&root, group).await
        } else {
            service
                .pull_projects_from_group(&root, group, &options.some)
                .await
        };

        if let Err(e) = result {
            self.clear_path_or_warn(&root);
            return Err(e.into());
        }

        self.display.success(&format!(
            "Projects have been cloned to '{}'",
            self.display.format_path(&root.display().to_string())
        ));

        let mut command_error = None;
        if let Some(exec) = &options.exec {
            let command = CommandLine::parse(exec)?;
            let report = self.run_command(&root, &selected, &command, options).await;
            self.print_report(&selected, &report, &options.show_output);

            if !report.is_success() {
                command_error = Some(WildfireError::command_error(
                    format!("command failed for {} project(s)", report.failures().len()),
                    command.to_string(),
                    None,
                ));
            }
        }

        if options.clean {
            clear_path(&root)
                .with_filesystem_error("failed to remove clones", Some(root.clone()))?;
            self.display.info(&format!(
                "Clones have been removed from '{}'",
                root.display()
            ));
        }

        match command_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn run_command(
        &self,
        root: &Path,
        projects: &[String],
        command: &CommandLine,
        options: &CloneGroupOptions,
    ) -> CommandRunReport {
        self.display.info(&format!("Running '{}'", command));

        let progress = Arc::new(IndicatifProgress::new(self.display, "Running command:"));
        let mut runner = CommandRunner::new().with_progress(progress);
        if let Some(jobs) = options.jobs {
            runner = runner.with_max_parallel(jobs);
        }
        if let Some(timeout_seconds) = options.exec_timeout {
            runner = runner.with_timeout(timeout_seconds);
        }
        runner.run(root, projects, command).await
    }

    fn print_report(&self, projects: &[String], report: &CommandRunReport, show_output: &[String]) {
        for project in projects {
            match report.failures().get(project) {
                Some(message) => self
                    .display
                    .error(&format!("Project '{}' failed: {}", project, message)),
                None => self.display.success(&format!("Project '{}' is done.", project)),
            }
        }

        for project in show_output {
            match report.output(project) {
                Some(output) => {
                    println!("Printing output of last command for project: {}", project);
                    print!("{}", output);
                }
                None => self
                    .display
                    .warning(&format!("No output recorded for project '{}'", project)),
            }
        }
    }

    fn clear_path_or_warn(&self, path: &Path) {
        if let Err(e) = clear_path(path) {
            warn!(path = %path.display(), error = %e, "Failed to clean up destination");
            self.display.warning(&format!(
                "Failed to remove '{}': {}",
                path.display(),
                e
            ));
        }
    }
}

fn base_path(path: Option<&Path>) -> WildfireResult<PathBuf> {
    match path {
        Some(path) => Ok(path.to_path_buf()),
        None => env::current_dir()
            .with_filesystem_error("failed to resolve current directory", None),
    }
}

fn is_non_empty_dir(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Recursively delete `path`; a missing path is not an error
fn clear_path(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}
