pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;
use std::process::exit;

use crate::common::result::WildfireResult;
use crate::domain::value_objects::project_type::ProjectType;
use crate::infrastructure::filesystem::registry_store::RegistryStore;
use crate::presentation::ui::display::DisplayHelper;
use commands::{
    clone::{CloneCommand, CloneGroupOptions},
    group::GroupCommand,
    project::ProjectCommand,
};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// Output format options for list commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// wildfire - keep a registry of projects, group them and clone whole groups at once
#[derive(Parser, Debug)]
#[command(name = "wildfire")]
#[command(about = "Keep a registry of projects, group them and clone whole groups at once")]
#[command(version = VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Registry file
    #[arg(long, global = true, env = "WILDFIRE_CONFIG", default_value = "./.wildfire.yaml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage projects in the registry
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Manage groups of projects
    Group {
        #[command(subcommand)]
        command: GroupCommands,
    },

    /// Clone a project or a whole group
    Clone {
        #[command(subcommand)]
        command: CloneCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Add a project to the registry
    Add {
        /// Project name, used to reference it from groups
        name: String,

        /// Project location type (git, gitlab, bitbucket)
        #[arg(value_name = "TYPE")]
        project_type: ProjectType,

        /// URL the project is cloned from
        url: String,
    },

    /// Update or create a project
    Set {
        name: String,

        #[arg(value_name = "TYPE")]
        project_type: ProjectType,

        url: String,

        /// Overwrite an existing project without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Remove projects from the registry and from every group
    Remove {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List registered projects
    List {
        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },
}

#[derive(Subcommand, Debug)]
pub enum GroupCommands {
    /// Create a group, optionally with initial projects
    Create {
        name: String,

        /// Projects to add (all must exist in the registry)
        projects: Vec<String>,
    },

    /// Delete a group
    Delete { name: String },

    /// List groups
    List {
        /// Output format (text, json, yaml)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,
    },

    /// Add projects to a group
    AddProject {
        name: String,

        #[arg(required = true)]
        projects: Vec<String>,
    },

    /// Remove projects from a group
    RemoveProject {
        name: String,

        #[arg(required = true)]
        projects: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum CloneCommands {
    /// Clone a single project into <path>/<name>/<name>
    Project {
        name: String,

        /// Base directory (defaults to current directory)
        path: Option<PathBuf>,

        /// Clear the destination if it is not empty
        #[arg(short, long)]
        force: bool,

        /// Branch to check out instead of the remote HEAD
        #[arg(short, long)]
        branch: Option<String>,
    },

    /// Clone the projects of a group into <path>/<group>/<project>
    Group {
        name: String,

        /// Base directory (defaults to current directory)
        path: Option<PathBuf>,

        /// Only clone these members of the group
        #[arg(short, long, num_args = 1..)]
        some: Vec<String>,

        /// Clear the destination if it already exists
        #[arg(short, long)]
        force: bool,

        /// Branch to check out in every project
        #[arg(short, long)]
        branch: Option<String>,

        /// Maximum number of concurrent clones
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Command to run in every cloned project afterwards
        #[arg(short, long)]
        exec: Option<String>,

        /// Per-project time limit for the command, in seconds
        #[arg(long, value_name = "SECONDS", requires = "exec")]
        exec_timeout: Option<u64>,

        /// Print the command output of these projects
        #[arg(long, num_args = 1.., requires = "exec")]
        show_output: Vec<String>,

        /// Remove the clones when done
        #[arg(long)]
        clean: bool,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn from_cli(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let display = DisplayHelper::detect(self.cli.no_color);
        colored::control::set_override(display.use_color);

        match self.handle_command(&display).await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self, display: &DisplayHelper) -> WildfireResult<()> {
        let store = RegistryStore::new(&self.cli.config);

        match &self.cli.command {
            Commands::Project { command } => {
                let handler = ProjectCommand::new(&store, display);
                match command {
                    ProjectCommands::Add {
                        name,
                        project_type,
                        url,
                    } => handler.add(name, *project_type, url),
                    ProjectCommands::Set {
                        name,
                        project_type,
                        url,
                        yes,
                    } => handler.set(name, *project_type, url, *yes),
                    ProjectCommands::Remove { names } => handler.remove(names),
                    ProjectCommands::List { output } => handler.list(*output),
                }
            }
            Commands::Group { command } => {
                let handler = GroupCommand::new(&store, display);
                match command {
                    GroupCommands::Create { name, projects } => handler.create(name, projects),
                    GroupCommands::Delete { name } => handler.delete(name),
                    GroupCommands::List { output } => handler.list(*output),
                    GroupCommands::AddProject { name, projects } => {
                        handler.add_projects(name, projects)
                    }
                    GroupCommands::RemoveProject { name, projects } => {
                        handler.remove_projects(name, projects)
                    }
                }
            }
            Commands::Clone { command } => match command {
                CloneCommands::Project {
                    name,
                    path,
                    force,
                    branch,
                } => {
                    CloneCommand::new(&store, display, branch.as_deref())
                        .project(name, path.as_deref(), *force)
                        .await
                }
                CloneCommands::Group {
                    name,
                    path,
                    some,
                    force,
                    branch,
                    jobs,
                    exec,
                    exec_timeout,
                    show_output,
                    clean,
                } => {
                    let options = CloneGroupOptions {
                        some: some.clone(),
                        force: *force,
                        jobs: *jobs,
                        exec: exec.clone(),
                        exec_timeout: *exec_timeout,
                        show_output: show_output.clone(),
                        clean: *clean,
                    };
                    CloneCommand::new(&store, display, branch.as_deref())
                        .group(name, path.as_deref(), &options)
                        .await
                }
            },
        }
    }
}
