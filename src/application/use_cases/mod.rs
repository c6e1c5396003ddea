pub mod pull_repositories;
pub mod run_command;

pub use pull_repositories::{AggregatePullError, ProjectRepositoryService, PullFailure};
pub use run_command::{CommandLine, CommandLineError, CommandRunReport, CommandRunner};
