use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::application::services::progress::{notify, NoopProgress, ProgressReporter};
use crate::infrastructure::process::command_executor::{CommandExecutor, ExecutionConfig};

/// コマンドライン解析のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandLineError {
    #[error("command is empty")]
    Empty,

    #[error("unterminated quote in command")]
    UnterminatedQuote,

    #[error("unexpected quote at position {0} in command")]
    UnexpectedQuote(usize),
}

/// 実行するプログラムと引数
///
/// シェルは経由しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// 空白区切りのコマンド文字列を解析する
    ///
    /// フィールドの先頭にある`"`から対応する`"`までは1つの引数になり、
    /// クォート内の`""`はリテラルの`"`になる。連続する空白は1つの区切りとして扱う。
    pub fn parse(input: &str) -> Result<Self, CommandLineError> {
        let mut fields: Vec<String> = Vec::new();
        let mut chars = input.char_indices().peekable();

        loop {
            while chars.next_if(|(_, c)| *c == ' ').is_some() {}

            let Some(&(_, first)) = chars.peek() else {
                break;
            };

            let mut field = String::new();
            if first == '"' {
                chars.next();
                loop {
                    match chars.next() {
                        Some((_, '"')) => {
                            if chars.next_if(|(_, c)| *c == '"').is_some() {
                                field.push('"');
                                continue;
                            }
                            match chars.peek() {
                                None | Some((_, ' ')) => break,
                                Some(&(position, _)) => {
                                    return Err(CommandLineError::UnexpectedQuote(position - 1))
                                }
                            }
                        }
                        Some((_, c)) => field.push(c),
                        None => return Err(CommandLineError::UnterminatedQuote),
                    }
                }
            } else {
                while let Some((position, c)) = chars.next_if(|(_, c)| *c != ' ') {
                    if c == '"' {
                        return Err(CommandLineError::UnexpectedQuote(position));
                    }
                    field.push(c);
                }
            }
            fields.push(field);
        }

        let mut fields = fields.into_iter();
        let program = fields.next().ok_or(CommandLineError::Empty)?;
        if program.is_empty() {
            return Err(CommandLineError::Empty);
        }

        Ok(Self {
            program,
            args: fields.collect(),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl FromStr for CommandLine {
    type Err = CommandLineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(' ') || arg.contains('"') {
                write!(f, " \"{}\"", arg.replace('"', "\"\""))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// 全プロジェクトでのコマンド実行結果
///
/// キーはプロジェクト名そのもの（大文字小文字は変換しない）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandRunReport {
    outputs: BTreeMap<String, String>,
    failures: BTreeMap<String, String>,
}

impl CommandRunReport {
    /// プロジェクトの標準出力（コマンドが起動しなかった場合はNone）
    pub fn output(&self, project: &str) -> Option<&str> {
        self.outputs.get(project).map(String::as_str)
    }

    /// 出力が記録されたプロジェクト名（名前順）
    pub fn project_names(&self) -> Vec<&str> {
        self.outputs.keys().map(String::as_str).collect()
    }

    /// 失敗したプロジェクトとそのメッセージ
    pub fn failures(&self) -> &BTreeMap<String, String> {
        &self.failures
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// クローン済みの各プロジェクトのディレクトリでコマンドを並行実行する
pub struct CommandRunner {
    progress: Arc<dyn ProgressReporter>,
    max_parallel: Option<usize>,
    timeout_seconds: Option<u64>,
}

impl Default for CommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRunner {
    pub fn new() -> Self {
        Self {
            progress: Arc::new(NoopProgress),
            max_parallel: None,
            timeout_seconds: None,
        }
    }

    /// 進捗通知先を設定
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// 同時実行数の上限を設定
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = Some(max_parallel.max(1));
        self
    }

    /// プロジェクトごとの実行時間の上限を設定（秒）
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// `base/<project>`を作業ディレクトリとして`command`を実行する
    ///
    /// 起動に失敗したか0以外で終了したプロジェクトは失敗として記録し、
    /// 他のプロジェクトの実行は継続する。起動できた場合の標準出力は常に保持する。
    pub async fn run(
        &self,
        base: &Path,
        projects: &[String],
        command: &CommandLine,
    ) -> CommandRunReport {
        info!(command = %command, projects = projects.len(), "Running command");

        let outputs = Arc::new(Mutex::new(BTreeMap::new()));
        let failures = Arc::new(Mutex::new(BTreeMap::new()));
        let semaphore = self.max_parallel.map(|n| Arc::new(Semaphore::new(n)));

        notify(|| self.progress.start(projects.len() as u64));

        let tasks: Vec<_> = projects
            .iter()
            .map(|project| {
                let project = project.clone();
                let mut config = ExecutionConfig::new().with_working_directory(base.join(&project));
                if let Some(timeout_seconds) = self.timeout_seconds {
                    config = config.with_timeout(timeout_seconds);
                }
                let command = command.clone();
                let progress = self.progress.clone();
                let outputs = outputs.clone();
                let failures = failures.clone();
                let semaphore = semaphore.clone();

                tokio::spawn(async move {
                    let _permit = match semaphore.as_ref() {
                        Some(semaphore) => semaphore.acquire().await.ok(),
                        None => None,
                    };

                    match CommandExecutor::execute(command.program(), command.args(), &config).await
                    {
                        Ok(result) => {
                            debug!(
                                project = %project,
                                exit_code = result.exit_code,
                                elapsed_ms = result.execution_time_ms,
                                "Command finished"
                            );
                            if !result.success {
                                let message = match result.stderr.trim() {
                                    "" => format!("exit status {}", result.exit_code),
                                    stderr => {
                                        format!("exit status {}: {}", result.exit_code, stderr)
                                    }
                                };
                                warn!(project = %project, error = %message, "Command failed");
                                failures.lock().await.insert(project.clone(), message);
                            }
                            outputs.lock().await.insert(project, result.stdout);
                        }
                        Err(e) => {
                            warn!(project = %project, error = %e, "Command failed");
                            failures.lock().await.insert(project, e.to_string());
                        }
                    }

                    notify(|| progress.increment());
                })
            })
            .collect();

        let results = join_all(tasks).await;
        for (project, joined) in projects.iter().zip(results) {
            if let Err(e) = joined {
                warn!(project = %project, error = %e, "Command task did not complete");
                failures
                    .lock()
                    .await
                    .insert(project.clone(), format!("command task did not complete: {}", e));
                notify(|| self.progress.increment());
            }
        }
        notify(|| self.progress.complete());

        let outputs = std::mem::take(&mut *outputs.lock().await);
        let failures = std::mem::take(&mut *failures.lock().await);
        CommandRunReport { outputs, failures }
    }
}
