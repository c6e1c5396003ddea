use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tokio::sync::{Mutex, Semaphore};
use tracing::{debug, info, warn};

use crate::application::services::progress::{notify, NoopProgress, ProgressReporter};
use crate::domain::entities::{group::Group, project::Project, registry::Registry};
use crate::infrastructure::scm::cloner::{CloneError, Cloner};

/// プロジェクト単位の失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PullFailure {
    /// グループのメンバーがレジストリに存在しない（グループ全体のプル）
    #[error("project '{0}' does not exist in configuration")]
    NotConfigured(String),

    /// 指定されたメンバーがレジストリに存在しない（部分プル）
    #[error("project '{0}' does not exist")]
    NotFound(String),

    /// 指定されたプロジェクトがグループのメンバーではない
    #[error("group does not contain project '{0}'")]
    NotGroupMember(String),

    /// クローンに失敗した（メッセージはClonerのものをそのまま保持）
    #[error("failed to clone project '{project}'. Error: {message}")]
    CloneFailed { project: String, message: String },
}

impl PullFailure {
    fn clone_failed(project: &str, error: CloneError) -> Self {
        Self::CloneFailed {
            project: project.to_string(),
            message: error.message().to_string(),
        }
    }

    /// 失敗したプロジェクト名
    pub fn project(&self) -> &str {
        match self {
            Self::NotConfigured(name) | Self::NotFound(name) | Self::NotGroupMember(name) => name,
            Self::CloneFailed { project, .. } => project,
        }
    }
}

/// 一括プルの集約エラー
///
/// 表示は各失敗の改行区切り。順序は作業単位の完了順で、保証されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatePullError {
    failures: Vec<PullFailure>,
}

impl AggregatePullError {
    pub fn new(failures: Vec<PullFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[PullFailure] {
        &self.failures
    }

    /// 失敗したプロジェクト名（記録順）
    pub fn failed_projects(&self) -> Vec<&str> {
        self.failures.iter().map(PullFailure::project).collect()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_failures(self) -> Vec<PullFailure> {
        self.failures
    }
}

impl fmt::Display for AggregatePullError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, failure) in self.failures.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for AggregatePullError {}

/// リポジトリの一括クローンを担うオーケストレーター
///
/// レジストリは読み取り専用で借用する。各呼び出しは独立しており、
/// 失敗の集約先は呼び出しごとに新しく作られる。
/// 作業単位はプロジェクトごとに`tokio::spawn`されたタスクで実行される。
pub struct ProjectRepositoryService<'a> {
    registry: &'a Registry,
    cloner: Arc<dyn Cloner>,
    progress: Arc<dyn ProgressReporter>,
    max_parallel: Option<usize>,
}

impl<'a> ProjectRepositoryService<'a> {
    /// 新しいProjectRepositoryServiceを作成（進捗通知なし、並列数無制限）
    pub fn new(registry: &'a Registry, cloner: Arc<dyn Cloner>) -> Self {
        Self {
            registry,
            cloner,
            progress: Arc::new(NoopProgress),
            max_parallel: None,
        }
    }

    /// 進捗通知先を設定
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// 同時に実行するクローン数の上限を設定（0は1として扱う）
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = Some(max_parallel.max(1));
        self
    }

    /// 単一プロジェクトを`path`にクローンする
    ///
    /// Clonerの結果をそのまま返す。
    pub async fn pull_project(&self, path: &Path, project: &Project) -> Result<(), CloneError> {
        self.cloner.clone_project(path, project).await
    }

    /// グループの全メンバーを`path/<project>`に並行してクローンする
    ///
    /// レジストリに存在しないメンバーはクローンせずに失敗として記録する。
    /// 1つの失敗が他のメンバーの処理を止めることはない。
    pub async fn pull_group(&self, path: &Path, group: &Group) -> Result<(), AggregatePullError> {
        info!(group = %group.name, projects = group.len(), path = %path.display(), "Pulling group");

        self.run_units(path, group.members(), |name| {
            self.registry
                .get_project(name)
                .cloned()
                .ok_or_else(|| PullFailure::NotConfigured(name.to_string()))
        })
        .await
    }

    /// グループのメンバーのうち`names`で指定したものだけをクローンする
    ///
    /// メンバーでない名前はレジストリを参照せずに失敗として記録する。
    /// 重複した名前は最初の1つだけを処理する。
    pub async fn pull_projects_from_group(
        &self,
        path: &Path,
        group: &Group,
        names: &[String],
    ) -> Result<(), AggregatePullError> {
        let mut seen = HashSet::new();
        let names: Vec<String> = names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();

        info!(
            group = %group.name,
            projects = names.len(),
            path = %path.display(),
            "Pulling projects from group"
        );

        self.run_units(path, &names, |name| {
            if !group.has_project(name) {
                return Err(PullFailure::NotGroupMember(name.to_string()));
            }

            self.registry
                .get_project(name)
                .cloned()
                .ok_or_else(|| PullFailure::NotFound(name.to_string()))
        })
        .await
    }

    /// プロジェクトごとに1つのタスクを起動し、全ての完了を待って失敗を集約する
    ///
    /// `resolve`は起動前に呼ばれ、クローン対象のプロジェクトか即時の失敗を返す。
    async fn run_units<F>(
        &self,
        path: &Path,
        names: &[String],
        resolve: F,
    ) -> Result<(), AggregatePullError>
    where
        F: Fn(&str) -> Result<Project, PullFailure>,
    {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let semaphore = self.max_parallel.map(|n| Arc::new(Semaphore::new(n)));

        notify(|| self.progress.start(names.len() as u64));

        let tasks: Vec<_> = names
            .iter()
            .map(|name| {
                let resolved = resolve(name.as_str());
                let destination = path.join(name);
                let name = name.clone();
                let cloner = self.cloner.clone();
                let progress = self.progress.clone();
                let failures = failures.clone();
                let semaphore = semaphore.clone();

                tokio::spawn(async move {
                    let _permit = match semaphore.as_ref() {
                        Some(semaphore) => semaphore.acquire().await.ok(),
                        None => None,
                    };

                    debug!(project = %name, "Starting unit of work");
                    let result = match resolved {
                        Ok(project) => cloner
                            .clone_project(&destination, &project)
                            .await
                            .map_err(|e| PullFailure::clone_failed(&name, e)),
                        Err(failure) => Err(failure),
                    };

                    match result {
                        Ok(()) => debug!(project = %name, "Unit of work succeeded"),
                        Err(failure) => {
                            warn!(project = %name, error = %failure, "Unit of work failed");
                            failures.lock().await.push(failure);
                        }
                    }
                    notify(|| progress.increment());
                })
            })
            .collect();

        let results = join_all(tasks).await;
        for (name, joined) in names.iter().zip(results) {
            if let Err(e) = joined {
                warn!(project = %name, error = %e, "Unit of work did not complete");
                failures.lock().await.push(PullFailure::CloneFailed {
                    project: name.clone(),
                    message: format!("clone task did not complete: {}", e),
                });
                notify(|| self.progress.increment());
            }
        }
        notify(|| self.progress.complete());

        let failures = std::mem::take(&mut *failures.lock().await);
        if failures.is_empty() {
            Ok(())
        } else {
            Err(AggregatePullError::new(failures))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU64, Ordering};

    mock! {
        pub TestCloner {}

        #[async_trait]
        impl Cloner for TestCloner {
            async fn clone_project(&self, path: &Path, project: &Project) -> Result<(), CloneError>;
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        total: AtomicU64,
        increments: AtomicU64,
        completions: AtomicU64,
    }

    impl ProgressReporter for CountingProgress {
        fn start(&self, total: u64) {
            self.total.store(total, Ordering::SeqCst);
        }

        fn increment(&self) {
            self.increments.fetch_add(1, Ordering::SeqCst);
        }

        fn complete(&self) {
            self.completions.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn registry_with(names: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for name in names {
            registry
                .add_project(Project::git(*name, format!("https://github.com/acme/{}", name)))
                .unwrap();
        }
        registry
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_pull_project_passes_through_cloner_result() {
        let registry = registry_with(&["foo"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(1)
            .returning(|_, _| Err(CloneError::new("boom")));

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        let project = registry.get_project("foo").unwrap();
        let error = service
            .pull_project(Path::new("/tmp/foo"), project)
            .await
            .unwrap_err();

        assert_eq!(error.message(), "boom");
    }

    #[tokio::test]
    async fn test_pull_group_success_reports_progress() {
        let registry = registry_with(&["foo", "bar", "zaz"]);
        let group = Group::with_members("g", ["foo", "bar", "zaz"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(3)
            .returning(|_, _| Ok(()));

        let progress = Arc::new(CountingProgress::default());
        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner))
            .with_progress(progress.clone());

        service.pull_group(Path::new("/work/g"), &group).await.unwrap();

        assert_eq!(progress.total.load(Ordering::SeqCst), 3);
        assert_eq!(progress.increments.load(Ordering::SeqCst), 3);
        assert_eq!(progress.completions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pull_group_clones_into_member_subdirectory() {
        let registry = registry_with(&["foo"]);
        let group = Group::with_members("g", ["foo"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .withf(|path, project| path == Path::new("/work/g/foo") && project.name == "foo")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        service.pull_group(Path::new("/work/g"), &group).await.unwrap();
    }

    #[tokio::test]
    async fn test_pull_group_missing_member_is_not_cloned() {
        let registry = registry_with(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo", "bar", "zaz"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .withf(|_, project| project.name != "zaz")
            .times(2)
            .returning(|_, _| Ok(()));

        let progress = Arc::new(CountingProgress::default());
        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner))
            .with_progress(progress.clone());

        let error = service
            .pull_group(Path::new("/work/g"), &group)
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string().trim(),
            "project 'zaz' does not exist in configuration"
        );
        assert_eq!(error.failures(), &[PullFailure::NotConfigured("zaz".to_string())]);
        assert_eq!(progress.increments.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_pull_group_clone_failures_do_not_stop_siblings() {
        let registry = registry_with(&["foo", "bar", "zaz"]);
        let group = Group::with_members("g", ["foo", "bar", "zaz"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(3)
            .returning(|_, project| {
                if project.name == "bar" {
                    Err(CloneError::new("repository not found"))
                } else {
                    Ok(())
                }
            });

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        let error = service
            .pull_group(Path::new("/work/g"), &group)
            .await
            .unwrap_err();

        assert_eq!(
            error.to_string(),
            "failed to clone project 'bar'. Error: repository not found"
        );
        assert_eq!(error.failed_projects(), vec!["bar"]);
    }

    #[tokio::test]
    async fn test_pull_group_aggregates_every_failure() {
        let registry = registry_with(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo", "bar"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(2)
            .returning(|_, _| Err(CloneError::new("network unreachable")));

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        let message = service
            .pull_group(Path::new("/work/g"), &group)
            .await
            .unwrap_err()
            .to_string();

        assert!(message.contains("failed to clone project 'foo'"));
        assert!(message.contains("failed to clone project 'bar'"));
        assert_eq!(message.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_successive_pulls_are_independent() {
        let registry = registry_with(&["foo"]);
        let group = Group::with_members("g", ["foo"]);
        let mut cloner = MockTestCloner::new();
        let mut calls = 0;
        cloner
            .expect_clone_project()
            .times(2)
            .returning(move |_, _| {
                calls += 1;
                if calls == 1 {
                    Err(CloneError::new("transient"))
                } else {
                    Ok(())
                }
            });

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        assert!(service.pull_group(Path::new("/a"), &group).await.is_err());
        // 前回の失敗は次の呼び出しに持ち越されない
        assert!(service.pull_group(Path::new("/b"), &group).await.is_ok());
    }

    #[tokio::test]
    async fn test_pull_empty_group_succeeds() {
        let registry = Registry::new();
        let group = Group::new("empty");
        let mut cloner = MockTestCloner::new();
        cloner.expect_clone_project().never();

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        assert!(service.pull_group(Path::new("/work"), &group).await.is_ok());
    }

    #[tokio::test]
    async fn test_subset_non_member_is_rejected_without_clone() {
        let registry = registry_with(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .withf(|_, project| project.name == "foo")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        let error = service
            .pull_projects_from_group(Path::new("/work/g"), &group, &names(&["foo", "bar"]))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "group does not contain project 'bar'");
    }

    #[tokio::test]
    async fn test_subset_member_missing_from_registry() {
        let registry = registry_with(&["foo"]);
        let group = Group::with_members("g", ["foo", "zaz"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        let error = service
            .pull_projects_from_group(Path::new("/work/g"), &group, &names(&["foo", "zaz"]))
            .await
            .unwrap_err();

        assert_eq!(error.failures(), &[PullFailure::NotFound("zaz".to_string())]);
        assert!(!error.to_string().contains("group does not contain"));
    }

    #[tokio::test]
    async fn test_subset_only_clones_requested_members() {
        let registry = registry_with(&["foo", "bar", "zaz"]);
        let group = Group::with_members("g", ["foo", "bar", "zaz"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .withf(|path, _| path == Path::new("/work/g/zaz"))
            .times(1)
            .returning(|_, _| Ok(()));

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner));
        service
            .pull_projects_from_group(Path::new("/work/g"), &group, &names(&["zaz"]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_max_parallel_still_runs_every_unit() {
        let registry = registry_with(&["a", "b", "c", "d"]);
        let group = Group::with_members("g", ["a", "b", "c", "d"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(4)
            .returning(|_, _| Ok(()));

        let progress = Arc::new(CountingProgress::default());
        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner))
            .with_progress(progress.clone())
            .with_max_parallel(0);

        service.pull_group(Path::new("/work/g"), &group).await.unwrap();
        assert_eq!(progress.increments.load(Ordering::SeqCst), 4);
    }

    struct PanickingProgress;

    impl ProgressReporter for PanickingProgress {
        fn start(&self, _total: u64) {
            panic!("start");
        }

        fn increment(&self) {
            panic!("increment");
        }

        fn complete(&self) {
            panic!("complete");
        }
    }

    #[tokio::test]
    async fn test_panicking_progress_does_not_change_result() {
        let registry = registry_with(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo", "bar", "zaz"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(2)
            .returning(|_, _| Ok(()));

        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner))
            .with_progress(Arc::new(PanickingProgress));
        let error = service
            .pull_group(Path::new("/work/g"), &group)
            .await
            .unwrap_err();

        assert_eq!(error.failures(), &[PullFailure::NotConfigured("zaz".to_string())]);
    }

    #[tokio::test]
    async fn test_subset_duplicate_names_are_cloned_once() {
        let registry = registry_with(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo", "bar"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .withf(|path, _| path == Path::new("/work/g/foo"))
            .times(1)
            .returning(|_, _| Ok(()));

        let progress = Arc::new(CountingProgress::default());
        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner))
            .with_progress(progress.clone());
        service
            .pull_projects_from_group(Path::new("/work/g"), &group, &names(&["foo", "foo"]))
            .await
            .unwrap();

        assert_eq!(progress.total.load(Ordering::SeqCst), 1);
        assert_eq!(progress.increments.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_panicking_cloner_is_recorded_as_failure() {
        let registry = registry_with(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo", "bar"]);
        let mut cloner = MockTestCloner::new();
        cloner
            .expect_clone_project()
            .times(2)
            .returning(|_, project| {
                if project.name == "bar" {
                    panic!("cloner bug");
                }
                Ok(())
            });

        let progress = Arc::new(CountingProgress::default());
        let service = ProjectRepositoryService::new(&registry, Arc::new(cloner))
            .with_progress(progress.clone());
        let error = service
            .pull_group(Path::new("/work/g"), &group)
            .await
            .unwrap_err();

        assert_eq!(error.failed_projects(), vec!["bar"]);
        assert!(error
            .to_string()
            .starts_with("failed to clone project 'bar'. Error: clone task did not complete"));
        assert_eq!(progress.increments.load(Ordering::SeqCst), 2);
    }

    /// 非同期本体の中でブロックするCloner
    struct BlockingCloner {
        barrier: std::sync::Barrier,
    }

    #[async_trait]
    impl Cloner for BlockingCloner {
        async fn clone_project(&self, _path: &Path, _project: &Project) -> Result<(), CloneError> {
            self.barrier.wait();
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_blocking_cloner_units_run_on_separate_tasks() {
        let registry = registry_with(&["foo", "bar"]);
        let group = Group::with_members("g", ["foo", "bar"]);
        // 2つの作業単位が別々のワーカーで動かない限りバリアを通過できない
        let cloner = Arc::new(BlockingCloner {
            barrier: std::sync::Barrier::new(2),
        });

        let service = ProjectRepositoryService::new(&registry, cloner);
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(10),
            service.pull_group(Path::new("/work/g"), &group),
        )
        .await
        .unwrap();

        assert!(result.is_ok());
    }

    #[test]
    fn test_aggregate_display_joins_with_newlines() {
        let error = AggregatePullError::new(vec![
            PullFailure::NotConfigured("zaz".to_string()),
            PullFailure::CloneFailed {
                project: "foo".to_string(),
                message: "denied".to_string(),
            },
        ]);

        assert_eq!(
            error.to_string(),
            "project 'zaz' does not exist in configuration\nfailed to clone project 'foo'. Error: denied"
        );
        assert_eq!(error.failed_projects(), vec!["zaz", "foo"]);
    }
}
