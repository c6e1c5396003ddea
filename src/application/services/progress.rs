use std::panic::{self, AssertUnwindSafe};

use tracing::warn;

/// 進捗通知のオブザーバー
///
/// オーケストレーターは一括処理の前に`start`、各作業単位の完了ごと（成功・失敗を問わず）に
/// `increment`、全作業単位の合流後に`complete`を呼ぶ。
/// 実装はブロックしてはならない。呼び出しは[`notify`]を経由するため、
/// 実装がパニックしても一括処理の結果には影響しない。
pub trait ProgressReporter: Send + Sync {
    /// 作業単位の総数を通知
    fn start(&self, total: u64);

    /// 作業単位が1つ完了した
    fn increment(&self);

    /// 全ての作業単位が完了した
    fn complete(&self);
}

/// 何もしない進捗通知（デフォルト）
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _total: u64) {}

    fn increment(&self) {}

    fn complete(&self) {}
}

/// 進捗通知を1回呼び出す
///
/// 通知先のパニックはここで捕捉してログに残し、呼び出し元には伝播させない。
pub fn notify<F: FnOnce()>(event: F) {
    if panic::catch_unwind(AssertUnwindSafe(event)).is_err() {
        warn!("Progress reporter panicked, event dropped");
    }
}
