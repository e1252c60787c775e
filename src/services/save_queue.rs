//! 后台保存队列 - 业务能力层
//!
//! 每次状态变更把完整快照放进队列，由唯一的后台任务按入队顺序逐个保存。
//! 调用方从不等待保存完成；因为顺序不变，最后完成的保存总是最新的完整状态。

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::clients::QuizApiClient;
use crate::models::ProgressState;

enum SaveCommand {
    Persist(Box<ProgressState>),
    Flush(oneshot::Sender<()>),
}

/// 保存统计
#[derive(Debug, Default)]
struct SaveCounters {
    enqueued: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

/// 保存统计快照
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveStats {
    pub enqueued: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// 后台保存队列
///
/// 克隆后共享同一个后台任务。
#[derive(Clone)]
pub struct SaveQueue {
    sender: mpsc::UnboundedSender<SaveCommand>,
    counters: Arc<SaveCounters>,
}

impl SaveQueue {
    /// 启动后台任务，需要在 tokio 运行时内调用
    pub fn spawn(client: QuizApiClient) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let counters = Arc::new(SaveCounters::default());

        tokio::spawn(run_worker(client, receiver, counters.clone()));

        Self { sender, counters }
    }

    /// 放入一份完整快照，立即返回
    pub fn enqueue(&self, state: ProgressState) {
        self.counters.enqueued.fetch_add(1, Ordering::SeqCst);
        if self
            .sender
            .send(SaveCommand::Persist(Box::new(state)))
            .is_err()
        {
            warn!("⚠️ 保存队列已关闭，本次状态未保存");
            self.counters.failed.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// 等待此前入队的保存全部处理完
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.sender.send(SaveCommand::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    pub fn stats(&self) -> SaveStats {
        SaveStats {
            enqueued: self.counters.enqueued.load(Ordering::SeqCst),
            succeeded: self.counters.succeeded.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
        }
    }
}

async fn run_worker(
    client: QuizApiClient,
    mut receiver: mpsc::UnboundedReceiver<SaveCommand>,
    counters: Arc<SaveCounters>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            SaveCommand::Persist(state) => match client.save_state(&state).await {
                Ok(()) => {
                    counters.succeeded.fetch_add(1, Ordering::SeqCst);
                    debug!("✓ 后台保存完成 ({})", state.last_updated.to_rfc3339());
                }
                Err(e) => {
                    counters.failed.fetch_add(1, Ordering::SeqCst);
                    warn!("⚠️ 后台保存失败: {}", e);
                }
            },
            SaveCommand::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("保存队列已退出");
}
