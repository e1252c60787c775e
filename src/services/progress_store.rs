//! 进度存储 - 业务能力层
//!
//! 唯一持有并修改进度状态。每次修改后把完整快照交给后台保存队列，
//! 保存失败只记录日志，不影响内存中的修改。

use std::path::Path;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::clients::QuizApiClient;
use crate::error::{AppError, AppResult};
use crate::models::{AttemptRecord, Filter, Progress, ProgressState};
use crate::services::save_queue::{SaveQueue, SaveStats};

/// 进度存储
pub struct ProgressStore {
    client: QuizApiClient,
    state: ProgressState,
    save_queue: SaveQueue,
}

impl ProgressStore {
    /// 创建新的进度存储，状态为空，需要在 tokio 运行时内调用
    pub fn new(client: QuizApiClient) -> Self {
        let save_queue = SaveQueue::spawn(client.clone());
        Self {
            client,
            state: ProgressState::default(),
            save_queue,
        }
    }

    /// 当前状态（只读）
    pub fn snapshot(&self) -> &ProgressState {
        &self.state
    }

    /// 从服务端加载状态
    ///
    /// 任何失败（网络、解析、404）都保留当前状态，首次使用时这是正常路径。
    /// 返回是否成功合并。
    pub async fn load(&mut self) -> bool {
        let document = match self.client.fetch_state_document().await {
            Ok(document) => document,
            Err(e) => {
                debug!("未加载到已保存的状态，使用默认值: {}", e);
                return false;
            }
        };

        match self.state.merge_document(&document) {
            Ok(()) => {
                info!(
                    "✓ 已恢复进度: {} 条作答记录, {} 个复习标记",
                    self.state.attempted_questions.len(),
                    self.state.marked_for_review.len()
                );
                true
            }
            Err(e) => {
                warn!("⚠️ 已保存的状态无法解析，使用默认值: {}", e);
                false
            }
        }
    }

    /// 从用户提供的 JSON 文本加载状态，失败时当前状态不变
    pub fn load_from_file(&mut self, contents: &str) -> bool {
        let result = serde_json::from_str::<serde_json::Value>(contents)
            .map_err(AppError::from)
            .and_then(|document| self.state.merge_document(&document));

        match result {
            Ok(()) => {
                info!("✓ 已从文件导入进度");
                true
            }
            Err(e) => {
                warn!("⚠️ 导入进度失败: {}", e);
                false
            }
        }
    }

    /// 从本地文件路径导入
    pub async fn load_from_path(&mut self, path: impl AsRef<Path>) -> AppResult<bool> {
        let path = path.as_ref();
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Ok(self.load_from_file(&contents))
    }

    /// 导出到本地文件（格式化 JSON）
    pub async fn export_to_path(&self, path: impl AsRef<Path>) -> AppResult<()> {
        let path = path.as_ref();
        let contents = serde_json::to_string_pretty(&self.state)?;
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;
        info!("✓ 进度已导出至: {}", path.display());
        Ok(())
    }

    /// 立即保存到服务端，返回是否成功
    pub async fn save(&mut self) -> bool {
        self.state.last_updated = Utc::now();
        match self.client.save_state(&self.state).await {
            Ok(()) => true,
            Err(e) => {
                warn!("⚠️ 保存进度失败: {}", e);
                false
            }
        }
    }

    /// 记录作答结果（覆盖已有记录），随后后台保存
    pub fn record_attempt(&mut self, question_id: &str, selected_option: &str, is_correct: bool) {
        self.state.attempted_questions.insert(
            question_id.to_string(),
            AttemptRecord::new(selected_option, is_correct),
        );
        self.persist_in_background();
    }

    pub fn is_attempted(&self, question_id: &str) -> bool {
        self.state
            .attempted_questions
            .get(question_id)
            .is_some_and(|record| record.attempted)
    }

    pub fn attempt_result(&self, question_id: &str) -> Option<&AttemptRecord> {
        self.state.attempted_questions.get(question_id)
    }

    pub fn mark_for_review(&mut self, question_id: &str) {
        self.state.marked_for_review.insert(question_id.to_string());
        self.persist_in_background();
    }

    pub fn unmark_for_review(&mut self, question_id: &str) {
        self.state.marked_for_review.remove(question_id);
        self.persist_in_background();
    }

    pub fn is_marked_for_review(&self, question_id: &str) -> bool {
        self.state.marked_for_review.contains(question_id)
    }

    /// 切换复习标记，返回切换后的状态
    pub fn toggle_review(&mut self, question_id: &str) -> bool {
        if self.is_marked_for_review(question_id) {
            self.unmark_for_review(question_id);
            false
        } else {
            self.mark_for_review(question_id);
            true
        }
    }

    pub fn set_current_filter(&mut self, filter: Filter) {
        self.state.current_filter = filter;
        self.persist_in_background();
    }

    pub fn set_current_question_index(&mut self, index: usize) {
        self.state.current_question_index = index;
        self.persist_in_background();
    }

    /// 计算进度，`total_questions` 为当前题目列表长度
    pub fn progress(&self, total_questions: usize) -> Progress {
        self.state.progress(total_questions)
    }

    /// 等待后台保存全部完成
    pub async fn flush(&self) {
        self.save_queue.flush().await;
    }

    pub fn save_stats(&self) -> SaveStats {
        self.save_queue.stats()
    }

    fn persist_in_background(&mut self) {
        self.state.last_updated = Utc::now();
        self.save_queue.enqueue(self.state.clone());
    }
}
