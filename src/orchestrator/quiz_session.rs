//! 答题会话 - 编排层
//!
//! ## 职责
//!
//! 组合数据网关、筛选控制器和进度存储：
//! 持有当前题目列表和题目指针，把提交的答案写入进度存储，并重新计算进度。
//!
//! ## 数据流
//!
//! - 读：网关 → 会话 → 调用方
//! - 写：用户操作 → 会话 → 进度存储 → 后台保存

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::clients::QuizApiClient;
use crate::config::{Config, StartupOptions};
use crate::error::AppResult;
use crate::infrastructure::ReqwestTransport;
use crate::models::{Filter, Progress, Question};
use crate::services::{FilterController, ProgressStore, QuestionList, RemoteDataGateway};
use crate::utils::logging::{log_progress, log_question};
use crate::workflow::{evaluate, QuestionState, SubmitOutcome};

/// 答题会话
pub struct QuizSession {
    options: StartupOptions,
    gateway: Arc<RemoteDataGateway>,
    filters: FilterController,
    store: ProgressStore,
    questions: QuestionList,
    current_index: usize,
    state: QuestionState,
}

impl QuizSession {
    /// 创建会话，需要在 tokio 运行时内调用
    pub fn new(client: QuizApiClient, options: StartupOptions) -> Self {
        let gateway = Arc::new(RemoteDataGateway::new(client.clone()));
        Self {
            options,
            filters: FilterController::new(gateway.clone()),
            gateway,
            store: ProgressStore::new(client),
            questions: Arc::new(Vec::new()),
            current_index: 0,
            state: QuestionState::default(),
        }
    }

    /// 按配置连接题库服务
    pub fn connect(config: &Config, options: StartupOptions) -> Self {
        let transport = Arc::new(ReqwestTransport::new(config.server_url.clone()));
        Self::new(QuizApiClient::new(transport), options)
    }

    /// 启动：恢复进度、恢复筛选、加载题目
    ///
    /// 启动参数中的筛选优先；否则使用保存的筛选。
    /// 只有筛选与保存的一致时才恢复题目指针。
    pub async fn start(&mut self) -> Progress {
        self.store.load().await;

        let saved_filter = self.store.snapshot().current_filter.clone();
        let saved_index = self.store.snapshot().current_question_index;
        let requested = self
            .options
            .initial_filter
            .clone()
            .unwrap_or_else(|| saved_filter.clone())
            .normalized();

        self.filters.set_filter(&requested).await;
        let filter = self.filters.current_filter();

        self.questions = self.gateway.load_questions(&filter).await;

        let index = if filter == saved_filter {
            saved_index
        } else {
            self.store.set_current_filter(filter.clone());
            0
        };
        self.move_to(self.clamp(index));

        if self.questions.is_empty() {
            warn!("⚠️ 没有可用的题目 {}", filter);
        }

        if self.options.jump_to_next_unattempted && self.jump_to_next_unattempted().is_none() {
            info!("所有题目都已作答");
        }

        let progress = self.progress();
        log_progress(&progress);
        progress
    }

    // ========== 筛选 ==========

    pub fn filters(&self) -> &FilterController {
        &self.filters
    }

    /// 用于逐级选择 subject / division / chapter，选好后调用 `apply_selected_filter`
    pub fn filters_mut(&mut self) -> &mut FilterController {
        &mut self.filters
    }

    /// 应用筛选控制器中当前的选择
    pub async fn apply_selected_filter(&mut self) -> Progress {
        let filter = self.filters.apply_filter();
        self.change_filter(filter).await
    }

    /// 直接应用一个筛选条件
    pub async fn apply_filter(&mut self, filter: Filter) -> Progress {
        self.filters.set_filter(&filter.normalized()).await;
        self.apply_selected_filter().await
    }

    /// 清空筛选
    pub async fn reset_filter(&mut self) -> Progress {
        let filter = self.filters.reset_filter();
        self.change_filter(filter).await
    }

    /// 筛选变化：指针回到 0，重新加载题目并重新计算进度
    async fn change_filter(&mut self, filter: Filter) -> Progress {
        self.store.set_current_filter(filter.clone());
        self.questions = self.gateway.load_questions(&filter).await;
        if self.questions.is_empty() {
            warn!("⚠️ 没有可用的题目 {}", filter);
        }

        self.current_index = 0;
        self.store.set_current_question_index(0);
        self.load_current_question();

        let progress = self.progress();
        log_progress(&progress);
        progress
    }

    // ========== 当前题目 ==========

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    pub fn current_state(&self) -> &QuestionState {
        &self.state
    }

    pub fn is_zen_mode(&self) -> bool {
        self.options.zen_mode
    }

    /// 选择选项（选择题，只在未作答时有效，不保存）
    pub fn select_option(&mut self, option_id: &str) -> bool {
        let Some(question) = self.current_question() else {
            return false;
        };
        if !question.is_option_based() {
            debug!("填空题不接受选项: {}", option_id);
            return false;
        }
        if !question.options.is_empty() && !question.options.iter().any(|o| o.id == option_id) {
            debug!("忽略未知选项: {}", option_id);
            return false;
        }
        self.state.select(option_id)
    }

    /// 填写答案（填空题，只在未作答时有效，不保存）
    pub fn enter_text(&mut self, text: &str) -> bool {
        match self.current_question() {
            Some(question) if !question.is_option_based() => self.state.select(text),
            Some(_) => {
                debug!("选择题需要选择选项，忽略文本输入");
                false
            }
            None => false,
        }
    }

    /// 提交当前选择
    ///
    /// 已作答的题目再次提交不会产生任何变化。
    pub fn submit(&mut self) -> SubmitOutcome {
        let Some(question) = self.questions.get(self.current_index).cloned() else {
            return SubmitOutcome::NoQuestion;
        };

        let selection = match &self.state {
            QuestionState::Answered { .. } => return SubmitOutcome::AlreadyAnswered,
            QuestionState::Unanswered { selection } => match selection {
                Some(selection) if !selection.trim().is_empty() => selection.clone(),
                _ => return SubmitOutcome::EmptySelection,
            },
        };

        let correct = evaluate(&question, &selection);
        self.store.record_attempt(&question.id, &selection, correct);
        self.state = QuestionState::Answered { selection, correct };

        info!(
            "{} 第 {} 题: {}",
            if correct { "✓" } else { "✗" },
            self.current_index + 1,
            self.state
        );
        log_progress(&self.progress());

        SubmitOutcome::Answered {
            correct,
            show_explanation: question.has_explanation(),
        }
    }

    // ========== 导航 ==========

    pub fn previous_question(&mut self) -> usize {
        self.jump_to(self.current_index.saturating_sub(1))
    }

    pub fn next_question(&mut self) -> usize {
        self.jump_to(self.current_index.saturating_add(1))
    }

    /// 跳到指定题目，超出范围时取边界值
    pub fn jump_to(&mut self, index: usize) -> usize {
        let index = self.clamp(index);
        if index != self.current_index {
            self.move_to(index);
        }
        self.current_index
    }

    /// 从当前题目之后循环查找第一道未作答的题
    ///
    /// 当前题目最后检查；全部作答时返回 None，指针不动。
    pub fn jump_to_next_unattempted(&mut self) -> Option<usize> {
        let total = self.questions.len();
        let target = (1..=total)
            .map(|offset| (self.current_index + offset) % total)
            .find(|&index| !self.store.is_attempted(&self.questions[index].id))?;

        if target != self.current_index {
            self.move_to(target);
        }
        Some(target)
    }

    // ========== 复习标记 / 进度 ==========

    /// 切换当前题目的复习标记，返回切换后的状态
    pub fn toggle_review_current(&mut self) -> Option<bool> {
        let id = self.current_question()?.id.clone();
        Some(self.store.toggle_review(&id))
    }

    pub fn is_current_marked(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.store.is_marked_for_review(&q.id))
    }

    pub fn progress(&self) -> Progress {
        self.store.progress(self.questions.len())
    }

    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    /// 导入进度文件内容，成功后刷新当前题目状态
    pub fn import_progress(&mut self, contents: &str) -> bool {
        let imported = self.store.load_from_file(contents);
        if imported {
            self.load_current_question();
            log_progress(&self.progress());
        }
        imported
    }

    /// 导出进度到本地文件
    pub async fn export_progress(&self, path: impl AsRef<Path>) -> AppResult<()> {
        self.store.export_to_path(path).await
    }

    /// 等待后台保存完成
    pub async fn flush(&self) {
        self.store.flush().await;
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.questions.len().saturating_sub(1))
    }

    fn move_to(&mut self, index: usize) {
        self.current_index = index;
        if self.store.snapshot().current_question_index != index {
            self.store.set_current_question_index(index);
        }
        self.load_current_question();
    }

    /// 载入当前题目的作答状态，已有记录时直接恢复为已作答
    fn load_current_question(&mut self) {
        self.state = match self.current_question() {
            Some(question) => {
                let state = QuestionState::from_record(self.store.attempt_result(&question.id));
                log_question(self.current_index, self.questions.len(), question);
                state
            }
            None => QuestionState::default(),
        };
    }
}
