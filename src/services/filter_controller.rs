//! 筛选控制 - 业务能力层
//!
//! 维护 subject → division → chapter 三级联动选择。

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{normalize_chapter, Filter};
use crate::services::data_gateway::RemoteDataGateway;

/// 下拉选项，第一项总是 `All`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    All,
    Value(String),
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::All => write!(f, "全部"),
            Choice::Value(value) => write!(f, "{}", value),
        }
    }
}

/// 筛选变化回调
pub type FilterCallback = Box<dyn FnMut(&Filter) + Send>;

/// 筛选控制器
///
/// 级联规则：
/// - 切换 subject：重新加载 division 列表，division / chapter 重置为全部
/// - 切换 division：重新加载 chapter 列表，chapter 重置为全部
pub struct FilterController {
    gateway: Arc<RemoteDataGateway>,
    subjects: Vec<String>,
    divisions: Vec<String>,
    chapters: Vec<String>,
    subjects_loaded: bool,
    subject: Option<String>,
    division: Option<String>,
    chapter: Option<String>,
    on_change: Option<FilterCallback>,
}

impl FilterController {
    pub fn new(gateway: Arc<RemoteDataGateway>) -> Self {
        Self {
            gateway,
            subjects: Vec::new(),
            divisions: Vec::new(),
            chapters: Vec::new(),
            subjects_loaded: false,
            subject: None,
            division: None,
            chapter: None,
            on_change: None,
        }
    }

    /// 注册筛选变化回调，替换之前的回调
    pub fn on_change(&mut self, callback: impl FnMut(&Filter) + Send + 'static) {
        self.on_change = Some(Box::new(callback));
    }

    /// 加载科目列表（只加载一次）
    pub async fn initialize(&mut self) {
        if self.subjects_loaded {
            return;
        }
        self.subjects = self.gateway.list_subjects().await;
        self.subjects_loaded = true;
        debug!("科目列表: {:?}", self.subjects);
    }

    pub fn subject_choices(&self) -> Vec<Choice> {
        with_all(&self.subjects)
    }

    pub fn division_choices(&self) -> Vec<Choice> {
        with_all(&self.divisions)
    }

    pub fn chapter_choices(&self) -> Vec<Choice> {
        with_all(&self.chapters)
    }

    /// 选择科目，`None` 表示全部
    pub async fn select_subject(&mut self, subject: Option<String>) {
        self.subject = subject.filter(|s| !s.is_empty());
        self.division = None;
        self.chapter = None;
        self.chapters.clear();
        self.divisions = match &self.subject {
            Some(subject) => self.gateway.list_divisions(subject).await,
            None => Vec::new(),
        };
    }

    /// 选择分册，`None` 表示全部
    pub async fn select_division(&mut self, division: Option<String>) {
        self.division = division.filter(|d| !d.is_empty());
        self.chapter = None;
        self.chapters = match (&self.subject, &self.division) {
            (Some(subject), Some(division)) => self.gateway.list_chapters(subject, division).await,
            _ => Vec::new(),
        };
    }

    /// 选择章节，`None` 表示全部
    pub fn select_chapter(&mut self, chapter: Option<String>) {
        self.chapter = chapter.filter(|c| !c.is_empty());
    }

    /// 当前选择对应的筛选条件
    ///
    /// 下层选择只在上层已选时有效。
    pub fn current_filter(&self) -> Filter {
        let subject = self.subject.clone();
        let division = subject.as_ref().and(self.division.clone());
        let chapter = division.as_ref().and(self.chapter.clone());
        Filter::new(subject, division, chapter)
    }

    /// 读取当前选择并通知回调
    pub fn apply_filter(&mut self) -> Filter {
        let filter = self.current_filter();
        info!("应用筛选: {}", filter);
        self.notify(&filter);
        filter
    }

    /// 清空所有选择并以空条件通知回调
    pub fn reset_filter(&mut self) -> Filter {
        self.subject = None;
        self.division = None;
        self.chapter = None;
        self.divisions.clear();
        self.chapters.clear();
        let filter = Filter::default();
        info!("重置筛选");
        self.notify(&filter);
        filter
    }

    /// 以编程方式设置筛选（例如从保存的状态或启动参数恢复）
    ///
    /// 先等待科目列表加载，再依次设置 subject → 加载 division → 设置 division
    /// → 加载 chapter → 设置 chapter。不触发回调。
    pub async fn set_filter(&mut self, filter: &Filter) {
        self.initialize().await;

        self.select_subject(filter.subject.clone()).await;
        if self.subject.is_none() {
            return;
        }

        self.select_division(filter.division.clone()).await;
        if self.division.is_none() {
            return;
        }

        self.select_chapter(filter.chapter.clone().map(normalize_chapter));
    }

    fn notify(&mut self, filter: &Filter) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(filter);
        }
    }
}

fn with_all(values: &[String]) -> Vec<Choice> {
    std::iter::once(Choice::All)
        .chain(values.iter().cloned().map(Choice::Value))
        .collect()
}
