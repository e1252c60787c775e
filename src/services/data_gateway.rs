//! 远程数据网关 - 业务能力层
//!
//! 只负责"取数据"能力：目录、题目列表和题目缓存。
//! 所有失败都降级为空结果，错误只通过日志暴露。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::clients::QuizApiClient;
use crate::error::AppResult;
use crate::models::{CatalogStructure, Filter, HealthStatus, Question};

/// 共享的题目列表，缓存命中时返回同一个 Arc
pub type QuestionList = Arc<Vec<Question>>;

/// 远程数据网关
///
/// 职责：
/// - 获取 subject / division / chapter 目录
/// - 按筛选条件获取题目并缓存
/// - 任何失败都返回空结果，不向调用方抛错
pub struct RemoteDataGateway {
    client: QuizApiClient,
    /// key 为规范查询串，会话内不失效
    question_cache: Mutex<HashMap<String, QuestionList>>,
}

impl RemoteDataGateway {
    /// 创建新的数据网关
    pub fn new(client: QuizApiClient) -> Self {
        Self {
            client,
            question_cache: Mutex::new(HashMap::new()),
        }
    }

    /// 科目列表
    pub async fn list_subjects(&self) -> Vec<String> {
        or_empty("获取科目列表", self.client.fetch_subjects().await)
    }

    /// 分册列表，subject 为空时直接返回空
    pub async fn list_divisions(&self, subject: &str) -> Vec<String> {
        if subject.is_empty() {
            return Vec::new();
        }
        or_empty(
            "获取分册列表",
            self.client.fetch_divisions(subject).await,
        )
    }

    /// 章节列表，subject 和 division 都不为空时才请求
    pub async fn list_chapters(&self, subject: &str, division: &str) -> Vec<String> {
        if subject.is_empty() || division.is_empty() {
            return Vec::new();
        }
        or_empty(
            "获取章节列表",
            self.client.fetch_chapters(subject, division).await,
        )
    }

    /// 按筛选条件加载题目
    ///
    /// 同一个规范 key 只请求一次，空结果也会缓存；请求失败不缓存。
    pub async fn load_questions(&self, filter: &Filter) -> QuestionList {
        let key = filter.query_string();

        if let Some(cached) = self.cached(&key) {
            debug!("题目缓存命中: {:?} ({} 题)", key, cached.len());
            return cached;
        }

        match self.client.fetch_questions(filter).await {
            Ok(questions) => {
                info!("✓ 加载题目 {}: {} 题", filter, questions.len());
                let list = Arc::new(questions);
                self.lock_cache()
                    .entry(key)
                    .or_insert_with(|| list.clone())
                    .clone()
            }
            Err(e) => {
                warn!("⚠️ 加载题目失败 {}: {}", filter, e);
                Arc::new(Vec::new())
            }
        }
    }

    /// 获取单道题目
    pub async fn load_question(
        &self,
        subject: &str,
        division: &str,
        chapter: &str,
        index: usize,
    ) -> Option<Question> {
        self.client
            .fetch_question(subject, division, chapter, index)
            .await
            .map_err(|e| warn!("⚠️ 获取题目失败 {}/{}/{}:{}: {}", subject, division, chapter, index, e))
            .ok()
    }

    /// 完整目录结构
    pub async fn structure(&self) -> Option<CatalogStructure> {
        self.client
            .fetch_structure()
            .await
            .map_err(|e| warn!("⚠️ 获取目录结构失败: {}", e))
            .ok()
    }

    /// 服务健康状态
    pub async fn health(&self) -> Option<HealthStatus> {
        self.client
            .health()
            .await
            .map_err(|e| warn!("⚠️ 健康检查失败: {}", e))
            .ok()
    }

    /// 已缓存的筛选条件数量
    pub fn cached_filters(&self) -> usize {
        self.lock_cache().len()
    }

    fn cached(&self, key: &str) -> Option<QuestionList> {
        self.lock_cache().get(key).cloned()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, QuestionList>> {
        // 缓存里只有不可变数据，锁中毒后继续使用
        self.question_cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn or_empty(action: &str, result: AppResult<Vec<String>>) -> Vec<String> {
    result.unwrap_or_else(|e| {
        warn!("⚠️ {}失败: {}", action, e);
        Vec::new()
    })
}
