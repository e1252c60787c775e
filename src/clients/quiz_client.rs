//! 题库 API 客户端
//!
//! 封装所有与题库服务相关的调用逻辑

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::infrastructure::{HttpResponse, HttpTransport};
use crate::models::{CatalogStructure, Filter, HealthStatus, ProgressState, Question};

/// 成功响应的 status 取值
pub const STATUS_SUCCESS: &str = "success";

/// 持久化状态文档的地址（无外层信封）
pub const STATE_DOCUMENT_PATH: &str = "/quiz-state.json";

/// 保存状态的地址
pub const STATE_SAVE_PATH: &str = "/api/state";

/// 所有接口共用的外层信封
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SubjectsPayload {
    subjects: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DivisionsPayload {
    divisions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ChaptersPayload {
    chapters: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct QuestionsPayload {
    questions: Vec<Question>,
}

#[derive(Debug, Deserialize)]
struct QuestionPayload {
    question: Question,
}

/// 题库 API 客户端
#[derive(Clone)]
pub struct QuizApiClient {
    transport: Arc<dyn HttpTransport>,
}

impl QuizApiClient {
    /// 创建新的题库客户端
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// 获取科目列表
    pub async fn fetch_subjects(&self) -> AppResult<Vec<String>> {
        let payload: SubjectsPayload = self.get_envelope("/api/subjects").await?;
        Ok(payload.subjects)
    }

    /// 获取科目下的分册列表
    pub async fn fetch_divisions(&self, subject: &str) -> AppResult<Vec<String>> {
        let path = format!("/api/subjects/{}/divisions", encode(subject));
        let payload: DivisionsPayload = self.get_envelope(&path).await?;
        Ok(payload.divisions)
    }

    /// 获取分册下的章节列表
    pub async fn fetch_chapters(&self, subject: &str, division: &str) -> AppResult<Vec<String>> {
        let path = format!(
            "/api/subjects/{}/{}/chapters",
            encode(subject),
            encode(division)
        );
        let payload: ChaptersPayload = self.get_envelope(&path).await?;
        Ok(payload.chapters)
    }

    /// 按筛选条件获取题目
    pub async fn fetch_questions(&self, filter: &Filter) -> AppResult<Vec<Question>> {
        let path = questions_path(filter);
        let payload: QuestionsPayload = self.get_envelope(&path).await?;
        Ok(payload.questions)
    }

    /// 获取单道题目
    pub async fn fetch_question(
        &self,
        subject: &str,
        division: &str,
        chapter: &str,
        index: usize,
    ) -> AppResult<Question> {
        let path = format!(
            "/api/question/{}/{}/{}/{}",
            encode(subject),
            encode(division),
            encode(chapter),
            index
        );
        let payload: QuestionPayload = self.get_envelope(&path).await?;
        Ok(payload.question)
    }

    /// 获取完整目录结构
    pub async fn fetch_structure(&self) -> AppResult<CatalogStructure> {
        self.get_envelope("/api/structure").await
    }

    /// 健康检查
    ///
    /// `message` 属于健康信息本身，不能交给信封解析。
    pub async fn health(&self) -> AppResult<HealthStatus> {
        let path = "/api/health";
        let response = self.transport.get(path).await?;
        Self::check_success::<JsonValue>(path, &response)?;
        response.parse()
    }

    /// 获取持久化的状态文档（原始 JSON）
    ///
    /// 首次使用时服务端返回 404，属于正常情况，由调用方决定如何处理。
    pub async fn fetch_state_document(&self) -> AppResult<JsonValue> {
        let response = self.transport.get(STATE_DOCUMENT_PATH).await?;
        if !response.is_success() {
            return Err(AppError::http_status(STATE_DOCUMENT_PATH, response.status));
        }
        response.parse()
    }

    /// 保存状态
    pub async fn save_state(&self, state: &ProgressState) -> AppResult<()> {
        let body = serde_json::to_value(state)?;
        debug!(
            "保存状态: {} 条作答记录, {} 个复习标记",
            state.attempted_questions.len(),
            state.marked_for_review.len()
        );

        let response = self.transport.post_json(STATE_SAVE_PATH, &body).await?;
        Self::check_success::<JsonValue>(STATE_SAVE_PATH, &response)?;
        Ok(())
    }

    /// GET 并解出信封中的数据
    async fn get_envelope<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let response = self.transport.get(path).await?;
        let envelope: Envelope<T> = Self::check_success(path, &response)?;
        envelope
            .data
            .ok_or_else(|| AppError::bad_response(path, envelope.status, envelope.message))
    }

    /// 检查 API 响应是否成功
    ///
    /// HTTP 状态码必须是 2xx，且响应体 `status` 必须是 `success`。
    fn check_success<T: DeserializeOwned>(
        path: &str,
        response: &HttpResponse,
    ) -> AppResult<Envelope<T>> {
        if !response.is_success() {
            return Err(AppError::http_status(path, response.status));
        }

        let envelope: Envelope<T> = response.parse()?;
        if !Self::is_success_status(envelope.status.as_deref()) {
            return Err(AppError::bad_response(
                path,
                envelope.status,
                envelope.message,
            ));
        }
        Ok(envelope)
    }

    /// 判断信封的 status 是否为成功
    pub fn is_success_status(status: Option<&str>) -> bool {
        status == Some(STATUS_SUCCESS)
    }
}

/// 题目查询地址
pub fn questions_path(filter: &Filter) -> String {
    let query = filter.query_string();
    if query.is_empty() {
        "/api/questions".to_string()
    } else {
        format!("/api/questions?{}", query)
    }
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::fake_transport::FakeTransport;
    use serde_json::json;

    fn client_with(transport: FakeTransport) -> QuizApiClient {
        QuizApiClient::new(Arc::new(transport))
    }

    #[tokio::test]
    async fn test_fetch_subjects_success() {
        let client = client_with(FakeTransport::new().route(
            "/api/subjects",
            200,
            json!({"status": "success", "subjects": ["math", "physics"]}),
        ));

        let subjects = client.fetch_subjects().await.unwrap();
        assert_eq!(subjects, vec!["math", "physics"]);
    }

    #[tokio::test]
    async fn test_status_failure_on_http_200() {
        let client = client_with(FakeTransport::new().route(
            "/api/subjects",
            200,
            json!({"status": "error", "message": "boom", "subjects": ["math"]}),
        ));

        let err = client.fetch_subjects().await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_missing_status_is_failure() {
        let client = client_with(FakeTransport::new().route(
            "/api/subjects",
            200,
            json!({"subjects": ["math"]}),
        ));

        assert!(client.fetch_subjects().await.is_err());
    }

    #[tokio::test]
    async fn test_non_2xx_is_failure() {
        let client = client_with(FakeTransport::new().route(
            "/api/subjects/math/divisions",
            404,
            json!({"status": "error", "message": "Subject \"math\" not found"}),
        ));

        assert!(client.fetch_divisions("math").await.is_err());
    }

    #[tokio::test]
    async fn test_path_segments_are_encoded() {
        let client = client_with(FakeTransport::new().route(
            "/api/subjects/general%20science/part%20a/chapters",
            200,
            json!({"status": "success", "chapters": ["c1.json"]}),
        ));

        let chapters = client
            .fetch_chapters("general science", "part a")
            .await
            .unwrap();
        assert_eq!(chapters, vec!["c1.json"]);
    }

    #[test]
    fn test_questions_path() {
        assert_eq!(questions_path(&Filter::default()), "/api/questions");
        assert_eq!(
            questions_path(&Filter::subject("math")),
            "/api/questions?subject=math"
        );
    }
}
