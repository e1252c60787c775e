//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端，只暴露"发请求"的能力

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// 原始 HTTP 响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 以 JSON 值构造响应
    pub fn json(status: u16, body: &JsonValue) -> Self {
        Self::new(status, body.to_string())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 把响应体反序列化为指定类型
    pub fn parse<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// HTTP 传输
///
/// 职责：
/// - 持有连接资源
/// - 只返回状态码和响应体
/// - 不认识 Question / ProgressState
/// - 不判断业务上的成功失败
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// GET 请求，`path` 以 `/` 开头，可以带查询串
    async fn get(&self, path: &str) -> AppResult<HttpResponse>;

    /// POST JSON 请求
    async fn post_json(&self, path: &str, body: &JsonValue) -> AppResult<HttpResponse>;
}

/// 基于 reqwest 的传输实现
pub struct ReqwestTransport {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestTransport {
    /// 创建新的传输，`base_url` 不带末尾斜杠
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn into_response(path: &str, response: reqwest::Response) -> AppResult<HttpResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;
        debug!("{} -> {} ({} 字节)", path, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, path: &str) -> AppResult<HttpResponse> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;
        Self::into_response(path, response).await
    }

    async fn post_json(&self, path: &str, body: &JsonValue) -> AppResult<HttpResponse> {
        debug!("POST {}", path);
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(path, e))?;
        Self::into_response(path, response).await
    }
}
