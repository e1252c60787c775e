//! 测试用的内存传输

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::{HttpResponse, HttpTransport};
use crate::error::{AppError, AppResult};

/// 按路径返回预设响应，并记录所有请求
#[derive(Default)]
pub struct FakeTransport {
    routes: Mutex<HashMap<String, HttpResponse>>,
    gets: Mutex<Vec<String>>,
    posts: Mutex<Vec<(String, JsonValue)>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预设 GET 响应
    pub fn route(self, path: &str, status: u16, body: JsonValue) -> Self {
        self.set_route(path, status, body);
        self
    }

    pub fn set_route(&self, path: &str, status: u16, body: JsonValue) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), HttpResponse::json(status, &body));
    }

    pub fn get_count(&self, path: &str) -> usize {
        self.gets.lock().unwrap().iter().filter(|p| *p == path).count()
    }

    pub fn total_gets(&self) -> usize {
        self.gets.lock().unwrap().len()
    }

    pub fn posts(&self) -> Vec<(String, JsonValue)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, path: &str) -> AppResult<HttpResponse> {
        self.gets.lock().unwrap().push(path.to_string());
        self.routes
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| AppError::Other(format!("连接被拒绝: {}", path)))
    }

    async fn post_json(&self, path: &str, body: &JsonValue) -> AppResult<HttpResponse> {
        self.posts
            .lock()
            .unwrap()
            .push((path.to_string(), body.clone()));
        let routes = self.routes.lock().unwrap();
        Ok(routes
            .get(&format!("POST {}", path))
            .cloned()
            .unwrap_or_else(|| HttpResponse::json(200, &serde_json::json!({"status": "success"}))))
    }
}
