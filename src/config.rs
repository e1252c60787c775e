use crate::error::{AppError, AppResult, ConfigError, FileError};
use crate::models::Filter;
use serde::Deserialize;
use std::path::Path;

/// 默认配置文件
pub const CONFIG_FILE: &str = "quiz.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 题库服务地址（不带末尾斜杠）
    pub server_url: String,
    /// 本地导出进度文件路径
    pub state_export_path: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// tracing 过滤规则（RUST_LOG 优先）
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000".to_string(),
            state_export_path: "quiz-state.json".to_string(),
            verbose_logging: false,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 < quiz.toml < 环境变量
    pub fn load() -> AppResult<Self> {
        let base = if Path::new(CONFIG_FILE).exists() {
            Self::from_toml_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        base.with_env_overrides()
    }

    /// 只使用环境变量覆盖默认值
    pub fn from_env() -> AppResult<Self> {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &str) -> AppResult<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| AppError::file_read_failed(path, e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            AppError::File(FileError::TomlParseFailed { source, .. }) => {
                AppError::File(FileError::TomlParseFailed {
                    path: path.to_string(),
                    source,
                })
            }
            other => other,
        })
    }

    /// 从 TOML 字符串解析配置
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        let config: Config = toml::from_str(content)?;
        config.validated()
    }

    fn with_env_overrides(self) -> AppResult<Self> {
        let verbose_logging = match std::env::var("VERBOSE_LOGGING") {
            Ok(value) => value.parse().map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: "VERBOSE_LOGGING".to_string(),
                value,
                expected_type: "bool".to_string(),
            })?,
            Err(_) => self.verbose_logging,
        };

        Self {
            server_url: std::env::var("QUIZ_SERVER_URL").unwrap_or(self.server_url),
            state_export_path: std::env::var("QUIZ_STATE_EXPORT").unwrap_or(self.state_export_path),
            verbose_logging,
            log_filter: std::env::var("QUIZ_LOG").unwrap_or(self.log_filter),
        }
        .validated()
    }

    fn validated(mut self) -> AppResult<Self> {
        let trimmed = self.server_url.trim().trim_end_matches('/').to_string();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(ConfigError::InvalidServerUrl {
                url: self.server_url,
            }
            .into());
        }
        self.server_url = trimmed;
        Ok(self)
    }
}

/// 启动参数
///
/// 只在启动时读取一次，随后传入 `QuizSession::new`。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StartupOptions {
    /// 预设筛选条件
    pub initial_filter: Option<Filter>,
    /// 专注模式
    pub zen_mode: bool,
    /// 启动后跳到下一道未作答的题
    pub jump_to_next_unattempted: bool,
}

impl StartupOptions {
    /// 从环境变量读取：QUIZ_SUBJECT / QUIZ_DIVISION / QUIZ_CHAPTER / QUIZ_ZEN / QUIZ_NEXT
    pub fn from_env() -> Self {
        let filter = Filter::new(
            std::env::var("QUIZ_SUBJECT").ok(),
            std::env::var("QUIZ_DIVISION").ok(),
            std::env::var("QUIZ_CHAPTER").ok(),
        )
        .normalized();

        Self {
            initial_filter: (!filter.is_empty()).then_some(filter),
            zen_mode: std::env::var("QUIZ_ZEN").map(|v| is_truthy(&v)).unwrap_or(false),
            jump_to_next_unattempted: std::env::var("QUIZ_NEXT")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }

    /// 从题目地址解析，例如 `/math/algebra/linear?zen=1&next=true`
    ///
    /// 路径依次为 subject / division / chapter，chapter 会补齐 `.json` 后缀。
    pub fn from_url(url: &str) -> Self {
        let (path, query) = url.split_once('?').unwrap_or((url, ""));

        let mut segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).map(|d| d.into_owned()).unwrap_or_else(|_| s.to_string()));

        let filter = Filter::new(segments.next(), segments.next(), segments.next()).normalized();

        let mut options = Self {
            initial_filter: (!filter.is_empty()).then_some(filter),
            ..Self::default()
        };

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            match key {
                "zen" => options.zen_mode = is_truthy(value),
                "next" => options.jump_to_next_unattempted = is_truthy(value),
                _ => {}
            }
        }

        options
    }
}

/// `1` / `true` / `yes` / `on`（不区分大小写）视为开启
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
