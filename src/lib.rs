//! # Quiz Progress
//!
//! 答题客户端的状态与进度核心：按 subject / division / chapter 获取题目，
//! 逐题作答，记录作答结果并持久化进度。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 连接，只暴露 get / post 能力
//! - `HttpTransport` - 传输抽象，`ReqwestTransport` 为默认实现
//!
//! ### ② 客户端层（Clients）
//! - `QuizApiClient` - 题库接口调用，统一检查 `status` 信封
//!
//! ### ③ 业务能力层（Services）
//! - `RemoteDataGateway` - 目录与题目获取，失败降级为空结果，题目按筛选缓存
//! - `ProgressStore` - 唯一持有进度状态，负责加载 / 保存 / 导入 / 导出
//! - `SaveQueue` - 后台保存队列，按顺序保存完整快照
//! - `FilterController` - 三级联动筛选
//!
//! ### ④ 流程层（Workflow）
//! - `QuestionState` - 单题状态机（未作答 / 已作答）
//! - `evaluate` - 判分规则
//!
//! ### ⑤ 编排层（Orchestration）
//! - `QuizSession` - 组合以上能力，管理题目列表、指针和进度
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::QuizApiClient;
pub use config::{Config, StartupOptions};
pub use error::{AppError, AppResult};
pub use infrastructure::{HttpResponse, HttpTransport, ReqwestTransport};
pub use models::{AttemptRecord, Filter, Progress, ProgressState, Question};
pub use orchestrator::QuizSession;
pub use services::{FilterController, ProgressStore, RemoteDataGateway};
pub use workflow::{QuestionState, SubmitOutcome};
