//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 组合各项业务能力，管理一次答题会话的完整生命周期。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::QuizSession (题目列表 + 指针 + 进度)
//!     ↓
//! workflow (单题状态、判分规则)
//!     ↓
//! services (能力层：gateway / filter / progress store / save queue)
//!     ↓
//! clients (题库 API)
//!     ↓
//! infrastructure (基础设施：HttpTransport)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一写入者**：只有 ProgressStore 修改进度状态
//! 2. **向下依赖**：编排层 → workflow → services → clients → infrastructure
//! 3. **失败降级**：任何远程失败都不会中断会话

pub mod quiz_session;

pub use quiz_session::QuizSession;
