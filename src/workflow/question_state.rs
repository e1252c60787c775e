//! 单题作答状态
//!
//! `Unanswered → Answered`，离开本题之前 `Answered` 不再变化。

use std::fmt::Display;

use crate::models::AttemptRecord;

/// 单题作答状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionState {
    /// 未作答，可能已有待提交的选择
    Unanswered { selection: Option<String> },
    /// 已作答
    Answered { selection: String, correct: bool },
}

impl Default for QuestionState {
    fn default() -> Self {
        QuestionState::Unanswered { selection: None }
    }
}

impl QuestionState {
    /// 由已有的作答记录恢复
    pub fn from_record(record: Option<&AttemptRecord>) -> Self {
        match record {
            Some(record) if record.attempted => QuestionState::Answered {
                selection: record.selected_option.clone(),
                correct: record.correct,
            },
            _ => QuestionState::default(),
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, QuestionState::Answered { .. })
    }

    /// 当前的选择（待提交或已提交）
    pub fn selection(&self) -> Option<&str> {
        match self {
            QuestionState::Unanswered { selection } => selection.as_deref(),
            QuestionState::Answered { selection, .. } => Some(selection),
        }
    }

    /// 记录待提交的选择，已作答时返回 false
    pub fn select(&mut self, value: impl Into<String>) -> bool {
        match self {
            QuestionState::Unanswered { selection } => {
                *selection = Some(value.into());
                true
            }
            QuestionState::Answered { .. } => false,
        }
    }
}

impl Display for QuestionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuestionState::Unanswered { selection: None } => write!(f, "未作答"),
            QuestionState::Unanswered {
                selection: Some(selection),
            } => write!(f, "未提交 (已选: {})", selection),
            QuestionState::Answered { selection, correct } => write!(
                f,
                "已作答 ({}: {})",
                selection,
                if *correct { "正确" } else { "错误" }
            ),
        }
    }
}

/// 提交结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// 已判分并记录
    Answered {
        correct: bool,
        /// 是否可以展开解析 / 答案
        show_explanation: bool,
    },
    /// 本题已作答，忽略
    AlreadyAnswered,
    /// 没有选择或填写为空
    EmptySelection,
    /// 当前没有题目
    NoQuestion,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_only_when_unanswered() {
        let mut state = QuestionState::default();
        assert!(state.select("A"));
        assert!(state.select("B"));
        assert_eq!(state.selection(), Some("B"));

        let mut answered = QuestionState::Answered {
            selection: "A".into(),
            correct: true,
        };
        assert!(!answered.select("B"));
        assert_eq!(answered.selection(), Some("A"));
    }

    #[test]
    fn test_restore_from_record() {
        let record = AttemptRecord::new("C", false);
        assert_eq!(
            QuestionState::from_record(Some(&record)),
            QuestionState::Answered {
                selection: "C".into(),
                correct: false
            }
        );
        assert_eq!(QuestionState::from_record(None), QuestionState::default());
    }
}
