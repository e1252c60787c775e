use serde::{Deserialize, Serialize};

/// 选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub content: String,
}

/// 题目来源（由服务端补充）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionSource {
    pub subject: String,
    pub division: String,
    pub chapter: String,
    pub index: usize,
}

/// 题目，获取后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// 跨会话稳定的唯一标识，形如 `subject/division/chapter:index`
    pub id: String,
    pub content: String,

    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_options: Option<Vec<String>>,
    /// 填空题的参考答案
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// 阅读材料
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comprehension: Option<String>,
    /// 题目说明
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<QuestionSource>,
}

impl Question {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            options: Vec::new(),
            correct_options: None,
            answer: None,
            explanation: None,
            comprehension: None,
            direction: None,
            source: None,
        }
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        self.options = options
            .into_iter()
            .map(|(id, content)| QuestionOption {
                id: id.into(),
                content: content.into(),
            })
            .collect();
        self
    }

    pub fn with_correct_options<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.correct_options = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = Some(answer.into());
        self
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// 是否是选择题
    pub fn is_option_based(&self) -> bool {
        !self.options.is_empty() || self.correct_options.is_some()
    }

    /// 作答后是否可以展开解析 / 答案
    pub fn has_explanation(&self) -> bool {
        self.correct_options.as_ref().is_some_and(|c| !c.is_empty())
            || self
                .explanation
                .as_deref()
                .is_some_and(|e| !e.trim().is_empty())
            || self.answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}
