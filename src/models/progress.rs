use crate::error::{AppResult, StateError};
use crate::models::Filter;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};

/// 单题作答记录，首次提交时创建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    pub attempted: bool,
    pub selected_option: String,
    pub correct: bool,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl AttemptRecord {
    pub fn new(selected_option: impl Into<String>, correct: bool) -> Self {
        Self {
            attempted: true,
            selected_option: selected_option.into(),
            correct,
            timestamp: Utc::now(),
        }
    }
}

/// 持久化的进度状态
///
/// 序列化形状：
/// `{attemptedQuestions, currentFilter, currentQuestionIndex, markedForReview: [..], lastUpdated}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressState {
    pub attempted_questions: BTreeMap<String, AttemptRecord>,
    pub current_filter: Filter,
    pub current_question_index: usize,
    /// 序列化为数组，加载时重建为集合
    pub marked_for_review: BTreeSet<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Default for ProgressState {
    fn default() -> Self {
        Self {
            attempted_questions: BTreeMap::new(),
            current_filter: Filter::default(),
            current_question_index: 0,
            marked_for_review: BTreeSet::new(),
            last_updated: Utc::now(),
        }
    }
}

impl ProgressState {
    /// 把加载到的文档合并进当前状态
    ///
    /// 文档中出现的已知字段覆盖当前值，缺失的字段保留当前值。
    /// 任意字段格式错误时整体放弃，当前状态不变。
    pub fn merge_document(&mut self, document: &JsonValue) -> AppResult<()> {
        let object = document.as_object().ok_or_else(|| StateError::NotAnObject {
            kind: json_kind(document).to_string(),
        })?;

        let patch = StatePatch::from_object(object)?;
        patch.apply(self);
        Ok(())
    }

    /// 计算进度，`total` 为当前题目列表长度
    pub fn progress(&self, total: usize) -> Progress {
        let attempted = self.attempted_questions.len();
        let correct = self
            .attempted_questions
            .values()
            .filter(|record| record.correct)
            .count();

        let percentage = if total == 0 {
            0.0
        } else {
            (attempted as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
        };

        Progress {
            total,
            attempted,
            correct,
            percentage,
        }
    }
}

/// 进度汇总
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub total: usize,
    pub attempted: usize,
    pub correct: usize,
    pub percentage: f64,
}

/// 合并用的部分状态，每个字段独立解析
#[derive(Debug, Default)]
struct StatePatch {
    attempted_questions: Option<BTreeMap<String, AttemptRecord>>,
    current_filter: Option<Filter>,
    current_question_index: Option<usize>,
    marked_for_review: Option<BTreeSet<String>>,
    last_updated: Option<DateTime<Utc>>,
}

impl StatePatch {
    fn from_object(object: &Map<String, JsonValue>) -> AppResult<Self> {
        Ok(Self {
            attempted_questions: field(object, "attemptedQuestions")?,
            current_filter: field::<Filter>(object, "currentFilter")?.map(Filter::normalized),
            current_question_index: field(object, "currentQuestionIndex")?,
            marked_for_review: field::<Vec<String>>(object, "markedForReview")?
                .map(|ids| ids.into_iter().collect()),
            last_updated: match object.get("lastUpdated") {
                None | Some(JsonValue::Null) => None,
                Some(value) => Some(
                    deserialize_timestamp(value.clone()).map_err(|source| {
                        StateError::InvalidField {
                            field: "lastUpdated".to_string(),
                            source,
                        }
                    })?,
                ),
            },
        })
    }

    fn apply(self, state: &mut ProgressState) {
        if let Some(attempts) = self.attempted_questions {
            state.attempted_questions = attempts;
        }
        if let Some(filter) = self.current_filter {
            state.current_filter = filter;
        }
        if let Some(index) = self.current_question_index {
            state.current_question_index = index;
        }
        if let Some(marks) = self.marked_for_review {
            state.marked_for_review = marks;
        }
        if let Some(updated) = self.last_updated {
            state.last_updated = updated;
        }
    }
}

/// 读取单个字段，`null` 与缺失等价
fn field<T: serde::de::DeserializeOwned>(
    object: &Map<String, JsonValue>,
    name: &str,
) -> AppResult<Option<T>> {
    match object.get(name) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|source| {
                StateError::InvalidField {
                    field: name.to_string(),
                    source,
                }
                .into()
            }),
    }
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

// 时间戳可以是 ISO-8601 字符串，也可以是毫秒时间戳整数
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Visitor;
    use std::fmt;

    struct TimestampVisitor;

    impl<'de> Visitor<'de> for TimestampVisitor {
        type Value = DateTime<Utc>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an ISO-8601 string or epoch milliseconds")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            DateTime::parse_from_rfc3339(value)
                .map(|dt| dt.with_timezone(&Utc))
                .or_else(|_| {
                    // 不带时区的 ISO 时间按 UTC 处理
                    chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                        .map(|naive| naive.and_utc())
                })
                .map_err(E::custom)
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Utc.timestamp_millis_opt(value)
                .single()
                .ok_or_else(|| E::custom(format!("时间戳超出范围: {}", value)))
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let millis = i64::try_from(value).map_err(E::custom)?;
            self.visit_i64(millis)
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            self.visit_i64(value as i64)
        }
    }

    deserializer.deserialize_any(TimestampVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_progress_empty_total() {
        let state = ProgressState::default();
        assert_eq!(
            state.progress(0),
            Progress {
                total: 0,
                attempted: 0,
                correct: 0,
                percentage: 0.0
            }
        );
    }

    #[test]
    fn test_progress_counts_and_clamps() {
        let mut state = ProgressState::default();
        state
            .attempted_questions
            .insert("q1".into(), AttemptRecord::new("A", true));
        state
            .attempted_questions
            .insert("q2".into(), AttemptRecord::new("B", false));
        state
            .attempted_questions
            .insert("q3".into(), AttemptRecord::new("C", true));

        let progress = state.progress(4);
        assert_eq!(progress.attempted, 3);
        assert_eq!(progress.correct, 2);
        assert!((progress.percentage - 75.0).abs() < f64::EPSILON);

        // 旧记录多于当前题目数时不超过 100
        assert_eq!(state.progress(2).percentage, 100.0);
        assert_eq!(state.progress(0).percentage, 0.0);
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let mut state = ProgressState::default();
        state.current_question_index = 7;
        state.marked_for_review.insert("old".into());

        state
            .merge_document(&json!({
                "markedForReview": ["q1", "q2", "q1"],
                "currentFilter": {"subject": "math", "chapter": "intro"}
            }))
            .unwrap();

        assert_eq!(state.current_question_index, 7);
        assert_eq!(state.marked_for_review.len(), 2);
        assert!(state.marked_for_review.contains("q1"));
        assert!(!state.marked_for_review.contains("old"));
        assert_eq!(state.current_filter.chapter.as_deref(), Some("intro.json"));
    }

    #[test]
    fn test_merge_blank_filter_fields_are_absent() {
        let mut state = ProgressState::default();
        state
            .merge_document(&json!({
                "currentFilter": {"subject": "math", "division": "algebra", "chapter": ""}
            }))
            .unwrap();

        assert_eq!(state.current_filter.chapter, None);
        assert_eq!(
            state.current_filter.query_string(),
            "subject=math&division=algebra"
        );

        state
            .merge_document(&json!({"currentFilter": {"subject": ""}}))
            .unwrap();
        assert!(state.current_filter.is_empty());
    }

    #[test]
    fn test_merge_rejects_malformed_without_partial_update() {
        let mut state = ProgressState::default();
        state.current_question_index = 3;
        let before = state.clone();

        let result = state.merge_document(&json!({
            "currentQuestionIndex": 9,
            "markedForReview": "not-a-list"
        }));

        assert!(result.is_err());
        assert_eq!(state, before);
        assert!(state.merge_document(&json!([1, 2])).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn test_attempt_timestamp_formats() {
        let iso: AttemptRecord = serde_json::from_value(json!({
            "attempted": true,
            "selectedOption": "A",
            "correct": false,
            "timestamp": "2024-03-01T10:00:00.000Z"
        }))
        .unwrap();
        let millis: AttemptRecord = serde_json::from_value(json!({
            "attempted": true,
            "selectedOption": "A",
            "correct": false,
            "timestamp": 1709287200000_i64
        }))
        .unwrap();
        assert_eq!(iso.timestamp, millis.timestamp);
    }

    #[test]
    fn test_serialized_shape() {
        let mut state = ProgressState::default();
        state.marked_for_review.insert("q9".into());
        let json = serde_json::to_value(&state).unwrap();

        assert!(json["attemptedQuestions"].is_object());
        assert_eq!(json["markedForReview"], json!(["q9"]));
        assert_eq!(json["currentQuestionIndex"], json!(0));
        assert!(json["lastUpdated"].is_string());
    }
}
