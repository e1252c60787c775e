use serde::{Deserialize, Serialize};
use std::fmt;

/// 章节文件后缀，目录中的章节都带这个后缀
pub const CHAPTER_SUFFIX: &str = ".json";

/// 题目筛选条件
///
/// 三个层级都是可选的，缺省表示该层级不做限制。
/// 层级约束（division 依赖 subject，chapter 依赖 subject + division）
/// 由 `FilterController` 保证，服务端不做校验。
///
/// 反序列化同样经过 `Filter::new`，保存的空字符串不会变成筛选值。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "FilterFields")]
pub struct Filter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub division: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
}

#[derive(Deserialize)]
struct FilterFields {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    division: Option<String>,
    #[serde(default)]
    chapter: Option<String>,
}

impl From<FilterFields> for Filter {
    fn from(fields: FilterFields) -> Self {
        Filter::new(fields.subject, fields.division, fields.chapter)
    }
}

impl Filter {
    /// 创建筛选条件，空字符串视为未设置
    pub fn new(
        subject: Option<String>,
        division: Option<String>,
        chapter: Option<String>,
    ) -> Self {
        Self {
            subject: non_empty(subject),
            division: non_empty(division),
            chapter: non_empty(chapter),
        }
    }

    pub fn subject(subject: impl Into<String>) -> Self {
        Self::new(Some(subject.into()), None, None)
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.division.is_none() && self.chapter.is_none()
    }

    /// 规范化：章节名缺少后缀时补齐，使其与目录条目一致
    pub fn normalized(mut self) -> Self {
        self.chapter = self.chapter.map(normalize_chapter);
        self
    }

    /// 规范查询串，同时作为题目缓存的 key
    ///
    /// 只包含已设置的字段，顺序固定为 subject、division、chapter。
    pub fn query_string(&self) -> String {
        [
            ("subject", &self.subject),
            ("division", &self.division),
            ("chapter", &self.chapter),
        ]
        .iter()
        .filter_map(|(key, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", key, urlencoding::encode(v)))
        })
        .collect::<Vec<_>>()
        .join("&")
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "[全部题目]");
        }
        write!(
            f,
            "[{} / {} / {}]",
            self.subject.as_deref().unwrap_or("*"),
            self.division.as_deref().unwrap_or("*"),
            self.chapter.as_deref().unwrap_or("*")
        )
    }
}

/// 章节名补齐 `.json` 后缀，空章节名保持不变
pub fn normalize_chapter(chapter: String) -> String {
    if chapter.is_empty() || chapter.ends_with(CHAPTER_SUFFIX) {
        chapter
    } else {
        format!("{}{}", chapter, CHAPTER_SUFFIX)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string_fixed_order() {
        let filter = Filter::new(
            Some("math".into()),
            Some("algebra".into()),
            Some("ch 1.json".into()),
        );
        assert_eq!(
            filter.query_string(),
            "subject=math&division=algebra&chapter=ch%201.json"
        );
    }

    #[test]
    fn test_query_string_skips_missing_levels() {
        assert_eq!(Filter::default().query_string(), "");
        assert_eq!(Filter::subject("math").query_string(), "subject=math");
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let filter = Filter::new(Some(String::new()), Some("  ".into()), None);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_normalize_chapter() {
        assert_eq!(normalize_chapter("intro".into()), "intro.json");
        assert_eq!(normalize_chapter("intro.json".into()), "intro.json");
        assert_eq!(normalize_chapter(String::new()), "");
    }

    #[test]
    fn test_deserialize_blank_fields_as_absent() {
        let filter: Filter = serde_json::from_value(serde_json::json!({
            "subject": "math",
            "division": " ",
            "chapter": ""
        }))
        .unwrap();
        assert_eq!(filter, Filter::subject("math"));
        assert_eq!(filter.normalized().query_string(), "subject=math");
    }

    #[test]
    fn test_filter_serializes_without_missing_fields() {
        let json = serde_json::to_value(Filter::subject("math")).unwrap();
        assert_eq!(json, serde_json::json!({ "subject": "math" }));
    }
}
