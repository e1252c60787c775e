use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 单个章节的信息
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterInfo {
    pub question_count: usize,
}

/// subject → division → chapter 的完整目录
pub type CatalogTree = BTreeMap<String, BTreeMap<String, BTreeMap<String, ChapterInfo>>>;

/// 目录汇总
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSummary {
    pub total_subjects: usize,
    pub total_divisions: usize,
    pub total_chapters: usize,
    pub total_questions: usize,
}

/// 题库目录结构
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStructure {
    pub structure: CatalogTree,
    #[serde(default)]
    pub summary: CatalogSummary,
}

impl CatalogStructure {
    /// 某个章节的题目数量
    pub fn question_count(&self, subject: &str, division: &str, chapter: &str) -> Option<usize> {
        self.structure
            .get(subject)?
            .get(division)?
            .get(chapter)
            .map(|info| info.question_count)
    }

    /// 按目录重新计算汇总
    pub fn computed_summary(&self) -> CatalogSummary {
        let divisions = self.structure.values().flat_map(|d| d.values());
        let mut summary = CatalogSummary {
            total_subjects: self.structure.len(),
            ..CatalogSummary::default()
        };
        for chapters in divisions {
            summary.total_divisions += 1;
            summary.total_chapters += chapters.len();
            summary.total_questions += chapters.values().map(|c| c.question_count).sum::<usize>();
        }
        summary
    }
}

/// 服务健康状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub subjects_available: usize,
    #[serde(default)]
    pub version: Option<String>,
}
