//! 判分规则
//!
//! 依次尝试：
//! 1. 题目有正确选项列表 → 所选是否在列表中
//! 2. 题目有参考答案 → 去除首尾空白后忽略大小写比较
//! 3. 两者都没有 → 判为错误

use crate::models::Question;

/// 判断作答是否正确
pub fn evaluate(question: &Question, selection: &str) -> bool {
    if let Some(correct_options) = &question.correct_options {
        return correct_options.iter().any(|option| option == selection);
    }

    if let Some(answer) = &question.answer {
        return answer.trim().to_lowercase() == selection.trim().to_lowercase();
    }

    // 无法判分的题目按错误处理
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_membership() {
        let question = Question::new("q1", "?").with_correct_options(["B"]);
        assert!(evaluate(&question, "B"));
        assert!(!evaluate(&question, "A"));
        assert!(!evaluate(&question, "b"));
    }

    #[test]
    fn test_multiple_correct_options() {
        let question = Question::new("q1", "?").with_correct_options(["A", "C"]);
        assert!(evaluate(&question, "A"));
        assert!(evaluate(&question, "C"));
        assert!(!evaluate(&question, "B"));
    }

    #[test]
    fn test_free_text_trim_and_case() {
        let question = Question::new("q2", "Capital of France?").with_answer("Paris");
        assert!(evaluate(&question, " paris "));
        assert!(evaluate(&question, "PARIS"));
        assert!(!evaluate(&question, "Lyon"));
    }

    #[test]
    fn test_correct_options_take_precedence() {
        let question = Question::new("q", "?")
            .with_correct_options(["A"])
            .with_answer("B");
        assert!(!evaluate(&question, "B"));
    }

    #[test]
    fn test_unscoreable_question_is_incorrect() {
        assert!(!evaluate(&Question::new("q", "?"), "anything"));
    }
}
