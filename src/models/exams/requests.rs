use super::entities::QuestionKind;
use crate::models::common::PaginationQuery;
use serde::Deserialize;
use ts_rs::TS;

pub const DEFAULT_SECTION: &str = "General";
pub const MAX_DURATION_MINUTES: i32 = 600;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct QuestionInput {
    pub section: Option<String>,
    pub kind: QuestionKind,
    pub prompt: String,
    pub options: Option<Vec<String>>,
    pub correct_option: Option<i32>,
    pub points: Option<f64>,
    pub required: Option<bool>,
}

impl QuestionInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.prompt.trim().is_empty() {
            return Err("题目内容不能为空".to_string());
        }
        if let Some(points) = self.points
            && (!points.is_finite() || points < 0.0)
        {
            return Err("题目分值必须为非负数".to_string());
        }
        match self.kind {
            QuestionKind::MultipleChoice => {
                let options = self.options.as_deref().unwrap_or_default();
                if options.len() < 2 {
                    return Err("选择题至少需要两个选项".to_string());
                }
                if options.iter().any(|o| o.trim().is_empty()) {
                    return Err("选项内容不能为空".to_string());
                }
                match self.correct_option {
                    Some(idx) if idx >= 0 && (idx as usize) < options.len() => Ok(()),
                    Some(_) => Err("正确选项超出范围".to_string()),
                    None => Err("选择题必须指定正确选项".to_string()),
                }
            }
            QuestionKind::FreeText => {
                if self.correct_option.is_some() {
                    return Err("简答题不能设置正确选项".to_string());
                }
                if self.options.as_ref().is_some_and(|o| !o.is_empty()) {
                    return Err("简答题不能设置选项".to_string());
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct CreateExamRequest {
    pub title: String,
    pub description: Option<String>,
    pub duration_minutes: i32,
    pub max_score: Option<f64>,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub available_until: Option<chrono::DateTime<chrono::Utc>>,
    pub require_all_answered: Option<bool>,
    pub proctoring_enabled: Option<bool>,
    pub questions: Option<Vec<QuestionInput>>,
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct UpdateExamRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration_minutes: Option<i32>,
    pub max_score: Option<f64>,
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    pub available_until: Option<chrono::DateTime<chrono::Utc>>,
    pub require_all_answered: Option<bool>,
    pub proctoring_enabled: Option<bool>,
}

// 整体替换题目
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ReplaceQuestionsRequest {
    pub questions: Vec<QuestionInput>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct PublishExamRequest {
    pub published: bool,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct ExamListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub published: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice(options: &[&str], correct: Option<i32>) -> QuestionInput {
        QuestionInput {
            section: None,
            kind: QuestionKind::MultipleChoice,
            prompt: "Choose the past tense of 'go'".to_string(),
            options: Some(options.iter().map(|s| s.to_string()).collect()),
            correct_option: correct,
            points: Some(2.0),
            required: None,
        }
    }

    #[test]
    fn test_multiple_choice_validation() {
        assert!(choice(&["went", "goed"], Some(0)).validate().is_ok());
        assert!(choice(&["went", "goed"], Some(2)).validate().is_err());
        assert!(choice(&["went", "goed"], None).validate().is_err());
        assert!(choice(&["went"], Some(0)).validate().is_err());
        assert!(choice(&["went", " "], Some(0)).validate().is_err());
    }

    #[test]
    fn test_free_text_validation() {
        let mut q = QuestionInput {
            section: Some("Writing".to_string()),
            kind: QuestionKind::FreeText,
            prompt: "Describe your weekend".to_string(),
            options: None,
            correct_option: None,
            points: None,
            required: Some(true),
        };
        assert!(q.validate().is_ok());
        q.correct_option = Some(0);
        assert!(q.validate().is_err());
        q.correct_option = None;
        q.options = Some(vec!["yes".to_string(), "no".to_string()]);
        assert!(q.validate().is_err());
        q.options = Some(Vec::new());
        assert!(q.validate().is_ok());
        q.options = None;
        q.points = Some(-1.0);
        assert!(q.validate().is_err());
        q.points = Some(1.0);
        q.prompt = "  ".to_string();
        assert!(q.validate().is_err());
    }
}
