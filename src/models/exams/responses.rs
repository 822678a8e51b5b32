use super::entities::{Exam, Question};
use crate::models::common::PaginationInfo;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamListResponse {
    pub items: Vec<Exam>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamSection {
    pub name: String,
    pub questions: Vec<Question>,
}

// 考试详情，题目按分节分组
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "exam.ts")]
pub struct ExamDetailResponse {
    pub exam: Exam,
    pub sections: Vec<ExamSection>,
    pub total_points: f64,
}

impl ExamDetailResponse {
    /// 按题目顺序分组，分节顺序取该分节第一道题出现的位置
    pub fn new(exam: Exam, mut questions: Vec<Question>) -> Self {
        questions.sort_by_key(|q| q.position);
        let total_points = questions.iter().map(|q| q.points).sum();
        let mut sections: Vec<ExamSection> = Vec::new();
        for q in questions {
            match sections.iter_mut().find(|s| s.name == q.section) {
                Some(section) => section.questions.push(q),
                None => sections.push(ExamSection {
                    name: q.section.clone(),
                    questions: vec![q],
                }),
            }
        }
        Self {
            exam,
            sections,
            total_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::exams::entities::QuestionKind;

    fn question(id: i64, section: &str, position: i32) -> Question {
        Question {
            id,
            exam_id: 1,
            section: section.to_string(),
            position,
            kind: QuestionKind::FreeText,
            prompt: format!("q{id}"),
            options: vec![],
            correct_option: None,
            points: 1.5,
            required: true,
        }
    }

    fn exam() -> Exam {
        let now = chrono::Utc::now();
        Exam {
            id: 1,
            course_id: 1,
            title: "Midterm".to_string(),
            description: None,
            duration_minutes: 30,
            max_score: 100.0,
            available_from: None,
            available_until: None,
            require_all_answered: false,
            proctoring_enabled: true,
            published: true,
            created_by: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_sections_follow_question_order() {
        let detail = ExamDetailResponse::new(
            exam(),
            vec![
                question(3, "Reading", 3),
                question(1, "Listening", 1),
                question(2, "Reading", 2),
                question(4, "Listening", 4),
            ],
        );
        let names: Vec<_> = detail.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Listening", "Reading"]);
        assert_eq!(detail.sections[0].questions.len(), 2);
        assert_eq!(detail.sections[1].questions[0].id, 2);
        assert!((detail.total_points - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_exam_window() {
        let mut e = exam();
        let now = chrono::Utc::now();
        assert!(e.is_open_at(now));
        e.available_from = Some(now + chrono::Duration::hours(1));
        assert!(!e.is_open_at(now));
        e.available_from = Some(now - chrono::Duration::hours(2));
        e.available_until = Some(now - chrono::Duration::hours(1));
        assert!(!e.is_open_at(now));
    }
}
