//! 考试作答实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_submissions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub student_id: i64,
    pub status: String,
    pub started_at: i64,
    pub deadline_at: i64,
    pub submitted_at: Option<i64>,
    pub elapsed_seconds: Option<i64>,
    /// 答案（JSON 对象：题目 ID -> 答案）
    #[sea_orm(column_type = "Text")]
    pub answers: String,
    /// 监考告警（JSON 数组）
    #[sea_orm(column_type = "Text")]
    pub warnings: String,
    #[sea_orm(column_type = "Double", nullable)]
    pub auto_score: Option<f64>,
    #[sea_orm(column_type = "Double", nullable)]
    pub score: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub feedback: Option<String>,
    pub recording_token: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::StudentId",
        to = "super::users::Column::Id"
    )]
    Student,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_submission(self) -> crate::models::exam_sessions::entities::ExamSubmission {
        use crate::models::exam_sessions::entities::{ExamSubmission, SessionStatus};

        ExamSubmission {
            id: self.id,
            exam_id: self.exam_id,
            student_id: self.student_id,
            status: self
                .status
                .parse::<SessionStatus>()
                .unwrap_or(SessionStatus::InProgress),
            started_at: super::from_ts(self.started_at),
            deadline_at: super::from_ts(self.deadline_at),
            submitted_at: self.submitted_at.map(super::from_ts),
            elapsed_seconds: self.elapsed_seconds,
            answers: serde_json::from_str(&self.answers).unwrap_or_default(),
            warnings: serde_json::from_str(&self.warnings).unwrap_or_default(),
            auto_score: self.auto_score,
            score: self.score,
            feedback: self.feedback,
            recording_token: self.recording_token,
            graded_by: self.graded_by,
            graded_at: self.graded_at.map(super::from_ts),
        }
    }
}
