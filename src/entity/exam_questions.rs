//! 考试题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exam_questions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub exam_id: i64,
    pub section: String,
    pub position: i32,
    pub kind: String,
    #[sea_orm(column_type = "Text")]
    pub prompt: String,
    /// 选项列表（JSON 数组）
    #[sea_orm(column_type = "Text")]
    pub options: String,
    pub correct_option: Option<i32>,
    #[sea_orm(column_type = "Double")]
    pub points: f64,
    pub required: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::exams::Entity",
        from = "Column::ExamId",
        to = "super::exams::Column::Id"
    )]
    Exam,
}

impl Related<super::exams::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Exam.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(self) -> crate::models::exams::entities::Question {
        use crate::models::exams::entities::{Question, QuestionKind};

        Question {
            id: self.id,
            exam_id: self.exam_id,
            section: self.section,
            position: self.position,
            kind: self
                .kind
                .parse::<QuestionKind>()
                .unwrap_or(QuestionKind::FreeText),
            prompt: self.prompt,
            options: serde_json::from_str(&self.options).unwrap_or_default(),
            correct_option: self.correct_option,
            points: self.points,
            required: self.required,
        }
    }
}
