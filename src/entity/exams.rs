//! 考试实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "exams")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub duration_minutes: i32,
    #[sea_orm(column_type = "Double")]
    pub max_score: f64,
    pub available_from: Option<i64>,
    pub available_until: Option<i64>,
    pub require_all_answered: bool,
    pub proctoring_enabled: bool,
    pub published: bool,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::exam_questions::Entity")]
    Questions,
    #[sea_orm(has_many = "super::exam_submissions::Entity")]
    Submissions,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::exam_questions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl Related<super::exam_submissions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_exam(self) -> crate::models::exams::entities::Exam {
        use crate::models::exams::entities::Exam;

        Exam {
            id: self.id,
            course_id: self.course_id,
            title: self.title,
            description: self.description,
            duration_minutes: self.duration_minutes,
            max_score: self.max_score,
            available_from: self.available_from.map(super::from_ts),
            available_until: self.available_until.map(super::from_ts),
            require_all_answered: self.require_all_answered,
            proctoring_enabled: self.proctoring_enabled,
            published: self.published,
            created_by: self.created_by,
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
