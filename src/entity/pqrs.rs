//! PQR 工单实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pqrs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub requester_id: i64,
    pub course_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub kind: String,
    pub subject: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub response: Option<String>,
    pub responded_by: Option<i64>,
    pub responded_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RequesterId",
        to = "super::users::Column::Id"
    )]
    Requester,
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requester.def()
    }
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_pqr(self) -> crate::models::pqrs::entities::Pqr {
        use crate::models::pqrs::entities::{Pqr, PqrKind, PqrStatus};

        Pqr {
            id: self.id,
            requester_id: self.requester_id,
            course_id: self.course_id,
            assignee_id: self.assignee_id,
            kind: self.kind.parse::<PqrKind>().unwrap_or(PqrKind::Petition),
            subject: self.subject,
            description: self.description,
            status: self.status.parse::<PqrStatus>().unwrap_or(PqrStatus::Open),
            response: self.response,
            responded_by: self.responded_by,
            responded_at: self.responded_at.map(super::from_ts),
            created_at: super::from_ts(self.created_at),
            updated_at: super::from_ts(self.updated_at),
        }
    }
}
