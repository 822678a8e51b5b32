//! 课程分配存储操作

use super::SeaOrmStorage;
use crate::entity::course_assignments::{ActiveModel, Column, Entity as CourseAssignments};
use crate::errors::{Result, SchoolError};
use crate::models::assignments::{
    entities::{AssignmentRole, CourseAssignment},
    responses::AssignmentListItem,
};
use crate::storage::index_users;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

impl SeaOrmStorage {
    /// 列出课程的教师与助教
    pub async fn list_course_assignments_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<AssignmentListItem>> {
        let assignments = CourseAssignments::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::AssignedAt)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询课程分配失败: {e}")))?;

        let user_ids: Vec<i64> = assignments.iter().map(|a| a.user_id).collect();
        let users = index_users(self.get_users_by_ids_impl(&user_ids).await?);

        Ok(assignments
            .into_iter()
            .filter_map(|m| {
                let user = users.get(&m.user_id)?;
                let a = m.into_assignment();
                Some(AssignmentListItem {
                    id: a.id,
                    course_id: a.course_id,
                    user_id: a.user_id,
                    role: a.role,
                    username: user.username.clone(),
                    display_name: user.display_name.clone(),
                    email: user.email.clone(),
                    assigned_at: a.assigned_at,
                })
            })
            .collect())
    }

    pub async fn get_course_assignment_impl(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<CourseAssignment>> {
        let result = CourseAssignments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询课程分配失败: {e}")))?;

        Ok(result.map(|m| m.into_assignment()))
    }

    /// 分配教师/助教
    pub async fn assign_course_staff_impl(
        &self,
        course_id: i64,
        user_id: i64,
        role: AssignmentRole,
    ) -> Result<CourseAssignment> {
        let model = ActiveModel {
            course_id: Set(course_id),
            user_id: Set(user_id),
            role: Set(role.to_string()),
            assigned_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "课程分配"))?;

        Ok(result.into_assignment())
    }

    /// 取消分配
    pub async fn unassign_course_staff_impl(&self, course_id: i64, user_id: i64) -> Result<bool> {
        let result = CourseAssignments::delete_many()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除课程分配失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
