//! 选课存储操作

use super::SeaOrmStorage;
use crate::entity::enrollments::{ActiveModel, Column, Entity as Enrollments};
use crate::entity::users::{Column as UserColumn, Entity as Users};
use crate::errors::{Result, SchoolError};
use crate::models::{
    common::pagination::page_window,
    enrollments::{
        entities::{Enrollment, EnrollmentStatus},
        requests::EnrollmentListQuery,
        responses::{EnrollmentListItem, EnrollmentListResponse},
    },
    users::entities::User,
};
use crate::storage::index_users;
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

impl SeaOrmStorage {
    /// 学生选课；已有退课记录时重新激活
    pub async fn enroll_student_impl(&self, course_id: i64, student_id: i64) -> Result<Enrollment> {
        let now = chrono::Utc::now().timestamp();

        let existing = Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询选课记录失败: {e}")))?;

        if let Some(existing) = existing {
            if existing.status != EnrollmentStatus::Withdrawn.as_str() {
                return Err(SchoolError::conflict("学生已选修该课程"));
            }
            let mut model: ActiveModel = existing.into();
            model.status = Set(EnrollmentStatus::Active.to_string());
            model.enrolled_at = Set(now);
            model.updated_at = Set(now);
            let result = model
                .update(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("更新选课记录失败: {e}")))?;
            return Ok(result.into_enrollment());
        }

        let model = ActiveModel {
            course_id: Set(course_id),
            student_id: Set(student_id),
            status: Set(EnrollmentStatus::Active.to_string()),
            enrolled_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "选课记录"))?;

        Ok(result.into_enrollment())
    }

    pub async fn get_enrollment_impl(
        &self,
        course_id: i64,
        student_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    pub async fn get_enrollment_by_id_impl(
        &self,
        course_id: i64,
        enrollment_id: i64,
    ) -> Result<Option<Enrollment>> {
        let result = Enrollments::find_by_id(enrollment_id)
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询选课记录失败: {e}")))?;

        Ok(result.map(|m| m.into_enrollment()))
    }

    /// 在读人数（用于容量校验）
    pub async fn count_active_enrollments_impl(&self, course_id: i64) -> Result<u64> {
        Enrollments::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.eq(EnrollmentStatus::Active.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("统计选课人数失败: {e}")))
    }

    /// 分页列出选课记录
    pub async fn list_enrollments_with_pagination_impl(
        &self,
        course_id: i64,
        query: EnrollmentListQuery,
    ) -> Result<EnrollmentListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Enrollments::find().filter(Column::CourseId.eq(course_id));

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        // 按学生用户名/姓名搜索
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            let matched: Vec<i64> = Users::find()
                .select_only()
                .column(UserColumn::Id)
                .filter(
                    Condition::any()
                        .add(UserColumn::Username.contains(&escaped))
                        .add(UserColumn::DisplayName.contains(&escaped))
                        .add(UserColumn::Email.contains(&escaped)),
                )
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("查询用户失败: {e}")))?;
            select = select.filter(Column::StudentId.is_in(matched));
        }

        select = select.order_by_asc(Column::EnrolledAt);

        let (enrollments, pagination) =
            super::fetch_page(&self.db, select, page, size, "选课记录").await?;

        let student_ids: Vec<i64> = enrollments.iter().map(|e| e.student_id).collect();
        let users = index_users(self.get_users_by_ids_impl(&student_ids).await?);

        let items = enrollments
            .into_iter()
            .filter_map(|m| {
                let user = users.get(&m.student_id)?;
                let e = m.into_enrollment();
                Some(EnrollmentListItem {
                    id: e.id,
                    course_id: e.course_id,
                    student_id: e.student_id,
                    status: e.status,
                    username: user.username.clone(),
                    display_name: user.display_name.clone(),
                    email: user.email.clone(),
                    enrolled_at: e.enrolled_at,
                })
            })
            .collect();

        Ok(EnrollmentListResponse { items, pagination })
    }

    pub async fn update_enrollment_status_impl(
        &self,
        enrollment_id: i64,
        status: EnrollmentStatus,
    ) -> Result<Option<Enrollment>> {
        let Some(existing) = Enrollments::find_by_id(enrollment_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询选课记录失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.status = Set(status.to_string());
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新选课记录失败: {e}")))?;

        Ok(Some(result.into_enrollment()))
    }

    pub async fn delete_enrollment_impl(&self, enrollment_id: i64) -> Result<bool> {
        let result = Enrollments::delete_by_id(enrollment_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除选课记录失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 课程内在读学生，按用户名排序
    pub async fn list_course_students_impl(&self, course_id: i64) -> Result<Vec<User>> {
        let student_ids: Vec<i64> = Enrollments::find()
            .select_only()
            .column(Column::StudentId)
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.eq(EnrollmentStatus::Active.to_string()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询选课记录失败: {e}")))?;

        let mut students = self.get_users_by_ids_impl(&student_ids).await?;
        students.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(students)
    }
}
