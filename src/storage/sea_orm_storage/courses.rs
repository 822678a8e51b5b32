//! 课程存储操作

use super::SeaOrmStorage;
use crate::entity::course_assignments::{
    ActiveModel as AssignmentActiveModel, Column as AssignmentColumn,
    Entity as CourseAssignments,
};
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::enrollments::{Column as EnrollmentColumn, Entity as Enrollments};
use crate::errors::{Result, SchoolError};
use crate::models::{
    assignments::entities::AssignmentRole,
    common::pagination::page_window,
    courses::{
        entities::{Course, CourseRole},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
    enrollments::entities::EnrollmentStatus,
};
use crate::utils::{escape_like_pattern, random_code::generate_random_code};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

const COURSE_CODE_LEN: usize = 8;

impl SeaOrmStorage {
    /// 生成未被占用的课程代码
    async fn unused_course_code(&self) -> Result<String> {
        loop {
            let code = generate_random_code(COURSE_CODE_LEN);
            let exists = Courses::find()
                .filter(Column::Code.eq(&code))
                .one(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("查询课程代码失败: {e}")))?
                .is_some();
            if !exists {
                return Ok(code);
            }
        }
    }

    /// 创建课程
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();
        let code = self.unused_course_code().await?;

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            code: Set(code),
            name: Set(req.name),
            language: Set(req.language),
            level: Set(req.level),
            description: Set(req.description),
            schedule: Set(req.schedule),
            capacity: Set(req.capacity),
            teacher_id: Set(req.teacher_id),
            status: Set(crate::models::courses::entities::CourseStatus::Active.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let course = model
            .insert(&txn)
            .await
            .map_err(|e| super::insert_error(e, "课程"))?;

        if let Some(teacher_id) = req.teacher_id {
            ensure_teacher_assignment(&txn, course.id, teacher_id, now).await?;
        }

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(course.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: i64) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Courses::find();

        // 成员筛选：被分配或在读的课程
        if let Some(member_id) = query.member_id {
            let mut ids: Vec<i64> = CourseAssignments::find()
                .select_only()
                .column(AssignmentColumn::CourseId)
                .filter(AssignmentColumn::UserId.eq(member_id))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("查询课程分配失败: {e}")))?;
            let enrolled: Vec<i64> = Enrollments::find()
                .select_only()
                .column(EnrollmentColumn::CourseId)
                .filter(EnrollmentColumn::StudentId.eq(member_id))
                .filter(EnrollmentColumn::Status.ne(EnrollmentStatus::Withdrawn.to_string()))
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("查询选课记录失败: {e}")))?;
            ids.extend(enrolled);
            select = select.filter(Column::Id.is_in(ids));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Name.contains(&escaped))
                    .add(Column::Code.contains(&escaped)),
            );
        }

        if let Some(ref language) = query.language {
            select = select.filter(Column::Language.eq(language.as_str()));
        }

        if let Some(ref level) = query.level {
            select = select.filter(Column::Level.eq(level.as_str()));
        }

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let (courses, pagination) = super::fetch_page(&self.db, select, page, size, "课程").await?;

        Ok(CourseListResponse {
            items: courses.into_iter().map(|m| m.into_course()).collect(),
            pagination,
        })
    }

    /// 更新课程信息
    pub async fn update_course_impl(
        &self,
        course_id: i64,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        if self.get_course_by_id_impl(course_id).await?.is_none() {
            return Ok(None);
        }

        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let mut model = ActiveModel {
            id: Set(course_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(name) = update.name {
            model.name = Set(name);
        }
        if let Some(language) = update.language {
            model.language = Set(language);
        }
        if let Some(level) = update.level {
            model.level = Set(level);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description).filter(|s| !s.is_empty()));
        }
        if let Some(schedule) = update.schedule {
            model.schedule = Set(Some(schedule).filter(|s| !s.is_empty()));
        }
        if let Some(capacity) = update.capacity {
            model.capacity = Set(Some(capacity));
        }
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(Some(teacher_id));
            ensure_teacher_assignment(&txn, course_id, teacher_id, now).await?;
        }

        model
            .update(&txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新课程失败: {e}")))?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_course_by_id_impl(course_id).await
    }

    /// 删除课程（级联删除课时、考试、成绩等）
    pub async fn delete_course_impl(&self, course_id: i64) -> Result<bool> {
        let result = Courses::delete_by_id(course_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 获取用户在课程中的身份
    pub async fn get_course_role_impl(
        &self,
        course_id: i64,
        user_id: i64,
    ) -> Result<Option<CourseRole>> {
        if let Some(assignment) = self.get_course_assignment_impl(course_id, user_id).await? {
            return Ok(Some(match assignment.role {
                AssignmentRole::Teacher => CourseRole::Teacher,
                AssignmentRole::Assistant => CourseRole::Assistant,
            }));
        }

        let enrolled = self
            .get_enrollment_impl(course_id, user_id)
            .await?
            .is_some_and(|e| e.status != EnrollmentStatus::Withdrawn);

        Ok(enrolled.then_some(CourseRole::Student))
    }
}

/// 保证主讲教师拥有教师分配记录
async fn ensure_teacher_assignment<C: ConnectionTrait>(
    conn: &C,
    course_id: i64,
    teacher_id: i64,
    now: i64,
) -> Result<()> {
    let existing = CourseAssignments::find()
        .filter(AssignmentColumn::CourseId.eq(course_id))
        .filter(AssignmentColumn::UserId.eq(teacher_id))
        .one(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询课程分配失败: {e}")))?;

    match existing {
        Some(a) if a.role == AssignmentRole::Teacher.as_str() => Ok(()),
        Some(a) => {
            let mut model: AssignmentActiveModel = a.into();
            model.role = Set(AssignmentRole::Teacher.to_string());
            model
                .update(conn)
                .await
                .map_err(|e| SchoolError::database_operation(format!("更新课程分配失败: {e}")))?;
            Ok(())
        }
        None => {
            AssignmentActiveModel {
                course_id: Set(course_id),
                user_id: Set(teacher_id),
                role: Set(AssignmentRole::Teacher.to_string()),
                assigned_at: Set(now),
                ..Default::default()
            }
            .insert(conn)
            .await
            .map_err(|e| super::insert_error(e, "课程分配"))?;
            Ok(())
        }
    }
}
