//! 课时存储操作

use super::SeaOrmStorage;
use crate::entity::lessons::{ActiveModel, Column, Entity as Lessons};
use crate::errors::{Result, SchoolError};
use crate::models::{
    common::pagination::page_window,
    lessons::{
        entities::Lesson,
        requests::{CreateLessonRequest, LessonListQuery, UpdateLessonRequest},
        responses::LessonListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    /// 创建课时，未指定顺序时追加到末尾
    pub async fn create_lesson_impl(
        &self,
        course_id: i64,
        created_by: i64,
        req: CreateLessonRequest,
    ) -> Result<Lesson> {
        let now = chrono::Utc::now().timestamp();

        let position = match req.position {
            Some(p) => p,
            None => {
                let last = Lessons::find()
                    .filter(Column::CourseId.eq(course_id))
                    .order_by_desc(Column::Position)
                    .one(&self.db)
                    .await
                    .map_err(|e| SchoolError::database_operation(format!("查询课时失败: {e}")))?;
                last.map_or(1, |l| l.position + 1)
            }
        };

        let attachments = serde_json::to_string(&req.attachments.unwrap_or_default())?;

        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(req.title),
            content: Set(req.content),
            position: Set(position),
            scheduled_at: Set(req.scheduled_at.map(|t| t.timestamp())),
            attachments: Set(attachments),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "课时"))?;

        Ok(result.into_lesson())
    }

    pub async fn get_lesson_impl(&self, course_id: i64, lesson_id: i64) -> Result<Option<Lesson>> {
        let result = Lessons::find_by_id(lesson_id)
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询课时失败: {e}")))?;

        Ok(result.map(|m| m.into_lesson()))
    }

    /// 分页列出课时（按顺序）
    pub async fn list_lessons_with_pagination_impl(
        &self,
        course_id: i64,
        query: LessonListQuery,
    ) -> Result<LessonListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Lessons::find().filter(Column::CourseId.eq(course_id));

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Title.contains(&escaped));
        }

        select = select
            .order_by_asc(Column::Position)
            .order_by_asc(Column::Id);

        let (lessons, pagination) = super::fetch_page(&self.db, select, page, size, "课时").await?;

        Ok(LessonListResponse {
            items: lessons.into_iter().map(|m| m.into_lesson()).collect(),
            pagination,
        })
    }

    pub async fn update_lesson_impl(
        &self,
        lesson_id: i64,
        update: UpdateLessonRequest,
    ) -> Result<Option<Lesson>> {
        let Some(existing) = Lessons::find_by_id(lesson_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询课时失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(content) = update.content {
            model.content = Set(Some(content).filter(|s| !s.is_empty()));
        }
        if let Some(position) = update.position {
            model.position = Set(position);
        }
        if let Some(scheduled_at) = update.scheduled_at {
            model.scheduled_at = Set(Some(scheduled_at.timestamp()));
        }
        if let Some(attachments) = update.attachments {
            model.attachments = Set(serde_json::to_string(&attachments)?);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新课时失败: {e}")))?;

        Ok(Some(result.into_lesson()))
    }

    pub async fn delete_lesson_impl(&self, lesson_id: i64) -> Result<bool> {
        let result = Lessons::delete_by_id(lesson_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除课时失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_lessons_impl(&self, course_id: i64) -> Result<u64> {
        Lessons::find()
            .filter(Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("统计课时失败: {e}")))
    }
}
