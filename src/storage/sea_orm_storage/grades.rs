//! 成绩存储操作

use super::SeaOrmStorage;
use crate::entity::grade_records::{ActiveModel, Column, Entity as GradeRecords};
use crate::errors::{Result, SchoolError};
use crate::models::{
    common::pagination::page_window,
    grades::{
        entities::{GradeCategory, GradeRecord},
        requests::{CreateGradeRequest, GradeListQuery, UpdateGradeRequest},
        responses::GradeListResponse,
    },
};
use crate::storage::ExamGradeSync;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

const DEFAULT_WEIGHT: f64 = 1.0;
const DEFAULT_MAX_SCORE: f64 = 100.0;

impl SeaOrmStorage {
    pub async fn create_grade_impl(
        &self,
        course_id: i64,
        graded_by: i64,
        req: CreateGradeRequest,
    ) -> Result<GradeRecord> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            course_id: Set(course_id),
            student_id: Set(req.student_id),
            exam_id: Set(req.exam_id),
            title: Set(req.title),
            category: Set(req.category.to_string()),
            score: Set(req.score),
            max_score: Set(req.max_score.unwrap_or(DEFAULT_MAX_SCORE)),
            weight: Set(req.weight.unwrap_or(DEFAULT_WEIGHT)),
            comment: Set(req.comment),
            graded_by: Set(graded_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "成绩"))?;

        Ok(result.into_grade())
    }

    pub async fn get_grade_impl(
        &self,
        course_id: i64,
        grade_id: i64,
    ) -> Result<Option<GradeRecord>> {
        let result = GradeRecords::find_by_id(grade_id)
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(result.map(|m| m.into_grade()))
    }

    pub async fn list_grades_with_pagination_impl(
        &self,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = GradeRecords::find();
        if let Some(course_id) = query.course_id {
            select = select.filter(Column::CourseId.eq(course_id));
        }
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(category) = query.category {
            select = select.filter(Column::Category.eq(category.to_string()));
        }
        select = select.order_by_desc(Column::CreatedAt);

        let (grades, pagination) = super::fetch_page(&self.db, select, page, size, "成绩").await?;

        Ok(GradeListResponse {
            items: grades.into_iter().map(|m| m.into_grade()).collect(),
            pagination,
        })
    }

    pub async fn update_grade_impl(
        &self,
        grade_id: i64,
        update: UpdateGradeRequest,
    ) -> Result<Option<GradeRecord>> {
        let Some(existing) = GradeRecords::find_by_id(grade_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询成绩失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(category) = update.category {
            model.category = Set(category.to_string());
        }
        if let Some(score) = update.score {
            model.score = Set(score);
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }
        if let Some(weight) = update.weight {
            model.weight = Set(weight);
        }
        if let Some(comment) = update.comment {
            model.comment = Set(Some(comment).filter(|s| !s.is_empty()));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新成绩失败: {e}")))?;

        Ok(Some(result.into_grade()))
    }

    pub async fn delete_grade_impl(&self, grade_id: i64) -> Result<bool> {
        let result = GradeRecords::delete_by_id(grade_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除成绩失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_course_grades_impl(&self, course_id: i64) -> Result<Vec<GradeRecord>> {
        let grades = GradeRecords::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_grade()).collect())
    }

    pub async fn list_student_grades_impl(&self, student_id: i64) -> Result<Vec<GradeRecord>> {
        let grades = GradeRecords::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_asc(Column::CourseId)
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询成绩失败: {e}")))?;

        Ok(grades.into_iter().map(|m| m.into_grade()).collect())
    }

    pub async fn upsert_exam_grade_impl(&self, sync: ExamGradeSync) -> Result<GradeRecord> {
        upsert_exam_grade_on(&self.db, sync).await
    }
}

/// 按 (考试, 学生) 写入或更新考试成绩，可在事务中调用
pub(super) async fn upsert_exam_grade_on<C: ConnectionTrait>(
    conn: &C,
    sync: ExamGradeSync,
) -> Result<GradeRecord> {
    let now = chrono::Utc::now().timestamp();

    let existing = GradeRecords::find()
        .filter(Column::ExamId.eq(sync.exam_id))
        .filter(Column::StudentId.eq(sync.student_id))
        .one(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("查询成绩失败: {e}")))?;

    let result = match existing {
        Some(existing) => {
            let mut model: ActiveModel = existing.into();
            model.title = Set(sync.title);
            model.score = Set(sync.score);
            model.max_score = Set(sync.max_score);
            model.comment = Set(sync.comment);
            model.graded_by = Set(sync.graded_by);
            model.updated_at = Set(now);
            model
                .update(conn)
                .await
                .map_err(|e| SchoolError::database_operation(format!("更新成绩失败: {e}")))?
        }
        None => ActiveModel {
            course_id: Set(sync.course_id),
            student_id: Set(sync.student_id),
            exam_id: Set(Some(sync.exam_id)),
            title: Set(sync.title),
            category: Set(GradeCategory::Exam.to_string()),
            score: Set(sync.score),
            max_score: Set(sync.max_score),
            weight: Set(DEFAULT_WEIGHT),
            comment: Set(sync.comment),
            graded_by: Set(sync.graded_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| super::insert_error(e, "成绩"))?,
    };

    Ok(result.into_grade())
}
