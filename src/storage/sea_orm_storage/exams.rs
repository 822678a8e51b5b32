//! 考试与题目存储操作

use super::SeaOrmStorage;
use crate::entity::exam_questions::{
    ActiveModel as QuestionActiveModel, Column as QuestionColumn, Entity as ExamQuestions,
};
use crate::entity::exams::{ActiveModel, Column, Entity as Exams};
use crate::errors::{Result, SchoolError};
use crate::models::{
    common::pagination::page_window,
    exams::{
        entities::{Exam, Question, QuestionKind},
        requests::{
            CreateExamRequest, DEFAULT_SECTION, ExamListQuery, QuestionInput, UpdateExamRequest,
        },
        responses::ExamListResponse,
    },
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

const DEFAULT_MAX_SCORE: f64 = 100.0;
const DEFAULT_POINTS: f64 = 1.0;

impl SeaOrmStorage {
    /// 创建考试（可同时写入题目）
    pub async fn create_exam_impl(
        &self,
        course_id: i64,
        created_by: i64,
        req: CreateExamRequest,
    ) -> Result<Exam> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let model = ActiveModel {
            course_id: Set(course_id),
            title: Set(req.title),
            description: Set(req.description),
            duration_minutes: Set(req.duration_minutes),
            max_score: Set(req.max_score.unwrap_or(DEFAULT_MAX_SCORE)),
            available_from: Set(req.available_from.map(|t| t.timestamp())),
            available_until: Set(req.available_until.map(|t| t.timestamp())),
            require_all_answered: Set(req.require_all_answered.unwrap_or(false)),
            proctoring_enabled: Set(req.proctoring_enabled.unwrap_or(true)),
            published: Set(false),
            created_by: Set(created_by),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let exam = model
            .insert(&txn)
            .await
            .map_err(|e| super::insert_error(e, "考试"))?;

        if let Some(questions) = req.questions {
            insert_questions(&txn, exam.id, questions).await?;
        }

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(exam.into_exam())
    }

    pub async fn get_exam_impl(&self, course_id: i64, exam_id: i64) -> Result<Option<Exam>> {
        let result = Exams::find_by_id(exam_id)
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试失败: {e}")))?;

        Ok(result.map(|m| m.into_exam()))
    }

    pub async fn list_exams_with_pagination_impl(
        &self,
        course_id: i64,
        query: ExamListQuery,
    ) -> Result<ExamListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = Exams::find().filter(Column::CourseId.eq(course_id));

        if let Some(published) = query.published {
            select = select.filter(Column::Published.eq(published));
        }

        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(Column::Title.contains(&escaped));
        }

        select = select.order_by_desc(Column::CreatedAt);

        let (exams, pagination) = super::fetch_page(&self.db, select, page, size, "考试").await?;

        Ok(ExamListResponse {
            items: exams.into_iter().map(|m| m.into_exam()).collect(),
            pagination,
        })
    }

    pub async fn update_exam_impl(
        &self,
        exam_id: i64,
        update: UpdateExamRequest,
    ) -> Result<Option<Exam>> {
        let Some(existing) = Exams::find_by_id(exam_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());

        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(description) = update.description {
            model.description = Set(Some(description).filter(|s| !s.is_empty()));
        }
        if let Some(duration) = update.duration_minutes {
            model.duration_minutes = Set(duration);
        }
        if let Some(max_score) = update.max_score {
            model.max_score = Set(max_score);
        }
        if let Some(from) = update.available_from {
            model.available_from = Set(Some(from.timestamp()));
        }
        if let Some(until) = update.available_until {
            model.available_until = Set(Some(until.timestamp()));
        }
        if let Some(flag) = update.require_all_answered {
            model.require_all_answered = Set(flag);
        }
        if let Some(flag) = update.proctoring_enabled {
            model.proctoring_enabled = Set(flag);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新考试失败: {e}")))?;

        Ok(Some(result.into_exam()))
    }

    pub async fn set_exam_published_impl(
        &self,
        exam_id: i64,
        published: bool,
    ) -> Result<Option<Exam>> {
        let Some(existing) = Exams::find_by_id(exam_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.published = Set(published);
        model.updated_at = Set(chrono::Utc::now().timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新考试失败: {e}")))?;

        Ok(Some(result.into_exam()))
    }

    pub async fn delete_exam_impl(&self, exam_id: i64) -> Result<bool> {
        let result = Exams::delete_by_id(exam_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除考试失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn count_exams_impl(&self, course_id: i64) -> Result<u64> {
        Exams::find()
            .filter(Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("统计考试失败: {e}")))
    }

    /// 整体替换题目
    pub async fn replace_exam_questions_impl(
        &self,
        exam_id: i64,
        questions: Vec<QuestionInput>,
    ) -> Result<Vec<Question>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        ExamQuestions::delete_many()
            .filter(QuestionColumn::ExamId.eq(exam_id))
            .exec(&txn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除题目失败: {e}")))?;

        insert_questions(&txn, exam_id, questions).await?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        self.list_exam_questions_impl(exam_id).await
    }

    pub async fn list_exam_questions_impl(&self, exam_id: i64) -> Result<Vec<Question>> {
        let questions = ExamQuestions::find()
            .filter(QuestionColumn::ExamId.eq(exam_id))
            .order_by_asc(QuestionColumn::Position)
            .order_by_asc(QuestionColumn::Id)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询题目失败: {e}")))?;

        Ok(questions.into_iter().map(|m| m.into_question()).collect())
    }
}

/// 按输入顺序写入题目，position 从 1 开始
async fn insert_questions<C: ConnectionTrait>(
    conn: &C,
    exam_id: i64,
    questions: Vec<QuestionInput>,
) -> Result<()> {
    for (idx, q) in questions.into_iter().enumerate() {
        let section = q
            .section
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());
        // 简答题不保存选项
        let options = match q.kind {
            QuestionKind::FreeText => Vec::new(),
            QuestionKind::MultipleChoice => q.options.unwrap_or_default(),
        };

        QuestionActiveModel {
            exam_id: Set(exam_id),
            section: Set(section),
            position: Set(idx as i32 + 1),
            kind: Set(q.kind.to_string()),
            prompt: Set(q.prompt),
            options: Set(serde_json::to_string(&options)?),
            correct_option: Set(q.correct_option),
            points: Set(q.points.unwrap_or(DEFAULT_POINTS)),
            required: Set(q.required.unwrap_or(true)),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("创建题目失败: {e}")))?;
    }
    Ok(())
}
