//! 考试作答存储操作

use super::SeaOrmStorage;
use crate::entity::exam_submissions::{ActiveModel, Column, Entity as ExamSubmissions, Model};
use crate::entity::exams::{Column as ExamColumn, Entity as Exams};
use crate::errors::{Result, SchoolError};
use crate::models::{
    common::pagination::page_window,
    exam_sessions::{
        entities::{ExamSubmission, ProctoringWarning, SessionStatus},
        requests::{SubmissionListQuery, SubmissionUpdate, WarningAppend},
        responses::{SubmissionListItem, SubmissionListResponse},
    },
};
use crate::storage::{ExamGradeSync, index_users};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;

// 乐观并发写入的最大尝试次数
const CAS_ATTEMPTS: usize = 8;

impl SeaOrmStorage {
    /// 创建作答记录，每个学生每场考试仅一条
    pub async fn create_exam_submission_impl(
        &self,
        exam_id: i64,
        student_id: i64,
        started_at: chrono::DateTime<chrono::Utc>,
        deadline_at: chrono::DateTime<chrono::Utc>,
    ) -> Result<ExamSubmission> {
        let model = ActiveModel {
            exam_id: Set(exam_id),
            student_id: Set(student_id),
            status: Set(SessionStatus::InProgress.to_string()),
            started_at: Set(started_at.timestamp()),
            deadline_at: Set(deadline_at.timestamp()),
            answers: Set("{}".to_string()),
            warnings: Set("[]".to_string()),
            ..Default::default()
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "考试作答"))?;

        Ok(result.into_submission())
    }

    pub async fn get_exam_submission_impl(
        &self,
        exam_id: i64,
        student_id: i64,
    ) -> Result<Option<ExamSubmission>> {
        let result = ExamSubmissions::find()
            .filter(Column::ExamId.eq(exam_id))
            .filter(Column::StudentId.eq(student_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试作答失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    pub async fn get_exam_submission_by_id_impl(
        &self,
        submission_id: i64,
    ) -> Result<Option<ExamSubmission>> {
        let result = ExamSubmissions::find_by_id(submission_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试作答失败: {e}")))?;

        Ok(result.map(|m| m.into_submission()))
    }

    /// 仅当作答处于 `expected` 中的某个状态时写入，否则返回 None
    pub async fn update_exam_submission_impl(
        &self,
        submission_id: i64,
        expected: &[SessionStatus],
        update: SubmissionUpdate,
    ) -> Result<Option<ExamSubmission>> {
        if !guarded_update(&self.db, submission_id, expected, update).await? {
            return Ok(None);
        }
        self.get_exam_submission_by_id_impl(submission_id).await
    }

    /// 追加一条监考告警
    ///
    /// 以读到的 warnings 列作为比较条件写回，被并发请求抢先时重新读取再追加。
    pub async fn append_exam_warning_impl(
        &self,
        submission_id: i64,
        warning: ProctoringWarning,
        max_warnings: usize,
    ) -> Result<WarningAppend> {
        for _ in 0..CAS_ATTEMPTS {
            let Some(current) = self.find_open_submission(submission_id).await? else {
                return Ok(WarningAppend::Closed);
            };

            let mut warnings: Vec<ProctoringWarning> =
                serde_json::from_str(&current.warnings).unwrap_or_default();
            if warnings.len() >= max_warnings {
                return Ok(WarningAppend::LimitReached);
            }
            warnings.push(warning.clone());

            let result = ExamSubmissions::update_many()
                .col_expr(Column::Warnings, Expr::value(serde_json::to_string(&warnings)?))
                .filter(Column::Id.eq(submission_id))
                .filter(Column::Status.eq(SessionStatus::InProgress.as_str()))
                .filter(Column::Warnings.eq(current.warnings.as_str()))
                .exec(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("记录监考告警失败: {e}")))?;

            if result.rows_affected == 1 {
                let mut submission = current.into_submission();
                submission.warnings = warnings;
                return Ok(WarningAppend::Recorded(submission));
            }
        }
        Err(SchoolError::conflict("作答正在被并发修改，请重试"))
    }

    /// 把草稿答案合并进进行中的作答；作答已结束时返回 None
    pub async fn merge_exam_answers_impl(
        &self,
        submission_id: i64,
        answers: HashMap<i64, String>,
    ) -> Result<Option<ExamSubmission>> {
        for _ in 0..CAS_ATTEMPTS {
            let Some(current) = self.find_open_submission(submission_id).await? else {
                return Ok(None);
            };

            let mut merged: HashMap<i64, String> =
                serde_json::from_str(&current.answers).unwrap_or_default();
            merged.extend(answers.clone());

            let result = ExamSubmissions::update_many()
                .col_expr(Column::Answers, Expr::value(serde_json::to_string(&merged)?))
                .filter(Column::Id.eq(submission_id))
                .filter(Column::Status.eq(SessionStatus::InProgress.as_str()))
                .filter(Column::Answers.eq(current.answers.as_str()))
                .exec(&self.db)
                .await
                .map_err(|e| SchoolError::database_operation(format!("保存答案失败: {e}")))?;

            if result.rows_affected == 1 {
                let mut submission = current.into_submission();
                submission.answers = merged;
                return Ok(Some(submission));
            }
        }
        Err(SchoolError::conflict("作答正在被并发修改，请重试"))
    }

    /// 评分与同步成绩在同一事务中完成；作答仍在进行时返回 None
    pub async fn grade_exam_submission_impl(
        &self,
        submission_id: i64,
        update: SubmissionUpdate,
        sync: ExamGradeSync,
    ) -> Result<Option<ExamSubmission>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        if !guarded_update(&txn, submission_id, SessionStatus::FINISHED, update).await? {
            txn.rollback()
                .await
                .map_err(|e| SchoolError::database_operation(format!("回滚事务失败: {e}")))?;
            return Ok(None);
        }
        super::grades::upsert_exam_grade_on(&txn, sync).await?;

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        self.get_exam_submission_by_id_impl(submission_id).await
    }

    async fn find_open_submission(&self, submission_id: i64) -> Result<Option<Model>> {
        ExamSubmissions::find_by_id(submission_id)
            .filter(Column::Status.eq(SessionStatus::InProgress.as_str()))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试作答失败: {e}")))
    }

    /// 分页列出某场考试的作答
    pub async fn list_exam_submissions_with_pagination_impl(
        &self,
        exam_id: i64,
        query: SubmissionListQuery,
    ) -> Result<SubmissionListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = ExamSubmissions::find().filter(Column::ExamId.eq(exam_id));
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        select = select.order_by_asc(Column::StartedAt);

        let (submissions, pagination) =
            super::fetch_page(&self.db, select, page, size, "考试作答").await?;

        let student_ids: Vec<i64> = submissions.iter().map(|s| s.student_id).collect();
        let users = index_users(self.get_users_by_ids_impl(&student_ids).await?);

        let items = submissions
            .into_iter()
            .filter_map(|m| {
                let user = users.get(&m.student_id)?;
                let s = m.into_submission();
                Some(SubmissionListItem {
                    id: s.id,
                    exam_id: s.exam_id,
                    student_id: s.student_id,
                    username: user.username.clone(),
                    display_name: user.display_name.clone(),
                    status: s.status,
                    started_at: s.started_at,
                    submitted_at: s.submitted_at,
                    elapsed_seconds: s.elapsed_seconds,
                    auto_score: s.auto_score,
                    score: s.score,
                    warning_count: s.warnings.len(),
                })
            })
            .collect();

        Ok(SubmissionListResponse { items, pagination })
    }

    pub async fn count_exam_submissions_impl(&self, exam_id: i64) -> Result<u64> {
        ExamSubmissions::find()
            .filter(Column::ExamId.eq(exam_id))
            .count(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("统计考试作答失败: {e}")))
    }

    /// 课程内所有考试的作答
    pub async fn list_course_submissions_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<ExamSubmission>> {
        let exam_ids: Vec<i64> = Exams::find()
            .select_only()
            .column(ExamColumn::Id)
            .filter(ExamColumn::CourseId.eq(course_id))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试失败: {e}")))?;

        let submissions = ExamSubmissions::find()
            .filter(Column::ExamId.is_in(exam_ids))
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试作答失败: {e}")))?;

        Ok(submissions
            .into_iter()
            .map(|m| m.into_submission())
            .collect())
    }

    pub async fn recording_course_id_impl(&self, recording_token: &str) -> Result<Option<i64>> {
        let Some(submission) = ExamSubmissions::find()
            .filter(Column::RecordingToken.eq(recording_token))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试作答失败: {e}")))?
        else {
            return Ok(None);
        };

        let course_id: Option<i64> = Exams::find_by_id(submission.exam_id)
            .select_only()
            .column(ExamColumn::CourseId)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试失败: {e}")))?;
        Ok(course_id)
    }
}

/// 按状态条件更新作答，返回是否命中
async fn guarded_update<C: ConnectionTrait>(
    conn: &C,
    submission_id: i64,
    expected: &[SessionStatus],
    update: SubmissionUpdate,
) -> Result<bool> {
    let mut stmt = ExamSubmissions::update_many()
        .filter(Column::Id.eq(submission_id))
        .filter(Column::Status.is_in(expected.iter().map(|s| s.as_str())));
    let mut changed = false;

    if let Some(status) = update.status {
        stmt = stmt.col_expr(Column::Status, Expr::value(status.as_str()));
        changed = true;
    }
    if let Some(at) = update.submitted_at {
        stmt = stmt.col_expr(Column::SubmittedAt, Expr::value(at.timestamp()));
        changed = true;
    }
    if let Some(elapsed) = update.elapsed_seconds {
        stmt = stmt.col_expr(Column::ElapsedSeconds, Expr::value(elapsed));
        changed = true;
    }
    if let Some(answers) = update.answers {
        stmt = stmt.col_expr(Column::Answers, Expr::value(serde_json::to_string(&answers)?));
        changed = true;
    }
    if let Some(warnings) = update.warnings {
        stmt = stmt.col_expr(Column::Warnings, Expr::value(serde_json::to_string(&warnings)?));
        changed = true;
    }
    if let Some(auto_score) = update.auto_score {
        stmt = stmt.col_expr(Column::AutoScore, Expr::value(auto_score));
        changed = true;
    }
    if let Some(score) = update.score {
        stmt = stmt.col_expr(Column::Score, Expr::value(score));
        changed = true;
    }
    if let Some(feedback) = update.feedback {
        stmt = stmt.col_expr(Column::Feedback, Expr::value(feedback));
        changed = true;
    }
    if let Some(token) = update.recording_token {
        stmt = stmt.col_expr(Column::RecordingToken, Expr::value(token));
        changed = true;
    }
    if let Some(graded_by) = update.graded_by {
        stmt = stmt.col_expr(Column::GradedBy, Expr::value(graded_by));
        changed = true;
    }
    if let Some(at) = update.graded_at {
        stmt = stmt.col_expr(Column::GradedAt, Expr::value(at.timestamp()));
        changed = true;
    }

    if !changed {
        // 没有需要写入的列，只确认状态条件
        let matched = ExamSubmissions::find_by_id(submission_id)
            .filter(Column::Status.is_in(expected.iter().map(|s| s.as_str())))
            .count(conn)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考试作答失败: {e}")))?;
        return Ok(matched > 0);
    }

    let result = stmt
        .exec(conn)
        .await
        .map_err(|e| SchoolError::database_operation(format!("更新考试作答失败: {e}")))?;
    Ok(result.rows_affected > 0)
}
