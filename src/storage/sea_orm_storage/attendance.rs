//! 考勤存储操作

use super::SeaOrmStorage;
use crate::entity::attendance_records::{ActiveModel, Column, Entity as AttendanceRecords};
use crate::errors::{Result, SchoolError};
use crate::models::{
    attendance::{
        entities::AttendanceRecord,
        requests::{AttendanceEntry, AttendanceListQuery, UpdateAttendanceRequest},
        responses::AttendanceListResponse,
    },
    common::pagination::page_window,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

const DATE_FORMAT: &str = "%Y-%m-%d";

impl SeaOrmStorage {
    /// 批量点名，按 (课程, 学生, 日期) 覆盖已有记录
    pub async fn upsert_attendance_impl(
        &self,
        course_id: i64,
        lesson_id: Option<i64>,
        session_date: chrono::NaiveDate,
        entries: Vec<AttendanceEntry>,
        recorded_by: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        let now = chrono::Utc::now().timestamp();
        let date = session_date.format(DATE_FORMAT).to_string();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| SchoolError::database_operation(format!("开启事务失败: {e}")))?;

        let mut records = Vec::with_capacity(entries.len());
        for entry in entries {
            let existing = AttendanceRecords::find()
                .filter(Column::CourseId.eq(course_id))
                .filter(Column::StudentId.eq(entry.student_id))
                .filter(Column::SessionDate.eq(date.as_str()))
                .one(&txn)
                .await
                .map_err(|e| SchoolError::database_operation(format!("查询考勤失败: {e}")))?;

            let saved = match existing {
                Some(existing) => {
                    let mut model: ActiveModel = existing.into();
                    model.status = Set(entry.status.to_string());
                    model.note = Set(entry.note);
                    model.recorded_by = Set(recorded_by);
                    model.updated_at = Set(now);
                    if lesson_id.is_some() {
                        model.lesson_id = Set(lesson_id);
                    }
                    model
                        .update(&txn)
                        .await
                        .map_err(|e| SchoolError::database_operation(format!("更新考勤失败: {e}")))?
                }
                None => ActiveModel {
                    course_id: Set(course_id),
                    lesson_id: Set(lesson_id),
                    student_id: Set(entry.student_id),
                    session_date: Set(date.clone()),
                    status: Set(entry.status.to_string()),
                    note: Set(entry.note),
                    recorded_by: Set(recorded_by),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await
                .map_err(|e| super::insert_error(e, "考勤"))?,
            };
            records.push(saved.into_attendance());
        }

        txn.commit()
            .await
            .map_err(|e| SchoolError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(records)
    }

    pub async fn get_attendance_impl(
        &self,
        course_id: i64,
        record_id: i64,
    ) -> Result<Option<AttendanceRecord>> {
        let result = AttendanceRecords::find_by_id(record_id)
            .filter(Column::CourseId.eq(course_id))
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考勤失败: {e}")))?;

        Ok(result.map(|m| m.into_attendance()))
    }

    pub async fn list_attendance_with_pagination_impl(
        &self,
        course_id: i64,
        query: AttendanceListQuery,
    ) -> Result<AttendanceListResponse> {
        let (page, size) = page_window(query.page, query.size);

        let mut select = AttendanceRecords::find().filter(Column::CourseId.eq(course_id));
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(lesson_id) = query.lesson_id {
            select = select.filter(Column::LessonId.eq(lesson_id));
        }
        if let Some(date) = query.session_date {
            select = select.filter(Column::SessionDate.eq(date.format(DATE_FORMAT).to_string()));
        }
        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        select = select
            .order_by_desc(Column::SessionDate)
            .order_by_asc(Column::StudentId);

        let (records, pagination) = super::fetch_page(&self.db, select, page, size, "考勤").await?;

        Ok(AttendanceListResponse {
            items: records.into_iter().map(|m| m.into_attendance()).collect(),
            pagination,
        })
    }

    pub async fn update_attendance_impl(
        &self,
        record_id: i64,
        update: UpdateAttendanceRequest,
    ) -> Result<Option<AttendanceRecord>> {
        let Some(existing) = AttendanceRecords::find_by_id(record_id)
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考勤失败: {e}")))?
        else {
            return Ok(None);
        };

        let mut model: ActiveModel = existing.into();
        model.updated_at = Set(chrono::Utc::now().timestamp());
        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }
        if let Some(note) = update.note {
            model.note = Set(Some(note).filter(|s| !s.is_empty()));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("更新考勤失败: {e}")))?;

        Ok(Some(result.into_attendance()))
    }

    pub async fn delete_attendance_impl(&self, record_id: i64) -> Result<bool> {
        let result = AttendanceRecords::delete_by_id(record_id)
            .exec(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("删除考勤失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_course_attendance_impl(
        &self,
        course_id: i64,
    ) -> Result<Vec<AttendanceRecord>> {
        let records = AttendanceRecords::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::SessionDate)
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询考勤失败: {e}")))?;

        Ok(records.into_iter().map(|m| m.into_attendance()).collect())
    }
}
