//! 考勤记录与出勤率

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::{NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::info;

use crate::models::attendance::entities::{AttendanceRecord, AttendanceTally};
use crate::models::attendance::requests::{
    AttendanceEntry, AttendanceListParams, AttendanceListQuery, RecordAttendanceRequest,
    UpdateAttendanceRequest,
};
use crate::models::attendance::responses::{
    AttendanceSummaryResponse, RecordAttendanceResponse, StudentAttendanceSummary,
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::validate_optional_text;

use super::{bad_request, course_member, current_user, load_course, not_found};

const MAX_ENTRIES: usize = 500;
const MAX_NOTE_CHARS: usize = 500;

pub struct AttendanceService {
    storage: Option<Arc<dyn Storage>>,
}

impl AttendanceService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    /// 学生只能看到自己的考勤
    pub async fn list_attendance(
        &self,
        request: &HttpRequest,
        course_id: i64,
        query: AttendanceListParams,
    ) -> ActixResult<HttpResponse> {
        let member = course_member(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let student_id = if member.role.is_staff() {
            query.student_id
        } else {
            Some(member.user_id)
        };

        let list_query = AttendanceListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            student_id,
            lesson_id: query.lesson_id,
            session_date: query.session_date,
            status: query.status,
        };
        let response = storage
            .list_attendance_with_pagination(course_id, list_query)
            .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取考勤记录成功")))
    }

    /// 批量点名，同一学生同一天重复点名时覆盖原记录
    pub async fn record_attendance(
        &self,
        request: &HttpRequest,
        course_id: i64,
        body: RecordAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        let recorder = current_user(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let roster: HashSet<i64> = storage
            .list_course_students(course_id)
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        validate_entries(&body.entries, &roster, body.session_date, Utc::now().date_naive())
            .map_err(|msg| bad_request(ErrorCode::AttendanceInvalid, msg))?;

        if let Some(lesson_id) = body.lesson_id
            && storage.get_lesson(course_id, lesson_id).await?.is_none()
        {
            return Err(not_found(ErrorCode::LessonNotFound, "课时不存在"));
        }

        let entries: Vec<AttendanceEntry> = body
            .entries
            .into_iter()
            .map(|mut e| {
                e.note = e.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
                e
            })
            .collect();
        let count = entries.len();

        let items = storage
            .upsert_attendance(
                course_id,
                body.lesson_id,
                body.session_date,
                entries,
                recorder.id,
            )
            .await?;
        info!(
            "课程 {} {} 点名 {} 人 (记录人 {})",
            course_id, body.session_date, count, recorder.id
        );

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            RecordAttendanceResponse { items },
            "考勤已记录",
        )))
    }

    pub async fn update_attendance(
        &self,
        request: &HttpRequest,
        course_id: i64,
        record_id: i64,
        mut update_data: UpdateAttendanceRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        if storage.get_attendance(course_id, record_id).await?.is_none() {
            return Err(not_found(ErrorCode::AttendanceNotFound, "考勤记录不存在"));
        }

        update_data.note = update_data.note.map(|n| n.trim().to_string());
        validate_optional_text("备注", update_data.note.as_deref(), MAX_NOTE_CHARS)
            .map_err(|msg| bad_request(ErrorCode::AttendanceInvalid, msg))?;

        let record = storage
            .update_attendance(record_id, update_data)
            .await?
            .ok_or_else(|| not_found(ErrorCode::AttendanceNotFound, "考勤记录不存在"))?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(record, "考勤记录已更新")))
    }

    pub async fn delete_attendance(
        &self,
        request: &HttpRequest,
        course_id: i64,
        record_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        if storage.get_attendance(course_id, record_id).await?.is_none() {
            return Err(not_found(ErrorCode::AttendanceNotFound, "考勤记录不存在"));
        }
        storage.delete_attendance(record_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("考勤记录已删除")))
    }

    /// 每个在读学生的出勤统计与出勤率
    pub async fn attendance_summary(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let students = storage.list_course_students(course_id).await?;
        let records = storage.list_course_attendance(course_id).await?;
        let course_rate = records.iter().map(|r| r.status).collect::<AttendanceTally>().rate();
        let items = summarize_attendance(&students, &records);

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            AttendanceSummaryResponse {
                course_id,
                items,
                course_rate,
            },
            "获取考勤汇总成功",
        )))
    }
}

/// 点名数据校验：不能为空、学生不重复且都在本课程名单中、日期不能晚于今天
pub(crate) fn validate_entries(
    entries: &[AttendanceEntry],
    roster: &HashSet<i64>,
    session_date: NaiveDate,
    today: NaiveDate,
) -> Result<(), String> {
    if entries.is_empty() {
        return Err("点名记录不能为空".to_string());
    }
    if entries.len() > MAX_ENTRIES {
        return Err(format!("一次最多记录 {MAX_ENTRIES} 名学生"));
    }
    if session_date > today {
        return Err("上课日期不能晚于今天".to_string());
    }

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.student_id) {
            return Err(format!("学生 {} 重复出现", entry.student_id));
        }
        if !roster.contains(&entry.student_id) {
            return Err(format!("学生 {} 未选修本课程", entry.student_id));
        }
        validate_optional_text("备注", entry.note.as_deref(), MAX_NOTE_CHARS)?;
    }
    Ok(())
}

pub(crate) fn summarize_attendance(
    students: &[User],
    records: &[AttendanceRecord],
) -> Vec<StudentAttendanceSummary> {
    let mut tallies: HashMap<i64, AttendanceTally> = HashMap::new();
    for record in records {
        tallies.entry(record.student_id).or_default().add(record.status);
    }

    students
        .iter()
        .map(|student| {
            let tally = tallies.get(&student.id).copied().unwrap_or_default();
            StudentAttendanceSummary {
                student_id: student.id,
                username: student.username.clone(),
                display_name: student.display_name.clone(),
                tally,
                attendance_rate: tally.rate(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::attendance::entities::AttendanceStatus;

    fn entry(student_id: i64, status: AttendanceStatus) -> AttendanceEntry {
        AttendanceEntry {
            student_id,
            status,
            note: None,
        }
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_validate_entries() {
        let roster: HashSet<i64> = [1, 2, 3].into_iter().collect();
        let today = date("2026-03-10");
        let ok = vec![
            entry(1, AttendanceStatus::Present),
            entry(2, AttendanceStatus::Late),
        ];
        assert!(validate_entries(&ok, &roster, date("2026-03-10"), today).is_ok());
        assert!(validate_entries(&[], &roster, today, today).is_err());
        assert!(validate_entries(&ok, &roster, date("2026-03-11"), today).is_err());

        let duplicate = vec![
            entry(1, AttendanceStatus::Present),
            entry(1, AttendanceStatus::Absent),
        ];
        assert!(validate_entries(&duplicate, &roster, today, today).is_err());

        let outsider = vec![entry(9, AttendanceStatus::Present)];
        let err = validate_entries(&outsider, &roster, today, today).unwrap_err();
        assert!(err.contains('9'));
    }

    #[test]
    fn test_summary_rates() {
        let now = Utc::now();
        let user = |id: i64| User {
            id,
            username: format!("s{id}"),
            email: format!("s{id}@school.test"),
            password_hash: String::new(),
            role: crate::models::users::entities::UserRole::Student,
            status: crate::models::users::entities::UserStatus::Active,
            display_name: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        let record = |student_id: i64, status: AttendanceStatus| AttendanceRecord {
            id: 0,
            course_id: 1,
            lesson_id: None,
            student_id,
            session_date: date("2026-03-01"),
            status,
            note: None,
            recorded_by: 7,
            created_at: now,
            updated_at: now,
        };

        let records = vec![
            record(1, AttendanceStatus::Present),
            record(1, AttendanceStatus::Late),
            record(1, AttendanceStatus::Absent),
            record(1, AttendanceStatus::Excused),
        ];
        let items = summarize_attendance(&[user(1), user(2)], &records);
        assert_eq!(items[0].tally.total(), 4);
        assert_eq!(items[0].attendance_rate, Some(50.0));
        assert_eq!(items[1].tally, AttendanceTally::default());
        assert_eq!(items[1].attendance_rate, None);
    }
}
