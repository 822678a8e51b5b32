//! 成绩记录与汇总

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::models::grades::entities::{GradeRecord, round2, validate_grade_values, weighted_average};
use crate::models::grades::requests::{
    CreateGradeRequest, GradeListParams, GradeListQuery, UpdateGradeRequest,
};
use crate::models::grades::responses::{
    GradeSummaryResponse, MyCourseGrades, MyGradesResponse, StudentGradeSummary,
};
use crate::models::users::entities::User;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::{validate_optional_text, validate_required_text};

use super::{bad_request, course_member, current_user, load_course, not_found};

const DEFAULT_MAX_SCORE: f64 = 100.0;
const DEFAULT_WEIGHT: f64 = 1.0;

pub struct GradeService {
    storage: Option<Arc<dyn Storage>>,
}

impl GradeService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    /// 学生只能看到自己的成绩
    pub async fn list_grades(
        &self,
        request: &HttpRequest,
        course_id: i64,
        query: GradeListParams,
    ) -> ActixResult<HttpResponse> {
        let member = course_member(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let student_id = if member.role.is_staff() {
            query.student_id
        } else {
            Some(member.user_id)
        };

        let list_query = GradeListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            course_id: Some(course_id),
            student_id,
            category: query.category,
        };
        let response = storage.list_grades_with_pagination(list_query).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取成绩列表成功")))
    }

    pub async fn create_grade(
        &self,
        request: &HttpRequest,
        course_id: i64,
        mut grade_data: CreateGradeRequest,
    ) -> ActixResult<HttpResponse> {
        let grader = current_user(request)?;
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        grade_data.title = grade_data.title.trim().to_string();
        validate_required_text("成绩标题", &grade_data.title, 200)
            .and_then(|_| validate_optional_text("评语", grade_data.comment.as_deref(), 4000))
            .map_err(|msg| bad_request(ErrorCode::GradeInvalid, msg))?;
        validate_grade_values(
            grade_data.score,
            grade_data.max_score.unwrap_or(DEFAULT_MAX_SCORE),
            grade_data.weight.unwrap_or(DEFAULT_WEIGHT),
        )
        .map_err(|msg| bad_request(ErrorCode::GradeInvalid, msg))?;

        if storage
            .get_enrollment(course_id, grade_data.student_id)
            .await?
            .is_none()
        {
            return Err(bad_request(ErrorCode::NotEnrolled, "该学生未选修本课程"));
        }
        if let Some(exam_id) = grade_data.exam_id
            && storage.get_exam(course_id, exam_id).await?.is_none()
        {
            return Err(bad_request(ErrorCode::ExamNotFound, "考试不存在"));
        }

        let grade = storage.create_grade(course_id, grader.id, grade_data).await?;
        info!(
            "课程 {} 学生 {} 新增成绩 {} ({}/{})",
            course_id, grade.student_id, grade.id, grade.score, grade.max_score
        );
        Ok(HttpResponse::Created().json(ApiResponse::success(grade, "成绩录入成功")))
    }

    pub async fn update_grade(
        &self,
        request: &HttpRequest,
        course_id: i64,
        grade_id: i64,
        mut update_data: UpdateGradeRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let grade = storage
            .get_grade(course_id, grade_id)
            .await?
            .ok_or_else(|| not_found(ErrorCode::GradeNotFound, "成绩不存在"))?;

        update_data.title = update_data.title.map(|t| t.trim().to_string());
        if let Some(ref title) = update_data.title {
            validate_required_text("成绩标题", title, 200)
                .map_err(|msg| bad_request(ErrorCode::GradeInvalid, msg))?;
        }
        validate_optional_text("评语", update_data.comment.as_deref(), 4000)
            .map_err(|msg| bad_request(ErrorCode::GradeInvalid, msg))?;
        // 与原值合并后再校验
        validate_grade_values(
            update_data.score.unwrap_or(grade.score),
            update_data.max_score.unwrap_or(grade.max_score),
            update_data.weight.unwrap_or(grade.weight),
        )
        .map_err(|msg| bad_request(ErrorCode::GradeInvalid, msg))?;

        let grade = storage
            .update_grade(grade.id, update_data)
            .await?
            .ok_or_else(|| not_found(ErrorCode::GradeNotFound, "成绩不存在"))?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(grade, "成绩更新成功")))
    }

    pub async fn delete_grade(
        &self,
        request: &HttpRequest,
        course_id: i64,
        grade_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        if storage.get_grade(course_id, grade_id).await?.is_none() {
            return Err(not_found(ErrorCode::GradeNotFound, "成绩不存在"));
        }
        storage.delete_grade(grade_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("成绩删除成功")))
    }

    /// 课程内每个在读学生的加权平均分
    pub async fn grade_summary(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let students = storage.list_course_students(course_id).await?;
        let grades = storage.list_course_grades(course_id).await?;
        let items = summarize_grades(&students, grades);
        let course_average = course_average(&items);

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            GradeSummaryResponse {
                course_id,
                items,
                course_average,
            },
            "获取成绩汇总成功",
        )))
    }

    /// 当前学生在所有课程中的成绩
    pub async fn my_grades(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let mut by_course: BTreeMap<i64, Vec<GradeRecord>> = BTreeMap::new();
        for grade in storage.list_student_grades(user.id).await? {
            by_course.entry(grade.course_id).or_default().push(grade);
        }

        let mut courses = Vec::with_capacity(by_course.len());
        for (course_id, records) in by_course {
            let Some(course) = storage.get_course_by_id(course_id).await? else {
                continue;
            };
            courses.push(MyCourseGrades {
                course_id,
                course_name: course.name,
                weighted_average: weighted_average(&records),
                records,
            });
        }

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            MyGradesResponse { courses },
            "获取我的成绩成功",
        )))
    }
}

/// 按学生分组计算加权平均；没有成绩的学生平均分为空
pub(crate) fn summarize_grades(
    students: &[User],
    grades: Vec<GradeRecord>,
) -> Vec<StudentGradeSummary> {
    let mut by_student: BTreeMap<i64, Vec<GradeRecord>> = BTreeMap::new();
    for grade in grades {
        by_student.entry(grade.student_id).or_default().push(grade);
    }

    students
        .iter()
        .map(|student| {
            let records = by_student.remove(&student.id).unwrap_or_default();
            StudentGradeSummary {
                student_id: student.id,
                username: student.username.clone(),
                display_name: student.display_name.clone(),
                grade_count: records.len(),
                weighted_average: weighted_average(&records),
            }
        })
        .collect()
}

pub(crate) fn course_average(items: &[StudentGradeSummary]) -> Option<f64> {
    let averages: Vec<f64> = items.iter().filter_map(|s| s.weighted_average).collect();
    if averages.is_empty() {
        return None;
    }
    Some(round2(averages.iter().sum::<f64>() / averages.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::grades::entities::GradeCategory;
    use crate::models::users::entities::{UserRole, UserStatus};

    fn student(id: i64, username: &str) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: username.to_string(),
            email: format!("{username}@school.test"),
            password_hash: String::new(),
            role: UserRole::Student,
            status: UserStatus::Active,
            display_name: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn grade(student_id: i64, score: f64, weight: f64) -> GradeRecord {
        let now = chrono::Utc::now();
        GradeRecord {
            id: 0,
            course_id: 1,
            student_id,
            exam_id: None,
            title: "Quiz".to_string(),
            category: GradeCategory::Quiz,
            score,
            max_score: 100.0,
            weight,
            comment: None,
            graded_by: 9,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_summary_groups_by_student() {
        let students = vec![student(1, "ana"), student(2, "ben"), student(3, "cai")];
        let grades = vec![grade(1, 90.0, 1.0), grade(1, 60.0, 2.0), grade(2, 75.0, 1.0)];

        let items = summarize_grades(&students, grades);
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].grade_count, 2);
        assert_eq!(items[0].weighted_average, Some(70.0));
        assert_eq!(items[1].weighted_average, Some(75.0));
        assert_eq!(items[2].grade_count, 0);
        assert_eq!(items[2].weighted_average, None);

        assert_eq!(course_average(&items), Some(72.5));
    }

    #[test]
    fn test_course_average_without_grades() {
        let items = summarize_grades(&[student(1, "ana")], vec![]);
        assert_eq!(course_average(&items), None);
    }
}
