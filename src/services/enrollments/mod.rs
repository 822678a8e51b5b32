//! 选课管理

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::errors::SchoolError;
use crate::models::courses::entities::CourseStatus;
use crate::models::courses::requests::{CourseListQuery, CourseQueryParams};
use crate::models::enrollments::requests::{
    EnrollStudentRequest, EnrollmentListParams, EnrollmentListQuery, UpdateEnrollmentRequest,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

use super::{current_user, load_course};

pub struct EnrollmentService {
    storage: Option<Arc<dyn Storage>>,
}

impl EnrollmentService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    pub async fn list_enrollments(
        &self,
        request: &HttpRequest,
        course_id: i64,
        query: EnrollmentListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;

        let list_query = EnrollmentListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            status: query.status,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };

        let response = storage
            .list_enrollments_with_pagination(course_id, list_query)
            .await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取选课列表成功")))
    }

    /// 学生选课：课程必须处于开放状态且未满员，已退课的记录会重新激活
    pub async fn enroll_student(
        &self,
        request: &HttpRequest,
        course_id: i64,
        enroll_data: EnrollStudentRequest,
    ) -> ActixResult<HttpResponse> {
        let operator = current_user(request)?;
        let storage = self.get_storage(request)?;
        let course = load_course(&storage, course_id).await?;

        if course.status != CourseStatus::Active {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::CourseArchived,
                "课程已归档，不能选课",
            )));
        }

        match storage.get_user_by_id(enroll_data.student_id).await? {
            Some(user) if user.role == UserRole::Student => {}
            Some(_) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::UserRoleInvalid,
                    "只有学生可以选课",
                )));
            }
            None => {
                return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                    ErrorCode::UserNotFound,
                    "学生不存在",
                )));
            }
        }

        if let Some(capacity) = course.capacity {
            let active = storage.count_active_enrollments(course_id).await?;
            if active >= capacity as u64 {
                return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                    ErrorCode::CourseFull,
                    format!("课程已满员（{capacity} 人）"),
                )));
            }
        }

        match storage.enroll_student(course_id, enroll_data.student_id).await {
            Ok(enrollment) => {
                info!(
                    "学生 {} 已加入课程 {}（操作人 {}）",
                    enrollment.student_id, course_id, operator.id
                );
                Ok(HttpResponse::Created().json(ApiResponse::success(enrollment, "选课成功")))
            }
            Err(SchoolError::Conflict(msg)) => Ok(HttpResponse::Conflict()
                .json(ApiResponse::error_empty(ErrorCode::EnrollmentAlreadyExists, msg))),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn update_enrollment(
        &self,
        request: &HttpRequest,
        course_id: i64,
        enrollment_id: i64,
        update_data: UpdateEnrollmentRequest,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        let Some(enrollment) = storage.get_enrollment_by_id(course_id, enrollment_id).await? else {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EnrollmentNotFound,
                "选课记录不存在",
            )));
        };

        match storage
            .update_enrollment_status(enrollment.id, update_data.status)
            .await?
        {
            Some(updated) => {
                Ok(HttpResponse::Ok().json(ApiResponse::success(updated, "选课状态已更新")))
            }
            None => Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EnrollmentNotFound,
                "选课记录不存在",
            ))),
        }
    }

    pub async fn remove_enrollment(
        &self,
        request: &HttpRequest,
        course_id: i64,
        enrollment_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;

        let Some(enrollment) = storage.get_enrollment_by_id(course_id, enrollment_id).await? else {
            return Ok(HttpResponse::NotFound().json(ApiResponse::error_empty(
                ErrorCode::EnrollmentNotFound,
                "选课记录不存在",
            )));
        };

        storage.delete_enrollment(enrollment.id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("已移除选课记录")))
    }

    /// 当前用户参与的课程（被分配或在读）
    pub async fn list_my_courses(
        &self,
        request: &HttpRequest,
        query: CourseQueryParams,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;

        let list_query = CourseListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            search: query.search.filter(|s| !s.trim().is_empty()),
            language: query.language,
            level: query.level,
            status: query.status,
            member_id: Some(user.id),
        };

        let response = storage.list_courses_with_pagination(list_query).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取我的课程成功")))
    }
}
