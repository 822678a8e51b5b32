//! 课程报告与课程汇总报表

mod summary;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use tracing::info;

use crate::models::reports::entities::Report;
use crate::models::reports::requests::{
    CreateReportRequest, ReportListParams, ReportListQuery, UpdateReportRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;
use crate::utils::validate::validate_required_text;

use super::{bad_request, current_user, forbidden, load_course, not_found};

pub use summary::build_course_summary;

const MAX_CONTENT_CHARS: usize = 20_000;

pub struct ReportService {
    storage: Option<Arc<dyn Storage>>,
}

impl ReportService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    pub async fn list_course_reports(
        &self,
        request: &HttpRequest,
        course_id: i64,
        query: ReportListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        load_course(&storage, course_id).await?;
        self.list(&storage, Some(course_id), query).await
    }

    /// 协调员查看全部报告
    pub async fn list_all_reports(
        &self,
        request: &HttpRequest,
        query: ReportListParams,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        self.list(&storage, None, query).await
    }

    async fn list(
        &self,
        storage: &Arc<dyn Storage>,
        course_id: Option<i64>,
        query: ReportListParams,
    ) -> ActixResult<HttpResponse> {
        let list_query = ReportListQuery {
            page: Some(query.pagination.page),
            size: Some(query.pagination.size),
            course_id,
            kind: query.kind,
            search: query.search.filter(|s| !s.trim().is_empty()),
        };
        let response = storage.list_reports_with_pagination(list_query).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(response, "获取报告列表成功")))
    }

    /// `course_id` 为空时为不属于任何课程的综合报告
    pub async fn create_report(
        &self,
        request: &HttpRequest,
        course_id: Option<i64>,
        mut report_data: CreateReportRequest,
    ) -> ActixResult<HttpResponse> {
        let author = current_user(request)?;
        let storage = self.get_storage(request)?;
        if let Some(course_id) = course_id {
            load_course(&storage, course_id).await?;
        }

        report_data.title = report_data.title.trim().to_string();
        validate_required_text("报告标题", &report_data.title, 200)
            .and_then(|_| validate_required_text("报告内容", &report_data.content, MAX_CONTENT_CHARS))
            .map_err(|msg| bad_request(ErrorCode::ReportInvalid, msg))?;

        let report = storage.create_report(course_id, author.id, report_data).await?;
        info!("用户 {} 新建报告 {} (课程 {:?})", author.id, report.id, course_id);
        Ok(HttpResponse::Created().json(ApiResponse::success(report, "报告创建成功")))
    }

    pub async fn get_course_report(
        &self,
        request: &HttpRequest,
        course_id: i64,
        report_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let report = load_course_report(&storage, course_id, report_id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(report, "获取报告成功")))
    }

    /// 只有作者或协调员可以修改
    pub async fn update_course_report(
        &self,
        request: &HttpRequest,
        course_id: i64,
        report_id: i64,
        mut update_data: UpdateReportRequest,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;
        let report = load_course_report(&storage, course_id, report_id).await?;
        if !can_modify(&user, &report) {
            return Err(forbidden(ErrorCode::Forbidden, "只有作者或协调员可以修改报告"));
        }

        update_data.title = update_data.title.map(|t| t.trim().to_string());
        if let Some(ref title) = update_data.title {
            validate_required_text("报告标题", title, 200)
                .map_err(|msg| bad_request(ErrorCode::ReportInvalid, msg))?;
        }
        if let Some(ref content) = update_data.content {
            validate_required_text("报告内容", content, MAX_CONTENT_CHARS)
                .map_err(|msg| bad_request(ErrorCode::ReportInvalid, msg))?;
        }

        let report = storage
            .update_report(report.id, update_data)
            .await?
            .ok_or_else(|| not_found(ErrorCode::ReportNotFound, "报告不存在"))?;
        Ok(HttpResponse::Ok().json(ApiResponse::success(report, "报告更新成功")))
    }

    pub async fn delete_course_report(
        &self,
        request: &HttpRequest,
        course_id: i64,
        report_id: i64,
    ) -> ActixResult<HttpResponse> {
        let user = current_user(request)?;
        let storage = self.get_storage(request)?;
        let report = load_course_report(&storage, course_id, report_id).await?;
        if !can_modify(&user, &report) {
            return Err(forbidden(ErrorCode::Forbidden, "只有作者或协调员可以删除报告"));
        }
        storage.delete_report(report.id).await?;
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("报告删除成功")))
    }

    /// 实时计算的课程汇总
    pub async fn course_summary(
        &self,
        request: &HttpRequest,
        course_id: i64,
    ) -> ActixResult<HttpResponse> {
        let storage = self.get_storage(request)?;
        let course = load_course(&storage, course_id).await?;

        let students = storage.list_course_students(course_id).await?;
        let lesson_count = storage.count_lessons(course_id).await?;
        let exam_count = storage.count_exams(course_id).await?;
        let grades = storage.list_course_grades(course_id).await?;
        let attendance = storage.list_course_attendance(course_id).await?;
        let submissions = storage.list_course_submissions(course_id).await?;

        let summary = build_course_summary(
            course,
            &students,
            lesson_count,
            exam_count,
            grades,
            &attendance,
            &submissions,
        );
        Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "获取课程汇总成功")))
    }
}

async fn load_course_report(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    report_id: i64,
) -> ActixResult<Report> {
    storage
        .get_report(report_id)
        .await?
        .filter(|r| r.course_id == Some(course_id))
        .ok_or_else(|| not_found(ErrorCode::ReportNotFound, "报告不存在"))
}

fn can_modify(user: &User, report: &Report) -> bool {
    user.role == UserRole::Coordinator || report.author_id == user.id
}
