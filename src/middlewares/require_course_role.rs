/*!
 * 基于课程身份的访问控制中间件
 *
 * 挂在带 `{course_id}` 路径参数的 scope 上，位于 RequireJWT 之内。
 * 协调员对任何课程都以 `coordinator` 身份放行；其他用户的身份来自课程分配
 * （teacher / assistant）或有效选课记录（student）。
 * 通过后把 `CourseMember` 写入请求扩展。
 *
 * ```rust,ignore
 * web::scope("/courses/{course_id}/lessons")
 *     .wrap(RequireCourseRole::new_any(CourseRole::all_roles()))
 *     .wrap(RequireJWT)
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
    web,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::{rc::Rc, sync::Arc};
use tracing::{debug, error, info};

use crate::{
    models::{
        ErrorCode,
        courses::entities::{CourseMember, CourseRole},
        users::entities::{User, UserRole},
    },
    storage::Storage,
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireCourseRole {
    allowed_roles: Vec<CourseRole>,
}

impl RequireCourseRole {
    pub fn new_any(roles: &[&CourseRole]) -> Self {
        Self {
            allowed_roles: roles.iter().map(|r| **r).collect(),
        }
    }

    /// 处理函数中读取当前用户的课程身份
    pub fn extract_course_member(req: &actix_web::HttpRequest) -> Option<CourseMember> {
        req.extensions().get::<CourseMember>().cloned()
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireCourseRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireCourseRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireCourseRoleMiddleware {
            service: Rc::new(service),
            allowed_roles: self.allowed_roles.clone(),
        }))
    }
}

pub struct RequireCourseRoleMiddleware<S> {
    service: Rc<S>,
    allowed_roles: Vec<CourseRole>,
}

impl<S, B> Service<ServiceRequest> for RequireCourseRoleMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let allowed_roles = self.allowed_roles.clone();

        Box::pin(async move {
            // 1. 当前用户
            let Some(user) = req.extensions().get::<User>().cloned() else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::UNAUTHORIZED,
                        ErrorCode::Unauthorized,
                        "需要登录",
                    )
                    .map_into_right_body(),
                ));
            };

            // 2. 课程 ID
            let Some(course_id) = req
                .match_info()
                .get("course_id")
                .and_then(|s| s.parse::<i64>().ok())
                .filter(|id| *id > 0)
            else {
                return Ok(req.into_response(
                    create_error_response(
                        StatusCode::BAD_REQUEST,
                        ErrorCode::BadRequest,
                        "课程 ID 无效",
                    )
                    .map_into_right_body(),
                ));
            };

            // 3. 解析课程身份
            let role = if user.role == UserRole::Coordinator {
                Some(CourseRole::Coordinator)
            } else {
                match lookup_course_role(&req, course_id, user.id).await {
                    Ok(role) => role,
                    Err(message) => {
                        error!("查询课程身份失败: {}", message);
                        return Ok(req.into_response(
                            create_error_response(
                                StatusCode::INTERNAL_SERVER_ERROR,
                                ErrorCode::InternalServerError,
                                "查询课程身份失败",
                            )
                            .map_into_right_body(),
                        ));
                    }
                }
            };

            match role {
                Some(role) if allowed_roles.contains(&role) => {
                    debug!("用户 {} 以 {} 身份访问课程 {}", user.id, role, course_id);
                    req.extensions_mut().insert(CourseMember {
                        course_id,
                        user_id: user.id,
                        role,
                    });
                    Ok(srv.call(req).await?.map_into_left_body())
                }
                other => {
                    info!(
                        "用户 {} 在课程 {} 中的身份 {:?} 不满足 {:?}",
                        user.id, course_id, other, allowed_roles
                    );
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::FORBIDDEN,
                            ErrorCode::CoursePermissionDenied,
                            "没有该课程的访问权限",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

async fn lookup_course_role(
    req: &ServiceRequest,
    course_id: i64,
    user_id: i64,
) -> Result<Option<CourseRole>, String> {
    let storage = req
        .app_data::<web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| "Storage is not configured".to_string())?;

    storage
        .get_course_role(course_id, user_id)
        .await
        .map_err(|e| e.to_string())
}
