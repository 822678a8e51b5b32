/*!
 * 基于全局角色的访问控制中间件
 *
 * 必须位于 RequireJWT 之内（即 `.wrap(RequireRole)` 写在 `.wrap(RequireJWT)` 之前）。
 *
 * ```rust,ignore
 * web::scope("/api/v1/users")
 *     .wrap(RequireRole::new_any(UserRole::coordinator_roles()))
 *     .wrap(RequireJWT)
 * ```
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use tracing::info;

use crate::{
    middlewares::RequireJWT,
    models::{ErrorCode, users::entities::UserRole},
};

use super::create_error_response;

#[derive(Clone)]
pub struct RequireRole {
    required_roles: Vec<UserRole>,
    require_all: bool, // true: 必须等于唯一指定角色; false: 命中任一角色即可
}

impl RequireRole {
    /// 创建需要特定角色的中间件
    pub fn new(role: &UserRole) -> Self {
        Self {
            required_roles: vec![*role],
            require_all: true,
        }
    }

    /// 创建需要任一角色的中间件
    pub fn new_any(roles: &[&UserRole]) -> Self {
        Self {
            required_roles: roles.iter().map(|r| **r).collect(),
            require_all: false,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleMiddleware {
            service: Rc::new(service),
            required_roles: self.required_roles.clone(),
            require_all: self.require_all,
        }))
    }
}

pub struct RequireRoleMiddleware<S> {
    service: Rc<S>,
    required_roles: Vec<UserRole>,
    require_all: bool,
}

impl<S, B> Service<ServiceRequest> for RequireRoleMiddleware<S>
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
        let required_roles = self.required_roles.clone();
        let require_all = self.require_all;

        Box::pin(async move {
            let user_id = RequireJWT::extract_user_id(req.request());
            let user_role = RequireJWT::extract_user_role(req.request());

            match (user_id, user_role) {
                (Some(user_id), Some(user_role)) => {
                    let has_permission = role_allowed(&required_roles, require_all, user_role);

                    if has_permission {
                        let res = srv.call(req).await?.map_into_left_body();
                        Ok(res)
                    } else {
                        info!(
                            "用户 {} (角色: {}) 无权访问 {}，需要角色: {:?}",
                            user_id,
                            user_role,
                            req.path(),
                            required_roles
                        );
                        Ok(req.into_response(
                            create_error_response(
                                StatusCode::FORBIDDEN,
                                ErrorCode::Forbidden,
                                "权限不足",
                            )
                            .map_into_right_body(),
                        ))
                    }
                }
                _ => {
                    info!("角色校验失败：请求中没有用户信息，RequireJWT 是否已应用？");
                    Ok(req.into_response(
                        create_error_response(
                            StatusCode::UNAUTHORIZED,
                            ErrorCode::Unauthorized,
                            "需要登录",
                        )
                        .map_into_right_body(),
                    ))
                }
            }
        })
    }
}

fn role_allowed(required_roles: &[UserRole], require_all: bool, user_role: UserRole) -> bool {
    if require_all {
        required_roles.iter().all(|role| *role == user_role)
    } else {
        required_roles.contains(&user_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_role() {
        let roles: Vec<UserRole> = UserRole::staff_roles().iter().map(|r| **r).collect();
        assert!(role_allowed(&roles, false, UserRole::Assistant));
        assert!(role_allowed(&roles, false, UserRole::Coordinator));
        assert!(!role_allowed(&roles, false, UserRole::Student));
    }

    #[test]
    fn test_single_role() {
        assert!(role_allowed(&[UserRole::Coordinator], true, UserRole::Coordinator));
        assert!(!role_allowed(&[UserRole::Coordinator], true, UserRole::Teacher));
    }
}
