use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::pqrs::requests::{CreatePqrRequest, PqrListParams, RespondPqrRequest};
use crate::models::users::entities::UserRole;
use crate::services::PqrService;
use crate::utils::SafeIDI64;

static PQR_SERVICE: Lazy<PqrService> = Lazy::new(PqrService::new_lazy);

pub async fn list_pqrs(
    req: HttpRequest,
    query: web::Query<PqrListParams>,
) -> ActixResult<HttpResponse> {
    PQR_SERVICE.list_pqrs(&req, query.into_inner()).await
}

pub async fn create_pqr(
    req: HttpRequest,
    pqr_data: web::Json<CreatePqrRequest>,
) -> ActixResult<HttpResponse> {
    PQR_SERVICE.create_pqr(&req, pqr_data.into_inner()).await
}

pub async fn get_pqr(req: HttpRequest, pqr_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PQR_SERVICE.get_pqr(&req, pqr_id.0).await
}

pub async fn respond_pqr(
    req: HttpRequest,
    pqr_id: SafeIDI64,
    body: web::Json<RespondPqrRequest>,
) -> ActixResult<HttpResponse> {
    PQR_SERVICE
        .respond_pqr(&req, pqr_id.0, body.into_inner())
        .await
}

pub async fn delete_pqr(req: HttpRequest, pqr_id: SafeIDI64) -> ActixResult<HttpResponse> {
    PQR_SERVICE.delete_pqr(&req, pqr_id.0).await
}

// 配置路由
pub fn configure_pqr_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/pqrs")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("")
                    .route(web::get().to(list_pqrs))
                    .route(web::post().to(create_pqr)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(get_pqr))
                    .route(
                        web::delete()
                            .to(delete_pqr)
                            .wrap(middlewares::RequireRole::new_any(UserRole::coordinator_roles())),
                    ),
            )
            // 处理人或协调员，权限在服务中判断
            .route("/{id}/respond", web::put().to(respond_pqr)),
    );
}
