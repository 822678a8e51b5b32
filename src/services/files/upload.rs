use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use futures_util::TryStreamExt;
use futures_util::stream::StreamExt;
use std::fs;
use std::io::Write;
use std::{fs::File, path::Path};
use tracing::info;
use uuid::Uuid;

use super::{FileService, bucket_accepts, bucket_dir};
use crate::config::AppConfig;
use crate::errors::SchoolError;
use crate::models::files::entities::FileBucket;
use crate::models::files::responses::FileUploadResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, forbidden};
use crate::utils::validate_magic_bytes;

pub async fn handle_upload(
    service: &FileService,
    req: &HttpRequest,
    bucket: FileBucket,
    mut payload: Multipart,
) -> ActixResult<HttpResponse> {
    let user = current_user(req)?;
    // 课时附件只能由教职人员上传
    if bucket == FileBucket::LessonAttachments && !user.role.is_staff() {
        return Err(forbidden(ErrorCode::Forbidden, "只有教职人员可以上传课时附件"));
    }

    let config = AppConfig::get();
    let max_size = if bucket == FileBucket::ExamRecordings {
        config.upload.recording_max_size
    } else {
        config.upload.max_size
    };
    let allowed_types = &config.upload.allowed_types;

    let target_dir = bucket_dir(&config.upload.dir, bucket);
    if !target_dir.exists()
        && let Err(e) = fs::create_dir_all(&target_dir)
    {
        tracing::error!("{}", SchoolError::file_operation(format!("{e}")));
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::<()>::error_empty(
                ErrorCode::FileUploadFailed,
                "创建上传目录失败",
            )),
        );
    }

    let mut original_name = String::new();
    let mut file_size: i64 = 0;
    let mut file_uploaded = false;
    let mut file_type = String::new();
    let mut stored_name = String::new();

    while let Ok(Some(mut field)) = payload.try_next().await {
        let content_disposition = field.content_disposition();
        let name = content_disposition
            .and_then(|cd| cd.get_name())
            .unwrap_or_default()
            .to_string();

        if name != "file" {
            continue;
        }
        if file_uploaded {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::MultifileUploadNotAllowed,
                "一次只能上传一个文件",
            )));
        }
        file_uploaded = true;

        original_name = content_disposition
            .and_then(|cd| cd.get_filename())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let extension = Path::new(&original_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{}", ext.to_lowercase()))
            .unwrap_or_default();

        if !allowed_types.iter().any(|t| t.to_lowercase() == extension)
            || !bucket_accepts(bucket, &extension)
        {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileTypeNotAllowed,
                format!("存储桶 {} 不接受该文件类型", bucket.as_str()),
            )));
        }

        // MIME 类型仅用于下载时的响应头
        file_type = field
            .content_type()
            .map(|ct| ct.to_string())
            .unwrap_or_default();

        stored_name = format!("{}-{}.bin", chrono::Utc::now().timestamp(), Uuid::new_v4());
        let file_path = target_dir.join(&stored_name);
        let mut f = match File::create(&file_path) {
            Ok(file) => file,
            Err(e) => {
                tracing::error!("{}", SchoolError::file_operation(format!("{e}")));
                return Ok(HttpResponse::InternalServerError().json(
                    ApiResponse::<()>::error_empty(ErrorCode::FileUploadFailed, "文件创建失败"),
                ));
            }
        };

        let mut total_size: usize = 0;
        let mut first_chunk = true;
        while let Some(chunk) = field.next().await {
            let data = chunk?;

            if first_chunk {
                first_chunk = false;
                if !validate_magic_bytes(&data, &extension) {
                    let _ = fs::remove_file(&file_path);
                    return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                        ErrorCode::FileTypeNotAllowed,
                        "文件内容与扩展名不匹配",
                    )));
                }
            }

            total_size += data.len();
            if total_size > max_size {
                let _ = fs::remove_file(&file_path);
                return Ok(HttpResponse::PayloadTooLarge().json(ApiResponse::error_empty(
                    ErrorCode::FileSizeExceeded,
                    format!("文件大小超过限制 ({max_size} 字节)"),
                )));
            }
            f.write_all(&data)?;
        }

        if total_size == 0 {
            let _ = fs::remove_file(&file_path);
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::FileUploadFailed,
                "文件内容为空",
            )));
        }
        file_size = total_size as i64;
    }

    if !file_uploaded {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::FileNotFound,
            "请求中没有 file 字段",
        )));
    }

    let storage = service.get_storage(req)?;
    let download_token = Uuid::new_v4().to_string();

    let file = match storage
        .create_file(
            &download_token,
            bucket,
            &original_name,
            &stored_name,
            file_size,
            &file_type,
            user.id,
        )
        .await
    {
        Ok(file) => file,
        Err(e) => {
            let _ = fs::remove_file(target_dir.join(&stored_name));
            return Err(e.into());
        }
    };

    info!(
        "用户 {} 上传文件 {} 到 {} ({} 字节)",
        user.id,
        file.download_token,
        bucket.as_str(),
        file.file_size
    );
    Ok(HttpResponse::Created().json(ApiResponse::success(
        FileUploadResponse {
            download_token: file.download_token,
            bucket: file.bucket,
            file_name: file.original_name,
            size: file.file_size,
            content_type: file.file_type,
            created_at: file.created_at,
        },
        "文件上传成功",
    )))
}
