use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, http::header};
use std::fs::File;
use std::io::Read;

use super::{FileService, bucket_dir};
use crate::config::AppConfig;
use crate::errors::SchoolError;
use crate::models::courses::entities::CourseRole;
use crate::models::files::entities::{File as StoredFile, FileBucket};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{current_user, not_found};

/// 考试录像只有上传者本人、协调员和该考试所在课程的教职人员可以下载
///
/// `course_role` 为下载者在录像所属课程中的角色。
pub fn can_download(user: &User, file: &StoredFile, course_role: Option<CourseRole>) -> bool {
    if file.bucket != FileBucket::ExamRecordings
        || file.user_id == user.id
        || user.role == UserRole::Coordinator
    {
        return true;
    }
    user.role.is_staff() && course_role.is_some_and(|role| role.is_staff())
}

pub async fn handle_download(
    service: &FileService,
    request: &HttpRequest,
    file_token: String,
) -> ActixResult<HttpResponse> {
    let user = current_user(request)?;
    let storage = service.get_storage(request)?;

    let db_file = storage
        .get_file_by_token(&file_token)
        .await?
        .ok_or_else(|| not_found(ErrorCode::FileNotFound, "文件不存在"))?;

    let course_role = if db_file.bucket == FileBucket::ExamRecordings && user.role.is_staff() {
        match storage.recording_course_id(&db_file.download_token).await? {
            Some(course_id) => storage.get_course_role(course_id, user.id).await?,
            None => None,
        }
    } else {
        None
    };

    if !can_download(&user, &db_file, course_role) {
        // 不暴露文件是否存在
        return Err(not_found(ErrorCode::FileNotFound, "文件不存在"));
    }

    let config = AppConfig::get();
    let file_path = bucket_dir(&config.upload.dir, db_file.bucket).join(&db_file.stored_name);

    if !file_path.exists() {
        return Ok(HttpResponse::NotFound()
            .json(ApiResponse::error_empty(ErrorCode::FileNotFound, "文件不存在")));
    }

    let mut file = match File::open(&file_path) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("{}", SchoolError::file_operation(format!("{e:?}")));
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                    ErrorCode::InternalServerError,
                    "文件打开失败",
                )),
            );
        }
    };

    let mut buf = Vec::new();
    if let Err(e) = file.read_to_end(&mut buf) {
        tracing::error!("{}", SchoolError::file_operation(format!("{e:?}")));
        return Ok(
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                "文件读取失败",
            )),
        );
    }

    let content_type = if db_file.file_type.is_empty() {
        "application/octet-stream".to_string()
    } else {
        db_file.file_type.clone()
    };
    let file_name = db_file.original_name.replace(['"', '\r', '\n'], "_");

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, content_type))
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserStatus;

    fn user(id: i64, role: UserRole) -> User {
        let now = chrono::Utc::now();
        User {
            id,
            username: format!("u{id}"),
            email: format!("u{id}@school.test"),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            display_name: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn stored(bucket: FileBucket, owner: i64) -> StoredFile {
        StoredFile {
            download_token: "tok".to_string(),
            bucket,
            original_name: "rec.webm".to_string(),
            stored_name: "1-abc.bin".to_string(),
            file_size: 10,
            file_type: "video/webm".to_string(),
            user_id: owner,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_recordings_are_private() {
        let recording = stored(FileBucket::ExamRecordings, 5);
        assert!(can_download(&user(5, UserRole::Student), &recording, None));
        assert!(!can_download(&user(6, UserRole::Student), &recording, None));
        assert!(can_download(&user(1, UserRole::Coordinator), &recording, None));

        let attachment = stored(FileBucket::LessonAttachments, 2);
        assert!(can_download(&user(6, UserRole::Student), &attachment, None));
    }

    #[test]
    fn test_recordings_limited_to_course_staff() {
        let recording = stored(FileBucket::ExamRecordings, 5);
        let assistant = user(2, UserRole::Assistant);
        let teacher = user(3, UserRole::Teacher);

        assert!(can_download(&assistant, &recording, Some(CourseRole::Assistant)));
        assert!(can_download(&teacher, &recording, Some(CourseRole::Teacher)));
        // 其他课程的教职人员
        assert!(!can_download(&assistant, &recording, None));
        assert!(!can_download(&teacher, &recording, None));
        // 在该课程中只是学生
        assert!(!can_download(&teacher, &recording, Some(CourseRole::Student)));
    }
}
