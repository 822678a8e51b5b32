pub mod download;
pub mod upload;

use actix_multipart::Multipart;
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::files::entities::FileBucket;
use crate::storage::Storage;

pub struct FileService {
    storage: Option<Arc<dyn Storage>>,
}

impl FileService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> ActixResult<Arc<dyn Storage>> {
        super::storage_from_request(&self.storage, request)
    }

    // 上传到指定存储桶
    pub async fn handle_upload(
        &self,
        request: &HttpRequest,
        bucket: FileBucket,
        payload: Multipart,
    ) -> ActixResult<HttpResponse> {
        upload::handle_upload(self, request, bucket, payload).await
    }

    pub async fn handle_download(
        &self,
        request: &HttpRequest,
        file_token: String,
    ) -> ActixResult<HttpResponse> {
        download::handle_download(self, request, file_token).await
    }
}

const IMAGE_TYPES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".webp"];
const MEDIA_TYPES: &[&str] = &[".webm", ".mp4", ".mp3", ".wav", ".ogg", ".m4a"];

/// 存储桶对扩展名的额外限制（在全局白名单之上）
pub fn bucket_accepts(bucket: FileBucket, extension: &str) -> bool {
    match bucket {
        FileBucket::Avatars => IMAGE_TYPES.contains(&extension),
        FileBucket::ExamRecordings => MEDIA_TYPES.contains(&extension),
        FileBucket::LessonAttachments | FileBucket::General => true,
    }
}

/// 桶对应的磁盘目录
pub fn bucket_dir(upload_dir: &str, bucket: FileBucket) -> std::path::PathBuf {
    std::path::Path::new(upload_dir).join(bucket.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_accepts() {
        assert!(bucket_accepts(FileBucket::Avatars, ".png"));
        assert!(!bucket_accepts(FileBucket::Avatars, ".pdf"));
        assert!(bucket_accepts(FileBucket::ExamRecordings, ".webm"));
        assert!(!bucket_accepts(FileBucket::ExamRecordings, ".docx"));
        assert!(bucket_accepts(FileBucket::LessonAttachments, ".pdf"));
        assert!(bucket_accepts(FileBucket::General, ".txt"));
    }

    #[test]
    fn test_bucket_dir() {
        let dir = bucket_dir("uploads", FileBucket::ExamRecordings);
        assert_eq!(dir, std::path::Path::new("uploads/exam_recordings"));
    }
}
