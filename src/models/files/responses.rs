use super::entities::FileBucket;
use serde::Serialize;
use ts_rs::TS;

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileUploadResponse {
    /// 下载令牌
    pub download_token: String,
    pub bucket: FileBucket,
    /// 原始文件名
    pub file_name: String,
    /// 文件大小(字节)
    pub size: i64,
    pub content_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
