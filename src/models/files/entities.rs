use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::string_enum! {
    // 存储桶，每个桶对应上传目录下的一个子目录
    pub enum FileBucket("file.ts") {
        LessonAttachments => "lesson_attachments",
        Avatars => "avatars",
        ExamRecordings => "exam_recordings",
        General => "general",
    }
}

impl Default for FileBucket {
    fn default() -> Self {
        FileBucket::General
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct File {
    // 下载令牌（唯一标识）
    pub download_token: String,
    // 所属存储桶
    pub bucket: FileBucket,
    // 原始文件名
    pub original_name: String,
    // 磁盘上的文件名
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub stored_name: String,
    // 文件大小（字节）
    pub file_size: i64,
    // MIME 类型
    pub file_type: String,
    // 上传者
    pub user_id: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}
