use super::entities::FileBucket;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "file.ts")]
pub struct FileUploadQuery {
    #[serde(default)]
    pub bucket: FileBucket,
}
