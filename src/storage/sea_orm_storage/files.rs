//! 文件存储操作

use super::SeaOrmStorage;
use crate::entity::files::{ActiveModel, Column, Entity as Files};
use crate::errors::{Result, SchoolError};
use crate::models::files::entities::{File, FileBucket};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QuerySelect, Set};

impl SeaOrmStorage {
    /// 记录上传的文件
    #[allow(clippy::too_many_arguments)]
    pub async fn create_file_impl(
        &self,
        download_token: &str,
        bucket: FileBucket,
        original_name: &str,
        stored_name: &str,
        file_size: i64,
        file_type: &str,
        user_id: i64,
    ) -> Result<File> {
        let model = ActiveModel {
            download_token: Set(download_token.to_string()),
            bucket: Set(bucket.to_string()),
            original_name: Set(original_name.to_string()),
            stored_name: Set(stored_name.to_string()),
            file_size: Set(file_size),
            file_type: Set(file_type.to_string()),
            user_id: Set(user_id),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| super::insert_error(e, "文件"))?;

        Ok(result.into_file())
    }

    /// 通过下载令牌获取文件
    pub async fn get_file_by_token_impl(&self, download_token: &str) -> Result<Option<File>> {
        let result = Files::find_by_id(download_token.to_string())
            .one(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询文件失败: {e}")))?;

        Ok(result.map(|m| m.into_file()))
    }

    pub async fn existing_file_tokens_impl(&self, tokens: &[String]) -> Result<Vec<String>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        Files::find()
            .select_only()
            .column(Column::DownloadToken)
            .filter(Column::DownloadToken.is_in(tokens.iter().cloned()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| SchoolError::database_operation(format!("查询文件失败: {e}")))
    }
}
