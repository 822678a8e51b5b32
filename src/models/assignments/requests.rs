use serde::Deserialize;
use ts_rs::TS;

// 分配教师/助教请求，分配身份由目标用户的系统角色决定
#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "course-assignment.ts")]
pub struct AssignStaffRequest {
    pub user_id: i64,
}
