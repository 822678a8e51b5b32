use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 用户角色
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "user.ts")]
pub enum UserRole {
    Coordinator, // 协调员（管理员）
    Teacher,     // 教师
    Assistant,   // 助教
    Student,     // 学生
}

impl UserRole {
    pub const COORDINATOR: &'static str = "coordinator";
    pub const TEACHER: &'static str = "teacher";
    pub const ASSISTANT: &'static str = "assistant";
    pub const STUDENT: &'static str = "student";

    pub fn coordinator_roles() -> &'static [&'static UserRole] {
        &[&Self::Coordinator]
    }
    pub fn teacher_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Coordinator]
    }
    pub fn staff_roles() -> &'static [&'static UserRole] {
        &[&Self::Teacher, &Self::Assistant, &Self::Coordinator]
    }
    pub fn student_roles() -> &'static [&'static UserRole] {
        &[&Self::Student]
    }
    pub fn all_roles() -> &'static [&'static UserRole] {
        &[
            &Self::Coordinator,
            &Self::Teacher,
            &Self::Assistant,
            &Self::Student,
        ]
    }

    /// 是否为教职人员（教师、助教、协调员）
    pub fn is_staff(&self) -> bool {
        !matches!(self, UserRole::Student)
    }
}

impl<'de> Deserialize<'de> for UserRole {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<UserRole>().map_err(|_| {
            serde::de::Error::custom(format!(
                "无效的用户角色: '{s}'. 支持的角色: coordinator, teacher, assistant, student"
            ))
        })
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Coordinator => write!(f, "{}", UserRole::COORDINATOR),
            UserRole::Teacher => write!(f, "{}", UserRole::TEACHER),
            UserRole::Assistant => write!(f, "{}", UserRole::ASSISTANT),
            UserRole::Student => write!(f, "{}", UserRole::STUDENT),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UserRole::COORDINATOR => Ok(UserRole::Coordinator),
            UserRole::TEACHER => Ok(UserRole::Teacher),
            UserRole::ASSISTANT => Ok(UserRole::Assistant),
            UserRole::STUDENT => Ok(UserRole::Student),
            _ => Err(format!("Invalid user role: {s}")),
        }
    }
}

crate::string_enum! {
    // 用户状态
    pub enum UserStatus("user.ts") {
        Active => "active",
        Inactive => "inactive",
        Suspended => "suspended",
    }
}

// 用户实体
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)] // 不序列化到JSON响应中
    #[ts(skip)]
    pub password_hash: String,
    pub role: UserRole,
    pub status: UserStatus,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub last_login: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    // 生成 token 对（access + refresh）
    pub fn generate_token_pair(
        &self,
        remember_me: bool,
    ) -> Result<crate::utils::jwt::TokenPair, String> {
        crate::utils::jwt::JwtUtils::generate_token_pair(self.id, &self.role.to_string(), remember_me)
            .map_err(|e| format!("生成 token 对失败: {e}"))
    }

    pub fn is_coordinator(&self) -> bool {
        self.role == UserRole::Coordinator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse_and_display() {
        for role in UserRole::all_roles() {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), **role);
        }
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_staff_roles() {
        assert!(UserRole::Assistant.is_staff());
        assert!(UserRole::Coordinator.is_staff());
        assert!(!UserRole::Student.is_staff());
    }

    #[test]
    fn test_password_hash_is_not_serialized() {
        let now = chrono::Utc::now();
        let user = User {
            id: 1,
            username: "maria".into(),
            email: "maria@example.com".into(),
            password_hash: "secret-hash".into(),
            role: UserRole::Student,
            status: UserStatus::Active,
            display_name: None,
            avatar_url: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
        assert!(json.contains("\"role\":\"student\""));
    }
}
