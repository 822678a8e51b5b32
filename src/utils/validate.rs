use once_cell::sync::Lazy;
use regex::Regex;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("Invalid username regex"));

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("Invalid email regex")
});

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "password1",
    "12345678",
    "123456789",
    "qwerty123",
    "abcd1234",
    "admin123",
    "welcome1",
    "letmein1",
];

pub fn validate_username(username: &str) -> Result<(), &'static str> {
    // 5 <= 长度 <= 16
    if username.len() < 5 || username.len() > 16 {
        return Err("用户名长度必须在 5 到 16 个字符之间");
    }
    if !USERNAME_RE.is_match(username) {
        return Err("用户名只能包含字母、数字、下划线或连字符");
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.len() > 254 || !EMAIL_RE.is_match(email) {
        return Err("邮箱格式无效");
    }
    Ok(())
}

/// 密码策略：至少 8 位，同时包含大写字母、小写字母与数字，且不在常见弱密码表中。
///
/// 返回全部不满足的条目，便于前端一次性提示。
pub fn password_policy_violations(password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();

    if password.chars().count() < 8 {
        errors.push("密码长度至少 8 位");
    }
    if password.chars().count() > 128 {
        errors.push("密码长度不能超过 128 位");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("密码必须包含大写字母");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("密码必须包含小写字母");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("密码必须包含数字");
    }
    if COMMON_PASSWORDS
        .iter()
        .any(|weak| password.eq_ignore_ascii_case(weak))
    {
        errors.push("密码过于常见");
    }

    errors
}

pub fn validate_password(password: &str) -> Result<(), String> {
    let errors = password_policy_violations(password);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors.join("; "))
    }
}

/// 必填文本字段：去除首尾空白后非空，且不超过 `max_chars` 个字符
pub fn validate_required_text(field: &str, value: &str, max_chars: usize) -> Result<(), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("{field}不能为空"));
    }
    if trimmed.chars().count() > max_chars {
        return Err(format!("{field}不能超过 {max_chars} 个字符"));
    }
    Ok(())
}

/// 可选文本字段：存在时不超过 `max_chars` 个字符
pub fn validate_optional_text(
    field: &str,
    value: Option<&str>,
    max_chars: usize,
) -> Result<(), String> {
    match value {
        Some(v) if v.chars().count() > max_chars => {
            Err(format!("{field}不能超过 {max_chars} 个字符"))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("maria_g").is_ok());
        assert!(validate_username("jo").is_err());
        assert!(validate_username("a_very_long_username").is_err());
        assert!(validate_username("bad name").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("teacher@lingua.school").is_ok());
        assert!(validate_email("no-at-sign.example").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password("Bonjour2026").is_ok());
        assert!(validate_password("SecurePass123").is_ok());
    }

    #[test]
    fn test_password_violations_are_collected() {
        let errors = password_policy_violations("abc");
        assert!(errors.contains(&"密码长度至少 8 位"));
        assert!(errors.contains(&"密码必须包含大写字母"));
        assert!(errors.contains(&"密码必须包含数字"));
        assert!(!errors.contains(&"密码必须包含小写字母"));
    }

    #[test]
    fn test_common_password_rejected() {
        let err = validate_password("Password1").unwrap_err();
        assert!(err.contains("密码过于常见"));
    }

    #[test]
    fn test_required_text() {
        assert!(validate_required_text("标题", "Unit 1", 10).is_ok());
        assert_eq!(
            validate_required_text("标题", "   ", 10).unwrap_err(),
            "标题不能为空"
        );
        assert!(validate_required_text("标题", "abcdefghijk", 10).is_err());
        assert!(validate_optional_text("描述", None, 5).is_ok());
        assert!(validate_optional_text("描述", Some("abcdef"), 5).is_err());
    }
}
