//! 登录 / 注册表单校验
//!
//! 密码强度评估交给外部库，这里只做必填与长度检查。

use once_cell::sync::Lazy;
use regex::Regex;

pub const EMAIL_MAX_LEN: usize = 255;
pub const PASSWORD_MIN_LEN: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    EmailRequired,
    EmailTooLong,
    EmailInvalid,
    PasswordRequired,
    PasswordTooShort,
}

impl ValidationError {
    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::EmailRequired => "El email es requerido",
            ValidationError::EmailTooLong => "El email es demasiado largo",
            ValidationError::EmailInvalid => "Formato de email inválido",
            ValidationError::PasswordRequired => "La contraseña es requerida",
            ValidationError::PasswordTooShort => {
                "La contraseña debe tener al menos 8 caracteres"
            }
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl std::error::Error for ValidationError {}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.len() > EMAIL_MAX_LEN {
        return Err(ValidationError::EmailTooLong);
    }
    if !EMAIL_RE.is_match(email) {
        return Err(ValidationError::EmailInvalid);
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::PasswordRequired);
    }
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(())
}

/// 同时校验两项，返回第一个错误
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    validate_email(email)?;
    validate_password(password)
}

pub const DISPLAY_NAME_MAX_LEN: usize = 60;

/// 档案中的显示名称：去掉首尾空白后不能为空，且不超过 60 个字符
pub fn validate_display_name(name: &str) -> Result<String, &'static str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("El nombre no puede estar vacío");
    }
    if trimmed.chars().count() > DISPLAY_NAME_MAX_LEN {
        return Err("El nombre es demasiado largo");
    }
    Ok(trimmed.to_string())
}

/// 身份服务错误码对应的提示
///
/// 错误码可能带有说明后缀（`WEAK_PASSWORD : Password should be ...`），只看冒号之前的部分。
pub fn auth_error_message(code: &str) -> &'static str {
    let code = code.split(':').next().unwrap_or(code).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            "Email o contraseña incorrectos"
        }
        "EMAIL_EXISTS" => "El email ya está registrado",
        "WEAK_PASSWORD" => "La contraseña es demasiado débil",
        "USER_DISABLED" => "La cuenta está deshabilitada",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Demasiados intentos. Inténtalo más tarde",
        "INVALID_EMAIL" => "Formato de email inválido",
        _ => "No se pudo completar la autenticación",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_rules() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailRequired));
        assert_eq!(validate_email("   "), Err(ValidationError::EmailRequired));
        assert_eq!(validate_email("ana@"), Err(ValidationError::EmailInvalid));
        assert_eq!(validate_email("ana@finca"), Err(ValidationError::EmailInvalid));
        assert!(validate_email("ana.gomez+riego@finca.co").is_ok());

        let long = format!("{}@finca.co", "a".repeat(EMAIL_MAX_LEN));
        assert_eq!(validate_email(&long), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn password_rules() {
        assert_eq!(validate_password(""), Err(ValidationError::PasswordRequired));
        assert_eq!(validate_password("corta"), Err(ValidationError::PasswordTooShort));
        assert!(validate_password("suficiente").is_ok());
    }

    #[test]
    fn credentials_report_email_first() {
        assert_eq!(
            validate_credentials("mal", ""),
            Err(ValidationError::EmailInvalid)
        );
    }

    #[test]
    fn display_name_is_trimmed() {
        assert_eq!(validate_display_name("  Ana  "), Ok("Ana".to_string()));
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(DISPLAY_NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn auth_codes_map_to_messages() {
        assert_eq!(auth_error_message("EMAIL_NOT_FOUND"), "Email o contraseña incorrectos");
        assert_eq!(
            auth_error_message("WEAK_PASSWORD : Password should be at least 6 characters"),
            "La contraseña es demasiado débil"
        );
        assert_eq!(auth_error_message("SOMETHING_NEW"), "No se pudo completar la autenticación");
    }
}
