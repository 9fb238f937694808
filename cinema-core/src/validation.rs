//! Login and registration form rules.

const MIN_USERNAME_LENGTH: usize = 8;
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Логин должен содержать минимум 8 символов")]
    UsernameTooShort,

    #[error("Пароль должен содержать минимум 8 символов")]
    PasswordTooShort,

    #[error("Пароль должен содержать минимум 1 заглавную букву")]
    PasswordMissingUppercase,

    #[error("Пароль должен содержать минимум 1 цифру")]
    PasswordMissingDigit,

    #[error("Пароль не совпадает")]
    PasswordMismatch,
}

pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.chars().count() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::UsernameTooShort);
    }
    Ok(())
}

/// Rules are checked in order, the first failing one is reported
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(is_uppercase_letter) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    Ok(())
}

pub fn validate_password_confirmation(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

// Latin A-Z and Cyrillic А-Я.
fn is_uppercase_letter(c: char) -> bool {
    matches!(c, 'A'..='Z' | 'А'..='Я')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_length() {
        assert!(validate_username("username1").is_ok());
        assert!(validate_username("verylongusername").is_ok());
        assert_eq!(validate_username("short"), Err(ValidationError::UsernameTooShort));
        assert_eq!(validate_username(""), Err(ValidationError::UsernameTooShort));
    }

    #[test]
    fn test_password_rules_in_order() {
        assert!(validate_password("Password1").is_ok());
        assert!(validate_password("ValidPass123").is_ok());
        assert_eq!(validate_password("Pass1"), Err(ValidationError::PasswordTooShort));
        assert_eq!(validate_password("password1"), Err(ValidationError::PasswordMissingUppercase));
        assert_eq!(validate_password("Password"), Err(ValidationError::PasswordMissingDigit));
    }

    #[test]
    fn test_cyrillic_uppercase_counts() {
        assert!(validate_password("Пароль12345").is_ok());
        assert_eq!(
            validate_password("пароль12345"),
            Err(ValidationError::PasswordMissingUppercase)
        );
    }

    #[test]
    fn test_password_confirmation() {
        assert!(validate_password_confirmation("Password1", "Password1").is_ok());
        assert_eq!(
            validate_password_confirmation("Password1", "Password2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            ValidationError::PasswordMissingUppercase.to_string(),
            "Пароль должен содержать минимум 1 заглавную букву"
        );
    }
}
