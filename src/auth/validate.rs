/// Validate an account identifier: 1-64 chars, letters, digits, `_`, `-`, `.`.
pub fn validate_account_id(id: &str, field_name: &str) -> Option<String> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > 64 {
        return Some(format!("{field_name} must be at most 64 characters"));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Some(format!(
            "{field_name} may only contain letters, numbers, '_', '-' and '.'"
        ));
    }
    None
}

/// Validate an email: must contain '@' and '.', max 254 chars.
pub fn validate_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Some("Official mail ID is required".to_string());
    }
    if trimmed.len() > 254 {
        return Some("Official mail ID must be at most 254 characters".to_string());
    }
    if !trimmed.contains('@') || !trimmed.contains('.') {
        return Some("Official mail ID must be a valid address (contain '@' and '.')".to_string());
    }
    None
}

/// Validate a new password: min 8 chars.
pub fn validate_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("Password is required".to_string());
    }
    if password.chars().count() < 8 {
        return Some("Password must be at least 8 characters".to_string());
    }
    None
}

/// Validate a required text field with a max length.
pub fn validate_required(value: &str, field_name: &str, max_len: usize) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(format!("{field_name} is required"));
    }
    if trimmed.len() > max_len {
        return Some(format!("{field_name} must be at most {max_len} characters"));
    }
    None
}
