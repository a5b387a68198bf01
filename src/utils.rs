// ============================================================================
// Request-body validation helpers
// ============================================================================

/// Validates an email address and normalizes it to lower case.
pub fn validate_email(email: &str) -> Result<String, String> {
    if !email.contains('@') {
        return Err("Failed email validation".to_string());
    }
    if email.len() > 255 {
        return Err("Email must not exceed 255 characters".to_string());
    }
    Ok(email.to_lowercase())
}

pub fn validate_username(username: &str) -> Result<(), String> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters long".to_string());
    }
    if username.len() > 100 {
        return Err("Username must not exceed 100 characters".to_string());
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters long".to_string());
    }
    // bcrypt truncates input beyond 72 bytes
    if password.len() > 72 {
        return Err("Password must not exceed 72 characters".to_string());
    }
    Ok(())
}

pub fn validate_role_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Role name must not be empty".to_string());
    }
    if name.len() > 100 {
        return Err("Role name must not exceed 100 characters".to_string());
    }
    Ok(())
}

pub fn validate_role_description(description: &str) -> Result<(), String> {
    if description.len() > 255 {
        return Err("Role description must not exceed 255 characters".to_string());
    }
    Ok(())
}
