use crate::error::AppError;
use crate::routes::extractors::CurrentUser;

/// Role gate for protected routes.
///
/// Allows when the user's role names intersect `required`. An empty
/// `required` set denies: a route that demands roles but names none is a
/// configuration mistake, not an open door. Ownership rules ("a user may act
/// on their own record") are composed at route level, on top of this check.
pub fn require_role(current: &CurrentUser, required: &[&str]) -> Result<(), AppError> {
    let held = current.role_names();
    if required.iter().any(|name| held.contains(name)) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "You do not have permission to access this resource".to_string(),
        ))
    }
}
