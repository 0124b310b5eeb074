//! Validation of user supplied file and folder names.

use drivehub_core::{AppError, AppResult};

/// Longest accepted name, in characters.
pub const MAX_NAME_LENGTH: usize = 255;

/// Trim and validate a file or folder name.
///
/// Names may not be blank, may not be `.` or `..`, and may not contain a
/// path separator or control characters.
pub fn normalize_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::invalid_name("Name cannot be empty"));
    }
    if name == "." || name == ".." {
        return Err(AppError::invalid_name(format!("'{name}' is not a valid name")));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AppError::invalid_name("Name cannot contain path separators"));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::invalid_name(
            "Name cannot contain control characters",
        ));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(AppError::invalid_name(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(name.to_string())
}
