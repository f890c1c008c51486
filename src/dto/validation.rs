//! Validation helpers for DTOs.

use validator::ValidationError;

/// Number of digits in a room code.
pub const ROOM_CODE_LEN: usize = 6;
/// Longest accepted team name, in characters, once trimmed.
pub const TEAM_NAME_MAX_LEN: usize = 64;

/// Validates that a room code is exactly six ASCII digits.
///
/// # Examples
///
/// ```ignore
/// validate_room_code("042137") // Ok
/// validate_room_code("42137")  // Err - too short
/// validate_room_code("04213a") // Err - not a digit
/// ```
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if code.len() != ROOM_CODE_LEN {
        let mut err = ValidationError::new("room_code_length");
        err.message = Some(
            format!(
                "Room code must be exactly {ROOM_CODE_LEN} digits (got {})",
                code.len()
            )
            .into(),
        );
        return Err(err);
    }

    if !code.chars().all(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("room_code_format");
        err.message = Some("Room code must contain only digits".into());
        return Err(err);
    }

    Ok(())
}

/// Validates that a team name has visible characters and fits
/// [`TEAM_NAME_MAX_LEN`] once surrounding whitespace is removed.
pub fn validate_team_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("team_name_blank");
        err.message = Some("Team name must not be blank".into());
        return Err(err);
    }

    let len = trimmed.chars().count();
    if len > TEAM_NAME_MAX_LEN {
        let mut err = ValidationError::new("team_name_length");
        err.message = Some(
            format!("Team name must be at most {TEAM_NAME_MAX_LEN} characters (got {len})").into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_room_code_valid() {
        assert!(validate_room_code("000000").is_ok());
        assert!(validate_room_code("123456").is_ok());
        assert!(validate_room_code("999999").is_ok());
    }

    #[test]
    fn test_validate_room_code_invalid_length() {
        assert!(validate_room_code("12345").is_err()); // too short
        assert!(validate_room_code("1234567").is_err()); // too long
        assert!(validate_room_code("").is_err()); // empty
    }

    #[test]
    fn test_validate_room_code_invalid_format() {
        assert!(validate_room_code("12345a").is_err());
        assert!(validate_room_code("12 456").is_err());
        assert!(validate_room_code("١٢٣٤٥٦").is_err()); // non-ASCII digits
    }

    #[test]
    fn test_validate_team_name() {
        assert!(validate_team_name("Alpha").is_ok());
        assert!(validate_team_name("  Beta ").is_ok());
        assert!(validate_team_name("").is_err());
        assert!(validate_team_name(" \t ").is_err());
    }

    #[test]
    fn test_validate_team_name_length_ignores_padding() {
        let padded = format!("   {}   ", "x".repeat(TEAM_NAME_MAX_LEN));
        assert!(validate_team_name(&padded).is_ok());
        assert!(validate_team_name(&"x".repeat(TEAM_NAME_MAX_LEN + 1)).is_err());
        assert!(validate_team_name(&"é".repeat(TEAM_NAME_MAX_LEN)).is_ok());
    }
}
