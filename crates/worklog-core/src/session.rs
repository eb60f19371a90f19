//! Session identity: generation and validation of session identifiers.
//!
//! Stateless utility functions. Generated identifiers are ULID strings
//! (128-bit, monotonic-friendly, charset-safe); supplied identifiers are
//! checked against a stricter rule than the general input validator in
//! [`crate::validation`]; see [`MAX_SESSION_ID_LEN`].

use ulid::Ulid;

use crate::error::{Result, WorklogError};

/// Maximum length accepted by this module's validator.
///
/// Note: the create-operation's input validator accepts up to 255
/// characters ([`crate::validation::MAX_INPUT_SESSION_ID_LEN`]); a supplied
/// identifier in the 129..=255 range is therefore storable even though it
/// could never have been produced by [`generate_session_id`].
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Produce a fresh session identifier.
///
/// ULIDs are 128 bits of timestamp + randomness, so collisions with any
/// previously generated value are vanishingly unlikely.
pub fn generate_session_id() -> String {
    Ulid::new().to_string()
}

/// True iff `s` is 1..=128 characters, all alphanumeric, `.`, `_` or `-`.
pub fn is_valid_session_id(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= MAX_SESSION_ID_LEN
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// Return `session_id` if it is well-formed, or generate a fresh one when
/// none was supplied.
pub fn get_or_create_session(session_id: Option<&str>) -> Result<String> {
    match session_id {
        Some(s) if is_valid_session_id(s) => Ok(s.to_string()),
        Some(s) => Err(WorklogError::session(
            s,
            "session id must be 1-128 characters of [A-Za-z0-9._-]",
        )),
        None => Ok(generate_session_id()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_unique_and_valid() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_ne!(a, b);
        assert!(is_valid_session_id(&a));
        assert!(is_valid_session_id(&b));
    }

    #[test]
    fn validator_accepts_allowed_charset() {
        assert!(is_valid_session_id("abc"));
        assert!(is_valid_session_id("worklog-demo-2026-08-23-1234"));
        assert!(is_valid_session_id("a.b_c-d"));
        assert!(is_valid_session_id(&"x".repeat(128)));
    }

    #[test]
    fn validator_rejects_bad_input() {
        assert!(!is_valid_session_id(""));
        assert!(!is_valid_session_id(&"x".repeat(129)));
        assert!(!is_valid_session_id("has space"));
        assert!(!is_valid_session_id("slash/id"));
        assert!(!is_valid_session_id("at@id"));
    }

    #[test]
    fn get_or_create_passes_through_valid_id() {
        let id = get_or_create_session(Some("session-1")).unwrap();
        assert_eq!(id, "session-1");
    }

    #[test]
    fn get_or_create_rejects_malformed_id() {
        let err = get_or_create_session(Some("bad id")).unwrap_err();
        assert!(matches!(err, WorklogError::Session { .. }));
    }

    #[test]
    fn get_or_create_generates_when_absent() {
        let id = get_or_create_session(None).unwrap();
        assert!(is_valid_session_id(&id));
    }
}
