//! Session identifier generation and cookie encoding

use crate::error::{WsmError, WsmResult};
use base64::{engine::general_purpose::URL_SAFE, Engine};
use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes in a session identifier (256 bits)
pub const SESSION_ID_BYTES: usize = 32;

/// Generate a new session identifier from the OS randomness source.
///
/// Failing to read the entropy source is an error; no weaker fallback is used.
pub fn generate_session_id() -> WsmResult<String> {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| WsmError::RandomnessUnavailable(e.to_string()))?;

    Ok(URL_SAFE.encode(bytes))
}

/// Escape an identifier for use as a cookie value
pub fn escape(session_id: &str) -> String {
    urlencoding::encode(session_id).into_owned()
}

/// Reverse [`escape`] on a cookie value
///
/// Every `%` must start a two-digit hex escape, and the decoded bytes must be
/// UTF-8.
pub fn unescape(cookie_value: &str) -> WsmResult<String> {
    let bytes = cookie_value.as_bytes();
    let mut i = 0;
    while let Some(offset) = bytes[i..].iter().position(|&b| b == b'%') {
        let at = i + offset;
        let valid = bytes
            .get(at + 1..at + 3)
            .is_some_and(|digits| digits.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            return Err(WsmError::MalformedCookie(format!(
                "invalid escape at byte {}",
                at
            )));
        }
        i = at + 3;
    }

    urlencoding::decode(cookie_value)
        .map(|id| id.into_owned())
        .map_err(|e| WsmError::MalformedCookie(e.to_string()))
}

/// Shortened identifier for log fields
pub(crate) fn redact(session_id: &str) -> &str {
    let end = session_id
        .char_indices()
        .nth(8)
        .map(|(i, _)| i)
        .unwrap_or(session_id.len());
    &session_id[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_have_full_entropy_length() {
        let id = generate_session_id().unwrap();
        // 32 bytes of padded base64
        assert_eq!(id.len(), 44);
        let decoded = URL_SAFE.decode(&id).unwrap();
        assert_eq!(decoded.len(), SESSION_ID_BYTES);
    }

    #[test]
    fn generated_ids_are_distinct() {
        let ids: HashSet<String> = (0..256).map(|_| generate_session_id().unwrap()).collect();
        assert_eq!(ids.len(), 256);
    }

    #[test]
    fn escape_unescape_preserves_generated_ids() {
        for _ in 0..64 {
            let id = generate_session_id().unwrap();
            assert_eq!(unescape(&escape(&id)).unwrap(), id);
        }
    }

    #[test]
    fn padding_is_escaped() {
        let id = generate_session_id().unwrap();
        let escaped = escape(&id);
        assert!(escaped.ends_with("%3D"));
        assert!(!escaped.contains('='));
    }

    #[test]
    fn invalid_utf8_is_malformed() {
        let err = unescape("%FF%FE").unwrap_err();
        assert!(matches!(err, WsmError::MalformedCookie(_)));
    }

    #[test]
    fn broken_escapes_are_malformed() {
        for value in ["%zz", "%", "abc%4", "ok%2"] {
            assert!(
                matches!(unescape(value), Err(WsmError::MalformedCookie(_))),
                "{value} should be rejected"
            );
        }
        assert_eq!(unescape("a%2Fb%3d").unwrap(), "a/b=");
    }

    #[test]
    fn redact_keeps_prefix() {
        assert_eq!(redact("abcdefghijkl"), "abcdefgh");
        assert_eq!(redact("abc"), "abc");
    }
}
