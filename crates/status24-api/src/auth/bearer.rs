//! `Authorization` header parsing.

use status24_core::AppError;

/// Extracts the token from an `Authorization: Bearer <token>` header value.
///
/// The scheme is matched case-insensitively and the value must split into
/// exactly two space-separated parts.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, AppError> {
    let header = header
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Authorization header is missing".to_string()))?;

    let parts: Vec<&str> = header.split(' ').collect();
    match parts.as_slice() {
        [scheme, token] if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
            Ok(token)
        }
        _ => Err(AppError::Unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <token>'.".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_any_scheme_case() {
        assert_eq!(parse_bearer(Some("Bearer abc")).unwrap(), "abc");
        assert_eq!(parse_bearer(Some("bearer abc")).unwrap(), "abc");
        assert_eq!(parse_bearer(Some("BEARER abc")).unwrap(), "abc");
    }

    #[test]
    fn missing_header() {
        let err = parse_bearer(None).unwrap_err();
        assert_eq!(err.to_string(), "Unauthorized: Authorization header is missing");
    }

    #[test]
    fn rejects_malformed_values() {
        for value in ["Bearer", "Token abc", "Bearer a b", "Bearer  abc", "abc"] {
            let err = parse_bearer(Some(value)).unwrap_err();
            assert!(
                err.to_string().contains("Expected 'Bearer <token>'"),
                "{value:?} should be rejected"
            );
        }
    }
}
