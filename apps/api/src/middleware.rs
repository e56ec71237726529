use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::middleware::Next;
use axum::response::Response;
use gatehouse_core::{AppError, RoleId, UserIdentity};

use crate::error::ApiResult;
use crate::state::AppState;

pub const SUBJECT_HEADER: &str = "x-gatehouse-subject";
pub const ROLE_HEADER: &str = "x-gatehouse-role";
pub const DISPLAY_NAME_HEADER: &str = "x-gatehouse-name";

/// Subject used in audit events written through the billing endpoint.
pub const BILLING_SUBJECT: &str = "billing";

pub async fn require_identity(mut request: Request, next: Next) -> ApiResult<Response> {
    let identity = identity_from_headers(request.headers())?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

pub async fn require_billing_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("billing credentials required".to_owned()))?;

    if !constant_time_eq(token.as_bytes(), state.billing_shared_secret.as_bytes()) {
        return Err(AppError::Unauthorized("invalid billing credentials".to_owned()).into());
    }

    Ok(next.run(request).await)
}

pub fn identity_from_headers(headers: &HeaderMap) -> Result<UserIdentity, AppError> {
    let subject = header_value(headers, SUBJECT_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("{SUBJECT_HEADER} header is required")))?;
    let role = header_value(headers, ROLE_HEADER)
        .ok_or_else(|| AppError::Unauthorized(format!("{ROLE_HEADER} header is required")))?;
    let display_name = header_value(headers, DISPLAY_NAME_HEADER).unwrap_or(subject);

    Ok(UserIdentity::new(subject, display_name, RoleId::new(role)?))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn constant_time_eq(left: &[u8], right: &[u8]) -> bool {
    if left.len() != right.len() {
        return false;
    }

    left.iter()
        .zip(right)
        .fold(0_u8, |difference, (a, b)| difference | (a ^ b))
        == 0
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use gatehouse_core::AppError;

    use super::{
        DISPLAY_NAME_HEADER, ROLE_HEADER, SUBJECT_HEADER, constant_time_eq, identity_from_headers,
    };

    fn headers(entries: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (name, value) in entries {
            headers.insert(*name, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn identity_headers_build_actor() {
        let identity = identity_from_headers(&headers(&[
            (SUBJECT_HEADER, "alice"),
            (ROLE_HEADER, " sales "),
            (DISPLAY_NAME_HEADER, "Alice"),
        ]));

        assert!(identity.is_ok_and(|identity| {
            identity.subject() == "alice"
                && identity.role_id().as_str() == "sales"
                && identity.display_name() == "Alice"
        }));
    }

    #[test]
    fn missing_role_header_is_unauthorized() {
        let identity = identity_from_headers(&headers(&[(SUBJECT_HEADER, "alice")]));

        assert!(matches!(identity, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn blank_subject_header_is_unauthorized() {
        let identity =
            identity_from_headers(&headers(&[(SUBJECT_HEADER, "  "), (ROLE_HEADER, "sales")]));

        assert!(matches!(identity, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn secret_comparison_requires_exact_match() {
        assert!(constant_time_eq(b"secret", b"secret"));
        assert!(!constant_time_eq(b"secret", b"secreT"));
        assert!(!constant_time_eq(b"secret", b"secret-longer"));
    }
}
