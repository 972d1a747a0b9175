//! Caller identity from the `x-user-id` header.
//!
//! There is no authentication; the header only namespaces conversations.
//! A missing or blank header means `anonymous`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::http::error::AppError;

pub const USER_HEADER: &str = "x-user-id";
pub const ANONYMOUS: &str = "anonymous";

/// The user a request acts for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserId(pub String);

impl<S: Send + Sync> FromRequestParts<S> for UserId {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_parts(parts).map(UserId)
    }
}

fn user_from_parts(parts: &Parts) -> Result<String, AppError> {
    let Some(value) = parts.headers.get(USER_HEADER) else {
        return Ok(ANONYMOUS.to_string());
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::BadRequest(format!("invalid {USER_HEADER} header encoding")))?
        .trim();
    if value.is_empty() {
        Ok(ANONYMOUS.to_string())
    } else {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/roles");
        if let Some(value) = header {
            builder = builder.header(USER_HEADER, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn header_names_the_user() {
        assert_eq!(user_from_parts(&parts(Some(" alice "))).unwrap(), "alice");
    }

    #[test]
    fn missing_or_blank_header_is_anonymous() {
        assert_eq!(user_from_parts(&parts(None)).unwrap(), ANONYMOUS);
        assert_eq!(user_from_parts(&parts(Some("  "))).unwrap(), ANONYMOUS);
    }
}
