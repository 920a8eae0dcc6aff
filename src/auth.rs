use axum::{extract::FromRequestParts, http::request::Parts};
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::AppState;

pub const CREDENTIAL_HEADER: &str = "x-admin-credential";

/// Proof that the request carried the shared admin credential. This is the
/// only access control for writes; it says nothing about which user is acting.
pub struct AdminCredential;

impl FromRequestParts<AppState> for AdminCredential {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let supplied = parts.headers.get(CREDENTIAL_HEADER).map(|v| v.as_bytes());

        match supplied {
            Some(value) if credential_matches(value, state.admin_credential.as_bytes()) => Ok(AdminCredential),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// Compare without an early exit on the first differing byte.
fn credential_matches(supplied: &[u8], expected: &[u8]) -> bool {
    supplied.ct_eq(expected).into()
}
