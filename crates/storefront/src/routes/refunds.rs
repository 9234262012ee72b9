//! Refund request handler.
//!
//! Customers quote the reference code from their order confirmation; no
//! login is needed.

use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use outfitter_core::{Email, RefCode, RefundId};

use crate::db::{RefundRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Refund request form data.
#[derive(Debug, Deserialize)]
pub struct RefundForm {
    pub ref_code: String,
    #[serde(alias = "message")]
    pub reason: String,
    pub email: String,
}

/// Response after filing a refund request.
#[derive(Debug, Serialize)]
pub struct RefundRequested {
    pub message: &'static str,
    pub refund_id: RefundId,
}

/// File a refund request for a placed order.
#[instrument(skip_all, fields(ref_code = %form.ref_code))]
pub async fn request_refund(
    State(state): State<AppState>,
    Json(form): Json<RefundForm>,
) -> Result<(StatusCode, Json<RefundRequested>)> {
    let not_found = || AppError::NotFound("This order does not exist".to_owned());

    let ref_code = RefCode::parse(&form.ref_code).map_err(|_| not_found())?;
    let email =
        Email::parse(&form.email).map_err(|e| AppError::BadRequest(format!("invalid email: {e}")))?;
    if form.reason.trim().is_empty() {
        return Err(AppError::BadRequest("reason is required".to_owned()));
    }

    let refund = RefundRepository::new(state.pool())
        .request(&ref_code, &form.reason, &email)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => not_found(),
            other => AppError::Database(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(RefundRequested {
            message: "Your request was received.",
            refund_id: refund.id,
        }),
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_form_accepts_message_alias() {
        let form: RefundForm = serde_json::from_str(
            r#"{"ref_code":"abc","message":"Too big","email":"a@b.co"}"#,
        )
        .unwrap();
        assert_eq!(form.reason, "Too big");
    }
}
