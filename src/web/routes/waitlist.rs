use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{error, info, warn};

use crate::{
    web::{
        data::{SignupAck, WaitlistEmail, WaitlistEntry},
        Error, WebResult,
    },
    AppState,
};

/// The signup endpoint.
///
/// The only client-visible failure is an invalid email (400); a body that
/// doesn't parse as JSON or a write that fails is acknowledged with
/// `{"ok":true,"saved":false}` and reported through logs only. Persistence is
/// best-effort and never retried.
#[tracing::instrument(name = "Waitlist signup", skip_all)]
pub async fn signup(
    State(app_state): State<AppState>,
    body: Bytes,
) -> WebResult<Json<SignupAck>> {
    // An absent body is a missing email, not a malformed one.
    let body: Value = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(body) => body,
            Err(er) => {
                error!("waitlist signup failed before validation: {er}");
                return Ok(Json(SignupAck::not_saved()));
            }
        }
    };

    let email = WaitlistEmail::from_json_field(body.get("email"))?;
    info!("waitlist signup: {email}");

    let entry = WaitlistEntry::new(email);
    match upsert_waitlist_entry(app_state.database_mgr.db(), &entry).await {
        Ok(()) => Ok(Json(SignupAck::saved())),
        Err(er) => {
            warn!("waitlist write failed, acknowledging anyway: {er}");
            Ok(Json(SignupAck::not_saved()))
        }
    }
}

/// Browser preflight for the cross-origin signup form.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn method_not_allowed() -> WebResult<()> {
    Err(Error::MethodNotAllowed)
}

/// Inserts the entry, or refreshes the existing row for the same email.
/// Repeat signups rewrite every column, `created_at` included.
async fn upsert_waitlist_entry(db: &PgPool, entry: &WaitlistEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"INSERT INTO waitlist (email, created_at, updated_at, source)
           VALUES ($1, $2, $3, $4)
           ON CONFLICT (email)
           DO UPDATE SET created_at = EXCLUDED.created_at,
                         updated_at = EXCLUDED.updated_at,
                         source = EXCLUDED.source"#,
    )
    .bind(entry.email.as_ref())
    .bind(entry.created_at)
    .bind(entry.updated_at)
    .bind(entry.source)
    .execute(db)
    .await?;

    Ok(())
}
