//! Most of the structs in the `web` module and their implementations live here.
//! Includes structs that need to be validated, their parsing implementations
//! and tests for those.

use chrono::Utc;
use derive_more::Display;
use lazy_regex::regex_is_match;
use serde::Serialize;
use serde_json::Value;

/// Origin channel stamped on every signup row.
pub const SIGNUP_SOURCE: &str = "howdy-site";

// ###################################
// ->   STRUCTS
// ###################################
/// A normalized, shape-checked waitlist email.
/// `parse` is the only constructor: trims, lowercases and rejects anything
/// that doesn't look like `local@domain.tld`.
#[derive(Debug, Clone, Display, PartialEq, Eq)]
pub struct WaitlistEmail(String);

impl AsRef<str> for WaitlistEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl WaitlistEmail {
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref().trim().to_lowercase();

        if value.is_empty() {
            return Err(DataParsingError::EmailEmpty);
        }

        // Deliberately permissive, not RFC-5322: anything that is
        // non-whitespace, non-'@' around a single '@' and a '.' in the domain.
        if !regex_is_match!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", &value) {
            return Err(DataParsingError::EmailInvalid);
        }

        Ok(WaitlistEmail(value))
    }

    /// Coerces the JSON `email` field to a string before parsing.
    /// Strings pass through, numbers and booleans render to their literal
    /// text; everything else (missing, null, arrays, objects) coerces to the
    /// empty string and is rejected by `parse`.
    pub fn from_json_field(field: Option<&Value>) -> Result<Self, DataParsingError> {
        let raw = match field {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        };

        Self::parse(raw)
    }
}

/// The row persisted for one signup.
#[derive(Debug, Clone)]
pub struct WaitlistEntry {
    pub email: WaitlistEmail,
    pub created_at: i64,
    pub updated_at: i64,
    pub source: &'static str,
}

impl WaitlistEntry {
    /// Repeat signups rebuild the whole row, so both timestamps are refreshed
    /// on every write.
    pub fn new(email: WaitlistEmail) -> Self {
        let now = Utc::now().timestamp_millis();
        WaitlistEntry {
            email,
            created_at: now,
            updated_at: now,
            source: SIGNUP_SOURCE,
        }
    }
}

/// The JSON acknowledgment body: `{"ok": true, "saved": <bool>}`.
/// `ok` is always true; persistence problems only flip `saved`.
#[derive(Debug, Serialize)]
pub struct SignupAck {
    pub ok: bool,
    pub saved: bool,
}

impl SignupAck {
    pub fn saved() -> Self {
        SignupAck {
            ok: true,
            saved: true,
        }
    }
    pub fn not_saved() -> Self {
        SignupAck {
            ok: true,
            saved: false,
        }
    }
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email missing")]
    EmailEmpty,
    #[error("email invalid")]
    EmailInvalid,
}
