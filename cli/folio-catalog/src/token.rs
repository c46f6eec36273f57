//! Bearer credentials issued by the lending service's token endpoint.

use std::fmt::Debug;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::Value;

const BEARER_TOKEN_TYPE: &str = "bearer";

/// Wire shape of a successful token response.
///
/// Every field is required; serde rejects the payload if any is missing
/// or has the wrong type.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    expires_in: u64,
    scope: String,
}

/// An access token and its declared lifetime.
///
/// Only constructible through [`BearerCredential::parse`],
/// so an instance always carries all four fields of the token response.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerCredential {
    access_token: String,
    token_type: String,
    expires_in: u64,
    scope: String,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Debug for BearerCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerCredential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl BearerCredential {
    /// Build a credential from a decoded token response issued just now.
    ///
    /// Returns `None` if the payload is not an object, if any of
    /// `access_token`, `token_type`, `expires_in` or `scope` is missing or
    /// mistyped, if a string field is empty, or if the token type is not
    /// `bearer`.
    pub fn parse(payload: &Value) -> Option<Self> {
        Self::parse_at(payload, Utc::now())
    }

    /// Like [`BearerCredential::parse`] with an explicit issue instant.
    pub fn parse_at(payload: &Value, issued_at: DateTime<Utc>) -> Option<Self> {
        if !payload.is_object() {
            return None;
        }
        let response = TokenResponse::deserialize(payload).ok()?;

        if response.access_token.is_empty() || response.scope.is_empty() {
            return None;
        }
        if !response.token_type.eq_ignore_ascii_case(BEARER_TOKEN_TYPE) {
            return None;
        }

        let lifetime = TimeDelta::try_seconds(i64::try_from(response.expires_in).ok()?)?;
        let expires_at = issued_at.checked_add_signed(lifetime)?;

        Some(Self {
            access_token: response.access_token,
            token_type: response.token_type,
            expires_in: response.expires_in,
            scope: response.scope,
            issued_at,
            expires_at,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Lifetime declared by the server at issue time.
    pub fn expires_in(&self) -> Duration {
        Duration::from_secs(self.expires_in)
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// The individual, whitespace separated scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope.split_whitespace()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Value for an `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    const REQUIRED_FIELDS: [&str; 4] = ["access_token", "token_type", "expires_in", "scope"];

    fn token_payload() -> Value {
        json!({
            "access_token": "gAAAAB44Au1K7B2dvZzcIacUq",
            "token_type": "bearer",
            "expires_in": 3600,
            "scope": "LIB META AVAIL SRCH PATRON websiteid:{int} puid:{int}",
        })
    }

    #[test]
    fn parses_complete_payload() {
        let issued_at = DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
            .unwrap()
            .to_utc();
        let credential = BearerCredential::parse_at(&token_payload(), issued_at).unwrap();

        assert_eq!(credential.access_token(), "gAAAAB44Au1K7B2dvZzcIacUq");
        assert_eq!(credential.token_type(), "bearer");
        assert_eq!(credential.expires_in(), Duration::from_secs(3600));
        assert_eq!(
            credential.scope(),
            "LIB META AVAIL SRCH PATRON websiteid:{int} puid:{int}"
        );
        assert_eq!(
            credential.expires_at(),
            DateTime::parse_from_rfc3339("2024-05-01T13:00:00Z")
                .unwrap()
                .to_utc()
        );
    }

    #[test]
    fn expiry_is_relative_to_issue_time() {
        let issued_at = Utc::now();
        let credential = BearerCredential::parse_at(&token_payload(), issued_at).unwrap();

        assert!(!credential.is_expired_at(issued_at));
        assert!(!credential.is_expired_at(issued_at + TimeDelta::seconds(3599)));
        assert!(credential.is_expired_at(issued_at + TimeDelta::seconds(3600)));
    }

    #[test]
    fn token_type_is_case_insensitive() {
        let mut payload = token_payload();
        payload["token_type"] = json!("Bearer");
        assert!(BearerCredential::parse(&payload).is_some());

        payload["token_type"] = json!("mac");
        assert!(BearerCredential::parse(&payload).is_none());
    }

    #[test]
    fn empty_strings_are_rejected() {
        for field in ["access_token", "token_type", "scope"] {
            let mut payload = token_payload();
            payload[field] = json!("");
            assert!(
                BearerCredential::parse(&payload).is_none(),
                "empty {field} was accepted"
            );
        }
    }

    #[test]
    fn rejects_non_object_payloads() {
        let as_array = json!([
            "gAAAAB44Au1K7B2dvZzcIacUq",
            "bearer",
            3600,
            "LIB META"
        ]);
        assert!(BearerCredential::parse(&as_array).is_none());
        assert!(BearerCredential::parse(&Value::Null).is_none());
    }

    #[test]
    fn rejects_negative_and_fractional_lifetimes() {
        let mut payload = token_payload();
        payload["expires_in"] = json!(-1);
        assert!(BearerCredential::parse(&payload).is_none());

        payload["expires_in"] = json!(3600.5);
        assert!(BearerCredential::parse(&payload).is_none());
    }

    #[test]
    fn splits_scopes() {
        let credential = BearerCredential::parse(&token_payload()).unwrap();
        let scopes: Vec<_> = credential.scopes().collect();
        assert_eq!(scopes, [
            "LIB",
            "META",
            "AVAIL",
            "SRCH",
            "PATRON",
            "websiteid:{int}",
            "puid:{int}"
        ]);
    }

    #[test]
    fn debug_output_redacts_token() {
        let credential = BearerCredential::parse(&token_payload()).unwrap();
        let debug = format!("{credential:?}");
        assert!(!debug.contains("gAAAAB44Au1K7B2dvZzcIacUq"));
        assert_eq!(
            credential.authorization_header(),
            "Bearer gAAAAB44Au1K7B2dvZzcIacUq"
        );
    }

    fn wrongly_typed_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<f64>()
                .prop_filter("fractional", |f| f.fract() != 0.0)
                .prop_map(Value::from),
            Just(json!([])),
            Just(json!({})),
        ]
    }

    proptest! {
        #[test]
        fn missing_fields_yield_no_credential(mask in 1_u8..16) {
            let mut payload = token_payload();
            let object = payload.as_object_mut().unwrap();
            for (i, field) in REQUIRED_FIELDS.iter().enumerate() {
                if mask & (1 << i) != 0 {
                    object.remove(*field);
                }
            }
            prop_assert!(BearerCredential::parse(&payload).is_none());
        }

        #[test]
        fn mistyped_fields_yield_no_credential(
            field in proptest::sample::select(REQUIRED_FIELDS.to_vec()),
            value in wrongly_typed_value(),
        ) {
            let mut payload = token_payload();
            payload[field] = value;
            prop_assert!(BearerCredential::parse(&payload).is_none());
        }

        #[test]
        fn string_lifetimes_are_rejected(seconds in 0_u32..100_000) {
            let mut payload = token_payload();
            payload["expires_in"] = json!(seconds.to_string());
            prop_assert!(BearerCredential::parse(&payload).is_none());
        }
    }
}
