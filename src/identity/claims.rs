use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

/// Payload claims carried by the server-issued bearer token.
/// `iat`/`exp` are epoch seconds as issued by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Decode the payload segment of a JWT without signature verification.
/// The client never holds the signing key; validity on this side is purely
/// claim shape plus the expiry gate applied by the session store.
/// Any malformed input yields None.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let mut parts = token.split('.');
    let _header = parts.next()?;
    let payload = parts.next()?;
    // A JWT has exactly three segments
    parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.as_bytes())
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn b64(v: &serde_json::Value) -> String {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(v.to_string())
    }

    fn token_with_payload(payload: &serde_json::Value) -> String {
        let header = json!({"alg": "HS256", "typ": "JWT"});
        format!("{}.{}.sig", b64(&header), b64(payload))
    }

    #[test]
    fn decodes_well_formed_payload() {
        let tok = token_with_payload(&json!({
            "userId": 7, "username": "ada", "email": "ada@example.com",
            "role": "admin", "iat": 1700000000, "exp": 1700003600
        }));
        let claims = decode_claims(&tok).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, 1700003600);
    }

    #[test]
    fn missing_required_claim_fails_closed() {
        // no exp
        let tok = token_with_payload(&json!({
            "userId": 7, "username": "ada", "role": "user", "iat": 1700000000
        }));
        assert!(decode_claims(&tok).is_none());
    }

    #[test]
    fn garbage_inputs_fail_closed() {
        assert!(decode_claims("").is_none());
        assert!(decode_claims("only-one-segment").is_none());
        assert!(decode_claims("a.b").is_none());
        assert!(decode_claims("a.!!!not-base64!!!.c").is_none());
        assert!(decode_claims("a.b.c.d").is_none());
        // valid base64 but not JSON
        let junk = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode("plain text");
        assert!(decode_claims(&format!("h.{}.s", junk)).is_none());
    }

    #[test]
    fn email_claim_is_optional() {
        let tok = token_with_payload(&json!({
            "userId": 3, "username": "bo", "role": "user",
            "iat": 1700000000, "exp": 1700003600
        }));
        let claims = decode_claims(&tok).unwrap();
        assert_eq!(claims.email, None);
        assert_eq!(claims.role, Role::User);
    }
}
