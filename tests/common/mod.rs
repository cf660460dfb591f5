#![allow(dead_code)]

use base64::Engine;
use serde_json::json;

/// Unsigned JWT in the server's shape; the client never checks the signature.
pub fn make_token(user_id: i64, username: &str, role: &str, iat: i64, exp: i64) -> String {
    let enc = |v: &serde_json::Value| {
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(v.to_string())
    };
    let header = json!({"alg": "HS256", "typ": "JWT"});
    let payload = json!({
        "userId": user_id,
        "username": username,
        "email": format!("{}@example.com", username),
        "role": role,
        "iat": iat,
        "exp": exp
    });
    format!("{}.{}.testsig", enc(&header), enc(&payload))
}
