use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

use super::claims::{decode_claims, Role};
use super::token_store::TokenStore;

/// Decoded, time-bounded identity derived from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    pub issued_at: i64,
    pub expires_at: i64,
}

/// Actions gated by the session's role and resource ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Edit,
    Delete,
}

/// Owns the authentication token and the two-state session machine:
/// Anonymous -> Authenticated (successful decode) -> Anonymous (logout or
/// first detection of expiry). Transitions are synchronous and total.
pub struct SessionStore {
    tokens: Arc<dyn TokenStore>,
    current: RwLock<Option<Session>>,
}

impl SessionStore {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens, current: RwLock::new(None) }
    }

    /// Startup: adopt a previously persisted token if it still decodes and is
    /// unexpired; otherwise clear it and stay anonymous.
    pub fn init(&self) {
        let Some(raw) = self.tokens.load() else { return };
        match Self::load_session(&raw, Utc::now().timestamp()) {
            Some(sess) => {
                info!(user = %sess.username, role = ?sess.role, "session restored from persisted token");
                *self.current.write() = Some(sess);
            }
            None => {
                debug!("persisted token invalid or expired; clearing");
                self.tokens.clear();
            }
        }
    }

    /// Fails closed: any decode error, missing claim, or `exp <= now` yields
    /// None, never an error value.
    pub fn load_session(raw_token: &str, now: i64) -> Option<Session> {
        let claims = decode_claims(raw_token)?;
        if claims.exp <= now {
            return None;
        }
        Some(Session {
            token: raw_token.to_string(),
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        })
    }

    /// Adopt a freshly issued token after login or registration, persisting it
    /// alongside the in-memory session.
    pub fn establish(&self, raw_token: &str) -> ClientResult<Session> {
        let now = Utc::now().timestamp();
        let Some(claims) = decode_claims(raw_token) else {
            return Err(ClientError::auth_invalid("token_invalid", "server token did not decode"));
        };
        if claims.exp <= now {
            return Err(ClientError::auth_expired("token_expired", "server token already expired"));
        }
        let sess = Session {
            token: raw_token.to_string(),
            user_id: claims.user_id,
            username: claims.username,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        };
        if let Err(e) = self.tokens.save(raw_token) {
            warn!(error = %e, "token persistence failed; session stays in-memory only");
        }
        info!(user = %sess.username, role = ?sess.role, "session established");
        *self.current.write() = Some(sess.clone());
        Ok(sess)
    }

    /// Current session snapshot. Expiry is re-checked on every access; the
    /// first access past `expires_at` tears the session down.
    pub fn current(&self) -> Option<Session> {
        let now = Utc::now().timestamp();
        {
            let guard = self.current.read();
            match guard.as_ref() {
                Some(s) if s.expires_at > now => return Some(s.clone()),
                Some(_) => {}
                None => return None,
            }
        }
        warn!("session expired; transitioning to anonymous");
        self.invalidate();
        None
    }

    pub fn current_role(&self) -> Option<Role> {
        self.current().map(|s| s.role)
    }

    pub fn is_admin(&self) -> bool {
        self.current_role() == Some(Role::Admin)
    }

    /// Authorization predicate over the live session.
    /// Admins may read everything; edit/delete stay owner-only for every role
    /// (the posting UI never offers edit on another user's post); any
    /// authenticated account may create. Anonymous is authorized for nothing.
    pub fn is_authorized(&self, action: Action, resource_owner_id: i64) -> bool {
        let Some(sess) = self.current() else { return false };
        match action {
            Action::Create => true,
            Action::Read => sess.role == Role::Admin || resource_owner_id == sess.user_id,
            Action::Edit | Action::Delete => resource_owner_id == sess.user_id,
        }
    }

    /// Logout: clear in-memory session and the persisted token. Idempotent.
    pub fn invalidate(&self) {
        let had = self.current.write().take().is_some();
        self.tokens.clear();
        if had {
            info!("session invalidated");
        }
    }
}
