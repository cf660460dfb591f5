//! Session state derived from the bearer token: decode, expiry gate, role
//! extraction and authorization predicates.
//! Keep the public surface thin and split implementation across sub-modules.

mod claims;
mod session;
mod token_store;

pub use claims::{decode_claims, Role, TokenClaims};
pub use session::{Action, Session, SessionStore};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_FILE_NAME};
