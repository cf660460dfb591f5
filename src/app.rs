//! Facade wiring the session store, the query coordinator and the HTTP
//! collaborator into the operations the posting screen performs. Every
//! mutation is authorization-gated before any network call and feeds the
//! invalidation discipline after a successful one.

use std::sync::Arc;

use futures_util::FutureExt;
use tracing::info;

use crate::api::types::{CreatePostData, LoginCredentials, Post, RegisterData};
use crate::api::BlogApi;
use crate::error::{ClientError, ClientResult};
use crate::identity::{Action, Session, SessionStore};
use crate::query::{names, Loader, MutationKind, QueryCoordinator, QueryData, QueryEntry, QueryKey};

pub struct BlogApp {
    api: Arc<dyn BlogApi>,
    sessions: Arc<SessionStore>,
    queries: QueryCoordinator,
    page_size: u32,
}

impl BlogApp {
    pub fn new(api: Arc<dyn BlogApi>, sessions: Arc<SessionStore>, page_size: u32) -> Self {
        Self { api, sessions, queries: QueryCoordinator::new(), page_size }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn queries(&self) -> &QueryCoordinator {
        &self.queries
    }

    // --- account operations ---

    pub async fn login(&self, email: &str, password: &str) -> ClientResult<Session> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(ClientError::validation("credentials_required", "email and password are required"));
        }
        let creds = LoginCredentials { email: email.to_string(), password: password.to_string() };
        let resp = self.api.login(&creds).await?;
        info!(user = %resp.username, "login accepted");
        self.sessions.establish(&resp.token)
    }

    pub async fn register(&self, data: RegisterData) -> ClientResult<Session> {
        if data.username.trim().is_empty() || data.email.trim().is_empty() || data.password.is_empty() {
            return Err(ClientError::validation("fields_required", "username, email and password are required"));
        }
        let resp = self.api.register(&data).await?;
        info!(user = %resp.account.username, "registration accepted");
        self.sessions.establish(&resp.token)
    }

    pub fn logout(&self) {
        self.sessions.invalidate();
    }

    // --- read paths (cached) ---

    /// The caller's own posts, one page. Requires a live session.
    pub async fn my_posts(&self, page: u32) -> ClientResult<QueryEntry> {
        if self.sessions.current().is_none() {
            return Err(ClientError::unauthorized("not_authenticated", "login required"));
        }
        let key = QueryKey::paged(names::MY_POSTS, page);
        self.queries.watch_exclusive(&key);
        let api = self.api.clone();
        let limit = self.page_size;
        let loader: Loader = Arc::new(move || {
            let api = api.clone();
            async move { api.my_posts(page, limit).await.map(QueryData::Page) }.boxed()
        });
        Ok(self.queries.fetch(&key, loader).await)
    }

    /// Every user's posts, one page. Admin view.
    pub async fn all_posts(&self, page: u32) -> ClientResult<QueryEntry> {
        self.require_admin()?;
        let key = QueryKey::paged(names::ALL_POSTS, page);
        self.queries.watch_exclusive(&key);
        let api = self.api.clone();
        let limit = self.page_size;
        let loader: Loader = Arc::new(move || {
            let api = api.clone();
            async move { api.all_posts(page, limit).await.map(QueryData::Page) }.boxed()
        });
        Ok(self.queries.fetch(&key, loader).await)
    }

    /// Account total for the admin stats card, normalized from whichever
    /// response shape the server answers with.
    pub async fn accounts_total(&self) -> ClientResult<QueryEntry> {
        self.require_admin()?;
        let key = QueryKey::bare(names::ACCOUNTS_TOTAL);
        self.queries.watch(&key);
        let api = self.api.clone();
        let loader: Loader = Arc::new(move || {
            let api = api.clone();
            async move { api.accounts().await.map(|a| QueryData::Total(a.total_count())) }.boxed()
        });
        Ok(self.queries.fetch(&key, loader).await)
    }

    /// Post total for the admin stats card. The listing response already
    /// carries the total, so a single-row page is enough.
    pub async fn posts_total(&self) -> ClientResult<QueryEntry> {
        self.require_admin()?;
        let key = QueryKey::bare(names::POSTS_TOTAL);
        self.queries.watch(&key);
        let api = self.api.clone();
        let loader: Loader = Arc::new(move || {
            let api = api.clone();
            async move { api.all_posts(1, 1).await.map(|p| QueryData::Total(p.total_posts)) }.boxed()
        });
        Ok(self.queries.fetch(&key, loader).await)
    }

    /// Single-post read, uncached; the view page owns its own lifetime.
    pub async fn view_post(&self, post_id: i64) -> ClientResult<Post> {
        self.api.view_post(post_id).await
    }

    pub fn page_entry(&self, name: &str, page: u32) -> Option<QueryEntry> {
        self.queries.entry(&QueryKey::paged(name, page))
    }

    // --- mutations ---

    pub async fn create_post(&self, data: CreatePostData) -> ClientResult<Post> {
        let Some(sess) = self.sessions.current() else {
            return Err(ClientError::unauthorized("not_authenticated", "login required"));
        };
        validate_post(&data)?;
        let post = self.api.create_post(&data).await?;
        self.queries.on_mutation_success(MutationKind::Create, sess.user_id).await;
        Ok(post)
    }

    /// Edit is ownership-gated; an unauthorized attempt never reaches the
    /// network.
    pub async fn edit_post(&self, post_id: i64, owner_id: i64, data: CreatePostData) -> ClientResult<Post> {
        if !self.sessions.is_authorized(Action::Edit, owner_id) {
            return Err(ClientError::unauthorized("not_owner", "cannot edit another user's post"));
        }
        validate_post(&data)?;
        let post = self.api.edit_post(post_id, &data).await?;
        self.queries.on_mutation_success(MutationKind::Edit, owner_id).await;
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: i64, owner_id: i64) -> ClientResult<()> {
        if !self.sessions.is_authorized(Action::Delete, owner_id) {
            return Err(ClientError::unauthorized("not_owner", "cannot delete another user's post"));
        }
        self.api.delete_post(post_id).await?;
        self.queries.on_mutation_success(MutationKind::Delete, owner_id).await;
        Ok(())
    }

    fn require_admin(&self) -> ClientResult<()> {
        if self.sessions.is_admin() {
            Ok(())
        } else {
            Err(ClientError::unauthorized("admin_only", "admin role required"))
        }
    }
}

/// Form-level constraints; these never reach the query layer.
fn validate_post(data: &CreatePostData) -> ClientResult<()> {
    if data.title.trim().is_empty() {
        return Err(ClientError::validation("title_required", "post title is required"));
    }
    if data.body.trim().is_empty() {
        return Err(ClientError::validation("body_required", "post body is required"));
    }
    Ok(())
}
