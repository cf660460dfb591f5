use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Url};
use tracing::debug;

use crate::error::{ClientError, ClientResult};
use crate::identity::SessionStore;

use super::types::{
    AccountsResponse, CreatePostData, LoginCredentials, LoginResponse, Post, PostsResponse,
    RegisterData, RegisterResponse,
};

/// Seam over the blog server's REST surface. The production impl is
/// `ApiClient`; tests substitute recording fakes.
#[async_trait]
pub trait BlogApi: Send + Sync {
    async fn login(&self, creds: &LoginCredentials) -> ClientResult<LoginResponse>;
    async fn register(&self, data: &RegisterData) -> ClientResult<RegisterResponse>;
    async fn accounts(&self) -> ClientResult<AccountsResponse>;
    async fn all_posts(&self, page: u32, limit: u32) -> ClientResult<PostsResponse>;
    async fn my_posts(&self, page: u32, limit: u32) -> ClientResult<PostsResponse>;
    async fn create_post(&self, data: &CreatePostData) -> ClientResult<Post>;
    async fn edit_post(&self, post_id: i64, data: &CreatePostData) -> ClientResult<Post>;
    async fn delete_post(&self, post_id: i64) -> ClientResult<()>;
    async fn view_post(&self, post_id: i64) -> ClientResult<Post>;
}

/// JSON-over-HTTPS client with bearer-token injection from the live session.
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    sessions: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(base: &str, sessions: Arc<SessionStore>) -> Result<Self> {
        let base_url = Url::parse(base).context("invalid base URL")?;
        let client = reqwest::Client::builder().build()?;
        Ok(Self { base: base_url, client, sessions })
    }

    fn url(&self, path: &str) -> ClientResult<Url> {
        self.base
            .join(path)
            .map_err(|e| ClientError::internal("bad_url", e.to_string().as_str()))
    }

    /// Attach the bearer header when a session is live, send, and map
    /// non-success statuses onto the client taxonomy.
    async fn execute(&self, rb: RequestBuilder) -> ClientResult<reqwest::Response> {
        let rb = match self.sessions.current() {
            Some(sess) => rb.bearer_auth(sess.token),
            None => rb,
        };
        let resp = rb.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %body, "request rejected");
        match status.as_u16() {
            // Server no longer accepts the token; drop it locally too so the
            // next start does not re-adopt a revoked token.
            401 => {
                self.sessions.invalidate();
                Err(ClientError::auth_expired("http_401", "token rejected by server"))
            }
            403 => Err(ClientError::unauthorized("http_403", "action forbidden by server")),
            code => {
                let msg = if body.is_empty() { status.to_string() } else { body };
                Err(ClientError::network(format!("http_{}", code), msg))
            }
        }
    }
}

#[async_trait]
impl BlogApi for ApiClient {
    async fn login(&self, creds: &LoginCredentials) -> ClientResult<LoginResponse> {
        let url = self.url("/api/account/login")?;
        let resp = self.execute(self.client.post(url).json(creds)).await?;
        Ok(resp.json().await?)
    }

    async fn register(&self, data: &RegisterData) -> ClientResult<RegisterResponse> {
        let url = self.url("/api/account/register")?;
        let resp = self.execute(self.client.post(url).json(data)).await?;
        Ok(resp.json().await?)
    }

    async fn accounts(&self) -> ClientResult<AccountsResponse> {
        let url = self.url("/api/accounts")?;
        let resp = self.execute(self.client.get(url)).await?;
        Ok(resp.json().await?)
    }

    async fn all_posts(&self, page: u32, limit: u32) -> ClientResult<PostsResponse> {
        let url = self.url("/api/posts")?;
        let resp = self
            .execute(self.client.get(url).query(&[("page", page), ("limit", limit)]))
            .await?;
        Ok(resp.json().await?)
    }

    async fn my_posts(&self, page: u32, limit: u32) -> ClientResult<PostsResponse> {
        let url = self.url("/api/posts/mypost")?;
        let resp = self
            .execute(
                self.client
                    .post(url)
                    .json(&serde_json::json!({"page": page, "limit": limit})),
            )
            .await?;
        Ok(resp.json().await?)
    }

    async fn create_post(&self, data: &CreatePostData) -> ClientResult<Post> {
        let url = self.url("/api/posts/create")?;
        let resp = self.execute(self.client.post(url).json(data)).await?;
        Ok(resp.json().await?)
    }

    async fn edit_post(&self, post_id: i64, data: &CreatePostData) -> ClientResult<Post> {
        let url = self.url(&format!("/api/posts/edit/{}", post_id))?;
        let resp = self.execute(self.client.put(url).json(data)).await?;
        Ok(resp.json().await?)
    }

    async fn delete_post(&self, post_id: i64) -> ClientResult<()> {
        let url = self.url(&format!("/api/posts/delete/{}", post_id))?;
        // no content on success
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn view_post(&self, post_id: i64) -> ClientResult<Post> {
        let url = self.url(&format!("/api/posts/view/{}", post_id))?;
        let resp = self.execute(self.client.get(url)).await?;
        Ok(resp.json().await?)
    }
}
