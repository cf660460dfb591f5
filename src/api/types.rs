use serde::{Deserialize, Serialize};

use crate::identity::Role;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub token: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterData {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisterResponse {
    pub message: String,
    pub token: String,
    pub account: RegisteredAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegisteredAccount {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreatePostData {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostsResponse {
    pub data: Vec<Post>,
    pub page: u32,
    pub limit: u32,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
    #[serde(rename = "totalPosts")]
    pub total_posts: u64,
}

/// The accounts endpoint answers with one of several shapes depending on
/// server version. All variants are absorbed here and normalized by
/// `total_accounts` so nothing downstream needs optional-chaining fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AccountsResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<AccountSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<AccountSummary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, rename = "totalAccounts", skip_serializing_if = "Option::is_none")]
    pub total_accounts: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountSummary {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl AccountsResponse {
    /// Canonical scalar for the stats card. Preference order mirrors the
    /// server's shape history: explicit totals first, then collection lengths.
    pub fn total_count(&self) -> u64 {
        self.total_accounts
            .or(self.total)
            .or_else(|| self.data.as_ref().map(|v| v.len() as u64))
            .or_else(|| self.accounts.as_ref().map(|v| v.len() as u64))
            .unwrap_or(0)
    }
}
