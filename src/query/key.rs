use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Canonical query names. Every cached result set in the posting screen is one
/// of these; invalidation rules are expressed over names, never over params.
pub mod names {
    pub const MY_POSTS: &str = "myPosts";
    pub const ALL_POSTS: &str = "allPosts";
    pub const ACCOUNTS_TOTAL: &str = "accountsTotal";
    pub const POSTS_TOTAL: &str = "postsTotal";
}

/// Primitive query parameter. Two fetches with identical (name, params) denote
/// the same logical result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Param {
    Int(i64),
    Str(String),
}

impl Display for Param {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Param::Int(v) => write!(f, "{}", v),
            Param::Str(s) => write!(f, "{}", s),
        }
    }
}

/// Named, parameterized identifier for one cached result set, e.g.
/// `("myPosts", page=2)`. Switching page or tab is a switch to a different
/// key, never a mutation of an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryKey {
    pub name: String,
    pub params: Vec<Param>,
}

impl QueryKey {
    pub fn bare(name: &str) -> Self {
        Self { name: name.to_string(), params: Vec::new() }
    }

    pub fn paged(name: &str, page: u32) -> Self {
        Self { name: name.to_string(), params: vec![Param::Int(page as i64)] }
    }
}

impl Display for QueryKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for p in &self.params {
            write!(f, ":{}", p)?;
        }
        Ok(())
    }
}
