use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
    RequestPartsExt,
};
use serde::{Deserialize, Serialize};

use super::error::Error;

const MAX_LIMIT: u32 = 100;

#[derive(Serialize, Debug)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginatedMeta,
}

#[derive(Serialize, Clone, Debug)]
pub struct PaginatedMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u32, pagination: &Pagination) -> Paginated<T> {
        Self {
            items,
            pagination: PaginatedMeta {
                page: pagination.page(),
                limit: pagination.limit(),
                total,
            },
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct Pagination {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page() - 1) * i64::from(self.limit())
    }
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Pagination {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extract::<Query<Pagination>>()
            .await
            .map(|Query(pagination)| pagination)
            .map_err(|_| Error::Validation(String::from("Invalid pagination options")))
    }
}
