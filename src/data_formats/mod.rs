mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::Deserialize;

use crate::errors::RequestError;

const DEFAULT_PAGE_SIZE: i64 = 10;

// Sort fragments are interpolated into the query text, so they must only
// ever come from this enum, never from raw input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    ArticleId,
    Author,
    Topic,
    Title,
    CreatedAt,
    Votes,
    ArticleImgUrl,
    CommentCount,
}

impl SortColumn {
    pub fn parse(value: &str) -> Result<Self, RequestError> {
        match value.to_lowercase().as_str() {
            "article_id" => Ok(Self::ArticleId),
            "author" => Ok(Self::Author),
            "topic" => Ok(Self::Topic),
            "title" => Ok(Self::Title),
            "created_at" => Ok(Self::CreatedAt),
            "votes" => Ok(Self::Votes),
            "article_img_url" => Ok(Self::ArticleImgUrl),
            "comment_count" => Ok(Self::CommentCount),
            _ => Err(RequestError::BadRequest("Invalid sort_by query")),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::ArticleId => "articles.article_id",
            Self::Author => "articles.author",
            Self::Topic => "articles.topic",
            Self::Title => "articles.title",
            Self::CreatedAt => "articles.created_at",
            Self::Votes => "articles.votes",
            Self::ArticleImgUrl => "articles.article_img_url",
            // Refers to the aggregate alias, not a table column.
            Self::CommentCount => "comment_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(value: &str) -> Result<Self, RequestError> {
        match value.to_lowercase().as_str() {
            "asc" => Ok(Self::Ascending),
            "desc" => Ok(Self::Descending),
            _ => Err(RequestError::BadRequest("Invalid order query")),
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Pagination {
    // Pages at or below zero behave as page 1.
    pub fn from_params(
        limit: Option<String>,
        p: Option<String>,
    ) -> Result<Self, RequestError> {
        let limit = match limit {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|limit| *limit > 0)
                .ok_or(RequestError::BadRequest("Invalid limit query"))?,
            None => DEFAULT_PAGE_SIZE,
        };
        let page = match p {
            Some(raw) => raw
                .parse::<i64>()
                .map_err(|_| RequestError::BadRequest("Invalid p query"))?
                .max(1),
            None => 1,
        };
        // page is at least 1 here, so only the multiplication can overflow.
        let offset = (page - 1)
            .checked_mul(limit)
            .ok_or(RequestError::BadRequest("Invalid p query"))?;
        Ok(Pagination { limit, offset })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ArticleQueryParams {
    pub topic: Option<String>,
    pub author: Option<String>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
    pub limit: Option<String>,
    pub p: Option<String>,
}

#[derive(Debug)]
pub struct ArticleListQuery {
    pub topic: Option<String>,
    pub author: Option<String>,
    pub sort_by: SortColumn,
    pub order: SortOrder,
    pub page: Pagination,
}

impl ArticleQueryParams {
    pub fn validate(self) -> Result<ArticleListQuery, RequestError> {
        let sort_by = match &self.sort_by {
            Some(raw) => SortColumn::parse(raw)?,
            None => SortColumn::CreatedAt,
        };
        let order = match &self.order {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::Descending,
        };
        Ok(ArticleListQuery {
            topic: self.topic,
            author: self.author,
            sort_by,
            order,
            page: Pagination::from_params(self.limit, self.p)?,
        })
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct CommentQueryParams {
    pub order: Option<String>,
    pub limit: Option<String>,
    pub p: Option<String>,
}

impl CommentQueryParams {
    pub fn validate(self) -> Result<(SortOrder, Pagination), RequestError> {
        let order = match &self.order {
            Some(raw) => SortOrder::parse(raw)?,
            None => SortOrder::Descending,
        };
        Ok((order, Pagination::from_params(self.limit, self.p)?))
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct ArticleDetailParams {
    pub topic: Option<String>,
    pub current_user: Option<String>,
}
