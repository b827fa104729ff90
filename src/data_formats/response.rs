use chrono::SecondsFormat;
use serde::Serialize;

use crate::db_helpers::VoteTarget;
use crate::models::{Article, Comment};

// How the caller's own vote is reported on an article: `false` when no vote
// row exists, otherwise the stored signed value.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum CurrentUserVoted {
    NotVoted(bool),
    Voted(i64),
}

impl From<Option<i64>> for CurrentUserVoted {
    fn from(vote: Option<i64>) -> Self {
        match vote {
            Some(value) => Self::Voted(value),
            None => Self::NotVoted(false),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ArticleResponse {
    pub article_id: i64,
    pub author: String,
    pub title: String,
    pub topic: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub created_at: String,
    pub votes: i64,
    pub article_img_url: String,
    pub comment_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_user_voted: Option<CurrentUserVoted>,
}

impl ArticleResponse {
    pub fn new(
        Article {
            article_id,
            author,
            title,
            topic,
            body,
            created_at,
            votes,
            article_img_url,
            comment_count,
            total_count,
        }: Article,
    ) -> Self {
        ArticleResponse {
            article_id,
            author,
            title,
            topic,
            body,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            votes,
            article_img_url,
            comment_count,
            total_count,
            current_user_voted: None,
        }
    }

    pub fn with_vote(mut self, vote: Option<i64>) -> Self {
        self.current_user_voted = Some(CurrentUserVoted::from(vote));
        self
    }
}

#[derive(Serialize, Debug)]
pub struct CommentResponse {
    pub comment_id: i64,
    pub body: String,
    pub author: String,
    pub article_id: i64,
    pub created_at: String,
    pub votes: i64,
}

impl CommentResponse {
    pub fn new(
        Comment {
            comment_id,
            body,
            author,
            article_id,
            created_at,
            votes,
        }: Comment,
    ) -> Self {
        CommentResponse {
            comment_id,
            body,
            author,
            article_id,
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            votes,
        }
    }
}

// Outcome of a vote toggle: `vote_value` is the value now in effect, 0 when
// the toggle retracted an existing vote.
#[derive(Serialize, Debug)]
pub struct VoteResponse {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<i64>,
    pub vote_value: i64,
}

impl VoteResponse {
    pub fn new(username: String, target: VoteTarget, vote_value: i64) -> Self {
        let (article_id, comment_id) = match target {
            VoteTarget::Article(id) => (Some(id), None),
            VoteTarget::Comment(id) => (None, Some(id)),
        };
        VoteResponse {
            username,
            article_id,
            comment_id,
            vote_value,
        }
    }
}
