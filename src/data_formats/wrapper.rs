use serde::Serialize;

use crate::models::{Topic, User};

use super::response::{ArticleResponse, CommentResponse, VoteResponse};

#[derive(Debug, Serialize)]
pub struct ArticleWrapper {
    pub article: ArticleResponse,
}

#[derive(Debug, Serialize)]
pub struct MultipleArticlesWrapper {
    pub articles: Vec<ArticleResponse>,
}

#[derive(Debug, Serialize)]
pub struct PostedArticleWrapper {
    #[serde(rename = "postedArticle")]
    pub posted_article: ArticleResponse,
}

#[derive(Debug, Serialize)]
pub struct UpdatedArticleWrapper {
    #[serde(rename = "updatedArticle")]
    pub updated_article: ArticleResponse,
}

#[derive(Debug, Serialize)]
pub struct MultipleCommentsWrapper {
    pub comments: Vec<CommentResponse>,
}

#[derive(Debug, Serialize)]
pub struct PostedCommentWrapper {
    #[serde(rename = "postedComment")]
    pub posted_comment: CommentResponse,
}

#[derive(Debug, Serialize)]
pub struct UpdatedCommentWrapper {
    #[serde(rename = "updatedComment")]
    pub updated_comment: CommentResponse,
}

#[derive(Debug, Serialize)]
pub struct MultipleTopicsWrapper {
    pub topics: Vec<Topic>,
}

#[derive(Debug, Serialize)]
pub struct PostedTopicWrapper {
    #[serde(rename = "postedTopic")]
    pub posted_topic: Topic,
}

#[derive(Debug, Serialize)]
pub struct UserWrapper {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct MultipleUsersWrapper {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct PostedUserWrapper {
    #[serde(rename = "postedUser")]
    pub posted_user: User,
}

#[derive(Debug, Serialize)]
pub struct UpdatedUserWrapper {
    #[serde(rename = "updatedUser")]
    pub updated_user: VoteResponse,
}
