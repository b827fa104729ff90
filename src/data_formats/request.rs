use serde::{Deserialize, Serialize};

// ----------------- Article Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateArticleRequest {
    pub title: String,
    pub topic: String,
    pub author: String,
    pub body: String,
    #[serde(default)]
    pub article_img_url: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default)]
#[serde(default)]
pub struct UpdateArticleRequest {
    pub inc_votes: Option<i64>,
    pub article_img_url: Option<String>,
}

// ----------------- Comment Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateCommentRequest {
    pub username: String,
    pub body: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct UpdateCommentRequest {
    pub inc_votes: i64,
}

// ----------------- Topic / User Requests -----------------
#[derive(Deserialize, Serialize, Debug)]
pub struct CreateTopicRequest {
    pub slug: String,
    pub description: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

// ----------------- Vote Request -----------------
// Exactly one of `article_id`/`comment_id` selects the target.
#[derive(Deserialize, Serialize, Debug)]
pub struct VoteRequest {
    #[serde(default)]
    pub article_id: Option<i64>,
    #[serde(default)]
    pub comment_id: Option<i64>,
    pub vote_value: i64,
}
