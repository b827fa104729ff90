mod article_helpers;
mod comment_helpers;
mod topic_helpers;
mod user_helpers;
mod vote_helpers;

pub use article_helpers::*;
pub use comment_helpers::*;
pub use topic_helpers::*;
pub use user_helpers::*;
pub use vote_helpers::*;

// Assembles optional predicate/assignment clauses with positional `$n`
// parameters. Clause text is always server-defined; only the bound values
// come from the request.
pub(crate) struct QueryBuilder {
    query: String,
    params: Vec<String>,
    separator: &'static str,
}

impl QueryBuilder {
    pub(crate) fn new(initial: &'static str, separator: &'static str) -> Self {
        Self {
            query: String::from(initial),
            params: Vec::new(),
            separator,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub(crate) fn add_param(mut self, clause: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            if !self.params.is_empty() {
                self.query.push_str(self.separator);
            }
            self.query.push_str(clause);
            self.query.push_str(&format!(" ${}", self.params.len() + 1));
            self.params.push(value);
        }
        self
    }

    pub(crate) fn next_placeholder(&self) -> usize {
        self.params.len() + 1
    }

    // With no clauses added the fragment is empty rather than a dangling
    // keyword.
    pub(crate) fn build(self) -> (String, Vec<String>) {
        if self.params.is_empty() {
            (String::new(), self.params)
        } else {
            (self.query, self.params)
        }
    }
}

pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.message().contains("UNIQUE constraint failed"),
        _ => false,
    }
}

pub(crate) fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    match error {
        sqlx::Error::Database(e) => e.message().contains("FOREIGN KEY constraint failed"),
        _ => false,
    }
}
