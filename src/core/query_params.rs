use crate::models::models::UserId;

/// Revisions of the posts listing contract.
///
/// Earlier page scripts sent the page size as `amount`; the server reads `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostsApiVersion {
    #[default]
    V1,
}

impl PostsApiVersion {
    pub fn page_size_param(&self) -> &'static str {
        match self {
            PostsApiVersion::V1 => "offset",
        }
    }
}

/// Query for one page of `GET /app/posts`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostsQuery {
    pub start: usize,
    pub page_size: usize,
    pub user_id: Option<UserId>,
    pub version: PostsApiVersion,
}

impl PostsQuery {
    pub fn new(start: usize, page_size: usize, user_id: Option<UserId>) -> Self {
        Self {
            start,
            page_size,
            user_id,
            version: PostsApiVersion::V1,
        }
    }

    pub fn to_query_string(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if let Some(user_id) = self.user_id {
            parts.push(format!("user_id={}", user_id));
        }
        parts.push(format!("{}={}", self.version.page_size_param(), self.page_size));
        parts.push(format!("start={}", self.start));
        parts.join("&")
    }

    pub fn path(&self) -> String {
        format!("/app/posts?{}", self.to_query_string())
    }
}
