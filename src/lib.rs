//! Client rendering layer for the gramm photo feed.
//!
//! Infinite-scroll pagination over `/app/posts`, post cards and profile grid
//! tiles, and the like/follow toggles that talk to the gramm REST API.

pub mod client;
pub mod config;
pub mod follow;
pub mod likes;
pub mod pagination;
pub mod templates;
pub mod views;

pub mod core {
    pub mod cookies;
    pub mod errors;
    pub mod helpers;
    pub mod query_params;
}

pub mod models {
    pub mod models;
}

pub use client::{ApiClient, ApiRequest, ApiResponse, HttpTransport, Transport};
pub use config::{ClientConfig, PagingConfig};
pub use crate::core::cookies::{read_cookie, CookieReader, CookieSource};
pub use crate::core::errors::ClientError;
pub use follow::{FollowState, FollowStep, FollowToggle};
pub use likes::{LikeState, LikeToggle};
pub use pagination::{PaginationController, PaginationCursor, ViewportMetrics};
pub use templates::{FeedRenderer, HtmlContainer, Layout, RenderTarget, RenderedNode};
pub use views::{FeedView, PageAborter, PageOutcome, PostDetailView, ProfileView};
