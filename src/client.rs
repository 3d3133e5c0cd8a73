//! Typed access to the gramm REST endpoints.
//!
//! Requests are plain values handed to a [`Transport`]; [`HttpTransport`] sends
//! them with `reqwest`, tests substitute an in-memory implementation.

use async_trait::async_trait;
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use crate::config::{ClientConfig, CSRF_COOKIE_NAME, CSRF_HEADER};
use crate::core::cookies::{CookieReader, CookieSource};
use crate::core::errors::ClientError;
use crate::core::query_params::PostsQuery;
use crate::models::models::{FollowBody, LikeBody, Post, PostId, UserFullname, UserId};

#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path and query, relative to the site origin.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_json<B: Serialize>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait Transport {
    /// Send a request. Only failures to obtain a response are errors; every
    /// status code is returned as an [`ApiResponse`].
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(config.timeout);
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        Ok(ApiResponse::new(status, body))
    }
}

/// Endpoint wrapper that attaches the CSRF token to mutating requests.
pub struct ApiClient<T, C> {
    transport: T,
    cookies: CookieReader<C>,
    csrf_cookie: String,
}

impl<T: Transport, C: CookieSource> ApiClient<T, C> {
    pub fn new(transport: T, cookies: C) -> Self {
        Self {
            transport,
            cookies: CookieReader::new(cookies),
            csrf_cookie: CSRF_COOKIE_NAME.to_string(),
        }
    }

    pub fn with_csrf_cookie(mut self, name: impl Into<String>) -> Self {
        self.csrf_cookie = name.into();
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// `GET /app/posts?...`
    pub async fn fetch_posts(&self, query: &PostsQuery) -> Result<Vec<Post>, ClientError> {
        let response = self
            .execute(ApiRequest::new(Method::GET, query.path()))
            .await?;
        response.json()
    }

    /// `GET /app/user/{id}/fullname`
    pub async fn fetch_fullname(&self, user_id: UserId) -> Result<UserFullname, ClientError> {
        let path = format!("/app/user/{}/fullname", user_id);
        let response = self.execute(ApiRequest::new(Method::GET, path)).await?;
        response.json()
    }

    /// `POST /app/likes/{post_id}` with `{user_id}`
    pub async fn create_like(&self, post_id: PostId, user_id: UserId) -> Result<(), ClientError> {
        let request = self
            .mutating(Method::POST, format!("/app/likes/{}", post_id))?
            .with_json(&LikeBody { user_id })?;
        self.execute(request).await.map(|_| ())
    }

    /// `DELETE /app/likes/{post_id}/{user_id}`
    pub async fn delete_like(&self, post_id: PostId, user_id: UserId) -> Result<(), ClientError> {
        let request = self.mutating(Method::DELETE, format!("/app/likes/{}/{}", post_id, user_id))?;
        self.execute(request).await.map(|_| ())
    }

    /// `POST /app/subscriptions/{follower_id}` with `{followee_id}`
    pub async fn create_subscription(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> Result<(), ClientError> {
        let request = self
            .mutating(Method::POST, format!("/app/subscriptions/{}", follower_id))?
            .with_json(&FollowBody { followee_id })?;
        self.execute(request).await.map(|_| ())
    }

    /// `DELETE /app/subscriptions/{follower_id}/{followee_id}`
    pub async fn delete_subscription(
        &self,
        follower_id: UserId,
        followee_id: UserId,
    ) -> Result<(), ClientError> {
        let request = self.mutating(
            Method::DELETE,
            format!("/app/subscriptions/{}/{}", follower_id, followee_id),
        )?;
        self.execute(request).await.map(|_| ())
    }

    fn mutating(&self, method: Method, path: String) -> Result<ApiRequest, ClientError> {
        let token = self
            .cookies
            .read(&self.csrf_cookie)
            .ok_or_else(|| ClientError::MissingCsrfToken(self.csrf_cookie.clone()))?;
        Ok(ApiRequest::new(method, path)
            .with_header(CSRF_HEADER, token)
            .with_header("Content-Type", "application/json"))
    }

    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let method = request.method.clone();
        let path = request.path.clone();
        debug!(%method, %path, "sending request");

        let response = self.transport.send(request).await.map_err(|err| {
            warn!(%method, %path, error = %err, "request failed");
            err
        })?;

        if !response.status.is_success() {
            warn!(%method, %path, status = response.status.as_u16(), "unexpected status");
            return Err(ClientError::Status(response.status.as_u16()));
        }
        Ok(response)
    }
}
