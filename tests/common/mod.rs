#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use gramm::core::query_params::{PostsApiVersion, PostsQuery};
use gramm::{ApiClient, ApiRequest, ApiResponse, ClientError, Transport};
use http::{Method, StatusCode};
use serde_json::{json, Value};

pub const COOKIES: &str = "sessionid=abc; csrftoken=tok%3D1; theme=dark";

pub enum Scripted {
    Status(u16),
    Network,
}

/// In-memory stand-in for the gramm server.
#[derive(Default)]
pub struct FakeTransport {
    posts: Mutex<Vec<Value>>,
    requests: Mutex<Vec<ApiRequest>>,
    script: Mutex<VecDeque<Scripted>>,
    raw: Mutex<HashMap<String, (u16, String)>>,
    stall: AtomicBool,
}

impl FakeTransport {
    pub fn with_posts(posts: Vec<Value>) -> Self {
        let transport = Self::default();
        *transport.posts.lock().unwrap() = posts;
        transport
    }

    pub fn prepend_post(&self, post: Value) {
        self.posts.lock().unwrap().insert(0, post);
    }

    pub fn fail_next(&self, scripted: Scripted) {
        self.script.lock().unwrap().push_back(scripted);
    }

    pub fn respond_raw(&self, path: &str, status: u16, body: &str) {
        self.raw
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.to_string()));
    }

    pub fn set_stall(&self, stall: bool) {
        self.stall.store(stall, Ordering::SeqCst);
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }

    pub fn last(&self) -> ApiRequest {
        self.requests().pop().expect("no request recorded")
    }

    fn respond(&self, request: &ApiRequest) -> ApiResponse {
        if let Some((status, body)) = self.raw.lock().unwrap().get(&request.path) {
            return ApiResponse::new(
                StatusCode::from_u16(*status).unwrap(),
                body.clone().into_bytes(),
            );
        }

        if request.method == Method::GET && request.path.starts_with("/app/posts") {
            let query = parse_posts_query(&request.path).expect("valid posts query");
            let posts = self.posts.lock().unwrap();
            let page: Vec<Value> = posts
                .iter()
                .filter(|p| query.user_id.map_or(true, |uid| p["user"] == json!(uid)))
                .skip(query.start)
                .take(query.page_size)
                .cloned()
                .collect();
            return ApiResponse::new(StatusCode::OK, serde_json::to_vec(&page).unwrap());
        }

        if request.method == Method::GET && request.path.ends_with("/fullname") {
            let body = json!({"first_name": "Ann", "last_name": "Lee", "avatar": null});
            return ApiResponse::new(StatusCode::OK, serde_json::to_vec(&body).unwrap());
        }

        match request.method {
            Method::POST => ApiResponse::new(StatusCode::CREATED, b"{}".to_vec()),
            Method::DELETE => ApiResponse::new(StatusCode::NO_CONTENT, Vec::new()),
            _ => ApiResponse::new(StatusCode::NOT_FOUND, Vec::new()),
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());

        while self.stall.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(Scripted::Status(code)) => Ok(ApiResponse::new(
                StatusCode::from_u16(code).unwrap(),
                Vec::new(),
            )),
            Some(Scripted::Network) => Err(ClientError::Network("connection reset".to_string())),
            None => Ok(self.respond(&request)),
        }
    }
}

pub fn api(transport: FakeTransport) -> ApiClient<FakeTransport, String> {
    ApiClient::new(transport, COOKIES.to_string())
}

pub fn post_json(id: u64, user: u64, likes: &[u64]) -> Value {
    json!({
        "id": id,
        "user": user,
        "user_avatar": if id % 2 == 0 { json!(format!("/media/avatars/{}.jpg", user)) } else { Value::Null },
        "first_name": "User",
        "last_name": format!("{}", user),
        "image": format!("/media/posts/{}.jpg", id),
        "caption": format!("caption {}", id),
        "pub_date": "2 HOURS AGO",
        "likes": likes,
    })
}

/// `count` posts with ids `1..=count`, alternating between users 1 and 2.
pub fn posts(count: u64) -> Vec<Value> {
    (1..=count).map(|id| post_json(id, 1 + id % 2, &[])).collect()
}

pub fn body_json(request: &ApiRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().expect("request has a body")).unwrap()
}

/// Read a posts query back out of a request path, as the server would.
pub fn parse_posts_query(path: &str) -> Option<PostsQuery> {
    let (_, query) = path.split_once('?')?;
    let params: HashMap<&str, String> = query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key, urlencoding::decode(value).map(|v| v.into_owned()).unwrap_or_default()))
        .collect();
    let int = |key: &str| params.get(key).and_then(|v| v.parse::<usize>().ok());

    let version = PostsApiVersion::V1;
    Some(PostsQuery {
        start: int("start").unwrap_or(0),
        page_size: int(version.page_size_param())?,
        user_id: params.get("user_id").and_then(|v| v.parse().ok()),
        version,
    })
}
