use tracing::{info, warn};
use crate::client::{ApiClient, Transport};
use crate::core::cookies::CookieSource;
use crate::core::errors::ClientError;
use crate::core::helpers::count_label;
use crate::models::models::{Post, PostId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeState {
    Liked,
    Unliked,
}

impl LikeState {
    /// Liked iff the viewer is among the post's likers.
    pub fn initial(likes: &[UserId], actor_id: UserId) -> Self {
        Self::from_flag(likes.contains(&actor_id))
    }

    pub fn from_flag(liked: bool) -> Self {
        if liked {
            LikeState::Liked
        } else {
            LikeState::Unliked
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LikeState::Liked => LikeState::Unliked,
            LikeState::Unliked => LikeState::Liked,
        }
    }

    pub fn is_liked(self) -> bool {
        self == LikeState::Liked
    }

    pub fn icon_class(self) -> &'static str {
        match self {
            LikeState::Liked => "fas fa-heart red-heart",
            LikeState::Unliked => "far fa-heart",
        }
    }

    /// Like counter after entering this state from the opposite one.
    pub fn count_after(self, count: u64) -> u64 {
        match self {
            LikeState::Liked => count.saturating_add(1),
            LikeState::Unliked => count.saturating_sub(1),
        }
    }
}

/// What the heart control shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikeControl {
    pub icon_class: &'static str,
    pub label: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, Copy)]
struct PendingLike {
    previous: LikeState,
    previous_count: u64,
}

/// Like button for one post.
///
/// A click flips the state and counter immediately and disables the control.
/// The server's answer either commits the change or restores the pre-click
/// values; nothing survives a failed request.
#[derive(Debug, Clone)]
pub struct LikeToggle {
    post_id: PostId,
    actor_id: UserId,
    state: LikeState,
    count: u64,
    pending: Option<PendingLike>,
}

impl LikeToggle {
    pub fn new(post_id: PostId, actor_id: UserId, state: LikeState, count: u64) -> Self {
        Self {
            post_id,
            actor_id,
            state,
            count,
            pending: None,
        }
    }

    pub fn for_post(post: &Post, actor_id: UserId) -> Self {
        Self::new(
            post.id,
            actor_id,
            LikeState::initial(&post.likes, actor_id),
            post.likes.len() as u64,
        )
    }

    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    pub fn actor_id(&self) -> UserId {
        self.actor_id
    }

    pub fn state(&self) -> LikeState {
        self.state
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn is_disabled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn label(&self) -> String {
        count_label(self.count, "like", "likes")
    }

    pub fn control(&self) -> LikeControl {
        LikeControl {
            icon_class: self.state.icon_class(),
            label: self.label(),
            disabled: self.is_disabled(),
        }
    }

    /// Start a click: returns the state being requested from the server.
    pub fn begin(&mut self) -> Result<LikeState, ClientError> {
        if self.pending.is_some() {
            return Err(ClientError::Busy);
        }
        self.pending = Some(PendingLike {
            previous: self.state,
            previous_count: self.count,
        });
        self.state = self.state.toggled();
        self.count = self.state.count_after(self.count);
        Ok(self.state)
    }

    /// Finish the click started by [`begin`](Self::begin) with the server's outcome.
    pub fn settle(&mut self, outcome: Result<(), ClientError>) -> Result<LikeState, ClientError> {
        let pending = self.pending.take().ok_or_else(|| {
            ClientError::InvalidTransition("no like request in flight".to_string())
        })?;
        match outcome {
            Ok(()) => {
                info!(post_id = self.post_id, state = ?self.state, count = self.count, "like committed");
                Ok(self.state)
            }
            Err(err) => {
                warn!(post_id = self.post_id, error = %err, "like failed, reverting");
                self.state = pending.previous;
                self.count = pending.previous_count;
                Err(err)
            }
        }
    }

    pub async fn click<T, C>(&mut self, api: &ApiClient<T, C>) -> Result<LikeState, ClientError>
    where
        T: Transport,
        C: CookieSource,
    {
        let outcome = match self.begin()? {
            LikeState::Liked => api.create_like(self.post_id, self.actor_id).await,
            LikeState::Unliked => api.delete_like(self.post_id, self.actor_id).await,
        };
        self.settle(outcome)
    }
}
