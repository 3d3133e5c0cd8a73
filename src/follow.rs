use tracing::{info, warn};
use crate::client::{ApiClient, Transport};
use crate::config::UNFOLLOW_MODAL_TARGET;
use crate::core::cookies::CookieSource;
use crate::core::errors::ClientError;
use crate::core::helpers::noun_for;
use crate::models::models::{ProfilePageContext, UserId};

const BUTTON_LAYOUT: &str = "mb-4 mt-sm-2 mt-lg-3 px-4 px-md-5";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    NotFollowing,
    Following,
}

impl FollowState {
    pub fn from_flag(following: bool) -> Self {
        if following {
            FollowState::Following
        } else {
            FollowState::NotFollowing
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            FollowState::Following => FollowState::NotFollowing,
            FollowState::NotFollowing => FollowState::Following,
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            FollowState::NotFollowing => "Follow",
            FollowState::Following => "Unfollow",
        }
    }

    pub fn button_class(self) -> String {
        let variant = match self {
            FollowState::NotFollowing => "btn-primary",
            FollowState::Following => "btn-danger",
        };
        format!("action-btn btn {} {}", variant, BUTTON_LAYOUT)
    }

    /// Follower counter after entering this state.
    pub fn followers_after(self, followers: u64) -> u64 {
        match self {
            FollowState::Following => followers.saturating_add(1),
            FollowState::NotFollowing => followers.saturating_sub(1),
        }
    }
}

/// Outcome of a user action on the follow button or its modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowStep {
    Followed,
    /// The unfollow modal is open and waiting for confirm or dismiss.
    ConfirmationRequired,
    Unfollowed,
    Dismissed,
}

/// What the follow button and follower counter show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowControl {
    pub label: &'static str,
    pub class: String,
    /// Set while following: the button opens the unfollow modal instead of acting.
    pub modal_target: Option<&'static str>,
    pub modal_open: bool,
    pub disabled: bool,
    pub followers: u64,
    pub followers_label: &'static str,
}

#[derive(Debug, Clone, Copy)]
struct PendingFollow {
    previous: FollowState,
    previous_followers: u64,
}

/// Follow button on another user's profile page.
///
/// Following is one click. Unfollowing takes two steps: the click opens a
/// confirmation modal and only the modal's confirm action sends the request.
#[derive(Debug, Clone)]
pub struct FollowToggle {
    follower_id: UserId,
    followee_id: UserId,
    state: FollowState,
    followers: u64,
    confirming: bool,
    pending: Option<PendingFollow>,
}

impl FollowToggle {
    pub fn new(follower_id: UserId, followee_id: UserId, state: FollowState, followers: u64) -> Self {
        Self {
            follower_id,
            followee_id,
            state,
            followers,
            confirming: false,
            pending: None,
        }
    }

    /// `None` when the page does not offer a follow button (own profile).
    pub fn from_context(ctx: &ProfilePageContext) -> Option<Self> {
        ctx.follow.can_follow.then(|| {
            Self::new(
                ctx.auth_user_id,
                ctx.user_id,
                FollowState::from_flag(ctx.follow.is_following),
                ctx.num_followers,
            )
        })
    }

    pub fn state(&self) -> FollowState {
        self.state
    }

    pub fn followers(&self) -> u64 {
        self.followers
    }

    pub fn is_confirming(&self) -> bool {
        self.confirming
    }

    pub fn is_disabled(&self) -> bool {
        self.pending.is_some()
    }

    pub fn control(&self) -> FollowControl {
        FollowControl {
            label: self.state.button_label(),
            class: self.state.button_class(),
            modal_target: (self.state == FollowState::Following).then_some(UNFOLLOW_MODAL_TARGET),
            modal_open: self.confirming,
            disabled: self.is_disabled(),
            followers: self.followers,
            followers_label: noun_for(self.followers, "Follower", "Followers"),
        }
    }

    /// Open the unfollow modal. Only meaningful while following.
    pub fn request_confirmation(&mut self) -> Result<FollowStep, ClientError> {
        if self.pending.is_some() {
            return Err(ClientError::Busy);
        }
        if self.state != FollowState::Following {
            return Err(ClientError::InvalidTransition(
                "not following, nothing to confirm".to_string(),
            ));
        }
        self.confirming = true;
        Ok(FollowStep::ConfirmationRequired)
    }

    /// Close the unfollow modal without doing anything.
    pub fn dismiss(&mut self) -> FollowStep {
        self.confirming = false;
        FollowStep::Dismissed
    }

    /// Start a follow, or an unfollow that has been confirmed. Returns the requested state.
    pub fn begin(&mut self) -> Result<FollowState, ClientError> {
        if self.pending.is_some() {
            return Err(ClientError::Busy);
        }
        if self.state == FollowState::Following && !self.confirming {
            return Err(ClientError::InvalidTransition(
                "unfollow requires confirmation".to_string(),
            ));
        }
        self.confirming = false;
        self.pending = Some(PendingFollow {
            previous: self.state,
            previous_followers: self.followers,
        });
        self.state = self.state.toggled();
        self.followers = self.state.followers_after(self.followers);
        Ok(self.state)
    }

    pub fn settle(&mut self, outcome: Result<(), ClientError>) -> Result<FollowState, ClientError> {
        let pending = self.pending.take().ok_or_else(|| {
            ClientError::InvalidTransition("no follow request in flight".to_string())
        })?;
        match outcome {
            Ok(()) => {
                info!(followee_id = self.followee_id, state = ?self.state, followers = self.followers, "follow committed");
                Ok(self.state)
            }
            Err(err) => {
                warn!(followee_id = self.followee_id, error = %err, "follow failed, reverting");
                self.state = pending.previous;
                self.followers = pending.previous_followers;
                Err(err)
            }
        }
    }

    /// Click on the follow button.
    pub async fn click<T, C>(&mut self, api: &ApiClient<T, C>) -> Result<FollowStep, ClientError>
    where
        T: Transport,
        C: CookieSource,
    {
        match self.state {
            FollowState::Following => self.request_confirmation(),
            FollowState::NotFollowing => {
                self.begin()?;
                let outcome = api
                    .create_subscription(self.follower_id, self.followee_id)
                    .await;
                self.settle(outcome).map(|_| FollowStep::Followed)
            }
        }
    }

    /// Confirm action of the unfollow modal.
    pub async fn confirm<T, C>(&mut self, api: &ApiClient<T, C>) -> Result<FollowStep, ClientError>
    where
        T: Transport,
        C: CookieSource,
    {
        if !self.confirming {
            return Err(ClientError::InvalidTransition(
                "unfollow was not requested".to_string(),
            ));
        }
        self.begin()?;
        let outcome = api
            .delete_subscription(self.follower_id, self.followee_id)
            .await;
        self.settle(outcome).map(|_| FollowStep::Unfollowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::models::FollowData;

    fn context(can_follow: bool, is_following: bool) -> ProfilePageContext {
        ProfilePageContext {
            user_id: 2,
            post_count: 0,
            auth_user_id: 5,
            follow: FollowData {
                can_follow,
                is_following,
            },
            num_followers: 1,
        }
    }

    #[test]
    fn own_profile_has_no_button() {
        assert!(FollowToggle::from_context(&context(false, false)).is_none());
    }

    #[test]
    fn initial_state_comes_from_page() {
        let toggle = FollowToggle::from_context(&context(true, true)).unwrap();
        assert_eq!(toggle.state(), FollowState::Following);
        let control = toggle.control();
        assert_eq!(control.label, "Unfollow");
        assert_eq!(control.modal_target, Some("#unfollowModal"));
        assert!(control.class.contains("btn-danger"));
        assert_eq!(control.followers_label, "Follower");
    }

    #[test]
    fn follow_begin_counts_and_arms_modal() {
        let mut toggle = FollowToggle::new(5, 2, FollowState::NotFollowing, 1);
        assert_eq!(toggle.begin(), Ok(FollowState::Following));
        assert_eq!(toggle.settle(Ok(())), Ok(FollowState::Following));
        let control = toggle.control();
        assert_eq!(control.label, "Unfollow");
        assert_eq!(control.followers, 2);
        assert_eq!(control.followers_label, "Followers");
        assert_eq!(control.modal_target, Some("#unfollowModal"));
    }

    #[test]
    fn unfollow_needs_confirmation() {
        let mut toggle = FollowToggle::new(5, 2, FollowState::Following, 3);
        assert!(matches!(toggle.begin(), Err(ClientError::InvalidTransition(_))));
        assert_eq!(toggle.request_confirmation(), Ok(FollowStep::ConfirmationRequired));
        assert!(toggle.control().modal_open);
        assert_eq!(toggle.begin(), Ok(FollowState::NotFollowing));
        assert!(!toggle.is_confirming());
        assert_eq!(toggle.followers(), 2);
    }

    #[test]
    fn dismiss_keeps_following() {
        let mut toggle = FollowToggle::new(5, 2, FollowState::Following, 3);
        toggle.request_confirmation().unwrap();
        assert_eq!(toggle.dismiss(), FollowStep::Dismissed);
        assert_eq!(toggle.state(), FollowState::Following);
        assert!(!toggle.is_confirming());
    }

    #[test]
    fn failed_follow_reverts() {
        let mut toggle = FollowToggle::new(5, 2, FollowState::NotFollowing, 0);
        toggle.begin().unwrap();
        assert!(toggle.is_disabled());
        assert_eq!(toggle.begin(), Err(ClientError::Busy));
        assert!(toggle.settle(Err(ClientError::Network("down".into()))).is_err());
        let control = toggle.control();
        assert_eq!(control.label, "Follow");
        assert_eq!(control.followers, 0);
        assert_eq!(control.modal_target, None);
        assert!(!control.disabled);
    }
}
