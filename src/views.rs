//! The three pages: feed, profile and post detail.
//!
//! Each view holds the context its page embeds and wires pagination,
//! rendering and the toggles together.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use futures::future::{AbortHandle, Abortable};
use tracing::{debug, info, warn};
use crate::client::{ApiClient, Transport};
use crate::config::PagingConfig;
use crate::core::cookies::CookieSource;
use crate::core::errors::ClientError;
use crate::core::query_params::PostsQuery;
use crate::follow::{FollowControl, FollowStep, FollowToggle};
use crate::likes::{LikeControl, LikeState, LikeToggle};
use crate::models::models::{
    FeedPageContext, Post, PostDetailContext, PostId, ProfilePageContext, UserId,
};
use crate::pagination::{PageTicket, PaginationController};
use crate::templates::{FeedRenderer, RenderTarget};

/// Result of a pagination trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutcome {
    /// No request was due.
    Idle,
    Rendered(usize),
    /// The response arrived for a request that had been superseded; nothing
    /// was rendered and the same page is requested on the next scroll.
    Discarded,
    Aborted,
    /// Logged and retried on the next scroll.
    Failed(ClientError),
}

/// Cancels the page request currently in flight, from outside the view.
#[derive(Debug, Clone, Default)]
pub struct PageAborter {
    slot: Arc<Mutex<InFlight>>,
}

#[derive(Debug, Default)]
struct InFlight {
    handle: Option<AbortHandle>,
    superseded: bool,
}

impl PageAborter {
    /// Abort the request immediately. Returns false if nothing was in flight.
    pub fn abort(&self) -> bool {
        if let Ok(mut slot) = self.slot.lock() {
            if let Some(handle) = slot.handle.take() {
                handle.abort();
                return true;
            }
        }
        false
    }

    /// Let the request finish but drop its response. Returns false if
    /// nothing was in flight.
    pub fn supersede(&self) -> bool {
        if let Ok(mut slot) = self.slot.lock() {
            if slot.handle.is_some() {
                slot.superseded = true;
                return true;
            }
        }
        false
    }

    fn arm(&self, handle: AbortHandle) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = InFlight {
                handle: Some(handle),
                superseded: false,
            };
        }
    }

    /// Clears the slot and reports whether the finished request was superseded.
    fn disarm(&self) -> bool {
        match self.slot.lock() {
            Ok(mut slot) => std::mem::take(&mut *slot).superseded,
            Err(_) => false,
        }
    }
}

/// Infinite-scroll list shared by the feed and profile pages.
pub struct PagedList<R> {
    pager: PaginationController,
    renderer: FeedRenderer,
    target: R,
    user_filter: Option<UserId>,
    aborter: PageAborter,
    rendered: usize,
}

impl<R: RenderTarget> PagedList<R> {
    pub fn new(
        config: PagingConfig,
        total: usize,
        renderer: FeedRenderer,
        target: R,
        user_filter: Option<UserId>,
    ) -> Self {
        Self {
            pager: PaginationController::new(config, total),
            renderer,
            target,
            user_filter,
            aborter: PageAborter::default(),
            rendered: 0,
        }
    }

    pub fn target(&self) -> &R {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut R {
        &mut self.target
    }

    pub fn pager(&self) -> &PaginationController {
        &self.pager
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn aborter(&self) -> PageAborter {
        self.aborter.clone()
    }

    pub async fn load_initial<T, C, F>(&mut self, api: &ApiClient<T, C>, like_for: F) -> PageOutcome
    where
        T: Transport,
        C: CookieSource,
        F: FnMut(&Post) -> Option<LikeControl>,
    {
        let ticket = self.pager.initial();
        self.run(ticket, api, like_for).await
    }

    pub async fn on_scroll<T, C, F>(&mut self, api: &ApiClient<T, C>, like_for: F) -> PageOutcome
    where
        T: Transport,
        C: CookieSource,
        F: FnMut(&Post) -> Option<LikeControl>,
    {
        match self.pager.on_scroll(self.target.viewport()) {
            Some(ticket) => self.run(ticket, api, like_for).await,
            None => PageOutcome::Idle,
        }
    }

    async fn run<T, C, F>(&mut self, ticket: PageTicket, api: &ApiClient<T, C>, like_for: F) -> PageOutcome
    where
        T: Transport,
        C: CookieSource,
        F: FnMut(&Post) -> Option<LikeControl>,
    {
        let query = PostsQuery::new(ticket.start, ticket.page_size, self.user_filter);
        debug!(seq = ticket.seq, start = ticket.start, "requesting page");

        let (handle, registration) = AbortHandle::new_pair();
        self.aborter.arm(handle);
        let result = Abortable::new(api.fetch_posts(&query), registration).await;
        if self.aborter.disarm() {
            self.pager.cancel();
        }

        match result.map_err(ClientError::from).and_then(|page| page) {
            Ok(posts) => {
                if !self.pager.complete(ticket) {
                    return PageOutcome::Discarded;
                }
                let count = self.renderer.render_page(&posts, &mut self.target, like_for);
                self.rendered += count;
                info!(start = ticket.start, count, rendered = self.rendered, "page rendered");
                PageOutcome::Rendered(count)
            }
            Err(ClientError::Aborted) => {
                debug!(start = ticket.start, "page request aborted");
                self.pager.fail(ticket);
                PageOutcome::Aborted
            }
            Err(err) => {
                warn!(start = ticket.start, error = %err, "page request failed");
                self.pager.fail(ticket);
                PageOutcome::Failed(err)
            }
        }
    }
}

/// The global feed: cards with like buttons for a signed-in viewer.
pub struct FeedView<R> {
    list: PagedList<R>,
    viewer: Option<UserId>,
    likes: HashMap<PostId, LikeToggle>,
}

impl<R: RenderTarget> FeedView<R> {
    pub fn new(ctx: &FeedPageContext, config: PagingConfig, renderer: FeedRenderer, target: R) -> Self {
        Self {
            list: PagedList::new(config, ctx.total_num_posts, renderer, target, None),
            viewer: ctx.auth_user_id,
            likes: HashMap::new(),
        }
    }

    pub fn list(&self) -> &PagedList<R> {
        &self.list
    }

    pub fn target(&self) -> &R {
        self.list.target()
    }

    pub fn target_mut(&mut self) -> &mut R {
        self.list.target_mut()
    }

    pub fn aborter(&self) -> PageAborter {
        self.list.aborter()
    }

    pub fn like(&self, post_id: PostId) -> Option<&LikeToggle> {
        self.likes.get(&post_id)
    }

    pub async fn load_initial<T: Transport, C: CookieSource>(&mut self, api: &ApiClient<T, C>) -> PageOutcome {
        let viewer = self.viewer;
        let likes = &mut self.likes;
        self.list
            .load_initial(api, |post| wire_like(likes, viewer, post))
            .await
    }

    pub async fn on_scroll<T: Transport, C: CookieSource>(&mut self, api: &ApiClient<T, C>) -> PageOutcome {
        let viewer = self.viewer;
        let likes = &mut self.likes;
        self.list
            .on_scroll(api, |post| wire_like(likes, viewer, post))
            .await
    }

    pub async fn click_like<T: Transport, C: CookieSource>(
        &mut self,
        post_id: PostId,
        api: &ApiClient<T, C>,
    ) -> Result<LikeState, ClientError> {
        let toggle = self.likes.get_mut(&post_id).ok_or_else(|| {
            ClientError::InvalidTransition(format!("post {} has no like button", post_id))
        })?;
        click_and_redraw(toggle, self.list.target_mut(), api).await
    }
}

fn wire_like(likes: &mut HashMap<PostId, LikeToggle>, viewer: Option<UserId>, post: &Post) -> Option<LikeControl> {
    let viewer = viewer?;
    let toggle = likes
        .entry(post.id)
        .or_insert_with(|| LikeToggle::for_post(post, viewer));
    Some(toggle.control())
}

async fn click_and_redraw<R, T, C>(
    toggle: &mut LikeToggle,
    target: &mut R,
    api: &ApiClient<T, C>,
) -> Result<LikeState, ClientError>
where
    R: RenderTarget,
    T: Transport,
    C: CookieSource,
{
    let post_id = toggle.post_id();
    let actor_id = toggle.actor_id();
    let intended = toggle.begin()?;
    target.update_like(post_id, toggle.control());
    let outcome = match intended {
        LikeState::Liked => api.create_like(post_id, actor_id).await,
        LikeState::Unliked => api.delete_like(post_id, actor_id).await,
    };
    let result = toggle.settle(outcome);
    target.update_like(post_id, toggle.control());
    result
}

/// A user's profile: photo grid plus the follow button.
pub struct ProfileView<R> {
    list: PagedList<R>,
    follow: Option<FollowToggle>,
}

impl<R: RenderTarget> ProfileView<R> {
    pub fn new(ctx: &ProfilePageContext, config: PagingConfig, renderer: FeedRenderer, target: R) -> Self {
        Self {
            list: PagedList::new(config, ctx.post_count, renderer, target, Some(ctx.user_id)),
            follow: FollowToggle::from_context(ctx),
        }
    }

    pub fn list(&self) -> &PagedList<R> {
        &self.list
    }

    pub fn target(&self) -> &R {
        self.list.target()
    }

    pub fn target_mut(&mut self) -> &mut R {
        self.list.target_mut()
    }

    pub fn aborter(&self) -> PageAborter {
        self.list.aborter()
    }

    pub fn follow_control(&self) -> Option<FollowControl> {
        self.follow.as_ref().map(FollowToggle::control)
    }

    pub async fn load_initial<T: Transport, C: CookieSource>(&mut self, api: &ApiClient<T, C>) -> PageOutcome {
        self.list.load_initial(api, |_| None).await
    }

    pub async fn on_scroll<T: Transport, C: CookieSource>(&mut self, api: &ApiClient<T, C>) -> PageOutcome {
        self.list.on_scroll(api, |_| None).await
    }

    pub async fn click_follow<T: Transport, C: CookieSource>(
        &mut self,
        api: &ApiClient<T, C>,
    ) -> Result<FollowStep, ClientError> {
        self.toggle()?.click(api).await
    }

    pub async fn confirm_unfollow<T: Transport, C: CookieSource>(
        &mut self,
        api: &ApiClient<T, C>,
    ) -> Result<FollowStep, ClientError> {
        self.toggle()?.confirm(api).await
    }

    pub fn dismiss_unfollow(&mut self) -> Result<FollowStep, ClientError> {
        Ok(self.toggle()?.dismiss())
    }

    fn toggle(&mut self) -> Result<&mut FollowToggle, ClientError> {
        self.follow
            .as_mut()
            .ok_or_else(|| ClientError::InvalidTransition("profile has no follow button".to_string()))
    }
}

/// A single post with its like button.
pub struct PostDetailView {
    like: LikeToggle,
}

impl PostDetailView {
    pub fn new(ctx: &PostDetailContext) -> Self {
        Self {
            like: LikeToggle::new(
                ctx.post_id,
                ctx.auth_user_id,
                LikeState::from_flag(ctx.liked),
                ctx.like_count,
            ),
        }
    }

    pub fn like(&self) -> &LikeToggle {
        &self.like
    }

    pub async fn click_like<T: Transport, C: CookieSource>(
        &mut self,
        api: &ApiClient<T, C>,
    ) -> Result<LikeState, ClientError> {
        self.like.click(api).await
    }
}
