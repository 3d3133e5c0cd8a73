//! Turning post records into render nodes.
//!
//! Nothing here touches a real document: nodes are appended to a
//! [`RenderTarget`], which a browser binding maps onto the DOM and
//! [`HtmlContainer`] keeps as HTML fragments.

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use crate::config::PLACEHOLDER_AVATAR;
use crate::core::helpers::{caption_html, format_pub_date, post_route, profile_route};
use crate::likes::LikeControl;
use crate::models::models::{Post, PostId};
use crate::pagination::ViewportMetrics;

/// The container posts are rendered into.
pub trait RenderTarget {
    fn append(&mut self, node: RenderedNode);
    fn viewport(&self) -> ViewportMetrics;
    /// Redraw the like control of an already rendered post.
    fn update_like(&mut self, post_id: PostId, control: LikeControl);
}

/// Feed card for one post.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub post_id: PostId,
    pub author_name: String,
    pub profile_href: String,
    pub avatar_src: String,
    pub image_src: String,
    pub caption_html: String,
    pub date: String,
    pub like: Option<LikeControl>,
}

/// Profile grid cell: the photo linking to its detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileTile {
    pub post_id: PostId,
    pub href: String,
    pub image_src: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedNode {
    Card(PostCard),
    Tile(ProfileTile),
}

impl RenderedNode {
    pub fn post_id(&self) -> PostId {
        match self {
            RenderedNode::Card(card) => card.post_id,
            RenderedNode::Tile(tile) => tile.post_id,
        }
    }

    pub fn to_html(&self) -> String {
        match self {
            RenderedNode::Card(card) => card_html(card),
            RenderedNode::Tile(tile) => format!(
                r#"<div class="post-area"><a href="{}"><img src="{}"></a></div>"#,
                encode_double_quoted_attribute(&tile.href),
                encode_double_quoted_attribute(&tile.image_src),
            ),
        }
    }
}

fn card_html(card: &PostCard) -> String {
    let href = encode_double_quoted_attribute(&card.profile_href);
    let name = encode_text(&card.author_name);
    let author_link = format!(r#"<a href="{}">{}</a>"#, href, name);

    let likes = card
        .like
        .as_ref()
        .map(|like| {
            format!(
                r#"<div class="likes"><button class="like-btn"{}><i class="{}"></i></button><span class="like-count">{}</span></div>"#,
                if like.disabled { " disabled" } else { "" },
                like.icon_class,
                encode_text(&like.label),
            )
        })
        .unwrap_or_default();

    format!(
        concat!(
            r#"<div class="card" data-post-id="{id}">"#,
            r#"<div class="post-author"><div class="avatar"><a href="{href}"><img src="{avatar}"></a></div>"#,
            r#"<div class="author">{author}</div></div>"#,
            r#"<div class="photo"><img src="{image}"></div>"#,
            "{likes}",
            r#"<div class="caption"><p><span class="author">{author}</span> {caption}</p></div>"#,
            r#"<div class="date"><p>{date}</p></div>"#,
            "</div>"
        ),
        id = card.post_id,
        href = href,
        avatar = encode_double_quoted_attribute(&card.avatar_src),
        author = author_link,
        image = encode_double_quoted_attribute(&card.image_src),
        likes = likes,
        caption = card.caption_html,
        date = encode_text(&card.date),
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Full cards, as on the feed page.
    Cards,
    /// Photo-only tiles, as on a profile page.
    Grid,
}

/// Converts pages of posts into nodes, in order, without clearing earlier ones.
#[derive(Debug, Clone)]
pub struct FeedRenderer {
    layout: Layout,
    now: Option<DateTime<Utc>>,
}

impl FeedRenderer {
    pub fn new(layout: Layout) -> Self {
        Self { layout, now: None }
    }

    /// Pin the clock used for relative dates.
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn card(&self, post: &Post, like: Option<LikeControl>) -> PostCard {
        let now = self.now.unwrap_or_else(Utc::now);
        PostCard {
            post_id: post.id,
            author_name: post.author_name(),
            profile_href: profile_route(post.user),
            avatar_src: post
                .user_avatar
                .as_deref()
                .filter(|src| !src.is_empty())
                .unwrap_or(PLACEHOLDER_AVATAR)
                .to_string(),
            image_src: post.image.clone(),
            caption_html: caption_html(&post.caption),
            date: format_pub_date(&post.pub_date, now),
            like,
        }
    }

    pub fn tile(&self, post: &Post) -> ProfileTile {
        ProfileTile {
            post_id: post.id,
            href: post_route(post.id),
            image_src: post.image.clone(),
        }
    }

    /// Append one node per post. `like_for` supplies the like control to wire
    /// onto a card before it is inserted; grid tiles carry none.
    pub fn render_page<R, F>(&self, posts: &[Post], target: &mut R, mut like_for: F) -> usize
    where
        R: RenderTarget,
        F: FnMut(&Post) -> Option<LikeControl>,
    {
        for post in posts {
            let node = match self.layout {
                Layout::Cards => RenderedNode::Card(self.card(post, like_for(post))),
                Layout::Grid => RenderedNode::Tile(self.tile(post)),
            };
            target.append(node);
        }
        posts.len()
    }
}

/// In-memory [`RenderTarget`] holding nodes in insertion order.
#[derive(Debug, Clone)]
pub struct HtmlContainer {
    nodes: Vec<RenderedNode>,
    viewport: ViewportMetrics,
}

impl HtmlContainer {
    pub fn new(viewport: ViewportMetrics) -> Self {
        Self {
            nodes: Vec::new(),
            viewport,
        }
    }

    pub fn nodes(&self) -> &[RenderedNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn set_viewport(&mut self, viewport: ViewportMetrics) {
        self.viewport = viewport;
    }

    pub fn html(&self) -> String {
        self.nodes.iter().map(RenderedNode::to_html).collect::<Vec<_>>().join("\n")
    }
}

impl RenderTarget for HtmlContainer {
    fn append(&mut self, node: RenderedNode) {
        self.nodes.push(node);
    }

    fn viewport(&self) -> ViewportMetrics {
        self.viewport
    }

    fn update_like(&mut self, post_id: PostId, control: LikeControl) {
        for node in &mut self.nodes {
            if let RenderedNode::Card(card) = node {
                if card.post_id == post_id {
                    card.like = Some(control.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post(id: PostId, avatar: Option<&str>) -> Post {
        Post {
            id,
            user: 4,
            user_avatar: avatar.map(str::to_string),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            image: format!("/media/{}.jpg", id),
            caption: "at the <i>lake</i>".to_string(),
            pub_date: "2022-03-20T09:00:00Z".to_string(),
            likes: vec![],
        }
    }

    fn renderer(layout: Layout) -> FeedRenderer {
        FeedRenderer::new(layout).with_now(Utc.with_ymd_and_hms(2022, 3, 20, 12, 0, 0).unwrap())
    }

    #[test]
    fn missing_avatar_uses_placeholder() {
        let card = renderer(Layout::Cards).card(&post(1, None), None);
        assert_eq!(card.avatar_src, PLACEHOLDER_AVATAR);
        let card = renderer(Layout::Cards).card(&post(1, Some("/media/a.png")), None);
        assert_eq!(card.avatar_src, "/media/a.png");
    }

    #[test]
    fn card_links_author_and_formats_date() {
        let card = renderer(Layout::Cards).card(&post(1, None), None);
        assert_eq!(card.profile_href, "/app/4/profile");
        assert_eq!(card.date, "3 HOURS AGO");
        assert_eq!(card.caption_html, "at the lake");

        let html = RenderedNode::Card(card).to_html();
        assert!(html.contains(r#"<span class="author"><a href="/app/4/profile">Ann Lee</a></span> at the lake"#));
        assert!(!html.contains("like-btn"));
    }

    #[test]
    fn pages_append_in_order_without_clearing() {
        let renderer = renderer(Layout::Cards);
        let mut container = HtmlContainer::new(ViewportMetrics::at_bottom(800));
        renderer.render_page(&[post(1, None), post(2, None)], &mut container, |_| None);
        renderer.render_page(&[post(3, None)], &mut container, |_| None);
        let ids: Vec<_> = container.nodes().iter().map(RenderedNode::post_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn grid_tiles_link_to_detail() {
        let mut container = HtmlContainer::new(ViewportMetrics::at_bottom(800));
        renderer(Layout::Grid).render_page(&[post(8, None)], &mut container, |_| None);
        assert_eq!(
            container.html(),
            r#"<div class="post-area"><a href="/app/p/8"><img src="/media/8.jpg"></a></div>"#
        );
    }

    #[test]
    fn author_name_is_escaped() {
        let mut p = post(1, None);
        p.first_name = "<b>Ann".to_string();
        let html = RenderedNode::Card(renderer(Layout::Cards).card(&p, None)).to_html();
        assert!(html.contains("&lt;b&gt;Ann Lee"));
    }

    #[test]
    fn update_like_redraws_card_control() {
        let mut container = HtmlContainer::new(ViewportMetrics::at_bottom(800));
        let control = LikeControl {
            icon_class: "far fa-heart",
            label: "0 likes".to_string(),
            disabled: false,
        };
        renderer(Layout::Cards).render_page(&[post(1, None)], &mut container, |_| Some(control.clone()));
        container.update_like(
            1,
            LikeControl {
                icon_class: "fas fa-heart red-heart",
                label: "1 like".to_string(),
                disabled: false,
            },
        );
        assert!(container.html().contains(r#"<i class="fas fa-heart red-heart"></i></button><span class="like-count">1 like</span>"#));
    }
}
