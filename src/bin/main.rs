#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Context;
    use clap::{Parser, Subcommand};
    use gramm::models::models::{FeedPageContext, FollowData, PostDetailContext, ProfilePageContext, UserId};
    use gramm::{
        ApiClient, ClientConfig, ClientError, FeedRenderer, FeedView, FollowState, FollowToggle,
        HtmlContainer, Layout, PageOutcome, PostDetailView, ProfileView, RenderedNode,
        ViewportMetrics,
    };
    use tracing_subscriber::EnvFilter;

    type Api = ApiClient<gramm::HttpTransport, String>;

    #[derive(Parser)]
    #[command(name = "gramm", about = "Drive the gramm feed, profile and toggles against a server")]
    struct Cli {
        /// Server origin, e.g. http://127.0.0.1:8000
        #[arg(long, env = "GRAMM_BASE_URL")]
        base_url: Option<String>,
        /// Cookie string sent along, must contain the CSRF cookie for mutations
        #[arg(long, env = "GRAMM_COOKIE", default_value = "")]
        cookie: String,
        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand)]
    enum Command {
        /// Scroll through the global feed
        Feed {
            #[arg(long)]
            total: usize,
            #[arg(long)]
            viewer: Option<UserId>,
            #[arg(long, default_value_t = 3)]
            pages: usize,
            #[arg(long)]
            html: bool,
        },
        /// Scroll through a user's photo grid
        Profile {
            user_id: UserId,
            #[arg(long)]
            post_count: usize,
            #[arg(long)]
            viewer: UserId,
            #[arg(long, default_value_t = 3)]
            pages: usize,
            #[arg(long)]
            html: bool,
        },
        Like { post_id: u64, user_id: UserId },
        Unlike { post_id: u64, user_id: UserId },
        Follow { follower_id: UserId, followee_id: UserId },
        Unfollow { follower_id: UserId, followee_id: UserId },
        /// Print a user's full name
        Whois { user_id: UserId },
    }

    pub async fn run() -> anyhow::Result<()> {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
            .with_writer(std::io::stderr)
            .init();

        let cli = Cli::parse();
        let mut config = ClientConfig::from_env();
        if let Some(base_url) = cli.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }

        let transport = gramm::HttpTransport::new(&config).context("Failed to build HTTP client")?;
        let api: Api = ApiClient::new(transport, cli.cookie).with_csrf_cookie(config.csrf_cookie.clone());
        let viewport = ViewportMetrics::at_bottom(800);

        match cli.command {
            Command::Feed { total, viewer, pages, html } => {
                let ctx = FeedPageContext {
                    total_num_posts: total,
                    auth_user_id: viewer,
                };
                let mut view = FeedView::new(
                    &ctx,
                    config.feed,
                    FeedRenderer::new(Layout::Cards),
                    HtmlContainer::new(viewport),
                );
                let mut outcome = view.load_initial(&api).await;
                report(&outcome);
                for _ in 1..pages {
                    outcome = view.on_scroll(&api).await;
                    report(&outcome);
                    if outcome == PageOutcome::Idle {
                        break;
                    }
                }
                print_container(view.target(), html);
            }
            Command::Profile { user_id, post_count, viewer, pages, html } => {
                let ctx = ProfilePageContext {
                    user_id,
                    post_count,
                    auth_user_id: viewer,
                    follow: FollowData::default(),
                    num_followers: 0,
                };
                let mut view = ProfileView::new(
                    &ctx,
                    config.profile,
                    FeedRenderer::new(Layout::Grid),
                    HtmlContainer::new(viewport),
                );
                report(&view.load_initial(&api).await);
                for _ in 1..pages {
                    let outcome = view.on_scroll(&api).await;
                    report(&outcome);
                    if outcome == PageOutcome::Idle {
                        break;
                    }
                }
                print_container(view.target(), html);
            }
            Command::Like { post_id, user_id } => {
                like(&api, post_id, user_id, false).await?;
            }
            Command::Unlike { post_id, user_id } => {
                like(&api, post_id, user_id, true).await?;
            }
            Command::Follow { follower_id, followee_id } => {
                let mut toggle = FollowToggle::new(follower_id, followee_id, FollowState::NotFollowing, 0);
                toggle.click(&api).await.map_err(user_facing)?;
                println!("now following {}", followee_id);
            }
            Command::Unfollow { follower_id, followee_id } => {
                let mut toggle = FollowToggle::new(follower_id, followee_id, FollowState::Following, 1);
                toggle.click(&api).await.map_err(user_facing)?;
                toggle.confirm(&api).await.map_err(user_facing)?;
                println!("unfollowed {}", followee_id);
            }
            Command::Whois { user_id } => {
                let name = api.fetch_fullname(user_id).await.map_err(user_facing)?;
                println!(
                    "{} {} ({})",
                    name.first_name,
                    name.last_name,
                    name.avatar.as_deref().unwrap_or(gramm::config::PLACEHOLDER_AVATAR)
                );
            }
        }

        Ok(())
    }

    async fn like(api: &Api, post_id: u64, user_id: UserId, liked: bool) -> anyhow::Result<()> {
        let ctx = PostDetailContext {
            post_id,
            auth_user_id: user_id,
            liked,
            like_count: u64::from(liked),
        };
        let mut view = PostDetailView::new(&ctx);
        let state = view.click_like(api).await.map_err(user_facing)?;
        println!("post {} is now {:?}", post_id, state);
        Ok(())
    }

    fn user_facing(err: ClientError) -> anyhow::Error {
        anyhow::anyhow!(err.user_message())
    }

    fn report(outcome: &PageOutcome) {
        match outcome {
            PageOutcome::Failed(err) => eprintln!("page failed: {}", err),
            PageOutcome::Idle => eprintln!("no more pages"),
            _ => {}
        }
    }

    fn print_container(container: &HtmlContainer, html: bool) {
        if html {
            println!("{}", container.html());
            return;
        }
        for node in container.nodes() {
            match node {
                RenderedNode::Card(card) => println!(
                    "#{} {} [{}] {}",
                    card.post_id, card.author_name, card.date, card.image_src
                ),
                RenderedNode::Tile(tile) => println!("#{} {} {}", tile.post_id, tile.href, tile.image_src),
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    native::run().await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
