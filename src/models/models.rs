use serde::{Deserialize, Deserializer, Serialize};

pub type PostId = u64;
pub type UserId = u64;

/// A post as returned by `GET /app/posts`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub user: UserId,
    #[serde(default)]
    pub user_avatar: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub image: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub caption: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub pub_date: String,
    #[serde(default)]
    pub likes: Vec<UserId>,
}

impl Post {
    pub fn author_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }

    pub fn is_liked_by(&self, user_id: UserId) -> bool {
        self.likes.contains(&user_id)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserFullname {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct LikeBody {
    pub user_id: UserId,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct FollowBody {
    pub followee_id: UserId,
}

/// Context the feed page embeds for its script.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct FeedPageContext {
    pub total_num_posts: usize,
    /// Absent for anonymous viewers, which disables like controls.
    #[serde(default)]
    pub auth_user_id: Option<UserId>,
}

/// The `follow-data` JSON island on a profile page.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct FollowData {
    pub can_follow: bool,
    #[serde(default)]
    pub is_following: bool,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct ProfilePageContext {
    pub user_id: UserId,
    pub post_count: usize,
    pub auth_user_id: UserId,
    #[serde(rename = "follow-data", alias = "follow_data", default)]
    pub follow: FollowData,
    #[serde(default)]
    pub num_followers: u64,
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct PostDetailContext {
    pub post_id: PostId,
    pub auth_user_id: UserId,
    pub liked: bool,
    #[serde(default)]
    pub like_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn post_tolerates_null_avatar_and_caption() {
        let post: Post = serde_json::from_value(json!({
            "id": 3,
            "user": 1,
            "user_avatar": null,
            "first_name": "Ann",
            "last_name": "Lee",
            "image": "/media/p3.jpg",
            "caption": null,
            "pub_date": "2 HOURS AGO",
            "likes": [1, 4]
        }))
        .unwrap();
        assert_eq!(post.user_avatar, None);
        assert_eq!(post.caption, "");
        assert!(post.is_liked_by(4));
        assert!(!post.is_liked_by(2));
        assert_eq!(post.author_name(), "Ann Lee");
    }

    #[test]
    fn profile_tile_payload_is_enough_for_a_post() {
        let post: Post = serde_json::from_value(json!({
            "id": 9, "user": 2, "image": "/media/p9.jpg", "likes": []
        }))
        .unwrap();
        assert_eq!(post.author_name(), "");
        assert!(post.pub_date.is_empty());
    }

    #[test]
    fn profile_context_reads_follow_data_island() {
        let ctx: ProfilePageContext = serde_json::from_value(json!({
            "user_id": 2,
            "post_count": 12,
            "auth_user_id": 5,
            "follow-data": {"can_follow": true, "is_following": false},
            "num_followers": 1
        }))
        .unwrap();
        assert!(ctx.follow.can_follow);
        assert!(!ctx.follow.is_following);
        assert_eq!(ctx.num_followers, 1);
    }
}
