use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Comment, MediaItem, MediaKind, Post};

/// Configuration for the Instagram web client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub app_id: String,
    /// GraphQL document resolving a post by shortcode
    pub post_doc_id: String,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.instagram.com".to_string(),
            app_id: "936619743392459".to_string(),
            post_doc_id: "8845758582119845".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
        }
    }
}

/// Per-download client options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Target directory; `{target}` is replaced by the target name.
    pub dirname_pattern: String,
    pub download_comments: bool,
    pub save_metadata: bool,
}

impl ClientOptions {
    pub fn target_dir(&self, target: &str) -> std::path::PathBuf {
        self.dirname_pattern.replace("{target}", target).into()
    }
}

/// Response from the web login endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub authenticated: bool,
    #[serde(default)]
    pub user: bool,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub two_factor_required: bool,
    #[serde(default)]
    pub checkpoint_url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Envelope of a GraphQL query response
#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShortcodeMediaData {
    #[serde(alias = "shortcode_media")]
    pub xdt_shortcode_media: Option<PostNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edges<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Owner {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PostNode {
    pub shortcode: String,
    pub owner: Owner,
    #[serde(default)]
    pub is_video: bool,
    pub display_url: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub taken_at_timestamp: i64,
    #[serde(default)]
    pub edge_media_to_caption: Option<Edges<CaptionNode>>,
    #[serde(default)]
    pub edge_sidecar_to_children: Option<Edges<SidecarNode>>,
    #[serde(default)]
    pub edge_media_to_parent_comment: Option<Edges<CommentNode>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptionNode {
    pub text: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SidecarNode {
    #[serde(default)]
    pub is_video: bool,
    pub display_url: String,
    #[serde(default)]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentNode {
    pub text: String,
    #[serde(default)]
    pub created_at: i64,
    pub owner: Owner,
}

fn media_item(is_video: bool, display_url: String, video_url: Option<String>) -> MediaItem {
    match video_url {
        Some(url) if is_video => MediaItem {
            kind: MediaKind::Video,
            url,
        },
        _ => MediaItem {
            kind: MediaKind::Image,
            url: display_url,
        },
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

impl From<PostNode> for Post {
    fn from(node: PostNode) -> Self {
        let media = match node.edge_sidecar_to_children {
            Some(children) if !children.edges.is_empty() => children
                .edges
                .into_iter()
                .map(|edge| media_item(edge.node.is_video, edge.node.display_url, edge.node.video_url))
                .collect(),
            _ => vec![media_item(node.is_video, node.display_url, node.video_url)],
        };

        let caption = node
            .edge_media_to_caption
            .and_then(|c| c.edges.into_iter().next())
            .map(|edge| edge.node.text);

        let comments = node
            .edge_media_to_parent_comment
            .map(|c| {
                c.edges
                    .into_iter()
                    .map(|edge| Comment {
                        owner_username: edge.node.owner.username,
                        text: edge.node.text,
                        created_at: timestamp(edge.node.created_at),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Post {
            shortcode: node.shortcode,
            owner_username: node.owner.username,
            taken_at: timestamp(node.taken_at_timestamp),
            caption,
            media,
            comments,
        }
    }
}
