use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// One exported post, in the publishing platform's own schema.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Post {
    pub title: String,
    pub slug: String,
    pub page_url: Option<String>,
    pub link_url: Option<String>,
    pub tags: Vec<Tag>,
    pub posted_at: Option<String>,
    pub modified_at: Option<String>,
    pub curated_date: Option<String>,
    pub frontpage_date: Option<String>,
    pub comment_count: Option<i64>,
    pub base_score: Option<i64>,
    pub vote_count: Option<i64>,
    pub af_base_score: Option<i64>,
    pub af_comment_count: Option<i64>,
    pub draft: Option<bool>,
    pub af: Option<bool>,
    pub debate: Option<bool>,
    pub question: Option<bool>,
    pub unlisted: Option<bool>,
    pub shortform: Option<bool>,
    pub coauthors: Option<Vec<Coauthor>>,
    pub podcast_episode: Option<PodcastEpisode>,
    pub sequence: Option<SequenceInfo>,
    pub review_winner: Option<ReviewWinner>,
    pub prev_post: Option<PostRef>,
    pub next_post: Option<PostRef>,
    pub contents: Option<Contents>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Coauthor {
    pub display_name: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PodcastEpisode {
    pub episode_link: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SequenceInfo {
    pub title: Option<String>,
    pub grid_image_id: Option<String>,
    pub banner_image_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewWinner {
    pub review_winner_art: Option<String>,
    pub competitor_count: Option<i64>,
    pub review_year: Option<i64>,
    pub review_ranking: Option<i64>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PostRef {
    pub slug: String,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Contents {
    pub markdown: String,
    pub edited_at: Option<String>,
}

impl Post {
    pub fn is_draft(&self) -> bool {
        self.draft.unwrap_or(false)
    }

    pub fn content(&self) -> Option<&Contents> {
        self.contents.as_ref()
    }

    pub fn has_content(&self) -> bool {
        self.contents.is_some()
    }

    /// Canonical page URL differs from the link target.
    pub fn is_linkpost(&self) -> bool {
        self.page_url != self.link_url
    }
}

/// Every post of one export, loaded once per run.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub posts: Vec<Post>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ExportPayload {
    Envelope { data: ExportData },
    Bare(Vec<Post>),
}

#[derive(Debug, Deserialize)]
struct ExportData {
    posts: ExportResults,
}

#[derive(Debug, Deserialize)]
struct ExportResults {
    results: Vec<Post>,
}

impl Corpus {
    pub fn new(posts: Vec<Post>) -> Self {
        Self { posts }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let payload: ExportPayload =
            serde_json::from_str(content).context("failed to parse post export JSON")?;
        let posts = match payload {
            ExportPayload::Envelope { data } => data.posts.results,
            ExportPayload::Bare(posts) => posts,
        };
        Ok(Self { posts })
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn with_content(&self) -> impl Iterator<Item = &Post> {
        self.posts.iter().filter(|post| post.has_content())
    }
}

pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    Corpus::from_json(&content).with_context(|| format!("failed to load {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::{Corpus, load_corpus};

    const ENVELOPE: &str = r#"{
  "data": {
    "posts": {
      "results": [
        {
          "title": "Reward is not the optimization target",
          "slug": "reward-is-not-the-optimization-target",
          "pageUrl": "https://www.lesswrong.com/posts/pdaGN6pQyQarFHXF4/reward-is-not-the-optimization-target",
          "linkUrl": "https://www.lesswrong.com/posts/pdaGN6pQyQarFHXF4/reward-is-not-the-optimization-target",
          "tags": [{"name": "AI"}, {"name": "Shard Theory"}],
          "draft": false,
          "baseScore": 343,
          "curatedDate": null,
          "coauthors": [],
          "prevPost": null,
          "nextPost": {"slug": "next-one"},
          "contents": {"markdown": "Body text", "editedAt": "2022-07-25T00:00:00.000Z"}
        },
        {"title": "Draft without body", "slug": "draft", "contents": null}
      ]
    }
  }
}"#;

    #[test]
    fn parses_graphql_envelope() {
        let corpus = Corpus::from_json(ENVELOPE).expect("parse");
        assert_eq!(corpus.len(), 2);

        let post = &corpus.posts[0];
        assert_eq!(post.slug, "reward-is-not-the-optimization-target");
        assert_eq!(post.tags.len(), 2);
        assert_eq!(post.base_score, Some(343));
        assert!(post.curated_date.is_none());
        assert!(!post.is_draft());
        assert!(!post.is_linkpost());
        assert_eq!(
            post.next_post.as_ref().map(|next| next.slug.as_str()),
            Some("next-one")
        );
        assert_eq!(
            post.content().map(|contents| contents.markdown.as_str()),
            Some("Body text")
        );

        assert!(!corpus.posts[1].has_content());
        assert_eq!(corpus.with_content().count(), 1);
    }

    #[test]
    fn parses_bare_array() {
        let corpus =
            Corpus::from_json(r#"[{"title": "A", "slug": "a", "contents": {"markdown": "x"}}]"#)
                .expect("parse");
        assert_eq!(corpus.len(), 1);
        assert!(corpus.posts[0].has_content());
    }

    #[test]
    fn load_corpus_reports_path_on_invalid_json() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("posts.json");
        fs::write(&path, "{not json").expect("write");
        let error = load_corpus(&path).expect_err("must fail");
        assert!(format!("{error:#}").contains("posts.json"));
    }
}
