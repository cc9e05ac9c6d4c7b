//! Front matter from a foreign post record.

use crate::config::MigrationConfig;
use crate::corpus::Post;
use crate::error::MigrateError;
use crate::frontmatter::{FrontMatter, FrontValue, quote_scalar};
use crate::log;

/// Reads one foreign field as a front-matter value.
pub type FieldReader = fn(&Post) -> FrontValue;

/// Foreign field, front-matter key and reader, in output order.
pub const FIELD_RENAMES: &[(&str, &str, FieldReader)] = &[
    ("slug", "permalink", |post| FrontValue::scalar(post.slug.as_str())),
    ("draft", "lw-was-draft-post", |post| FrontValue::Flag(post.is_draft())),
    ("af", "lw-is-af", |post| optional_flag(post.af)),
    ("debate", "lw-is-debate", |post| optional_flag(post.debate)),
    ("pageUrl", "lw-page-url", |post| optional_scalar(post.page_url.as_deref())),
    ("linkUrl", "lw-linkpost-url", |post| optional_scalar(post.link_url.as_deref())),
    ("question", "lw-is-question", |post| optional_flag(post.question)),
    ("postedAt", "lw-posted-at", |post| optional_scalar(post.posted_at.as_deref())),
    ("modifiedAt", "lw-last-modification", |post| {
        optional_scalar(post.modified_at.as_deref())
    }),
    ("curatedDate", "lw-curation-date", |post| {
        optional_scalar(post.curated_date.as_deref())
    }),
    ("frontpageDate", "lw-frontpage-date", |post| {
        optional_scalar(post.frontpage_date.as_deref())
    }),
    ("unlisted", "lw-was-unlisted", |post| optional_flag(post.unlisted)),
    ("shortform", "lw-is-shortform", |post| optional_flag(post.shortform)),
    ("commentCount", "lw-num-comments-on-upload", |post| {
        optional_number(post.comment_count)
    }),
    ("baseScore", "lw-base-score", |post| optional_number(post.base_score)),
    ("voteCount", "lw-vote-count", |post| optional_number(post.vote_count)),
    ("afBaseScore", "af-base-score", |post| optional_number(post.af_base_score)),
    ("afCommentCount", "af-num-comments-on-upload", |post| {
        optional_number(post.af_comment_count)
    }),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub front_matter: FrontMatter,
    pub warnings: Vec<String>,
}

pub fn normalize(post: &Post, config: &MigrationConfig) -> Result<Normalized, MigrateError> {
    let Some(contents) = post.content() else {
        return Err(MigrateError::MissingContent {
            title: post.title.clone(),
        });
    };

    let mut front = FrontMatter::new();
    let mut warnings = Vec::new();

    for (_, key, read) in FIELD_RENAMES {
        front.set(key, read(post));
    }
    front.set(
        "permalink",
        FrontValue::scalar(config.permalink_for(&post.slug)),
    );
    front.set(
        "publish",
        FrontValue::scalar(if post.is_draft() { "false" } else { "true" }),
    );
    front.set("title", FrontValue::scalar(quote_scalar(&post.title)));

    front.set(
        "lw-latest-edit",
        FrontValue::scalar(contents.edited_at.clone().unwrap_or_default()),
    );
    let is_linkpost = post.is_linkpost();
    front.set("lw-is-linkpost", FrontValue::Flag(is_linkpost));
    if is_linkpost {
        let link_url = post.link_url.as_deref().unwrap_or_default();
        front.set(
            "lw-linkpost-url",
            FrontValue::scalar(strip_referral_url(link_url, &config.sources.referral_prefix)),
        );
    }

    if let Some(coauthors) = post.coauthors.as_ref().filter(|list| !list.is_empty()) {
        let mut authors = vec![config.authors.primary.as_str()];
        authors.extend(
            coauthors
                .iter()
                .map(|coauthor| config.display_name(&coauthor.display_name)),
        );
        front.set("authors", FrontValue::scalar(format_authors(&authors)));
    }

    let tags = normalize_tags(post.tags.iter().map(|tag| tag.name.as_str()), config);
    if tags.is_empty() {
        let warning = format!("{} has no tags", quote_scalar(&post.title));
        log!("warn"; "{warning}");
        warnings.push(warning);
    }
    front.set("tags", FrontValue::List(tags));
    front.set("aliases", FrontValue::List(vec![post.slug.clone()]));

    if let Some(episode) = &post.podcast_episode {
        front.set("lw-podcast-link", optional_scalar(episode.episode_link.as_deref()));
    }
    if let Some(sequence) = &post.sequence {
        front.set("lw-sequence-title", optional_scalar(sequence.title.as_deref()));
        front.set(
            "lw-sequence-image-grid",
            optional_scalar(sequence.grid_image_id.as_deref()),
        );
        front.set(
            "lw-sequence-image-banner",
            optional_scalar(sequence.banner_image_id.as_deref()),
        );
    }
    if let Some(prev) = &post.prev_post {
        front.set("prev-post-slug", FrontValue::scalar(prev.slug.as_str()));
    }
    if let Some(next) = &post.next_post {
        front.set("next-post-slug", FrontValue::scalar(next.slug.as_str()));
    }
    if let Some(review) = &post.review_winner {
        front.set(
            "lw-review-art",
            optional_scalar(review.review_winner_art.as_deref()),
        );
        front.set(
            "lw-review-competitor-count",
            optional_number(review.competitor_count),
        );
        front.set("lw-review-year", optional_number(review.review_year));
        front.set("lw-review-ranking", optional_number(review.review_ranking));
        front.set(
            "lw-review-category",
            optional_scalar(review.category.as_deref()),
        );
    }

    Ok(Normalized {
        front_matter: front,
        warnings,
    })
}

fn optional_flag(value: Option<bool>) -> FrontValue {
    FrontValue::Flag(value.unwrap_or(false))
}

fn optional_scalar(value: Option<&str>) -> FrontValue {
    FrontValue::scalar(value.unwrap_or_default())
}

fn optional_number(value: Option<i64>) -> FrontValue {
    FrontValue::scalar(value.map(|number| number.to_string()).unwrap_or_default())
}

/// Unwrap `<prefix><percent-encoded target>`; anything else becomes empty.
pub fn strip_referral_url(url: &str, prefix: &str) -> String {
    let Some(target) = url.strip_prefix(prefix) else {
        return String::new();
    };
    match urlencoding::decode(target) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => target.to_string(),
    }
}

/// "A", "A and B", or "A, B, and C".
pub fn format_authors(authors: &[&str]) -> String {
    match authors {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// Allow-list, rename, hyphenate. First occurrence wins on duplicates.
pub fn normalize_tags<'a>(
    tags: impl IntoIterator<Item = &'a str>,
    config: &MigrationConfig,
) -> Vec<String> {
    let mut output: Vec<String> = Vec::new();
    for tag in tags {
        if !config.keeps_tag(tag) {
            continue;
        }
        let normalized = config.renamed_tag(tag).replace(' ', "-");
        if !output.contains(&normalized) {
            output.push(normalized);
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_yaml::Value;

    use super::{FIELD_RENAMES, format_authors, normalize, normalize_tags, strip_referral_url};
    use crate::config::{MigrationConfig, TagsSection};
    use crate::corpus::{Coauthor, Contents, Post, PostRef, ReviewWinner, SequenceInfo, Tag};
    use crate::error::MigrateError;
    use crate::frontmatter::{FrontValue, parse_front_matter};

    const PREFIX: &str = "https://www.lesswrong.com/out?url=";

    fn config() -> MigrationConfig {
        MigrationConfig {
            tags: TagsSection {
                keep: vec![
                    "AI".to_string(),
                    "AI Safety".to_string(),
                    "Reward Functions".to_string(),
                ],
                rename: BTreeMap::from([("Reward Functions".to_string(), "Reward".to_string())]),
            },
            ..MigrationConfig::default()
        }
    }

    fn post() -> Post {
        Post {
            title: "Reward is \"not\" the target".to_string(),
            slug: "reward-target".to_string(),
            page_url: Some("https://www.lesswrong.com/posts/abc123/reward-target".to_string()),
            link_url: Some("https://www.lesswrong.com/posts/abc123/reward-target".to_string()),
            tags: vec![
                Tag {
                    name: "AI Safety".to_string(),
                },
                Tag {
                    name: "Fiction".to_string(),
                },
            ],
            posted_at: Some("2022-07-25T00:00:00.000Z".to_string()),
            base_score: Some(343),
            draft: Some(false),
            contents: Some(Contents {
                markdown: "Body".to_string(),
                edited_at: Some("2022-07-26T00:00:00.000Z".to_string()),
            }),
            ..Post::default()
        }
    }

    fn scalar<'a>(front: &'a crate::frontmatter::FrontMatter, key: &str) -> Option<&'a str> {
        front.get(key).and_then(FrontValue::as_scalar)
    }

    #[test]
    fn author_formatting_uses_oxford_comma() {
        assert_eq!(format_authors(&["Alex Turner"]), "Alex Turner");
        assert_eq!(
            format_authors(&["Alex Turner", "Bob"]),
            "Alex Turner and Bob"
        );
        assert_eq!(
            format_authors(&["Alex Turner", "Bob", "Cara"]),
            "Alex Turner, Bob, and Cara"
        );
    }

    #[test]
    fn coauthors_produce_authors_field() {
        let config = config();
        let front = normalize(&post(), &config).expect("normalize").front_matter;
        assert!(!front.contains_key("authors"));

        let mut with_one = post();
        with_one.coauthors = Some(vec![Coauthor {
            display_name: "Bob".to_string(),
        }]);
        let front = normalize(&with_one, &config).expect("normalize").front_matter;
        assert_eq!(scalar(&front, "authors"), Some("Alex Turner and Bob"));

        let mut with_two = post();
        with_two.coauthors = Some(vec![
            Coauthor {
                display_name: "Bob".to_string(),
            },
            Coauthor {
                display_name: "Cara".to_string(),
            },
        ]);
        let front = normalize(&with_two, &config).expect("normalize").front_matter;
        assert_eq!(scalar(&front, "authors"), Some("Alex Turner, Bob, and Cara"));
    }

    #[test]
    fn coauthor_aliases_are_substituted() {
        let mut config = config();
        config
            .authors
            .aliases
            .insert("peligrietzer".to_string(), "Peli Grietzer".to_string());
        let mut with_alias = post();
        with_alias.coauthors = Some(vec![Coauthor {
            display_name: "peligrietzer".to_string(),
        }]);
        let front = normalize(&with_alias, &config).expect("normalize").front_matter;
        assert_eq!(scalar(&front, "authors"), Some("Alex Turner and Peli Grietzer"));
    }

    #[test]
    fn tags_are_filtered_renamed_and_hyphenated() {
        let config = config();
        let tags = normalize_tags(
            ["AI Safety", "Fiction", "Reward Functions", "AI", "AI Safety"],
            &config,
        );
        assert_eq!(tags, vec!["AI-Safety", "Reward", "AI"]);
    }

    #[test]
    fn empty_tag_set_is_a_warning_not_an_error() {
        let mut untagged = post();
        untagged.tags = vec![Tag {
            name: "Fiction".to_string(),
        }];
        let normalized = normalize(&untagged, &config()).expect("normalize");
        assert_eq!(
            normalized.front_matter.get("tags"),
            Some(&FrontValue::List(Vec::new()))
        );
        assert_eq!(normalized.warnings.len(), 1);
        assert!(normalized.warnings[0].contains("has no tags"));
    }

    #[test]
    fn key_order_follows_rename_table_then_derived_fields() {
        let front = normalize(&post(), &config()).expect("normalize").front_matter;
        let keys = front.keys().collect::<Vec<_>>();
        assert_eq!(keys[0], "permalink");
        assert_eq!(keys[1], "lw-was-draft-post");
        assert_eq!(keys[17], "af-num-comments-on-upload");
        assert_eq!(
            &keys[18..],
            &[
                "publish",
                "title",
                "lw-latest-edit",
                "lw-is-linkpost",
                "tags",
                "aliases"
            ]
        );
    }

    #[test]
    fn basic_fields_are_normalized() {
        let front = normalize(&post(), &config()).expect("normalize").front_matter;
        assert_eq!(scalar(&front, "permalink"), Some("reward-target"));
        assert_eq!(scalar(&front, "publish"), Some("true"));
        assert_eq!(
            scalar(&front, "title"),
            Some("\"Reward is 'not' the target\"")
        );
        assert_eq!(scalar(&front, "lw-base-score"), Some("343"));
        assert_eq!(scalar(&front, "lw-curation-date"), Some(""));
        assert_eq!(
            scalar(&front, "lw-latest-edit"),
            Some("2022-07-26T00:00:00.000Z")
        );
        assert_eq!(front.get("lw-is-linkpost"), Some(&FrontValue::Flag(false)));
        assert_eq!(
            front.get("aliases"),
            Some(&FrontValue::List(vec!["reward-target".to_string()]))
        );
    }

    #[test]
    fn drafts_are_unpublished_and_permalinks_overridden() {
        let mut config = config();
        config
            .permalinks
            .insert("reward-target".to_string(), "reward-not-target".to_string());
        let mut draft = post();
        draft.draft = Some(true);
        let front = normalize(&draft, &config).expect("normalize").front_matter;
        assert_eq!(scalar(&front, "publish"), Some("false"));
        assert_eq!(front.get("lw-was-draft-post"), Some(&FrontValue::Flag(true)));
        assert_eq!(scalar(&front, "permalink"), Some("reward-not-target"));
    }

    #[test]
    fn linkposts_unwrap_referral_urls() {
        let mut linkpost = post();
        linkpost.link_url =
            Some(format!("{PREFIX}https%3A%2F%2Fexample.com%2Fessay%3Fa%3D1"));
        let front = normalize(&linkpost, &config()).expect("normalize").front_matter;
        assert_eq!(front.get("lw-is-linkpost"), Some(&FrontValue::Flag(true)));
        assert_eq!(
            scalar(&front, "lw-linkpost-url"),
            Some("https://example.com/essay?a=1")
        );
        assert_eq!(front.keys().nth(5), Some("lw-linkpost-url"));
    }

    #[test]
    fn referral_urls_without_prefix_are_discarded() {
        assert_eq!(strip_referral_url("https://example.com", PREFIX), "");
        assert_eq!(
            strip_referral_url(&format!("{PREFIX}https%3A%2F%2Fa.org"), PREFIX),
            "https://a.org"
        );
    }

    #[test]
    fn optional_blocks_appear_only_when_present() {
        let mut rich = post();
        rich.sequence = Some(SequenceInfo {
            title: Some("Shard Theory".to_string()),
            grid_image_id: Some("grid".to_string()),
            banner_image_id: Some("banner".to_string()),
        });
        rich.next_post = Some(PostRef {
            slug: "following".to_string(),
        });
        rich.review_winner = Some(ReviewWinner {
            review_winner_art: Some("art".to_string()),
            competitor_count: Some(40),
            review_year: Some(2022),
            review_ranking: Some(3),
            category: Some("ai safety".to_string()),
        });
        let front = normalize(&rich, &config()).expect("normalize").front_matter;
        assert_eq!(scalar(&front, "lw-sequence-title"), Some("Shard Theory"));
        assert_eq!(scalar(&front, "lw-sequence-image-banner"), Some("banner"));
        assert_eq!(scalar(&front, "next-post-slug"), Some("following"));
        assert!(!front.contains_key("prev-post-slug"));
        assert!(!front.contains_key("lw-podcast-link"));
        assert_eq!(scalar(&front, "lw-review-year"), Some("2022"));
        assert_eq!(scalar(&front, "lw-review-category"), Some("ai safety"));
    }

    #[test]
    fn every_renamed_field_is_emitted() {
        let front = normalize(&post(), &config()).expect("normalize").front_matter;
        for (field, key, _) in FIELD_RENAMES {
            assert!(front.contains_key(key), "{field} should produce {key}");
        }
        assert_eq!(scalar(&front, "lw-page-url"), post().page_url.as_deref());
        assert_eq!(scalar(&front, "lw-posted-at"), Some("2022-07-25T00:00:00.000Z"));
    }

    #[test]
    fn free_text_fields_survive_yaml_round_trip() {
        let mut rich = post();
        rich.sequence = Some(SequenceInfo {
            title: Some("Shard Theory: A Sequence".to_string()),
            grid_image_id: None,
            banner_image_id: None,
        });
        rich.review_winner = Some(ReviewWinner {
            review_winner_art: None,
            competitor_count: Some(40),
            review_year: Some(2022),
            review_ranking: None,
            category: Some("#1 in [ai]".to_string()),
        });
        rich.coauthors = Some(vec![Coauthor {
            display_name: "Bob: the \"Builder\"".to_string(),
        }]);
        let front = normalize(&rich, &config()).expect("normalize").front_matter;
        let document = format!("{}Body\n", front.render());
        let parsed = parse_front_matter(&document).expect("parse rendered front matter");

        let text = |key: &str| parsed.get(key).and_then(Value::as_str).map(str::to_string);
        assert_eq!(
            text("lw-sequence-title").as_deref(),
            Some("Shard Theory: A Sequence")
        );
        assert_eq!(text("lw-review-category").as_deref(), Some("#1 in [ai]"));
        assert_eq!(
            text("authors").as_deref(),
            Some("Alex Turner and Bob: the \"Builder\"")
        );
        assert_eq!(text("title").as_deref(), Some("Reward is 'not' the target"));
        assert_eq!(
            parsed.get("lw-base-score").and_then(Value::as_i64),
            Some(343)
        );
        assert_eq!(parsed.get("lw-review-ranking"), Some(&Value::Null));
    }

    #[test]
    fn missing_content_is_rejected() {
        let mut empty = post();
        empty.contents = None;
        assert_eq!(
            normalize(&empty, &config()),
            Err(MigrateError::MissingContent {
                title: empty.title.clone()
            })
        );
    }
}
