//! Ordered body rewrites applied to every migrated post.
//!
//! Each stage is a pure function from text to text. Stages never fail; text
//! a stage does not recognize passes through unchanged.

mod entities;
mod links;
mod lists;
mod math;
mod quotes;
mod rules;
mod text;

use crate::crossref::CrossRefIndex;

pub use entities::decode_entities;
pub use links::{link_targets, rewrite_links};
pub use lists::{bullet_compaction, list_lead_in, list_spacing};
pub use math::{display_math, latex_environments};
pub use quotes::{QUOTE_CALLOUT, hoist_citations, quote_contiguity, wrap_long_quotes};
pub use rules::{
    Rule, SUBSTITUTIONS, WARNING_SENTINEL, answer_spacing, apply_substitutions,
    strip_warning_prefix,
};
pub use text::{abbreviations, footnotes, multiplication, unescape};

#[derive(Clone, Copy)]
pub enum StageKind {
    Text(fn(&str) -> String),
    /// Needs the corpus-wide link table.
    Linked(fn(&str, &CrossRefIndex) -> String),
}

#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub kind: StageKind,
}

impl Stage {
    const fn text(name: &'static str, apply: fn(&str) -> String) -> Self {
        Self {
            name,
            kind: StageKind::Text(apply),
        }
    }

    const fn linked(name: &'static str, apply: fn(&str, &CrossRefIndex) -> String) -> Self {
        Self {
            name,
            kind: StageKind::Linked(apply),
        }
    }

    pub fn apply(&self, text: &str, index: &CrossRefIndex) -> String {
        match self.kind {
            StageKind::Text(apply) => apply(text),
            StageKind::Linked(apply) => apply(text, index),
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}

pub const STAGES: &[Stage] = &[
    Stage::text("substitutions", apply_substitutions),
    Stage::text("answer_spacing", answer_spacing),
    Stage::text("strip_warning_prefix", strip_warning_prefix),
    Stage::text("decode_entities", decode_entities),
    Stage::text("footnotes", footnotes),
    Stage::text("unescape", unescape),
    Stage::text("list_spacing", list_spacing),
    Stage::text("quote_contiguity", quote_contiguity),
    Stage::text("wrap_long_quotes", wrap_long_quotes),
    Stage::text("hoist_citations", hoist_citations),
    Stage::linked("rewrite_links", rewrite_links),
    Stage::text("abbreviations", abbreviations),
    Stage::text("multiplication", multiplication),
    Stage::text("bullet_compaction", bullet_compaction),
    Stage::text("list_lead_in", list_lead_in),
    Stage::text("display_math", display_math),
    Stage::text("latex_environments", latex_environments),
];

pub fn stage_names() -> impl Iterator<Item = &'static str> {
    STAGES.iter().map(|stage| stage.name)
}

/// Run every stage in order over a post body.
pub fn rewrite_body(body: &str, index: &CrossRefIndex) -> String {
    STAGES
        .iter()
        .fold(body.to_string(), |text, stage| stage.apply(&text, index))
}

#[cfg(test)]
mod tests {
    use super::{STAGES, rewrite_body, stage_names};
    use crate::crossref::CrossRefIndex;

    fn index() -> CrossRefIndex {
        CrossRefIndex::from_entries(
            &["lesswrong.com".to_string()],
            [("abc123".to_string(), "other-post".to_string())],
        )
    }

    #[test]
    fn stage_table_is_ordered_and_unique() {
        let names = stage_names().collect::<Vec<_>>();
        assert_eq!(names.len(), 17);
        assert_eq!(names.first(), Some(&"substitutions"));
        assert_eq!(names.last(), Some(&"latex_environments"));
        let mut sorted = names.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), STAGES.len());
    }

    #[test]
    fn plain_text_passes_through() {
        let body = "A plain paragraph.\n\nAnother one.\n";
        assert_eq!(rewrite_body(body, &CrossRefIndex::default()), body);
    }

    #[test]
    fn rewrite_body_combines_stages() {
        let body = "Read [this](https://www.lesswrong.com/posts/abc123/x) eg now &amp; a 5 * 5 grid.\n\n$y = x$\n";
        assert_eq!(
            rewrite_body(body, &index()),
            "Read [this](/other-post) e.g. now & a 5×5 grid.\n\n$$\ny = x\n$$\n"
        );
    }

    #[test]
    fn quoted_block_with_attribution_becomes_callout() {
        let body = "> First.\n\n> Second.\n> Third.\n> — Author\n\nAfter.";
        assert_eq!(
            rewrite_body(body, &CrossRefIndex::default()),
            "> [!quote] Author\n>\n> First.\n>\n> Second.\n> Third.\n\nAfter."
        );
    }
}
