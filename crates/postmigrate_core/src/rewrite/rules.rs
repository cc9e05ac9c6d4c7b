//! Fixed substitution table and the small prefix fixes that run right after it.

use std::sync::LazyLock;

use regex::{NoExpand, Regex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Exact substring replacement.
    Literal(&'static str, &'static str),
    /// Regular expression; the replacement is inserted without group expansion.
    Pattern(&'static str, &'static str),
}

/// Applied top to bottom. Later rules see the output of earlier ones.
pub const SUBSTITUTIONS: &[Rule] = &[
    // Broken links and conversion casualties.
    Rule::Literal(
        "Hoffmann,Ruettler,Nieder(2011) AnimBehav.pdf",
        "Hoffmann,Ruettler,Nieder(2011)AnimBehav.pdf",
    ),
    Rule::Literal("is_in", "is _in"),
    Rule::Literal("<em>openai.com/o</em>penai-five/", "openai.com/openai-five/"),
    Rule::Literal("(<em>h</em>ttps://", "(https://"),
    // Encoding.
    Rule::Literal("茂", "ï"),
    Rule::Literal("◻️", "∎"),
    Rule::Literal("lesserwrong.com", "lesswrong.com"),
    // Operator declarations the renderer already provides.
    Rule::Pattern(r"\\DeclareMathOperator\*?\{\\argmax\}\{arg\\,max\}", ""),
    Rule::Pattern(r"\\DeclareMathOperator\*?\{\\min\}\{min\\,min\}", ""),
    // Dead image host.
    Rule::Literal("https://i.stack.imgur.com", "https://i.sstatic.net"),
    Rule::Literal("✔️", "✓"),
    Rule::Pattern(r"\biff\b", "IFF"),
    Rule::Literal("_._", r"\."),
    Rule::Literal("\u{a0}", " "),
    Rule::Literal("* * *", "<hr/>"),
    Rule::Literal("<|endoftext|>", "<endoftext>"),
];

enum CompiledRule {
    Literal(&'static str, &'static str),
    Pattern(Regex, &'static str),
}

static COMPILED_SUBSTITUTIONS: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    SUBSTITUTIONS
        .iter()
        .map(|rule| match *rule {
            Rule::Literal(from, to) => CompiledRule::Literal(from, to),
            Rule::Pattern(pattern, to) => CompiledRule::Pattern(
                Regex::new(pattern).expect("substitution pattern must compile"),
                to,
            ),
        })
        .collect()
});

static ANSWER_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\n])\n\*\*A:\*\*").expect("answer marker regex"));

/// Sentence closing the notice prepended to the power-seeking posts.
pub const WARNING_SENTINEL: &str =
    "moved away from optimal policies and treated reward functions more realistically.**\n";

pub fn apply_substitutions(text: &str) -> String {
    let mut output = text.to_string();
    for rule in COMPILED_SUBSTITUTIONS.iter() {
        output = match rule {
            CompiledRule::Literal(from, to) => output.replace(*from, to),
            CompiledRule::Pattern(regex, to) => {
                regex.replace_all(&output, NoExpand(*to)).into_owned()
            }
        };
    }
    output
}

/// Blank line before a bold `A:` marker that directly follows text.
pub fn answer_spacing(text: &str) -> String {
    ANSWER_MARKER
        .replace_all(text, "${1}\n\n**A:**")
        .into_owned()
}

/// Keep only what follows the last occurrence of the warning sentence.
pub fn strip_warning_prefix(text: &str) -> String {
    match text.rfind(WARNING_SENTINEL) {
        Some(start) => text[start + WARNING_SENTINEL.len()..].to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        SUBSTITUTIONS, WARNING_SENTINEL, answer_spacing, apply_substitutions, strip_warning_prefix,
    };

    #[test]
    fn substitution_patterns_compile() {
        assert!(!SUBSTITUTIONS.is_empty());
        assert_eq!(apply_substitutions("plain text"), "plain text");
    }

    #[test]
    fn fixes_domains_symbols_and_spacing() {
        assert_eq!(
            apply_substitutions("see lesserwrong.com and https://i.stack.imgur.com/a.png"),
            "see lesswrong.com and https://i.sstatic.net/a.png"
        );
        assert_eq!(apply_substitutions("done ◻️ ✔️"), "done ∎ ✓");
        assert_eq!(apply_substitutions("a\u{a0}b"), "a b");
        assert_eq!(apply_substitutions("x\n\n* * *\n\ny"), "x\n\n<hr/>\n\ny");
        assert_eq!(apply_substitutions("<|endoftext|>"), "<endoftext>");
    }

    #[test]
    fn iff_is_capitalized_only_as_a_word() {
        assert_eq!(apply_substitutions("x iff y, not tiff"), "x IFF y, not tiff");
    }

    #[test]
    fn removes_operator_declarations() {
        assert_eq!(
            apply_substitutions(r"$\DeclareMathOperator*{\argmax}{arg\,max}\argmax_x f$"),
            r"$\argmax_x f$"
        );
    }

    #[test]
    fn italic_dot_artifact_becomes_escaped_dot() {
        assert_eq!(apply_substitutions("end_._"), r"end\.");
    }

    #[test]
    fn answer_marker_gets_blank_line() {
        assert_eq!(
            answer_spacing("**Q:** why?\n**A:** because"),
            "**Q:** why?\n\n**A:** because"
        );
        assert_eq!(
            answer_spacing("**Q:** why?\n\n**A:** because"),
            "**Q:** why?\n\n**A:** because"
        );
    }

    #[test]
    fn warning_prefix_is_discarded() {
        let text = format!("**Warning: this post {WARNING_SENTINEL}Real start.");
        assert_eq!(strip_warning_prefix(&text), "Real start.");
        assert_eq!(strip_warning_prefix("No warning."), "No warning.");
    }
}
