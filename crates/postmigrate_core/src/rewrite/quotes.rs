//! Block quotes: contiguity, callout wrapping and attribution hoisting.

use std::sync::LazyLock;

use regex::{Captures, Regex};

pub const QUOTE_CALLOUT: &str = "> [!quote]";

static LONG_QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^>.*(?:\r?\n|\r|\z)){3,}").expect("long quote regex"));

const CALLOUT_HEADER: &str = r"> \[!quote\]\s*";
const CALLOUT_BODY: &str = r"(?P<body>(?:>.*\n)+)";
const BLANK_QUOTE_LINES: &str = r"(?:>\s*)*";
const ATTRIBUTION_DASH: &str = r"> *(?:[~—–]|--)+[ _*]*";

static LINKED_ATTRIBUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{CALLOUT_HEADER}{CALLOUT_BODY}{BLANK_QUOTE_LINES}{ATTRIBUTION_DASH}\[[_*]*(?P<linktext>[^_*\]]+)[_*]*\]\((?P<url>[^#].*?)\)[ _*]*\n?"
    ))
    .expect("linked attribution regex")
});
static PLAIN_ATTRIBUTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{CALLOUT_HEADER}{CALLOUT_BODY}{BLANK_QUOTE_LINES}{ATTRIBUTION_DASH}(?P<citation>[\w,\-. ]+)[ _*]*\n?"
    ))
    .expect("plain attribution regex")
});
static DANGLING_QUOTE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^> *\n([^>])").expect("dangling quote regex"));

/// A single empty line between two quote lines becomes a bare `>`.
pub fn quote_contiguity(text: &str) -> String {
    let lines = text.split('\n').collect::<Vec<_>>();
    let is_quote = |line: &str| line.trim_start().starts_with('>');
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let joins_quotes = line.is_empty()
                && index > 0
                && is_quote(lines[index - 1])
                && lines.get(index + 1).is_some_and(|next| is_quote(next));
            if joins_quotes { ">" } else { *line }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Put a quote callout in front of every run of three or more quote lines.
pub fn wrap_long_quotes(text: &str) -> String {
    LONG_QUOTE
        .replace_all(text, |caps: &Captures<'_>| {
            let run = &caps[0];
            if run.starts_with("> [!") {
                run.to_string()
            } else {
                format!("{QUOTE_CALLOUT}\n>\n{run}")
            }
        })
        .into_owned()
}

/// Move a trailing `— Author` line into the callout header.
pub fn hoist_citations(text: &str) -> String {
    let text = LINKED_ATTRIBUTION.replace_all(text, "> [!quote] [${linktext}](${url})\n${body}");
    let text = PLAIN_ATTRIBUTION.replace_all(&text, "> [!quote] ${citation}\n${body}");
    DANGLING_QUOTE_LINE.replace_all(&text, "${1}").into_owned()
}

#[cfg(test)]
mod tests {
    use super::{hoist_citations, quote_contiguity, wrap_long_quotes};

    #[test]
    fn quote_contiguity_fills_single_gaps() {
        assert_eq!(quote_contiguity("> a\n\n> b"), "> a\n>\n> b");
        assert_eq!(quote_contiguity("> a\n\n\n> b"), "> a\n\n\n> b");
        assert_eq!(quote_contiguity("text\n\n> b"), "text\n\n> b");
    }

    #[test]
    fn four_line_quote_is_wrapped() {
        assert_eq!(
            wrap_long_quotes("Intro\n> a\n> b\n> c\n> d\nAfter"),
            "Intro\n> [!quote]\n>\n> a\n> b\n> c\n> d\nAfter"
        );
    }

    #[test]
    fn quote_ending_the_text_is_wrapped() {
        assert_eq!(
            wrap_long_quotes("Intro\n> a\n> b\n> c"),
            "Intro\n> [!quote]\n>\n> a\n> b\n> c"
        );
        let once = wrap_long_quotes("> a\n> b\n> c");
        assert_eq!(wrap_long_quotes(&once), once);
    }

    #[test]
    fn short_quotes_and_callouts_are_left_alone() {
        assert_eq!(wrap_long_quotes("> a\n> b\n"), "> a\n> b\n");
        let callout = "> [!note]\n> a\n> b\n";
        assert_eq!(wrap_long_quotes(callout), callout);
    }

    #[test]
    fn wrapping_is_stable() {
        let once = wrap_long_quotes("> a\n> b\n> c\n");
        assert_eq!(wrap_long_quotes(&once), once);
    }

    #[test]
    fn plain_citation_moves_into_header() {
        let input = "> [!quote]\n>\n> Words.\n>\n> — Someone Wise\n\nNext";
        assert_eq!(
            hoist_citations(input),
            "> [!quote] Someone Wise\n>\n> Words.\n\nNext"
        );
    }

    #[test]
    fn linked_citation_moves_into_header() {
        let input = "> [!quote]\n>\n> Words.\n>\n> -- _[The Book](https://example.com/book)_\n\nNext";
        assert_eq!(
            hoist_citations(input),
            "> [!quote] [The Book](https://example.com/book)\n>\n> Words.\n\nNext"
        );
    }

    #[test]
    fn quotes_without_attribution_are_unchanged() {
        let input = "> [!quote]\n>\n> a\n> b\n> c\n\nNext";
        assert_eq!(hoist_citations(input), input);
    }
}
