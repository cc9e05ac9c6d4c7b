//! Inline rewrites: footnotes, escapes, abbreviations and multiplication signs.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static FOOTNOTE_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\\\[([^\]]*)\\\]\]\(.*?\)").expect("footnote reference regex")
});
static FOOTNOTE_DEFINITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.\s*\*{2}\[\^\]\(.*?\)\*{2}\s*").expect("footnote definition regex")
});
static GLUED_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\]\([^()\s]*\))(\w)").expect("glued link regex"));

static EXEMPLI_GRATIA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\be\.?g\b\.?").expect("e.g. regex"));
static ID_EST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bi\.?e\b\.?").expect("i.e. regex"));

const NUMBER: &str = r"[\-−]?(?:\d{1,3}(?:,?\d{3})*(?:\.\d+)?|(?:\.\d+))";
const TIMES: &str = r"[ \t]*?(?:\*|\\times)[ \t]*?";

static MULTIPLICATION: LazyLock<Regex> = LazyLock::new(|| {
    let operand = format!(r"(?:{NUMBER}|\bn\b)");
    Regex::new(&format!(
        r"(?:\\\()?({operand}){TIMES}({operand})(?:\\\))?|\b(coeff){TIMES}(\w+)"
    ))
    .expect("multiplication regex")
});

/// `[\[1\]](#fn)` becomes `[^1]`, the numbered back-reference list becomes
/// `[^1]: ` definitions, and a word glued to a link gets a space.
pub fn footnotes(text: &str) -> String {
    let text = FOOTNOTE_REFERENCE.replace_all(text, "[^${1}]");
    let text = FOOTNOTE_DEFINITION.replace_all(&text, "[^${1}]: ");
    GLUED_LINK.replace_all(&text, "${1} ${2}").into_owned()
}

pub fn unescape(text: &str) -> String {
    text.replace(r"\\", r"\").replace(r"\-", "-")
}

/// Canonical `e.g.` and `i.e.`. Already-canonical forms are left as written.
pub fn abbreviations(text: &str) -> String {
    let text = canonicalize(&EXEMPLI_GRATIA, text, "e.g.");
    canonicalize(&ID_EST, &text, "i.e.")
}

fn canonicalize(pattern: &Regex, text: &str, canonical: &str) -> String {
    pattern
        .replace_all(text, |caps: &Captures<'_>| {
            let found = &caps[0];
            if found.eq_ignore_ascii_case(canonical) {
                found.to_string()
            } else {
                canonical.to_string()
            }
        })
        .into_owned()
}

/// `5 * 5`, `\(5\times5\)`, `n*n` and `coeff*x` are written with `×`.
pub fn multiplication(text: &str) -> String {
    MULTIPLICATION
        .replace_all(text, |caps: &Captures<'_>| match (caps.get(1), caps.get(2)) {
            (Some(left), Some(right)) => format!("{}×{}", left.as_str(), right.as_str()),
            _ => format!("{}×{}", &caps[3], &caps[4]),
        })
        .into_owned()
}
