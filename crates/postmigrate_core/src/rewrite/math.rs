//! Display math promotion and LaTeX environment delimiters.

use std::sync::LazyLock;

use regex::{Captures, Regex};

const DISPLAY_DELIMITER: &str = "$$";

static INLINE_MATH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ *\$([^$\n]+)\$ *$").expect("inline math line regex"));
static ENVIRONMENT_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(^|[^$])\$\\begin\{(align|equation)\}").expect("environment open regex")
});
static ENVIRONMENT_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\end\{(align|equation)\} *\$(\$?)").expect("environment close regex")
});
static TEXT_AFTER_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$([^\n])").expect("delimiter suffix regex"));
static TEXT_BEFORE_DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\n])\$\$").expect("delimiter prefix regex"));

/// A line holding only `$...$` is display math.
pub fn display_math(text: &str) -> String {
    INLINE_MATH_LINE
        .replace_all(text, |caps: &Captures<'_>| format!("$${}$$", &caps[1]))
        .into_owned()
}

pub fn latex_environments(text: &str) -> String {
    let text = ENVIRONMENT_OPEN.replace_all(text, |caps: &Captures<'_>| {
        format!("{}$$\\begin{{{}}}", &caps[1], &caps[2])
    });
    let text = ENVIRONMENT_CLOSE.replace_all(&text, |caps: &Captures<'_>| {
        if caps[2].is_empty() {
            format!("\\end{{{}}}$$", &caps[1])
        } else {
            caps[0].to_string()
        }
    });
    let text = TEXT_AFTER_DELIMITER.replace_all(&text, "$$$$\n${1}");
    let text = TEXT_BEFORE_DELIMITER.replace_all(&text, "${1}\n$$$$");
    double_trailing_backslashes(&text)
}

/// Inside `$$` blocks a line break is `\\`; a lone trailing `\` is doubled.
fn double_trailing_backslashes(text: &str) -> String {
    let mut inside = false;
    let mut lines = Vec::new();
    for line in text.split('\n') {
        if inside && ends_with_single_backslash(line) {
            lines.push(format!("{line}\\"));
        } else {
            lines.push(line.to_string());
        }
        if line.matches(DISPLAY_DELIMITER).count() % 2 == 1 {
            inside = !inside;
        }
    }
    lines.join("\n")
}

fn ends_with_single_backslash(line: &str) -> bool {
    let mut chars = line.chars().rev();
    matches!(
        (chars.next(), chars.next()),
        (Some('\\'), Some(previous)) if previous != '\\'
    )
}
