use crate::crossref::CrossRefIndex;

/// Targets of `[text](target)` links, in order of first appearance. The
/// target may contain balanced parentheses; a link broken by a newline is
/// ignored.
pub fn link_targets(text: &str) -> Vec<&str> {
    let mut targets: Vec<&str> = Vec::new();
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find("](") {
        let start = cursor + found + 2;
        cursor = start;
        let Some(end) = closing_paren(&text[start..]) else {
            continue;
        };
        let target = &text[start..start + end];
        if !target.is_empty() && !targets.contains(&target) {
            targets.push(target);
        }
        cursor = start + end + 1;
    }
    targets
}

/// Byte offset of the `)` that closes a group whose `(` was just consumed.
fn closing_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (index, ch) in text.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            '\n' => return None,
            _ => {}
        }
    }
    None
}

/// Point links at migrated posts to their local pages. The target URL is
/// replaced wherever it occurs in the text, not only inside the link.
pub fn rewrite_links(text: &str, index: &CrossRefIndex) -> String {
    let replacements = link_targets(text)
        .into_iter()
        .filter(|target| !target.contains("commentId="))
        .filter_map(|target| {
            let local = index.resolve(target)?;
            Some((target, local))
        })
        .collect::<Vec<_>>();
    let mut output = text.to_string();
    for (from, to) in replacements {
        output = output.replace(from, &to);
    }
    output
}
