//! Blank-line handling around list items.

fn is_list_item(line: &str) -> bool {
    let line = line.trim_start_matches([' ', '\t']);
    if line.starts_with("* ") {
        return true;
    }
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && line[digits..].starts_with(". ")
}

fn is_bullet(line: &str) -> bool {
    let line = line.trim_start();
    line == "*" || line.starts_with("* ")
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Drop an empty line sitting between two list items.
pub fn list_spacing(text: &str) -> String {
    let lines = text.split('\n').collect::<Vec<_>>();
    let mut kept = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let between_items = line.is_empty()
            && index > 0
            && is_list_item(lines[index - 1])
            && lines.get(index + 1).is_some_and(|next| is_list_item(next));
        if !between_items {
            kept.push(*line);
        }
    }
    kept.join("\n")
}

/// Remove one or two blank lines between bullets.
pub fn bullet_compaction(text: &str) -> String {
    let lines = text.split('\n').collect::<Vec<_>>();
    let mut kept = Vec::with_capacity(lines.len());
    let mut index = 0;
    while index < lines.len() {
        let line = lines[index];
        kept.push(line);
        index += 1;
        if !is_bullet(line) {
            continue;
        }
        let gap = lines[index..]
            .iter()
            .take_while(|candidate| is_blank(candidate))
            .count();
        let next_is_bullet = lines.get(index + gap).is_some_and(|next| is_bullet(next));
        if (1..=2).contains(&gap) && next_is_bullet {
            index += gap;
        }
    }
    kept.join("\n")
}

/// Remove the blank line that introduces a bullet list.
pub fn list_lead_in(text: &str) -> String {
    let lines = text.split('\n').collect::<Vec<_>>();
    let mut kept = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        let before_bullet = index > 0
            && is_blank(line)
            && lines.get(index + 1).is_some_and(|next| is_bullet(next));
        if !before_bullet {
            kept.push(*line);
        }
    }
    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::{bullet_compaction, list_lead_in, list_spacing};

    #[test]
    fn list_spacing_joins_items() {
        assert_eq!(list_spacing("1. a\n\n2. b\n\n* c"), "1. a\n2. b\n* c");
        assert_eq!(list_spacing("1. a\n\n\n2. b"), "1. a\n\n\n2. b");
        assert_eq!(list_spacing("para\n\n* a"), "para\n\n* a");
    }

    #[test]
    fn bullet_compaction_removes_short_gaps() {
        assert_eq!(bullet_compaction("* a\n\n* b\n \n\n* c"), "* a\n* b\n* c");
        assert_eq!(bullet_compaction("* a\n\n\n\n* b"), "* a\n\n\n\n* b");
        assert_eq!(bullet_compaction("* a\n\ntext"), "* a\n\ntext");
    }

    #[test]
    fn list_lead_in_drops_blank_before_bullet() {
        assert_eq!(list_lead_in("Intro:\n\n* a\n* b"), "Intro:\n* a\n* b");
        assert_eq!(list_lead_in("\n* a"), "\n* a");
        assert_eq!(list_lead_in("Intro:\n\n1. a"), "Intro:\n\n1. a");
    }
}
