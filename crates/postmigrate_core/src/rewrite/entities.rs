use quick_xml::escape::resolve_html5_entity;

/// Longest entity name we try to resolve, `&CounterClockwiseContourIntegral;` included.
const MAX_ENTITY_LEN: usize = 32;

/// Decode named and numeric character references. Anything that does not
/// resolve is copied through unchanged, ampersand included.
pub fn decode_entities(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        output.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];
        match entity_at(candidate) {
            Some((decoded, consumed)) => {
                output.push_str(&decoded);
                rest = &candidate[consumed..];
            }
            None => {
                output.push('&');
                rest = candidate;
            }
        }
    }
    output.push_str(rest);
    output
}

/// Names HTML5 still resolves without a trailing `;`.
const LEGACY_NAMES: &[&str] = &[
    "AElig", "AMP", "Aacute", "Acirc", "Agrave", "Aring", "Atilde", "Auml", "COPY", "Ccedil",
    "ETH", "Eacute", "Ecirc", "Egrave", "Euml", "GT", "Iacute", "Icirc", "Igrave", "Iuml", "LT",
    "Ntilde", "Oacute", "Ocirc", "Ograve", "Oslash", "Otilde", "Ouml", "QUOT", "REG", "THORN",
    "Uacute", "Ucirc", "Ugrave", "Uuml", "Yacute", "aacute", "acirc", "acute", "aelig", "agrave",
    "amp", "aring", "atilde", "auml", "brvbar", "ccedil", "cedil", "cent", "copy", "curren",
    "deg", "divide", "eacute", "ecirc", "egrave", "eth", "euml", "frac12", "frac14", "frac34",
    "gt", "iacute", "icirc", "iexcl", "igrave", "iquest", "iuml", "laquo", "lt", "macr", "micro",
    "middot", "nbsp", "not", "ntilde", "oacute", "ocirc", "ograve", "ordf", "ordm", "oslash",
    "otilde", "ouml", "para", "plusmn", "pound", "quot", "raquo", "reg", "sect", "shy", "sup1",
    "sup2", "sup3", "szlig", "thorn", "times", "uacute", "ucirc", "ugrave", "uml", "uuml",
    "yacute", "yen", "yuml",
];

const LONGEST_LEGACY_NAME: usize = 6;

/// `text` starts right after `&`. Returns the decoded text and the number of
/// bytes consumed, including a trailing `;` when there is one.
fn entity_at(text: &str) -> Option<(String, usize)> {
    match text.strip_prefix('#') {
        Some(number) => {
            let (decoded, consumed) = numeric_at(number)?;
            Some((decoded.to_string(), consumed + 1))
        }
        None => named_at(text),
    }
}

/// `&#NNN` and `&#xHH`, the `;` optional.
fn numeric_at(text: &str) -> Option<(char, usize)> {
    let (offset, radix) = match text.as_bytes().first() {
        Some(b'x' | b'X') => (1, 16),
        _ => (0, 10),
    };
    let digits = text[offset..]
        .bytes()
        .take_while(|byte| char::from(*byte).is_digit(radix))
        .count();
    if digits == 0 {
        return None;
    }
    let end = offset + digits;
    let code = u32::from_str_radix(&text[offset..end], radix).ok()?;
    let decoded = char::from_u32(code).filter(|ch| *ch != '\0')?;
    let consumed = if text[end..].starts_with(';') { end + 1 } else { end };
    Some((decoded, consumed))
}

/// `&name;` for any HTML5 name, otherwise the longest legacy name prefix.
fn named_at(text: &str) -> Option<(String, usize)> {
    let run = text.bytes().take_while(u8::is_ascii_alphanumeric).count();
    if run == 0 {
        return None;
    }
    if run <= MAX_ENTITY_LEN && text[run..].starts_with(';') {
        if let Some(decoded) = resolve_html5_entity(&text[..run]) {
            return Some((decoded.to_string(), run + 1));
        }
    }
    (1..=run.min(LONGEST_LEGACY_NAME)).rev().find_map(|len| {
        let name = &text[..len];
        if !LEGACY_NAMES.contains(&name) {
            return None;
        }
        resolve_html5_entity(name).map(|decoded| (decoded.to_string(), len))
    })
}
