//! §4.1.1 / §6 syntax-dictionary text format parser.
//!
//! ```text
//! <AI>[-<AI>] [<flags>] <component>[ <component>]* [<attr>]* [# <title>]
//! ```

use crate::charset::AiComponentKind;
use crate::dictionary::definition::{AiDefinition, ComponentSpec, DlDataAttr};
use crate::error::Gs1Error;
use crate::linters;

const MAX_ENTRY_BYTES: usize = 150;

bitflags::bitflags! {
    /// The `*`/`!`/`?` flag punctuation from a syntax-dictionary entry
    /// (§6), packed into a single byte.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct AiFlags: u8 {
        const NO_FNC1 = 0b001;
        const DESIGNATED_KEY = 0b010;
        const PERMIT_DL_ATTR = 0b100;
    }
}

impl AiFlags {
    fn from_token(tok: &str) -> Self {
        let mut flags = AiFlags::empty();
        for c in tok.chars() {
            match c {
                '*' => flags |= AiFlags::NO_FNC1,
                '!' => flags |= AiFlags::DESIGNATED_KEY,
                '?' => flags |= AiFlags::PERMIT_DL_ATTR,
                _ => {}
            }
        }
        flags
    }
}

pub fn parse(text: &str) -> Result<Vec<AiDefinition>, Gs1Error> {
    let mut out = Vec::new();
    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if raw_line.len() > MAX_ENTRY_BYTES {
            return Err(Gs1Error::AiTableEntryTooLong);
        }
        out.extend(parse_entry(line)?);
    }
    Ok(out)
}

fn parse_entry(line: &str) -> Result<Vec<AiDefinition>, Gs1Error> {
    let (body, title) = match line.split_once('#') {
        Some((b, t)) => (b.trim(), t.trim()),
        None => (line, ""),
    };

    let mut tokens = body.split_whitespace();
    let ai_field = tokens.next().ok_or(Gs1Error::AiTableInvalidRange)?;
    let (start_ai, end_ai) = parse_ai_field(ai_field)?;

    let mut fnc1 = true;
    let mut dlpkey_marker = false;
    let mut dl_data_attr = DlDataAttr::None;
    let mut components = Vec::new();
    let mut attrs = Vec::new();

    for tok in tokens {
        if is_flag_token(tok) {
            let flags = AiFlags::from_token(tok);
            fnc1 = !flags.contains(AiFlags::NO_FNC1);
            dlpkey_marker = flags.contains(AiFlags::DESIGNATED_KEY);
            if flags.contains(AiFlags::PERMIT_DL_ATTR) {
                dl_data_attr = DlDataAttr::Yes;
            }
        } else if is_component_token(tok) {
            components.push(parse_component(tok)?);
        } else {
            attrs.push(tok.to_string());
        }
    }
    let _ = dlpkey_marker;

    if components.is_empty() {
        return Err(Gs1Error::AiTableInvalidRange);
    }

    let attrs_joined = attrs.join(" ");
    let mut entries = Vec::new();
    let mut ai_num = start_ai.value;
    loop {
        let ai_str = format!("{:0width$}", ai_num, width = start_ai.width);
        entries.push(AiDefinition {
            ai: ai_str,
            fnc1,
            dl_data_attr,
            components: components.clone(),
            attrs: attrs_joined.clone(),
            title: title.to_string(),
        });
        if ai_num == end_ai.value {
            break;
        }
        ai_num += 1;
    }
    Ok(entries)
}

struct AiEndpoint {
    value: u32,
    width: usize,
}

fn parse_ai_field(field: &str) -> Result<(AiEndpoint, AiEndpoint), Gs1Error> {
    match field.split_once('-') {
        Some((start, end)) => {
            if start.len() != end.len() || !start.bytes().all(|b| b.is_ascii_digit()) || !end.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Gs1Error::AiTableInvalidRange);
            }
            let start_val: u32 = start.parse().map_err(|_| Gs1Error::AiTableInvalidRange)?;
            let end_val: u32 = end.parse().map_err(|_| Gs1Error::AiTableInvalidRange)?;
            if end_val <= start_val {
                return Err(Gs1Error::AiTableInvalidRange);
            }
            // Must differ only in the final digit.
            if start[..start.len() - 1] != end[..end.len() - 1] {
                return Err(Gs1Error::AiTableInvalidRange);
            }
            Ok((
                AiEndpoint { value: start_val, width: start.len() },
                AiEndpoint { value: end_val, width: end.len() },
            ))
        }
        None => {
            if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) || field.len() < 2 || field.len() > 4 {
                return Err(Gs1Error::AiTableInvalidRange);
            }
            let val: u32 = field.parse().map_err(|_| Gs1Error::AiTableInvalidRange)?;
            Ok((
                AiEndpoint { value: val, width: field.len() },
                AiEndpoint { value: val, width: field.len() },
            ))
        }
    }
}

fn is_flag_token(tok: &str) -> bool {
    !tok.is_empty()
        && tok
            .bytes()
            .all(|b| b"*!?\"$%&'()+,-./:;<=>@[\\]^_`{|}~".contains(&b))
}

fn is_component_token(tok: &str) -> bool {
    let t = tok.trim_start_matches('[').trim_end_matches(']');
    matches!(t.as_bytes().first(), Some(b'N') | Some(b'X') | Some(b'Y') | Some(b'Z'))
}

/// `[X|N|Y|Z][len|..max]`, optionally wrapped in `[ ]` to mark the whole
/// component optional, followed by comma-separated linter names, e.g.
/// `X6`, `X..20`, `[N3,iso3166]`.
fn parse_component(tok: &str) -> Result<ComponentSpec, Gs1Error> {
    let optional = tok.starts_with('[') && tok.ends_with(']');
    let inner = if optional { &tok[1..tok.len() - 1] } else { tok };
    let mut parts = inner.split(',');
    let spec = parts.next().ok_or(Gs1Error::AiTableInvalidRange)?;
    let kind_byte = spec.as_bytes().first().copied().ok_or(Gs1Error::AiTableInvalidRange)?;
    let kind = AiComponentKind::from_tag(kind_byte).ok_or(Gs1Error::AiTableInvalidRange)?;
    let len_spec = &spec[1..];
    let (min_len, max_len) = parse_len_spec(len_spec)?;

    let mut linters = Vec::new();
    for name in parts {
        let f = linters::resolve(name).ok_or_else(|| Gs1Error::AiTableUnknownLinter {
            name: name.to_string(),
            ai: String::new(),
        })?;
        linters.push(f);
    }

    Ok(ComponentSpec { kind, min_len, max_len, optional, linters })
}

fn parse_len_spec(spec: &str) -> Result<(usize, usize), Gs1Error> {
    if let Some(max) = spec.strip_prefix("..") {
        let max: usize = max.parse().map_err(|_| Gs1Error::AiTableInvalidRange)?;
        return Ok((1, max));
    }
    let len: usize = spec.parse().map_err(|_| Gs1Error::AiTableInvalidRange)?;
    Ok((len, len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_entry() {
        let defs = parse("10 * X..20  # BATCH/LOT").unwrap();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].ai, "10");
        assert!(!defs[0].fnc1);
        assert_eq!(defs[0].title, "BATCH/LOT");
        assert_eq!(defs[0].components[0].max_len, 20);
    }

    #[test]
    fn expands_ai_range() {
        let defs = parse("91-99 X..90").unwrap();
        assert_eq!(defs.len(), 9);
        assert_eq!(defs[0].ai, "91");
        assert_eq!(defs[8].ai, "99");
    }

    #[test]
    fn rejects_mismatched_range_width() {
        assert!(parse("9-99 X..90").is_err());
    }

    #[test]
    fn optional_trailing_component_with_linter() {
        let defs = parse("253 N13,csum [X..17]").unwrap();
        assert_eq!(defs[0].components.len(), 2);
        assert!(defs[0].components[1].optional);
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let defs = parse("# a comment\n\n11 N6 yymmd0").unwrap();
        assert_eq!(defs.len(), 1);
    }
}
