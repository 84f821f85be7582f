//! §4.4 GS1 Digital Link URI engine: parse and generate.

use std::collections::HashSet;

use crate::ai_value::{AiValue, AiValueKind, DL_PATH_ATTRIBUTE};
use crate::dictionary::definition::DlDataAttr;
use crate::dictionary::Dictionary;
use crate::element_string::build_canonical_message;
use crate::error::Gs1Error;

pub const DEFAULT_STEM: &str = "https://id.gs1.org";

/// §4.4.1 step 5's fixed bidirectional map of 3-5 lower-case convenience
/// alpha names to the AI they stand in for, consulted only when
/// `permit_convenience_alphas` is on.
const CONVENIENCE_ALPHAS: &[(&str, &str)] = &[("gtin", "01"), ("lot", "10"), ("ser", "21"), ("cpv", "22")];

fn alpha_to_ai(seg: &str) -> Option<&'static str> {
    CONVENIENCE_ALPHAS.iter().find(|(alpha, _)| *alpha == seg).map(|(_, ai)| *ai)
}

/// Resolve a path key segment to its AI digits, substituting a convenience
/// alpha name when permitted and recognised; otherwise returned unchanged.
fn resolve_key_segment(seg: &str, permit_convenience_alphas: bool) -> &str {
    if permit_convenience_alphas {
        if let Some(ai) = alpha_to_ai(seg) {
            return ai;
        }
    }
    seg
}

/// The outcome of parsing a GS1 Digital Link URI: a canonical message plus
/// the extracted AI list (§4.4.1 steps 6-9), the raw authority, and the
/// `dl_ignored` query parameters kept verbatim (§4.4.1 step 8).
#[derive(Debug)]
pub struct ParsedDl {
    pub message: String,
    pub values: Vec<AiValue>,
    pub dl_ignored: Vec<String>,
    pub authority: String,
    pub fragment: Option<String>,
}

/// §4.4.1 parse a GS1 Digital Link URI.
pub fn parse(
    uri: &str,
    dict: &Dictionary,
    permit_unknown_ais: bool,
    permit_zero_suppressed_gtin_in_dl: bool,
    permit_convenience_alphas: bool,
) -> Result<ParsedDl, Gs1Error> {
    if !uri.bytes().all(|b| b.is_ascii_graphic()) {
        return Err(Gs1Error::UriIllegalCharacters);
    }

    let rest = strip_scheme(uri)?;
    let slash = rest.find('/');
    let authority = match slash {
        Some(i) => &rest[..i],
        None => rest,
    };
    if authority.is_empty() {
        return Err(Gs1Error::UriNoAuthority);
    }
    let after_authority = match slash {
        Some(i) => &rest[i..],
        None => "",
    };

    let (before_fragment, fragment) = match after_authority.split_once('#') {
        Some((b, f)) => (b, Some(f.to_string())),
        None => (after_authority, None),
    };
    let (path, query) = match before_fragment.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (before_fragment, None),
    };

    if path.is_empty() {
        return Err(Gs1Error::UriNoDlPrimaryKey);
    }
    if path.ends_with('/') {
        return Err(Gs1Error::UriEndsWithSlash);
    }

    let segs: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    if segs.len() < 2 {
        return Err(Gs1Error::UriNoDlPrimaryKey);
    }

    // §4.4.1 step 5: right-to-left scan for the DL primary key.
    let mut root = None;
    let mut idx = segs.len() as i64 - 2;
    while idx >= 0 {
        if dict.is_dl_primary_key(resolve_key_segment(segs[idx as usize], permit_convenience_alphas)) {
            root = Some(idx as usize);
            break;
        }
        idx -= 2;
    }
    let root = root.ok_or(Gs1Error::UriNoDlPrimaryKey)?;

    // §4.4.1 step 6: left-to-right extraction of the path pairs.
    let mut pairs: Vec<(String, String)> = Vec::new();
    let mut i = root;
    while i + 1 < segs.len() {
        let ai_digits = resolve_key_segment(segs[i], permit_convenience_alphas);
        let raw_value = segs[i + 1];
        let lookup = dict
            .lookup_ai(ai_digits, permit_unknown_ais)?
            .ok_or_else(|| Gs1Error::UriPathAiNotFound { digits: ai_digits.to_string() })?;
        let def = lookup.definition();
        let mut decoded = percent_decode_path(raw_value)?;
        if def.ai == "01" && permit_zero_suppressed_gtin_in_dl && matches!(decoded.len(), 8 | 12 | 13) {
            decoded = format!("{decoded:0>14}");
        }
        if decoded.contains('^') {
            return Err(Gs1Error::UriFnc1InValue { ai: def.ai.clone() });
        }
        if decoded.len() < def.min_total_length() || decoded.len() > def.max_total_length() {
            return Err(Gs1Error::UriComponentLengthInvalid { ai: def.ai.clone() });
        }
        pairs.push((def.ai.clone(), decoded));
        i += 2;
    }
    let path_count = pairs.len();

    // §4.4.1 step 7.
    let path_seq: Vec<String> = pairs.iter().map(|(ai, _)| ai.clone()).collect();
    if !dict.is_valid_dl_path_ai_sequence(&path_seq.join(" ")) {
        return Err(Gs1Error::UriInvalidKeyQualifierSequence);
    }

    // §4.4.1 step 8: the query string.
    let mut dl_ignored = Vec::new();
    if let Some(q) = query {
        for item in q.split('&') {
            if item.is_empty() {
                continue;
            }
            let (key, value) = match item.split_once('=') {
                Some((k, v)) => (k, Some(v)),
                None => (item, None),
            };
            if !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()) {
                let Some(v) = value else {
                    return Err(Gs1Error::UriComponentLengthInvalid { ai: key.to_string() });
                };
                let lookup = dict
                    .lookup_ai(key, permit_unknown_ais)?
                    .ok_or_else(|| Gs1Error::UriUnknownDlAttribute { ai: key.to_string() })?;
                let def = lookup.definition();
                if def.dl_data_attr == DlDataAttr::None {
                    return Err(Gs1Error::AttributeNotValidDlDataAttr { ai: def.ai.clone() });
                }
                let decoded = percent_decode_query(v)?;
                if decoded.contains('^') {
                    return Err(Gs1Error::UriFnc1InValue { ai: def.ai.clone() });
                }
                if decoded.len() < def.min_total_length() || decoded.len() > def.max_total_length() {
                    return Err(Gs1Error::UriComponentLengthInvalid { ai: def.ai.clone() });
                }
                pairs.push((def.ai.clone(), decoded));
            } else {
                // Open question (spec.md §9): a non-numeric key missing a
                // value is kept verbatim rather than rejected.
                dl_ignored.push(item.to_string());
            }
        }
    }

    // §4.4.1 step 9: no duplicate AIs across path + query.
    for a in 0..pairs.len() {
        for b in (a + 1)..pairs.len() {
            if pairs[a].0 == pairs[b].0 {
                return Err(Gs1Error::UriDuplicateAi { ai: pairs[a].0.clone() });
            }
        }
    }

    // An attribute that would extend the path sequence to a longer valid
    // key/qualifier sequence belongs in the path, not the query.
    for (ai, _) in &pairs[path_count..] {
        for pos in 1..=path_seq.len() {
            let mut candidate: Vec<String> = path_seq.clone();
            candidate.insert(pos, ai.clone());
            if dict.is_valid_dl_path_ai_sequence(&candidate.join(" ")) {
                return Err(Gs1Error::UriAttributeShouldBeInPath { ai: ai.clone() });
            }
        }
    }

    let (message, mut values) = build_canonical_message(&pairs, dict, permit_unknown_ais)?;
    for (i, v) in values.iter_mut().enumerate() {
        v.dl_path_order = if i < path_count { i as i32 } else { DL_PATH_ATTRIBUTE };
    }

    Ok(ParsedDl {
        message,
        values,
        dl_ignored,
        authority: authority.to_string(),
        fragment,
    })
}

fn strip_scheme(uri: &str) -> Result<&str, Gs1Error> {
    for scheme in ["http://", "https://", "HTTP://", "HTTPS://"] {
        if let Some(rest) = uri.strip_prefix(scheme) {
            return Ok(rest);
        }
    }
    Err(Gs1Error::UriBadScheme)
}

/// Whether `data` looks like it was meant to carry a `http(s)://` scheme, in
/// any casing. Used to route input to [`parse`] (the sole authority on which
/// casings are actually valid, via `strip_scheme`) instead of silently
/// falling through to a plain-data interpretation.
pub fn has_uri_scheme_prefix(data: &str) -> bool {
    let prefix7: String = data.chars().take(7).flat_map(char::to_lowercase).collect();
    if prefix7 == "http://" {
        return true;
    }
    let prefix8: String = data.chars().take(8).flat_map(char::to_lowercase).collect();
    prefix8 == "https://"
}

/// §4.4.2 generate a canonical GS1 Digital Link URI from the extracted AI
/// list. `stem` defaults to [`DEFAULT_STEM`].
pub fn generate(message: &str, values: &[AiValue], dict: &Dictionary, stem: Option<&str>) -> Result<String, Gs1Error> {
    let stem = stem.unwrap_or(DEFAULT_STEM).trim_end_matches('/');
    let ai_values: Vec<&AiValue> = values.iter().filter(|v| v.kind == AiValueKind::AiValue).collect();
    if ai_values.is_empty() {
        return Err(Gs1Error::NoPrimaryKeyToGenerate);
    }

    let from_dl = ai_values.iter().any(|v| v.dl_path_order >= 0);

    let (mut path_values, mut attr_values): (Vec<&AiValue>, Vec<&AiValue>) = if from_dl {
        let mut path: Vec<&AiValue> = ai_values.iter().copied().filter(|v| v.dl_path_order >= 0).collect();
        path.sort_by_key(|v| v.dl_path_order);
        let attr: Vec<&AiValue> = ai_values.iter().copied().filter(|v| v.dl_path_order < 0).collect();
        (path, attr)
    } else {
        let primary = ai_values
            .iter()
            .find(|v| dict.is_dl_primary_key(v.ai(message)))
            .copied()
            .ok_or(Gs1Error::NoPrimaryKeyToGenerate)?;
        let primary_ai = primary.ai(message).to_string();
        let present: HashSet<&str> = ai_values.iter().map(|v| v.ai(message)).collect();
        let chosen_seq = dict
            .sequences_for_key(&primary_ai)
            .into_iter()
            .find(|seq| seq.split_whitespace().all(|ai| present.contains(ai)))
            .unwrap_or(primary_ai.as_str());
        let seq_ais: Vec<&str> = chosen_seq.split_whitespace().collect();
        let path: Vec<&AiValue> = seq_ais
            .iter()
            .filter_map(|ai| ai_values.iter().find(|v| v.ai(message) == *ai).copied())
            .collect();
        let attr: Vec<&AiValue> = ai_values
            .iter()
            .copied()
            .filter(|v| !seq_ais.contains(&v.ai(message)))
            .collect();
        (path, attr)
    };

    let is_fixed = |ai: &str| -> bool {
        dict.lookup_ai(ai, true)
            .ok()
            .flatten()
            .map(|l| l.definition().is_fixed_length())
            .unwrap_or(false)
    };
    attr_values.sort_by_key(|v| !is_fixed(v.ai(message)));

    for v in &attr_values {
        let ai = v.ai(message);
        let lookup = dict
            .lookup_ai(ai, true)?
            .ok_or_else(|| Gs1Error::AttributeNotValidDlDataAttr { ai: ai.to_string() })?;
        if lookup.definition().dl_data_attr == DlDataAttr::None {
            return Err(Gs1Error::AttributeNotValidDlDataAttr { ai: ai.to_string() });
        }
    }

    if path_values.is_empty() {
        return Err(Gs1Error::NoPrimaryKeyToGenerate);
    }

    let mut uri = String::from(stem);
    for v in path_values.drain(..) {
        uri.push('/');
        uri.push_str(v.ai(message));
        uri.push('/');
        uri.push_str(&percent_encode_path(v.value(message)));
    }
    if !attr_values.is_empty() {
        uri.push('?');
        for (i, v) in attr_values.iter().enumerate() {
            if i > 0 {
                uri.push('&');
            }
            uri.push_str(v.ai(message));
            uri.push('=');
            uri.push_str(&percent_encode_query(v.value(message)));
        }
    }
    Ok(uri)
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

/// GS1 DL's percent-encoding subset: upper-case hex, `+` always escaped, and
/// space encoded as `%20` in paths, `+` in query values (`spec.md` §4.4.2).
fn percent_encode(value: &str, query: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for b in value.bytes() {
        match b {
            b' ' if query => out.push('+'),
            b'+' => out.push_str("%2B"),
            _ if is_unreserved(b) => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}

pub fn percent_encode_path(value: &str) -> String {
    percent_encode(value, false)
}

pub fn percent_encode_query(value: &str) -> String {
    percent_encode(value, true)
}

fn percent_decode(value: &str, query: bool) -> Result<String, Gs1Error> {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                let hex = bytes.get(i + 1..i + 3).ok_or(Gs1Error::UriIllegalCharacters)?;
                let s = std::str::from_utf8(hex).map_err(|_| Gs1Error::UriIllegalCharacters)?;
                let v = u8::from_str_radix(s, 16).map_err(|_| Gs1Error::UriIllegalCharacters)?;
                out.push(v);
                i += 3;
            }
            // Path `+` is a literal plus; query `+` decodes to a space.
            b'+' => {
                out.push(if query { b' ' } else { b'+' });
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8(out).map_err(|_| Gs1Error::UriIllegalCharacters)
}

pub fn percent_decode_path(value: &str) -> Result<String, Gs1Error> {
    percent_decode(value, false)
}

pub fn percent_decode_query(value: &str) -> Result<String, Gs1Error> {
    percent_decode(value, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;

    #[test]
    fn parses_key_and_qualifiers_from_path_and_query() {
        let dict = Dictionary::embedded();
        let parsed = parse(
            "https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426",
            &dict,
            false,
            false,
            false,
        )
        .unwrap();
        assert_eq!(parsed.message, "^010952012345678810ABC1^2112345^17180426");
    }

    #[test]
    fn rejects_trailing_slash() {
        let dict = Dictionary::embedded();
        let err = parse("https://id.gs1.org/01/09520123456788/", &dict, false, false, false).unwrap_err();
        assert_eq!(err, Gs1Error::UriEndsWithSlash);
    }

    #[test]
    fn rejects_mixed_case_scheme() {
        let dict = Dictionary::embedded();
        let err = parse("HtTp://id.gs1.org/01/09520123456788", &dict, false, false, false).unwrap_err();
        assert_eq!(err, Gs1Error::UriBadScheme);
    }

    #[test]
    fn rejects_attribute_that_belongs_in_path() {
        let dict = Dictionary::embedded();
        let err = parse("https://example.com/01/09520123456788?10=ABC123", &dict, false, false, false).unwrap_err();
        assert_eq!(err, Gs1Error::UriAttributeShouldBeInPath { ai: "10".to_string() });
    }

    #[test]
    fn convenience_alpha_resolves_to_primary_key_when_permitted() {
        let dict = Dictionary::embedded();
        let parsed = parse("https://id.gs1.org/gtin/09520123456788", &dict, false, false, true).unwrap();
        assert_eq!(parsed.message, "^0109520123456788");
        assert_eq!(parsed.values[0].ai(&parsed.message), "01");
    }

    #[test]
    fn convenience_alpha_rejected_as_unknown_ai_when_not_permitted() {
        let dict = Dictionary::embedded();
        let err = parse("https://id.gs1.org/gtin/09520123456788", &dict, false, false, false).unwrap_err();
        assert!(matches!(err, Gs1Error::UriNoDlPrimaryKey));
    }

    #[test]
    fn generates_full_path_from_bracketed_input() {
        let dict = Dictionary::embedded();
        let (message, values) =
            crate::element_string::parse_bracketed("(01)12312312312326(22)ABC(10)DEF(21)GHI", &dict, false).unwrap();
        let uri = generate(&message, &values, &dict, None).unwrap();
        assert_eq!(uri, "https://id.gs1.org/01/12312312312326/22/ABC/10/DEF/21/GHI");
    }

    #[test]
    fn demotes_non_primary_keys_to_attributes() {
        let dict = Dictionary::embedded();
        let (message, values) = crate::element_string::parse_bracketed(
            "(253)9526064000028000001(99)000001(01)12312312312326(22)ABC(10)DEF(21)GHI(95)INT",
            &dict,
            false,
        )
        .unwrap();
        let uri = generate(&message, &values, &dict, Some("https://example.com")).unwrap();
        assert_eq!(
            uri,
            "https://example.com/253/9526064000028000001?01=12312312312326&99=000001&22=ABC&10=DEF&21=GHI&95=INT"
        );
    }

    #[test]
    fn round_trips_a_parsed_dl_uri() {
        let dict = Dictionary::embedded();
        let parsed = parse(
            "https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426",
            &dict,
            false,
            false,
            false,
        )
        .unwrap();
        let uri = generate(&parsed.message, &parsed.values, &dict, None).unwrap();
        assert_eq!(uri, "https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426");
    }
}
