//! §4.3 element-string parser: bracketed ⇄ unbracketed conversion and AI
//! extraction into the canonical message buffer.

use crate::ai_value::{AiValue, AiValueKind, DL_PATH_ATTRIBUTE};
use crate::dictionary::{definition::AiDefinition, Dictionary, LookupResult};
use crate::error::{ErrorMarkupSpan, Gs1Error};

pub const FNC1: char = '^';

/// Parse a bracketed element string such as `(01)12345678901231(10)ABC123`
/// into the canonical unbracketed message (leading `^`, `^` only where a
/// preceding variable-length AI requires it) and the extracted AI list.
pub fn parse_bracketed(
    input: &str,
    dict: &Dictionary,
    permit_unknown_ais: bool,
) -> Result<(String, Vec<AiValue>), Gs1Error> {
    // First pass: always separate AIs with `^`; `parse_unbracketed`
    // tolerates the resulting spurious separators after fixed-length AIs,
    // so this can never misparse even though it may be more liberal with
    // `^` than the canonical form.
    let mut draft = String::from(FNC1);
    let mut chars = input.chars().peekable();
    let mut first = true;

    while let Some(&c) = chars.peek() {
        if c == '|' {
            chars.next();
            draft.push('|');
            continue;
        }
        if c != '(' {
            return Err(Gs1Error::ParenCountMismatch);
        }
        chars.next();
        let mut ai_digits = String::new();
        for d in chars.by_ref() {
            if d == ')' {
                break;
            }
            if !d.is_ascii_digit() {
                return Err(Gs1Error::ParenCountMismatch);
            }
            ai_digits.push(d);
        }
        if ai_digits.is_empty() {
            return Err(Gs1Error::ParenCountMismatch);
        }

        let mut value = String::new();
        loop {
            match chars.peek() {
                None | Some('(') | Some('|') => break,
                Some('\\') => {
                    chars.next();
                    if chars.peek() == Some(&'(') {
                        value.push('(');
                        chars.next();
                    } else {
                        value.push('\\');
                    }
                }
                Some(&other) => {
                    value.push(other);
                    chars.next();
                }
            }
        }

        if !first {
            draft.push(FNC1);
        }
        draft.push_str(&ai_digits);
        draft.push_str(&value);
        first = false;
    }

    if draft == FNC1.to_string() {
        return Err(Gs1Error::AiDataEmpty);
    }

    let values = parse_unbracketed(&draft, dict, permit_unknown_ais)?;
    let canonical = rebuild_message(&draft, &values);
    // Offsets in `values` are relative to `draft`; since `rebuild_message`
    // only ever removes spurious `^` characters the lengths are unchanged,
    // but offsets shift, so re-parse against the canonical buffer to keep
    // offsets self-consistent for the caller.
    let values = parse_unbracketed(&canonical, dict, permit_unknown_ais)?;
    Ok((canonical, values))
}

/// Build the canonical message from an ordered list of (AI digits, decoded
/// value) pairs, e.g. extracted from a Digital Link path and query. Shares
/// the draft/parse/rebuild/reparse sequence used by [`parse_bracketed`] so
/// that FNC1 placement and component validation stay in one place.
pub fn build_canonical_message(
    pairs: &[(String, String)],
    dict: &Dictionary,
    permit_unknown_ais: bool,
) -> Result<(String, Vec<AiValue>), Gs1Error> {
    let mut draft = String::from(FNC1);
    for (i, (ai, value)) in pairs.iter().enumerate() {
        if i > 0 {
            draft.push(FNC1);
        }
        draft.push_str(ai);
        draft.push_str(value);
    }
    let values = parse_unbracketed(&draft, dict, permit_unknown_ais)?;
    let canonical = rebuild_message(&draft, &values);
    let values = parse_unbracketed(&canonical, dict, permit_unknown_ais)?;
    Ok((canonical, values))
}

pub(crate) fn rebuild_message(original: &str, values: &[AiValue]) -> String {
    let mut out = String::from(FNC1);
    let mut prev_requires_fnc1 = false;
    for v in values {
        if v.kind == AiValueKind::CcSeparator {
            out.push('|');
            prev_requires_fnc1 = false;
            continue;
        }
        if !out.ends_with(FNC1) && !out.ends_with('|') && prev_requires_fnc1 {
            out.push(FNC1);
        }
        out.push_str(v.ai(original));
        out.push_str(v.value(original));
        prev_requires_fnc1 = v.requires_fnc1;
    }
    out
}

/// Convert the canonical message buffer back into bracketed form.
pub fn message_to_bracketed(message: &str, values: &[AiValue]) -> String {
    let mut out = String::new();
    for v in values {
        if v.kind == AiValueKind::CcSeparator {
            out.push('|');
            continue;
        }
        if v.kind == AiValueKind::DlIgnored {
            continue;
        }
        out.push('(');
        out.push_str(v.ai(message));
        out.push(')');
        for c in v.value(message).chars() {
            if c == '(' {
                out.push('\\');
            }
            out.push(c);
        }
    }
    out
}

/// §4.3.2 parse an unbracketed (canonical) message: must begin with `^`.
pub fn parse_unbracketed(
    message: &str,
    dict: &Dictionary,
    permit_unknown_ais: bool,
) -> Result<Vec<AiValue>, Gs1Error> {
    let bytes = message.as_bytes();
    if bytes.first() != Some(&b'^') || message.len() == 1 {
        return Err(Gs1Error::AiDataEmpty);
    }

    let mut pos = 1usize;
    let mut values = Vec::new();

    while pos < bytes.len() {
        if bytes[pos] == b'|' {
            values.push(AiValue {
                kind: AiValueKind::CcSeparator,
                ai_start: pos,
                ai_len: 0,
                value_start: pos,
                value_len: 0,
                dl_path_order: DL_PATH_ATTRIBUTE,
                requires_fnc1: false,
            });
            pos += 1;
            continue;
        }
        if bytes[pos] == b'^' {
            // Tolerated spurious separator, e.g. after a fixed-length AI.
            pos += 1;
            continue;
        }

        let rest = &message[pos..];
        let lookup = dict
            .lookup(rest, 0, permit_unknown_ais)?
            .ok_or_else(|| Gs1Error::UnrecognisedAi {
                digits: rest.chars().take_while(char::is_ascii_digit).take(4).collect(),
            })?;

        if let LookupResult::Vivified(ref def) = lookup {
            // §4.3.2: an unknown AI of unconstrained length cannot be
            // delimited in unbracketed data, regardless of
            // `permit_unknown_ais`.
            if dict.length_for_prefix(&def.ai[..2]).is_none() {
                return Err(Gs1Error::UnknownAiUnknownLength { ai: def.ai.clone() });
            }
        }

        let def = lookup.definition();
        let ai_len = def.ai.len();
        let ai_start = pos;
        let value_pos = pos + ai_len;
        if value_pos > bytes.len() {
            return Err(Gs1Error::AiValueTooShort { ai: def.ai.clone() });
        }

        let value_rest = &message[value_pos..];
        let max_len = def.max_total_length();
        let min_len = def.min_total_length();
        let terminator = value_rest.find(['^', '|']).unwrap_or(value_rest.len());

        let consumed = if def.is_fixed_length() {
            if value_rest.len() < min_len {
                return Err(Gs1Error::AiValueTooShort { ai: def.ai.clone() });
            }
            min_len
        } else {
            let natural_len = terminator.min(max_len);
            if natural_len < min_len {
                return Err(Gs1Error::AiValueTooShort { ai: def.ai.clone() });
            }
            if terminator > max_len {
                return Err(Gs1Error::AiValueTooLong { ai: def.ai.clone() });
            }
            natural_len
        };

        if message[value_pos..value_pos + consumed].contains('^') {
            return Err(Gs1Error::FncCharInAiValue { ai: def.ai.clone() });
        }

        if def.requires_fnc1() {
            let next = bytes.get(value_pos + consumed).copied();
            if !matches!(next, None | Some(b'^') | Some(b'|')) {
                return Err(Gs1Error::MissingFnc1Separator { ai: def.ai.clone() });
            }
        }

        validate_components(def, &message[value_pos..value_pos + consumed])?;

        values.push(AiValue {
            kind: AiValueKind::AiValue,
            ai_start,
            ai_len,
            value_start: value_pos,
            value_len: consumed,
            dl_path_order: DL_PATH_ATTRIBUTE,
            requires_fnc1: def.requires_fnc1(),
        });

        pos = value_pos + consumed;
    }

    Ok(values)
}

/// Run each component's character-set check then its linters, in
/// declaration order, stopping at the first failure (§4.2).
pub fn validate_components(def: &AiDefinition, value: &str) -> Result<(), Gs1Error> {
    let mut offset = 0usize;
    for (i, comp) in def.components.iter().enumerate() {
        let remaining = &value[offset..];
        let take = if i == def.components.len() - 1 {
            remaining.len()
        } else {
            comp.max_len.min(remaining.len())
        };
        let slice = &remaining[..take];
        if slice.is_empty() && comp.optional {
            continue;
        }

        if let Err(bad_pos) = comp.kind.validate(slice) {
            let kind = match comp.kind {
                crate::charset::AiComponentKind::Numeric | crate::charset::AiComponentKind::Cset82 => {
                    crate::linters::LinterErrorKind::InvalidCset82Character
                }
                crate::charset::AiComponentKind::Cset39 => crate::linters::LinterErrorKind::InvalidCset39Character,
                crate::charset::AiComponentKind::Cset64 => crate::linters::LinterErrorKind::InvalidCset64Character,
            };
            let span = ErrorMarkupSpan { start: offset + bad_pos, len: 1 };
            return Err(Gs1Error::LinterFailed {
                ai: def.ai.clone(),
                err: crate::linters::LinterError { kind, err_pos: span.start, err_len: span.len },
                markup: Gs1Error::markup_for_linter(&def.ai, value, span),
            });
        }

        for linter in &comp.linters {
            if let Err(err) = linter(slice) {
                let span = ErrorMarkupSpan { start: offset + err.err_pos, len: err.err_len };
                return Err(Gs1Error::LinterFailed {
                    ai: def.ai.clone(),
                    err,
                    markup: Gs1Error::markup_for_linter(&def.ai, value, span),
                });
            }
        }

        offset += take;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bracketed_round_trips_through_unbracketed() {
        let dict = Dictionary::embedded();
        let (msg, values) = parse_bracketed("(01)12345678901231(10)ABC123", &dict, false).unwrap();
        assert_eq!(msg, "^011234567890123110ABC123");
        let back = message_to_bracketed(&msg, &values);
        assert_eq!(back, "(01)12345678901231(10)ABC123");
    }

    #[test]
    fn fnc1_only_inserted_after_variable_length_ai() {
        let dict = Dictionary::embedded();
        let (msg, _) = parse_bracketed("(01)09520123456788(10)ABC1(21)12345(17)180426", &dict, false).unwrap();
        assert_eq!(msg, "^010952012345678810ABC1^2112345^17180426");
    }

    #[test]
    fn leading_caret_with_nothing_fails() {
        let dict = Dictionary::embedded();
        assert_eq!(parse_unbracketed("^", &dict, false).unwrap_err(), Gs1Error::AiDataEmpty);
    }

    #[test]
    fn unknown_ai_of_unconstrained_length_rejected_even_when_permitted() {
        let dict = Dictionary::embedded();
        assert!(parse_unbracketed("^77test", &dict, true).is_err());
    }

    #[test]
    fn embedded_fnc1_inside_fixed_length_value_is_rejected() {
        let dict = Dictionary::embedded();
        let err = parse_unbracketed("^0112^45678901234", &dict, false).unwrap_err();
        assert!(matches!(err, Gs1Error::FncCharInAiValue { .. }));
    }

    #[test]
    fn trailing_fnc1_after_variable_ai_is_tolerated() {
        let dict = Dictionary::embedded();
        assert!(parse_unbracketed("^10ABC123", &dict, false).is_ok());
    }

    #[test]
    fn illegal_month_surfaces_linter_markup() {
        let dict = Dictionary::embedded();
        let err = parse_unbracketed("^11131313", &dict, false).unwrap_err();
        match err {
            Gs1Error::LinterFailed { markup, .. } => assert_eq!(markup, "(11)13|13|13"),
            other => panic!("expected LinterFailed, got {other:?}"),
        }
    }
}
