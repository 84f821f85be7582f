//! §4.5 validator pipeline: cross-AI rules run once over the full extracted
//! AI list, in a fixed order that is itself part of the observable contract.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ai_value::{AiValue, AiValueKind};
use crate::dictionary::Dictionary;
use crate::error::Gs1Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ValidationId {
    MutexAis = 0,
    RequisiteAis = 1,
    RepeatedAis = 2,
    DigsigSerialKey = 3,
    UnknownAiNotDlAttr = 4,
}

impl ValidationId {
    pub const ALL: [ValidationId; 5] = [
        ValidationId::MutexAis,
        ValidationId::RequisiteAis,
        ValidationId::RepeatedAis,
        ValidationId::DigsigSerialKey,
        ValidationId::UnknownAiNotDlAttr,
    ];

    /// Per §4.5: `MUTEX_AIS`, `REPEATED_AIS` and `DIGSIG_SERIAL_KEY` cannot
    /// be disabled by a caller.
    pub fn is_locked(self) -> bool {
        matches!(self, ValidationId::MutexAis | ValidationId::RepeatedAis | ValidationId::DigsigSerialKey)
    }
}

/// One row per [`ValidationId`], in declaration order, indexed by
/// discriminant rather than a string-keyed map (`spec.md` §3 "fixed, ordered
/// list").
#[derive(Debug, Clone, Copy)]
pub struct ValidationTable {
    enabled: [bool; 5],
}

impl Default for ValidationTable {
    fn default() -> Self {
        ValidationTable { enabled: [true; 5] }
    }
}

impl ValidationTable {
    pub fn is_enabled(&self, id: ValidationId) -> bool {
        self.enabled[id as usize]
    }

    /// Returns `Err(Gs1Error::InvalidOption)` when attempting to disable a
    /// locked validation.
    pub fn set_enabled(&mut self, id: ValidationId, enabled: bool) -> Result<(), Gs1Error> {
        if id.is_locked() && !enabled {
            return Err(Gs1Error::InvalidOption);
        }
        self.enabled[id as usize] = enabled;
        Ok(())
    }
}

/// Run the pipeline in §4.5's declared order, stopping at (and returning)
/// the first failure.
pub fn run(dict: &Dictionary, message: &str, values: &[AiValue], table: &ValidationTable) -> Result<(), Gs1Error> {
    let mut sorted: Vec<&AiValue> = values.iter().filter(|v| v.kind == AiValueKind::AiValue).collect();
    sorted.sort_by_key(|v| v.ai(message));

    for id in ValidationId::ALL {
        if !table.is_enabled(id) {
            continue;
        }
        match id {
            ValidationId::MutexAis => mutex_ais(dict, message, &sorted)?,
            ValidationId::RequisiteAis => requisite_ais(dict, message, &sorted)?,
            ValidationId::RepeatedAis => repeated_ais(message, &sorted)?,
            ValidationId::DigsigSerialKey => digsig_serial_key(dict, message, &sorted)?,
            ValidationId::UnknownAiNotDlAttr => unknown_ai_not_dl_attr(dict, message, values)?,
        }
    }
    Ok(())
}

/// A dictionary `ex=` pattern may end in a run of `n` wildcards standing in
/// for the trailing digits of the AI, e.g. `255n` matches `2550`..`2559`.
fn pattern_matches(pattern: &str, ai: &str) -> bool {
    let fixed = pattern.trim_end_matches('n');
    ai.len() == pattern.len() && ai.starts_with(fixed)
}

fn mutex_ais(dict: &Dictionary, message: &str, sorted: &[&AiValue]) -> Result<(), Gs1Error> {
    for v in sorted {
        let ai = v.ai(message);
        let Some(def) = dict.find_exact_pub(ai) else { continue };
        for pattern in def.mutex_patterns() {
            for other in sorted {
                let other_ai = other.ai(message);
                if other_ai == ai {
                    continue;
                }
                if pattern_matches(pattern, other_ai) {
                    return Err(Gs1Error::MutexViolation {
                        ai: ai.to_string(),
                        other: other_ai.to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}

fn requisite_ais(dict: &Dictionary, message: &str, sorted: &[&AiValue]) -> Result<(), Gs1Error> {
    let present: std::collections::HashSet<&str> = sorted.iter().map(|v| v.ai(message)).collect();
    for v in sorted {
        let ai = v.ai(message);
        let Some(def) = dict.find_exact_pub(ai) else { continue };
        let groups = def.requisite_groups();
        if groups.is_empty() {
            continue;
        }
        let satisfied = groups.iter().any(|group| group.iter().all(|req| present.contains(req)));
        if !satisfied {
            let rendered = groups
                .iter()
                .map(|g| g.join("+"))
                .collect::<Vec<_>>()
                .join(",");
            return Err(Gs1Error::RequisiteNotSatisfied { ai: ai.to_string(), groups: rendered });
        }
    }
    Ok(())
}

fn repeated_ais(message: &str, sorted: &[&AiValue]) -> Result<(), Gs1Error> {
    for pair in sorted.windows(2) {
        let [a, b] = pair else { continue };
        if a.ai(message) == b.ai(message) && a.value(message) != b.value(message) {
            return Err(Gs1Error::RepeatedAiMismatch { ai: a.ai(message).to_string() });
        }
    }
    Ok(())
}

fn digsig_serial_key(dict: &Dictionary, message: &str, sorted: &[&AiValue]) -> Result<(), Gs1Error> {
    if !sorted.iter().any(|v| v.ai(message) == "8030") {
        return Ok(());
    }
    for ai in ["253", "255", "8003"] {
        if let Some(v) = sorted.iter().find(|v| v.ai(message) == ai) {
            let Some(def) = dict.find_exact_pub(ai) else { continue };
            let has_serial = def.components.len() > 1
                && def.components[1].optional
                && v.value(message).len() > def.components[0].min_len;
            if !has_serial {
                return Err(Gs1Error::DigsigSerialKeyMissing { ai: ai.to_string() });
            }
        }
    }
    Ok(())
}

/// A vivified (unknown) AI may not appear as a DL query-string attribute.
/// Path AIs and AIs resolved to a real table entry are unaffected; data that
/// did not come from a Digital Link URI at all (no value carries a path
/// position) has no DL attributes to check.
fn unknown_ai_not_dl_attr(dict: &Dictionary, message: &str, values: &[AiValue]) -> Result<(), Gs1Error> {
    let is_dl = values.iter().any(|v| v.dl_path_order >= 0);
    if !is_dl {
        return Ok(());
    }
    for v in values {
        if v.kind != AiValueKind::AiValue || v.dl_path_order != crate::ai_value::DL_PATH_ATTRIBUTE {
            continue;
        }
        let ai = v.ai(message);
        if dict.find_exact_pub(ai).is_none() {
            return Err(Gs1Error::UnknownAiNotDlAttr { ai: ai.to_string() });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary::Dictionary;
    use crate::element_string::parse_bracketed;

    #[test]
    fn requisite_ais_requires_a_satisfied_group() {
        let dict = Dictionary::embedded();
        let (message, values) = parse_bracketed("(21)SERIAL1", &dict, false).unwrap();
        let err = run(&dict, &message, &values, &ValidationTable::default()).unwrap_err();
        assert!(matches!(err, Gs1Error::RequisiteNotSatisfied { .. }));
    }

    #[test]
    fn requisite_ais_passes_when_key_present() {
        let dict = Dictionary::embedded();
        let (message, values) = parse_bracketed("(01)12345678901231(21)SERIAL1", &dict, false).unwrap();
        assert!(run(&dict, &message, &values, &ValidationTable::default()).is_ok());
    }

    #[test]
    fn locked_validation_cannot_be_disabled() {
        let mut table = ValidationTable::default();
        assert!(table.set_enabled(ValidationId::MutexAis, false).is_err());
        assert!(table.set_enabled(ValidationId::RequisiteAis, false).is_ok());
    }

    #[test]
    fn mutex_ais_rejects_single_origin_with_full_process_chain() {
        let dict = Dictionary::embedded();
        let (message, values) = parse_bracketed("(422)840(426)276", &dict, false).unwrap();
        let err = run(&dict, &message, &values, &ValidationTable::default()).unwrap_err();
        assert!(matches!(err, Gs1Error::MutexViolation { .. }));
    }

    #[test]
    fn repeated_ai_with_differing_values_is_rejected() {
        let dict = Dictionary::embedded();
        let (message, mut values) = parse_bracketed("(10)BATCH1", &dict, false).unwrap();
        let mut second = values[0].clone();
        second.value_start = message.len();
        values.push(second);
        let mut message = message;
        message.push_str("BATCH2");
        let err = run(&dict, &message, &values, &ValidationTable::default()).unwrap_err();
        assert!(matches!(err, Gs1Error::RepeatedAiMismatch { .. }));
    }
}
