//! The extracted AI value record (§3 "AI value (extracted)").
//!
//! Per the ownership note in `spec.md` §9 this crate takes option (a): the
//! canonical message is an owned `String` and every `AiValue` stores
//! `(start, len)` byte-offset pairs into it, resolved to `&str` on demand.

/// Sentinel for `dl_path_order`: "this AI came from the DL query string, or
/// is not part of a Digital Link at all".
pub const DL_PATH_ATTRIBUTE: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiValueKind {
    AiValue,
    CcSeparator,
    DlIgnored,
}

/// A single extracted AI (or the synthetic `|` composite separator, or an
/// ignored non-numeric DL query parameter), referencing slices of the
/// canonical message buffer.
#[derive(Debug, Clone)]
pub struct AiValue {
    pub kind: AiValueKind,
    pub ai_start: usize,
    pub ai_len: usize,
    pub value_start: usize,
    pub value_len: usize,
    /// Ascending position within the DL path, or [`DL_PATH_ATTRIBUTE`].
    pub dl_path_order: i32,
    /// Whether a variable-length AI requires a following FNC1 separator —
    /// cached from the dictionary definition at extraction time so callers
    /// don't need to re-look up the definition to rebuild the canonical
    /// message or decide HRI/bracketed formatting.
    pub requires_fnc1: bool,
}

impl AiValue {
    pub fn ai<'m>(&self, message: &'m str) -> &'m str {
        &message[self.ai_start..self.ai_start + self.ai_len]
    }

    pub fn value<'m>(&self, message: &'m str) -> &'m str {
        &message[self.value_start..self.value_start + self.value_len]
    }
}
