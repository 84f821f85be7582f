//! §4.1 AI dictionary: build, index and look up the definition table.

pub mod definition;
pub mod embedded;
pub mod text;

use std::collections::HashMap;
use std::sync::Arc;

use crate::charset::AiComponentKind;
use crate::dictionary::definition::{AiDefinition, ComponentSpec, DlDataAttr};
use crate::error::Gs1Error;

/// A fully built, indexed AI table plus its derived lookup structures.
///
/// Immutable once constructed; cheap to clone (`Arc`-backed) so that a
/// [`crate::context::Gs1Context`] can own one without forcing every context
/// to rebuild it. `Dictionary::embedded()` memoises the embedded table in a
/// process-wide `OnceLock` because it never changes and is read-only —
/// not because contexts share mutable state (they don't, see `spec.md` §5).
#[derive(Clone)]
pub struct Dictionary(Arc<Inner>);

struct Inner {
    entries: Vec<AiDefinition>,
    /// Maps a 2-digit prefix to the AI digit-length shared by every AI
    /// beginning with it (`spec.md` §3 invariant).
    length_by_prefix: [Option<usize>; 100],
    /// Sorted whitespace-joined key/qualifier sequences, e.g. `"01 10 21"`.
    dl_key_qualifiers: Vec<String>,
}

impl Dictionary {
    /// Build from the embedded static table (§4.1.1 source 1). Cached after
    /// the first call.
    pub fn embedded() -> Dictionary {
        static CACHE: std::sync::OnceLock<Dictionary> = std::sync::OnceLock::new();
        CACHE
            .get_or_init(|| Dictionary::build(embedded::table()).expect("embedded AI table is well-formed"))
            .clone()
    }

    /// Build from a syntax-dictionary text source (§4.1.1 source 2, §6
    /// format). On a parse failure the caller may fall back to
    /// [`Dictionary::embedded`] per the spec's "may fall back" language.
    pub fn load_str(text: &str) -> Result<Dictionary, Gs1Error> {
        let entries = self::text::parse(text)?;
        Dictionary::build(entries)
    }

    pub fn load_path(path: &std::path::Path) -> Result<Dictionary, Gs1Error> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Gs1Error::AiTableUnreadable(e.to_string()))?;
        Dictionary::load_str(&text)
    }

    fn build(mut entries: Vec<AiDefinition>) -> Result<Dictionary, Gs1Error> {
        entries.sort_by(|a, b| a.ai.cmp(&b.ai));

        let mut length_by_prefix: [Option<usize>; 100] = [None; 100];
        for e in &entries {
            let prefix: usize = e.ai[..2].parse().unwrap();
            let len = e.ai.len();
            match length_by_prefix[prefix] {
                Some(existing) if existing != len => {
                    return Err(Gs1Error::AiTableBrokenPrefixesDifferInLength {
                        prefix: e.ai[..2].to_string(),
                    });
                }
                _ => length_by_prefix[prefix] = Some(len),
            }
        }

        let dl_key_qualifiers = precompute_key_qualifiers(&entries);

        Ok(Dictionary(Arc::new(Inner {
            entries,
            length_by_prefix,
            dl_key_qualifiers,
        })))
    }

    pub fn entries(&self) -> &[AiDefinition] {
        &self.0.entries
    }

    pub fn length_for_prefix(&self, prefix: &str) -> Option<usize> {
        prefix.parse::<usize>().ok().and_then(|p| self.0.length_by_prefix.get(p).copied().flatten())
    }

    /// Exact lookup of a known table entry by its full AI digits, without
    /// vivification. Used by the validator pipeline, which only cares about
    /// attributes declared on entries already in the table.
    pub fn find_exact_pub(&self, ai: &str) -> Option<&AiDefinition> {
        self.find_exact(ai)
    }

    fn find_exact(&self, ai: &str) -> Option<&AiDefinition> {
        self.0
            .entries
            .binary_search_by(|e| e.ai.as_str().cmp(ai))
            .ok()
            .map(|i| &self.0.entries[i])
    }

    /// §4.1.2 `lookup(prefix, requested_len)`.
    ///
    /// `requested_len == 0` performs a prefix search over `data` (the data
    /// stream begins with the AI digits followed immediately by the
    /// value); `requested_len >= 2` performs an exact lookup requiring both
    /// AI digits and AI *string* length to match.
    pub fn lookup(&self, data: &str, requested_len: usize, permit_unknown_ais: bool) -> Result<Option<LookupResult<'_>>, Gs1Error> {
        if requested_len == 0 {
            self.lookup_prefix(data, permit_unknown_ais)
        } else {
            Ok(self
                .find_exact(&data[..requested_len.min(data.len())])
                .filter(|e| e.ai.len() == requested_len)
                .filter(|e| !self.longer_ai_is_prefix_conflict(&e.ai))
                .map(LookupResult::Known))
        }
    }

    fn longer_ai_is_prefix_conflict(&self, ai: &str) -> bool {
        self.0
            .entries
            .iter()
            .any(|e| e.ai.len() > ai.len() && e.ai.starts_with(ai))
    }

    fn lookup_prefix(&self, data: &str, permit_unknown_ais: bool) -> Result<Option<LookupResult<'_>>, Gs1Error> {
        for len in 2..=4.min(data.len()) {
            if let Some(entry) = self.find_exact(&data[..len]) {
                if self
                    .length_for_prefix(&data[..2])
                    .is_some_and(|configured| configured != entry.ai.len())
                {
                    return Err(Gs1Error::UnrecognisedAi { digits: data[..len].to_string() });
                }
                return Ok(Some(LookupResult::Known(entry)));
            }
        }

        if !permit_unknown_ais {
            return Ok(None);
        }

        self.vivify(data)
    }

    /// §4.1.2 vivification of an unknown-but-plausible AI.
    fn vivify(&self, data: &str) -> Result<Option<LookupResult<'_>>, Gs1Error> {
        let digit_run = data.bytes().take_while(u8::is_ascii_digit).count().min(4);
        if digit_run < 2 {
            return Ok(None);
        }
        for len in (2..=digit_run).rev() {
            let candidate = &data[..len];
            if self.0.entries.iter().any(|e| e.ai.len() > len && e.ai.starts_with(candidate)) {
                // A longer known AI shares this prefix: not plausible as a
                // standalone vivified AI at this length.
                continue;
            }
            let prefix_len = self.length_for_prefix(&candidate[..2]);
            if let Some(fixed_len) = prefix_len {
                if fixed_len != len {
                    continue;
                }
            }
            let synthetic = synthetic_definition(candidate, prefix_len);
            return Ok(Some(LookupResult::Vivified(synthetic)));
        }
        Ok(None)
    }

    /// §4.1.3 `is_valid_dl_path_ai_sequence`.
    pub fn is_valid_dl_path_ai_sequence(&self, seq: &str) -> bool {
        self.0.dl_key_qualifiers.binary_search_by(|s| s.as_str().cmp(seq)).is_ok()
    }

    /// Every precomputed key/qualifier sequence beginning with `key`,
    /// longest first, for the "select the longest satisfied sequence" rule
    /// in §4.4.2.
    pub fn sequences_for_key(&self, key: &str) -> Vec<&str> {
        let mut matches: Vec<&str> = self
            .0
            .dl_key_qualifiers
            .iter()
            .map(String::as_str)
            .filter(|s| *s == key || s.starts_with(&format!("{key} ")))
            .collect();
        matches.sort_by_key(|b| std::cmp::Reverse(b.split_whitespace().count()));
        matches
    }

    pub fn is_dl_primary_key(&self, ai: &str) -> bool {
        self.0.dl_key_qualifiers.iter().any(|s| s.split_whitespace().next() == Some(ai))
    }

    /// Exact lookup by fully-known AI digits (as found in a DL path or query
    /// segment, where the value is already delimited by `/` or `&`), with
    /// vivification when `permit_unknown_ais` is on. Unlike [`lookup`], the
    /// caller has no trailing value bytes to scan for a digit run.
    pub fn lookup_ai(&self, ai: &str, permit_unknown_ais: bool) -> Result<Option<LookupResult<'_>>, Gs1Error> {
        if let Some(entry) = self.find_exact(ai) {
            if self.longer_ai_is_prefix_conflict(ai) {
                return Ok(None);
            }
            return Ok(Some(LookupResult::Known(entry)));
        }
        if !permit_unknown_ais || !(2..=4).contains(&ai.len()) || !ai.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(None);
        }
        if self.0.entries.iter().any(|e| e.ai.len() > ai.len() && e.ai.starts_with(ai)) {
            return Ok(None);
        }
        let prefix_len = self.length_for_prefix(&ai[..2]);
        if let Some(fixed) = prefix_len {
            if fixed != ai.len() {
                return Ok(None);
            }
        }
        Ok(Some(LookupResult::Vivified(synthetic_definition(ai, prefix_len))))
    }
}

/// The outcome of a dictionary lookup: either a table entry, or a
/// synthetic vivified definition (owned, since it does not live in the
/// table).
pub enum LookupResult<'a> {
    Known(&'a AiDefinition),
    Vivified(AiDefinition),
}

impl<'a> LookupResult<'a> {
    pub fn definition(&self) -> &AiDefinition {
        match self {
            LookupResult::Known(d) => d,
            LookupResult::Vivified(d) => d,
        }
    }

    pub fn is_vivified(&self) -> bool {
        matches!(self, LookupResult::Vivified(_))
    }
}

fn synthetic_definition(ai: &str, fixed_len: Option<usize>) -> AiDefinition {
    let component = match fixed_len {
        Some(total) if total > ai.len() => ComponentSpec {
            kind: AiComponentKind::Cset82,
            min_len: total - ai.len(),
            max_len: total - ai.len(),
            optional: false,
            linters: vec![],
        },
        _ => ComponentSpec {
            kind: AiComponentKind::Cset82,
            min_len: 1,
            max_len: 90,
            optional: false,
            linters: vec![],
        },
    };
    AiDefinition {
        ai: ai.to_string(),
        fnc1: component.is_variable_length(),
        dl_data_attr: DlDataAttr::Unknown,
        components: vec![component],
        attrs: String::new(),
        title: String::from("UNKNOWN"),
    }
}

fn precompute_key_qualifiers(entries: &[AiDefinition]) -> Vec<String> {
    let by_ai: HashMap<&str, &AiDefinition> = entries.iter().map(|e| (e.ai.as_str(), e)).collect();
    let mut sequences = Vec::new();
    for e in entries {
        if !e.is_dlpkey() {
            continue;
        }
        for group in e.dlpkey_qualifier_groups() {
            let group: Vec<&str> = group.into_iter().filter(|q| by_ai.contains_key(q)).collect();
            for subset_mask in 0u32..(1 << group.len()) {
                let mut parts = vec![e.ai.as_str()];
                for (i, q) in group.iter().enumerate() {
                    if subset_mask & (1 << i) != 0 {
                        parts.push(q);
                    }
                }
                sequences.push(parts.join(" "));
            }
        }
        if e.dlpkey_qualifier_groups().is_empty() {
            sequences.push(e.ai.clone());
        }
    }
    sequences.sort();
    sequences.dedup();
    sequences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_builds_without_error() {
        let dict = Dictionary::embedded();
        assert!(dict.entries().iter().any(|e| e.ai == "01"));
    }

    #[test]
    fn gtin_key_qualifier_subsets_are_all_present() {
        let dict = Dictionary::embedded();
        for seq in ["01", "01 22", "01 10", "01 21", "01 22 10", "01 10 21", "01 22 10 21"] {
            assert!(dict.is_valid_dl_path_ai_sequence(seq), "missing sequence {seq}");
        }
    }

    #[test]
    fn longest_sequence_first() {
        let dict = Dictionary::embedded();
        let seqs = dict.sequences_for_key("01");
        assert_eq!(seqs[0], "01 22 10 21");
    }

    #[test]
    fn exact_lookup_requires_matching_length() {
        let dict = Dictionary::embedded();
        assert!(matches!(dict.lookup("01", 2, false), Ok(Some(LookupResult::Known(_)))));
        assert!(matches!(dict.lookup("011234", 2, false), Ok(Some(_))));
    }

    #[test]
    fn vivification_respects_permit_flag() {
        let dict = Dictionary::embedded();
        assert!(dict.lookup("7799ABC", 0, false).unwrap().is_none());
        let vivified = dict.lookup("7799ABC", 0, true).unwrap();
        assert!(vivified.unwrap().is_vivified());
    }
}
