//! §3 AI definition and component specification records.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::charset::AiComponentKind;
use crate::linters::LinterFn;

/// Tri-state DL-query-attribute eligibility carried by every AI definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum DlDataAttr {
    /// Never valid as a DL query-string attribute.
    None = 0,
    /// Always valid as a DL query-string attribute.
    Yes = 1,
    /// A vivified (unknown-but-plausible) AI: conditionally valid, subject
    /// to the `UNKNOWN_AI_NOT_DL_ATTR` validation.
    Unknown = 2,
}

/// One component of an AI's value, e.g. the 13-digit numeric body of a
/// GTIN, or the variable-length CSET-82 tail of a lot number.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentSpec {
    pub kind: AiComponentKind,
    pub min_len: usize,
    pub max_len: usize,
    pub optional: bool,
    pub linters: Vec<LinterFn>,
}

impl ComponentSpec {
    pub fn is_variable_length(&self) -> bool {
        self.min_len != self.max_len
    }
}

/// An immutable AI dictionary entry (§3 "AI definition").
#[derive(Debug, Clone, PartialEq)]
pub struct AiDefinition {
    /// 2-4 ASCII digits.
    pub ai: String,
    /// Whether a following FNC1 is required when this AI is variable length.
    pub fnc1: bool,
    pub dl_data_attr: DlDataAttr,
    pub components: Vec<ComponentSpec>,
    /// Whitespace-joined attribute string, e.g. `"dlpkey=22,10,21 req=11"`.
    pub attrs: String,
    pub title: String,
}

impl AiDefinition {
    pub fn min_total_length(&self) -> usize {
        self.components.iter().map(|c| c.min_len).sum()
    }

    pub fn max_total_length(&self) -> usize {
        self.components.iter().map(|c| c.max_len).sum()
    }

    pub fn is_fixed_length(&self) -> bool {
        self.min_total_length() == self.max_total_length()
    }

    pub fn requires_fnc1(&self) -> bool {
        self.fnc1 && !self.is_fixed_length()
    }

    /// `attrs` tokens, whitespace separated.
    pub fn attr_tokens(&self) -> impl Iterator<Item = &str> {
        self.attrs.split_whitespace()
    }

    pub fn attr_value(&self, key: &str) -> Option<&str> {
        self.attr_tokens().find_map(|tok| {
            let (k, v) = tok.split_once('=')?;
            (k == key).then_some(v)
        })
    }

    pub fn has_bare_attr(&self, key: &str) -> bool {
        self.attr_tokens().any(|tok| tok == key)
    }

    pub fn is_dlpkey(&self) -> bool {
        self.attr_tokens().any(|tok| tok == "dlpkey" || tok.starts_with("dlpkey="))
    }

    /// The `dlpkey=q1,q2|q3` qualifier-sequence alternatives, each split
    /// into its comma-separated AI list.
    pub fn dlpkey_qualifier_groups(&self) -> Vec<Vec<&str>> {
        match self.attr_value("dlpkey") {
            Some(spec) => spec.split('|').map(|seq| seq.split(',').collect()).collect(),
            None => vec![],
        }
    }

    /// The `ex=a,b,c` mutex list.
    pub fn mutex_patterns(&self) -> Vec<&str> {
        self.attr_value("ex").map(|s| s.split(',').collect()).unwrap_or_default()
    }

    /// The `req=g1+g2,g3+g4` requisite groups: outer list is alternatives,
    /// inner list is a `+`-joined group that must be fully present.
    pub fn requisite_groups(&self) -> Vec<Vec<&str>> {
        match self.attr_value("req") {
            Some(spec) => spec.split(',').map(|g| g.split('+').collect()).collect(),
            None => vec![],
        }
    }

    /// Validate the table invariants from §3: only the last component may
    /// be variable-length; a mandatory component cannot follow an optional
    /// one; components are `<= 5`.
    pub fn validate_shape(&self) -> bool {
        if self.components.len() > 5 {
            return false;
        }
        let mut seen_optional = false;
        for (i, c) in self.components.iter().enumerate() {
            if c.is_variable_length() && i != self.components.len() - 1 {
                return false;
            }
            if seen_optional && !c.optional {
                return false;
            }
            seen_optional |= c.optional;
        }
        true
    }
}
