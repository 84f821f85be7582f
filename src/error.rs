//! The closed error enumeration described in `spec.md` §7.
//!
//! Every fallible operation returns `Result<_, Gs1Error>`. On failure the
//! caller-visible state (message buffer, extracted AI list) has already been
//! reset by the site that produced the error; `Gs1Error` itself carries only
//! the diagnostic, never a recovery handle.

use std::fmt;

use crate::linters::LinterError;

/// Positions of the offending slice within a value, used to build the
/// `(AI)<before>|<bad>|<after>` markup string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorMarkupSpan {
    pub start: usize,
    pub len: usize,
}

/// The closed set of failure kinds this implementation produces, spanning
/// dictionary construction, element-string parsing, Digital Link parsing and
/// generation, scan-data decoding and the validator pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Gs1Error {
    // --- §4.1 dictionary ---
    AiTableBrokenPrefixesDifferInLength { prefix: String },
    AiTableEntryTooLong,
    AiTableUnknownLinter { name: String, ai: String },
    AiTableInvalidRange,
    AiTableUnreadable(String),
    AiTableNoSource,

    // --- §4.2 linters ---
    LinterFailed {
        ai: String,
        err: LinterError,
        markup: String,
    },

    // --- §4.3 element string ---
    AiDataEmpty,
    UnknownAiUnknownLength { ai: String },
    UnrecognisedAi { digits: String },
    AiValueTooLong { ai: String },
    AiValueTooShort { ai: String },
    MissingFnc1Separator { ai: String },
    FncCharInAiValue { ai: String },
    ParenCountMismatch,
    AiTooLong,
    AiTooShort,
    DataTooLong,

    // --- §4.4 Digital Link ---
    UriIllegalCharacters,
    UriBadScheme,
    UriNoAuthority,
    UriNoDlPrimaryKey,
    UriPathAiNotFound { digits: String },
    UriUnknownDlAttribute { ai: String },
    UriInvalidKeyQualifierSequence,
    UriDuplicateAi { ai: String },
    UriAttributeShouldBeInPath { ai: String },
    UriQueryNonDigitKeyMissingValue,
    UriEndsWithSlash,
    UriComponentLengthInvalid { ai: String },
    UriFnc1InValue { ai: String },
    NoPrimaryKeyToGenerate,
    AttributeNotValidDlDataAttr { ai: String },

    // --- §4.5 validator pipeline ---
    MutexViolation { ai: String, other: String },
    RequisiteNotSatisfied { ai: String, groups: String },
    RepeatedAiMismatch { ai: String },
    DigsigSerialKeyMissing { ai: String },
    UnknownAiNotDlAttr { ai: String },

    // --- §4.6 scan data ---
    UnrecognisedSymbologyIdentifier,
    ScanDataTooShort,
    EanUpcBadParity,
    EanUpcBadLength,
    DataBarLimitedGtinExceedsCap,

    // --- general / surface ---
    DataTooLongForBuffer,
    NoDataSet,
    InvalidOption,
}

impl fmt::Display for Gs1Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AiTableBrokenPrefixesDifferInLength { prefix } => write!(
                f,
                "AI table is broken: AIs starting {prefix} differ in length"
            ),
            Self::AiTableEntryTooLong => write!(f, "AI table entry exceeds 150 bytes"),
            Self::AiTableUnknownLinter { name, ai } => {
                write!(f, "unknown linter `{name}` referenced by AI ({ai})")
            }
            Self::AiTableInvalidRange => write!(f, "invalid AI range in syntax dictionary"),
            Self::AiTableUnreadable(msg) => write!(f, "cannot read syntax dictionary: {msg}"),
            Self::AiTableNoSource => write!(f, "no AI table source available"),
            Self::LinterFailed { ai, err, .. } => write!(f, "AI ({ai}): {err}"),
            Self::AiDataEmpty => write!(f, "AI data is empty"),
            Self::UnknownAiUnknownLength { ai } => write!(
                f,
                "AI ({ai}) is unknown and of unknown length; cannot appear in unbracketed data"
            ),
            Self::UnrecognisedAi { digits } => write!(f, "unrecognised AI ({digits})"),
            Self::AiValueTooLong { ai } => write!(f, "value for AI ({ai}) is too long"),
            Self::AiValueTooShort { ai } => write!(f, "value for AI ({ai}) is too short"),
            Self::MissingFnc1Separator { ai } => {
                write!(f, "AI ({ai}) requires a FNC1 separator after its value")
            }
            Self::FncCharInAiValue { ai } => {
                write!(f, "value for AI ({ai}) contains an embedded FNC1 character")
            }
            Self::ParenCountMismatch => write!(f, "mismatched parentheses in bracketed AI data"),
            Self::AiTooLong => write!(f, "AI is too long"),
            Self::AiTooShort => write!(f, "AI is too short"),
            Self::DataTooLong => write!(f, "data exceeds the maximum permitted length"),
            Self::UriIllegalCharacters => write!(f, "URI contains illegal characters"),
            Self::UriBadScheme => write!(f, "URI has an invalid or mixed-case scheme"),
            Self::UriNoAuthority => write!(f, "URI is missing its authority"),
            Self::UriNoDlPrimaryKey => write!(f, "no GS1 Digital Link primary key found in URI path"),
            Self::UriPathAiNotFound { digits } => {
                write!(f, "AI ({digits}) in URI path is not recognised")
            }
            Self::UriUnknownDlAttribute { ai } => {
                write!(f, "AI ({ai}) is not a valid DL data attribute")
            }
            Self::UriInvalidKeyQualifierSequence => {
                write!(f, "URI path is not a valid key/qualifier sequence")
            }
            Self::UriDuplicateAi { ai } => write!(f, "duplicate AI ({ai})"),
            Self::UriAttributeShouldBeInPath { ai } => {
                write!(f, "AI ({ai}) should be in path info")
            }
            Self::UriQueryNonDigitKeyMissingValue => {
                write!(f, "non-numeric query key is missing a value")
            }
            Self::UriEndsWithSlash => write!(f, "URI path must not end with `/`"),
            Self::UriComponentLengthInvalid { ai } => {
                write!(f, "value for AI ({ai}) has an invalid length")
            }
            Self::UriFnc1InValue { ai } => {
                write!(f, "value for AI ({ai}) decodes to contain a FNC1 character")
            }
            Self::NoPrimaryKeyToGenerate => {
                write!(f, "no DL primary key AI is present; cannot generate a URI")
            }
            Self::AttributeNotValidDlDataAttr { ai } => {
                write!(f, "AI ({ai}) is not a valid DL data attribute")
            }
            Self::MutexViolation { ai, other } => {
                write!(f, "it is invalid to pair ({ai}) with ({other})")
            }
            Self::RequisiteNotSatisfied { ai, groups } => write!(
                f,
                "required AIs for ({ai}) not satisfied: {groups}"
            ),
            Self::RepeatedAiMismatch { ai } => {
                write!(f, "AI ({ai}) is repeated with differing values")
            }
            Self::DigsigSerialKeyMissing { ai } => write!(
                f,
                "AI (8030) requires a serial component in ({ai})"
            ),
            Self::UnknownAiNotDlAttr { ai } => {
                write!(f, "vivified AI ({ai}) may not appear as a DL URI attribute")
            }
            Self::UnrecognisedSymbologyIdentifier => {
                write!(f, "unrecognised AIM symbology identifier")
            }
            Self::ScanDataTooShort => write!(f, "scan data is too short"),
            Self::EanUpcBadParity => write!(f, "EAN/UPC check digit is incorrect"),
            Self::EanUpcBadLength => write!(f, "EAN/UPC data has an invalid length"),
            Self::DataBarLimitedGtinExceedsCap => {
                write!(f, "GTIN exceeds the GS1 DataBar Limited primary value cap (19999999999999)")
            }
            Self::DataTooLongForBuffer => write!(f, "data exceeds the internal buffer capacity"),
            Self::NoDataSet => write!(f, "no data has been set on this context"),
            Self::InvalidOption => write!(f, "invalid option value"),
        }
    }
}

impl std::error::Error for Gs1Error {}

impl Gs1Error {
    /// Build the `"(AI)<before>|<bad>|<after>"` markup string for a linter
    /// failure, translating the linter's component-relative position into
    /// the coordinates of the full value.
    pub fn markup_for_linter(ai: &str, value: &str, span: ErrorMarkupSpan) -> String {
        let start = span.start.min(value.len());
        let end = (span.start + span.len).min(value.len());
        format!(
            "({ai}){before}|{bad}|{after}",
            before = &value[..start],
            bad = &value[start..end],
            after = &value[end..],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markup_highlights_offending_span() {
        let markup = Gs1Error::markup_for_linter(
            "11",
            "131313",
            ErrorMarkupSpan { start: 2, len: 2 },
        );
        assert_eq!(markup, "(11)13|13|13");
    }
}
