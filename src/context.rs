//! §4.7 surface API: `Gs1Context`, its options, and the public setter/getter
//! surface described in §6.

use crate::ai_value::{AiValue, AiValueKind};
use crate::dictionary::Dictionary;
use crate::digital_link;
use crate::element_string;
use crate::error::Gs1Error;
use crate::linters;
use crate::scan_data::{self, Symbology};
use crate::validators::{ValidationId, ValidationTable};

/// Compile-time cap on any single input string (`spec.md` §5).
pub const MAX_DATA_STR_LENGTH: usize = 8191;

#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub add_check_digit: bool,
    pub permit_unknown_ais: bool,
    pub permit_zero_suppressed_gtin_in_dl: bool,
    pub permit_convenience_alphas: bool,
    pub include_data_titles_in_hri: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            add_check_digit: false,
            permit_unknown_ais: false,
            permit_zero_suppressed_gtin_in_dl: false,
            permit_convenience_alphas: false,
            include_data_titles_in_hri: false,
        }
    }
}

/// What form the currently-held data arrived in, kept only to answer
/// `get_ai_data_str`/`get_dl_uri`/`get_scan_data` correctly (§4.7: some
/// readers "may return nothing when the data is not AI-based").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Ai,
    Plain,
}

struct Loaded {
    origin: Origin,
    message: String,
    values: Vec<AiValue>,
    dl_ignored: Vec<String>,
    scan_symbology: Option<Symbology>,
    scan_ai_mode: bool,
    scan_composite: Option<String>,
}

/// The sole externally observable state container (§6 "the instance is the
/// sole externally observable state container").
pub struct Gs1Context {
    dict: Dictionary,
    options: Options,
    validation: ValidationTable,
    loaded: Option<Loaded>,
    last_err: Option<Gs1Error>,
}

impl Gs1Context {
    pub fn new() -> Self {
        Gs1Context {
            dict: Dictionary::embedded(),
            options: Options::default(),
            validation: ValidationTable::default(),
            loaded: None,
            last_err: None,
        }
    }

    pub fn with_dictionary(dict: Dictionary) -> Self {
        Gs1Context {
            dict,
            options: Options::default(),
            validation: ValidationTable::default(),
            loaded: None,
            last_err: None,
        }
    }

    pub fn get_max_data_str_length(&self) -> usize {
        MAX_DATA_STR_LENGTH
    }

    // --- option setters ---

    pub fn set_add_check_digit(&mut self, on: bool) {
        self.options.add_check_digit = on;
    }

    pub fn set_permit_unknown_ais(&mut self, on: bool) {
        self.options.permit_unknown_ais = on;
    }

    pub fn set_permit_zero_suppressed_gtin_in_dl_uris(&mut self, on: bool) {
        self.options.permit_zero_suppressed_gtin_in_dl = on;
    }

    pub fn set_permit_convenience_alphas(&mut self, on: bool) {
        self.options.permit_convenience_alphas = on;
    }

    pub fn set_include_data_titles_in_hri(&mut self, on: bool) {
        self.options.include_data_titles_in_hri = on;
    }

    pub fn set_validation_enabled(&mut self, id: ValidationId, enabled: bool) -> Result<(), Gs1Error> {
        self.validation.set_enabled(id, enabled).inspect_err(|e| self.last_err = Some(e.clone()))
    }

    // --- transaction plumbing ---

    fn commit(&mut self, origin: Origin, message: String, values: Vec<AiValue>, dl_ignored: Vec<String>) -> Result<(), Gs1Error> {
        if let Err(e) = crate::validators::run(&self.dict, &message, &values, &self.validation) {
            self.reset(e.clone());
            return Err(e);
        }
        self.loaded = Some(Loaded {
            origin,
            message,
            values,
            dl_ignored,
            scan_symbology: None,
            scan_ai_mode: false,
            scan_composite: None,
        });
        self.last_err = None;
        Ok(())
    }

    fn reset(&mut self, err: Gs1Error) {
        self.loaded = None;
        self.last_err = Some(err);
    }

    fn fail(&mut self, err: Gs1Error) -> Result<(), Gs1Error> {
        self.reset(err.clone());
        Err(err)
    }

    // --- setters ---

    /// Accepts a raw canonical message, a GS1 Digital Link URI, or plain
    /// non-GS1 data, auto-detected by its leading characters (§4.7).
    pub fn set_data_str(&mut self, data: &str) -> Result<(), Gs1Error> {
        if data.len() > MAX_DATA_STR_LENGTH {
            return self.fail(Gs1Error::DataTooLongForBuffer);
        }
        if digital_link::has_uri_scheme_prefix(data) {
            return self.set_from_dl_uri(data);
        }
        if data.starts_with('^') {
            match element_string::parse_unbracketed(data, &self.dict, self.options.permit_unknown_ais) {
                Ok(values) => self.commit(Origin::Ai, data.to_string(), values, Vec::new()),
                Err(e) => self.fail(e),
            }
        } else {
            self.commit(Origin::Plain, data.to_string(), Vec::new(), Vec::new())
        }
    }

    /// Accepts bracketed AI data, e.g. `(01)12345678901231(10)ABC123`.
    pub fn set_ai_data_str(&mut self, data: &str) -> Result<(), Gs1Error> {
        if data.len() > MAX_DATA_STR_LENGTH {
            return self.fail(Gs1Error::DataTooLongForBuffer);
        }
        let prepared = if self.options.add_check_digit {
            match add_missing_check_digits(&self.dict, data) {
                Ok(s) => s,
                Err(e) => return self.fail(e),
            }
        } else {
            data.to_string()
        };
        match element_string::parse_bracketed(&prepared, &self.dict, self.options.permit_unknown_ais) {
            Ok((message, values)) => self.commit(Origin::Ai, message, values, Vec::new()),
            Err(e) => self.fail(e),
        }
    }

    fn set_from_dl_uri(&mut self, uri: &str) -> Result<(), Gs1Error> {
        match digital_link::parse(
            uri,
            &self.dict,
            self.options.permit_unknown_ais,
            self.options.permit_zero_suppressed_gtin_in_dl,
            self.options.permit_convenience_alphas,
        ) {
            Ok(parsed) => self.commit(Origin::Ai, parsed.message, parsed.values, parsed.dl_ignored),
            Err(e) => self.fail(e),
        }
    }

    pub fn set_scan_data(&mut self, data: &str) -> Result<(), Gs1Error> {
        if data.len() > MAX_DATA_STR_LENGTH {
            return self.fail(Gs1Error::DataTooLongForBuffer);
        }
        match scan_data::decode(
            data,
            &self.dict,
            self.options.permit_unknown_ais,
            self.options.permit_convenience_alphas,
        ) {
            Ok(decoded) => {
                let origin = if decoded.values.is_empty() { Origin::Plain } else { Origin::Ai };
                if let Err(e) = crate::validators::run(&self.dict, &decoded.message, &decoded.values, &self.validation) {
                    return self.fail(e);
                }
                self.loaded = Some(Loaded {
                    origin,
                    message: decoded.message,
                    values: decoded.values,
                    dl_ignored: Vec::new(),
                    scan_symbology: Some(decoded.symbology),
                    scan_ai_mode: decoded.ai_mode,
                    scan_composite: decoded.composite,
                });
                self.last_err = None;
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    // --- readers (never fail; return `None`/empty when not applicable) ---

    pub fn get_data_str(&self) -> Option<&str> {
        self.loaded.as_ref().map(|l| l.message.as_str())
    }

    pub fn get_ai_data_str(&self) -> Option<String> {
        let loaded = self.loaded.as_ref()?;
        if loaded.origin != Origin::Ai {
            return None;
        }
        Some(element_string::message_to_bracketed(&loaded.message, &loaded.values))
    }

    pub fn get_dl_uri(&self, stem: Option<&str>) -> Option<String> {
        let loaded = self.loaded.as_ref()?;
        if loaded.origin != Origin::Ai {
            return None;
        }
        digital_link::generate(&loaded.message, &loaded.values, &self.dict, stem).ok()
    }

    pub fn get_scan_data(&self) -> Option<String> {
        let loaded = self.loaded.as_ref()?;
        let symbology = loaded.scan_symbology?;
        if symbology.is_ean_upc() {
            let gtin14 = loaded.message.strip_prefix("^01")?;
            return scan_data::generate_ean_upc(gtin14, symbology).ok();
        }
        if !loaded.scan_ai_mode {
            return scan_data::generate_plain(&loaded.message, symbology).ok();
        }
        scan_data::generate_ai(&loaded.message, symbology, loaded.scan_composite.as_deref()).ok()
    }

    /// One line per extracted AI, `"(ai) value"` or, when
    /// `include_data_titles_in_hri` is set, `"TITLE (ai) value"`.
    pub fn get_hri(&self) -> Vec<String> {
        let Some(loaded) = self.loaded.as_ref() else { return Vec::new() };
        if loaded.origin != Origin::Ai {
            return Vec::new();
        }
        loaded
            .values
            .iter()
            .filter(|v| v.kind == AiValueKind::AiValue)
            .map(|v| {
                let ai = v.ai(&loaded.message);
                let value = v.value(&loaded.message);
                if self.options.include_data_titles_in_hri {
                    let title = self.dict.entries().iter().find(|e| e.ai == ai).map(|e| e.title.as_str()).unwrap_or("UNKNOWN");
                    format!("{title} ({ai}) {value}")
                } else {
                    format!("({ai}) {value}")
                }
            })
            .collect()
    }

    pub fn get_dl_ignored_query_params(&self) -> Vec<String> {
        self.loaded.as_ref().map(|l| l.dl_ignored.clone()).unwrap_or_default()
    }

    pub fn get_err_msg(&self) -> Option<String> {
        self.last_err.as_ref().map(|e| e.to_string())
    }

    pub fn get_err_markup(&self) -> Option<String> {
        match &self.last_err {
            Some(Gs1Error::LinterFailed { markup, .. }) => Some(markup.clone()),
            _ => None,
        }
    }
}

impl Default for Gs1Context {
    fn default() -> Self {
        Gs1Context::new()
    }
}

/// For `add_check_digit`: scans bracketed AI tokens and appends a missing
/// trailing check digit to any value that is exactly one character short of
/// a fixed-length AI whose last component is checked by
/// [`linters::gcp_mod10_check_digit`]. Tokenizing mirrors
/// `element_string::parse_bracketed`'s escaping rules.
fn add_missing_check_digits(dict: &Dictionary, input: &str) -> Result<String, Gs1Error> {
    let mut out = String::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c == '|' {
            chars.next();
            out.push('|');
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
            ai_digits.push(d);
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

        let value = match dict.find_exact_pub(&ai_digits) {
            Some(def) if def.is_fixed_length() && def.components.len() == 1 => {
                let last = &def.components[0];
                let has_mod10 = last.linters.iter().any(|l| *l as usize == linters::gcp_mod10_check_digit as usize);
                if has_mod10 && value.len() + 1 == def.min_total_length() {
                    append_computed_check_digit(&value)
                } else {
                    value
                }
            }
            _ => value,
        };

        out.push('(');
        out.push_str(&ai_digits);
        out.push(')');
        for c in value.chars() {
            if c == '(' {
                out.push('\\');
            }
            out.push(c);
        }
    }

    Ok(out)
}

/// Computes and appends a GS1 mod-10 check digit for a numeric body.
fn append_computed_check_digit(body: &str) -> String {
    let digits: Vec<u32> = body.chars().rev().filter_map(|c| c.to_digit(10)).collect();
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| d * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    let check = (10 - (sum % 10)) % 10;
    format!("{body}{check}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_1_dl_uri_parses_into_canonical_message() {
        let mut ctx = Gs1Context::new();
        ctx.set_data_str("https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426").unwrap();
        assert_eq!(ctx.get_data_str(), Some("^010952012345678810ABC1^2112345^17180426"));
        assert_eq!(
            ctx.get_hri(),
            vec!["(01) 09520123456788", "(10) ABC1", "(21) 12345", "(17) 180426"]
        );
    }

    #[test]
    fn scenario_2_bracketed_to_dl_uri() {
        let mut ctx = Gs1Context::new();
        ctx.set_ai_data_str("(01)12312312312326(22)ABC(10)DEF(21)GHI").unwrap();
        assert_eq!(
            ctx.get_dl_uri(None).as_deref(),
            Some("https://id.gs1.org/01/12312312312326/22/ABC/10/DEF/21/GHI")
        );
    }

    #[test]
    fn scenario_3_demotes_extra_keys_to_attributes() {
        let mut ctx = Gs1Context::new();
        ctx.set_ai_data_str("(253)9526064000028000001(99)000001(01)12312312312326(22)ABC(10)DEF(21)GHI(95)INT")
            .unwrap();
        assert_eq!(
            ctx.get_dl_uri(Some("https://example.com")).as_deref(),
            Some("https://example.com/253/9526064000028000001?01=12312312312326&99=000001&22=ABC&10=DEF&21=GHI&95=INT")
        );
    }

    #[test]
    fn scenario_4_scan_data_round_trip() {
        let mut ctx = Gs1Context::new();
        ctx.set_scan_data("]C1011231231231233310ABC123\u{1D}99TESTING").unwrap();
        assert_eq!(ctx.get_data_str(), Some("^011231231231233310ABC123^99TESTING"));
        assert_eq!(ctx.get_scan_data().as_deref(), Some("]C1011231231231233310ABC123\u{1D}99TESTING"));
    }

    #[test]
    fn scenario_5_illegal_month_fails_with_markup() {
        let mut ctx = Gs1Context::new();
        let err = ctx.set_ai_data_str("(01)95012345678903(11)131313").unwrap_err();
        assert!(matches!(err, Gs1Error::LinterFailed { .. }));
        assert_eq!(ctx.get_err_markup().as_deref(), Some("(11)13|13|13"));
        assert!(ctx.get_data_str().is_none());
    }

    #[test]
    fn scenario_6_attribute_belongs_in_path_is_rejected() {
        let mut ctx = Gs1Context::new();
        let err = ctx.set_data_str("https://example.com/01/09520123456788?10=ABC123").unwrap_err();
        assert!(matches!(err, Gs1Error::UriAttributeShouldBeInPath { ai } if ai == "10"));
    }

    #[test]
    fn failed_setter_leaves_no_partial_state() {
        let mut ctx = Gs1Context::new();
        ctx.set_ai_data_str("(01)12312312312326(22)ABC").unwrap();
        assert!(ctx.set_ai_data_str("(01)bad").is_err());
        assert!(ctx.get_data_str().is_none());
        assert!(ctx.get_hri().is_empty());
    }

    #[test]
    fn add_check_digit_appends_missing_gtin_check_digit() {
        let mut ctx = Gs1Context::new();
        ctx.set_add_check_digit(true);
        ctx.set_ai_data_str("(01)1231231231232").unwrap();
        assert_eq!(ctx.get_ai_data_str().as_deref(), Some("(01)12312312312326"));
    }
}
