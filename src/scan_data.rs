//! §4.6 scan-data codec: AIM symbology identifier prefix ↔ canonical message.

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ai_value::AiValue;
use crate::dictionary::Dictionary;
use crate::digital_link;
use crate::element_string;
use crate::error::Gs1Error;
use crate::linters;

const GS: char = '\u{1D}';

/// GS1 DataBar Limited enforces a primary-GTIN cap not enforced for the same
/// GTIN arriving via other inputs (`spec.md` §9 open question 2).
pub const DATABAR_LIMITED_GTIN_CAP: &str = "19999999999999";

#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum Symbology {
    Gs1128 = 0,
    Gs1DataBar = 1,
    Gs1DataBarLimited = 2,
    Gs1DataMatrix = 3,
    Gs1QrCode = 4,
    Gs1DotCode = 5,
    Ean13 = 6,
    Ean8 = 7,
    UpcA = 8,
}

impl Symbology {
    /// AIM symbology identifier for this tag in the given mode. `ai_mode`
    /// only varies the identifier for the 2D symbologies, which carry both
    /// a plain and a GS1-formatted variant (`spec.md` §4.6).
    pub fn identifier(self, ai_mode: bool) -> &'static str {
        use Symbology::*;
        match (self, ai_mode) {
            (Gs1128, _) => "]C1",
            (Gs1DataBar | Gs1DataBarLimited, _) => "]e0",
            (Gs1DataMatrix, true) => "]d2",
            (Gs1DataMatrix, false) => "]d1",
            (Gs1QrCode, true) => "]Q3",
            (Gs1QrCode, false) => "]Q1",
            (Gs1DotCode, true) => "]J1",
            (Gs1DotCode, false) => "]J0",
            (Ean13 | UpcA, _) => "]E0",
            (Ean8, _) => "]E4",
        }
    }

    /// The canonical AIM symbology name, as surfaced to callers and used in
    /// test expectations (`spec.md` §8 scenario 4: `GS1_128_CCA`).
    pub fn name(self) -> &'static str {
        use Symbology::*;
        match self {
            Gs1128 => "GS1_128_CCA",
            Gs1DataBar => "GS1_DATABAR",
            Gs1DataBarLimited => "GS1_DATABAR_LIMITED",
            Gs1DataMatrix => "GS1_DATAMATRIX",
            Gs1QrCode => "GS1_QRCODE",
            Gs1DotCode => "GS1_DOTCODE",
            Ean13 => "EAN13",
            Ean8 => "EAN8",
            UpcA => "UPC_A",
        }
    }

    fn from_identifier(ident: &str) -> Option<(Symbology, bool)> {
        Some(match ident {
            "]C1" => (Symbology::Gs1128, true),
            "]e0" => (Symbology::Gs1DataBar, true),
            "]d2" => (Symbology::Gs1DataMatrix, true),
            "]d1" => (Symbology::Gs1DataMatrix, false),
            "]Q3" => (Symbology::Gs1QrCode, true),
            "]Q1" => (Symbology::Gs1QrCode, false),
            "]J1" => (Symbology::Gs1DotCode, true),
            "]J0" => (Symbology::Gs1DotCode, false),
            "]E0" => (Symbology::Ean13, false),
            "]E4" => (Symbology::Ean8, false),
            _ => return None,
        })
    }

    pub fn is_ean_upc(self) -> bool {
        matches!(self, Symbology::Ean13 | Symbology::Ean8 | Symbology::UpcA)
    }
}

pub struct Decoded {
    pub symbology: Symbology,
    /// Canonical `^`-delimited message, or the plain/DL payload for
    /// non-AI-mode symbologies.
    pub message: String,
    pub values: Vec<AiValue>,
    pub composite: Option<String>,
    /// Whether the scanned identifier was the AI-formatted variant, so that
    /// `get_scan_data` regenerates the same `]Xn` prefix rather than
    /// guessing from the extracted AI list (a plain-mode DL URI payload
    /// still yields a non-empty AI list).
    pub ai_mode: bool,
}

/// §4.6.1 generate scan data for AI-formatted `message` (must start with
/// `^`) under `symbology`, with an optional composite component.
pub fn generate_ai(message: &str, symbology: Symbology, composite: Option<&str>) -> Result<String, Gs1Error> {
    if symbology.is_ean_upc() {
        return Err(Gs1Error::InvalidOption);
    }
    if symbology == Symbology::Gs1DataBarLimited {
        // GS1 DataBar Limited carries AI 01 alone, so the message is exactly
        // `^01<14 digits>` (`spec.md` §9 open question 2).
        if let Some(gtin) = message.strip_prefix("^01").map(|v| v.trim_end_matches('^')) {
            if gtin.len() == DATABAR_LIMITED_GTIN_CAP.len() && gtin > DATABAR_LIMITED_GTIN_CAP {
                return Err(Gs1Error::DataBarLimitedGtinExceedsCap);
            }
        }
    }
    // A GS1-128 carrying a composite component is itself reported under the
    // DataBar identifier (`spec.md` §4.6: linear + 2D composite symbols
    // share the composite's identifier as the primary one).
    let primary_symbology = if symbology == Symbology::Gs1128 && composite.is_some() {
        Symbology::Gs1DataBar
    } else {
        symbology
    };
    let mut out = String::from(primary_symbology.identifier(true));
    out.push_str(&encode_ai_body(message));
    if let Some(cc) = composite {
        out.push('|');
        out.push_str(Symbology::Gs1DataBar.identifier(true));
        out.push_str(&encode_ai_body(cc));
    }
    Ok(out)
}

/// §4.6.1 generate scan data for a plain (non-AI) payload. A literal
/// leading `^`, or an existing leading run of `\`, is disambiguated by
/// inserting one additional `\`.
pub fn generate_plain(payload: &str, symbology: Symbology) -> Result<String, Gs1Error> {
    if symbology.is_ean_upc() {
        return Err(Gs1Error::InvalidOption);
    }
    let mut out = String::from(symbology.identifier(false));
    out.push_str(&escape_leading(payload));
    Ok(out)
}

/// §4.6.1 generate EAN/UPC scan data from a 14-digit GTIN, dropping the
/// leading indicator digit(s) that the symbology implies must be zero.
pub fn generate_ean_upc(gtin14: &str, symbology: Symbology) -> Result<String, Gs1Error> {
    if gtin14.len() != 14 || !gtin14.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Gs1Error::EanUpcBadLength);
    }
    let digits = match symbology {
        Symbology::Ean13 => {
            if &gtin14[0..1] != "0" {
                return Err(Gs1Error::EanUpcBadLength);
            }
            &gtin14[1..]
        }
        Symbology::UpcA => {
            if !gtin14[0..2].bytes().all(|b| b == b'0') {
                return Err(Gs1Error::EanUpcBadLength);
            }
            &gtin14[2..]
        }
        Symbology::Ean8 => {
            if !gtin14[0..6].bytes().all(|b| b == b'0') {
                return Err(Gs1Error::EanUpcBadLength);
            }
            &gtin14[6..]
        }
        _ => return Err(Gs1Error::EanUpcBadLength),
    };
    linters::gcp_mod10_check_digit(digits).map_err(|_| Gs1Error::EanUpcBadParity)?;
    Ok(format!("{}{}", symbology.identifier(false), digits))
}

fn encode_ai_body(message: &str) -> String {
    let body = message.strip_prefix('^').unwrap_or(message);
    let body = body.trim_end_matches('^');
    body.replace('^', &GS.to_string())
}

fn escape_leading(payload: &str) -> String {
    if payload.starts_with('^') || payload.starts_with('\\') {
        format!("\\{payload}")
    } else {
        payload.to_string()
    }
}

fn unescape_leading(payload: &str) -> String {
    payload.strip_prefix('\\').map(str::to_string).unwrap_or_else(|| payload.to_string())
}

/// §4.6.2 decode scan data: recognise the 3-character AIM prefix, restore
/// `^`, and run the appropriate parser.
pub fn decode(
    data: &str,
    dict: &Dictionary,
    permit_unknown_ais: bool,
    permit_convenience_alphas: bool,
) -> Result<Decoded, Gs1Error> {
    if data.len() < 3 {
        return Err(Gs1Error::ScanDataTooShort);
    }
    let (ident, rest) = data.split_at(3);
    let (symbology, ai_mode) = Symbology::from_identifier(ident).ok_or(Gs1Error::UnrecognisedSymbologyIdentifier)?;

    if symbology.is_ean_upc() {
        return decode_ean_upc(symbology, ident, rest, dict, permit_unknown_ais);
    }

    if !ai_mode {
        if digital_link::has_uri_scheme_prefix(rest) {
            let parsed = digital_link::parse(rest, dict, permit_unknown_ais, false, permit_convenience_alphas)?;
            return Ok(Decoded {
                symbology,
                message: parsed.message,
                values: parsed.values,
                composite: None,
                ai_mode: false,
            });
        }
        return Ok(Decoded {
            symbology,
            message: unescape_leading(rest),
            values: Vec::new(),
            composite: None,
            ai_mode: false,
        });
    }

    let (main, composite_raw) = match rest.split_once('|') {
        Some((m, c)) => (m, Some(c)),
        None => (rest, None),
    };

    let message = format!("^{}", main.replace(GS, "^"));
    let values = element_string::parse_unbracketed(&message, dict, permit_unknown_ais)?;

    let composite = match composite_raw {
        Some(c) => {
            let c = c.strip_prefix("]e0").ok_or(Gs1Error::UnrecognisedSymbologyIdentifier)?;
            Some(format!("^{}", c.replace(GS, "^")))
        }
        None => None,
    };

    Ok(Decoded { symbology, message, values, composite, ai_mode: true })
}

fn decode_ean_upc(
    symbology: Symbology,
    ident: &str,
    rest: &str,
    dict: &Dictionary,
    permit_unknown_ais: bool,
) -> Result<Decoded, Gs1Error> {
    let len = if ident == "]E0" { 13 } else { 8 };
    if rest.len() < len {
        return Err(Gs1Error::ScanDataTooShort);
    }
    let (digits, tail) = rest.split_at(len);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Gs1Error::EanUpcBadLength);
    }
    linters::gcp_mod10_check_digit(digits).map_err(|_| Gs1Error::EanUpcBadParity)?;

    let gtin14 = format!("{digits:0>14}");
    let message = format!("^01{gtin14}");
    let values = element_string::parse_unbracketed(&message, dict, permit_unknown_ais)?;

    let composite = tail.strip_prefix('|').map(|c| {
        let c = c.strip_prefix("]e0").unwrap_or(c);
        format!("^{}", c.replace(GS, "^"))
    });

    Ok(Decoded { symbology, message, values, composite, ai_mode: false })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_gs1_128_scan_data() {
        let dict = Dictionary::embedded();
        let raw = "]C1011231231231233310ABC123\u{1D}99TESTING";
        let decoded = decode(raw, &dict, false, false).unwrap();
        assert_eq!(decoded.symbology.name(), "GS1_128_CCA");
        assert_eq!(decoded.message, "^011231231231233310ABC123^99TESTING");
    }

    #[test]
    fn generates_gs1_128_scan_data() {
        let encoded = generate_ai("^011231231231233310ABC123^99TESTING", Symbology::Gs1128, None).unwrap();
        assert_eq!(encoded, "]C1011231231231233310ABC123\u{1D}99TESTING");
    }

    #[test]
    fn ean13_round_trips_through_gtin14() {
        let scan = generate_ean_upc("00614141999996", Symbology::Ean13).unwrap();
        assert_eq!(scan, "]E00614141999996");
        let dict = Dictionary::embedded();
        let decoded = decode(&scan, &dict, false, false).unwrap();
        assert_eq!(decoded.message, "^0100614141999996");
    }

    #[test]
    fn rejects_unrecognised_symbology_prefix() {
        let dict = Dictionary::embedded();
        assert!(decode("]Z9garbage", &dict, false, false).is_err());
    }

    #[test]
    fn gs1_128_with_composite_is_reported_under_databar_identifier() {
        let encoded = generate_ai("^011231231231233310ABC123", Symbology::Gs1128, Some("^99COMPOSITE")).unwrap();
        assert!(encoded.starts_with("]e0"));
        assert!(encoded.contains("|]e0"));
    }

    #[test]
    fn databar_limited_rejects_gtin_above_cap() {
        let err = generate_ai("^0129999999999991", Symbology::Gs1DataBarLimited, None).unwrap_err();
        assert_eq!(err, Gs1Error::DataBarLimitedGtinExceedsCap);
    }

    #[test]
    fn databar_limited_accepts_gtin_at_cap() {
        let encoded = generate_ai("^0119999999999999", Symbology::Gs1DataBarLimited, None).unwrap();
        assert_eq!(encoded, "]e00119999999999999");
    }

    #[test]
    fn plain_payload_escapes_leading_caret() {
        let scan = generate_plain("^notactuallyfnc1", Symbology::Gs1QrCode).unwrap();
        assert_eq!(scan, "]Q1\\^notactuallyfnc1");
        let dict = Dictionary::embedded();
        let decoded = decode(&scan, &dict, false, false).unwrap();
        assert_eq!(decoded.message, "^notactuallyfnc1");
    }
}
