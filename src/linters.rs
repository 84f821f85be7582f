//! §4.2 Linters — pluggable per-component value validators.
//!
//! A linter is a pure function `fn(&str) -> Result<(), LinterError>`. The
//! dictionary stores linters by name (as read from the embedded table or a
//! text syntax dictionary) and resolves them to function pointers once, at
//! table-build time, via [`resolve`].

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// The closed taxonomy of linter failure kinds. Unknown kinds are a build
/// error for the dictionary, never a runtime surprise for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum LinterErrorKind {
    InvalidCset82Character = 0,
    InvalidCset39Character = 1,
    InvalidCset64Character = 2,
    IncorrectCheckDigit = 3,
    IncorrectCheckPair = 4,
    TooShortForCheckPair = 5,
    NotIso3166 = 6,
    NotIso3166Alpha2 = 7,
    NotIso3166OrZZZ = 8,
    NotIso4217 = 9,
    IllegalMonth = 10,
    IllegalDay = 11,
    IllegalHour = 12,
    IllegalMinute = 13,
    IllegalSecond = 14,
    ZeroPieceNumber = 15,
    ZeroTotalPieces = 16,
    PieceNumberExceedsTotal = 17,
    CouponMissingFormatCode = 18,
    CouponInvalidFunctionCode = 19,
    CouponExcessiveValue = 20,
    IbanNotIso3166 = 21,
    IbanIncorrectCheckDigits = 22,
    IbanTooShort = 23,
    InvalidLatitude = 24,
    InvalidLongitude = 25,
    InvalidBiologicalSexCode = 26,
    InvalidPercentSequence = 27,
    PositionInSequenceTooShort = 28,
    PositionInSequenceExceedsMaximum = 29,
    NonemptyRequired = 30,
    InvalidYesNoCode = 31,
}

impl LinterErrorKind {
    pub fn message(self) -> &'static str {
        use LinterErrorKind::*;
        match self {
            InvalidCset82Character => "invalid CSET 82 character",
            InvalidCset39Character => "invalid CSET 39 character",
            InvalidCset64Character => "invalid CSET 64 character",
            IncorrectCheckDigit => "incorrect check digit",
            IncorrectCheckPair => "incorrect check character pair",
            TooShortForCheckPair => "value too short to carry a check character pair",
            NotIso3166 => "not a valid ISO 3166 numeric country code",
            NotIso3166Alpha2 => "not a valid ISO 3166 alpha-2 country code",
            NotIso3166OrZZZ => "not a valid ISO 3166 numeric country code or 999",
            NotIso4217 => "not a valid ISO 4217 numeric currency code",
            IllegalMonth => "illegal month",
            IllegalDay => "illegal day",
            IllegalHour => "illegal hour",
            IllegalMinute => "illegal minute",
            IllegalSecond => "illegal second",
            ZeroPieceNumber => "piece number must not be zero",
            ZeroTotalPieces => "total pieces must not be zero",
            PieceNumberExceedsTotal => "piece number exceeds total pieces",
            CouponMissingFormatCode => "coupon value missing a recognised format code",
            CouponInvalidFunctionCode => "coupon value has an invalid function code",
            CouponExcessiveValue => "coupon value exceeds its permitted range",
            IbanNotIso3166 => "IBAN country prefix is not ISO 3166 alpha-2",
            IbanIncorrectCheckDigits => "IBAN check digits are incorrect",
            IbanTooShort => "IBAN value is too short",
            InvalidLatitude => "invalid latitude",
            InvalidLongitude => "invalid longitude",
            InvalidBiologicalSexCode => "invalid biological sex code",
            InvalidPercentSequence => "invalid percent-encoded sequence",
            PositionInSequenceTooShort => "position in sequence is too short",
            PositionInSequenceExceedsMaximum => "position in sequence exceeds the maximum",
            NonemptyRequired => "value must not be empty",
            InvalidYesNoCode => "value must be 0 or 1",
        }
    }
}

impl std::fmt::Display for LinterErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// A linter failure: the kind, plus the byte span within the *component
/// value* (not the full message buffer) that is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinterError {
    pub kind: LinterErrorKind,
    pub err_pos: usize,
    pub err_len: usize,
}

impl std::fmt::Display for LinterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.kind.fmt(f)
    }
}

impl LinterError {
    fn at(kind: LinterErrorKind, pos: usize, len: usize) -> Self {
        Self {
            kind,
            err_pos: pos,
            err_len: len,
        }
    }

    fn whole(kind: LinterErrorKind, value: &str) -> Self {
        Self::at(kind, 0, value.len())
    }
}

pub type LinterFn = fn(&str) -> Result<(), LinterError>;

/// Resolve a linter name (as written in the dictionary) to its function
/// pointer. Returns `None` for unrecognised names — the dictionary loader
/// turns that into `Gs1Error::AiTableUnknownLinter`.
pub fn resolve(name: &str) -> Option<LinterFn> {
    Some(match name {
        "csum" => gcp_mod10_check_digit,
        "csumalpha" => check_pair,
        "key" | "pcenc" => percent_encoded,
        "iso3166" => iso3166,
        "iso3166alpha2" => iso3166_alpha2,
        "iso3166999" => iso3166_or_zzz,
        "iso4217" => iso4217,
        "yymmd0" | "yymmdd" => date_yymmdd,
        "hhmm" => time_hhmm,
        "hhmmss" => time_hhmmss,
        "hh" => hour_only,
        "pieceoftotal" => piece_of_total,
        "couponcode" => coupon_code,
        "iban" => iban,
        "latitude" => latitude,
        "longitude" => longitude,
        "sex" => biological_sex,
        "posinseqslash" => position_in_sequence,
        "nonzero" => nonempty,
        "yesno" => yes_no,
        "nonblank" => nonempty,
        _ => return None,
    })
}

/// GS1 mod-10 check digit, used by GTIN, SSCC, GLN and most other numeric
/// identification keys. The check digit is the final character.
pub fn gcp_mod10_check_digit(value: &str) -> Result<(), LinterError> {
    if !value.bytes().all(|b| b.is_ascii_digit()) || value.is_empty() {
        return Err(LinterError::whole(LinterErrorKind::IncorrectCheckDigit, value));
    }
    let digits: Vec<u32> = value.bytes().map(|b| (b - b'0') as u32).collect();
    let (given, body) = digits.split_last().unwrap();
    let sum: u32 = body
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { d * 3 } else { *d })
        .sum();
    let computed = (10 - (sum % 10)) % 10;
    if computed == *given {
        Ok(())
    } else {
        Err(LinterError::at(
            LinterErrorKind::IncorrectCheckDigit,
            value.len() - 1,
            1,
        ))
    }
}

/// GS1 alphanumeric check character pair (CSET 32 algorithm), as used by
/// AIs such as (8010)/(8017)-(8020). A faithful weighted-CSET-32
/// implementation; requires at least 2 characters.
pub fn check_pair(value: &str) -> Result<(), LinterError> {
    const CSET32: &[u8] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";
    if value.len() < 2 {
        return Err(LinterError::whole(LinterErrorKind::TooShortForCheckPair, value));
    }
    let (body, pair) = value.split_at(value.len() - 2);
    let mut sum: u64 = 0;
    for (i, b) in body.bytes().rev().enumerate() {
        let weight = if i % 2 == 0 { 1u64 } else { 2u64 };
        sum += b as u64 * weight;
    }
    let c1 = (sum % 1021) / 32;
    let c2 = (sum % 1021) % 32;
    let expected: String = [CSET32[c1 as usize], CSET32[c2 as usize]]
        .iter()
        .map(|&b| b as char)
        .collect();
    if expected == pair {
        Ok(())
    } else {
        Err(LinterError::at(
            LinterErrorKind::IncorrectCheckPair,
            value.len() - 2,
            2,
        ))
    }
}

/// `%`-triplet must always be followed by two uppercase-hex digits.
pub fn percent_encoded(value: &str) -> Result<(), LinterError> {
    let bytes = value.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex_ok = bytes
                .get(i + 1..i + 3)
                .is_some_and(|h| h.iter().all(|b| b.is_ascii_hexdigit()));
            if !hex_ok {
                return Err(LinterError::at(LinterErrorKind::InvalidPercentSequence, i, 1));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

const ISO3166_NUMERIC: &[&str] = &[
    "004", "008", "012", "016", "020", "024", "028", "031", "032", "036", "040", "044", "048",
    "050", "051", "052", "056", "060", "064", "068", "070", "072", "076", "084", "090", "092",
    "096", "100", "104", "108", "112", "116", "120", "124", "132", "136", "140", "144", "148",
    "152", "156", "158", "170", "174", "178", "180", "188", "191", "192", "196", "203", "208",
    "212", "214", "218", "222", "226", "231", "232", "233", "234", "238", "242", "246", "250",
    "254", "258", "262", "266", "268", "270", "275", "276", "288", "292", "296", "300", "304",
    "308", "312", "316", "320", "324", "328", "332", "336", "340", "344", "348", "352", "356",
    "360", "364", "368", "372", "376", "380", "384", "388", "392", "398", "400", "404", "408",
    "410", "414", "417", "418", "422", "426", "428", "430", "434", "438", "440", "442", "446",
    "450", "454", "458", "462", "466", "470", "474", "478", "480", "484", "492", "496", "498",
    "499", "500", "504", "508", "512", "516", "520", "524", "528", "531", "533", "534", "535",
    "540", "548", "554", "558", "562", "566", "570", "574", "578", "580", "583", "584", "585",
    "586", "591", "598", "600", "604", "608", "612", "616", "620", "624", "626", "630", "634",
    "638", "642", "643", "646", "652", "654", "659", "660", "662", "663", "666", "670", "674",
    "678", "682", "686", "688", "690", "694", "702", "703", "704", "705", "706", "710", "716",
    "724", "728", "729", "732", "740", "744", "748", "752", "756", "760", "762", "764", "768",
    "772", "776", "780", "784", "788", "792", "795", "796", "798", "800", "804", "807", "818",
    "826", "831", "832", "833", "834", "840", "850", "854", "858", "860", "862", "876", "882",
    "887", "894",
];

const ISO3166_ALPHA2: &[&str] = &[
    "AD", "AE", "AF", "AG", "AI", "AL", "AM", "AO", "AQ", "AR", "AS", "AT", "AU", "AW", "AX",
    "AZ", "BA", "BB", "BD", "BE", "BF", "BG", "BH", "BI", "BJ", "BL", "BM", "BN", "BO", "BQ",
    "BR", "BS", "BT", "BV", "BW", "BY", "BZ", "CA", "CC", "CD", "CF", "CG", "CH", "CI", "CK",
    "CL", "CM", "CN", "CO", "CR", "CU", "CV", "CW", "CX", "CY", "CZ", "DE", "DJ", "DK", "DM",
    "DO", "DZ", "EC", "EE", "EG", "EH", "ER", "ES", "ET", "FI", "FJ", "FK", "FM", "FO", "FR",
    "GA", "GB", "GD", "GE", "GF", "GG", "GH", "GI", "GL", "GM", "GN", "GP", "GQ", "GR", "GS",
    "GT", "GU", "GW", "GY", "HK", "HM", "HN", "HR", "HT", "HU", "ID", "IE", "IL", "IM", "IN",
    "IO", "IQ", "IR", "IS", "IT", "JE", "JM", "JO", "JP", "KE", "KG", "KH", "KI", "KM", "KN",
    "KP", "KR", "KW", "KY", "KZ", "LA", "LB", "LC", "LI", "LK", "LR", "LS", "LT", "LU", "LV",
    "LY", "MA", "MC", "MD", "ME", "MF", "MG", "MH", "MK", "ML", "MM", "MN", "MO", "MP", "MQ",
    "MR", "MS", "MT", "MU", "MV", "MW", "MX", "MY", "MZ", "NA", "NC", "NE", "NF", "NG", "NI",
    "NL", "NO", "NP", "NR", "NU", "NZ", "OM", "PA", "PE", "PF", "PG", "PH", "PK", "PL", "PM",
    "PN", "PR", "PS", "PT", "PW", "PY", "QA", "RE", "RO", "RS", "RU", "RW", "SA", "SB", "SC",
    "SD", "SE", "SG", "SH", "SI", "SJ", "SK", "SL", "SM", "SN", "SO", "SR", "SS", "ST", "SV",
    "SX", "SY", "SZ", "TC", "TD", "TF", "TG", "TH", "TJ", "TK", "TL", "TM", "TN", "TO", "TR",
    "TT", "TV", "TW", "TZ", "UA", "UG", "US", "UY", "UZ", "VA", "VC", "VE", "VG", "VI", "VN",
    "VU", "WF", "WS", "YE", "YT", "ZA", "ZM", "ZW",
];

const ISO4217_NUMERIC: &[&str] = &[
    "008", "012", "032", "036", "044", "048", "050", "051", "052", "060", "064", "068", "072",
    "084", "090", "096", "104", "108", "116", "124", "132", "136", "144", "152", "156", "170",
    "174", "188", "191", "192", "203", "208", "214", "222", "230", "232", "238", "242", "262",
    "270", "292", "320", "324", "328", "332", "340", "344", "348", "352", "356", "360", "364",
    "368", "376", "388", "392", "398", "400", "404", "408", "410", "414", "417", "418", "422",
    "426", "430", "434", "440", "446", "454", "458", "462", "480", "484", "496", "498", "504",
    "512", "516", "524", "532", "533", "548", "554", "558", "566", "578", "586", "590", "598",
    "600", "604", "608", "634", "643", "646", "654", "682", "690", "694", "702", "704", "706",
    "710", "728", "748", "752", "756", "760", "764", "776", "780", "784", "788", "800", "807",
    "818", "826", "834", "840", "858", "860", "882", "886", "901", "927", "928", "929", "930",
    "931", "932", "933", "934", "936", "938", "940", "941", "943", "944", "946", "947", "948",
    "949", "950", "951", "952", "953", "967", "968", "969", "970", "971", "972", "973", "975",
    "976", "977", "978", "979", "980", "981", "984", "985", "986", "990", "994", "997", "999",
];

pub fn iso3166(value: &str) -> Result<(), LinterError> {
    if ISO3166_NUMERIC.contains(&value) {
        Ok(())
    } else {
        Err(LinterError::whole(LinterErrorKind::NotIso3166, value))
    }
}

pub fn iso3166_alpha2(value: &str) -> Result<(), LinterError> {
    if ISO3166_ALPHA2.contains(&value.to_ascii_uppercase().as_str()) {
        Ok(())
    } else {
        Err(LinterError::whole(LinterErrorKind::NotIso3166Alpha2, value))
    }
}

pub fn iso3166_or_zzz(value: &str) -> Result<(), LinterError> {
    if value == "999" || ISO3166_NUMERIC.contains(&value) {
        Ok(())
    } else {
        Err(LinterError::whole(LinterErrorKind::NotIso3166OrZZZ, value))
    }
}

pub fn iso4217(value: &str) -> Result<(), LinterError> {
    if ISO4217_NUMERIC.contains(&value) {
        Ok(())
    } else {
        Err(LinterError::whole(LinterErrorKind::NotIso4217, value))
    }
}

/// YYMMDD date, where DD may be `00` (meaning "date unspecified" per GS1
/// rules for certain AIs).
pub fn date_yymmdd(value: &str) -> Result<(), LinterError> {
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LinterError::whole(LinterErrorKind::IllegalMonth, value));
    }
    let month: u32 = value[2..4].parse().unwrap();
    let day: u32 = value[4..6].parse().unwrap();
    if !(1..=12).contains(&month) {
        return Err(LinterError::at(LinterErrorKind::IllegalMonth, 2, 2));
    }
    if day > days_in_month(month) {
        return Err(LinterError::at(LinterErrorKind::IllegalDay, 4, 2));
    }
    Ok(())
}

fn days_in_month(month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => 29,
        _ => 0,
    }
}

/// HHMM 24-hour time.
pub fn time_hhmm(value: &str) -> Result<(), LinterError> {
    if value.len() != 4 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LinterError::whole(LinterErrorKind::IllegalHour, value));
    }
    let hour: u32 = value[0..2].parse().unwrap();
    let minute: u32 = value[2..4].parse().unwrap();
    if hour > 23 {
        return Err(LinterError::at(LinterErrorKind::IllegalHour, 0, 2));
    }
    if minute > 59 {
        return Err(LinterError::at(LinterErrorKind::IllegalMinute, 2, 2));
    }
    Ok(())
}

pub fn hour_only(value: &str) -> Result<(), LinterError> {
    if value.len() != 2 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LinterError::whole(LinterErrorKind::IllegalHour, value));
    }
    let hour: u32 = value.parse().unwrap();
    if hour > 23 {
        return Err(LinterError::whole(LinterErrorKind::IllegalHour, value));
    }
    Ok(())
}

/// HHMMSS 24-hour time with seconds.
pub fn time_hhmmss(value: &str) -> Result<(), LinterError> {
    if value.len() != 6 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LinterError::whole(LinterErrorKind::IllegalHour, value));
    }
    let hour: u32 = value[0..2].parse().unwrap();
    let minute: u32 = value[2..4].parse().unwrap();
    let second: u32 = value[4..6].parse().unwrap();
    if hour > 23 {
        return Err(LinterError::at(LinterErrorKind::IllegalHour, 0, 2));
    }
    if minute > 59 {
        return Err(LinterError::at(LinterErrorKind::IllegalMinute, 2, 2));
    }
    if second > 59 {
        return Err(LinterError::at(LinterErrorKind::IllegalSecond, 4, 2));
    }
    Ok(())
}

/// `<piece><total>` where each half is a fixed-width decimal, e.g. AI (37)'s
/// companion or the piece-of-total shipped inside variable-measure AIs.
/// Splits the value in half; both halves must be equal width, non-zero, and
/// piece <= total.
pub fn piece_of_total(value: &str) -> Result<(), LinterError> {
    if value.len() % 2 != 0 || value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LinterError::whole(LinterErrorKind::ZeroPieceNumber, value));
    }
    let half = value.len() / 2;
    let piece: u64 = value[..half].parse().unwrap();
    let total: u64 = value[half..].parse().unwrap();
    if piece == 0 {
        return Err(LinterError::at(LinterErrorKind::ZeroPieceNumber, 0, half));
    }
    if total == 0 {
        return Err(LinterError::at(LinterErrorKind::ZeroTotalPieces, half, half));
    }
    if piece > total {
        return Err(LinterError::whole(LinterErrorKind::PieceNumberExceedsTotal, value));
    }
    Ok(())
}

/// GS1 Paperless Coupon body (AI 8112): a 2-digit format code (`00`), a
/// mandatory 1-digit function code, and, for function code `0` (the primary
/// record), a 10-digit GCP + Offer Code, a length-prefixed serial number and
/// a 6-digit save-value field.
pub fn coupon_code(value: &str) -> Result<(), LinterError> {
    if value.len() > 98 {
        return Err(LinterError::whole(LinterErrorKind::CouponExcessiveValue, value));
    }
    if value.len() < 2 || &value[0..2] != "00" {
        return Err(LinterError::at(LinterErrorKind::CouponMissingFormatCode, 0, value.len().min(2)));
    }
    let bytes = value.as_bytes();
    let Some(&fc) = bytes.get(2) else {
        return Err(LinterError::at(LinterErrorKind::CouponInvalidFunctionCode, 2, 0));
    };
    if !fc.is_ascii_digit() {
        return Err(LinterError::at(LinterErrorKind::CouponInvalidFunctionCode, 2, 1));
    }
    if fc != b'0' {
        // Only the primary record (function code 0) carries the GCP/offer,
        // serial number and save-value fields validated below.
        return Ok(());
    }

    let mut pos = 3;
    match value.get(pos..pos + 10) {
        Some(gcp_offer) if gcp_offer.bytes().all(|b| b.is_ascii_digit()) => pos += 10,
        _ => return Err(LinterError::at(LinterErrorKind::CouponExcessiveValue, pos, value.len() - pos)),
    }

    let Some(&serial_len_digit) = bytes.get(pos) else { return Ok(()) };
    if !serial_len_digit.is_ascii_digit() {
        return Err(LinterError::at(LinterErrorKind::CouponExcessiveValue, pos, 1));
    }
    let serial_len = (serial_len_digit - b'0') as usize;
    pos += 1;
    if value.len() < pos + serial_len {
        return Err(LinterError::whole(LinterErrorKind::CouponExcessiveValue, value));
    }
    pos += serial_len;

    let Some(&save_code) = bytes.get(pos) else { return Ok(()) };
    if !save_code.is_ascii_digit() {
        return Err(LinterError::at(LinterErrorKind::CouponInvalidFunctionCode, pos, 1));
    }
    pos += 1;
    if let Some(save_value) = value.get(pos..pos + 6) {
        if !save_value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(LinterError::at(LinterErrorKind::CouponExcessiveValue, pos, save_value.len()));
        }
    }
    Ok(())
}

/// IBAN: ISO 3166 alpha-2 prefix, two check digits, mod-97 validation per
/// ISO 7064.
pub fn iban(value: &str) -> Result<(), LinterError> {
    if value.len() < 5 {
        return Err(LinterError::whole(LinterErrorKind::IbanTooShort, value));
    }
    let country = &value[0..2];
    if !ISO3166_ALPHA2.contains(&country.to_ascii_uppercase().as_str()) {
        return Err(LinterError::at(LinterErrorKind::IbanNotIso3166, 0, 2));
    }
    let rearranged = format!("{}{}", &value[4..], &value[0..4]);
    let mut remainder: u64 = 0;
    for b in rearranged.bytes() {
        let digit_value = match b {
            b'0'..=b'9' => (b - b'0') as u64,
            b'A'..=b'Z' => (b - b'A') as u64 + 10,
            b'a'..=b'z' => (b - b'a') as u64 + 10,
            _ => return Err(LinterError::whole(LinterErrorKind::IbanIncorrectCheckDigits, value)),
        };
        remainder = if digit_value > 9 {
            (remainder * 100 + digit_value) % 97
        } else {
            (remainder * 10 + digit_value) % 97
        };
    }
    if remainder == 1 {
        Ok(())
    } else {
        Err(LinterError::at(LinterErrorKind::IbanIncorrectCheckDigits, 2, 2))
    }
}

/// Latitude encoded as a fixed-width decimal fraction of the range
/// `[0, 180]` representing `[-90, +90]` degrees (AI 8182-style encodings use
/// an offset-and-scale scheme; this checks the fundamental numeric range).
pub fn latitude(value: &str) -> Result<(), LinterError> {
    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LinterError::whole(LinterErrorKind::InvalidLatitude, value));
    }
    let raw: u64 = value.parse().unwrap();
    if raw > 1_800_000_000 {
        return Err(LinterError::whole(LinterErrorKind::InvalidLatitude, value));
    }
    Ok(())
}

/// Longitude: fixed-width decimal fraction of `[0, 360]` representing
/// `[-180, +180]` degrees.
pub fn longitude(value: &str) -> Result<(), LinterError> {
    if value.len() != 10 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LinterError::whole(LinterErrorKind::InvalidLongitude, value));
    }
    let raw: u64 = value.parse().unwrap();
    if raw > 3_600_000_000 {
        return Err(LinterError::whole(LinterErrorKind::InvalidLongitude, value));
    }
    Ok(())
}

/// Biological sex code per ISO/IEC 5218: `0` unknown, `1` male, `2` female,
/// `9` not applicable.
pub fn biological_sex(value: &str) -> Result<(), LinterError> {
    match value {
        "0" | "1" | "2" | "9" => Ok(()),
        _ => Err(LinterError::whole(LinterErrorKind::InvalidBiologicalSexCode, value)),
    }
}

/// `<position>/<total>` sequence indicator, e.g. AI 8111-adjacent usage.
pub fn position_in_sequence(value: &str) -> Result<(), LinterError> {
    let Some(slash) = value.find('/') else {
        return Err(LinterError::whole(LinterErrorKind::PositionInSequenceTooShort, value));
    };
    let (pos_s, total_s) = (&value[..slash], &value[slash + 1..]);
    if pos_s.is_empty() || total_s.is_empty() {
        return Err(LinterError::whole(LinterErrorKind::PositionInSequenceTooShort, value));
    }
    let (Ok(pos), Ok(total)) = (pos_s.parse::<u32>(), total_s.parse::<u32>()) else {
        return Err(LinterError::whole(LinterErrorKind::PositionInSequenceTooShort, value));
    };
    if pos == 0 || pos > total {
        return Err(LinterError::whole(
            LinterErrorKind::PositionInSequenceExceedsMaximum,
            value,
        ));
    }
    Ok(())
}

pub fn nonempty(value: &str) -> Result<(), LinterError> {
    if value.is_empty() || value.bytes().all(|b| b == b'0') {
        Err(LinterError::whole(LinterErrorKind::NonemptyRequired, value))
    } else {
        Ok(())
    }
}

pub fn yes_no(value: &str) -> Result<(), LinterError> {
    match value {
        "0" | "1" => Ok(()),
        _ => Err(LinterError::whole(LinterErrorKind::InvalidYesNoCode, value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mod10_check_digit_validates_gtin14() {
        assert!(gcp_mod10_check_digit("12345678901231").is_ok());
        assert!(gcp_mod10_check_digit("12345678901232").is_err());
    }

    #[test]
    fn date_rejects_illegal_month() {
        let err = date_yymmdd("131313").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::IllegalMonth);
        assert_eq!(err.err_pos, 2);
        assert_eq!(err.err_len, 2);
    }

    #[test]
    fn date_allows_unspecified_day() {
        assert!(date_yymmdd("250100").is_ok());
    }

    #[test]
    fn time_rejects_illegal_minute() {
        let err = time_hhmm("1261").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::IllegalMinute);
    }

    #[test]
    fn iso3166_accepts_and_rejects() {
        assert!(iso3166("276").is_ok());
        assert!(iso3166("000").is_err());
    }

    #[test]
    fn iban_validates_mod97() {
        assert!(iban("GB82WEST12345698765432").is_ok());
        assert!(iban("GB82WEST12345698765433").is_err());
    }

    #[test]
    fn piece_of_total_rejects_zero_piece() {
        let err = piece_of_total("0002").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::ZeroPieceNumber);
    }

    #[test]
    fn position_in_sequence_checks_bounds() {
        assert!(position_in_sequence("1/3").is_ok());
        assert!(position_in_sequence("4/3").is_err());
    }

    #[test]
    fn time_hhmmss_rejects_illegal_second() {
        let err = time_hhmmss("235960").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::IllegalSecond);
        assert_eq!(err.err_pos, 4);
        assert_eq!(err.err_len, 2);
    }

    #[test]
    fn time_hhmmss_accepts_valid_time() {
        assert!(time_hhmmss("235959").is_ok());
    }

    #[test]
    fn time_hhmmss_still_checks_hour_and_minute() {
        assert_eq!(time_hhmmss("241212").unwrap_err().kind, LinterErrorKind::IllegalHour);
        assert_eq!(time_hhmmss("126012").unwrap_err().kind, LinterErrorKind::IllegalMinute);
    }

    #[test]
    fn coupon_code_accepts_minimal_primary_record() {
        // format 00, function 0, 10-digit GCP+offer, nothing further.
        assert!(coupon_code("0001234567890").is_ok());
    }

    #[test]
    fn coupon_code_accepts_full_primary_record() {
        // format 00, function 0, 10-digit GCP+offer, 3-digit serial number
        // (length-prefixed with `3`), save-value code + 6-digit save value.
        assert!(coupon_code("00012345678903123012345600").is_ok());
    }

    #[test]
    fn coupon_code_rejects_bad_format_code() {
        let err = coupon_code("019999999999").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::CouponMissingFormatCode);
    }

    #[test]
    fn coupon_code_rejects_non_digit_function_code() {
        let err = coupon_code("00X1234567890").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::CouponInvalidFunctionCode);
    }

    #[test]
    fn coupon_code_ignores_gcp_and_serial_for_non_primary_function_code() {
        assert!(coupon_code("001").is_ok());
    }

    #[test]
    fn coupon_code_rejects_gcp_offer_shorter_than_ten_digits() {
        let err = coupon_code("0001234567").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::CouponExcessiveValue);
    }

    #[test]
    fn coupon_code_rejects_serial_number_running_past_end_of_value() {
        // Serial length digit claims 9 digits but only 2 remain.
        let err = coupon_code("000123456789099 12").unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::CouponExcessiveValue);
    }

    #[test]
    fn coupon_code_rejects_value_over_98_characters() {
        let value = "00".to_string() + &"1".repeat(97);
        let err = coupon_code(&value).unwrap_err();
        assert_eq!(err.kind, LinterErrorKind::CouponExcessiveValue);
    }
}
