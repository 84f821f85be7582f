//! §4.1.1 embedded AI table.
//!
//! This is a curated subset of the full GS1 General Specifications AI
//! table: the identification keys, dates, logistic and measurement AIs
//! exercised by this crate's test scenarios and the families most commonly
//! seen in the field (see DESIGN.md for the cut line against the ~180-row
//! reference table). `Dictionary::embedded()` is the only place this list
//! is materialised; callers never see it directly.

use crate::charset::AiComponentKind::{Cset39 as Y, Cset64 as Z, Cset82 as X, Numeric as N};
use crate::dictionary::definition::{AiDefinition, ComponentSpec, DlDataAttr};
use crate::linters::{self, LinterFn};

fn comp(kind: crate::charset::AiComponentKind, min: usize, max: usize, optional: bool, linters: &[LinterFn]) -> ComponentSpec {
    ComponentSpec {
        kind,
        min_len: min,
        max_len: max,
        optional,
        linters: linters.to_vec(),
    }
}

fn def(
    ai: &str,
    fnc1: bool,
    dl_data_attr: DlDataAttr,
    components: Vec<ComponentSpec>,
    attrs: &str,
    title: &str,
) -> AiDefinition {
    AiDefinition {
        ai: ai.to_string(),
        fnc1,
        dl_data_attr,
        components,
        attrs: attrs.to_string(),
        title: title.to_string(),
    }
}

/// Build the embedded table. Called once, behind a `OnceLock`, by
/// [`crate::dictionary::Dictionary::embedded`].
pub fn table() -> Vec<AiDefinition> {
    use DlDataAttr::{None as NoAttr, Yes};

    let mut t = vec![
        def("00", false, NoAttr, vec![comp(N, 18, 18, false, &[linters::gcp_mod10_check_digit])], "dlpkey", "SSCC"),
        def("01", false, Yes, vec![comp(N, 14, 14, false, &[linters::gcp_mod10_check_digit])], "dlpkey=22,10,21", "GTIN"),
        def("02", true, NoAttr, vec![comp(N, 14, 14, false, &[linters::gcp_mod10_check_digit])], "", "CONTENT"),
        def("10", true, Yes, vec![comp(X, 1, 20, false, &[])], "", "BATCH/LOT"),
        def("11", true, Yes, vec![comp(N, 6, 6, false, &[linters::date_yymmdd])], "", "PROD DATE"),
        def("12", true, Yes, vec![comp(N, 6, 6, false, &[linters::date_yymmdd])], "", "DUE DATE"),
        def("13", true, Yes, vec![comp(N, 6, 6, false, &[linters::date_yymmdd])], "", "PACK DATE"),
        def("15", true, Yes, vec![comp(N, 6, 6, false, &[linters::date_yymmdd])], "", "BEST BEFORE or BEST BY"),
        def("16", true, Yes, vec![comp(N, 6, 6, false, &[linters::date_yymmdd])], "", "SELL BY"),
        def("17", true, Yes, vec![comp(N, 6, 6, false, &[linters::date_yymmdd])], "", "USE BY OR EXPIRY"),
        def("20", false, Yes, vec![comp(N, 2, 2, false, &[])], "", "VARIANT"),
        def("21", true, Yes, vec![comp(X, 1, 20, false, &[])], "req=01+21,8006+21", "SERIAL"),
        def("22", true, Yes, vec![comp(X, 1, 20, false, &[])], "dlpkey=01", "CPV"),
        def("235", true, Yes, vec![comp(X, 1, 28, false, &[])], "", "TPX"),
        def("240", true, Yes, vec![comp(X, 1, 30, false, &[])], "", "ADDITIONAL ID"),
        def("241", true, Yes, vec![comp(X, 1, 30, false, &[])], "", "CUST. PART No."),
        def("242", true, Yes, vec![comp(N, 1, 6, false, &[])], "", "MTO VARIANT"),
        def("243", true, Yes, vec![comp(X, 1, 20, false, &[])], "", "PCN"),
        def("250", true, Yes, vec![comp(X, 1, 30, false, &[])], "", "SECONDARY SERIAL"),
        def("251", true, Yes, vec![comp(X, 1, 30, false, &[])], "", "REF. TO SOURCE"),
        def("253", true, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit]), comp(X, 0, 17, true, &[])], "dlpkey", "GDTI"),
        def("254", true, Yes, vec![comp(X, 1, 20, false, &[])], "", "GLN EXTENSION COMPONENT"),
        def("255", true, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit]), comp(N, 0, 12, true, &[])], "dlpkey", "GCN"),
        def("30", true, Yes, vec![comp(N, 1, 8, false, &[])], "", "VAR. COUNT"),
        def("37", true, Yes, vec![comp(N, 1, 8, false, &[])], "", "COUNT"),
        def("400", true, Yes, vec![comp(X, 1, 30, false, &[])], "", "ORDER NUMBER"),
        def("401", true, Yes, vec![comp(X, 1, 30, false, &[])], "", "GINC"),
        def("402", true, Yes, vec![comp(N, 17, 17, false, &[linters::gcp_mod10_check_digit])], "", "GSIN"),
        def("403", true, Yes, vec![comp(X, 1, 30, false, &[])], "", "ROUTE"),
        def("410", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "", "SHIP TO LOC"),
        def("411", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "", "BILL TO"),
        def("412", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "", "PURCHASE FROM"),
        def("413", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "dlpkey", "SHIP FOR LOC"),
        def("414", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "dlpkey=254", "LOC No."),
        def("415", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "", "PAY TO"),
        def("416", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "dlpkey", "PROD/SERV LOC"),
        def("417", false, Yes, vec![comp(N, 13, 13, false, &[linters::gcp_mod10_check_digit])], "", "PARTY"),
        def("420", true, Yes, vec![comp(X, 1, 20, false, &[])], "", "SHIP TO POST"),
        def("421", true, Yes, vec![comp(N, 3, 3, false, &[linters::iso3166]), comp(X, 0, 9, true, &[])], "", "SHIP TO POST WITH ISO CODE"),
        def("422", false, Yes, vec![comp(N, 3, 3, false, &[linters::iso3166])], "ex=426", "ORIGIN"),
        def("423", true, Yes, vec![comp(N, 3, 15, false, &[])], "", "COUNTRY - INITIAL PROCESS"),
        def("424", false, Yes, vec![comp(N, 3, 3, false, &[linters::iso3166])], "", "COUNTRY - PROCESS"),
        def("425", true, Yes, vec![comp(N, 3, 15, false, &[])], "", "COUNTRY - DISASSEMBLY"),
        def("426", false, Yes, vec![comp(N, 3, 3, false, &[linters::iso3166])], "ex=422", "COUNTRY - FULL PROCESS"),
        def("427", true, Yes, vec![comp(X, 1, 3, false, &[])], "", "ORIGIN SUBDIVISION"),
        def("8001", false, Yes, vec![comp(N, 14, 14, false, &[])], "", "DIMENSIONS"),
        def("8002", true, Yes, vec![comp(X, 1, 20, false, &[])], "", "CMT No."),
        def("8003", true, Yes, vec![comp(N, 14, 14, false, &[linters::gcp_mod10_check_digit]), comp(X, 0, 16, true, &[])], "dlpkey", "GRAI"),
        def("8004", true, Yes, vec![comp(X, 1, 30, false, &[])], "dlpkey", "GIAI"),
        def("8005", false, Yes, vec![comp(N, 6, 6, false, &[])], "", "PRICE PER UNIT"),
        def("8006", false, Yes, vec![comp(N, 18, 18, false, &[linters::gcp_mod10_check_digit])], "dlpkey=22,10,21", "ITIP"),
        def("8007", true, Yes, vec![comp(X, 1, 34, false, &[linters::iban])], "", "IBAN"),
        def("8008", true, Yes, vec![comp(N, 8, 8, false, &[]), comp(N, 0, 4, true, &[])], "", "PROD TIME"),
        def("8010", true, Yes, vec![comp(Y, 1, 30, false, &[linters::check_pair])], "dlpkey=8011", "CPID"),
        def("8011", true, Yes, vec![comp(N, 1, 12, false, &[])], "", "CPID SERIAL"),
        def("8012", true, Yes, vec![comp(X, 1, 20, false, &[])], "", "VERSION"),
        def("8013", true, Yes, vec![comp(Y, 1, 25, false, &[linters::check_pair])], "dlpkey", "GMN"),
        def("8017", true, Yes, vec![comp(N, 18, 18, false, &[linters::gcp_mod10_check_digit])], "dlpkey=8019", "GSRN - PROVIDER"),
        def("8018", true, Yes, vec![comp(N, 18, 18, false, &[linters::gcp_mod10_check_digit])], "dlpkey=8019", "GSRN - RECIPIENT"),
        def("8019", true, Yes, vec![comp(N, 1, 10, false, &[])], "", "SRIN"),
        def("8020", true, Yes, vec![comp(X, 1, 25, false, &[])], "", "REF No."),
        def("8030", true, Yes, vec![comp(Z, 1, 90, false, &[])], "", "DIGSIG"),
        def("8110", true, Yes, vec![comp(X, 1, 70, false, &[linters::coupon_code])], "", "—"),
        def("8111", true, Yes, vec![comp(N, 4, 4, false, &[])], "", "POINTS"),
        def("8112", true, Yes, vec![comp(X, 1, 70, false, &[linters::coupon_code])], "", "PAPERLESS COUPON"),
        def("8200", true, Yes, vec![comp(X, 1, 70, false, &[])], "", "PRODUCT URL"),
        def("90", true, Yes, vec![comp(X, 0, 30, false, &[])], "", "INTERNAL"),
    ];

    // 310n-316n / 320n-369n: variable-measure families, one fixed-width N6
    // component, keyed by the last digit as the decimal-point indicator.
    // A representative span of the real GS1 table's block of ~60 AIs.
    for (prefix, title) in [
        ("310", "NET WEIGHT (kg)"),
        ("311", "LENGTH (m)"),
        ("312", "WIDTH (m)"),
        ("313", "HEIGHT (m)"),
        ("314", "AREA (m2)"),
        ("315", "NET VOLUME (l)"),
        ("316", "NET VOLUME (m3)"),
        ("320", "NET WEIGHT (lb)"),
        ("321", "LENGTH (in)"),
        ("322", "LENGTH (ft)"),
        ("323", "LENGTH (yd)"),
        ("324", "WIDTH (in)"),
        ("330", "GROSS WEIGHT (kg)"),
        ("337", "KG PER m2"),
        ("340", "GROSS WEIGHT (lb)"),
        ("356", "NET WEIGHT (troy oz)"),
        ("367", "AREA (ft2)"),
    ] {
        for digit in 0..=9u8 {
            let ai = format!("{prefix}{digit}");
            t.push(def(&ai, false, Yes, vec![comp(N, 6, 6, false, &[])], "", title));
        }
    }

    // 91-99: internal company use, fully variable CSET 82.
    for n in 91..=99 {
        t.push(def(&n.to_string(), true, Yes, vec![comp(X, 0, 90, false, &[])], "", "INTERNAL"));
    }

    t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_entry_has_consistent_shape() {
        for entry in table() {
            assert!(entry.validate_shape(), "AI {} has an invalid component shape", entry.ai);
            assert!(entry.ai.len() >= 2 && entry.ai.len() <= 4);
            assert!(entry.ai.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn same_prefix_same_length() {
        use std::collections::HashMap;
        let mut by_prefix: HashMap<String, usize> = HashMap::new();
        for entry in table() {
            let prefix = entry.ai[..2].to_string();
            let len = entry.ai.len();
            if let Some(&seen) = by_prefix.get(&prefix) {
                assert_eq!(seen, len, "prefix {prefix} has mixed AI lengths");
            } else {
                by_prefix.insert(prefix, len);
            }
        }
    }
}
