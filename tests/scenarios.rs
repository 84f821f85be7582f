//! End-to-end tests against the public `Gs1Context` surface, covering the
//! six concrete scenarios and a handful of the round-trip laws.

use gs1_syntax_engine::{Gs1Context, Gs1Error};

#[test]
fn dl_uri_with_qualifiers_and_query_attribute() {
    let mut ctx = Gs1Context::new();
    ctx.set_data_str("https://id.gs1.org/01/09520123456788/10/ABC1/21/12345?17=180426")
        .unwrap();
    assert_eq!(ctx.get_data_str(), Some("^010952012345678810ABC1^2112345^17180426"));
    assert_eq!(
        ctx.get_hri(),
        vec!["(01) 09520123456788", "(10) ABC1", "(21) 12345", "(17) 180426"]
    );
}

#[test]
fn bracketed_gtin_with_qualifiers_generates_full_dl_path() {
    let mut ctx = Gs1Context::new();
    ctx.set_ai_data_str("(01)12312312312326(22)ABC(10)DEF(21)GHI").unwrap();
    assert_eq!(
        ctx.get_dl_uri(None).as_deref(),
        Some("https://id.gs1.org/01/12312312312326/22/ABC/10/DEF/21/GHI")
    );
}

#[test]
fn first_key_wins_primary_and_remaining_keys_demote_to_attributes() {
    let mut ctx = Gs1Context::new();
    ctx.set_ai_data_str("(253)9526064000028000001(99)000001(01)12312312312326(22)ABC(10)DEF(21)GHI(95)INT")
        .unwrap();
    assert_eq!(
        ctx.get_dl_uri(Some("https://example.com")).as_deref(),
        Some("https://example.com/253/9526064000028000001?01=12312312312326&99=000001&22=ABC&10=DEF&21=GHI&95=INT")
    );
}

#[test]
fn gs1_128_scan_data_decodes_to_canonical_message() {
    let mut ctx = Gs1Context::new();
    ctx.set_scan_data("]C1011231231231233310ABC123\u{1D}99TESTING").unwrap();
    assert_eq!(ctx.get_data_str(), Some("^011231231231233310ABC123^99TESTING"));
}

#[test]
fn illegal_month_fails_with_positional_markup() {
    let mut ctx = Gs1Context::new();
    let err = ctx.set_ai_data_str("(01)95012345678903(11)131313").unwrap_err();
    assert!(matches!(err, Gs1Error::LinterFailed { .. }));
    assert_eq!(ctx.get_err_markup().as_deref(), Some("(11)13|13|13"));
}

#[test]
fn attribute_that_belongs_in_path_is_rejected() {
    let mut ctx = Gs1Context::new();
    let err = ctx.set_data_str("https://example.com/01/09520123456788?10=ABC123").unwrap_err();
    assert!(matches!(err, Gs1Error::UriAttributeShouldBeInPath { ai } if ai == "10"));
}

#[test]
fn bracketed_to_unbracketed_to_bracketed_is_the_identity() {
    let mut ctx = Gs1Context::new();
    ctx.set_ai_data_str("(01)12345678901231(10)ABC123(21)XYZ").unwrap();
    let canonical = ctx.get_data_str().unwrap().to_string();

    let mut round_tripped = Gs1Context::new();
    round_tripped.set_data_str(&canonical).unwrap();
    assert_eq!(round_tripped.get_ai_data_str().as_deref(), Some("(01)12345678901231(10)ABC123(21)XYZ"));
}

#[test]
fn scan_data_set_then_get_is_the_identity() {
    let mut ctx = Gs1Context::new();
    let raw = "]C1011231231231233310ABC123\u{1D}99TESTING";
    ctx.set_scan_data(raw).unwrap();
    assert_eq!(ctx.get_scan_data().as_deref(), Some(raw));
}

#[test]
fn leading_caret_with_no_ai_is_ai_data_empty() {
    let mut ctx = Gs1Context::new();
    let err = ctx.set_data_str("^").unwrap_err();
    assert_eq!(err, Gs1Error::AiDataEmpty);
}

#[test]
fn unknown_ai_in_unbracketed_input_is_rejected_even_when_permitted() {
    let mut ctx = Gs1Context::new();
    ctx.set_permit_unknown_ais(true);
    assert!(ctx.set_data_str("^77testvalue").is_err());
}

#[test]
fn dl_uri_ending_with_slash_is_rejected() {
    let mut ctx = Gs1Context::new();
    let err = ctx.set_data_str("https://id.gs1.org/01/09520123456788/").unwrap_err();
    assert_eq!(err, Gs1Error::UriEndsWithSlash);
}

#[test]
fn dl_uri_with_mixed_case_scheme_is_rejected() {
    let mut ctx = Gs1Context::new();
    let err = ctx.set_data_str("HtTp://id.gs1.org/01/09520123456788").unwrap_err();
    assert_eq!(err, Gs1Error::UriBadScheme);
}

#[test]
fn failed_setter_clears_previously_loaded_state() {
    let mut ctx = Gs1Context::new();
    ctx.set_ai_data_str("(01)12312312312326").unwrap();
    assert!(ctx.set_ai_data_str("(01)notanumber").is_err());
    assert!(ctx.get_data_str().is_none());
    assert!(ctx.get_ai_data_str().is_none());
    assert!(ctx.get_hri().is_empty());
}
