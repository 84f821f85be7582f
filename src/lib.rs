//! GS1 Application Identifier barcode syntax engine.
//!
//! Parses and converts GS1 AI data between bracketed element strings,
//! unbracketed (canonical) element strings, GS1 Digital Link URIs and AIM
//! scan data, against an embedded or caller-supplied syntax dictionary.

pub mod ai_value;
pub mod charset;
pub mod context;
pub mod dictionary;
pub mod digital_link;
pub mod element_string;
pub mod error;
pub mod linters;
pub mod scan_data;
pub mod validators;

pub use ai_value::{AiValue, AiValueKind};
pub use context::{Gs1Context, Options};
pub use dictionary::Dictionary;
pub use error::Gs1Error;
pub use scan_data::Symbology;
pub use validators::{ValidationId, ValidationTable};
