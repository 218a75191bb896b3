//! Concrete handlers and their registration order.

pub mod alfabank;
pub mod generic;
pub mod ozon;
pub mod sberbank;
pub mod tbank;

use std::sync::Arc;

use crate::detect::{BankDetector, BankSignature, VetoPolicy};
use crate::handler::BankHandler;
use crate::settings::Settings;

/// Amount token as printed in Russian statements: `1 234,56`, `150.00`, `5000`.
pub(crate) const AMOUNT: &str = r"\d{1,3}(?:[ \x{a0}\x{202f}]\d{3})+(?:[.,]\d{2})?|\d+(?:[.,]\d{2})?";

/// Date at the start of a line, `dd.mm.yyyy`.
pub(crate) const DAY: &str = r"\d{2}\.\d{2}\.\d{4}";

pub const SIGNATURES: [BankSignature; 4] = [
    sberbank::SIGNATURE,
    alfabank::SIGNATURE,
    ozon::SIGNATURE,
    tbank::SIGNATURE,
];

/// One veto policy covering every registered bank.
pub fn shared_veto() -> Arc<VetoPolicy> {
    Arc::new(VetoPolicy::new(SIGNATURES.to_vec()))
}

fn detector(signature: BankSignature, veto: &Arc<VetoPolicy>) -> BankDetector {
    BankDetector::new(signature, Arc::clone(veto))
}

/// Specific banks first, then one generic fallback per format.
pub fn default_handlers(settings: &Settings) -> Vec<Box<dyn BankHandler>> {
    let veto = shared_veto();
    vec![
        Box::new(sberbank::handler(detector(sberbank::SIGNATURE, &veto))),
        Box::new(alfabank::handler(detector(alfabank::SIGNATURE, &veto))),
        Box::new(ozon::handler(detector(ozon::SIGNATURE, &veto))),
        Box::new(tbank::pdf_handler(detector(tbank::SIGNATURE, &veto))),
        Box::new(tbank::csv_handler(detector(tbank::SIGNATURE, &veto))),
        Box::new(generic::csv_handler(&settings.default_currency)),
        Box::new(generic::excel_handler(&settings.default_currency)),
        Box::new(generic::text_handler(&settings.default_currency)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileFormat;

    #[test]
    fn test_fallbacks_are_last_and_cover_every_format() {
        let handlers = default_handlers(&Settings::default());
        let first_fallback = handlers.iter().position(|h| h.is_fallback()).unwrap();
        assert!(handlers[first_fallback..].iter().all(|h| h.is_fallback()));
        for format in FileFormat::ALL {
            let fallbacks = handlers
                .iter()
                .filter(|h| h.is_fallback() && h.supports_format(format))
                .count();
            assert_eq!(fallbacks, 1, "{format}");
        }
    }

    #[test]
    fn test_handler_ids_are_unique() {
        let handlers = default_handlers(&Settings::default());
        let mut ids: Vec<&str> = handlers.iter().map(|h| h.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), handlers.len());
    }

    #[test]
    fn test_every_builtin_layout_is_valid() {
        for handler in default_handlers(&Settings::default()) {
            for format in handler.formats().to_vec() {
                assert!(
                    handler.create_parser(format).is_ok(),
                    "{} / {format}",
                    handler.id()
                );
            }
        }
    }

    #[test]
    fn test_amount_token() {
        let re = regex::Regex::new(&format!("^(?:{AMOUNT})$")).unwrap();
        for ok in ["1 234,56", "150.00", "5000", "12\u{a0}000,00", "7"] {
            assert!(re.is_match(ok), "{ok}");
        }
        for bad in ["12345 150,00", "1,2", ""] {
            assert!(!re.is_match(bad), "{bad}");
        }
    }
}
