//! Bank signatures and the shared negative-keyword veto.
//!
//! A signature has two tiers: filename keywords and content indicators.
//! Every comparison is lower-cased on both sides; there is no per-bank casing rule.
//! The veto is one policy object built from the full list of registered
//! signatures, so each bank's indicators are at the same time its positive content
//! markers and the disqualifiers for every other bank.

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankSignature {
    pub id: &'static str,
    /// Filename substrings that suggest this bank.
    pub keywords: &'static [&'static str],
    /// Content markers that identify this bank's statements.
    pub indicators: &'static [&'static str],
}

impl BankSignature {
    fn keyword_in(&self, haystack: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| haystack.contains(&k.to_lowercase()))
    }

    fn indicator_in(&self, haystack: &str) -> bool {
        self.first_indicator(haystack).is_some()
    }

    fn first_indicator(&self, haystack: &str) -> Option<usize> {
        self.indicators
            .iter()
            .filter_map(|i| haystack.find(&i.to_lowercase()))
            .min()
    }

    fn owns_term(&self, term: &str) -> bool {
        self.keywords
            .iter()
            .chain(self.indicators.iter())
            .any(|own| own.to_lowercase().contains(term))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    FileName,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    Matched(Signal),
    Vetoed { by: &'static str },
    NoSignal,
}

/// Rival markers that disqualify a positive match.
///
/// * A rival indicator in the file name always vetoes.
/// * A rival indicator in the content sample vetoes when it appears before the
///   candidate's first own indicator (or the candidate has none).
/// * A match made on content alone is vetoed by a rival keyword in the file name.
/// * Rival terms that are substrings of the candidate's own terms are ignored.
#[derive(Debug, Default)]
pub struct VetoPolicy {
    signatures: Vec<BankSignature>,
}

impl VetoPolicy {
    pub fn new(signatures: Vec<BankSignature>) -> Self {
        Self { signatures }
    }

    pub fn rival(
        &self,
        own: &BankSignature,
        signal: Signal,
        file_name: &str,
        sample: &str,
    ) -> Option<&'static str> {
        let own_first = own.first_indicator(sample).unwrap_or(usize::MAX);
        for rival in self.signatures.iter().filter(|s| s.id != own.id) {
            for indicator in rival.indicators {
                let term = indicator.to_lowercase();
                if own.owns_term(&term) {
                    continue;
                }
                if file_name.contains(&term) || sample.find(&term).is_some_and(|pos| pos < own_first) {
                    return Some(rival.id);
                }
            }
            if signal == Signal::Content
                && rival
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .any(|k| !own.owns_term(&k) && file_name.contains(&k))
            {
                return Some(rival.id);
            }
        }
        None
    }
}

#[derive(Debug, Clone)]
pub struct BankDetector {
    signature: BankSignature,
    veto: Arc<VetoPolicy>,
}

impl BankDetector {
    pub fn new(signature: BankSignature, veto: Arc<VetoPolicy>) -> Self {
        Self { signature, veto }
    }

    pub fn signature(&self) -> &BankSignature {
        &self.signature
    }

    pub fn matches(&self, file_name: &str, sample: &str) -> bool {
        matches!(self.evaluate(file_name, sample), Detection::Matched(_))
    }

    pub fn evaluate(&self, file_name: &str, sample: &str) -> Detection {
        let file_name = file_name.to_lowercase();
        let sample = sample.to_lowercase();
        let signal = if self.signature.keyword_in(&file_name) {
            Signal::FileName
        } else if self.signature.indicator_in(&sample) {
            Signal::Content
        } else {
            return Detection::NoSignal;
        };
        if let Some(by) = self.veto.rival(&self.signature, signal, &file_name, &sample) {
            log::debug!("{}: match on {file_name} vetoed by {by} indicator", self.signature.id);
            return Detection::Vetoed { by };
        }
        Detection::Matched(signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALFA: BankSignature = BankSignature {
        id: "alfa",
        keywords: &["alfa", "альфа"],
        indicators: &["Альфа-Банк", "ALFA-BANK"],
    };
    const SBER: BankSignature = BankSignature {
        id: "sber",
        keywords: &["sber", "сбер"],
        indicators: &["Сбербанк", "SBERBANK"],
    };
    const OZON: BankSignature = BankSignature {
        id: "ozon",
        keywords: &["ozon"],
        indicators: &["Ozon Банк"],
    };

    fn detector(sig: BankSignature) -> BankDetector {
        BankDetector::new(sig, Arc::new(VetoPolicy::new(vec![ALFA, SBER, OZON])))
    }

    #[test]
    fn test_filename_keyword_case_insensitive() {
        let d = detector(ALFA);
        assert_eq!(d.evaluate("ALFA_statement.xlsx", ""), Detection::Matched(Signal::FileName));
        assert_eq!(d.evaluate("Выписка_Альфа.xlsx", ""), Detection::Matched(Signal::FileName));
    }

    #[test]
    fn test_content_indicator() {
        let d = detector(SBER);
        assert_eq!(
            d.evaluate("statement.pdf", "ПАО СБЕРБАНК\nВыписка по счёту"),
            Detection::Matched(Signal::Content)
        );
        assert_eq!(d.evaluate("statement.pdf", "nothing here"), Detection::NoSignal);
    }

    #[test]
    fn test_rival_in_filename_vetoes() {
        let d = detector(ALFA);
        assert_eq!(
            d.evaluate("alfa_to_sberbank.xlsx", ""),
            Detection::Vetoed { by: "sber" }
        );
    }

    #[test]
    fn test_rival_in_content_vetoes_without_own_indicator() {
        let d = detector(ALFA);
        assert_eq!(
            d.evaluate("alfa.xlsx", "Выписка ПАО Сбербанк"),
            Detection::Vetoed { by: "sber" }
        );
    }

    #[test]
    fn test_own_indicator_shields_content_mentions() {
        let d = detector(ALFA);
        assert_eq!(
            d.evaluate("alfa.xlsx", "АО Альфа-Банк\nПеревод в Сбербанк"),
            Detection::Matched(Signal::FileName)
        );
    }

    #[test]
    fn test_policy_is_symmetric_across_banks() {
        // The same file name resolves identically no matter which detector asks.
        let name = "sberbank_alfa-bank.xlsx";
        assert_eq!(detector(ALFA).evaluate(name, ""), Detection::Vetoed { by: "sber" });
        assert_eq!(detector(SBER).evaluate(name, ""), Detection::Vetoed { by: "alfa" });
    }

    #[test]
    fn test_first_named_bank_owns_content() {
        let sample = "ПАО Сбербанк\nПеревод клиенту Ozon Банк";
        assert_eq!(
            detector(SBER).evaluate("statement.pdf", sample),
            Detection::Matched(Signal::Content)
        );
        assert_eq!(
            detector(OZON).evaluate("statement.pdf", sample),
            Detection::Vetoed { by: "sber" }
        );
    }

    #[test]
    fn test_content_match_vetoed_by_rival_file_name() {
        assert_eq!(
            detector(OZON).evaluate("sber_export.pdf", "Ozon Банк"),
            Detection::Vetoed { by: "sber" }
        );
    }

    #[test]
    fn test_no_policy_means_no_veto() {
        let d = BankDetector::new(ALFA, Arc::new(VetoPolicy::default()));
        assert!(d.matches("alfa_sberbank.xlsx", ""));
    }
}
