// src/matching/name.rs - Company name normalization and base-name derivation

use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::config::{ConfigError, NameTables};

/// Normalized and base forms of one raw name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameForms {
    pub normalized: String,
    pub base: String,
}

/// Upper-case, replace anything but alphanumerics, whitespace, `&`, `/` and
/// `-` with a space, then collapse whitespace.
pub fn normalize_name(raw: &str) -> String {
    let cleaned: String = raw
        .to_uppercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() || matches!(c, '&' | '/' | '-') {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Turns raw names into base names using a fixed set of tables.
///
/// Stages run in a fixed order: normalize, strip legal suffixes, fold
/// trailing country tokens, substitute acronyms.
#[derive(Debug, Clone)]
pub struct Normalizer {
    suffix_patterns: Vec<Regex>,
    country_patterns: Vec<Regex>,
    acronyms: HashMap<String, String>,
    fold_subsidiaries: bool,
}

impl Normalizer {
    pub fn new(
        tables: &NameTables,
        acronym_overrides: &BTreeMap<String, String>,
        fold_subsidiaries: bool,
    ) -> Result<Self, ConfigError> {
        let mut acronyms = HashMap::new();
        for (key, value) in tables.acronyms.iter().chain(acronym_overrides.iter()) {
            let key = normalize_name(key);
            if key.is_empty() {
                return Err(ConfigError::EmptyAcronymKey(value.clone()));
            }
            acronyms.insert(key, normalize_name(value));
        }

        Ok(Self {
            suffix_patterns: trailing_patterns(&tables.suffixes)?,
            country_patterns: trailing_patterns(&tables.countries)?,
            acronyms,
            fold_subsidiaries,
        })
    }

    pub fn suffix_count(&self) -> usize {
        self.suffix_patterns.len()
    }

    /// Both forms for one raw value; an absent name yields empty strings.
    pub fn forms(&self, raw: Option<&str>) -> NameForms {
        let normalized = raw.map(normalize_name).unwrap_or_default();
        let base = self.derive_base(&normalized);
        NameForms { normalized, base }
    }

    pub fn derive_base(&self, normalized: &str) -> String {
        let stripped = self.strip_suffixes(normalized);
        let folded = self.fold_subsidiaries(&stripped);
        self.substitute_acronym(folded)
    }

    /// Remove trailing legal suffixes until none is left ("X PVT LTD LLC" -> "X").
    pub fn strip_suffixes(&self, name: &str) -> String {
        strip_until_stable(name, &self.suffix_patterns)
    }

    /// Remove trailing country tokens ("APPLE INDIA" -> "APPLE"); no-op when disabled.
    pub fn fold_subsidiaries(&self, name: &str) -> String {
        if !self.fold_subsidiaries {
            return name.to_string();
        }
        strip_until_stable(name, &self.country_patterns)
    }

    /// Whole-string replacement, not a further strip.
    pub fn substitute_acronym(&self, name: String) -> String {
        match self.acronyms.get(&name) {
            Some(expansion) => expansion.clone(),
            None => name,
        }
    }
}

/// Compile `\bTOKEN$` patterns, longest token first so "PVT LTD" wins over "LTD".
fn trailing_patterns(entries: &[String]) -> Result<Vec<Regex>, ConfigError> {
    let mut seen = HashSet::new();
    let mut tokens: Vec<String> = entries
        .iter()
        .map(|entry| normalize_name(entry))
        .filter(|token| !token.is_empty() && seen.insert(token.clone()))
        .collect();
    // Stable sort keeps table order among equal lengths.
    tokens.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));

    tokens
        .iter()
        .map(|token| {
            let pattern = format!(r"\b{}$", regex::escape(token));
            Regex::new(&pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern,
                message: e.to_string(),
            })
        })
        .collect()
}

fn strip_until_stable(name: &str, patterns: &[Regex]) -> String {
    let mut current = name.trim().to_string();
    loop {
        let before = current.clone();
        for pattern in patterns {
            if pattern.is_match(&current) {
                current = pattern.replace(&current, "").trim().to_string();
            }
        }
        // Every change shortens the string, so this terminates.
        if current == before {
            return current;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> Normalizer {
        Normalizer::new(&NameTables::default(), &BTreeMap::new(), true).unwrap()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  ibm   india, pvt. ltd. "), "IBM INDIA PVT LTD");
        assert_eq!(normalize_name("AT&T / Mobility-West"), "AT&T / MOBILITY-WEST");
        assert_eq!(normalize_name("Procter & Gamble (P&G)!"), "PROCTER & GAMBLE P&G");
        assert_eq!(normalize_name("...,,,"), "");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["IBM India Pvt Ltd", "a.b.c", "Tata   Consultancy", "S.A. de C.V.", "ÉCOLE"] {
            let once = normalize_name(raw);
            assert_eq!(normalize_name(&once), once);
        }
    }

    #[test]
    fn test_strip_suffixes_longest_first() {
        let n = normalizer();
        assert_eq!(n.strip_suffixes("IBM INDIA PVT LTD"), "IBM INDIA");
        assert_eq!(n.strip_suffixes("ACME PRIVATE LIMITED"), "ACME");
        assert_eq!(n.strip_suffixes("SIEMENS GMBH & CO KG"), "SIEMENS");
    }

    #[test]
    fn test_strip_suffixes_compound_terminates() {
        let n = normalizer();
        let suffix_chains = [
            "",
            " LTD",
            " PVT LTD LLC",
            " INC LIMITED CO",
            " PLC LLP PTE LTD COMPANY",
            " S A DE C V",
        ];
        for chain in suffix_chains {
            let name = format!("WIDGETS{}", chain);
            assert_eq!(n.strip_suffixes(&name), "WIDGETS", "input: {}", name);
        }
    }

    #[test]
    fn test_suffix_needs_word_boundary() {
        let n = normalizer();
        // "CO" inside a word is not a suffix.
        assert_eq!(n.strip_suffixes("TESCO"), "TESCO");
        assert_eq!(n.strip_suffixes("LTD"), "");
    }

    #[test]
    fn test_fold_subsidiaries() {
        let n = normalizer();
        assert_eq!(n.fold_subsidiaries("APPLE INDIA"), "APPLE");
        assert_eq!(n.fold_subsidiaries("HSBC HONG KONG"), "HSBC");
        assert_eq!(n.fold_subsidiaries("ACME USA INDIA"), "ACME");
        assert_eq!(n.fold_subsidiaries("INDIANA STEEL"), "INDIANA STEEL");

        let no_fold = Normalizer::new(&NameTables::default(), &BTreeMap::new(), false).unwrap();
        assert_eq!(no_fold.fold_subsidiaries("APPLE INDIA"), "APPLE INDIA");
    }

    #[test]
    fn test_acronym_substitution_and_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("ge".to_string(), "General Electric".to_string());
        overrides.insert("HDFC".to_string(), "HDFC LTD GROUP".to_string());
        let n = Normalizer::new(&NameTables::default(), &overrides, true).unwrap();

        assert_eq!(n.forms(Some("TCS")).base, "TATA CONSULTANCY SERVICES");
        assert_eq!(n.forms(Some("ge")).base, "GENERAL ELECTRIC");
        // overrides win over built-ins
        assert_eq!(n.forms(Some("HDFC")).base, "HDFC LTD GROUP");
        // only exact matches are substituted
        assert_eq!(n.forms(Some("TCS GLOBAL")).base, "TCS GLOBAL");
    }

    #[test]
    fn test_forms_pipeline_order() {
        let n = normalizer();
        let forms = n.forms(Some("IBM India Pvt Ltd"));
        assert_eq!(forms.normalized, "IBM INDIA PVT LTD");
        assert_eq!(forms.base, "IBM");

        let forms = n.forms(Some("Tata Consultancy Services Limited"));
        assert_eq!(forms.base, "TATA CONSULTANCY SERVICES");

        assert_eq!(
            n.forms(None),
            NameForms {
                normalized: String::new(),
                base: String::new()
            }
        );
        assert_eq!(n.forms(Some("Ltd.")).base, "");
    }

    #[test]
    fn test_dotted_suffixes_are_normalized_and_deduped() {
        let n = normalizer();
        // "PVT. LTD." and "PVT LTD" collapse to one pattern, "CO." to "CO".
        assert!(n.suffix_count() < NameTables::default().suffixes.len());
        assert_eq!(n.strip_suffixes("FOO B V"), "FOO");
    }
}
