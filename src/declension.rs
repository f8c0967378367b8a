//! Declension table: maps nominative noun forms to their oblique forms
//! (genitive, accusative, dative, ablative, vocative) and back.
//!
//! A built-in table seeds one noun per declension class, covering the
//! nouns used in the language's own end-to-end scenarios. New
//! nominatives are registered at `SIT`-time, deriving oblique forms from
//! the nominative's ending using an ordered suffix rule list (fallback
//! last).

use std::collections::HashMap;

/// The five oblique cases LATIN recognizes, plus the case names used for
/// comparisons (`SI`, `DUM`) never touch this — only field access
/// (genitive) and argument-passing grammar reference these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    Genitive,
    Accusative,
    Dative,
    Ablative,
    Vocative,
}

/// The five oblique forms of one nominative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclensionEntry {
    pub genitive: String,
    pub accusative: String,
    pub dative: String,
    pub ablative: String,
    pub vocative: String,
}

impl DeclensionEntry {
    /// All five forms paired with their case, in a fixed scan order
    /// (genitive, accusative, dative, ablative, vocative). This order is
    /// also the tie-break order used when two forms of the *same* noun
    /// would otherwise match a prefix with equal length.
    pub fn forms(&self) -> [(Case, &str); 5] {
        [
            (Case::Genitive, &self.genitive),
            (Case::Accusative, &self.accusative),
            (Case::Dative, &self.dative),
            (Case::Ablative, &self.ablative),
            (Case::Vocative, &self.vocative),
        ]
    }

    pub fn get(&self, case: Case) -> &str {
        match case {
            Case::Genitive => &self.genitive,
            Case::Accusative => &self.accusative,
            Case::Dative => &self.dative,
            Case::Ablative => &self.ablative,
            Case::Vocative => &self.vocative,
        }
    }
}

/// Derive oblique forms for a nominative using an ending-based heuristic,
/// checked in the table's own row order; the fallback row always applies
/// if nothing more specific matches.
fn generate(nominative: &str) -> DeclensionEntry {
    if let Some(stem) = nominative.strip_suffix("US") {
        return DeclensionEntry {
            genitive: format!("{stem}I"),
            accusative: format!("{stem}UM"),
            dative: format!("{stem}O"),
            ablative: format!("{stem}O"),
            vocative: format!("{stem}E"),
        };
    }
    if nominative.ends_with("OR") {
        return DeclensionEntry {
            genitive: format!("{nominative}IS"),
            accusative: format!("{nominative}EM"),
            dative: format!("{nominative}I"),
            ablative: format!("{nominative}E"),
            vocative: nominative.to_string(),
        };
    }
    if nominative.ends_with("IO") {
        return DeclensionEntry {
            genitive: format!("{nominative}NIS"),
            accusative: format!("{nominative}NEM"),
            dative: format!("{nominative}NI"),
            ablative: format!("{nominative}NE"),
            vocative: nominative.to_string(),
        };
    }
    if let Some(stem) = nominative.strip_suffix('A') {
        return DeclensionEntry {
            genitive: format!("{stem}AE"),
            accusative: format!("{stem}AM"),
            dative: format!("{stem}AE"),
            ablative: format!("{stem}A"),
            vocative: format!("{stem}A"),
        };
    }
    if let Some(stem) = nominative
        .strip_suffix("VM")
        .or_else(|| nominative.strip_suffix("UM"))
    {
        return DeclensionEntry {
            genitive: format!("{stem}I"),
            accusative: nominative.to_string(),
            dative: format!("{stem}O"),
            ablative: format!("{stem}O"),
            vocative: nominative.to_string(),
        };
    }
    // Fallback row.
    DeclensionEntry {
        genitive: format!("{nominative}I"),
        accusative: format!("{nominative}M"),
        dative: format!("{nominative}O"),
        ablative: format!("{nominative}O"),
        vocative: format!("{nominative}E"),
    }
}

/// The declension table: every nominative LATIN has ever seen, built-in
/// or auto-registered at declaration time.
#[derive(Debug, Clone, Default)]
pub struct DeclensionTable {
    entries: HashMap<String, DeclensionEntry>,
}

impl DeclensionTable {
    /// A fresh table seeded with the built-in nouns.
    pub fn with_builtins() -> Self {
        let mut table = Self::default();
        // 2nd declension masculine (-US): stem+I/UM/O/O/E.
        for nom in ["NUMERUS", "PRIMUS", "SECUNDUS", "TERTIUS", "AMICUS", "SERVUS"] {
            table.entries.insert(nom.to_string(), generate(nom));
        }
        // 1st declension feminine (-A): stem+AE/AM/AE/A/A.
        for nom in ["PUELLA", "SUMMA"] {
            table.entries.insert(nom.to_string(), generate(nom));
        }
        // 2nd declension neuter (-UM): stem+I, same, O, O, same.
        for nom in ["BELLUM", "RESULTATUM"] {
            table.entries.insert(nom.to_string(), generate(nom));
        }
        // 3rd declension (-OR rule).
        table.entries.insert(
            "AMOR".to_string(),
            DeclensionEntry {
                genitive: "AMORIS".to_string(),
                accusative: "AMOREM".to_string(),
                dative: "AMORI".to_string(),
                ablative: "AMORE".to_string(),
                vocative: "AMOR".to_string(),
            },
        );
        // 3rd declension (-IO rule).
        table.entries.insert(
            "REGIO".to_string(),
            DeclensionEntry {
                genitive: "REGIONIS".to_string(),
                accusative: "REGIONEM".to_string(),
                dative: "REGIONI".to_string(),
                ablative: "REGIONE".to_string(),
                vocative: "REGIO".to_string(),
            },
        );
        // Irregular 3rd declension nouns with classical (non-heuristic) forms.
        table.entries.insert(
            "INDEX".to_string(),
            DeclensionEntry {
                genitive: "INDICIS".to_string(),
                accusative: "INDICEM".to_string(),
                dative: "INDICI".to_string(),
                ablative: "INDICE".to_string(),
                vocative: "INDEX".to_string(),
            },
        );
        table.entries.insert(
            "NOMEN".to_string(),
            DeclensionEntry {
                genitive: "NOMINIS".to_string(),
                accusative: "NOMEN".to_string(),
                dative: "NOMINI".to_string(),
                ablative: "NOMINE".to_string(),
                vocative: "NOMEN".to_string(),
            },
        );
        // 5th declension, irregular (classical RES/REM/REI/RE/RES).
        table.entries.insert(
            "RES".to_string(),
            DeclensionEntry {
                genitive: "REI".to_string(),
                accusative: "REM".to_string(),
                dative: "REI".to_string(),
                ablative: "RE".to_string(),
                vocative: "RES".to_string(),
            },
        );
        table
    }

    /// Whether a nominative already has an entry.
    pub fn contains(&self, nominative: &str) -> bool {
        self.entries.contains_key(nominative)
    }

    /// Register `nominative` if it is new, generating oblique forms from
    /// its ending. No-op if already present (built-in entries are never
    /// overwritten by the heuristic).
    pub fn register(&mut self, nominative: &str) {
        if !self.entries.contains_key(nominative) {
            self.entries
                .insert(nominative.to_string(), generate(nominative));
        }
    }

    /// `get_oblique(nom, case)`.
    pub fn get_oblique(&self, nominative: &str, case: Case) -> Option<&str> {
        self.entries.get(nominative).map(|e| e.get(case))
    }

    pub fn entry(&self, nominative: &str) -> Option<&DeclensionEntry> {
        self.entries.get(nominative)
    }

    /// `nominative_of(form)`: the nominative whose forms contain `form`,
    /// or `form` itself if it is already a nominative key. `None` if
    /// `form` matches nothing in the table at all.
    pub fn nominative_of(&self, form: &str) -> Option<String> {
        if self.entries.contains_key(form) {
            return Some(form.to_string());
        }
        for (nom, entry) in &self.entries {
            if entry.forms().iter().any(|(_, f)| *f == form) {
                return Some(nom.clone());
            }
        }
        None
    }

    /// Every nominative the table knows, built-in or auto-registered.
    /// Used by the tokenizer to recognize a noun (e.g. a record field
    /// name) that is a valid declension key even though no `SIT` ever
    /// declared it as a variable.
    pub fn nominatives(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Longest nominative key that is a prefix of `text`. Used by `SIT`'s
    /// bare-name capture: re-use a known nominative rather than always
    /// minting a new one.
    pub fn longest_nominative_prefix(&self, text: &str) -> Option<&str> {
        self.entries
            .keys()
            .filter(|nom| text.starts_with(nom.as_str()))
            .map(|nom| nom.as_str())
            .max_by_key(|nom| nom.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_builtin_us_declension() {
        let table = DeclensionTable::with_builtins();
        let e = table.entry("NUMERUS").unwrap();
        assert_eq!(e.genitive, "NUMERI");
        assert_eq!(e.accusative, "NUMERUM");
        assert_eq!(e.dative, "NUMERO");
        assert_eq!(e.ablative, "NUMERO");
        assert_eq!(e.vocative, "NUMERE");
    }

    #[test]
    fn test_builtin_a_declension() {
        let table = DeclensionTable::with_builtins();
        let e = table.entry("SUMMA").unwrap();
        assert_eq!(e.genitive, "SUMMAE");
        assert_eq!(e.accusative, "SUMMAM");
        assert_eq!(e.ablative, "SUMMA");
    }

    #[test]
    fn test_builtin_neuter_um_declension() {
        let table = DeclensionTable::with_builtins();
        let e = table.entry("RESULTATUM").unwrap();
        assert_eq!(e.genitive, "RESULTATI");
        assert_eq!(e.accusative, "RESULTATUM"); // same as nominative
        assert_eq!(e.vocative, "RESULTATUM");
    }

    #[test]
    fn test_auto_register_or_suffix() {
        let mut table = DeclensionTable::default();
        table.register("AUCTOR");
        let e = table.entry("AUCTOR").unwrap();
        assert_eq!(e.genitive, "AUCTORIS");
        assert_eq!(e.vocative, "AUCTOR");
    }

    #[test]
    fn test_auto_register_io_suffix() {
        let mut table = DeclensionTable::default();
        table.register("LEGIO");
        let e = table.entry("LEGIO").unwrap();
        assert_eq!(e.genitive, "LEGIONIS");
        assert_eq!(e.accusative, "LEGIONEM");
    }

    #[test]
    fn test_auto_register_fallback() {
        let mut table = DeclensionTable::default();
        table.register("CAPVT"); // ends in T: no specific rule applies
        let e = table.entry("CAPVT").unwrap();
        assert_eq!(e.genitive, "CAPVTI");
        assert_eq!(e.accusative, "CAPVTM");
        assert_eq!(e.vocative, "CAPVTE");
    }

    #[test]
    fn test_register_does_not_overwrite() {
        let mut table = DeclensionTable::with_builtins();
        let before = table.entry("NUMERUS").cloned();
        table.register("NUMERUS");
        assert_eq!(table.entry("NUMERUS").cloned(), before);
    }

    #[test]
    fn test_nominative_of_self() {
        let table = DeclensionTable::with_builtins();
        assert_eq!(table.nominative_of("NUMERUS"), Some("NUMERUS".to_string()));
    }

    #[test]
    fn test_nominative_of_oblique() {
        let table = DeclensionTable::with_builtins();
        assert_eq!(table.nominative_of("NUMERI"), Some("NUMERUS".to_string()));
        assert_eq!(table.nominative_of("NUMERUM"), Some("NUMERUS".to_string()));
    }

    #[test]
    fn test_nominative_of_unknown() {
        let table = DeclensionTable::with_builtins();
        assert_eq!(table.nominative_of("XYZZY"), None);
    }

    proptest! {
        #[test]
        fn prop_nominative_of_oblique_roundtrip(
            nom in "[A-Z]{3,8}", case_idx in 0usize..5
        ) {
            let mut table = DeclensionTable::default();
            table.register(&nom);
            let entry = table.entry(&nom).unwrap().clone();
            let cases = [Case::Genitive, Case::Accusative, Case::Dative, Case::Ablative, Case::Vocative];
            let form = entry.get(cases[case_idx]).to_string();
            // nominative_of must recover the nominative from any oblique
            // form (unless that form happens to coincide with the
            // nominative itself, which is still a correct answer).
            prop_assert_eq!(table.nominative_of(&form), Some(nom));
        }
    }
}
