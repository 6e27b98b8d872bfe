//! Rule-based noun lemmatizer.
//!
//! Lemmas are resolved the way a dictionary lemmatizer does it for the noun
//! part of speech: irregular plurals come from an exception table, a list
//! of words that already are base forms is left alone, and everything else
//! goes through suffix-detachment rules (`-ies` → `-y`, `-ches` → `-ch`,
//! `-s` → ``, ...).
//!
//! Dictionary entries are lowercase, so a token carrying any uppercase
//! letter, digit or punctuation is returned unchanged.

use ahash::{AHashMap, AHashSet};

use super::Lemmatizer;

const IRREGULAR_PLURALS: &[(&str, &str)] = &[
    ("alumni", "alumnus"),
    ("analyses", "analysis"),
    ("appendices", "appendix"),
    ("buffaloes", "buffalo"),
    ("buses", "bus"),
    ("cacti", "cactus"),
    ("calves", "calf"),
    ("cargoes", "cargo"),
    ("children", "child"),
    ("cookies", "cookie"),
    ("crises", "crisis"),
    ("criteria", "criterion"),
    ("data", "datum"),
    ("diagnoses", "diagnosis"),
    ("dominoes", "domino"),
    ("echoes", "echo"),
    ("embargoes", "embargo"),
    ("feet", "foot"),
    ("firemen", "fireman"),
    ("fishermen", "fisherman"),
    ("fungi", "fungus"),
    ("gases", "gas"),
    ("geese", "goose"),
    ("halves", "half"),
    ("heroes", "hero"),
    ("indices", "index"),
    ("knives", "knife"),
    ("leaves", "leaf"),
    ("lice", "louse"),
    ("lives", "life"),
    ("loaves", "loaf"),
    ("matrices", "matrix"),
    ("media", "medium"),
    ("men", "man"),
    ("mice", "mouse"),
    ("mosquitoes", "mosquito"),
    ("mottoes", "motto"),
    ("movies", "movie"),
    ("nuclei", "nucleus"),
    ("oxen", "ox"),
    ("phenomena", "phenomenon"),
    ("policemen", "policeman"),
    ("potatoes", "potato"),
    ("quizzes", "quiz"),
    ("radii", "radius"),
    ("selves", "self"),
    ("shelves", "shelf"),
    ("spokesmen", "spokesman"),
    ("stimuli", "stimulus"),
    ("teeth", "tooth"),
    ("thieves", "thief"),
    ("tomatoes", "tomato"),
    ("tornadoes", "tornado"),
    ("torpedoes", "torpedo"),
    ("vetoes", "veto"),
    ("volcanoes", "volcano"),
    ("wives", "wife"),
    ("wolves", "wolf"),
    ("women", "woman"),
];

const UNINFLECTED: &[&str] = &[
    "afterwards",
    "always",
    "athletics",
    "backwards",
    "besides",
    "christmas",
    "clothes",
    "diabetes",
    "downstairs",
    "downwards",
    "economics",
    "ethics",
    "forwards",
    "goes",
    "headquarters",
    "hers",
    "honduras",
    "lens",
    "means",
    "measles",
    "mathematics",
    "news",
    "nowadays",
    "ours",
    "outwards",
    "overseas",
    "perhaps",
    "physics",
    "politics",
    "series",
    "sometimes",
    "species",
    "texas",
    "thanks",
    "theirs",
    "towards",
    "upstairs",
    "upwards",
    "whereas",
    "yours",
];

/// Lemmatizer that assumes every word is a noun.
#[derive(Debug, Clone)]
pub struct NounLemmatizer {
    exceptions: AHashMap<&'static str, &'static str>,
    uninflected: AHashSet<&'static str>,
}

impl NounLemmatizer {
    /// Create a new noun lemmatizer with the built-in exception tables.
    pub fn new() -> Self {
        NounLemmatizer {
            exceptions: IRREGULAR_PLURALS.iter().copied().collect(),
            uninflected: UNINFLECTED.iter().copied().collect(),
        }
    }

    fn detach_suffix(word: &str) -> Option<String> {
        let strip = |n: usize| Some(word[..word.len() - n].to_string());

        if word.ends_with("sses") {
            return strip(2);
        }
        // ourselves, themselves, yourselves: pronouns, not plurals of "selve"
        if word.ends_with("ss")
            || word.ends_with("us")
            || word.ends_with("is")
            || (word.ends_with("selves") && word != "selves")
        {
            return None;
        }
        if word.ends_with("ies") && word.len() > 4 {
            return Some(format!("{}y", &word[..word.len() - 3]));
        }
        if word.ends_with("xes")
            || word.ends_with("zzes")
            || word.ends_with("shes")
            || word.ends_with("tches")
        {
            return strip(2);
        }
        if let Some(stem) = word.strip_suffix("ches") {
            if stem.ends_with(['r', 'n', 'l']) {
                return strip(2);
            }
        }
        if word.ends_with('s') {
            return strip(1);
        }
        None
    }
}

impl Default for NounLemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer for NounLemmatizer {
    fn lemmatize(&self, word: &str) -> String {
        if word.is_empty() || !word.chars().all(|c| c.is_ascii_lowercase()) {
            return word.to_string();
        }
        if let Some(base) = self.exceptions.get(word) {
            return (*base).to_string();
        }
        if word.len() <= 3 || self.uninflected.contains(word) {
            return word.to_string();
        }

        Self::detach_suffix(word).unwrap_or_else(|| word.to_string())
    }

    fn name(&self) -> &'static str {
        "noun"
    }
}
