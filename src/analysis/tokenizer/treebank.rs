//! Penn Treebank style word tokenizer.
//!
//! Text is first split into sentences on Unicode sentence boundaries
//! (UAX #29). A boundary right after a known abbreviation (`Mr.`, `Dr.`,
//! `U.S.`) is not a sentence end, so those pieces are joined back. Each
//! sentence is then rewritten by an ordered list of regex
//! substitutions that pad punctuation, brackets and contractions with
//! spaces, and the result is split on whitespace:
//!
//! ```text
//! "They don't have food." → ["They", "do", "n't", "have", "food", "."]
//! ```
//!
//! Double quotes are rewritten to ``` `` ``` (opening) and `''` (closing)
//! as in the Treebank corpus.

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

use crate::analysis::token::{Token, TokenStream};
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{Result, TriageError};

/// A single substitution rule.
#[derive(Clone, Debug)]
struct Rule {
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn new(pattern: &str, replacement: &'static str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| {
            TriageError::analysis(format!("Invalid treebank pattern {pattern:?}: {e}"))
        })?;
        Ok(Rule {
            pattern,
            replacement,
        })
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

const STARTING_QUOTES: &[(&str, &str)] = &[
    (r#"^""#, "``"),
    (r"(``)", " $1 "),
    (r#"([ (\[{<])("|'{2})"#, "$1 `` "),
];

const PUNCTUATION: &[(&str, &str)] = &[
    (r#"([^.])(\.)([\])}>"']*)\s*$"#, "$1 $2 $3 "),
    (r"([:,])([^\d])", " $1 $2"),
    (r"([:,])$", " $1 "),
    (r"\.{2,}", " $0 "),
    (r"[;@#$%&]", " $0 "),
    (r#"([^.])(\.)([\])}>"']*)\s*$"#, "$1 $2$3 "),
    (r"[?!]", " $0 "),
    (r"([^'])' ", "$1 ' "),
    (r"[*]", " $0 "),
];

const PARENS_BRACKETS: (&str, &str) = (r"[\]\[(){}<>]", " $0 ");

const DOUBLE_DASHES: (&str, &str) = (r"--", " -- ");

const ENDING_QUOTES: &[(&str, &str)] = &[
    (r"''", " '' "),
    (r#"""#, " '' "),
    (r"(\S)('')", "$1 $2 "),
    (r"([^' ])('[sS]|'[mM]|'[dD]|') ", "$1 $2 "),
    (r"([^' ])('ll|'LL|'re|'RE|'ve|'VE|n't|N'T) ", "$1 $2 "),
];

const CONTRACTIONS: &[(&str, &str)] = &[
    (r"(?i)\b(can)(not)\b", " $1 $2 "),
    (r"(?i)\b(d)('ye)\b", " $1 $2 "),
    (r"(?i)\b(gim)(me)\b", " $1 $2 "),
    (r"(?i)\b(gon)(na)\b", " $1 $2 "),
    (r"(?i)\b(got)(ta)\b", " $1 $2 "),
    (r"(?i)\b(lem)(me)\b", " $1 $2 "),
    (r"(?i)\b(more)('n)\b", " $1 $2 "),
    (r"(?i)\b(wan)(na)(\s)", " $1 $2 $3"),
    (r"(?i) ('t)(is)\b", " $1 $2 "),
    (r"(?i) ('t)(was)\b", " $1 $2 "),
];

/// Lowercase abbreviations that end with a period mid-sentence.
const ABBREVIATIONS: &[&str] = &[
    "apr", "aug", "capt", "co", "col", "dec", "dr", "feb", "gen", "gov", "inc", "jan", "jr",
    "jul", "jun", "lt", "ltd", "mar", "mr", "mrs", "ms", "mt", "no", "nov", "oct", "prof", "rep",
    "sen", "sep", "sept", "sgt", "sr", "st", "vs",
];

/// Whether `sentence` ends in an abbreviation such as `Mr.` or `U.S.`.
fn ends_with_abbreviation(sentence: &str) -> bool {
    let Some(head) = sentence.trim_end().strip_suffix('.') else {
        return false;
    };
    let word = head
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default()
        .trim_start_matches(|c: char| !c.is_alphanumeric());

    if word.is_empty() {
        return false;
    }
    // dotted acronyms: the head of "U.S." is "U.S"
    (word.contains('.') && word.split('.').all(|part| part.chars().count() == 1))
        || ABBREVIATIONS.contains(&word.to_ascii_lowercase().as_str())
}

/// Split `text` into `(byte offset, sentence)` pairs.
fn sentences(text: &str) -> Vec<(usize, &str)> {
    let mut merged = Vec::new();
    let mut open: Option<usize> = None;

    for (start, piece) in text.split_sentence_bound_indices() {
        let begin = open.take().unwrap_or(start);
        if ends_with_abbreviation(piece) {
            open = Some(begin);
            continue;
        }
        merged.push((begin, &text[begin..start + piece.len()]));
    }
    if let Some(begin) = open {
        merged.push((begin, &text[begin..]));
    }
    merged
}

/// Sentence-aware Treebank word tokenizer.
#[derive(Clone, Debug)]
pub struct TreebankTokenizer {
    starting_quotes: Vec<Rule>,
    punctuation: Vec<Rule>,
    parens_brackets: Rule,
    double_dashes: Rule,
    ending_quotes: Vec<Rule>,
    contractions: Vec<Rule>,
}

fn compile(rules: &[(&str, &'static str)]) -> Result<Vec<Rule>> {
    rules
        .iter()
        .map(|(pattern, replacement)| Rule::new(pattern, replacement))
        .collect()
}

impl TreebankTokenizer {
    /// Create a new Treebank tokenizer.
    pub fn new() -> Result<Self> {
        Ok(TreebankTokenizer {
            starting_quotes: compile(STARTING_QUOTES)?,
            punctuation: compile(PUNCTUATION)?,
            parens_brackets: Rule::new(PARENS_BRACKETS.0, PARENS_BRACKETS.1)?,
            double_dashes: Rule::new(DOUBLE_DASHES.0, DOUBLE_DASHES.1)?,
            ending_quotes: compile(ENDING_QUOTES)?,
            contractions: compile(CONTRACTIONS)?,
        })
    }

    /// Split one sentence into word strings.
    pub fn split_sentence(&self, sentence: &str) -> Vec<String> {
        let mut text = sentence.to_string();

        for rule in &self.starting_quotes {
            text = rule.apply(&text);
        }
        for rule in &self.punctuation {
            text = rule.apply(&text);
        }
        text = self.parens_brackets.apply(&text);
        text = self.double_dashes.apply(&text);

        // Padding lets the ending rules anchor on a trailing space.
        text = format!(" {text} ");

        for rule in &self.ending_quotes {
            text = rule.apply(&text);
        }
        for rule in &self.contractions {
            text = rule.apply(&text);
        }

        text.split_whitespace().map(str::to_string).collect()
    }
}

impl Tokenizer for TreebankTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let mut tokens = Vec::new();
        let mut position = 0;

        for (sentence_start, sentence) in sentences(text) {
            if sentence.trim().is_empty() {
                continue;
            }

            // Words are located left to right; rewritten quotes have no
            // literal match and inherit the cursor position.
            let mut cursor = 0;
            for word in self.split_sentence(sentence) {
                let (start, end) = match sentence[cursor..].find(word.as_str()) {
                    Some(found) => {
                        let start = cursor + found;
                        cursor = start + word.len();
                        (start, cursor)
                    }
                    None => (cursor, cursor),
                };
                tokens.push(Token::with_offsets(
                    word,
                    position,
                    sentence_start + start,
                    sentence_start + end,
                ));
                position += 1;
            }
        }

        Ok(Box::new(tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "treebank"
    }
}
