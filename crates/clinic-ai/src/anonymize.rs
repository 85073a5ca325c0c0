//! Name anonymization for text sent to the AI provider.
//!
//! A [`NameMap`] pairs real names with codenames. Matching is
//! case-insensitive, whole-word, and Unicode-aware; longer names win over
//! shorter ones at the same position, so "Ana Maria Silva" is replaced as a
//! whole before "Ana" is considered.

use regex::{Captures, Regex, RegexBuilder};

use crate::AiError;

/// Ordered real-name to codename pairs for one generation request.
#[derive(Debug, Clone)]
pub struct NameMap {
    entries: Vec<(String, String)>,
    min_len: usize,
}

impl Default for NameMap {
    fn default() -> Self {
        Self::new(3)
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Whole-word pattern for a name. `\b` is only asserted on an edge whose
/// character is a word character; "Jr." has no boundary after the dot.
fn word_pattern(name: &str) -> String {
    let words: Vec<String> = name.split_whitespace().map(regex::escape).collect();
    let start = if name.chars().next().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    let end = if name.chars().next_back().is_some_and(is_word_char) {
        r"\b"
    } else {
        ""
    };
    format!("({start}{}{end})", words.join(r"\s+"))
}

impl NameMap {
    /// An empty map ignoring names shorter than `min_len` characters.
    #[must_use]
    pub const fn new(min_len: usize) -> Self {
        Self {
            entries: Vec::new(),
            min_len,
        }
    }

    /// Register a name. Returns `false` when the name is too short or was
    /// already registered.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Anonymization`] for an empty codename.
    pub fn insert(&mut self, real: &str, codename: &str) -> Result<bool, AiError> {
        let codename = codename.trim();
        if codename.is_empty() {
            return Err(AiError::Anonymization(format!(
                "empty codename for a name of {} characters",
                real.chars().count()
            )));
        }
        let real = collapse_whitespace(real);
        if real.chars().count() < self.min_len {
            return Ok(false);
        }
        let lowered = real.to_lowercase();
        if self.entries.iter().any(|(r, _)| r.to_lowercase() == lowered) {
            return Ok(false);
        }
        self.entries.push((real, codename.to_string()));
        Ok(true)
    }

    /// Register a person's full name and then their first name under the
    /// same codename. Punctuation around the first name is dropped, so
    /// "(Bia) Souza" also registers "Bia".
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Anonymization`] for an empty codename.
    pub fn insert_person(&mut self, full_name: &str, codename: &str) -> Result<(), AiError> {
        self.insert(full_name, codename)?;
        if let Some(first) = full_name.split_whitespace().next() {
            let first = first.trim_matches(|c: char| !is_word_char(c));
            if !first.is_empty() {
                self.insert(first, codename)?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compile the map into matchers.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Anonymization`] if the combined pattern exceeds the
    /// regex size limit.
    pub fn compile(&self) -> Result<Anonymizer, AiError> {
        let forward = Matcher::build(
            self.entries
                .iter()
                .map(|(real, code)| (real.as_str(), code.as_str())),
        )?;

        // Several names can share a codename; the first registered wins.
        let mut reverse_pairs: Vec<(&str, &str)> = Vec::new();
        for (real, code) in &self.entries {
            if !reverse_pairs
                .iter()
                .any(|(c, _)| c.eq_ignore_ascii_case(code))
            {
                reverse_pairs.push((code.as_str(), real.as_str()));
            }
        }
        let reverse = Matcher::build(reverse_pairs.into_iter())?;

        Ok(Anonymizer { forward, reverse })
    }
}

/// One alternation regex with a replacement per capture group.
#[derive(Debug, Clone)]
struct Matcher {
    regex: Regex,
    replacements: Vec<String>,
}

impl Matcher {
    fn build<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>) -> Result<Option<Self>, AiError> {
        let mut pairs: Vec<(&str, &str)> = pairs.collect();
        if pairs.is_empty() {
            return Ok(None);
        }
        // Stable sort keeps registration order among equal lengths.
        pairs.sort_by_key(|(from, _)| std::cmp::Reverse(from.chars().count()));

        let alternatives: Vec<String> = pairs.iter().map(|(from, _)| word_pattern(from)).collect();
        let regex = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()
            .map_err(|e| AiError::Anonymization(e.to_string()))?;

        Ok(Some(Self {
            regex,
            replacements: pairs.iter().map(|(_, to)| (*to).to_string()).collect(),
        }))
    }

    fn replace(&self, text: &str) -> String {
        self.regex
            .replace_all(text, |caps: &Captures<'_>| {
                caps.iter()
                    .skip(1)
                    .position(|group| group.is_some())
                    .and_then(|i| self.replacements.get(i))
                    .cloned()
                    .unwrap_or_default()
            })
            .into_owned()
    }
}

/// Compiled forward and reverse substitutions for a [`NameMap`].
#[derive(Debug, Clone)]
pub struct Anonymizer {
    forward: Option<Matcher>,
    reverse: Option<Matcher>,
}

impl Anonymizer {
    /// An anonymizer that leaves text untouched.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            forward: None,
            reverse: None,
        }
    }

    /// Replace every registered name with its codename.
    #[must_use]
    pub fn anonymize(&self, text: &str) -> String {
        self.forward
            .as_ref()
            .map_or_else(|| text.to_string(), |m| m.replace(text))
    }

    /// Replace every codename with the first real name registered for it.
    #[must_use]
    pub fn deanonymize(&self, text: &str) -> String {
        self.reverse
            .as_ref()
            .map_or_else(|| text.to_string(), |m| m.replace(text))
    }
}
