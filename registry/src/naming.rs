//! Naming forms derived from a model name.

/// Singular, plural and capitalized forms of a model name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namings {
    /// `teamMember` for `TeamMember`.
    pub singular: String,
    /// `teamMembers` for `TeamMember`; also the collection name.
    pub plural: String,
    /// `TeamMember` for `teamMember`.
    pub capital_singular: String,
}

impl Namings {
    /// Derive the forms from a model name.
    pub fn for_model(name: &str) -> Self {
        let singular = lower_first(name);
        Self {
            plural: pluralize(&singular),
            capital_singular: upper_first(name),
            singular,
        }
    }

    /// Explicit forms for irregular names.
    pub fn explicit(singular: impl Into<String>, plural: impl Into<String>) -> Self {
        let singular = singular.into();
        Self {
            capital_singular: upper_first(&singular),
            plural: plural.into(),
            singular,
        }
    }
}

fn lower_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn pluralize(word: &str) -> String {
    let is_vowel = |c: char| "aeiou".contains(c);
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", stem);
        }
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|s| word.ends_with(s)) {
        return format!("{}es", word);
    }
    format!("{}s", word)
}
