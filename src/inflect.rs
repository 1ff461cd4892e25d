//! Pluralization for list routes.
//!
//! A resource named `widget` lists itself at `/widgets`. The rule that turns
//! one into the other is an [`Inflector`]; [`English`] covers regular nouns,
//! the common irregular ones and a short list of uncountables. Resources with
//! names outside that can supply their own.

/// Turns a singular route prefix into its plural form.
pub trait Inflector: Send + Sync + 'static {
    fn pluralize(&self, word: &str) -> String;
}

impl<F> Inflector for F
where
    F: Fn(&str) -> String + Send + Sync + 'static,
{
    fn pluralize(&self, word: &str) -> String {
        self(word)
    }
}

/// English pluralization rules.
///
/// Only the trailing alphabetic run is inflected, so `/api/person` becomes
/// `/api/people`.
#[derive(Clone, Copy, Debug, Default)]
pub struct English;

const UNCOUNTABLE: &[&str] = &[
    "equipment", "fish", "information", "money", "news", "rice", "series", "sheep", "species",
];

const IRREGULAR: &[(&str, &str)] = &[
    ("calf", "calves"),
    ("child", "children"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("half", "halves"),
    ("knife", "knives"),
    ("leaf", "leaves"),
    ("life", "lives"),
    ("loaf", "loaves"),
    ("man", "men"),
    ("mouse", "mice"),
    ("ox", "oxen"),
    ("person", "people"),
    ("shelf", "shelves"),
    ("thief", "thieves"),
    ("tooth", "teeth"),
    ("wife", "wives"),
    ("wolf", "wolves"),
    ("woman", "women"),
];

impl Inflector for English {
    fn pluralize(&self, word: &str) -> String {
        let split = word
            .rfind(|c: char| !c.is_ascii_alphabetic())
            .map_or(0, |i| i + 1);
        let (prefix, noun) = word.split_at(split);
        if noun.is_empty() {
            return word.to_owned();
        }

        let lower = noun.to_ascii_lowercase();
        if UNCOUNTABLE.contains(&lower.as_str()) {
            return word.to_owned();
        }
        if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
            return format!("{prefix}{}", match_case(noun, plural));
        }

        format!("{prefix}{}", regular_plural(noun))
    }
}

fn regular_plural(noun: &str) -> String {
    let lower = noun.to_ascii_lowercase();
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| lower.ends_with(end)) {
        return format!("{noun}es");
    }
    if let Some(stem) = lower.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{}ies", &noun[..noun.len() - 1]);
        }
    }
    format!("{noun}s")
}

/// Carries a leading capital over from `original` to `plural`.
fn match_case(original: &str, plural: &str) -> String {
    if original.chars().next().is_some_and(|c| c.is_ascii_uppercase()) {
        let mut chars = plural.chars();
        chars.next()
            .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
            .unwrap_or_default()
    } else {
        plural.to_owned()
    }
}
