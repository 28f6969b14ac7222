use crate::config::{load_json5, ConfigError};

use std::{collections::HashMap, path::Path};

/// Source of user-facing text.
///
/// Templates are looked up by key, with named arguments substituted into
/// them.
pub trait Localizer {
    fn get_string(&self, key: &str, args: &[(&str, &str)]) -> String;
}

/// Built-in English text for every key used by ban notices
const ENGLISH: &[(&str, &str)] = &[
    (
        "ban-banned-1",
        "You, or another user of this computer or connection, are banned from playing here.",
    ),
    ("ban-banned-2", "The ban was issued by {$adminName}."),
    ("ban-banned-3", "The ban reason is: \"{$reason}\""),
    (
        "ban-banned-4",
        "Attempts to avoid this ban such as creating a new account will be logged.",
    ),
    (
        "ban-expires",
        "This ban is for {$duration} minutes and will expire at {$time} UTC.",
    ),
    ("ban-banned-permanent", "This ban will only be removed via appeal."),
    (
        "ban-banned-permanent-appeal",
        "This ban will only be removed via appeal. You can appeal at {$link}",
    ),
];

/// A table of message templates.
///
/// Placeholders take the form `{$name}`. A missing key renders as the key
/// itself, and a placeholder with no matching argument is left in place, so
/// a broken translation degrades to readable output instead of failing.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self {
            messages: HashMap::new(),
        }
    }

    /// A catalog containing the built-in English messages
    pub fn english() -> Self {
        Self::from_pairs(ENGLISH.iter().copied())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            messages: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Load a catalog from a JSON5 object mapping keys to templates. Keys
    /// missing from the file fall back to the built-in English text.
    pub fn load_file<P: AsRef<Path>>(filename: P) -> Result<Self, ConfigError> {
        let overrides: HashMap<String, String> = load_json5(filename)?;
        let mut ret = Self::english();
        ret.messages.extend(overrides);
        Ok(ret)
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }
}

impl Localizer for MessageCatalog {
    fn get_string(&self, key: &str, args: &[(&str, &str)]) -> String {
        match self.messages.get(key) {
            Some(template) => substitute(template, args),
            None => {
                tracing::warn!(key, "Missing localized message");
                key.to_string()
            }
        }
    }
}

/// Replace each `{$name}` in the template with the matching argument.
/// Substituted values are not themselves scanned for placeholders.
fn substitute(template: &str, args: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{$") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find('}') else {
            rest = &rest[start..];
            break;
        };

        let name = &after[..end];
        match args.iter().find(|(arg, _)| *arg == name) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 1]),
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}
