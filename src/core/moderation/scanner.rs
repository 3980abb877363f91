// Keyword and link scanner - stateless classifier for submitted content.
//
// Checks, in order:
// - Denylist terms (case-insensitive substring match, first term wins)
// - Link count (more than `max_links` URL-shaped substrings)

use super::moderation_models::{GuardianConfig, ModerationVerdict};
use once_cell::sync::Lazy;
use regex::Regex;

// Matched against lower-cased content, so this also catches `HTTP://`.
static LINK_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

pub const EXCESSIVE_LINKS_REASON: &str = "excessive links detected";

#[derive(Debug, Clone)]
pub struct ContentScanner {
    denylist: Vec<String>,
    max_links: usize,
}

impl ContentScanner {
    /// Build a scanner from an ordered denylist.
    ///
    /// Terms are lower-cased but otherwise kept as given, so a term with
    /// surrounding spaces only matches at word edges. Blank terms are dropped
    /// since they would match nearly every input.
    pub fn new<I, T>(denylist: I, max_links: usize) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let denylist = denylist
            .into_iter()
            .map(|term| term.as_ref().to_lowercase())
            .filter(|term| !term.trim().is_empty())
            .collect();

        Self {
            denylist,
            max_links,
        }
    }

    pub fn from_config(config: &GuardianConfig) -> Self {
        Self::new(&config.denylist, config.max_links)
    }

    /// Classify content.
    ///
    /// Matching is a plain substring search, so a term inside a longer word
    /// ("antimalware") still flags.
    pub fn scan(&self, content: &str) -> ModerationVerdict {
        let lower = content.to_lowercase();

        if let Some(term) = self.denylist.iter().find(|term| lower.contains(term.as_str())) {
            return ModerationVerdict::flagged(format!("violates policy: {}", term));
        }

        // Repeated links count individually
        if Self::count_links(&lower) > self.max_links {
            return ModerationVerdict::flagged(EXCESSIVE_LINKS_REASON);
        }

        ModerationVerdict::clean()
    }

    fn count_links(content: &str) -> usize {
        LINK_REGEX.find_iter(content).count()
    }
}

impl Default for ContentScanner {
    fn default() -> Self {
        Self::from_config(&GuardianConfig::default())
    }
}
