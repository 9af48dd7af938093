//! Incremental search
//!
//! Items are bucketed into three tiers by how well they match the query and
//! the tiers are concatenated. Matching is case-insensitive.

use super::item::Item;

/// Search text as typed, plus its folded form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    raw: String,
    folded: String,
}

impl Query {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let folded = raw.to_lowercase();
        Self { raw, folded }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn push(&mut self, c: char) {
        self.raw.push(c);
        self.refold();
    }

    /// Remove the last character. Returns false if already empty.
    pub fn pop(&mut self) -> bool {
        let popped = self.raw.pop().is_some();
        self.refold();
        popped
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.folded.clear();
    }

    fn refold(&mut self) {
        self.folded = self.raw.to_lowercase();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    /// Name starts with the query
    Prefix,
    /// Name contains the query, or an alternate field starts with it
    Contains,
    /// Query letters appear in order in the name, or an alternate field
    /// contains the query
    Scattered,
}

/// True if every char of `needle` appears in `haystack` in order
pub fn is_subsequence(haystack: &str, needle: &str) -> bool {
    let mut chars = haystack.chars();
    needle.chars().all(|n| chars.any(|h| h == n))
}

/// Best tier an item reaches for an already folded, non-empty query
pub fn match_tier(item: &Item, folded_query: &str) -> Option<MatchTier> {
    let name = item.display_name.to_lowercase();
    let alts: Vec<String> = item.alt_fields().iter().map(|f| f.to_lowercase()).collect();

    if name.starts_with(folded_query) {
        return Some(MatchTier::Prefix);
    }
    if name.contains(folded_query) || alts.iter().any(|a| a.starts_with(folded_query)) {
        return Some(MatchTier::Contains);
    }
    if is_subsequence(&name, folded_query) || alts.iter().any(|a| a.contains(folded_query)) {
        return Some(MatchTier::Scattered);
    }
    None
}

/// Indices of the matching items, best tier first, input order within a tier.
///
/// An empty query keeps every item in its original order.
pub fn filter(items: &[Item], query: &Query) -> Vec<usize> {
    if query.is_empty() {
        return (0..items.len()).collect();
    }

    let mut tiers: [Vec<usize>; 3] = Default::default();
    for (index, item) in items.iter().enumerate() {
        match match_tier(item, query.folded()) {
            Some(MatchTier::Prefix) => tiers[0].push(index),
            Some(MatchTier::Contains) => tiers[1].push(index),
            Some(MatchTier::Scattered) => tiers[2].push(index),
            None => {}
        }
    }

    tiers.concat()
}
