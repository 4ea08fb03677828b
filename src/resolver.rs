//! # Entity Resolver Module
//!
//! Resolves an ingredient or menu name against a cached name index: an exact
//! case-insensitive match wins immediately, otherwise the best fuzzy match
//! is accepted above a fixed threshold, and below it the caller gets a
//! ranked suggestion list to surface to the user instead of a hard failure.
//!
//! The resolver does not manage cache lifetime; the index it matches
//! against comes from the injected [`crate::cache::NameIndexCache`].

use log::debug;
use serde::{Deserialize, Serialize};

use crate::similarity::similarity_ci;

/// Minimum similarity to accept the best candidate outright
pub const ACCEPT_THRESHOLD: f64 = 0.6;
/// Minimum similarity for a candidate to appear in the suggestion list
pub const SUGGESTION_FLOOR: f64 = 0.3;
/// Maximum number of suggestions returned
pub const MAX_SUGGESTIONS: usize = 5;

/// A ranked fuzzy-match candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub score: f64,
}

/// Outcome of a name resolution
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Exact match, or best fuzzy match at or above the acceptance threshold;
    /// carries the candidate's canonical spelling
    Match { name: String, score: f64 },
    /// No candidate cleared the threshold; ranked near-misses for the user
    Suggestions(Vec<Suggestion>),
    /// Nothing even close; callers may auto-provision
    NotFound,
}

/// Resolve `name` against the candidate index
pub fn resolve(name: &str, candidates: &[String]) -> Resolution {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return Resolution::NotFound;
    }

    // Exact case-insensitive match wins immediately
    if let Some(exact) = candidates.iter().find(|c| c.to_lowercase() == needle) {
        return Resolution::Match {
            name: exact.clone(),
            score: 1.0,
        };
    }

    let mut scored: Vec<Suggestion> = candidates
        .iter()
        .map(|c| Suggestion {
            name: c.clone(),
            score: similarity_ci(c, name),
        })
        .filter(|s| s.score > SUGGESTION_FLOOR)
        .collect();
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    match scored.first() {
        Some(best) if best.score >= ACCEPT_THRESHOLD => {
            debug!(
                "Fuzzy-resolved '{name}' to '{}' (score {:.2})",
                best.name, best.score
            );
            Resolution::Match {
                name: best.name.clone(),
                score: best.score,
            }
        }
        Some(_) => {
            scored.truncate(MAX_SUGGESTIONS);
            Resolution::Suggestions(scored)
        }
        None => Resolution::NotFound,
    }
}
