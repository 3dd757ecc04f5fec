//! Whitelist reconciliation of a product gallery.
//!
//! The candidate list is the whitelist: stored URLs not on it are deleted,
//! missing ones inserted, and every candidate gets its list position as the
//! display index. The plan is computed without touching the database so the
//! convergence rules stay unit-testable.

use std::collections::HashSet;

/// Gallery mutations needed to converge on the candidate list.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Stored URLs absent from the candidates.
    pub delete: Vec<String>,
    /// Candidates absent from the store.
    pub insert: Vec<String>,
    /// Every candidate with its final display index.
    pub ordered: Vec<(String, i32)>,
}

/// Diff the stored gallery against the candidate whitelist.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn plan_reconcile(existing: &[String], candidates: &[String]) -> ReconcilePlan {
    let keep: HashSet<&str> = candidates.iter().map(String::as_str).collect();
    let stored: HashSet<&str> = existing.iter().map(String::as_str).collect();

    ReconcilePlan {
        delete: existing
            .iter()
            .filter(|url| !keep.contains(url.as_str()))
            .cloned()
            .collect(),
        insert: candidates
            .iter()
            .filter(|url| !stored.contains(url.as_str()))
            .cloned()
            .collect(),
        ordered: candidates
            .iter()
            .enumerate()
            .map(|(idx, url)| (url.clone(), idx as i32))
            .collect(),
    }
}
