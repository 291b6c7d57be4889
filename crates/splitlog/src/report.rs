//! A/B report aggregation.
//!
//! The report is a strict two-step funnel per alternative: an identity
//! counts as attempted once it produces the first action, and as
//! completed only if the second action arrives after an earlier first
//! action for the same identity and alternative. Event order in the log
//! is therefore load-bearing. Output carries set cardinalities only.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::record::{ResultEvent, TestDefinition};

/// Attempted/completed counts for one alternative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AltReport {
    /// Distinct identities that performed the first funnel action.
    pub attempted: usize,
    /// Distinct identities that completed the funnel in order.
    pub completed: usize,
}

/// Aggregate report for one test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AbReport {
    /// Name of the reported test.
    pub test_name: String,
    /// The test's alternatives, in definition order.
    pub alternatives: Vec<String>,
    /// Per-alternative funnel counts, index-aligned with `alternatives`.
    pub results: Vec<AltReport>,
}

/// Fold result events (in file order) into per-alternative funnel counts.
///
/// Events whose alternative index falls outside the definition are
/// skipped, the same tolerance class as malformed log lines.
#[must_use]
pub fn aggregate(
    definition: &TestDefinition,
    events: impl Iterator<Item = ResultEvent>,
    action_a: &str,
    action_b: &str,
) -> AbReport {
    struct Funnel {
        attempted: HashSet<String>,
        completed: HashSet<String>,
    }

    let mut funnels: Vec<Funnel> = definition
        .alternatives
        .iter()
        .map(|_| Funnel {
            attempted: HashSet::new(),
            completed: HashSet::new(),
        })
        .collect();

    for event in events {
        let Some(funnel) = funnels.get_mut(event.alternative) else {
            warn!(
                test = %definition.test_name,
                alternative = event.alternative,
                "result event references alternative outside the definition; skipping"
            );
            continue;
        };

        if event.action == action_a {
            funnel.attempted.insert(event.identity);
        } else if event.action == action_b && funnel.attempted.contains(&event.identity) {
            funnel.completed.insert(event.identity);
        }
    }

    AbReport {
        test_name: definition.test_name.clone(),
        alternatives: definition.alternatives.clone(),
        results: funnels
            .into_iter()
            .map(|f| AltReport {
                attempted: f.attempted.len(),
                completed: f.completed.len(),
            })
            .collect(),
    }
}
