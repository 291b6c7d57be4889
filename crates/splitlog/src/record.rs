//! Typed records for the three logs.
//!
//! Wire format is one JSON object per line with fixed single-character
//! keys: `t` test name, `i` identity, `n` alternative index, `c`
//! completed flag, and `a` for the alternatives list in the tests log
//! but the action tag in the results log. The per-log types resolve
//! that context dependence.

use serde::{Deserialize, Serialize};

/// A registered test: name plus its ordered alternatives.
///
/// Alternatives are opaque identifiers; an alternative is referenced
/// elsewhere by its index into this list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Test name, the unique key of the tests log.
    #[serde(rename = "t")]
    pub test_name: String,
    /// Ordered alternative identifiers, indexed 0..N-1.
    #[serde(rename = "a")]
    pub alternatives: Vec<String>,
}

/// An identity's sticky assignment to one alternative of a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Opaque identity (user or session key).
    #[serde(rename = "i")]
    pub identity: String,
    /// Test the assignment belongs to.
    #[serde(rename = "t")]
    pub test_name: String,
    /// Index into the test's alternatives.
    #[serde(rename = "n")]
    pub alternative: usize,
}

/// One funnel event: an identity performed an action for an alternative.
///
/// No uniqueness constraint; repeated events per identity are expected
/// and meaningful.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEvent {
    /// Opaque identity (user or session key).
    #[serde(rename = "i")]
    pub identity: String,
    /// Test the event belongs to.
    #[serde(rename = "t")]
    pub test_name: String,
    /// Index into the test's alternatives.
    #[serde(rename = "n")]
    pub alternative: usize,
    /// Free-text funnel step tag, e.g. "shown" or "converted".
    #[serde(rename = "a")]
    pub action: String,
    /// Completion flag; monotonic once true anywhere in the log.
    #[serde(rename = "c")]
    pub completed: bool,
}
