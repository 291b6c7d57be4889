//! splitlog: append-only flat-file storage for A/B test results.
//!
//! A small persistence engine recording which test variants exist, which
//! identities were assigned to which variant, and whether an identity
//! completed a tracked action. No database: three line-delimited JSON
//! logs in one directory, coordinated by a single directory-scoped
//! advisory lock around appends.
//!
//! # Architecture
//!
//! ```text
//! ResultStore ── save_test / set_alternative / record
//!      │                │
//!      │          DirLock (one lock, all three logs)
//!      │                │
//!      │          log::append (one JSON line, at EOF)
//!      │
//!      └─ get_alternative / is_completed / ab_report
//!                       │
//!                 query::find_* over log::scan (no lock)
//! ```
//!
//! # Modules
//!
//! - `store`: the engine and the six-operation `ResultStorage` contract
//! - `lock`: directory-scoped advisory append lock
//! - `log`: locked line append and lock-free lazy scan
//! - `query`: linear field/value predicate matching over a log
//! - `record`: typed per-log records and their wire keys
//! - `report`: two-step funnel aggregation
//! - `error`: error types
//!
//! Writers block on the lock with no timeout; readers never lock and may
//! trail the newest append. Malformed log lines are skipped on scan, so
//! a torn trailing write cannot poison reads.
//!
//! # Safety
//!
//! This crate forbids unsafe code.

#![forbid(unsafe_code)]

pub mod error;
pub mod lock;
pub mod log;
pub mod query;
pub mod record;
pub mod report;
pub mod store;

pub use error::{Result, StoreError};
pub use record::{Assignment, ResultEvent, TestDefinition};
pub use report::{AbReport, AltReport};
pub use store::{ResultStorage, ResultStore, StoreConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
