//! Harness building blocks for the Basalt conformance suite.
//!
//! The suites in `basalt-suites` are thin: they enumerate scenarios and
//! delegate the mechanics to this crate. Each module owns one concern:
//!
//! - [`snapshot`]: approval-style baseline store with an explicit
//!   missing-baseline policy.
//! - [`compose`]: structured SQL fragment composition (selects, joins,
//!   unions) with deterministic clause ordering.
//! - [`equivalence`]: dual-execution comparison of two query phrasings,
//!   including negative controls.
//! - [`matrix`]: deterministic unordered-pair enumeration for type
//!   matrices.
//! - [`pool`]: bounded worker pool with panic isolation and
//!   submission-order results.
//! - [`capability`]: fixture tables described by declared capabilities
//!   instead of naming conventions.
//! - [`config`]: run configuration loaded from JSON.
//! - [`report`]: structured suite report with a canonical digest.
//!
//! # Invariants
//!
//! - Everything that feeds a comparison is normalized the same way
//!   ([`snapshot::normalize`]).
//! - Enumeration order (matrix pairs, fixture sets, report records) is
//!   deterministic across runs; concurrency never reorders reported
//!   results.
//! - No async runtime: workers are scoped OS threads.

pub mod capability;
pub mod compose;
pub mod config;
pub mod equivalence;
pub mod matrix;
pub mod pool;
pub mod report;
pub mod snapshot;
