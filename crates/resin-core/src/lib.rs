//! # resin-core — Foundational Types
//!
//! Shared vocabulary for the resin decode pipeline: the wire-level
//! [`ResourceIdentifier`] pair, per-field [`Access`] modes, the
//! [`ValidationResult`] value type produced by field validators, the
//! reference-identity [`Instance`] handle, and the per-call
//! [`DecodeContext`] staging area.
//!
//! ## Design
//!
//! Everything here is a plain value type or a thin handle. No I/O, no
//! global state. The one deliberate non-`Send` type is [`Instance`]: the
//! decode pipeline is single-threaded by contract, and `Rc`-based sharing
//! is what gives repeated references to the same resource the
//! reference-equality guarantee consumers rely on.

pub mod context;
pub mod identifier;
pub mod instance;
pub mod validation;

// Re-export primary types.
pub use context::{DecodeContext, StagedRelationship};
pub use identifier::{Access, ResourceIdentifier};
pub use instance::Instance;
pub use validation::ValidationResult;
