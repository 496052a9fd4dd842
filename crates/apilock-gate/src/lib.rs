//! API regression gate for apilock.
//!
//! The gate answers one question per API type: does the live symbol tree
//! still look the way it looked when its snapshot was recorded? A missing
//! snapshot is recorded on first run, a compatible tree is accepted, and a
//! breaking change is rejected with the verdict for its first mismatch.
//!
//! # Quick Start
//!
//! ```rust
//! use apilock_gate::{ApiGate, GateConfig, GateDecision};
//! use apilock_store::InMemorySnapshotStore;
//! use apilock_types::{MethodNode, TypeNode};
//!
//! let gate = ApiGate::new(InMemorySnapshotStore::new(), GateConfig::default());
//! let api = TypeNode::class("MyApi")
//!     .public()
//!     .with_method(MethodNode::new("Run", TypeNode::structure("int")).public());
//!
//! assert_eq!(gate.check(&api).unwrap().decision, GateDecision::Recorded);
//! assert_eq!(gate.check(&api).unwrap().decision, GateDecision::Accepted);
//! ```

pub mod config;
pub mod error;
pub mod gate;

// Re-exports for convenience.
pub use config::{GateConfig, UPDATE_ENV};
pub use error::GateError;
pub use gate::{ApiGate, GateDecision, GateResult};
