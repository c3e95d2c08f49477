//! # copyprop-verify
//!
//! Law checking for the alias domain of `copyprop-core`.
//!
//! ## Modules
//!
//! - **[`script`]** - replayable operation sequences, JSON round-trippable
//!   so failing cases can be kept as regression inputs
//! - **[`laws`]** - equivalence-relation and lattice law checks
//! - **[`arbitrary`]** - QuickCheck generators for scripts
//!
//! ## Quick Start
//!
//! ```rust
//! use copyprop_verify::{LawChecker, Op, Script};
//! use copyprop_core::Value;
//!
//! let left = Script::new(vec![Op::Merge(Value::register(2), Value::register(1))]);
//! let right = Script::new(vec![Op::Merge(Value::register(1), Value::register(2))]);
//!
//! let checker = LawChecker::new(copyprop_verify::arbitrary::universe());
//! let result = checker.check_all(&left.replay(), &right.replay());
//! assert!(result.success());
//! ```

pub mod arbitrary;
pub mod laws;
pub mod script;

pub use laws::{LawChecker, LawViolation, VerificationResult};
pub use script::{Op, Script};
