//! # copyprop-core
//!
//! Alias tracking for register-based copy propagation.
//!
//! At each program point the analysis records which registers, constants and
//! static final field reads provably hold the same value:
//! - [`Value`] names one such thing
//! - [`AliasedRegisters`] partitions values into alias groups and picks each
//!   group's canonical register
//! - [`AliasDomain`] wraps a partition in the Top/Value/Bottom envelope a
//!   fixpoint engine joins at confluence points
//! - [`AliasTransfer`] replays an instruction's [`AliasEffect`] onto a state
//!
//! ## Quick Start
//!
//! ```rust
//! use copyprop_core::{AbstractDomain, AliasDomain, AliasEffect, AliasTransfer, CopyPropConfig, TraceContext, Value};
//!
//! let config = CopyPropConfig::default();
//! let ctx = TraceContext::new("LFoo;.bar:()V");
//! let transfer = AliasTransfer::new(&config, &ctx);
//!
//! let mut then_branch = AliasDomain::entry();
//! transfer.apply(&mut then_branch, &AliasEffect::Move { dest: 1, src: 0 });
//! transfer.apply(&mut then_branch, &AliasEffect::Move { dest: 2, src: 0 });
//!
//! let mut else_branch = AliasDomain::entry();
//! transfer.apply(&mut else_branch, &AliasEffect::Move { dest: 1, src: 0 });
//!
//! let merged = then_branch.join(&else_branch);
//! assert!(merged.are_aliases(Value::register(0), Value::register(1)));
//! assert!(!merged.are_aliases(Value::register(0), Value::register(2)));
//! assert_eq!(merged.representative(Value::register(1), None), Some(0));
//! ```

pub mod aliased;
pub mod config;
pub mod domain;
pub mod effect;
pub mod error;
pub mod trace;
pub mod value;

pub use aliased::AliasedRegisters;
pub use config::CopyPropConfig;
pub use domain::{AbstractDomain, AliasDomain};
pub use effect::{AliasEffect, AliasTransfer};
pub use error::{AliasError, ConfigError};
pub use trace::TraceContext;
pub use value::{FieldRef, Register, StringRef, TypeRef, Value, RESULT_REGISTER};
