//! Replaying instruction effects onto alias state
//!
//! A fixpoint driver projects each decoded instruction to the one
//! [`AliasEffect`] that matters for aliasing and hands it to
//! [`AliasTransfer::apply`]. The same projection answers whether an
//! instruction is redundant at a given state, which is what lets the rewrite
//! pass delete it.

use crate::aliased::AliasedRegisters;
use crate::config::CopyPropConfig;
use crate::domain::{AbstractDomain, AliasDomain};
use crate::trace::{TraceContext, TRACE_TARGET};
use crate::value::{FieldRef, Register, StringRef, TypeRef, Value, RESULT_REGISTER};
use tracing::trace;

/// What one instruction does to register contents, as far as aliasing goes
///
/// Wide variants name the low register `dest`; the high half lives in
/// `dest + 1`. A wide write whose high half is not addressable clobbers
/// `dest` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasEffect {
    Move { dest: Register, src: Register },
    MoveWide { dest: Register, src: Register },
    /// Copy the result register into `dest`
    MoveResult { dest: Register },
    MoveResultWide { dest: Register },
    Const { dest: Register, literal: i64 },
    ConstWide { dest: Register, literal: i64 },
    ConstString { dest: Register, string: StringRef },
    ConstClass { dest: Register, class: TypeRef },
    StaticGet { dest: Register, field: FieldRef, is_final: bool },
    StaticGetWide { dest: Register, field: FieldRef, is_final: bool },
    /// Produces a new value in the result register (invoke, filled-new-array, ...)
    WritesResult,
    /// Any other write to `dest`
    Clobber { dest: Register },
    ClobberWide { dest: Register },
    NoEffect,
}

/// Source value(s) an effect copies into its destination(s), if tracked
enum Written {
    Single(Register, Value),
    /// Low and high destination, then low and high source
    Wide(Register, Register, Value, Value),
    Untracked,
}

/// Applies [`AliasEffect`]s under one configuration
#[derive(Debug, Clone)]
pub struct AliasTransfer<'a> {
    config: &'a CopyPropConfig,
    ctx: &'a TraceContext,
}

impl<'a> AliasTransfer<'a> {
    pub fn new(config: &'a CopyPropConfig, ctx: &'a TraceContext) -> Self {
        Self { config, ctx }
    }

    /// Replay `effect` onto `domain`; unreachable states stay unreachable
    pub fn apply(&self, domain: &mut AliasDomain, effect: &AliasEffect) {
        domain.update(|aliases| self.apply_to(aliases, effect));
        trace!(
            target: TRACE_TARGET,
            unit = %self.ctx.unit(),
            ?effect,
            state = %domain,
            "replayed effect"
        );
    }

    pub fn apply_all<'e, I>(&self, domain: &mut AliasDomain, effects: I)
    where
        I: IntoIterator<Item = &'e AliasEffect>,
    {
        for effect in effects {
            self.apply(domain, effect);
        }
    }

    /// Would executing `effect` leave every register unchanged?
    ///
    /// True when each destination already aliases what would be written to
    /// it, e.g. `move v1, v0` right after `move v0, v1`.
    pub fn is_redundant(&self, domain: &AliasDomain, effect: &AliasEffect) -> bool {
        if domain.is_bottom() {
            return false;
        }
        match self.copy_of(effect) {
            Written::Single(dest, src) => domain.are_aliases(Value::register(dest), src),
            Written::Wide(dest_lo, dest_hi, lo, hi) => {
                domain.are_aliases(Value::register(dest_lo), lo) && domain.are_aliases(Value::register(dest_hi), hi)
            }
            Written::Untracked => false,
        }
    }

    /// Register to read instead of `reg`, if a different one is usable
    ///
    /// `slot_limit` is the addressing limit of the operand slot being
    /// rewritten.
    pub fn canonical_source(
        &self,
        domain: &AliasDomain,
        reg: Register,
        slot_limit: Option<Register>,
    ) -> Option<Register> {
        let bound = self.config.representative_bound(slot_limit)?;
        domain
            .representative(Value::register(reg), bound)
            .filter(|rep| *rep != reg)
    }

    fn apply_to(&self, aliases: &mut AliasedRegisters, effect: &AliasEffect) {
        match self.copy_of(effect) {
            Written::Single(dest, src) => aliases.move_into(Value::register(dest), src),
            Written::Wide(dest_lo, dest_hi, lo, hi) => {
                let (dest_lo, dest_hi) = (Value::register(dest_lo), Value::register(dest_hi));
                if overlaps(effect) {
                    aliases.detach(dest_lo);
                    aliases.detach(dest_hi);
                    return;
                }
                aliases.move_into(dest_lo, lo);
                aliases.move_into(dest_hi, hi);
            }
            Written::Untracked => self.clobber(aliases, effect),
        }
    }

    fn clobber(&self, aliases: &mut AliasedRegisters, effect: &AliasEffect) {
        match *effect {
            AliasEffect::Move { dest, .. }
            | AliasEffect::MoveResult { dest }
            | AliasEffect::Const { dest, .. }
            | AliasEffect::ConstString { dest, .. }
            | AliasEffect::ConstClass { dest, .. }
            | AliasEffect::StaticGet { dest, .. }
            | AliasEffect::Clobber { dest } => aliases.detach(Value::register(dest)),
            AliasEffect::MoveWide { dest, .. }
            | AliasEffect::MoveResultWide { dest }
            | AliasEffect::ConstWide { dest, .. }
            | AliasEffect::StaticGetWide { dest, .. }
            | AliasEffect::ClobberWide { dest } => {
                aliases.detach(Value::register(dest));
                if let Some(dest_hi) = high_half(dest) {
                    aliases.detach(Value::register(dest_hi));
                }
            }
            AliasEffect::WritesResult => aliases.detach(Value::result_register()),
            AliasEffect::NoEffect => {}
        }
    }

    fn copy_of(&self, effect: &AliasEffect) -> Written {
        let config = self.config;
        match *effect {
            AliasEffect::Move { dest, src } => Written::Single(dest, Value::register(src)),
            AliasEffect::MoveWide { dest, src } if config.wide_registers => match (high_half(dest), high_half(src)) {
                (Some(dest_hi), Some(src_hi)) => {
                    Written::Wide(dest, dest_hi, Value::register(src), Value::register(src_hi))
                }
                _ => Written::Untracked,
            },
            AliasEffect::MoveResult { dest } => Written::Single(dest, Value::register(RESULT_REGISTER)),
            AliasEffect::Const { dest, literal } if config.eliminate_const_literals => {
                Written::Single(dest, Value::literal(literal))
            }
            AliasEffect::ConstWide { dest, literal } if config.eliminate_const_literals && config.wide_registers => {
                let (lo, hi) = Value::literal_pair(literal);
                wide(dest, lo, hi)
            }
            AliasEffect::ConstString { dest, string } if config.eliminate_const_strings => {
                Written::Single(dest, Value::string(string))
            }
            AliasEffect::ConstClass { dest, class } if config.eliminate_const_classes => {
                Written::Single(dest, Value::type_const(class))
            }
            AliasEffect::StaticGet { dest, field, is_final: true } if config.static_finals => {
                Written::Single(dest, Value::field(field))
            }
            AliasEffect::StaticGetWide { dest, field, is_final: true }
                if config.static_finals && config.wide_registers =>
            {
                let (lo, hi) = Value::field_pair(field);
                wide(dest, lo, hi)
            }
            _ => Written::Untracked,
        }
    }
}

fn high_half(reg: Register) -> Option<Register> {
    reg.checked_add(1)
}

fn wide(dest: Register, lo: Value, hi: Value) -> Written {
    match high_half(dest) {
        Some(dest_hi) => Written::Wide(dest, dest_hi, lo, hi),
        None => Written::Untracked,
    }
}

/// A wide move whose source and destination pairs share exactly one register
fn overlaps(effect: &AliasEffect) -> bool {
    match *effect {
        AliasEffect::MoveWide { dest, src } => {
            dest != src && (high_half(src) == Some(dest) || high_half(dest) == Some(src))
        }
        _ => false,
    }
}
