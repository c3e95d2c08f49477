//! Alias lattice for dataflow analysis
//!
//! Wraps [`AliasedRegisters`] in the three-state envelope a fixpoint engine
//! expects:
//! - Top (⊤) = no alias facts recorded yet
//! - Bottom (⊥) = unreachable program point
//! - Value = a concrete partition
//!
//! Partitions with more alias facts sit lower in the order. Bottom absorbs
//! both merge operations and Top is the identity for both.
//!
//! Top is the state of a point no path has reached yet, so it is a distinct
//! element and never equal to `Value(empty)`. An empty partition is a real
//! state ("no register is known to alias another") and joining with it drops
//! every fact. The method entry must be seeded with [`AliasDomain::entry`],
//! never with Top, or facts from one predecessor of a confluence point would
//! survive the join.

use crate::aliased::AliasedRegisters;
use crate::error::AliasError;
use crate::trace::TRACE_TARGET;
use crate::value::{Register, Value};
use std::fmt;
use tracing::{debug, trace};

/// Contract of a lattice element that a fixpoint engine can drive
pub trait AbstractDomain: Clone + fmt::Debug {
    /// The greatest element, identity for join and meet
    fn top() -> Self;

    /// The least element, absorbing for join and meet
    fn bottom() -> Self;

    /// Check if this is the top element
    fn is_top(&self) -> bool;

    /// Check if this is the bottom element
    fn is_bottom(&self) -> bool;

    /// Partial order (`⊑`)
    fn leq(&self, other: &Self) -> bool;

    fn equals(&self, other: &Self) -> bool;

    /// Combine at a confluence point, in place
    fn join_with(&mut self, other: &Self);

    fn meet_with(&mut self, other: &Self);

    fn widen_with(&mut self, other: &Self);

    fn narrow_with(&mut self, other: &Self);

    fn join(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.join_with(other);
        result
    }

    fn meet(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.meet_with(other);
        result
    }
}

/// Alias facts at one program point
#[derive(Debug, Clone, Default)]
pub enum AliasDomain {
    /// No facts recorded
    #[default]
    Top,
    /// A concrete partition
    Value(AliasedRegisters),
    /// Unreachable
    Bottom,
}

impl AliasDomain {
    /// Wrap a concrete partition
    pub fn new(aliases: AliasedRegisters) -> Self {
        AliasDomain::Value(aliases)
    }

    /// State at method entry: reachable, no register aliases another
    pub fn entry() -> Self {
        AliasDomain::Value(AliasedRegisters::new())
    }

    /// The concrete partition, if any
    pub fn value(&self) -> Option<&AliasedRegisters> {
        match self {
            AliasDomain::Value(aliases) => Some(aliases),
            AliasDomain::Top | AliasDomain::Bottom => None,
        }
    }

    /// Mutable access to the partition, materialising Top as empty
    ///
    /// # Panics
    ///
    /// Panics on Bottom: an unreachable state has nothing to mutate.
    pub fn value_mut(&mut self) -> &mut AliasedRegisters {
        match self.try_value_mut() {
            Ok(aliases) => aliases,
            Err(err) => panic!("value_mut() on alias domain: {err}"),
        }
    }

    pub fn try_value_mut(&mut self) -> Result<&mut AliasedRegisters, AliasError> {
        if let AliasDomain::Top = self {
            *self = AliasDomain::Value(AliasedRegisters::new());
        }
        match self {
            AliasDomain::Value(aliases) => Ok(aliases),
            _ => Err(AliasError::Unreachable),
        }
    }

    /// Apply `operation` to the partition unless this state is unreachable
    pub fn update<F>(&mut self, operation: F)
    where
        F: FnOnce(&mut AliasedRegisters),
    {
        if let Ok(aliases) = self.try_value_mut() {
            operation(aliases);
        }
    }

    /// Are `a` and `b` aliases at this point?
    ///
    /// Only a reachable state proves anything beyond `a == b`.
    pub fn are_aliases(&self, a: Value, b: Value) -> bool {
        match self {
            AliasDomain::Value(aliases) => aliases.are_aliases(a, b),
            AliasDomain::Top | AliasDomain::Bottom => a == b,
        }
    }

    pub fn representative(&self, value: Value, max_addressable: Option<Register>) -> Option<Register> {
        match self {
            AliasDomain::Value(aliases) => aliases.representative(value, max_addressable),
            AliasDomain::Top => AliasedRegisters::new().representative(value, max_addressable),
            AliasDomain::Bottom => None,
        }
    }

    /// Forget every alias fact; the state becomes the empty partition
    pub fn clear(&mut self) {
        *self = AliasDomain::entry();
    }

    fn combine<F>(&mut self, other: &AliasDomain, op: &'static str, f: F)
    where
        F: FnOnce(&mut AliasedRegisters, &AliasedRegisters),
    {
        if self.is_bottom() {
            return;
        }
        match other {
            AliasDomain::Bottom => *self = AliasDomain::Bottom,
            AliasDomain::Top => {}
            AliasDomain::Value(theirs) => {
                if let AliasDomain::Value(ours) = self {
                    let before = ours.aliased_pairs();
                    f(ours, theirs);
                    let after = ours.aliased_pairs();
                    trace!(target: TRACE_TARGET, op, before, after, "combined alias states");
                    if op == "join" && after < before {
                        debug!(
                            target: TRACE_TARGET,
                            before,
                            after,
                            groups = ours.group_count(),
                            "join dropped alias facts"
                        );
                    }
                } else {
                    *self = AliasDomain::Value(theirs.clone());
                }
            }
        }
    }
}

impl AbstractDomain for AliasDomain {
    fn top() -> Self {
        AliasDomain::Top
    }

    fn bottom() -> Self {
        AliasDomain::Bottom
    }

    fn is_top(&self) -> bool {
        matches!(self, AliasDomain::Top)
    }

    fn is_bottom(&self) -> bool {
        matches!(self, AliasDomain::Bottom)
    }

    fn leq(&self, other: &Self) -> bool {
        match (self, other) {
            (AliasDomain::Bottom, _) => true,
            (_, AliasDomain::Bottom) => false,
            (_, AliasDomain::Top) => true,
            (AliasDomain::Top, AliasDomain::Value(_)) => false,
            (AliasDomain::Value(ours), AliasDomain::Value(theirs)) => ours.leq(theirs),
        }
    }

    fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (AliasDomain::Bottom, AliasDomain::Bottom) | (AliasDomain::Top, AliasDomain::Top) => true,
            (AliasDomain::Value(ours), AliasDomain::Value(theirs)) => ours.equals(theirs),
            _ => false,
        }
    }

    fn join_with(&mut self, other: &Self) {
        self.combine(other, "join", AliasedRegisters::join_with);
    }

    fn meet_with(&mut self, other: &Self) {
        self.combine(other, "meet", AliasedRegisters::meet_with);
    }

    // The value universe of one method is finite, so plain join terminates
    fn widen_with(&mut self, other: &Self) {
        self.join_with(other);
    }

    fn narrow_with(&mut self, other: &Self) {
        self.meet_with(other);
    }
}

impl PartialEq for AliasDomain {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<AliasedRegisters> for AliasDomain {
    fn from(aliases: AliasedRegisters) -> Self {
        AliasDomain::Value(aliases)
    }
}

impl fmt::Display for AliasDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AliasDomain::Top => write!(f, "⊤"),
            AliasDomain::Bottom => write!(f, "⊥"),
            AliasDomain::Value(aliases) => write!(f, "{aliases}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: Register) -> Value {
        Value::register(n)
    }

    fn domain(groups: &[&[Register]]) -> AliasDomain {
        let mut d = AliasDomain::top();
        for group in groups {
            for pair in group.windows(2) {
                d.update(|a| a.merge(r(pair[1]), r(pair[0])));
            }
        }
        d
    }

    #[test]
    fn test_default_is_top() {
        assert!(AliasDomain::default().is_top());
    }

    #[test]
    fn test_update_materialises_top() {
        let mut d = AliasDomain::top();
        d.update(|a| a.merge(r(1), r(0)));
        assert!(!d.is_top());
        assert!(d.are_aliases(r(0), r(1)));
    }

    #[test]
    fn test_update_on_bottom_is_noop() {
        let mut d = AliasDomain::bottom();
        d.update(|a| a.merge(r(1), r(0)));
        assert!(d.is_bottom());
        assert!(!d.are_aliases(r(0), r(1)));
    }

    #[test]
    #[should_panic(expected = "unreachable")]
    fn test_value_mut_on_bottom_panics() {
        AliasDomain::bottom().value_mut();
    }

    #[test]
    fn test_join_drops_one_sided_aliases() {
        let mut d1 = domain(&[&[1, 2], &[3, 4]]);
        let d2 = domain(&[&[1, 2]]);
        d1.join_with(&d2);
        assert_eq!(d1, domain(&[&[1, 2]]));
        assert!(!d1.are_aliases(r(3), r(4)));
    }

    #[test]
    fn test_bottom_absorbs() {
        let mut d = domain(&[&[1, 2]]);
        d.join_with(&AliasDomain::bottom());
        assert!(d.is_bottom());

        let mut b = AliasDomain::bottom();
        b.meet_with(&domain(&[&[1, 2]]));
        assert!(b.is_bottom());
    }

    #[test]
    fn test_top_is_identity() {
        let d = domain(&[&[1, 2], &[5, 6, 7]]);

        let mut joined = d.clone();
        joined.join_with(&AliasDomain::top());
        assert_eq!(joined, d);

        let mut from_top = AliasDomain::top();
        from_top.join_with(&d);
        assert_eq!(from_top, d);

        assert_eq!(d.meet(&AliasDomain::top()), d);
    }

    #[test]
    fn test_leq() {
        let fine = domain(&[&[1, 2], &[3, 4]]);
        let coarse = domain(&[&[1, 2]]);
        assert!(fine.leq(&coarse));
        assert!(!coarse.leq(&fine));
        assert!(coarse.leq(&AliasDomain::top()));
        assert!(!AliasDomain::top().leq(&coarse));
        assert!(AliasDomain::bottom().leq(&fine));
        assert!(!fine.leq(&AliasDomain::bottom()));
        assert!(fine.leq(&fine));
    }

    #[test]
    fn test_top_differs_from_empty_partition() {
        let empty = AliasDomain::entry();
        assert_ne!(empty, AliasDomain::top());
        assert!(empty.leq(&AliasDomain::top()));
        assert!(!AliasDomain::top().leq(&empty));
        assert_ne!(AliasDomain::bottom(), AliasDomain::top());
    }

    #[test]
    fn test_empty_partition_joins_away_facts() {
        let path = domain(&[&[0, 1]]);
        assert_eq!(AliasDomain::entry().join(&path), AliasDomain::entry());
        assert_eq!(path.join(&AliasDomain::entry()), AliasDomain::entry());
        assert_eq!(AliasDomain::top().join(&path), path);
        assert!(path.leq(&AliasDomain::entry().join(&path)));
    }

    #[test]
    fn test_widen_and_narrow_match_join_and_meet() {
        let a = domain(&[&[1, 2, 3]]);
        let b = domain(&[&[1, 2], &[3, 4]]);

        let mut widened = a.clone();
        widened.widen_with(&b);
        assert_eq!(widened, a.join(&b));

        let mut narrowed = a.clone();
        narrowed.narrow_with(&b);
        assert_eq!(narrowed, a.meet(&b));
        assert!(narrowed.are_aliases(r(1), r(4)));
    }

    #[test]
    fn test_representative_through_domain() {
        let d = domain(&[&[3, 9]]);
        assert_eq!(d.representative(r(9), None), Some(3));
        assert_eq!(AliasDomain::top().representative(r(9), None), Some(9));
        assert_eq!(AliasDomain::bottom().representative(r(9), None), None);
    }

    #[test]
    fn test_clear_forgets_facts() {
        let mut d = domain(&[&[1, 2]]);
        d.clear();
        assert_eq!(d, AliasDomain::entry());
        assert!(!d.are_aliases(r(1), r(2)));

        let mut unreachable = AliasDomain::bottom();
        unreachable.clear();
        assert!(!unreachable.is_bottom());
    }

    #[test]
    fn test_display() {
        assert_eq!(AliasDomain::top().to_string(), "⊤");
        assert_eq!(AliasDomain::bottom().to_string(), "⊥");
        assert_eq!(domain(&[&[0, 4]]).to_string(), "{v0, v4}");
    }
}
