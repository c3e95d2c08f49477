//! Property tests for the alias partition and lattice
//!
//! Random merge/move/detach sequences over a small universe of registers and
//! constants must keep the partition an equivalence relation and keep the
//! lattice operations sound.

use copyprop_core::{
    AbstractDomain, AliasDomain, AliasEffect, AliasTransfer, AliasedRegisters, CopyPropConfig, FieldRef, TraceContext,
    Value,
};
use proptest::prelude::*;

const REGISTERS: u32 = 8;

#[derive(Debug, Clone)]
enum Op {
    Merge(Value, Value),
    MoveInto(Value, Value),
    Detach(Value),
}

fn universe() -> Vec<Value> {
    let mut values: Vec<Value> = (0..REGISTERS).map(Value::register).collect();
    values.push(Value::literal(0));
    values.push(Value::literal_upper(0));
    values.push(Value::field(FieldRef(1)));
    values
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop::sample::select(universe())
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (value_strategy(), value_strategy()).prop_map(|(a, b)| Op::Merge(a, b)),
        2 => (value_strategy(), value_strategy()).prop_map(|(a, b)| Op::MoveInto(a, b)),
        1 => value_strategy().prop_map(Op::Detach),
    ]
}

fn build(ops: &[Op]) -> AliasedRegisters {
    let mut aliases = AliasedRegisters::new();
    for op in ops {
        match *op {
            Op::Merge(a, b) => aliases.merge(a, b),
            Op::MoveInto(a, b) => aliases.move_into(a, b),
            Op::Detach(a) => aliases.detach(a),
        }
    }
    aliases
}

fn aliased_pairs(aliases: &AliasedRegisters) -> Vec<(Value, Value)> {
    let values = universe();
    let mut pairs = Vec::new();
    for a in &values {
        for b in &values {
            if a < b && aliases.are_aliases(*a, *b) {
                pairs.push((*a, *b));
            }
        }
    }
    pairs
}

proptest! {
    #[test]
    fn prop_equivalence_laws(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let aliases = build(&ops);
        let values = universe();
        for a in &values {
            prop_assert!(aliases.are_aliases(*a, *a));
            for b in &values {
                prop_assert_eq!(aliases.are_aliases(*a, *b), aliases.are_aliases(*b, *a));
                for c in &values {
                    if aliases.are_aliases(*a, *b) && aliases.are_aliases(*b, *c) {
                        prop_assert!(aliases.are_aliases(*a, *c));
                    }
                }
            }
        }
    }

    #[test]
    fn prop_merge_and_detach_effects(
        ops in prop::collection::vec(op_strategy(), 0..30),
        a in value_strategy(),
        b in value_strategy(),
    ) {
        let mut aliases = build(&ops);
        aliases.merge(a, b);
        prop_assert!(aliases.are_aliases(a, b));

        let group = aliases.group_of(a).unwrap_or_default();
        aliases.detach(a);
        let rest: Vec<Value> = group.into_iter().filter(|v| *v != a).collect();
        for v in &rest {
            prop_assert!(!aliases.are_aliases(a, *v));
        }
        for pair in rest.windows(2) {
            prop_assert!(aliases.are_aliases(pair[0], pair[1]));
        }
    }

    #[test]
    fn prop_representative_within_bound(
        ops in prop::collection::vec(op_strategy(), 0..40),
        v in value_strategy(),
        bound in 0u32..REGISTERS,
    ) {
        let aliases = build(&ops);
        if let Some(rep) = aliases.representative(v, Some(bound)) {
            prop_assert!(rep <= bound);
            prop_assert!(aliases.are_aliases(v, Value::register(rep)));
        }
        if let Some(rep) = aliases.representative(v, None) {
            prop_assert!(aliases.are_aliases(v, Value::register(rep)));
        }
    }

    #[test]
    fn prop_representative_is_deterministic(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let first = build(&ops);
        let second = build(&ops);
        for v in universe() {
            prop_assert_eq!(first.representative(v, None), second.representative(v, None));
        }
    }

    #[test]
    fn prop_join_is_intersection(
        left in prop::collection::vec(op_strategy(), 0..30),
        right in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let a = build(&left);
        let b = build(&right);
        let mut joined = a.clone();
        joined.join_with(&b);

        let values = universe();
        for x in &values {
            for y in &values {
                let both = a.are_aliases(*x, *y) && b.are_aliases(*x, *y);
                prop_assert_eq!(joined.are_aliases(*x, *y), both);
            }
        }
        prop_assert!(a.leq(&joined));
        prop_assert!(b.leq(&joined));
    }

    #[test]
    fn prop_join_commutes(
        left in prop::collection::vec(op_strategy(), 0..30),
        right in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let a = AliasDomain::new(build(&left));
        let b = AliasDomain::new(build(&right));
        let ab = a.join(&b);
        let ba = b.join(&a);
        prop_assert!(ab.equals(&ba));
        for v in universe() {
            prop_assert_eq!(ab.representative(v, None), ba.representative(v, None));
        }
    }

    #[test]
    fn prop_meet_is_lower_bound(
        left in prop::collection::vec(op_strategy(), 0..30),
        right in prop::collection::vec(op_strategy(), 0..30),
    ) {
        let a = build(&left);
        let b = build(&right);
        let mut met = a.clone();
        met.meet_with(&b);
        prop_assert!(met.leq(&a));
        prop_assert!(met.leq(&b));
        for (x, y) in aliased_pairs(&a).into_iter().chain(aliased_pairs(&b)) {
            prop_assert!(met.are_aliases(x, y));
        }
    }

    #[test]
    fn prop_idempotence_and_top_identity(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let d = AliasDomain::new(build(&ops));
        prop_assert!(d.leq(&d));
        prop_assert!(d.join(&d).equals(&d));
        prop_assert!(d.meet(&d).equals(&d));
        prop_assert!(d.join(&AliasDomain::top()).equals(&d));
        prop_assert!(AliasDomain::top().join(&d).equals(&d));
        prop_assert!(d.join(&AliasDomain::bottom()).is_bottom());
    }

    #[test]
    fn prop_wide_halves_never_meet(effects in prop::collection::vec(effect_strategy(), 0..40)) {
        let config = CopyPropConfig::default();
        let ctx = TraceContext::new("LTest;.wide:()V");
        let mut domain = AliasDomain::entry();
        AliasTransfer::new(&config, &ctx).apply_all(&mut domain, &effects);

        for x in 0..LITERALS {
            let (lo, hi) = Value::literal_pair(x);
            prop_assert!(!domain.are_aliases(lo, hi), "{} ~ {} in {}", lo, hi, domain);
        }
        for f in 0..FIELDS {
            let (lo, hi) = Value::field_pair(FieldRef(f));
            prop_assert!(!domain.are_aliases(lo, hi), "{} ~ {} in {}", lo, hi, domain);
        }
    }
}

const LITERALS: i64 = 3;
const FIELDS: u32 = 2;

fn effect_strategy() -> impl Strategy<Value = AliasEffect> {
    let reg = || 0..REGISTERS;
    prop_oneof![
        3 => (reg(), 0..LITERALS).prop_map(|(dest, literal)| AliasEffect::ConstWide { dest, literal }),
        3 => (reg(), 0..FIELDS, any::<bool>()).prop_map(|(dest, f, is_final)| AliasEffect::StaticGetWide {
            dest,
            field: FieldRef(f),
            is_final,
        }),
        3 => (reg(), reg()).prop_map(|(dest, src)| AliasEffect::MoveWide { dest, src }),
        2 => (reg(), reg()).prop_map(|(dest, src)| AliasEffect::Move { dest, src }),
        1 => reg().prop_map(|dest| AliasEffect::Clobber { dest }),
    ]
}
