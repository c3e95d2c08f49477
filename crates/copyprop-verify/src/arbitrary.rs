//! QuickCheck generators for operation scripts
//!
//! Values are drawn from a small universe (eight registers plus one value of
//! each constant kind) so random scripts collide often enough to build
//! non-trivial groups.

use crate::script::{Op, Script};
use copyprop_core::{FieldRef, StringRef, TypeRef, Value};
use quickcheck::{Arbitrary, Gen};

pub const REGISTERS: u32 = 8;
const MAX_SCRIPT_LEN: usize = 48;

/// Every value the generators can produce
pub fn universe() -> Vec<Value> {
    let mut values: Vec<Value> = (0..REGISTERS).map(Value::register).collect();
    values.extend([
        Value::literal(0),
        Value::literal_upper(0),
        Value::string(StringRef(0)),
        Value::type_const(TypeRef(0)),
        Value::field(FieldRef(0)),
        Value::field_upper(FieldRef(0)),
    ]);
    values
}

fn arbitrary_value(g: &mut Gen) -> Value {
    // registers are drawn twice as often as constants
    let pick = u8::arbitrary(g) % 22;
    match pick {
        0..=15 => Value::register(u32::from(pick % 8)),
        16 => Value::literal(0),
        17 => Value::literal_upper(0),
        18 => Value::string(StringRef(0)),
        19 => Value::type_const(TypeRef(0)),
        20 => Value::field(FieldRef(0)),
        _ => Value::field_upper(FieldRef(0)),
    }
}

fn shrink_value(value: Value) -> Vec<Value> {
    match value {
        Value::Register(0) => vec![],
        Value::Register(r) => vec![Value::register(0), Value::register(r / 2)],
        _ => vec![Value::register(0)],
    }
}

impl Arbitrary for Op {
    fn arbitrary(g: &mut Gen) -> Self {
        let a = arbitrary_value(g);
        let b = arbitrary_value(g);
        match u8::arbitrary(g) % 20 {
            0..=9 => Op::Merge(a, b),
            10..=15 => Op::MoveInto(a, b),
            16..=18 => Op::Detach(a),
            _ => Op::Clear,
        }
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        let shrunk: Vec<Op> = match *self {
            Op::Clear => vec![],
            Op::Detach(a) => shrink_value(a).into_iter().map(Op::Detach).collect(),
            Op::Merge(a, b) => {
                let mut ops = vec![Op::Detach(a)];
                ops.extend(shrink_value(a).into_iter().map(|a| Op::Merge(a, b)));
                ops.extend(shrink_value(b).into_iter().map(|b| Op::Merge(a, b)));
                ops
            }
            Op::MoveInto(a, b) => {
                let mut ops = vec![Op::Merge(a, b)];
                ops.extend(shrink_value(b).into_iter().map(|b| Op::MoveInto(a, b)));
                ops
            }
        };
        Box::new(shrunk.into_iter())
    }
}

impl Arbitrary for Script {
    fn arbitrary(g: &mut Gen) -> Self {
        let mut ops = Vec::<Op>::arbitrary(g);
        ops.truncate(MAX_SCRIPT_LEN);
        Script::new(ops)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.ops.shrink().map(Script::new))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_values_stay_in_universe() {
        let mut g = Gen::new(64);
        let universe = universe();
        for _ in 0..200 {
            let script = Script::arbitrary(&mut g);
            assert!(script.ops.len() <= MAX_SCRIPT_LEN);
            for value in script.values() {
                assert!(universe.contains(&value), "{value} outside universe");
            }
        }
    }

    #[test]
    fn test_shrink_register() {
        assert!(shrink_value(Value::register(0)).is_empty());
        assert_eq!(shrink_value(Value::register(6)), vec![Value::register(0), Value::register(3)]);
        assert_eq!(shrink_value(Value::literal(0)), vec![Value::register(0)]);
    }

    #[test]
    fn test_shrink_clear_is_terminal() {
        assert_eq!(Op::Clear.shrink().count(), 0);
    }
}
