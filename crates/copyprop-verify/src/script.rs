//! Replayable sequences of partition operations

use copyprop_core::{AliasedRegisters, Value};
use serde::{Deserialize, Serialize};

/// One mutation of an [`AliasedRegisters`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Merge(Value, Value),
    MoveInto(Value, Value),
    Detach(Value),
    Clear,
}

impl Op {
    pub fn apply(&self, aliases: &mut AliasedRegisters) {
        match *self {
            Op::Merge(moving, group) => aliases.merge(moving, group),
            Op::MoveInto(dest, src) => aliases.move_into(dest, src),
            Op::Detach(value) => aliases.detach(value),
            Op::Clear => aliases.clear(),
        }
    }

    fn values(&self) -> impl Iterator<Item = Value> {
        let (a, b) = match *self {
            Op::Merge(a, b) | Op::MoveInto(a, b) => (Some(a), Some(b)),
            Op::Detach(a) => (Some(a), None),
            Op::Clear => (None, None),
        };
        a.into_iter().chain(b)
    }
}

/// A sequence of operations; failing cases can be saved as JSON and replayed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub ops: Vec<Op>,
}

impl Script {
    pub fn new(ops: Vec<Op>) -> Self {
        Self { ops }
    }

    pub fn replay(&self) -> AliasedRegisters {
        let mut aliases = AliasedRegisters::new();
        for op in &self.ops {
            op.apply(&mut aliases);
        }
        aliases
    }

    /// Every value the script mentions, sorted and deduplicated
    pub fn values(&self) -> Vec<Value> {
        let mut values: Vec<Value> = self.ops.iter().flat_map(Op::values).collect();
        values.sort();
        values.dedup();
        values
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl FromIterator<Op> for Script {
    fn from_iter<I: IntoIterator<Item = Op>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
