//! Partition of values into alias groups
//!
//! [`AliasedRegisters`] is a disjoint-set over [`Value`]s. Values that were
//! never aliased with anything (or were detached from every alias) are not
//! stored at all; every stored value belongs to a group of at least two
//! members.
//!
//! Each stored value carries an insertion rank drawn from a per-instance
//! counter at the moment it entered a group. The representative of a group is
//! its lowest-ranked register, so the register that has held the value the
//! longest wins.

use crate::value::{Register, Value};
use indexmap::IndexMap;
use std::collections::HashMap;
use std::fmt;

type Rank = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ClassId(u32);

#[derive(Debug, Clone, Copy)]
struct Entry {
    class: ClassId,
    rank: Rank,
}

/// Alias groups at one program point
#[derive(Debug, Clone, Default)]
pub struct AliasedRegisters {
    entries: HashMap<Value, Entry>,
    /// Members of each class, sorted by rank
    classes: HashMap<ClassId, Vec<Value>>,
    next_class: u32,
    next_rank: Rank,
}

impl AliasedRegisters {
    /// An empty partition: every value is only an alias of itself
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `moving` into the group of `group`, unioning both groups
    ///
    /// Prior aliases of `moving` are kept. Use [`Self::move_into`] for
    /// assignment semantics.
    pub fn merge(&mut self, moving: Value, group: Value) {
        // none carries no information and must not link unrelated values
        if moving == group || moving.is_none() || group.is_none() {
            return;
        }

        let moving_class = self.entries.get(&moving).map(|e| e.class);
        let group_class = self.entries.get(&group).map(|e| e.class);

        match (moving_class, group_class) {
            (None, None) => {
                let class = self.fresh_class();
                self.insert(class, group);
                self.insert(class, moving);
            }
            (None, Some(class)) => self.insert(class, moving),
            (Some(class), None) => self.insert(class, group),
            (Some(a), Some(b)) if a == b => {}
            (Some(a), Some(b)) => self.union(a, b),
        }
    }

    /// `dest := src`
    ///
    /// Severs every alias `dest` had unless it already aliases `src`, then
    /// joins `src`'s group.
    pub fn move_into(&mut self, dest: Value, src: Value) {
        if self.are_aliases(dest, src) {
            return;
        }
        self.detach(dest);
        self.merge(dest, src);
    }

    /// Remove `value` from its group; the other members stay aliased
    pub fn detach(&mut self, value: Value) {
        let Some(entry) = self.entries.remove(&value) else {
            return;
        };

        let Some(members) = self.classes.get_mut(&entry.class) else {
            return;
        };
        members.retain(|m| *m != value);

        if members.len() < 2 {
            // a lone survivor is no longer aliased with anything
            for rest in members.drain(..) {
                self.entries.remove(&rest);
            }
            self.classes.remove(&entry.class);
        }
    }

    /// Are `a` and `b` known to hold the same value (transitively)?
    pub fn are_aliases(&self, a: Value, b: Value) -> bool {
        if a == b {
            return true;
        }
        match (self.entries.get(&a), self.entries.get(&b)) {
            (Some(ea), Some(eb)) => ea.class == eb.class,
            _ => false,
        }
    }

    /// The canonical register of `value`'s group
    ///
    /// Returns the lowest-ranked register member whose index does not exceed
    /// `max_addressable`. An isolated register is its own representative.
    /// `None` means no member is usable; callers should leave the operand
    /// alone.
    pub fn representative(&self, value: Value, max_addressable: Option<Register>) -> Option<Register> {
        let eligible = |v: &Value| match v.as_register() {
            Some(r) => max_addressable.map_or(true, |max| r <= max),
            None => false,
        };

        match self.group_members(value) {
            Some(members) => members.iter().find(|v| eligible(v)).map(Value::reg),
            None => Some(value).filter(eligible).map(|v| v.reg()),
        }
    }

    /// Drop every group and restart rank numbering
    pub fn clear(&mut self) {
        self.entries.clear();
        self.classes.clear();
        self.next_class = 0;
        self.next_rank = 0;
    }

    /// Check if no two values are aliases
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Number of groups with at least two members
    pub fn group_count(&self) -> usize {
        self.classes.len()
    }

    /// Number of unordered pairs of distinct aliased values
    pub fn aliased_pairs(&self) -> usize {
        self.classes.values().map(|m| m.len() * (m.len() - 1) / 2).sum()
    }

    /// Members of `value`'s group in rank order, or `None` if isolated
    pub fn group_of(&self, value: Value) -> Option<Vec<Value>> {
        self.group_members(value).map(<[Value]>::to_vec)
    }

    /// All groups, each in rank order, ordered by their oldest member
    pub fn groups(&self) -> Vec<Vec<Value>> {
        self.sorted_classes().into_iter().map(|(_, members)| members.to_vec()).collect()
    }

    /// `self ⊑ other`: every alias in `other` also holds in `self`
    pub fn leq(&self, other: &AliasedRegisters) -> bool {
        other.classes.values().all(|members| {
            let class = self.entries.get(&members[0]).map(|e| e.class);
            class.is_some() && members[1..].iter().all(|m| self.entries.get(m).map(|e| e.class) == class)
        })
    }

    /// Same groups with the same members; ranks are ignored
    pub fn equals(&self, other: &AliasedRegisters) -> bool {
        self.group_count() == other.group_count() && self.leq(other) && other.leq(self)
    }

    /// Keep only the aliases that hold in both `self` and `other`
    ///
    /// Each group of `self` is split by the group its members have in
    /// `other`. Members of a surviving group are ordered by the larger of
    /// their two per-side positions, then the smaller, then by value, so the
    /// result does not depend on operand order.
    pub fn join_with(&mut self, other: &AliasedRegisters) {
        let mut result = AliasedRegisters::new();

        for (_, members) in self.sorted_classes() {
            let mut buckets: IndexMap<ClassId, Vec<Value>> = IndexMap::new();
            for value in members {
                if let Some(entry) = other.entries.get(value) {
                    buckets.entry(entry.class).or_default().push(*value);
                }
            }

            for (_, bucket) in buckets {
                if bucket.len() < 2 {
                    continue;
                }
                let class = result.fresh_class();
                for value in self.order_for_join(other, bucket) {
                    result.insert(class, value);
                }
            }
        }

        *self = result;
    }

    /// Add every alias of `other` to `self`
    pub fn meet_with(&mut self, other: &AliasedRegisters) {
        for (_, members) in other.sorted_classes() {
            let head = members[0];
            for value in &members[1..] {
                self.merge(*value, head);
            }
        }
    }

    fn group_members(&self, value: Value) -> Option<&[Value]> {
        let entry = self.entries.get(&value)?;
        self.classes.get(&entry.class).map(Vec::as_slice)
    }

    fn rank(&self, value: &Value) -> Rank {
        self.entries.get(value).map_or(Rank::MAX, |e| e.rank)
    }

    fn sorted_classes(&self) -> Vec<(ClassId, &[Value])> {
        let mut classes: Vec<_> = self.classes.iter().map(|(id, members)| (*id, members.as_slice())).collect();
        classes.sort_by_key(|(_, members)| self.rank(&members[0]));
        classes
    }

    fn order_for_join(&self, other: &AliasedRegisters, bucket: Vec<Value>) -> Vec<Value> {
        let positions = |side: &AliasedRegisters| -> HashMap<Value, usize> {
            let mut by_rank = bucket.clone();
            by_rank.sort_by_key(|v| side.rank(v));
            by_rank.into_iter().enumerate().map(|(pos, v)| (v, pos)).collect()
        };
        let ours = positions(self);
        let theirs = positions(other);

        let mut ordered = bucket;
        ordered.sort_by_key(|v| {
            let (a, b) = (ours[v], theirs[v]);
            (a.max(b), a.min(b), *v)
        });
        ordered
    }

    fn fresh_class(&mut self) -> ClassId {
        let id = ClassId(self.next_class);
        self.next_class += 1;
        id
    }

    fn insert(&mut self, class: ClassId, value: Value) {
        let rank = self.next_rank;
        self.next_rank += 1;
        self.entries.insert(value, Entry { class, rank });
        self.classes.entry(class).or_default().push(value);
    }

    /// Union by size; ranks are kept since both sides share one counter
    fn union(&mut self, a: ClassId, b: ClassId) {
        let a_len = self.classes.get(&a).map_or(0, Vec::len);
        let b_len = self.classes.get(&b).map_or(0, Vec::len);
        let (keep, absorb) = if a_len >= b_len { (a, b) } else { (b, a) };

        let moved = self.classes.remove(&absorb).unwrap_or_default();
        for value in &moved {
            if let Some(entry) = self.entries.get_mut(value) {
                entry.class = keep;
            }
        }

        let mut members = self.classes.remove(&keep).unwrap_or_default();
        members.extend(moved);
        members.sort_by_key(|v| self.rank(v));
        self.classes.insert(keep, members);
    }
}

impl PartialEq for AliasedRegisters {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for AliasedRegisters {}

impl fmt::Display for AliasedRegisters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }
        for (i, (_, members)) in self.sorted_classes().into_iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{{")?;
            for (j, value) in members.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{value}")?;
            }
            write!(f, "}}")?;
        }
        Ok(())
    }
}
