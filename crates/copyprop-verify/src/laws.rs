//! Lattice and equivalence-relation law checking
//!
//! [`LawChecker`] evaluates the laws an alias partition must satisfy over a
//! finite universe of values. It is meant for tests and for debug builds of a
//! fixpoint driver that want to validate states as they are produced.

use copyprop_core::{AbstractDomain, AliasDomain, AliasedRegisters, Register, Value};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// A broken law, with the values that witness it
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LawViolation {
    #[error("{0} is not an alias of itself")]
    NotReflexive(Value),

    #[error("{0} aliases {1} but not the other way round")]
    NotSymmetric(Value, Value),

    #[error("{0} ~ {1} and {1} ~ {2} but not {0} ~ {2}")]
    NotTransitive(Value, Value, Value),

    #[error("merge({0}, {1}) did not make them aliases")]
    MergeIneffective(Value, Value),

    #[error("{0} still aliases {1} after being detached")]
    DetachLeftAlias(Value, Value),

    #[error("detaching {0} separated {1} from {2}")]
    DetachSplitGroup(Value, Value, Value),

    #[error("representative of {value} is v{representative}, above bound {bound}")]
    RepresentativeOutOfBound {
        value: Value,
        representative: Register,
        bound: Register,
    },

    #[error("representative of {0} is v{1}, which is not in its group")]
    RepresentativeNotAlias(Value, Register),

    #[error("join claims {0} ~ {1}, which does not hold on both sides")]
    JoinUnsound(Value, Value),

    #[error("join lost {0} ~ {1}, which holds on both sides")]
    JoinImprecise(Value, Value),

    #[error("{0} of a state with itself changed the state")]
    NotIdempotent(String),

    #[error("leq is not reflexive")]
    LeqNotReflexive,

    #[error("joining with top changed the state")]
    TopNotIdentity,

    #[error("joining with bottom did not yield bottom")]
    BottomNotAbsorbing,
}

/// Outcome of a [`LawChecker`] run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationResult {
    pub checked_laws: Vec<String>,
    pub violations: Vec<LawViolation>,
}

impl VerificationResult {
    pub fn success(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn into_result(self) -> Result<(), Vec<LawViolation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }

    fn record(&mut self, law: &str, violations: Vec<LawViolation>) {
        for violation in &violations {
            warn!(law, %violation, "alias law violated");
        }
        self.checked_laws.push(law.to_string());
        self.violations.extend(violations);
    }
}

/// Checks laws over a fixed universe of values
#[derive(Debug, Clone)]
pub struct LawChecker {
    universe: Vec<Value>,
}

impl LawChecker {
    pub fn new(mut universe: Vec<Value>) -> Self {
        universe.sort();
        universe.dedup();
        Self { universe }
    }

    pub fn universe(&self) -> &[Value] {
        &self.universe
    }

    /// Run every law on `a`, on `b`, and on the pair
    pub fn check_all(&self, a: &AliasedRegisters, b: &AliasedRegisters) -> VerificationResult {
        let mut result = VerificationResult::default();
        for state in [a, b] {
            result.record("equivalence", self.check_equivalence(state));
            result.record("merge", self.check_merge(state));
            result.record("detach", self.check_detach(state));
            result.record("representative", self.check_representatives(state));
            result.record("idempotence", self.check_idempotence(state));
            result.record("identity", self.check_identities(state));
        }
        result.record("join", self.check_join(a, b));
        result
    }

    pub fn check_equivalence(&self, aliases: &AliasedRegisters) -> Vec<LawViolation> {
        let mut violations = Vec::new();
        for &a in &self.universe {
            if !aliases.are_aliases(a, a) {
                violations.push(LawViolation::NotReflexive(a));
            }
            for &b in &self.universe {
                let ab = aliases.are_aliases(a, b);
                if ab != aliases.are_aliases(b, a) {
                    violations.push(LawViolation::NotSymmetric(a, b));
                }
                if !ab {
                    continue;
                }
                for &c in &self.universe {
                    if aliases.are_aliases(b, c) && !aliases.are_aliases(a, c) {
                        violations.push(LawViolation::NotTransitive(a, b, c));
                    }
                }
            }
        }
        violations
    }

    pub fn check_merge(&self, aliases: &AliasedRegisters) -> Vec<LawViolation> {
        let mut violations = Vec::new();
        for &a in &self.universe {
            for &b in &self.universe {
                if a.is_none() || b.is_none() {
                    continue;
                }
                let mut merged = aliases.clone();
                merged.merge(a, b);
                if !merged.are_aliases(a, b) {
                    violations.push(LawViolation::MergeIneffective(a, b));
                }
            }
        }
        violations
    }

    pub fn check_detach(&self, aliases: &AliasedRegisters) -> Vec<LawViolation> {
        let mut violations = Vec::new();
        for &v in &self.universe {
            let Some(group) = aliases.group_of(v) else {
                continue;
            };
            let mut detached = aliases.clone();
            detached.detach(v);

            let rest: Vec<Value> = group.into_iter().filter(|m| *m != v).collect();
            for &other in &rest {
                if detached.are_aliases(v, other) {
                    violations.push(LawViolation::DetachLeftAlias(v, other));
                }
            }
            for pair in rest.windows(2) {
                if !detached.are_aliases(pair[0], pair[1]) {
                    violations.push(LawViolation::DetachSplitGroup(v, pair[0], pair[1]));
                }
            }
        }
        violations
    }

    pub fn check_representatives(&self, aliases: &AliasedRegisters) -> Vec<LawViolation> {
        let mut violations = Vec::new();
        let bounds = self.universe.iter().filter_map(Value::as_register);
        for &v in &self.universe {
            let unbounded = aliases.representative(v, None);
            let bounded = bounds.clone().map(|bound| (Some(bound), aliases.representative(v, Some(bound))));

            for (bound, representative) in std::iter::once((None, unbounded)).chain(bounded) {
                let Some(rep) = representative else {
                    continue;
                };
                if let Some(bound) = bound.filter(|bound| rep > *bound) {
                    violations.push(LawViolation::RepresentativeOutOfBound {
                        value: v,
                        representative: rep,
                        bound,
                    });
                }
                if !aliases.are_aliases(v, Value::register(rep)) {
                    violations.push(LawViolation::RepresentativeNotAlias(v, rep));
                }
            }
        }
        violations
    }

    /// `a ⊔ b` must alias exactly the pairs aliased in both
    pub fn check_join(&self, a: &AliasedRegisters, b: &AliasedRegisters) -> Vec<LawViolation> {
        let mut joined = a.clone();
        joined.join_with(b);

        let mut violations = self.check_equivalence(&joined);
        for &x in &self.universe {
            for &y in &self.universe {
                let both = a.are_aliases(x, y) && b.are_aliases(x, y);
                match (joined.are_aliases(x, y), both) {
                    (true, false) => violations.push(LawViolation::JoinUnsound(x, y)),
                    (false, true) => violations.push(LawViolation::JoinImprecise(x, y)),
                    _ => {}
                }
            }
        }
        violations
    }

    pub fn check_idempotence(&self, aliases: &AliasedRegisters) -> Vec<LawViolation> {
        let mut violations = Vec::new();
        let state = AliasDomain::new(aliases.clone());
        if !state.leq(&state) {
            violations.push(LawViolation::LeqNotReflexive);
        }
        if !state.join(&state).equals(&state) {
            violations.push(LawViolation::NotIdempotent("join".to_string()));
        }
        if !state.meet(&state).equals(&state) {
            violations.push(LawViolation::NotIdempotent("meet".to_string()));
        }
        violations
    }

    pub fn check_identities(&self, aliases: &AliasedRegisters) -> Vec<LawViolation> {
        let mut violations = Vec::new();
        let state = AliasDomain::new(aliases.clone());
        if !state.join(&AliasDomain::top()).equals(&state) || !AliasDomain::top().join(&state).equals(&state) {
            violations.push(LawViolation::TopNotIdentity);
        }
        if !state.join(&AliasDomain::bottom()).is_bottom() {
            violations.push(LawViolation::BottomNotAbsorbing);
        }
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: Register) -> Value {
        Value::register(n)
    }

    fn checker() -> LawChecker {
        LawChecker::new((1..=4).map(r).chain([Value::literal(0)]).collect())
    }

    #[test]
    fn test_join_example_passes() {
        let mut p1 = AliasedRegisters::new();
        p1.merge(r(2), r(1));
        p1.merge(r(4), r(3));
        let mut p2 = AliasedRegisters::new();
        p2.merge(r(2), r(1));

        let result = checker().check_all(&p1, &p2);
        assert!(result.success(), "{:?}", result.violations);
        assert!(result.checked_laws.contains(&"join".to_string()));
    }

    #[test]
    fn test_check_join_one_sided_alias() {
        let mut kept = AliasedRegisters::new();
        kept.merge(r(4), r(3));
        let without = AliasedRegisters::new();

        let mut joined = kept.clone();
        joined.join_with(&without);
        assert!(!joined.are_aliases(r(3), r(4)));
        assert!(checker().check_join(&kept, &without).is_empty());
    }

    #[test]
    fn test_representative_bound_checked() {
        let mut aliases = AliasedRegisters::new();
        aliases.merge(r(1), r(4));
        assert!(checker().check_representatives(&aliases).is_empty());
    }

    #[test]
    fn test_into_result() {
        let result = VerificationResult {
            checked_laws: vec!["identity".to_string()],
            violations: vec![LawViolation::TopNotIdentity],
        };
        assert!(!result.success());
        assert_eq!(result.into_result(), Err(vec![LawViolation::TopNotIdentity]));
        assert_eq!(VerificationResult::default().into_result(), Ok(()));
    }

    #[test]
    fn test_violation_messages() {
        let v = LawViolation::NotTransitive(r(1), r(2), r(3));
        assert_eq!(v.to_string(), "v1 ~ v2 and v2 ~ v3 but not v1 ~ v3");
        let v = LawViolation::RepresentativeOutOfBound {
            value: r(9),
            representative: 9,
            bound: 4,
        };
        assert_eq!(v.to_string(), "representative of v9 is v9, above bound 4");
    }
}
