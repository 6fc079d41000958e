use crate::error::PolicyError;
use crate::terrain::Terrain;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Largest possible same-type count in a 3x3 window.
pub const MAX_COEFF: u8 = 9;

/// How one terrain spreads into its orthogonal neighbors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpreadRule {
    /// Chance of claiming a void neighbor.
    pub claim: f64,
    /// Chance of converting a neighbor listed in `victims`.
    #[serde(default)]
    pub overtake: f64,
    #[serde(default)]
    pub victims: Vec<Terrain>,
}

impl SpreadRule {
    pub fn inert() -> Self {
        Self {
            claim: 0.0,
            overtake: 0.0,
            victims: Vec::new(),
        }
    }

    fn claims(claim: f64) -> Self {
        Self {
            claim,
            ..Self::inert()
        }
    }

    fn overtakes(claim: f64, overtake: f64, victims: &[Terrain]) -> Self {
        Self {
            claim,
            overtake,
            victims: victims.to_vec(),
        }
    }
}

/// Per-terrain infection chances.
///
/// Conditional spreaders scale their base chance by `coeff / 9`, so denser
/// same-type neighborhoods spread faster. Unconditional spreaders use the base
/// chance as is. Terrains missing from the table never spread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpreadPolicy {
    rules: BTreeMap<Terrain, SpreadRule>,
}

impl Default for SpreadPolicy {
    fn default() -> Self {
        use Terrain::*;
        let rules = BTreeMap::from([
            (Void, SpreadRule::inert()),
            (Water, SpreadRule::overtakes(0.45, 0.02, &[Plains])),
            (Plains, SpreadRule::claims(0.9)),
            (Desert, SpreadRule::claims(0.8)),
            (Forest, SpreadRule::overtakes(0.75, 0.25, &[Plains])),
            (Mountain, SpreadRule::claims(0.6)),
            (Swamp, SpreadRule::overtakes(0.25, 0.01, &[Forest])),
            (Snowy, SpreadRule::overtakes(0.7, 0.2, &[Mountain])),
        ]);
        Self { rules }
    }
}

impl SpreadPolicy {
    /// A policy under which nothing ever spreads.
    pub fn frozen() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn rule(&self, terrain: Terrain) -> Option<&SpreadRule> {
        self.rules.get(&terrain)
    }

    pub fn set_rule(&mut self, terrain: Terrain, rule: SpreadRule) {
        self.rules.insert(terrain, rule);
    }

    /// Chance that `source` converts `target` this tick.
    pub fn chance(&self, source: Terrain, target: Terrain, coeff: Option<u8>) -> f64 {
        if source == target {
            return 0.0;
        }
        let Some(rule) = self.rules.get(&source) else {
            return 0.0;
        };
        let base = if target.is_void() {
            rule.claim
        } else if rule.victims.contains(&target) {
            rule.overtake
        } else {
            0.0
        };
        match coeff {
            Some(c) => base * (f64::from(c.min(MAX_COEFF)) / f64::from(MAX_COEFF)),
            None => base,
        }
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        for (&terrain, rule) in &self.rules {
            for (field, value) in [("claim", rule.claim), ("overtake", rule.overtake)] {
                if !(0.0..=1.0).contains(&value) {
                    return Err(PolicyError::ChanceOutOfRange {
                        terrain,
                        field,
                        value,
                    });
                }
            }
            if rule.victims.contains(&terrain) {
                return Err(PolicyError::SelfVictim { terrain });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        assert_eq!(SpreadPolicy::default().validate(), Ok(()));
    }

    #[test]
    fn conditional_chance_grows_with_coeff() {
        let policy = SpreadPolicy::default();
        for source in Terrain::SEEDS.into_iter().filter(|t| !t.is_unconditional()) {
            let mut last = 0.0;
            for c in 1..=MAX_COEFF {
                let p = policy.chance(source, Terrain::Void, Some(c));
                assert!(p >= last, "{source} coeff {c}: {p} < {last}");
                last = p;
            }
            assert!(last > 0.0);
        }
    }

    #[test]
    fn full_window_reaches_base_chance() {
        let policy = SpreadPolicy::default();
        assert_eq!(
            policy.chance(Terrain::Desert, Terrain::Void, Some(9)),
            0.8
        );
        assert_eq!(
            policy.chance(Terrain::Desert, Terrain::Void, Some(200)),
            0.8
        );
    }

    #[test]
    fn void_never_spreads() {
        let policy = SpreadPolicy::default();
        for target in Terrain::ALL {
            assert_eq!(policy.chance(Terrain::Void, target, None), 0.0);
        }
    }

    #[test]
    fn only_victims_can_be_overtaken() {
        let policy = SpreadPolicy::default();
        assert!(policy.chance(Terrain::Water, Terrain::Plains, None) > 0.0);
        assert_eq!(policy.chance(Terrain::Water, Terrain::Desert, None), 0.0);
        assert_eq!(policy.chance(Terrain::Water, Terrain::Water, None), 0.0);
    }

    #[test]
    fn rejects_out_of_range_chances() {
        let mut policy = SpreadPolicy::default();
        policy.set_rule(Terrain::Plains, SpreadRule::claims(1.5));
        assert_eq!(
            policy.validate(),
            Err(PolicyError::ChanceOutOfRange {
                terrain: Terrain::Plains,
                field: "claim",
                value: 1.5,
            })
        );

        policy.set_rule(Terrain::Plains, SpreadRule::claims(f64::NAN));
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_self_victims() {
        let mut policy = SpreadPolicy::frozen();
        policy.set_rule(
            Terrain::Forest,
            SpreadRule::overtakes(0.5, 0.5, &[Terrain::Forest]),
        );
        assert_eq!(
            policy.validate(),
            Err(PolicyError::SelfVictim {
                terrain: Terrain::Forest
            })
        );
    }

    #[test]
    fn json_round_trip_keeps_rules() {
        let policy = SpreadPolicy::default();
        let json = serde_json::to_string(&policy).unwrap();
        assert!(json.contains("\"water\""));
        let back: SpreadPolicy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, policy);
    }
}
