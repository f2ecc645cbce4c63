use crate::events::{CombatEvent, NotificationSink};
use crate::trigger::TriggerOutcome;
use crate::types::{EntityId, InstanceId};

/// Turns damage dealt by a projectile into meter events for its owner.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HitTransfer {
    /// Meter scale posted with each landed hit.
    pub strength: f32,
    /// Hits rejected by the target (invincible, already dead) still build meter.
    pub absorption_builds_meter: bool,
}

impl Default for HitTransfer {
    fn default() -> Self {
        Self {
            strength: 1.0,
            absorption_builds_meter: true,
        }
    }
}

impl HitTransfer {
    /// Reacts to the outcome of the projectile's damage trigger.
    ///
    /// `owner` is the actor wielding the weapon that fired the projectile;
    /// without one no meter event is posted.
    pub fn on_trigger_outcome(
        &self,
        projectile: InstanceId,
        owner: Option<EntityId>,
        outcome: &TriggerOutcome,
        sink: &mut dyn NotificationSink,
    ) {
        let TriggerOutcome::Applied {
            target,
            amount,
            killed,
        } = *outcome
        else {
            return;
        };

        let counts = amount.is_some() || self.absorption_builds_meter;
        if let (true, Some(owner)) = (counts, owner) {
            sink.notify(CombatEvent::ProjectileHit {
                owner,
                scale: self.strength,
            });
        }
        if killed {
            sink.notify(CombatEvent::ProjectileKilledTarget { projectile, target });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECTILE: InstanceId = InstanceId(3);
    const OWNER: EntityId = EntityId(1);
    const TARGET: EntityId = EntityId(2);

    #[test]
    fn landed_hits_build_meter_and_report_kills() {
        let transfer = HitTransfer {
            strength: 2.5,
            ..HitTransfer::default()
        };
        let mut events = Vec::new();
        let outcome = TriggerOutcome::Applied {
            target: TARGET,
            amount: Some(4),
            killed: true,
        };
        transfer.on_trigger_outcome(PROJECTILE, Some(OWNER), &outcome, &mut events);
        assert_eq!(
            events,
            vec![
                CombatEvent::ProjectileHit {
                    owner: OWNER,
                    scale: 2.5
                },
                CombatEvent::ProjectileKilledTarget {
                    projectile: PROJECTILE,
                    target: TARGET
                },
            ]
        );
    }

    #[test]
    fn absorbed_hits_build_meter_by_default() {
        let absorbed = TriggerOutcome::Applied {
            target: TARGET,
            amount: None,
            killed: false,
        };
        let mut events = Vec::new();
        HitTransfer::default().on_trigger_outcome(PROJECTILE, Some(OWNER), &absorbed, &mut events);
        assert_eq!(
            events,
            vec![CombatEvent::ProjectileHit {
                owner: OWNER,
                scale: 1.0
            }]
        );

        HitTransfer::default().on_trigger_outcome(PROJECTILE, None, &absorbed, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn absorbed_hits_are_ignored_when_disabled() {
        let absorbed = TriggerOutcome::Applied {
            target: TARGET,
            amount: None,
            killed: false,
        };
        let transfer = HitTransfer {
            absorption_builds_meter: false,
            ..HitTransfer::default()
        };
        let mut events = Vec::new();
        transfer.on_trigger_outcome(PROJECTILE, Some(OWNER), &absorbed, &mut events);
        assert!(events.is_empty());
    }
}
