//! Plays a scripted encounter on a [`CombatRuntime`].

use combat_content::{CombatProfiles, EncounterSpec, ScriptAction, ScriptStep};
use combat_core::{CombatConfig, DamageRequest, DamageTypeSet, EntityId};
use serde::Serialize;

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError};
use crate::runtime::CombatRuntime;

/// Final state of one actor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActorReport {
    pub name: String,
    pub health: i32,
    pub max_health: i32,
    pub dead: bool,
}

/// Summary produced when an encounter finishes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EncounterReport {
    pub name: String,
    pub ticks: u64,
    pub elapsed: f64,
    pub actors: Vec<ActorReport>,
    pub notifications: usize,
    /// Notification counts by name, sorted by name.
    pub counts: Vec<(&'static str, usize)>,
}

/// Steps a runtime through an encounter's timeline.
#[derive(Debug)]
pub struct EncounterRunner {
    runtime: CombatRuntime,
    name: String,
    duration: f64,
    script: Vec<ScriptStep>,
    cursor: usize,
}

impl EncounterRunner {
    /// Builds the runtime, validates the encounter and spawns its cast.
    pub fn new(
        combat: CombatConfig,
        profiles: CombatProfiles,
        encounter: EncounterSpec,
        seed: u64,
    ) -> Result<Self> {
        encounter.validate(&profiles)?;
        let config = RuntimeConfig::default()
            .with_combat(combat)
            .with_tick_rate(encounter.tick_rate)
            .with_seed(seed);
        let mut runtime = CombatRuntime::new(config, profiles)?;
        for actor in &encounter.actors {
            runtime.spawn_actor(actor)?;
        }
        let script = encounter.timeline().into_iter().cloned().collect();
        tracing::info!(
            target: "runtime::world",
            encounter = %encounter.name,
            actors = encounter.actors.len(),
            "encounter loaded"
        );

        Ok(Self {
            runtime,
            name: encounter.name,
            duration: f64::from(encounter.duration),
            script,
            cursor: 0,
        })
    }

    pub fn runtime(&self) -> &CombatRuntime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut CombatRuntime {
        &mut self.runtime
    }

    pub fn is_finished(&self) -> bool {
        self.runtime.now() >= self.duration
    }

    /// Runs due script steps, then advances one tick.
    pub fn step(&mut self) -> Result<()> {
        self.run_due_steps()?;
        self.runtime.step();
        Ok(())
    }

    /// Plays the encounter to its end.
    pub fn run(&mut self) -> Result<EncounterReport> {
        while !self.is_finished() {
            self.step()?;
        }
        Ok(self.report())
    }

    pub fn report(&self) -> EncounterReport {
        let sink = self.runtime.sink();
        EncounterReport {
            name: self.name.clone(),
            ticks: self.runtime.ticks(),
            elapsed: self.runtime.now(),
            actors: self
                .runtime
                .registry()
                .iter()
                .map(|actor| ActorReport {
                    name: actor.name.clone(),
                    health: actor.health,
                    max_health: actor.max_health,
                    dead: actor.dead,
                })
                .collect(),
            notifications: sink.published(),
            counts: sink.counts().collect(),
        }
    }

    fn run_due_steps(&mut self) -> Result<()> {
        let now = self.runtime.now();
        while let Some(step) = self.script.get(self.cursor) {
            if f64::from(step.at) > now {
                break;
            }
            let action = step.action.clone();
            self.cursor += 1;
            self.execute(&action)?;
        }
        Ok(())
    }

    fn execute(&mut self, action: &ScriptAction) -> Result<()> {
        tracing::debug!(target: "runtime::world", at = self.runtime.now(), ?action, "script step");
        match action {
            ScriptAction::Fire {
                shooter,
                profile,
                direction,
            } => {
                let shooter = self.runtime.entity(shooter)?;
                self.runtime.fire(shooter, profile, *direction)?;
            }
            ScriptAction::StartBeam { shooter, profile } => {
                let shooter = self.runtime.entity(shooter)?;
                self.runtime.start_beam(shooter, profile)?;
            }
            ScriptAction::StopBeam { shooter } => {
                let shooter = self.runtime.entity(shooter)?;
                match self.runtime.stop_beam(shooter) {
                    // The beam may already have retracted on its own.
                    Err(RuntimeError::NoActiveBeam { entity }) => {
                        tracing::warn!(target: "runtime::world", %entity, "no beam to stop");
                    }
                    other => other?,
                }
            }
            ScriptAction::Damage {
                agent,
                target,
                min,
                max,
                types,
            } => {
                let agent = self.optional_entity(agent.as_deref())?;
                let target = self.runtime.entity(target)?;
                let types: DamageTypeSet = types.iter().map(String::as_str).collect();
                let request = DamageRequest::new(target, *min, *max)
                    .with_agent(agent)
                    .with_types(types);
                self.runtime.damage(&request);
            }
            ScriptAction::Kill { agent, target } => {
                let agent = self.optional_entity(agent.as_deref())?;
                let target = self.runtime.entity(target)?;
                self.runtime.kill(agent, target, false);
            }
        }
        Ok(())
    }

    fn optional_entity(&self, name: Option<&str>) -> Result<Option<EntityId>> {
        name.map(|name| self.runtime.entity(name)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use combat_content::ActorSpec;
    use glam::Vec3;

    use super::*;

    #[test]
    fn scripted_damage_lands_at_its_time() {
        let encounter = EncounterSpec {
            name: "drill".into(),
            duration: 1.0,
            tick_rate: 10,
            actors: vec![ActorSpec {
                name: "dummy".into(),
                position: Vec3::new(0.0, 0.0, 3.0),
                ..ActorSpec::default()
            }],
            script: vec![ScriptStep {
                at: 0.5,
                action: ScriptAction::Damage {
                    agent: None,
                    target: "dummy".into(),
                    min: 4.0,
                    max: 4.0,
                    types: Vec::new(),
                },
            }],
        };
        let mut runner =
            EncounterRunner::new(CombatConfig::default(), CombatProfiles::new(), encounter, 7)
                .unwrap();

        for _ in 0..5 {
            runner.step().unwrap();
        }
        assert_eq!(runner.report().actors[0].health, 10);

        let report = runner.run().unwrap();
        assert_eq!(report.actors[0].health, 6);
        assert!(report.elapsed >= 1.0);
    }

    #[test]
    fn stopping_a_missing_beam_is_not_fatal() {
        let encounter = EncounterSpec {
            duration: 0.2,
            tick_rate: 10,
            actors: vec![ActorSpec {
                name: "caster".into(),
                ..ActorSpec::default()
            }],
            script: vec![ScriptStep {
                at: 0.0,
                action: ScriptAction::StopBeam {
                    shooter: "caster".into(),
                },
            }],
            ..EncounterSpec::default()
        };
        let mut runner =
            EncounterRunner::new(CombatConfig::default(), CombatProfiles::new(), encounter, 7)
                .unwrap();
        assert!(runner.run().is_ok());
    }
}
