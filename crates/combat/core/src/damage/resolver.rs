use crate::config::CombatConfig;
use crate::env::{HealthChange, HealthGateway, RngOracle, StatsView};
use crate::types::EntityId;

use super::profile::WeaknessImmunityProfile;
use super::tags::DamageTypeSet;

/// One damage or healing application.
///
/// A request with `min < 0` is a heal request; its magnitude resolves to a
/// negative health delta.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRequest {
    pub agent: Option<EntityId>,
    pub target: EntityId,
    pub min: f32,
    pub max: f32,
    pub types: DamageTypeSet,
    pub scale: f32,
    pub honor_invincibility: bool,
}

impl DamageRequest {
    pub fn new(target: EntityId, min: f32, max: f32) -> Self {
        Self {
            agent: None,
            target,
            min,
            max,
            types: DamageTypeSet::new(),
            scale: 1.0,
            honor_invincibility: true,
        }
    }

    #[must_use]
    pub fn with_agent(mut self, agent: Option<EntityId>) -> Self {
        self.agent = agent;
        self
    }

    #[must_use]
    pub fn with_types(mut self, types: DamageTypeSet) -> Self {
        self.types = types;
        self
    }

    #[must_use]
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    #[must_use]
    pub fn with_honor_invincibility(mut self, honor: bool) -> Self {
        self.honor_invincibility = honor;
        self
    }

    pub fn is_heal(&self) -> bool {
        self.min < 0.0
    }
}

/// Computes damage magnitudes and emits health-change instructions.
///
/// Holds the global tunables and the injected random source; every other
/// input arrives per call.
pub struct DamageResolver {
    config: CombatConfig,
    rng: Box<dyn RngOracle>,
}

impl DamageResolver {
    pub fn new(config: CombatConfig, rng: impl RngOracle + 'static) -> Self {
        Self {
            config,
            rng: Box::new(rng),
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    /// Rolls a magnitude for `request` and applies modifiers and clamps.
    ///
    /// Stat views only select the scaled path; see [`Self::damage_multiplier`].
    pub fn compute_damage(
        &mut self,
        request: &DamageRequest,
        agent_stats: Option<&StatsView>,
        target_stats: Option<&StatsView>,
        profile: Option<&WeaknessImmunityProfile>,
    ) -> f32 {
        let roll = self.rng.range_f32(request.min, request.max);
        let base = match (agent_stats, target_stats) {
            (Some(agent), Some(target)) => roll * self.damage_multiplier(agent, target),
            _ => roll,
        };
        let modified = match profile {
            Some(profile) => apply_modifiers(base, &request.types, profile),
            None => base,
        };
        clamp_magnitude(modified, request.min, &self.config)
    }

    /// Uniform roll in `[min, max]` without modifiers or clamps.
    pub fn compute_healing(&mut self, min: f32, max: f32) -> f32 {
        self.rng.range_f32(min, max)
    }

    /// Stat-driven scaling between attacker and defender.
    ///
    /// Always `1.0`: no stat formula is defined yet. `attack_scale` and
    /// `defense_scale` are reserved for it.
    pub fn damage_multiplier(&self, _agent: &StatsView, _target: &StatsView) -> f32 {
        1.0
    }

    /// Applies `request` to its target through the health gateway.
    ///
    /// Returns the integer delta that was sent, or `None` when a guard
    /// rejected the request (no health, dead, or invincible while the request
    /// honors invincibility).
    pub fn resolve_direct_damage<H>(
        &mut self,
        health: &mut H,
        request: &DamageRequest,
    ) -> Option<i32>
    where
        H: HealthGateway + ?Sized,
    {
        if !passes_guards(health, request.target, request.honor_invincibility) {
            return None;
        }

        let computed = if self.config.god_mode_allowed {
            0.0
        } else {
            let agent_stats = request.agent.and_then(|agent| health.stats(agent));
            let target_stats = health.stats(request.target);
            let profile = health.weakness_profile(request.target);
            self.compute_damage(
                request,
                agent_stats.as_ref(),
                target_stats.as_ref(),
                profile,
            )
        };
        let amount = (request.scale * computed).ceil() as i32;

        if self.config.report_damage {
            tracing::debug!(
                target: "combat::damage",
                agent = ?request.agent,
                target_entity = %request.target,
                amount,
                "direct damage"
            );
        }

        health.apply(
            request.target,
            HealthChange::Delta {
                amount,
                source: request.agent,
                honor_invincibility: request.honor_invincibility,
            },
        );
        Some(amount)
    }

    /// Kills `target` under the same guards as direct damage.
    ///
    /// Returns whether the kill instruction was sent.
    pub fn force_kill<H>(
        &self,
        health: &mut H,
        agent: Option<EntityId>,
        target: EntityId,
        honor_invincibility: bool,
    ) -> bool
    where
        H: HealthGateway + ?Sized,
    {
        if !passes_guards(health, target, honor_invincibility) {
            return false;
        }
        health.apply(target, HealthChange::Kill { source: agent });
        true
    }
}

impl std::fmt::Debug for DamageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DamageResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn passes_guards<H>(health: &H, target: EntityId, honor_invincibility: bool) -> bool
where
    H: HealthGateway + ?Sized,
{
    let Some(view) = health.health(target) else {
        tracing::trace!(target: "combat::damage", %target, "target has no health");
        return false;
    };
    if view.is_dead {
        tracing::trace!(target: "combat::damage", %target, "target already dead");
        return false;
    }
    if honor_invincibility && view.is_invincible {
        tracing::trace!(target: "combat::damage", %target, "target invincible");
        return false;
    }
    true
}

/// Multiplies by every matching weakness, then divides by every matching
/// immunity.
///
/// A non-positive or non-finite immunity multiplier means full immunity: the
/// value drops to zero (the clamp then applies) and a warning is logged.
pub fn apply_modifiers(
    value: f32,
    types: &DamageTypeSet,
    profile: &WeaknessImmunityProfile,
) -> f32 {
    let mut value = profile
        .matching_weaknesses(types)
        .fold(value, |acc, pair| acc * pair.multiplier);
    for pair in profile.matching_immunities(types) {
        if pair.multiplier.is_finite() && pair.multiplier > 0.0 {
            value /= pair.multiplier;
        } else {
            tracing::warn!(
                target: "combat::damage",
                tag = %pair.tag,
                multiplier = pair.multiplier,
                "invalid immunity multiplier treated as full immunity"
            );
            value = 0.0;
        }
    }
    value
}

/// Enforces the minimum magnitudes.
///
/// Heal requests (`request_min < 0`) end at or below `-min_heal`; damage
/// requests end at or above `min_damage`.
pub fn clamp_magnitude(value: f32, request_min: f32, config: &CombatConfig) -> f32 {
    if request_min < 0.0 {
        if value > -config.min_heal {
            return -config.min_heal;
        }
    } else if value < config.min_damage {
        return config.min_damage;
    }
    value
}
