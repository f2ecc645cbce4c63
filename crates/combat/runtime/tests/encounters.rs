use std::fs;

use combat_content::ContentFactory;
use combat_core::CombatEvent;
use combat_runtime::{EncounterRunner, Topic};
use tempfile::TempDir;

const PROFILES: &str = r#"(
    projectiles: {
        "bolt": (
            projectile: (lifetime: 2.0),
            damage: Some((min: 3.0, max: 3.0)),
        ),
    },
    beams: {
        "ray": (beam: (speed: 10.0, max_length: 6.0, strike: 4)),
    },
    stuns: {
        "stagger": (stun_time: 0.2, knockback_force: (0.0, 0.0, 2.0)),
    },
)"#;

const DUEL: &str = r#"(
    name: "duel",
    duration: 1.5,
    tick_rate: 20,
    actors: [
        (name: "hero", position: (0.0, 0.0, 0.0)),
        (name: "slime", position: (0.0, 0.0, 4.0), layer: 2, stun: Some("stagger")),
    ],
    script: [
        (at: 1.2, action: Damage(agent: Some("hero"), target: "slime", min: 2.0, max: 2.0, types: [])),
        (at: 0.0, action: Fire(shooter: "hero", profile: "bolt", direction: None)),
    ],
)"#;

fn data_dir() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::create_dir(dir.path().join("encounters")).expect("Failed to create encounters dir");
    fs::write(dir.path().join("combat.toml"), "min_damage = 1.0\n")
        .expect("Failed to write config");
    fs::write(dir.path().join("profiles.ron"), PROFILES).expect("Failed to write profiles");
    fs::write(dir.path().join("encounters/duel.ron"), DUEL)
        .expect("Failed to write encounter");
    dir
}

#[test]
fn bundle_plays_to_completion() {
    let dir = data_dir();
    let bundle = ContentFactory::new(dir.path())
        .load_bundle("duel")
        .expect("Failed to load bundle");

    let mut runner = EncounterRunner::new(bundle.config, bundle.profiles, bundle.encounter, 42)
        .expect("Failed to build runner");
    let report = runner.run().expect("Encounter should run");

    assert_eq!(report.name, "duel");
    assert_eq!(report.ticks, 30);
    let slime = report
        .actors
        .iter()
        .find(|actor| actor.name == "slime")
        .expect("slime is reported");
    assert_eq!(slime.health, 5);
    assert!(!slime.dead);

    let count = |name: &str| {
        report
            .counts
            .iter()
            .find(|(event, _)| *event == name)
            .map_or(0, |(_, count)| *count)
    };
    assert_eq!(count("projectile_fired"), 1);
    assert_eq!(count("hit"), 1);
    assert_eq!(count("stun_started"), 2);
}

#[test]
fn bus_topics_split_notifications() {
    let dir = data_dir();
    let bundle = ContentFactory::new(dir.path())
        .load_bundle("duel")
        .expect("Failed to load bundle");
    let mut runner = EncounterRunner::new(bundle.config, bundle.profiles, bundle.encounter, 42)
        .expect("Failed to build runner");

    let mut damage = runner.runtime().subscribe(Topic::Damage);
    let mut projectile = runner.runtime().subscribe(Topic::Projectile);
    let mut status = runner.runtime().subscribe(Topic::Status);

    // ===== first hit =====
    for _ in 0..8 {
        runner.step().expect("step should succeed");
    }

    let first = projectile.try_recv().expect("fired event");
    assert!(matches!(first.payload, CombatEvent::ProjectileFired { .. }));
    assert_eq!(first.topic(), Topic::Projectile);

    let mut hits = Vec::new();
    while let Ok(event) = damage.try_recv() {
        assert_eq!(event.topic(), Topic::Damage);
        hits.push(event);
    }
    assert_eq!(hits.len(), 1);
    assert!(matches!(hits[0].payload, CombatEvent::Hit { agent: Some(_), .. }));
    assert!(hits[0].at > 0.0);

    let slime = runner.runtime().entity("slime").expect("slime exists");
    assert_eq!(runner.runtime().actor(slime).map(|actor| actor.health), Some(7));

    let mut statuses = Vec::new();
    while let Ok(event) = status.try_recv() {
        statuses.push(event.payload.name());
    }
    assert!(statuses.contains(&"stun_started"));
    assert!(statuses.contains(&"flicker_started"));
}
