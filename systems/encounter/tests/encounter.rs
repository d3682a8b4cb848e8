use std::time::Duration;

use sundown_core::{Command, DialogueCue, Difficulty, EnemyKind, Event, GameState};
use sundown_system_encounter::{Config, Encounter};
use sundown_world::{self as world, query, World};

fn respond(world: &mut World, encounter: &mut Encounter, events: &[Event]) -> Vec<Event> {
    let mut commands = Vec::new();
    encounter.handle(
        events,
        query::game_state(world),
        query::difficulty(world),
        &query::layout(world).spawn_points,
        query::active_enemy_count(world),
        &mut commands,
    );
    let mut reactions = Vec::new();
    for command in commands {
        world::apply(world, command, &mut reactions);
    }
    reactions
}

#[test]
fn starting_a_run_spawns_the_opening_wave() {
    let mut world = World::new();
    let mut encounter = Encounter::new(Config::new(0x0bad_5eed));
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartGame, &mut events);

    let reactions = respond(&mut world, &mut encounter, &events);

    let available = query::layout(&world).spawn_points.len();
    assert_eq!(query::difficulty(&world), Difficulty::Normal);
    assert_eq!(query::active_enemy_count(&world), available.min(30));

    let bosses: Vec<_> = query::enemy_view(&world)
        .iter()
        .filter(|enemy| enemy.kind == EnemyKind::Boss)
        .map(|enemy| enemy.id)
        .collect();
    assert_eq!(bosses.len(), 1);
    assert!(reactions.contains(&Event::DialogueRaised {
        cue: DialogueCue::BossSpawn,
        speaker: bosses[0],
    }));
}

#[test]
fn reinforcements_stop_at_the_cap() {
    let mut world = World::new();
    let mut events = Vec::new();
    world::apply(&mut world, Command::CycleDifficulty, &mut events);
    world::apply(&mut world, Command::CycleDifficulty, &mut events);
    assert_eq!(query::difficulty(&world), Difficulty::Easy);
    world::apply(&mut world, Command::StartGame, &mut events);
    assert_eq!(query::game_state(&world), GameState::Playing);

    let mut encounter = Encounter::with_random(sundown_core::ScriptedRandom::constant(0.0));
    for _ in 0..50 {
        let mut tick = Vec::new();
        world::apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(16),
            },
            &mut tick,
        );
        let _ = respond(&mut world, &mut encounter, &tick);
    }

    assert_eq!(query::active_enemy_count(&world), 3);
}
