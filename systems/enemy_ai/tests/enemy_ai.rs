use std::time::Duration;

use sundown_core::{
    ActorRef, Command, EnemyId, EnemyKind, EnemyState, Event, Layout, ScriptedRandom, Vec3,
};
use sundown_system_enemy_ai::EnemyAi;
use sundown_system_perception::Perception;
use sundown_world::{self as world, query, World};

fn open_world(enemy_at: Vec3) -> (World, EnemyId) {
    let layout = Layout {
        player_start: Vec3::ZERO,
        goal: None,
        spawn_points: Vec::new(),
        walls: Vec::new(),
    };
    let mut world = World::with_layout(layout);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartGame, &mut events);
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            position: enemy_at,
            kind: EnemyKind::Regular,
        },
        &mut events,
    );
    (world, EnemyId::new(0))
}

/// Advances one tick, lets the AI react and applies its commands.
fn step(world: &mut World, ai: &mut EnemyAi) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(100),
        },
        &mut events,
    );

    let mut commands = Vec::new();
    let view = query::enemy_view(world);
    let player = query::player(world);
    let sight = Perception::new(query::scene(world));
    ai.handle(
        &events,
        query::game_state(world),
        &view,
        &player,
        &sight,
        &mut commands,
    );

    let mut reactions = Vec::new();
    for command in commands {
        world::apply(world, command, &mut reactions);
    }
    reactions
}

#[test]
fn close_enemy_with_clear_sight_attacks_once() {
    let (mut world, enemy) = open_world(Vec3::new(0.0, 0.0, 10.0));
    let mut ai = EnemyAi::with_random(ScriptedRandom::new([0.5, 0.5, 0.1]));

    let events = step(&mut world, &mut ai);

    let damage: Vec<&Event> = events
        .iter()
        .filter(|event| matches!(event, Event::DamageApplied { .. }))
        .collect();
    assert_eq!(
        damage,
        vec![&Event::DamageApplied {
            target: ActorRef::Player,
            amount: 10,
            remaining: 90,
        }]
    );
    assert!(events.contains(&Event::EnemyStateChanged {
        enemy,
        from: EnemyState::Patrol,
        to: EnemyState::Attack,
    }));
    let view = query::enemy_view(&world);
    assert_eq!(
        view.get(enemy).and_then(|snapshot| snapshot.last_attack),
        Some(Duration::from_millis(100))
    );
}

#[test]
fn attack_cooldown_spaces_enemy_shots() {
    let (mut world, _) = open_world(Vec3::new(0.0, 0.0, 10.0));
    let mut ai = EnemyAi::with_random(ScriptedRandom::new([0.5, 0.5, 0.1]));

    let mut shots = 0;
    for _ in 0..30 {
        shots += step(&mut world, &mut ai)
            .iter()
            .filter(|event| matches!(event, Event::EnemyFired { .. }))
            .count();
    }

    assert_eq!(shots, 2);
    assert_eq!(query::player(&world).health.current(), 80);
}

#[test]
fn distant_enemy_keeps_patrolling() {
    let (mut world, enemy) = open_world(Vec3::new(0.0, 0.0, 50.0));
    let mut ai = EnemyAi::with_random(ScriptedRandom::constant(0.5));

    let events = step(&mut world, &mut ai);

    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyStateChanged { .. })));
    let view = query::enemy_view(&world);
    let snapshot = view.get(enemy).expect("enemy stays in the roster");
    assert_eq!(snapshot.state, EnemyState::Patrol);
    assert!(snapshot.patrol_target.is_some());
    assert_eq!(query::player(&world).health.current(), 100);
}

#[test]
fn enemy_behind_wall_does_not_attack() {
    let layout = Layout {
        player_start: Vec3::ZERO,
        goal: None,
        spawn_points: Vec::new(),
        walls: vec![sundown_core::Aabb::new(
            Vec3::new(-5.0, 0.0, 4.0),
            Vec3::new(5.0, 5.0, 5.0),
        )],
    };
    let mut world = World::with_layout(layout);
    let mut events = Vec::new();
    world::apply(&mut world, Command::StartGame, &mut events);
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            position: Vec3::new(0.0, 0.0, 10.0),
            kind: EnemyKind::Regular,
        },
        &mut events,
    );
    let mut ai = EnemyAi::with_random(ScriptedRandom::new([0.5, 0.5, 0.1]));

    let reactions = step(&mut world, &mut ai);

    assert!(!reactions
        .iter()
        .any(|event| matches!(event, Event::EnemyFired { .. })));
    let view = query::enemy_view(&world);
    assert_eq!(
        view.get(EnemyId::new(0)).map(|snapshot| snapshot.state),
        Some(EnemyState::Patrol)
    );
}
