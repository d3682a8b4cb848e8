use std::time::Duration;

use sundown_core::{Command, EnemyKind, EnemyState, Event, Vec3, WeaponId};
use sundown_world::{self as world, query, World};

#[test]
fn deterministic_replay_produces_identical_logs() {
    let first = replay(scripted_commands());
    let second = replay(scripted_commands());

    assert_eq!(first, second, "replay diverged between runs");
    assert!(
        first.events.iter().any(|event| matches!(event, Event::PelletImpact { .. })),
        "script should land at least one pellet"
    );
}

fn replay(commands: Vec<Command>) -> ReplayOutcome {
    let mut world = World::new();
    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }

    let enemies = query::enemy_view(&world)
        .into_vec()
        .into_iter()
        .map(|snapshot| (snapshot.id.get(), snapshot.state, snapshot.health.current()))
        .collect();

    ReplayOutcome {
        events,
        enemies,
        money: query::player(&world).ledger.money(),
    }
}

fn scripted_commands() -> Vec<Command> {
    let start = query::layout(&World::new()).player_start;
    let eye = start + Vec3::new(0.0, 1.6, 0.0);
    let mut commands = vec![Command::StartGame];

    for offset in [-2.0_f32, 0.0, 2.0] {
        commands.push(Command::SpawnEnemy {
            position: start + Vec3::new(offset, 0.0, 12.0),
            kind: EnemyKind::Regular,
        });
    }
    commands.push(Command::SwitchWeapon {
        weapon: WeaponId::Revolver,
    });

    for round in 0..30 {
        let sway = (round % 5) as f32 * 0.05 - 0.1;
        commands.push(Command::FireWeapon {
            origin: eye,
            direction: Vec3::new(sway, 0.0, 1.0),
        });
        commands.push(Command::Tick {
            dt: Duration::from_millis(150),
        });
        commands.push(Command::Tick {
            dt: Duration::from_millis(150),
        });
        if round % 10 == 9 {
            commands.push(Command::Reload);
            for _ in 0..20 {
                commands.push(Command::Tick {
                    dt: Duration::from_millis(100),
                });
            }
        }
    }

    commands.push(Command::DriveEnemy {
        enemy: sundown_core::EnemyId::new(1),
        state: EnemyState::Chase,
        velocity: Vec3::new(0.0, 0.0, -5.0),
        facing: Some(start),
        patrol_target: None,
    });
    commands.push(Command::Tick {
        dt: Duration::from_millis(100),
    });
    commands
}

#[derive(Debug, PartialEq)]
struct ReplayOutcome {
    events: Vec<Event>,
    enemies: Vec<(u32, EnemyState, u32)>,
    money: u32,
}
