#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Line-of-sight queries between actors standing in the town.

use sundown_core::{
    ActorDirectory, ActorRef, HitObject, LineOfSight, RayHitTest, Vec3, EYE_OFFSET,
};

const MIN_SIGHT_DISTANCE: f32 = 1e-4;

/// Answers line-of-sight queries against a physics scene.
///
/// Rays run from eye height to eye height. Walls and bodies that belong to
/// no actor block the view; the observer's own body and bodies of the
/// observer's faction are looked through. Reaching an actor of another
/// faction counts as seeing the target.
#[derive(Clone, Copy, Debug)]
pub struct Perception<S> {
    scene: S,
}

impl<S> Perception<S>
where
    S: RayHitTest + ActorDirectory,
{
    /// Creates a perception query over the provided scene.
    #[must_use]
    pub const fn new(scene: S) -> Self {
        Self { scene }
    }
}

impl<S> LineOfSight for Perception<S>
where
    S: RayHitTest + ActorDirectory,
{
    fn has_line_of_sight(&self, observer: ActorRef, from: Vec3, to: Vec3) -> bool {
        let eye = from + Vec3::Y * EYE_OFFSET;
        let target = to + Vec3::Y * EYE_OFFSET;
        let offset = target - eye;
        let distance = offset.length();
        if distance < MIN_SIGHT_DISTANCE {
            return true;
        }
        let direction = offset / distance;

        for hit in self.scene.cast(eye, direction, distance) {
            let body = match hit.object {
                HitObject::Static => return false,
                HitObject::Body(body) => body,
            };
            match self.scene.actor_for(body) {
                Some(actor) if actor.faction() == observer.faction() => continue,
                Some(_) => return true,
                None => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sundown_core::{BodyHandle, EnemyId, RayHit};

    #[derive(Debug, Default)]
    struct FixedScene {
        hits: Vec<RayHit>,
        owners: Vec<(BodyHandle, ActorRef)>,
    }

    impl RayHitTest for FixedScene {
        fn cast(&self, _origin: Vec3, _direction: Vec3, max_distance: f32) -> Vec<RayHit> {
            self.hits
                .iter()
                .copied()
                .filter(|hit| hit.distance <= max_distance)
                .collect()
        }
    }

    impl ActorDirectory for FixedScene {
        fn actor_for(&self, body: BodyHandle) -> Option<ActorRef> {
            self.owners
                .iter()
                .find(|(handle, _)| *handle == body)
                .map(|(_, actor)| *actor)
        }
    }

    fn body_hit(handle: u32, distance: f32) -> RayHit {
        RayHit {
            object: HitObject::Body(BodyHandle::new(handle)),
            point: Vec3::Z * distance,
            distance,
        }
    }

    const OBSERVER: ActorRef = ActorRef::Enemy(EnemyId::new(0));

    #[test]
    fn empty_ray_sees_target() {
        let perception = Perception::new(FixedScene::default());
        assert!(perception.has_line_of_sight(OBSERVER, Vec3::ZERO, Vec3::Z * 10.0));
    }

    #[test]
    fn wall_before_target_blocks_view() {
        let scene = FixedScene {
            hits: vec![RayHit {
                object: HitObject::Static,
                point: Vec3::Z * 4.0,
                distance: 4.0,
            }],
            owners: Vec::new(),
        };
        let perception = Perception::new(scene);
        assert!(!perception.has_line_of_sight(OBSERVER, Vec3::ZERO, Vec3::Z * 10.0));
    }

    #[test]
    fn wall_beyond_target_is_ignored() {
        let scene = FixedScene {
            hits: vec![RayHit {
                object: HitObject::Static,
                point: Vec3::Z * 40.0,
                distance: 40.0,
            }],
            owners: Vec::new(),
        };
        let perception = Perception::new(scene);
        assert!(perception.has_line_of_sight(OBSERVER, Vec3::ZERO, Vec3::Z * 10.0));
    }

    #[test]
    fn own_and_allied_bodies_are_transparent() {
        let scene = FixedScene {
            hits: vec![body_hit(0, 0.0), body_hit(1, 3.0), body_hit(2, 9.5)],
            owners: vec![
                (BodyHandle::new(0), OBSERVER),
                (BodyHandle::new(1), ActorRef::Enemy(EnemyId::new(7))),
                (BodyHandle::new(2), ActorRef::Player),
            ],
        };
        let perception = Perception::new(scene);
        assert!(perception.has_line_of_sight(OBSERVER, Vec3::ZERO, Vec3::Z * 10.0));
    }

    #[test]
    fn unowned_bodies_block_view() {
        let scene = FixedScene {
            hits: vec![body_hit(5, 2.0), body_hit(2, 9.5)],
            owners: vec![(BodyHandle::new(2), ActorRef::Player)],
        };
        let perception = Perception::new(scene);
        assert!(!perception.has_line_of_sight(OBSERVER, Vec3::ZERO, Vec3::Z * 10.0));
    }
}
