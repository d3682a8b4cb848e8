//! Kinematic body store that stands in for the rigid-body collaborator.
//!
//! Bodies are boxes that integrate their velocity each step and stop on any
//! axis that would push them into a wall. Bodies do not collide with each
//! other. Ray queries report walls and bodies alike, nearest first.

use std::{collections::BTreeMap, time::Duration};

use sundown_core::{Aabb, BodyDesc, BodyHandle, HitObject, PhysicsWorld, RayHit, RayHitTest, Vec3};

#[derive(Clone, Copy, Debug)]
struct Body {
    position: Vec3,
    velocity: Vec3,
    half_extents: Vec3,
}

impl Body {
    fn bounds_at(&self, position: Vec3) -> Aabb {
        Aabb::from_center(position, self.half_extents)
    }
}

/// Static walls plus the dynamic bodies moving between them.
#[derive(Clone, Debug, Default)]
pub struct KinematicWorld {
    walls: Vec<Aabb>,
    bodies: BTreeMap<BodyHandle, Body>,
    next_handle: u32,
}

impl KinematicWorld {
    /// Creates an empty body store surrounded by the provided walls.
    #[must_use]
    pub fn new(walls: Vec<Aabb>) -> Self {
        Self {
            walls,
            bodies: BTreeMap::new(),
            next_handle: 0,
        }
    }

    /// Number of live bodies.
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn blocked(&self, bounds: &Aabb) -> bool {
        self.walls.iter().any(|wall| wall.intersects(bounds))
    }
}

impl PhysicsWorld for KinematicWorld {
    fn add_body(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle::new(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        let _ = self.bodies.insert(
            handle,
            Body {
                position: desc.position,
                velocity: Vec3::ZERO,
                half_extents: desc.half_extents,
            },
        );
        handle
    }

    fn remove_body(&mut self, body: BodyHandle) -> bool {
        self.bodies.remove(&body).is_some()
    }

    fn step(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        let handles: Vec<BodyHandle> = self.bodies.keys().copied().collect();
        for handle in handles {
            let Some(body) = self.bodies.get(&handle).copied() else {
                continue;
            };
            let mut position = body.position;
            for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
                let delta = body.velocity * axis * seconds;
                if delta == Vec3::ZERO {
                    continue;
                }
                let candidate = position + delta;
                if !self.blocked(&body.bounds_at(candidate)) {
                    position = candidate;
                }
            }
            if let Some(stored) = self.bodies.get_mut(&handle) {
                stored.position = position;
            }
        }
    }

    fn position(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|body| body.position)
    }

    fn velocity(&self, body: BodyHandle) -> Option<Vec3> {
        self.bodies.get(&body).map(|body| body.velocity)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(&body) {
            body.velocity = velocity;
        }
    }

    fn set_position(&mut self, body: BodyHandle, position: Vec3) {
        if let Some(body) = self.bodies.get_mut(&body) {
            body.position = position;
        }
    }
}

impl RayHitTest for KinematicWorld {
    fn cast(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<RayHit> {
        let walls = self
            .walls
            .iter()
            .map(|wall| (HitObject::Static, *wall));
        let bodies = self
            .bodies
            .iter()
            .map(|(handle, body)| (HitObject::Body(*handle), body.bounds_at(body.position)));

        let mut hits: Vec<RayHit> = walls
            .chain(bodies)
            .filter_map(|(object, bounds)| {
                let distance = bounds.ray_distance(origin, direction)?;
                (distance <= max_distance).then(|| RayHit {
                    object,
                    point: origin + direction * distance,
                    distance,
                })
            })
            .collect();
        hits.sort_by(|left, right| left.distance.total_cmp(&right.distance));
        hits
    }
}
