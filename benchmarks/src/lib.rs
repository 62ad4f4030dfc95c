//! Scene builders shared by the collision benchmarks.

use std::f32::consts::TAU;

use anyhow::Result;
use glam::{Quat, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rein_collision::{BodyKind, CollisionWorld, Shape, Transform};

/// Fixed seed so scenes are identical across runs.
fn scene_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

fn scatter(rng: &mut StdRng, extent: f32) -> Vec3 {
    Vec3::new(
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
        rng.gen_range(-extent..extent),
    )
}

/// One of each shape kind, cycled by `index`.
pub fn mixed_shape(index: usize) -> Result<Shape> {
    let shape = match index % 4 {
        0 => Shape::sphere(0.5)?,
        1 => Shape::cuboid(Vec3::new(0.5, 0.4, 0.6))?,
        2 => Shape::capsule(Vec3::new(0.0, -0.4, 0.0), Vec3::new(0.0, 0.4, 0.0), 0.3)?,
        _ => Shape::convex_mesh(vec![
            Vec3::new(0.6, 0.0, 0.0),
            Vec3::new(-0.6, 0.0, 0.0),
            Vec3::new(0.0, 0.6, 0.0),
            Vec3::new(0.0, -0.6, 0.0),
            Vec3::new(0.0, 0.0, 0.6),
            Vec3::new(0.0, 0.0, -0.6),
        ])?,
    };
    Ok(shape)
}

/// `n` dynamic spheres scattered in a cube sized for moderate overlap.
pub fn setup_sphere_world(n: usize) -> Result<CollisionWorld> {
    let mut world = CollisionWorld::default();
    let mut rng = scene_rng(0x5eed);
    let extent = (n as f32).cbrt() * 0.8;
    for _ in 0..n {
        let t = Transform::from_translation(scatter(&mut rng, extent));
        world.add_body(Shape::sphere(0.5)?, t, BodyKind::Dynamic);
    }
    Ok(world)
}

/// `n` dynamic bodies of mixed shapes with random orientations.
pub fn setup_mixed_world(n: usize) -> Result<CollisionWorld> {
    let mut world = CollisionWorld::default();
    let mut rng = scene_rng(0xbeef);
    let extent = (n as f32).cbrt() * 0.8;
    for i in 0..n {
        let rotation = Quat::from_euler(
            glam::EulerRot::XYZ,
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
            rng.gen_range(0.0..TAU),
        );
        let t = Transform::from_translation(scatter(&mut rng, extent)).with_rotation(rotation);
        world.add_body(mixed_shape(i)?, t, BodyKind::Dynamic);
    }
    Ok(world)
}

/// `n` bodies spread far apart: broadphase cost with no contacts.
pub fn setup_sparse_world(n: usize) -> Result<CollisionWorld> {
    let mut world = CollisionWorld::default();
    for i in 0..n {
        let t = Transform::from_translation(Vec3::new(i as f32 * 3.0, 0.0, 0.0));
        world.add_body(mixed_shape(i)?, t, BodyKind::Dynamic);
    }
    Ok(world)
}

/// A static floor with `n` dynamic bodies stacked into it in a grid.
pub fn setup_floor_scene(n: usize) -> Result<CollisionWorld> {
    let mut world = CollisionWorld::default();
    let side = (n as f32).sqrt().ceil() as usize;
    let half = side as f32 * 0.75;
    world.add_body(
        Shape::cuboid(Vec3::new(half + 1.0, 0.5, half + 1.0))?,
        Transform::from_translation(Vec3::new(0.0, -0.5, 0.0)),
        BodyKind::Static,
    );
    for i in 0..n {
        let x = (i % side) as f32 * 1.5 - half;
        let z = (i / side) as f32 * 1.5 - half;
        let t = Transform::from_translation(Vec3::new(x, 0.3, z));
        world.add_body(mixed_shape(i)?, t, BodyKind::Dynamic);
    }
    Ok(world)
}
