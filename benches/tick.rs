use criterion::{criterion_group, criterion_main, Criterion, black_box};

use gaitwheel::animation::presets;
use gaitwheel::locomotion::{LocomotionConfig, LocomotionSession, NoFeet, TickInput};

use glam::Vec3;

const DT: f32 = 1.0 / 60.0;

fn new_session() -> LocomotionSession {
    match LocomotionSession::new(presets::procedural_avatar(), LocomotionConfig::default()) {
        Ok(session) => session,
        Err(e) => panic!("built-in avatar rejected: {}", e),
    }
}

fn input(velocity: Vec3, height: f32, yaw_delta: f32) -> TickInput {
    TickInput {
        delta_time: DT,
        velocity,
        height_above_surface: height,
        yaw_delta,
    }
}

fn bench_tick_walking(c: &mut Criterion) {
    let mut session = new_session();
    let walk = input(Vec3::new(0.0, 0.0, -2.0), 0.0, 0.5);
    for _ in 0..120 {
        session.tick(&walk, &mut NoFeet);
    }

    c.bench_function("tick_walking", |b| {
        b.iter(|| session.tick(black_box(&walk), &mut NoFeet));
    });
}

fn bench_tick_flying(c: &mut Criterion) {
    let mut session = new_session();
    let mut frame = 0u32;

    c.bench_function("tick_flying", |b| {
        b.iter(|| {
            frame += 1;
            let t = frame as f32 * 0.05;
            let velocity = Vec3::new(0.0, t.sin() * 3.0, -10.0 + t.cos() * 4.0);
            session.tick(black_box(&input(velocity, 30.0, 0.2)), &mut NoFeet)
        });
    });
}

fn bench_tick_nested_transitions(c: &mut Criterion) {
    let mut session = new_session();
    let states = [
        input(Vec3::ZERO, 0.0, 0.0),
        input(Vec3::new(0.0, 0.0, -2.0), 0.0, 0.0),
        input(Vec3::new(0.0, 4.0, -2.0), 1.0, 0.0),
        input(Vec3::ZERO, 5.0, 0.0),
    ];
    let mut frame = 0usize;

    // Switching every few ticks keeps the transition chain deep
    c.bench_function("tick_nested_transitions", |b| {
        b.iter(|| {
            frame += 1;
            let tick = &states[(frame / 3) % states.len()];
            session.tick(black_box(tick), &mut NoFeet)
        });
    });
}

criterion_group!(
    benches,
    bench_tick_walking,
    bench_tick_flying,
    bench_tick_nested_transitions,
);
criterion_main!(benches);
