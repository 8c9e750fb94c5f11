//! # Render Scenario Tests
//!
//! Spawn content through the audicle pass, then render it headlessly and
//! check what reached the backend.

use prismals_core::{
    AudicleKind, AudicleProcessor, CameraState, InstanceFactory, InstanceTemplate, Level, Prototype,
    PrototypeId, PrototypeRegistry, StarField, Vec3, World, DEBUG_COLOR,
};
use prismals_rendering::{
    BackendCall, BufferSlot, DrawKind, InstanceRecord, RecordingBackend, RenderBehavior,
    RenderPipeline, SkyGradient,
};

struct Scene {
    registry: PrototypeRegistry,
    level: Level,
    factory: InstanceFactory,
    star: PrototypeId,
}

/// One world holding a spawner whose payload is 3 stone, 2 water, 1 branch.
fn scene() -> Scene {
    let mut registry = PrototypeRegistry::new();
    let stone = registry.register(Prototype::block("Stone")).unwrap();
    let water = registry.register(Prototype::block("Water").with_animated(true)).unwrap();
    let branch = registry.register(Prototype::block("Branch")).unwrap();
    let star = registry.register(Prototype::new("Star").with_star()).unwrap();

    let mut payload: Vec<_> = (0..3)
        .map(|i| InstanceTemplate::new(stone, Vec3::new(i as f32, 0.0, 0.0), DEBUG_COLOR))
        .collect();
    payload.push(InstanceTemplate::new(water, Vec3::new(0.0, 0.0, 1.0), DEBUG_COLOR));
    payload.push(InstanceTemplate::new(water, Vec3::new(1.0, 0.0, 1.0), DEBUG_COLOR));
    payload.push(InstanceTemplate::new(branch, Vec3::new(0.0, 1.0, 0.0), DEBUG_COLOR).with_rotation(1.2));
    let gen = registry
        .register_with_payload(Prototype::audicle("WorldGen", AudicleKind::OneShot), payload)
        .unwrap();

    let mut factory = InstanceFactory::new();
    let mut world = World::new("Overworld");
    world.push(factory.create(gen, Vec3::ZERO, DEBUG_COLOR));

    Scene {
        registry,
        level: Level::new(vec![world]),
        factory,
        star,
    }
}

#[test]
fn test_spawn_then_render() {
    let mut s = scene();
    let mut pipeline = RenderPipeline::new(SkyGradient::standard());
    let mut backend = RecordingBackend::new();

    // Before the audicle pass only the (hidden) spawner exists.
    pipeline.begin_frame(0.0, 0.5);
    pipeline.update_camera(&CameraState::default(), 16.0 / 9.0);
    let frame = pipeline.prepare_frame(&s.level, &s.registry, &mut backend).unwrap();
    assert_eq!(frame.stats.draw_calls, 0);

    let mut processor = AudicleProcessor::default();
    let report = processor
        .process(s.level.active_world_mut().unwrap(), &mut s.registry, &mut s.factory)
        .unwrap();
    assert_eq!(report.spawned, 6);

    backend.clear();
    let frame = pipeline.prepare_frame(&s.level, &s.registry, &mut backend).unwrap();
    assert_eq!(frame.stats.draw_calls, 3);
    assert_eq!(frame.stats.instances, 6);
    assert_eq!(frame.stats.bucket(RenderBehavior::StaticDefault), 3);
    assert_eq!(frame.stats.bucket(RenderBehavior::AnimatedWater), 2);
    assert_eq!(frame.stats.bucket(RenderBehavior::StaticBranch), 1);

    let branch = pipeline.batcher().buckets().branch_records()[0];
    assert_eq!(branch.rotation, 1.2);
    assert_eq!(branch.position, [0.0, 1.0, 0.0]);
}

#[test]
fn test_star_field_is_one_point_draw() {
    let mut s = scene();
    StarField {
        star: s.star,
        count: 200,
        distance: 500.0,
        seed: 7,
    }
    .apply(s.level.active_world_mut().unwrap(), &mut s.factory);

    let mut pipeline = RenderPipeline::new(SkyGradient::standard());
    let mut backend = RecordingBackend::new();
    pipeline.begin_frame(0.0, 0.0);
    let frame = pipeline.prepare_frame(&s.level, &s.registry, &mut backend).unwrap();

    let draws: Vec<_> = backend.draws().copied().collect();
    assert_eq!(draws.len(), 1);
    assert_eq!(draws[0].slot, BufferSlot::Stars);
    assert_eq!(draws[0].kind, DrawKind::Points);
    assert_eq!(draws[0].vertex_count, 200);
    assert_eq!(frame.stats.stars, 200);
    assert_eq!(frame.stats.instances, 0);
}

#[test]
fn test_every_world_is_rendered() {
    let mut registry = PrototypeRegistry::new();
    let stone = registry.register(Prototype::block("Stone")).unwrap();
    let mut factory = InstanceFactory::new();

    let worlds = (0..3)
        .map(|w| {
            let mut world = World::new(format!("w{w}"));
            for i in 0..=w {
                world.push(factory.create(stone, Vec3::new(i as f32, w as f32, 0.0), DEBUG_COLOR));
            }
            world
        })
        .collect();
    let mut level = Level::new(worlds);
    level.cycle_active();

    let mut pipeline = RenderPipeline::default();
    let mut backend = RecordingBackend::new();
    pipeline.prepare_frame(&level, &registry, &mut backend).unwrap();

    assert_eq!(
        backend.calls(),
        &[
            BackendCall::EnsureCapacity {
                slot: BufferSlot::Behavior(RenderBehavior::StaticDefault),
                bytes: 6 * InstanceRecord::SIZE as u64,
            },
            BackendCall::Upload {
                slot: BufferSlot::Behavior(RenderBehavior::StaticDefault),
                bytes: 6 * InstanceRecord::SIZE,
            },
            BackendCall::Draw(prismals_rendering::DrawCall {
                slot: BufferSlot::Behavior(RenderBehavior::StaticDefault),
                kind: DrawKind::Cubes,
                vertex_count: 36,
                instance_count: 6,
            }),
        ]
    );
}

#[test]
fn test_growth_across_frames() {
    let mut s = scene();
    let mut pipeline = RenderPipeline::default();
    let mut backend = RecordingBackend::new();
    let stone = s.registry.require("Stone").unwrap();

    let mut reallocations = 0;
    for frame_no in 0..5 {
        let world = s.level.active_world_mut().unwrap();
        for i in 0..(frame_no * 10) {
            world.push(s.factory.create(stone, Vec3::new(i as f32, frame_no as f32, 5.0), DEBUG_COLOR));
        }
        backend.clear();
        reallocations += pipeline
            .prepare_frame(&s.level, &s.registry, &mut backend)
            .unwrap()
            .stats
            .reallocations;
    }

    // Frames 1..=4 each add blocks, so the stone bucket outgrows its buffer four times.
    assert_eq!(reallocations, 4);
    let total = s.level.active_world().unwrap().len() - 1;
    assert_eq!(
        pipeline.batcher().capacity(BufferSlot::Behavior(RenderBehavior::StaticDefault)),
        (total * InstanceRecord::SIZE) as u64
    );
}
