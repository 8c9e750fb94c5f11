//! # Audicle Scenario Tests
//!
//! End-to-end ticks over the core model: input events in, audicle pass,
//! world state out.

use prismals_core::{
    AudicleKind, AudicleProcessor, CameraState, InputState, InstanceFactory, InstanceTemplate, Key,
    KeyboardInput, Level, Prototype, PrototypeRegistry, UavMovement, Vec3, World, DEBUG_COLOR,
};

struct Setup {
    registry: PrototypeRegistry,
    level: Level,
    factory: InstanceFactory,
}

/// `[Block, World, DebugAudicle(payload = 2 blocks), UAV_W(gated)]`
fn setup() -> Setup {
    let mut registry = PrototypeRegistry::new();
    let block = registry.register(Prototype::block("Block")).unwrap();
    registry.register(Prototype::new("World").with_world()).unwrap();
    registry
        .register_with_payload(
            Prototype::audicle("DebugAudicle", AudicleKind::OneShot),
            vec![
                InstanceTemplate::new(block, Vec3::new(0.0, 0.0, 0.0), DEBUG_COLOR),
                InstanceTemplate::new(block, Vec3::new(1.0, 0.0, 0.0), DEBUG_COLOR),
            ],
        )
        .unwrap();
    registry
        .register(Prototype::audicle("UAV_W", AudicleKind::Gated))
        .unwrap();

    Setup {
        registry,
        level: Level::new(vec![World::new("Overworld"), World::new("Volume")]),
        factory: InstanceFactory::new(),
    }
}

#[test]
fn test_spawn_scenario() {
    let mut s = setup();
    let spawner = s.registry.require("DebugAudicle").unwrap();
    let block = s.registry.require("Block").unwrap();
    let trigger = s.factory.create(spawner, Vec3::new(-7.0, 3.0, 12.0), DEBUG_COLOR);
    s.level.active_world_mut().unwrap().push(trigger);

    let mut processor = AudicleProcessor::default();
    let world = s.level.active_world_mut().unwrap();
    processor.process(world, &mut s.registry, &mut s.factory).unwrap();

    let positions: Vec<Vec3> = world.instances.iter().map(|i| i.position).collect();
    assert_eq!(positions, vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)]);
    assert!(world.instances.iter().all(|i| i.prototype == block));
    assert_eq!(world.count_of(spawner), 0);
}

#[test]
fn test_gated_event_scenario() {
    let mut s = setup();
    let uav_w = s.registry.require("UAV_W").unwrap();
    let mut keyboard = KeyboardInput::new(&s.registry);
    let mut processor = AudicleProcessor::default();
    let input = InputState::new().with_key(Key::W);

    keyboard.process(&input, &mut s.level, &mut s.factory).unwrap();
    assert_eq!(s.level.active_world().unwrap().count_of(uav_w), 1);

    // No movement system runs this tick; the event is still retired.
    let world = s.level.active_world_mut().unwrap();
    let report = processor.process(world, &mut s.registry, &mut s.factory).unwrap();
    assert_eq!(report.retired, 1);
    assert_eq!(world.count_of(uav_w), 0);
}

#[test]
fn test_held_key_moves_camera_every_tick() {
    let mut s = setup();
    let mut keyboard = KeyboardInput::new(&s.registry);
    let mut processor = AudicleProcessor::default();
    let uav = UavMovement::new();
    let mut camera = CameraState::default();
    let input = InputState::new().with_key(Key::W);

    for _ in 0..10 {
        keyboard.process(&input, &mut s.level, &mut s.factory).unwrap();
        let world = s.level.active_world_mut().unwrap();
        uav.apply(world, &s.registry, &mut camera, 0.1).unwrap();
        processor.process(world, &mut s.registry, &mut s.factory).unwrap();
        assert!(world.is_empty());
    }

    // 10 ticks at 5 u/s for 0.1 s each, straight down -Z.
    assert!((camera.position.z - 10.0).abs() < 1e-3);
}

#[test]
fn test_events_only_reach_active_world() {
    let mut s = setup();
    let mut keyboard = KeyboardInput::new(&s.registry);
    let w_then_tab = InputState::new().with_key(Key::W).with_key(Key::Tab);

    keyboard.process(&w_then_tab, &mut s.level, &mut s.factory).unwrap();

    // The event lands in the world that was active when keys were read.
    assert_eq!(s.level.worlds()[0].len(), 1);
    assert_eq!(s.level.worlds()[1].len(), 0);
    assert_eq!(s.level.active_index(), 1);
}
