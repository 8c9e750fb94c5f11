//! # Headless Scene Test
//!
//! Load scene directories from disk, tick the game loop against the
//! recording backend, and check what each step produced.

use std::fs;
use std::path::{Path, PathBuf};

use prismals::core::{ConfigError, InputState, Key, SceneLoader, DEBUG_COLOR};
use prismals::rendering::{DrawKind, RecordingBackend, RenderBehavior};
use prismals::{GameLoop, GameLoopOptions, HostError};

const DT: f32 = 1.0 / 60.0;

fn shipped_scene() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets")
}

fn write(dir: &Path, name: &str, text: &str) {
    fs::write(dir.join(name), text).unwrap();
}

#[test]
fn test_shipped_scene_first_tick() {
    let scene = SceneLoader::load(shipped_scene()).unwrap();
    let mut game = GameLoop::new(scene, GameLoopOptions::default()).unwrap();
    let mut backend = RecordingBackend::new();

    let stats = game.tick(&InputState::new(), DT, &mut backend).unwrap();

    // Tree (4) and pond (5) payloads spawn; both spawners retire.
    assert_eq!(stats.audicles.spawned, 9);
    assert_eq!(stats.audicles.retired, 2);

    // 32×32 grass, 3 stone, 9 spawned, 8×3×8 dirt and 1 crystal.
    assert_eq!(stats.render.instances, 1024 + 3 + 9 + 192 + 1);
    assert_eq!(stats.render.stars, 1500);
    assert_eq!(stats.render.bucket(RenderBehavior::AnimatedWater), 4);
    assert_eq!(stats.render.bucket(RenderBehavior::AnimatedWireframe), 2);
    assert_eq!(stats.render.bucket(RenderBehavior::StaticBranch), 3);
    assert_eq!(stats.render.bucket(RenderBehavior::AnimatedTransparentWave), 1);
    assert_eq!(stats.render.draw_calls, 6);
    assert!(stats.render.draw_calls_ok());

    let points: Vec<_> = backend.draws().filter(|d| d.kind == DrawKind::Points).collect();
    assert_eq!(points.len(), 1);
    assert_eq!(points[0].vertex_count, 1500);

    assert_eq!(stats.audio_sources, 1);
    assert!(stats.audio_peak.is_some());
    assert!(!stats.tesseract_active);
}

#[test]
fn test_tab_switches_world_and_shows_tesseract() {
    let scene = SceneLoader::load(shipped_scene()).unwrap();
    let mut game = GameLoop::new(scene, GameLoopOptions::default()).unwrap();
    let mut backend = RecordingBackend::new();

    game.tick(&InputState::new(), DT, &mut backend).unwrap();
    let before = game.last_frame().unwrap().stats;

    let tab = InputState::new().with_key(Key::Tab);
    let stats = game.tick(&tab, DT, &mut backend).unwrap();
    assert_eq!(game.level().active_world().unwrap().name, "SkyIsland");
    assert!(stats.tesseract_active);
    assert!(game.tesseract_overlay().is_some());

    // Every world is still drawn.
    assert_eq!(stats.render.instances, before.instances);

    // Holding Tab does not cycle again.
    game.tick(&tab, DT, &mut backend).unwrap();
    assert_eq!(game.level().active_index(), 1);

    // The SkyIsland has no visualizer: the generators go quiet.
    let stats = game.tick(&InputState::new(), DT, &mut backend).unwrap();
    assert_eq!(stats.audio_peak, None);
    assert_eq!(game.audio_shared().unwrap().active_generators(), 0);
}

/// A visualizer 10 units in front of the default camera with a stone wall
/// halfway between.
fn walled_scene(dir: &Path) {
    write(
        dir,
        "scene.toml",
        r#"
entity_files = ["entities.toml"]
worlds = ["world.toml"]

[audio]
seed = 3
"#,
    );
    write(
        dir,
        "entities.toml",
        r#"
[[entity]]
name = "Stone"
is_block = true
is_occluder = true
damping_factor = 0.9

[[entity]]
name = "AudioVisualizer"
"#,
    );
    write(
        dir,
        "world.toml",
        r#"
[[entity]]
name = "Room"
is_world = true
instances = [{ prototype = "AudioVisualizer", position = [6.0, 5.0, 5.0] }]

[entity.fill]
origin = [4.0, 3.0, 10.0]
dimensions = [5, 5, 1]
block = "Stone"
"#,
    );
}

#[test]
fn test_occluded_source_drives_visualizer() {
    let dir = tempfile::tempdir().unwrap();
    walled_scene(dir.path());
    let scene = SceneLoader::load(dir.path()).unwrap();
    let mut game = GameLoop::new(scene, GameLoopOptions::default()).unwrap();
    let mut backend = RecordingBackend::new();
    let mut callback = game.audio_renderer().unwrap();

    let stats = game.tick(&InputState::new(), DT, &mut backend).unwrap();
    assert_eq!(stats.audio_sources, 1);
    assert_eq!(stats.audio_peak, Some(0.0));

    let shared = game.audio_shared().unwrap();
    let state = shared.snapshot();
    assert_eq!(state.active_generators, 1);
    assert!(state.source.occluded);
    assert!(state.source.distance_gain < 1.0);

    let mut block = [0.0_f32; 256];
    for _ in 0..16 {
        callback.fill_block(&mut block);
    }
    let stats = game.tick(&InputState::new(), DT, &mut backend).unwrap();
    assert!(stats.audio_peak.unwrap() > 0.0);

    let proto = game.registry().find("AudioVisualizer").unwrap();
    let room = game.level().active_world().unwrap();
    let visualizer = room.instances.iter().find(|i| i.prototype == proto).unwrap();
    assert_ne!(visualizer.color, DEBUG_COLOR);
}

#[test]
fn test_audio_schedule_without_audio_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    walled_scene(dir.path());
    let scene = SceneLoader::load(dir.path()).unwrap();
    let options = GameLoopOptions {
        enable_audio: false,
        ..GameLoopOptions::default()
    };
    assert!(matches!(GameLoop::new(scene, options), Err(HostError::Core(_))));
}

#[test]
fn test_custom_update_list() {
    let dir = tempfile::tempdir().unwrap();
    walled_scene(dir.path());
    let mut text = fs::read_to_string(dir.path().join("scene.toml")).unwrap();
    text.push_str("\n[systems]\ninit = []\nupdate = [\"update_camera\", \"render_worlds\"]\ncleanup = []\n");
    write(dir.path(), "scene.toml", &text);

    let scene = SceneLoader::load(dir.path()).unwrap();
    let options = GameLoopOptions {
        enable_audio: false,
        ..GameLoopOptions::default()
    };
    let mut game = GameLoop::new(scene, options).unwrap();
    let stats = game.tick(&InputState::new(), DT, &mut RecordingBackend::new()).unwrap();
    assert_eq!(stats.render.instances, 25);
    assert_eq!(stats.audio_peak, None);
}

#[test]
fn test_unknown_step_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    walled_scene(dir.path());
    let mut text = fs::read_to_string(dir.path().join("scene.toml")).unwrap();
    text.push_str("\n[systems]\nupdate = [\"teleport\"]\n");
    write(dir.path(), "scene.toml", &text);

    let err: HostError = SceneLoader::load(dir.path()).unwrap_err().into();
    assert!(matches!(err, HostError::Config(ConfigError::Parse { .. })));
}
