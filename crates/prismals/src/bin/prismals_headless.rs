//! # PRISMALS Headless
//!
//! Loads a scene directory and runs a scripted number of ticks against the
//! recording backend. No window, no GPU, no audio device: the audio callback
//! is driven inline once per tick.
//!
//! Usage: `prismals_headless [SCENE_DIR] [TICKS]`

use std::process::ExitCode;

use prismals::core::{InputState, Key, SceneLoader};
use prismals::rendering::RecordingBackend;
use prismals::{GameLoop, GameLoopOptions, HostResult};

/// Default scene directory, relative to the working directory.
const DEFAULT_SCENE: &str = "assets";

/// Default tick count.
const DEFAULT_TICKS: u64 = 240;

/// Fixed simulation step (60 Hz).
const TICK_DT: f32 = 1.0 / 60.0;

/// Input held on a given tick of the script.
fn scripted_input(tick: u64) -> InputState {
    let mut input = InputState::new();
    match tick % 240 {
        20..=79 => input.press(Key::W),
        80..=99 => input.press(Key::Space),
        120 => input.press(Key::Up),
        140 => {
            input.press(Key::Grave);
            input.press(Key::Up);
        }
        180 => input.press(Key::Tab),
        _ => {}
    }
    if (100..120).contains(&(tick % 240)) {
        input = input.with_mouse_delta(4.0, -1.0);
    }
    input
}

fn run(scene_dir: &str, ticks: u64) -> HostResult<()> {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    PRISMALS HEADLESS v{}", env!("CARGO_PKG_VERSION"));
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    println!("Loading scene from {scene_dir} ...");
    let scene = SceneLoader::load(scene_dir)?;
    println!("   ✓ {} prototypes", scene.registry.len());
    println!("   ✓ {} worlds, {} instances", scene.level.worlds().len(), scene.level.instance_count());

    let block_size = scene.audio.block_size.max(1);
    let mut game = GameLoop::new(scene, GameLoopOptions::default())?;
    println!("   ✓ {} update steps", game.schedule().update().len());
    println!();

    let mut callback = game.audio_renderer();
    let mut audio_block = vec![0.0_f32; block_size];
    let mut backend = RecordingBackend::new();

    game.initialize();
    for tick in 0..ticks {
        if let Some(callback) = callback.as_mut() {
            callback.fill_block(&mut audio_block);
        }

        backend.clear();
        let stats = game.tick(&scripted_input(tick), TICK_DT, &mut backend)?;

        if tick % 60 == 0 {
            let world = game.level().active_world()?;
            println!(
                "tick {:>5} | world {:<12} | {:>6} instances | {:>5} stars | {} draws | day {:.3}",
                stats.frame,
                world.name,
                stats.render.instances,
                stats.render.stars,
                stats.render.draw_calls,
                game.day_fraction(),
            );
        }
        if game.quit_requested() {
            println!("Escape held at tick {tick}, stopping.");
            break;
        }
    }
    game.shutdown();

    println!();
    game.stats().print_summary();
    Ok(())
}

fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let scene_dir = args.next().unwrap_or_else(|| DEFAULT_SCENE.to_string());
    let ticks = match args.next().map(|t| t.parse::<u64>()) {
        None => DEFAULT_TICKS,
        Some(Ok(t)) => t,
        Some(Err(e)) => {
            eprintln!("✗ invalid tick count: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&scene_dir, ticks) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ FATAL: {e}");
            ExitCode::FAILURE
        }
    }
}
