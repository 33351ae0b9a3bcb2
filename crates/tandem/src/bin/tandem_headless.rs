//! # TANDEM Headless
//!
//! Runs the showcase for a fixed number of ticks against the recording
//! backend and prints what the render thread did.
//!
//! ```bash
//! # 120 ticks with the default config
//! ./tandem_headless
//!
//! # 1000 ticks with a custom config
//! TANDEM_CONFIG_PATH=my_config.toml ./tandem_headless 1000
//! ```

use tandem::rendering::{EventLog, RecordingBackend};
use tandem::{Game, GameConfig, NoInput};

/// Ticks to run when no count is given.
const DEFAULT_TICKS: u64 = 120;

fn main() {
    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    TANDEM HEADLESS v{}", env!("CARGO_PKG_VERSION"));
    println!("═══════════════════════════════════════════════════════════════════");

    let ticks = match std::env::args().nth(1).map(|arg| arg.parse::<u64>()) {
        None => DEFAULT_TICKS,
        // The loop always finishes the tick it is on, so zero cannot be honored
        Some(Ok(0)) => {
            eprintln!("   ✗ Invalid tick count: must be at least 1");
            std::process::exit(2);
        }
        Some(Ok(ticks)) => ticks,
        Some(Err(e)) => {
            eprintln!("   ✗ Invalid tick count: {e}");
            std::process::exit(2);
        }
    };

    let config = match GameConfig::load_or_default() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            std::process::exit(1);
        }
    };
    println!("  Config:           {}", GameConfig::resolve_path().display());
    println!("  Frames in flight: {}", config.render.frames_in_flight);
    println!("  Ticks:            {ticks}");
    println!();

    let log = EventLog::new();
    let backend = RecordingBackend::new(log.clone()).quiet_uploads();
    let mut game = match Game::new(config, backend, NoInput) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            std::process::exit(1);
        }
    };

    let mut remaining = ticks;
    game.run(|| {
        remaining = remaining.saturating_sub(1);
        remaining > 0
    });

    let positions: Vec<_> = game.objects().iter().map(|(id, object)| (id, object.position())).collect();
    let stats = match game.shutdown() {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            std::process::exit(1);
        }
    };

    println!("📊 Render thread");
    println!("   Commands applied:  {}", stats.commands_applied);
    println!("   Frames consumed:   {}", stats.frames_consumed);
    println!("   Frames drawn:      {}", stats.frames_drawn);
    println!("   Frames coalesced:  {}", stats.frames_coalesced());
    println!("   Draw calls:        {}", stats.draw_calls);
    println!("   Objects created:   {}", stats.objects_created);
    println!("   Objects destroyed: {}", stats.objects_destroyed);
    println!("   Released on exit:  {}", stats.objects_released_at_shutdown);
    println!("   Backend events:    {}", log.len());
    println!();

    println!("📍 Final positions");
    for (id, position) in positions {
        println!("   {:?}: ({:.3}, {:.3}, {:.3})", id, position.x, position.y, position.z);
    }
}
