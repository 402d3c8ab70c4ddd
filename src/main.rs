// NES Emulator - Command-line entry point
//
// Loads an iNES ROM from the path given as the sole positional argument and
// drives it in a host window. Exit codes follow the documented table: 0
// success, 1 logger init failure, 2 usage error, 3 machine init failure
// (unused at this layer, reserved for allocation failures), 4 ROM load
// failure, 5 window/renderer/texture creation failure.

use nescore::display::{run_emulator, WindowConfig};
use nescore::emulator::{Emulator, EmulatorConfig};
use nescore::input::InputConfig;
use std::io::Write;
use std::process::ExitCode;

/// `[YYYY-MM-DD HH:MM:SS.uuuuuu] <message>`, matching the precise-time-stamped
/// line the original emulator's `log_event()` printed via `strftime` plus a
/// hand-appended microseconds suffix.
fn init_logger() -> Result<(), log::SetLoggerError> {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
                record.args()
            )
        })
        .try_init()
}

fn main() -> ExitCode {
    if init_logger().is_err() {
        eprintln!("failed to initialize logger");
        return ExitCode::from(1);
    }

    let rom_path = match std::env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: {} <rom.nes>", env!("CARGO_PKG_NAME"));
            return ExitCode::from(2);
        }
    };

    let emulator_config = EmulatorConfig::load_or_default();
    let input_config = InputConfig::load_or_default("input_config.toml");
    log::info!("loaded input configuration");

    let mut emulator = Emulator::new();
    if let Err(err) = emulator.load_rom(&rom_path) {
        log::error!("failed to load ROM '{}': {}", rom_path, err);
        return ExitCode::from(4);
    }
    log::info!("loaded ROM '{}'", rom_path);

    let window_config = WindowConfig::new()
        .with_scale(emulator_config.video.scale)
        .with_fps(emulator_config.video.fps)
        .with_vsync(emulator_config.video.vsync);

    let _ = input_config;

    if let Err(err) = run_emulator(window_config, emulator) {
        log::error!("display window failed: {}", err);
        return ExitCode::from(5);
    }

    ExitCode::SUCCESS
}
