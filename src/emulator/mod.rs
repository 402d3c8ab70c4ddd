// Emulator module - Master-clock scheduler and top-level coordinator
//
// This module owns the CPU and Bus and advances them at the NES's actual
// clock ratios: the PPU runs at 4 master ticks per dot, the CPU at 12, the
// APU at 24. A frame is 341 dots * 262 scanlines * 4 master ticks.

mod config;

pub use config::{EmulatorConfig, SpeedMode};

use crate::bus::Bus;
use crate::cartridge::{Cartridge, INesError};
use crate::cpu::Cpu;
use crate::input::Controller;
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of master clock ticks that make up one NTSC frame
/// (341 dots * 262 scanlines * 4 master ticks per dot).
pub const MASTER_TICKS_PER_FRAME: u32 = 341 * 262 * 4;

/// Errors that can occur while bringing up or operating the machine.
#[derive(Debug)]
pub enum EmulatorError {
    /// The ROM file could not be parsed or its mapper is unsupported.
    RomLoad(INesError),
    /// The mapper factory rejected the cartridge's mapper id.
    Mapper(crate::cartridge::MapperError),
}

impl fmt::Display for EmulatorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmulatorError::RomLoad(e) => write!(f, "failed to load ROM: {e}"),
            EmulatorError::Mapper(e) => write!(f, "failed to construct mapper: {e}"),
        }
    }
}

impl std::error::Error for EmulatorError {}

impl From<INesError> for EmulatorError {
    fn from(e: INesError) -> Self {
        EmulatorError::RomLoad(e)
    }
}

impl From<crate::cartridge::MapperError> for EmulatorError {
    fn from(e: crate::cartridge::MapperError) -> Self {
        EmulatorError::Mapper(e)
    }
}

/// Master-clock scheduler coordinating CPU, PPU, APU and the cartridge.
///
/// Owns `Cpu` and `Bus` directly (the Bus in turn owns PPU/APU/mapper/RAM);
/// no component holds a reference back to the `Emulator`, so `run_frame`
/// borrows each piece only for the duration of its own step call.
pub struct Emulator {
    cpu: Cpu,
    bus: Bus,
    config: EmulatorConfig,
    rom_path: Option<PathBuf>,
    paused: bool,
    speed_mode: SpeedMode,
}

impl Emulator {
    /// Create a new emulator instance, powered on with no cartridge loaded.
    pub fn new() -> Self {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        cpu.reset(&mut bus);
        Emulator {
            cpu,
            bus,
            config: EmulatorConfig::load_or_default(),
            rom_path: None,
            paused: false,
            speed_mode: SpeedMode::Normal,
        }
    }

    /// Load a ROM file, wire its mapper into the bus, and reset.
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), EmulatorError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_ines_file(path)?;
        self.bus.load_cartridge(cartridge)?;
        self.rom_path = Some(path.to_path_buf());
        self.reset();
        Ok(())
    }

    /// Reset all components to their power-on state, as if pressing the
    /// reset button.
    pub fn reset(&mut self) {
        self.cpu.reset(&mut self.bus);
        self.paused = false;
    }

    /// Run master clock ticks until one full frame has been presented,
    /// dispatching CPU every 12 ticks, PPU every 4, APU every 24 (the
    /// hardware's real clock divisors off a shared master oscillator).
    /// Each CPU dispatch advances `Cpu` by exactly one clock cycle (see
    /// `Cpu::step`/`wait_cycles`), so instructions span as many dispatches
    /// as their real cycle cost rather than always costing one dispatch.
    ///
    /// Returns a reference to the framebuffer once the frame completes.
    pub fn run_frame(&mut self) -> &[u8] {
        let mut ticks = 0u32;
        while ticks < MASTER_TICKS_PER_FRAME {
            if ticks % 4 == 0 {
                self.ppu_step();
            }
            if ticks % 12 == 0 {
                self.cpu_step();
            }
            if ticks % 24 == 0 {
                self.bus.apu().borrow_mut().clock();
            }
            ticks += 1;
        }
        self.bus.ppu().borrow().frame()
    }

    fn cpu_step(&mut self) {
        self.cpu.step(&mut self.bus);
        // Only service NMI once the current instruction's wait cycles have
        // fully drained, i.e. right before the CPU would otherwise fetch
        // its next instruction, matching real 6502 interrupt polling.
        if self.cpu.wait_cycles == 0 && self.bus.ppu().borrow().nmi_pending() {
            self.bus.ppu().borrow_mut().clear_nmi();
            self.cpu.nmi(&mut self.bus);
        }
    }

    fn ppu_step(&mut self) {
        self.bus.ppu().borrow_mut().step();
    }

    /// Set speed mode (normal, fast-forward, slow motion, paused).
    pub fn set_speed_mode(&mut self, mode: SpeedMode) {
        self.speed_mode = mode;
    }

    /// Get current speed mode.
    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// Pause the emulator.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Resume the emulator.
    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Toggle pause state.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    /// Check if the emulator is paused.
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feed the current controller 1 button state into the bus.
    pub fn set_controller1(&mut self, controller: Controller) {
        self.bus.set_controller1(controller);
    }

    /// Feed the current controller 2 button state into the bus.
    pub fn set_controller2(&mut self, controller: Controller) {
        self.bus.set_controller2(controller);
    }

    /// Dump the CPU-visible 64 KiB address space to `path`, zero-extending
    /// past the bus's 2 KiB RAM mirror (see DESIGN.md's RAM sizing note).
    pub fn dump_ram(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let mut image = vec![0u8; 0x10000];
        for (addr, byte) in image.iter_mut().enumerate() {
            *byte = self.bus.read(addr as u16);
        }
        std::fs::write(path, image)
    }

    /// Dump the PPU's 16 KiB address space (nametables, palette RAM,
    /// pattern tables reached through the mapper) to `path`.
    pub fn dump_vram(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let image = self.bus.ppu().borrow().dump_address_space();
        std::fs::write(path, image)
    }

    /// Get reference to CPU.
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Get mutable reference to CPU.
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// Get reference to Bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Get mutable reference to Bus.
    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    /// Get reference to configuration.
    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    /// Get mutable reference to configuration.
    pub fn config_mut(&mut self) -> &mut EmulatorConfig {
        &mut self.config
    }

    /// Get the currently loaded ROM path.
    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
