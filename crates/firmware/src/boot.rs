//! Boot sequence for the prop sound board.
//!
//! Initialization order (order matters for correctness):
//!   1. Resolve and validate the board configuration
//!   2. Build the sound system in static memory
//!   3. Reinitialize it (empty source table, generators bound)
//!   4. Construct the amplifier switch for the board (starts powered down)
//!   5. Register tasks with the scheduler
//!   6. Start the mixer ticker on the high-priority executor
//!   7. Enter the scheduler loop on the thread-mode executor
//!
//! Everything except the Embassy clock setup is plain data and host-testable;
//! the host simulator runs the same steps with a tokio runtime.

use platform::{BoardConfig, BoardProfile, ConfigError, DiagnosticSink};
use playback::SoundSystem;
use scheduler::{RegistryError, Scheduler, Task};

use crate::context::Context;

/// Ordered list of boot sequence steps for documentation and testing.
///
/// # Correctness Invariants
///
/// - The source table must be reinitialized before the mixer ticker starts;
///   the ticker only ever reads lanes the scheduler has bound.
/// - The amplifier switch is constructed powered down, so nothing is heard
///   before the amplifier task decides otherwise.
/// - Tasks are registered before the first pass; the registry never changes
///   shape afterwards.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. Board config: resolve profile, validate player count and amp timing",
    "2. Sound system: place pool, mixer and generators in static memory",
    "3. Reinitialize: empty source table, bind tone and speech lanes",
    "4. Amplifier: construct board switch in the powered-down state",
    "5. Scheduler: register amplifier and track-player tasks",
    "6. Mixer ticker: start on the interrupt executor, one block per period",
    "7. Scheduler loop: drain console, run pass, yield",
];

/// Maximum tasks in the registry.
pub const MAX_TASKS: usize = 4;

/// Watchdog timeout. The scheduler loop pets it once per pass.
pub const WATCHDOG_TIMEOUT_US: u32 = 2_000_000;

/// Failures that stop the board from booting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// The board configuration is inconsistent.
    #[error("board configuration: {0}")]
    Config(#[from] ConfigError),
    /// Task registration failed.
    #[error("task registry: {0}")]
    Registry(#[from] RegistryError),
}

/// Configuration for `profile`, validated.
pub fn resolve_board(profile: BoardProfile) -> Result<BoardConfig, BootError> {
    let board = BoardConfig::for_profile(profile);
    board.validate()?;
    Ok(board)
}

/// Bring a freshly built sound system into its running state.
pub fn init_sound(sound: &SoundSystem, diag: &(impl DiagnosticSink + ?Sized)) {
    sound.reinitialize(diag);
}

/// Register the board's tasks in run order: amplifier first, so a power-up
/// requested during one pass is honoured at the start of the next.
pub fn register_tasks<'t, 'a>(
    amplifier: &'t mut dyn Task<Context<'a>>,
    track_player: &'t mut dyn Task<Context<'a>>,
) -> Result<Scheduler<'t, Context<'a>, MAX_TASKS>, BootError> {
    Ok(Scheduler::builder()
        .register(amplifier)?
        .register(track_player)?
        .build())
}

/// Clock tree for the STM32H743: HSI → PLL1 → 400 MHz system clock.
///
/// The audio path needs no dedicated PLL: output runs off the mixer ticker
/// and the sink's own peripheral clock.
#[cfg(feature = "hardware")]
pub fn build_embassy_config() -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;

    let mut config = embassy_stm32::Config::default();

    // ── Oscillators ─────────────────────────────────────────────────────────
    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    config.rcc.csi = true;

    // ── PLL1: system clock ──────────────────────────────────────────────────
    // HSI (64 MHz) / prediv(4) = 16 MHz → × mul(50) = 800 MHz VCO
    // PLL1_P = VCO / divp(2) = 400 MHz  → system clock
    config.rcc.pll1 = Some(Pll {
        source: PllSource::HSI,
        prediv: PllPreDiv::DIV4,
        mul: PllMul::MUL50,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });

    // ── System clock + bus prescalers ────────────────────────────────────────
    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}
