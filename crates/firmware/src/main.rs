//! Prop Audio Firmware - Main Entry Point
//!
//! Hardware-only entry point for STM32H743ZI.
//!
//! Two execution contexts:
//! - thread mode: the cooperative scheduler (amplifier, track player),
//!   one pass per executor poll, yielding in between
//! - `UART4` interrupt (borrowed as a software interrupt): the mixer ticker,
//!   one block per output period at a higher priority

#![no_std]
#![no_main]

use embassy_executor::{InterruptExecutor, Spawner};
use embassy_stm32::gpio::{AnyPin, Level, Output, Speed};
use embassy_stm32::interrupt;
use embassy_stm32::interrupt::{InterruptExt, Priority};
use embassy_stm32::peripherals::IWDG1;
use embassy_stm32::wdg::IndependentWatchdog;
use embassy_time::{Duration, Ticker};
use static_cell::StaticCell;

use firmware::audio::{render_into, BoardAmp, NullOutput, Unfitted};
use firmware::boot::{self, BootError};
use firmware::{console, AmpLatch, Amplifier, CommandQueue, Context, TrackPlayer};
use platform::{AudioConfig, BoardConfig, BoardProfile, LogSink, OutputSink, SILENCE};
use playback::SoundSystem;
use scheduler::SystemClock;

// Logging transport and panic handler
use {defmt_rtt as _, panic_probe as _};

static SOUND: StaticCell<SoundSystem> = StaticCell::new();
static AMP_LATCH: AmpLatch = AmpLatch::new();
static COMMANDS: CommandQueue = CommandQueue::new();
static MIXER_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn UART4() {
    // SAFETY: UART4 is not enabled as a peripheral on this board; its vector
    // only ever fires when the mixer executor pends it.
    unsafe { MIXER_EXECUTOR.on_interrupt() }
}

/// Mix one block per output period and hand it to the sink.
#[embassy_executor::task]
async fn mixer_task(sound: &'static SoundSystem, audio: AudioConfig) {
    // I2S/DAC DMA sinks are board bring-up work; the null sink keeps the
    // mixer timing and level metering live until then.
    let mut sink = NullOutput::new();
    if sink.start(audio).is_err() {
        defmt::error!("output sink failed to start");
    }
    let mut block = SILENCE;
    let mut ticker = Ticker::every(Duration::from_micros(u64::from(audio.tick_period_us())));
    loop {
        ticker.next().await;
        render_into(sound, &mut sink, &mut block);
    }
}

/// Cooperative scheduler: console commands, then one pass over every task.
#[embassy_executor::task]
async fn scheduler_task(
    sound: &'static SoundSystem,
    board: BoardConfig,
    shutdown_pin: Output<'static, AnyPin>,
    mut watchdog: IndependentWatchdog<'static, IWDG1>,
) {
    if let Err(e) = run_scheduler(sound, board, shutdown_pin, &mut watchdog).await {
        defmt::error!("scheduler failed to start: {}", e);
    }
}

async fn run_scheduler(
    sound: &'static SoundSystem,
    board: BoardConfig,
    shutdown_pin: Output<'static, AnyPin>,
    watchdog: &mut IndependentWatchdog<'static, IWDG1>,
) -> Result<(), BootError> {
    let clock = SystemClock;
    let diag = LogSink;

    let amp_switch = match BoardAmp::<_, Unfitted>::for_board(board.amp, Some(shutdown_pin), None)
    {
        Ok(amp) => amp,
        Err(e) => {
            defmt::error!("amplifier switch unavailable: {}", defmt::Debug2Format(&e));
            BoardAmp::Detached { enabled: false }
        }
    };
    let mut amplifier = Amplifier::new(amp_switch, board.amp_timing);
    let mut track_player = TrackPlayer::new();
    let mut scheduler = boot::register_tasks(&mut amplifier, &mut track_player)?;
    let mut cx = Context::new(&clock, sound, &diag, &AMP_LATCH);

    defmt::info!("scheduler running {=usize} tasks", scheduler.len());
    scheduler.setup_all(&mut cx);
    loop {
        console::drain(&COMMANDS, &mut scheduler, &mut cx);
        scheduler.run_pass(&mut cx);
        watchdog.pet();
        embassy_futures::yield_now().await;
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    defmt::info!("{=str} v{=str}", platform::config::APP_NAME, platform::config::APP_VERSION);

    let board = match boot::resolve_board(BoardProfile::Standard) {
        Ok(board) => board,
        Err(e) => {
            defmt::error!("{}", e);
            return;
        }
    };
    defmt::info!(
        "board {}: {=usize} players, {} amp, {} sink",
        board.profile,
        board.players,
        board.amp,
        board.sink
    );

    let p = embassy_stm32::init(boot::build_embassy_config());

    let mut watchdog = IndependentWatchdog::new(p.IWDG1, boot::WATCHDOG_TIMEOUT_US);
    watchdog.unleash(); // cannot be stopped after this point

    let sound: &'static SoundSystem = SOUND.init(SoundSystem::new(&board));
    boot::init_sound(sound, &LogSink);

    // Amplifier SHUTDOWN: PB2, low = amplifier off.
    let shutdown_pin = Output::new(p.PB2, Level::Low, Speed::Low).degrade();

    // Mixer runs above thread mode so a long scheduler pass cannot starve it.
    interrupt::UART4.set_priority(Priority::P6);
    let mixer_spawner = MIXER_EXECUTOR.start(interrupt::UART4);
    if mixer_spawner.spawn(mixer_task(sound, board.audio)).is_err() {
        defmt::error!("mixer task already running");
    }

    if spawner
        .spawn(scheduler_task(sound, board, shutdown_pin, watchdog))
        .is_err()
    {
        defmt::error!("scheduler task already running");
    }
}
