//! Prop Audio Firmware
//!
//! Application layer of the prop sound board: the cooperative tasks that run
//! on top of the sound core, the board drivers they switch, and the entry
//! points that wire everything together.
//!
//! # Architecture
//!
//! ```text
//! main.rs / host_sim ── boot ──► Context { clock, SoundSystem, diagnostics, AmpLatch }
//!                                    │
//!          Scheduler ── step ──► Amplifier<BoardAmp>   TrackPlayer   ...
//!                                    │
//!          console ── "amp on" ──► dispatch_command
//!
//! mixer interrupt ── SoundSystem::tick_into ──► OutputSink
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for STM32H7 target (embassy, defmt)
//! - `emulator` - Build the desktop host simulator (tokio, tracing)
//! - `std` - Enable mock drivers (for emulator and testing)
//!
//! # Examples
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```
//!
//! ## Host Simulator
//!
//! ```bash
//! cargo run --example host_sim --features emulator
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
// Upgrade relevant warns to deny; keep pedantic as warn (too noisy for firmware)
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Critical correctness: deny these
#![deny(clippy::await_holding_lock)] // holding a blocking Mutex across .await is a bug
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
// Logging discipline (allow println in tests via clippy.toml)
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)] // common in Rust crates; not a real issue
#![allow(clippy::missing_errors_doc)] // most errors are self-explanatory
// Pedantic lints too noisy for firmware application code:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::similar_names)]

pub mod amplifier;
pub mod audio;
pub mod boot;
pub mod console;
pub mod context;
pub mod track_player;

// Re-export key types
pub use amplifier::Amplifier;
pub use audio::{BoardAmp, BoardAmpError, CodecAmp, NullOutput, ShutdownPinAmp};
pub use console::{CommandLine, CommandQueue};
pub use context::{AmpLatch, Context};
pub use track_player::{TrackPlayer, TRACKS};
