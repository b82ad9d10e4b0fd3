//! Hardware Abstraction Layer (HAL) for the prop audio firmware
//!
//! This crate provides trait-based abstractions for the sound hardware and the
//! shared domain types, enabling development and testing without a board.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: tasks, drivers, entry point)
//!         ↓
//! Sound core (playback crate)    Cooperative kernel (scheduler crate)
//!         ↓
//! Platform HAL (this crate - traits, newtypes, board config)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Contents
//!
//! - [`OutputSink`] - consumer of mixed blocks (I2S/DAC DMA)
//! - [`AmpDriver`] - amplifier power switch
//! - [`DiagnosticSink`] - destination for single-line notices
//! - [`config`] - board configuration resolved at startup
//! - [`audio_types`] - volume, gain and sample-rate newtypes
//!
//! # Features
//!
//! - `std`: Enable mock implementations (for testing)
//! - `defmt`: Route diagnostics to defmt and derive `defmt::Format`
//! - `tracing`: Route diagnostics to tracing (host builds)

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer tracing/defmt over println! in lib code
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)] // accessors; callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod audio;
pub mod audio_config;
pub mod audio_types;
pub mod config;
pub mod diagnostics;
pub mod mocks;
pub mod power;

pub use audio::{OutputSink, SinkStatus};
pub use audio_config::{AudioConfig, Block, BLOCK_SAMPLES, SILENCE};
pub use audio_types::{Gain, OutOfRangeError, SampleRateHz, VolumePercent};
pub use config::{AmpKind, AmplifierTiming, BoardConfig, BoardProfile, ConfigError, SinkKind};
pub use diagnostics::{DiagnosticSink, Level, LogSink, Notice, NullSink};
pub use power::{AmpDriver, PowerState};
