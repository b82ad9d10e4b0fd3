//! Audio output hardware: amplifier switches and the block sink.
//!
//! Vertically sliced: one sub-module per hardware component.
//!
//! # Structure
//!
//! - `amp/`: amplifier power switches (`ShutdownPinAmp` GPIO, `CodecAmp`
//!   I2C codec, `BoardAmp` dispatch by [`platform::AmpKind`])
//! - `sink`: output sinks and the per-tick render step
//!
//! # Dependency Injection
//!
//! Tasks target the [`platform::AmpDriver`] and [`platform::OutputSink`]
//! traits. Concrete types are chosen once at boot from the board
//! configuration:
//!
//! ```rust,ignore
//! let amp = BoardAmp::for_board(board.amp, Some(shutdown_pin), None::<Unfitted>)?;
//! let mut task = Amplifier::new(amp, board.amp_timing);
//! ```

pub mod amp;
pub mod sink;

pub use amp::codec::CodecAmp;
pub use amp::gpio::ShutdownPinAmp;
pub use amp::{BoardAmp, BoardAmpError, Unfitted};
pub use sink::{render_into, NullOutput};
