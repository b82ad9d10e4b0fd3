//! The sound-source capability the mixer pulls from.

use platform::Block;

/// Identity of a mixer source: an index into the [`SourceBank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SourceId(u8);

impl SourceId {
    /// Raw value reserved for "no source" in a mixer lane.
    pub(crate) const EMPTY_RAW: u8 = u8::MAX;

    /// Wrap an index. Returns `None` for the reserved value `u8::MAX`.
    pub const fn new(index: u8) -> Option<Self> {
        if index == Self::EMPTY_RAW {
            None
        } else {
            Some(Self(index))
        }
    }

    /// Index into the source bank.
    pub const fn index(self) -> u8 {
        self.0
    }

    pub(crate) const fn raw(self) -> u8 {
        self.0
    }
}

/// Something that produces blocks of samples on demand.
///
/// Both methods take `&self`: the mixer calls them from the real-time
/// interrupt through shared references while the scheduler side holds its
/// own. Implementations keep their mutable state behind interrupt-safe
/// interior mutability.
pub trait Stream {
    /// `true` while the stream has sound to produce.
    fn is_playing(&self) -> bool;

    /// Write the next block into `out`.
    ///
    /// Every sample of `out` is overwritten. Returns `false` (with `out`
    /// silent) when the stream had nothing to play. Must not block.
    fn render(&self, out: &mut Block) -> bool;
}

/// Resolves [`SourceId`]s to streams for the mixer.
pub trait SourceBank {
    /// The stream behind `id`, if any.
    fn source(&self, id: SourceId) -> Option<&dyn Stream>;
}

/// Identifies which effect a clip belongs to (font-level sound category).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EffectId(pub u16);

/// A mono PCM clip at the output sample rate, stored in flash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    /// Effect the clip is a variant of.
    pub effect: EffectId,
    /// Samples.
    pub pcm: &'static [i16],
}

impl Clip {
    /// New clip.
    pub const fn new(effect: EffectId, pcm: &'static [i16]) -> Self {
        Self { effect, pcm }
    }
}
