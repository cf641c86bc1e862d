// gme-session - playback sessions over a native chiptune emulation engine
//
// The engine itself (synthesis, decoding, file parsing) lives behind the
// `ChipEngine` trait; this crate owns the session lifecycle around it:
// handle ownership, settings replay across reloads, and the bridge from
// native 16-bit PCM to a little-endian byte stream.
//
// A `PlaybackSession` is not internally synchronized. It belongs to one
// logical owner at a time; drive it from a single thread.

pub mod engine;
pub mod error;
pub mod session;
pub mod track;

pub use engine::{ChipEngine, Equalizer, RawTrackInfo};
pub use error::DecodeError;
pub use session::{PlaybackSession, SessionConfig};
pub use track::TrackInfo;
