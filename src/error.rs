// Typed failure model for the session layer
// The native engine reports problems as nullable strings; fatal ones are
// mapped here, the advisory warning channel stays separate

use thiserror::Error;

/// Errors surfaced by a playback session.
///
/// Message-carrying variants keep the native diagnostic verbatim so nothing
/// the engine reported is lost on the way up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Opening a file or in-memory blob failed; the session holds no handle.
    #[error("failed to open source: {0}")]
    OpenFailed(String),

    /// Track index rejected by the engine.
    #[error("invalid track: {0}")]
    InvalidTrack(String),

    /// The engine failed while generating samples.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// Seeking to the requested position failed.
    #[error("seek failed: {0}")]
    SeekFailed(String),

    /// Playlist file was rejected by the engine.
    #[error("failed to load playlist: {0}")]
    PlaylistLoadFailed(String),

    /// Playback operation attempted before any source was loaded.
    #[error("no track loaded")]
    NoTrackLoaded,
}

/// Map a raw native diagnostic to a typed error.
///
/// Engine convention: an absent or empty diagnostic means success, so an
/// empty `Err` string is success as well, never an error.
pub(crate) fn check(
    result: Result<(), String>,
    kind: fn(String) -> DecodeError,
) -> Result<(), DecodeError> {
    match result {
        Ok(()) => Ok(()),
        Err(msg) if msg.is_empty() => Ok(()),
        Err(msg) => Err(kind(msg)),
    }
}
