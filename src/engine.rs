// Capability contract for the native emulation engine
// Mirrors the observable surface of a Game Music Emu style library; the
// session never assumes anything about the engine beyond these calls

use std::path::Path;

/// Frequency equalizer parameters.
///
/// Mirrors the native struct: the reserved slots are unused by this crate
/// but belong to the engine, so the record is always read and written as a
/// whole. Partial writes would clobber reserved state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Equalizer {
    /// Treble attenuation in dB; typically -50.0 (muffled) to 0.0 (flat).
    pub treble: f64,
    /// Bass cutoff frequency; lower values mean more bass.
    pub bass: f64,
    /// Reserved by the engine, carried verbatim through read/write cycles.
    pub reserved: [f64; 8],
}

/// Raw track information in the engine's own field order.
///
/// Times are in milliseconds with -1 meaning "not specified by the file".
/// The reserved slots exist for forward compatibility with the native
/// layout and must be kept in read order even though unused here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTrackInfo {
    /// Total length, if the file specifies it.
    pub length: i32,
    /// Length of the song up to the looping section.
    pub intro_length: i32,
    /// Length of the looping section.
    pub loop_length: i32,
    /// Play length as reported by the engine; the session derives its own
    /// (see `TrackInfo`).
    pub play_length: i32,
    pub reserved_ints: [i32; 12],
    pub system: String,
    pub game: String,
    pub song: String,
    pub author: String,
    pub copyright: String,
    pub comment: String,
    pub dumper: String,
    pub reserved_strings: [String; 9],
}

/// Minimal contract a native chiptune engine must provide.
///
/// Fallible operations return the engine's raw diagnostic in `Err`; by
/// engine convention an empty string also means success (the session's
/// error mapper normalizes that case).
///
/// A `Handle` is an opaque token for one loaded source. It must only be
/// used with the engine that produced it, and never after `close`.
pub trait ChipEngine {
    type Handle;

    /// Open a music file from disk at the given output sample rate.
    fn open_path(&mut self, path: &Path, sample_rate: u32) -> Result<Self::Handle, String>;

    /// Open a music file already in memory. The engine copies the data.
    fn open_data(&mut self, data: &[u8], sample_rate: u32) -> Result<Self::Handle, String>;

    /// Release a handle and every native resource behind it.
    fn close(&mut self, handle: Self::Handle);

    /// Number of tracks in the loaded source.
    fn track_count(&self, handle: &Self::Handle) -> u32;

    /// Start a track, where 0 is the first. Resets end-of-track detection
    /// and elapsed time, and clears any pending warning.
    fn start_track(&mut self, handle: &mut Self::Handle, index: u32) -> Result<(), String>;

    /// Fetch information for one track. The native info struct is freed by
    /// the implementation immediately after the copy-out; only the owned
    /// record crosses this boundary.
    fn track_info(&self, handle: &Self::Handle, index: u32) -> Result<RawTrackInfo, String>;

    /// Generate `out.len()` signed 16-bit samples, interleaved stereo.
    fn play(&mut self, handle: &mut Self::Handle, out: &mut [i16]) -> Result<(), String>;

    /// Seek to a time in the current track. Seeking backwards or far
    /// forward can take a while.
    fn seek(&mut self, handle: &mut Self::Handle, msec: u32) -> Result<(), String>;

    /// Milliseconds played since the beginning of the track.
    fn tell(&self, handle: &Self::Handle) -> u32;

    /// True once the track has reached its end (after any fade).
    fn track_ended(&self, handle: &Self::Handle) -> bool;

    /// Number of voices used by the loaded file.
    fn voice_count(&self, handle: &Self::Handle) -> u32;

    /// Name of voice `index`, from 0 to `voice_count() - 1`.
    fn voice_name(&self, handle: &Self::Handle, index: u32) -> String;

    /// Mute or unmute a single voice.
    fn mute_voice(&mut self, handle: &mut Self::Handle, index: u32, mute: bool);

    /// Set the muting state of all voices at once; bit i controls voice i,
    /// -1 mutes everything, 0 unmutes everything.
    fn mute_voices(&mut self, handle: &mut Self::Handle, mask: i32);

    /// Current equalizer parameters, reserved slots included.
    fn equalizer(&self, handle: &Self::Handle) -> Equalizer;

    /// Replace the equalizer parameters wholesale.
    fn set_equalizer(&mut self, handle: &mut Self::Handle, eq: &Equalizer);

    /// Stereo echo depth, 0.0 = off, 1.0 = maximum. No effect on formats
    /// without it.
    fn set_stereo_depth(&mut self, handle: &mut Self::Handle, depth: f64);

    /// Disable automatic end-of-track detection and leading-silence
    /// skipping when `ignore` is true.
    fn set_ignore_silence(&mut self, handle: &mut Self::Handle, ignore: bool);

    /// Enable the engine's most accurate (and most expensive) emulation.
    fn set_accuracy(&mut self, handle: &mut Self::Handle, enabled: bool);

    /// Time at which the track starts fading out; once the fade completes
    /// `track_ended` reports true. Can be changed mid-track.
    fn set_fade(&mut self, handle: &mut Self::Handle, start_msec: i32);

    /// Playback tempo, 1.0 = normal, 0.5 = half speed, 2.0 = double.
    fn set_tempo(&mut self, handle: &mut Self::Handle, tempo: f64);

    /// Load an m3u playlist file. Requires music to be loaded first.
    fn load_playlist_path(&mut self, handle: &mut Self::Handle, path: &Path) -> Result<(), String>;

    /// Load an m3u playlist from memory. Requires music to be loaded first.
    fn load_playlist_data(&mut self, handle: &mut Self::Handle, data: &[u8]) -> Result<(), String>;

    /// Drop any loaded playlist, including playlists intrinsic to the
    /// music format (NSFE for example).
    fn clear_playlist(&mut self, handle: &mut Self::Handle);

    /// Most recent advisory from the engine, cleared by the fetch. Also
    /// cleared when loading a file or starting a track.
    fn last_warning(&mut self, handle: &mut Self::Handle) -> Option<String>;

    /// Name of the game system the loaded file targets.
    fn system_name(&self, handle: &Self::Handle) -> String;

    /// Likely music format from the first four bytes of a file: the
    /// canonical suffix ("NSF", "SPC", ...) or "" if unrecognized.
    fn identify_header(&self, header: &[u8]) -> String;
}
