// Playback session over a native chiptune engine
// Owns the decoder handle, replays persisted settings onto every reload,
// and bridges native 16-bit PCM into a little-endian byte stream

use std::io::Read;
use std::path::Path;

use log::{debug, trace};

use crate::engine::{ChipEngine, Equalizer};
use crate::error::{check, DecodeError};
use crate::track::TrackInfo;

/// Fade-start sentinel meaning "never fade".
const FADE_UNSET_MS: i32 = i32::MAX;

/// Playback settings that survive across source reloads.
///
/// The native engine resets all per-emulator state whenever a new handle is
/// opened, so the session replays these onto every fresh handle.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Stereo echo depth, 0.0 = off, 1.0 = maximum.
    pub stereo_depth: f64,
    /// Playback tempo, 1.0 = normal.
    pub tempo: f64,
    /// Disable end-of-track detection and leading-silence skipping.
    pub ignore_silence: bool,
    /// Use the engine's most accurate emulation.
    pub accuracy: bool,
    /// Time at which fade-out begins; `i32::MAX` = never.
    pub fade_start_ms: i32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stereo_depth: 1.0,
            tempo: 1.0,
            ignore_silence: true,
            accuracy: true,
            fade_start_ms: FADE_UNSET_MS,
        }
    }
}

/// One playback session over a native chiptune engine.
///
/// Holds at most one live decoder handle at a time. Loading a new source
/// releases the previous handle first; dropping the session releases it as
/// well, so the native resource is freed exactly once even if the caller
/// never calls [`release`](Self::release).
///
/// Not internally synchronized: a session belongs to one logical owner and
/// must be driven from a single thread at a time. `read` and `seek` block
/// for however long the engine needs (seeking backwards or far forward can
/// be slow) and cannot be cancelled.
pub struct PlaybackSession<E: ChipEngine> {
    engine: E,
    handle: Option<E::Handle>,
    sample_rate: u32,
    config: SessionConfig,
    equalizer: Option<Equalizer>,
    pending_treble: Option<f64>,
    pending_bass: Option<f64>,
    scratch: Vec<i16>,
}

impl<E: ChipEngine> PlaybackSession<E> {
    /// Create a session decoding at `sample_rate` Hz. The rate is fixed for
    /// the session's lifetime.
    pub fn new(engine: E, sample_rate: u32) -> Self {
        Self {
            engine,
            handle: None,
            sample_rate,
            config: SessionConfig::default(),
            equalizer: None,
            pending_treble: None,
            pending_bass: None,
            scratch: Vec::new(),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether a source is currently loaded.
    pub fn is_loaded(&self) -> bool {
        self.handle.is_some()
    }

    /// Borrow the underlying engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The persisted configuration, as it will be replayed on the next load.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Load a music file from disk.
    ///
    /// Any previously loaded source is released first. On failure the
    /// session is left with no handle but keeps its configuration, so
    /// retrying with a different source is safe.
    pub fn load_path(&mut self, path: &Path) -> Result<(), DecodeError> {
        self.release();
        let handle = self
            .engine
            .open_path(path, self.sample_rate)
            .map_err(DecodeError::OpenFailed)?;
        debug!("opened {} at {} Hz", path.display(), self.sample_rate);
        self.install(handle);
        Ok(())
    }

    /// Load a music file already in memory.
    pub fn load_data(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        self.release();
        let handle = self
            .engine
            .open_data(data, self.sample_rate)
            .map_err(DecodeError::OpenFailed)?;
        debug!("opened {} byte source at {} Hz", data.len(), self.sample_rate);
        self.install(handle);
        Ok(())
    }

    /// Drain a byte stream fully into memory, then load it.
    ///
    /// The buffer is unbounded; do not feed this an endless stream.
    pub fn load_stream<R: Read>(&mut self, mut reader: R) -> Result<(), DecodeError> {
        let mut data = Vec::new();
        reader
            .read_to_end(&mut data)
            .map_err(|e| DecodeError::OpenFailed(e.to_string()))?;
        self.load_data(&data)
    }

    fn install(&mut self, handle: E::Handle) {
        self.handle = Some(handle);
        self.apply_settings();
    }

    /// Replay the persisted configuration onto a freshly opened handle.
    ///
    /// Order matters and matches the engine's own reset-then-apply
    /// sequence: equalizer, stereo depth, ignore-silence, accuracy,
    /// fade-start, equalizer again, tempo. On the first load the equalizer
    /// step fetches the engine's values (merging any treble/bass set before
    /// loading); afterwards the local copy is the source of truth.
    fn apply_settings(&mut self) {
        let Some(handle) = self.handle.as_mut() else {
            return;
        };

        if let Some(eq) = &self.equalizer {
            self.engine.set_equalizer(handle, eq);
        } else {
            let mut eq = self.engine.equalizer(handle);
            if let Some(treble) = self.pending_treble.take() {
                eq.treble = treble;
            }
            if let Some(bass) = self.pending_bass.take() {
                eq.bass = bass;
            }
            self.equalizer = Some(eq);
        }

        self.engine.set_stereo_depth(handle, self.config.stereo_depth);
        self.engine.set_ignore_silence(handle, self.config.ignore_silence);
        self.engine.set_accuracy(handle, self.config.accuracy);
        self.engine.set_fade(handle, self.config.fade_start_ms);
        if let Some(eq) = &self.equalizer {
            self.engine.set_equalizer(handle, eq);
        }
        self.engine.set_tempo(handle, self.config.tempo);
    }

    /// Number of tracks in the loaded source.
    pub fn track_count(&self) -> Result<u32, DecodeError> {
        let handle = self.handle.as_ref().ok_or(DecodeError::NoTrackLoaded)?;
        Ok(self.engine.track_count(handle))
    }

    /// Start a track, where 0 is the first. Resets end-of-track detection
    /// and elapsed time and clears any pending warning.
    pub fn start_track(&mut self, index: u32) -> Result<(), DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        check(self.engine.start_track(handle, index), DecodeError::InvalidTrack)
    }

    /// Metadata for one track. Valid without starting the track.
    pub fn track_info(&self, index: u32) -> Result<TrackInfo, DecodeError> {
        let handle = self.handle.as_ref().ok_or(DecodeError::NoTrackLoaded)?;
        let raw = self
            .engine
            .track_info(handle, index)
            .map_err(DecodeError::InvalidTrack)?;
        Ok(TrackInfo::from_raw(raw))
    }

    /// Name of the game system the loaded file targets.
    pub fn system_name(&self) -> Result<String, DecodeError> {
        let handle = self.handle.as_ref().ok_or(DecodeError::NoTrackLoaded)?;
        Ok(self.engine.system_name(handle))
    }

    /// Likely music format from the first four bytes of a file, or "" if
    /// the header is not recognized. Needs no loaded source.
    pub fn identify_header(&self, header: &[u8]) -> String {
        self.engine.identify_header(header)
    }

    /// Seek to a time in the current track.
    ///
    /// Positions at or past track end are not an error here; the engine
    /// decides. Seeking backwards or far forward can block for a while.
    pub fn seek_ms(&mut self, msec: u32) -> Result<(), DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        check(self.engine.seek(handle, msec), DecodeError::SeekFailed)
    }

    /// Milliseconds played since the beginning of the track.
    pub fn tell_ms(&self) -> Result<u32, DecodeError> {
        let handle = self.handle.as_ref().ok_or(DecodeError::NoTrackLoaded)?;
        Ok(self.engine.tell(handle))
    }

    /// True once the current track has reached its end.
    pub fn track_ended(&self) -> Result<bool, DecodeError> {
        let handle = self.handle.as_ref().ok_or(DecodeError::NoTrackLoaded)?;
        Ok(self.engine.track_ended(handle))
    }

    /// Decode the next chunk of PCM into `out` as interleaved signed 16-bit
    /// little-endian stereo.
    ///
    /// The request is rounded down to whole stereo frames (4 bytes), so a
    /// 10-byte buffer gets 8 bytes. Returns `Ok(None)` once the engine has
    /// reported end of track, without touching the decoder again; otherwise
    /// the number of bytes written. To write at an offset, pass a subslice.
    pub fn read(&mut self, out: &mut [u8]) -> Result<Option<usize>, DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        if self.engine.track_ended(handle) {
            return Ok(None);
        }

        let samples = (out.len() / 4) * 2;
        if samples == 0 {
            return Ok(Some(0));
        }
        // Grow-only scratch buffer, reused across calls.
        if self.scratch.len() < samples {
            self.scratch.resize(samples, 0);
        }
        check(
            self.engine.play(handle, &mut self.scratch[..samples]),
            DecodeError::DecodeFailed,
        )?;

        for (chunk, sample) in out.chunks_exact_mut(2).zip(&self.scratch[..samples]) {
            chunk.copy_from_slice(&sample.to_le_bytes());
        }
        Ok(Some(samples * 2))
    }

    /// Stereo echo depth, 0.0 = off, 1.0 = maximum.
    pub fn stereo_depth(&self) -> f64 {
        self.config.stereo_depth
    }

    pub fn set_stereo_depth(&mut self, depth: f64) {
        self.config.stereo_depth = depth;
        if let Some(handle) = self.handle.as_mut() {
            self.engine.set_stereo_depth(handle, depth);
        }
    }

    /// Playback tempo, 1.0 = normal.
    pub fn tempo(&self) -> f64 {
        self.config.tempo
    }

    pub fn set_tempo(&mut self, tempo: f64) {
        self.config.tempo = tempo;
        if let Some(handle) = self.handle.as_mut() {
            self.engine.set_tempo(handle, tempo);
        }
    }

    pub fn ignore_silence(&self) -> bool {
        self.config.ignore_silence
    }

    pub fn set_ignore_silence(&mut self, ignore: bool) {
        self.config.ignore_silence = ignore;
        if let Some(handle) = self.handle.as_mut() {
            self.engine.set_ignore_silence(handle, ignore);
        }
    }

    pub fn accuracy(&self) -> bool {
        self.config.accuracy
    }

    pub fn set_accuracy(&mut self, enabled: bool) {
        self.config.accuracy = enabled;
        if let Some(handle) = self.handle.as_mut() {
            self.engine.set_accuracy(handle, enabled);
        }
    }

    /// Fade-out start time; `i32::MAX` means never.
    pub fn fade_start_ms(&self) -> i32 {
        self.config.fade_start_ms
    }

    pub fn set_fade_start_ms(&mut self, start_msec: i32) {
        self.config.fade_start_ms = start_msec;
        if let Some(handle) = self.handle.as_mut() {
            self.engine.set_fade(handle, start_msec);
        }
    }

    /// Treble attenuation; `None` until the first load unless set
    /// explicitly.
    pub fn treble(&self) -> Option<f64> {
        self.equalizer.as_ref().map(|eq| eq.treble).or(self.pending_treble)
    }

    /// Equalizer changes always push the whole record, reserved slots
    /// included. Set before the first load, the value is merged into the
    /// equalizer fetched from the engine during the load.
    pub fn set_treble(&mut self, treble: f64) {
        match &mut self.equalizer {
            Some(eq) => eq.treble = treble,
            None => {
                self.pending_treble = Some(treble);
                return;
            }
        }
        self.push_equalizer();
    }

    /// Bass cutoff; `None` until the first load unless set explicitly.
    pub fn bass(&self) -> Option<f64> {
        self.equalizer.as_ref().map(|eq| eq.bass).or(self.pending_bass)
    }

    pub fn set_bass(&mut self, bass: f64) {
        match &mut self.equalizer {
            Some(eq) => eq.bass = bass,
            None => {
                self.pending_bass = Some(bass);
                return;
            }
        }
        self.push_equalizer();
    }

    /// The session's equalizer state, once one exists.
    pub fn equalizer(&self) -> Option<Equalizer> {
        self.equalizer
    }

    fn push_equalizer(&mut self) {
        if let (Some(handle), Some(eq)) = (self.handle.as_mut(), self.equalizer.as_ref()) {
            self.engine.set_equalizer(handle, eq);
        }
    }

    /// Number of voices used by the loaded file.
    pub fn voice_count(&self) -> Result<u32, DecodeError> {
        let handle = self.handle.as_ref().ok_or(DecodeError::NoTrackLoaded)?;
        Ok(self.engine.voice_count(handle))
    }

    /// Names of all voices, in voice order.
    pub fn voice_names(&self) -> Result<Vec<String>, DecodeError> {
        let handle = self.handle.as_ref().ok_or(DecodeError::NoTrackLoaded)?;
        let count = self.engine.voice_count(handle);
        Ok((0..count).map(|i| self.engine.voice_name(handle, i)).collect())
    }

    /// Mute or unmute a single voice.
    pub fn mute_voice(&mut self, index: u32, mute: bool) -> Result<(), DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        self.engine.mute_voice(handle, index, mute);
        Ok(())
    }

    /// Set the muting state of all voices at once; bit i controls voice i,
    /// -1 mutes every voice.
    pub fn mute_voices(&mut self, mask: i32) -> Result<(), DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        self.engine.mute_voices(handle, mask);
        Ok(())
    }

    /// Load an m3u playlist file. A music source must be loaded first.
    pub fn load_playlist_path(&mut self, path: &Path) -> Result<(), DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        check(
            self.engine.load_playlist_path(handle, path),
            DecodeError::PlaylistLoadFailed,
        )
    }

    /// Load an m3u playlist from memory. A music source must be loaded
    /// first.
    pub fn load_playlist_data(&mut self, data: &[u8]) -> Result<(), DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        check(
            self.engine.load_playlist_data(handle, data),
            DecodeError::PlaylistLoadFailed,
        )
    }

    /// Drop any loaded playlist, including playlists intrinsic to the
    /// music format. Idempotent.
    pub fn clear_playlist(&mut self) -> Result<(), DecodeError> {
        let handle = self.handle.as_mut().ok_or(DecodeError::NoTrackLoaded)?;
        self.engine.clear_playlist(handle);
        Ok(())
    }

    /// Fetch and clear the engine's most recent advisory. Warnings never
    /// abort an operation; they accumulate one deep and empty strings are
    /// normalized away.
    pub fn last_warning(&mut self) -> Option<String> {
        let handle = self.handle.as_mut()?;
        self.engine.last_warning(handle).filter(|w| !w.is_empty())
    }

    /// Release the decoder handle, if any. Idempotent; also runs on drop.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            trace!("releasing decoder handle");
            self.engine.close(handle);
        }
    }
}

impl<E: ChipEngine> Drop for PlaybackSession<E> {
    fn drop(&mut self) {
        self.release();
    }
}
