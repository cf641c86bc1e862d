// Immutable per-track metadata snapshot
// Built once from the engine's raw record; independent of session state

use serde::{Deserialize, Serialize};

use crate::engine::RawTrackInfo;

/// Fallback play length when the file carries no timing at all: 2.5 minutes.
const DEFAULT_PLAY_LENGTH_MS: i32 = 150_000;

/// Timing and descriptive metadata for one track.
///
/// Times are in milliseconds; -1 means the file did not specify the value.
/// `play_length_ms` is derived and always positive: the total length when
/// the file gives one, otherwise intro plus two loops, otherwise a fixed
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub length_ms: i32,
    pub intro_length_ms: i32,
    pub loop_length_ms: i32,
    pub play_length_ms: i32,
    pub system: String,
    pub game: String,
    pub song: String,
    pub author: String,
    pub copyright: String,
    pub comment: String,
    pub dumper: String,
}

impl TrackInfo {
    pub(crate) fn from_raw(raw: RawTrackInfo) -> Self {
        Self {
            play_length_ms: derive_play_length(raw.length, raw.intro_length, raw.loop_length),
            length_ms: raw.length,
            intro_length_ms: raw.intro_length,
            loop_length_ms: raw.loop_length,
            system: raw.system,
            game: raw.game,
            song: raw.song,
            author: raw.author,
            copyright: raw.copyright,
            comment: raw.comment,
            dumper: raw.dumper,
        }
    }
}

fn derive_play_length(length: i32, intro: i32, loop_len: i32) -> i32 {
    if length > 0 {
        length
    } else if intro >= 0 && loop_len > 0 {
        intro + 2 * loop_len
    } else {
        DEFAULT_PLAY_LENGTH_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(length: i32, intro: i32, loop_len: i32) -> RawTrackInfo {
        RawTrackInfo {
            length,
            intro_length: intro,
            loop_length: loop_len,
            ..RawTrackInfo::default()
        }
    }

    #[test]
    fn test_play_length_from_intro_and_loop() {
        let info = TrackInfo::from_raw(raw(-1, 1000, 2000));
        assert_eq!(info.play_length_ms, 5000);
    }

    #[test]
    fn test_play_length_default_when_nothing_known() {
        let info = TrackInfo::from_raw(raw(-1, -1, -1));
        assert_eq!(info.play_length_ms, 150_000);
    }

    #[test]
    fn test_play_length_prefers_total_length() {
        let info = TrackInfo::from_raw(raw(4321, 1000, 2000));
        assert_eq!(info.play_length_ms, 4321);
        let info = TrackInfo::from_raw(raw(4321, -1, -1));
        assert_eq!(info.play_length_ms, 4321);
    }

    #[test]
    fn test_play_length_default_when_loop_missing() {
        let info = TrackInfo::from_raw(raw(-1, 1000, -1));
        assert_eq!(info.play_length_ms, 150_000);
    }

    #[test]
    fn test_descriptive_fields_copied() {
        let mut r = raw(60_000, -1, -1);
        r.system = "Famicom".to_string();
        r.game = "Some Game".to_string();
        r.song = "Stage 1".to_string();
        r.author = "Composer".to_string();

        let info = TrackInfo::from_raw(r);
        assert_eq!(info.system, "Famicom");
        assert_eq!(info.game, "Some Game");
        assert_eq!(info.song, "Stage 1");
        assert_eq!(info.author, "Composer");
        assert_eq!(info.copyright, "");
    }
}
