// Native player state as reported by the playback library

/// Player state, in the native library's ordering.
///
/// The adapter never drives these transitions itself; it only reads them
/// back from the native player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(i32)]
pub enum PlayerState {
    /// Nothing loaded yet
    #[default]
    NothingSpecial = 0,
    /// Media is being opened
    Opening = 1,
    /// Media is buffering
    Buffering = 2,
    /// Media is currently playing
    Playing = 3,
    /// Playback is paused
    Paused = 4,
    /// Playback has been stopped
    Stopped = 5,
    /// End of media reached
    Ended = 6,
    /// Player encountered an error
    Error = 7,
}

impl PlayerState {
    /// Convert a raw native state value.
    /// Unknown values map to `Error` so they never count as ready.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            0 => PlayerState::NothingSpecial,
            1 => PlayerState::Opening,
            2 => PlayerState::Buffering,
            3 => PlayerState::Playing,
            4 => PlayerState::Paused,
            5 => PlayerState::Stopped,
            6 => PlayerState::Ended,
            _ => {
                log::debug!("Unknown native player state {}", raw);
                PlayerState::Error
            }
        }
    }

    /// Ready means playback has started and has not hit a terminal error:
    /// `Playing <= state < Error`.
    pub fn is_ready(self) -> bool {
        self >= PlayerState::Playing && self < PlayerState::Error
    }
}
