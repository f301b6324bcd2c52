// Core types and traits for the vlcmedia player adapter

pub mod callback;
pub mod error;
pub mod player;
pub mod state;
pub mod ticker;

// Re-export commonly used types
pub use callback::{MediaEvent, MediaObserver, ObserverList};
pub use error::{MediaError, Result};
pub use player::{
    MediaInfo, MediaPlayer, MediaTrack, PlaybackDirection, RateRange, TrackKind, TrackRef,
};
pub use state::PlayerState;
pub use ticker::{Ticker, TickerHandle};
