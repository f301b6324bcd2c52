// Host-facing media player contracts

use crate::callback::ObserverList;
use std::sync::Arc;
use std::time::Duration;

/// Direction a playback rate applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackDirection {
    Forward,
    Reverse,
}

/// Inclusive range of playback rates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateRange {
    pub min: f32,
    pub max: f32,
}

impl RateRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Range containing exactly one rate
    pub fn single(rate: f32) -> Self {
        Self {
            min: rate,
            max: rate,
        }
    }

    pub fn contains(&self, rate: f32) -> bool {
        rate >= self.min && rate <= self.max
    }
}

/// Kind of selectable stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Audio,
    Caption,
    Video,
}

/// A selectable audio, caption or video stream
pub trait MediaTrack: Send + Sync {
    /// Position of this track in the player's track list.
    /// Unique across all kinds.
    fn index(&self) -> usize;

    fn kind(&self) -> TrackKind;

    /// Human readable name, empty if the media does not provide one
    fn name(&self) -> String;

    /// Whether this track is the one currently selected for its kind
    fn is_enabled(&self) -> bool;

    /// Select (or deselect) this track
    fn set_enabled(&self, enabled: bool) -> bool;

    /// Last playback time propagated to the track
    fn time(&self) -> Duration;
}

pub type TrackRef = Arc<dyn MediaTrack>;

/// Static information about the opened media
pub trait MediaInfo {
    fn duration(&self) -> Duration;

    fn supported_rates(&self, direction: PlaybackDirection, unthinned: bool) -> RateRange;

    /// URL of the currently opened media, empty if none
    fn url(&self) -> String;

    fn supports_rate(&self, rate: f32, unthinned: bool) -> bool;

    fn supports_scrubbing(&self) -> bool;

    fn supports_seeking(&self) -> bool;
}

/// Media player control interface.
/// Failures are reported as `false` or as "nothing open" defaults.
pub trait MediaPlayer: MediaInfo {
    /// Open media by URL or local path
    fn open(&mut self, url: &str) -> bool;

    /// Open media from an in-memory buffer.
    /// `original_url` is what `url()` reports afterwards.
    fn open_buffer(&mut self, buffer: Arc<Vec<u8>>, original_url: &str) -> bool;

    /// Close the current media. Safe to call repeatedly.
    fn close(&mut self);

    fn rate(&self) -> f32;

    fn time(&self) -> Duration;

    fn tracks(&self) -> Vec<TrackRef>;

    fn is_looping(&self) -> bool;

    fn is_paused(&self) -> bool;

    fn is_playing(&self) -> bool;

    fn is_ready(&self) -> bool;

    fn seek(&mut self, time: Duration) -> bool;

    fn set_looping(&mut self, looping: bool) -> bool;

    fn set_rate(&mut self, rate: f32) -> bool;

    /// Opened/closed notifications
    fn observers(&self) -> &ObserverList;
}
