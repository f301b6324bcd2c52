//! libvlc native surface for the vlcmedia player
//!
//! `ffi` declares the raw C API, `LibVlc` restates the calls the player
//! makes as a trait, `LinkedVlc` forwards them to the system library
//! (feature `link`) and `MockVlc` scripts them in-process (feature `mock`).

pub mod config;
pub mod ffi;
pub mod native;

#[cfg(feature = "link")]
pub mod linked;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use config::VlcConfig;
pub use native::{EventManagerHandle, LibVlc, MediaCallbacks, MediaHandle, PlayerHandle};

#[cfg(feature = "link")]
pub use linked::LinkedVlc;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MediaSource, MockVlc, TrackSpec};
