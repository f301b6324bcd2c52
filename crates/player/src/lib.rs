// libvlc-backed media player adapter for host engines

pub mod context;
pub mod events;
pub mod player;
pub mod track;

use std::sync::Once;

pub use context::{CallbackContext, MediaBuffer};
pub use events::{EventKind, EventQueue};
pub use player::VlcMediaPlayer;
pub use track::{PlayerLink, VlcMediaTrack};

static INIT_LOGGER: Once = Once::new();

/// Install an `env_logger` backend once. `RUST_LOG` overrides the default
/// `info` level. Does nothing if the host already installed a logger.
pub fn init_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("info"),
        )
        .try_init();
    });
}
