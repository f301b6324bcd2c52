// Native playback surface used by the player adapter

use crate::ffi;
use std::ffi::CStr;
use std::os::raw::{c_int, c_void};
use std::ptr::NonNull;
use vlcmedia_core::PlayerState;

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident, $raw:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(NonNull<$raw>);

        impl $name {
            /// Wrap a raw pointer, `None` if it is null.
            pub fn from_raw(raw: *mut $raw) -> Option<Self> {
                NonNull::new(raw).map(Self)
            }

            pub fn as_ptr(self) -> *mut $raw {
                self.0.as_ptr()
            }
        }

        // Native objects are reference counted and thread-safe on the C side.
        unsafe impl Send for $name {}
        unsafe impl Sync for $name {}
    };
}

native_handle!(
    /// Reference to a native media object
    MediaHandle,
    ffi::libvlc_media_t
);
native_handle!(
    /// Reference to a native media player
    PlayerHandle,
    ffi::libvlc_media_player_t
);
native_handle!(
    /// Event manager owned by a media or media player
    EventManagerHandle,
    ffi::libvlc_event_manager_t
);

/// The four I/O callbacks backing a callback-based media
#[derive(Clone, Copy)]
pub struct MediaCallbacks {
    pub open: ffi::libvlc_media_open_cb,
    pub read: ffi::libvlc_media_read_cb,
    pub seek: ffi::libvlc_media_seek_cb,
    pub close: ffi::libvlc_media_close_cb,
}

/// Native libvlc entry points.
///
/// Each method is a direct restatement of one libvlc call. Handles passed in
/// must have been produced by the same implementation and not yet released.
/// Creation calls return `None` where libvlc returns NULL.
pub trait LibVlc: Send + Sync {
    /// Last error message reported by the library, if any
    fn errmsg(&self) -> Option<String>;

    // Media
    fn media_new_location(&self, mrl: &CStr) -> Option<MediaHandle>;
    fn media_new_path(&self, path: &CStr) -> Option<MediaHandle>;
    fn media_new_callbacks(
        &self,
        callbacks: MediaCallbacks,
        opaque: *mut c_void,
    ) -> Option<MediaHandle>;
    fn media_event_manager(&self, media: MediaHandle) -> Option<EventManagerHandle>;
    fn media_release(&self, media: MediaHandle);

    // Events
    fn event_attach(
        &self,
        manager: EventManagerHandle,
        event_type: ffi::libvlc_event_type_t,
        callback: ffi::libvlc_callback_t,
        user_data: *mut c_void,
    ) -> c_int;
    fn event_detach(
        &self,
        manager: EventManagerHandle,
        event_type: ffi::libvlc_event_type_t,
        callback: ffi::libvlc_callback_t,
        user_data: *mut c_void,
    );

    // Media player
    fn media_player_new_from_media(&self, media: MediaHandle) -> Option<PlayerHandle>;
    fn media_player_release(&self, player: PlayerHandle);
    fn media_player_event_manager(&self, player: PlayerHandle) -> Option<EventManagerHandle>;
    /// Returns a new reference the caller must release
    fn media_player_get_media(&self, player: PlayerHandle) -> Option<MediaHandle>;

    fn media_player_play(&self, player: PlayerHandle) -> c_int;
    fn media_player_pause(&self, player: PlayerHandle);
    fn media_player_stop(&self, player: PlayerHandle);

    fn media_player_get_state(&self, player: PlayerHandle) -> PlayerState;
    /// Length in milliseconds, -1 if unknown
    fn media_player_get_length(&self, player: PlayerHandle) -> i64;
    fn media_player_set_time(&self, player: PlayerHandle, time_ms: i64);
    fn media_player_get_rate(&self, player: PlayerHandle) -> f32;
    /// 0 on success, -1 if the rate is not supported
    fn media_player_set_rate(&self, player: PlayerHandle, rate: f32) -> c_int;
    fn media_player_is_seekable(&self, player: PlayerHandle) -> bool;

    // Tracks
    fn audio_get_track(&self, player: PlayerHandle) -> c_int;
    fn audio_set_track(&self, player: PlayerHandle, track: c_int) -> c_int;
    fn video_get_spu(&self, player: PlayerHandle) -> c_int;
    fn video_set_spu(&self, player: PlayerHandle, spu: c_int) -> c_int;
    fn video_get_track(&self, player: PlayerHandle) -> c_int;
    fn video_set_track(&self, player: PlayerHandle, track: c_int) -> c_int;

    fn audio_get_track_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t;
    fn video_get_spu_description(&self, player: PlayerHandle)
        -> *mut ffi::libvlc_track_description_t;
    fn video_get_track_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t;
    /// Release a list previously returned by one of the description calls.
    /// Releasing NULL is a no-op.
    fn track_description_list_release(&self, list: *mut ffi::libvlc_track_description_t);
}
