//! libvlc C API bindings
//!
//! Manual bindings for the subset of libvlc 3.x the player needs. Only the
//! type definitions are always available; the `extern` block is compiled
//! when the `link` feature is enabled.

#![allow(non_camel_case_types)]
#![allow(non_upper_case_globals)]

use std::os::raw::{c_char, c_int, c_uchar, c_void};

// Opaque types
pub enum libvlc_instance_t {}
pub enum libvlc_media_t {}
pub enum libvlc_media_player_t {}
pub enum libvlc_event_manager_t {}

pub type libvlc_event_type_t = c_int;

// Media events
pub const libvlc_MediaMetaChanged: libvlc_event_type_t = 0;
pub const libvlc_MediaSubItemAdded: libvlc_event_type_t = 1;
pub const libvlc_MediaDurationChanged: libvlc_event_type_t = 2;
pub const libvlc_MediaParsedChanged: libvlc_event_type_t = 3;
pub const libvlc_MediaFreed: libvlc_event_type_t = 4;
pub const libvlc_MediaStateChanged: libvlc_event_type_t = 5;

// Media player events
pub const libvlc_MediaPlayerMediaChanged: libvlc_event_type_t = 0x100;
pub const libvlc_MediaPlayerNothingSpecial: libvlc_event_type_t = 0x101;
pub const libvlc_MediaPlayerOpening: libvlc_event_type_t = 0x102;
pub const libvlc_MediaPlayerBuffering: libvlc_event_type_t = 0x103;
pub const libvlc_MediaPlayerPlaying: libvlc_event_type_t = 0x104;
pub const libvlc_MediaPlayerPaused: libvlc_event_type_t = 0x105;
pub const libvlc_MediaPlayerStopped: libvlc_event_type_t = 0x106;
pub const libvlc_MediaPlayerForward: libvlc_event_type_t = 0x107;
pub const libvlc_MediaPlayerBackward: libvlc_event_type_t = 0x108;
pub const libvlc_MediaPlayerEndReached: libvlc_event_type_t = 0x109;
pub const libvlc_MediaPlayerEncounteredError: libvlc_event_type_t = 0x10A;

/// Event delivered to `libvlc_callback_t`.
///
/// Only the header is declared; the payload union is never read.
#[repr(C)]
pub struct libvlc_event_t {
    pub type_: libvlc_event_type_t,
    pub p_obj: *mut c_void,
    _u: [u64; 4],
}

impl libvlc_event_t {
    pub fn new(type_: libvlc_event_type_t, p_obj: *mut c_void) -> Self {
        Self {
            type_,
            p_obj,
            _u: [0; 4],
        }
    }
}

/// Node of a track description list
#[repr(C)]
pub struct libvlc_track_description_t {
    pub i_id: c_int,
    pub psz_name: *mut c_char,
    pub p_next: *mut libvlc_track_description_t,
}

pub type libvlc_callback_t =
    Option<unsafe extern "C" fn(event: *const libvlc_event_t, user_data: *mut c_void)>;

// Media I/O callbacks
pub type libvlc_media_open_cb = Option<
    unsafe extern "C" fn(opaque: *mut c_void, datap: *mut *mut c_void, sizep: *mut u64) -> c_int,
>;
pub type libvlc_media_read_cb =
    Option<unsafe extern "C" fn(opaque: *mut c_void, buf: *mut c_uchar, len: usize) -> isize>;
pub type libvlc_media_seek_cb =
    Option<unsafe extern "C" fn(opaque: *mut c_void, offset: u64) -> c_int>;
pub type libvlc_media_close_cb = Option<unsafe extern "C" fn(opaque: *mut c_void)>;

#[cfg(feature = "link")]
#[link(name = "vlc")]
extern "C" {
    // Library instance
    pub fn libvlc_new(argc: c_int, argv: *const *const c_char) -> *mut libvlc_instance_t;
    pub fn libvlc_release(instance: *mut libvlc_instance_t);

    // Error handling
    pub fn libvlc_errmsg() -> *const c_char;

    // Events
    pub fn libvlc_event_attach(
        event_manager: *mut libvlc_event_manager_t,
        event_type: libvlc_event_type_t,
        callback: libvlc_callback_t,
        user_data: *mut c_void,
    ) -> c_int;
    pub fn libvlc_event_detach(
        event_manager: *mut libvlc_event_manager_t,
        event_type: libvlc_event_type_t,
        callback: libvlc_callback_t,
        user_data: *mut c_void,
    );

    // Media
    pub fn libvlc_media_new_location(
        instance: *mut libvlc_instance_t,
        mrl: *const c_char,
    ) -> *mut libvlc_media_t;
    pub fn libvlc_media_new_path(
        instance: *mut libvlc_instance_t,
        path: *const c_char,
    ) -> *mut libvlc_media_t;
    pub fn libvlc_media_new_callbacks(
        instance: *mut libvlc_instance_t,
        open_cb: libvlc_media_open_cb,
        read_cb: libvlc_media_read_cb,
        seek_cb: libvlc_media_seek_cb,
        close_cb: libvlc_media_close_cb,
        opaque: *mut c_void,
    ) -> *mut libvlc_media_t;
    pub fn libvlc_media_event_manager(media: *mut libvlc_media_t)
        -> *mut libvlc_event_manager_t;
    pub fn libvlc_media_release(media: *mut libvlc_media_t);

    // Media player
    pub fn libvlc_media_player_new_from_media(
        media: *mut libvlc_media_t,
    ) -> *mut libvlc_media_player_t;
    pub fn libvlc_media_player_release(player: *mut libvlc_media_player_t);
    pub fn libvlc_media_player_event_manager(
        player: *mut libvlc_media_player_t,
    ) -> *mut libvlc_event_manager_t;
    pub fn libvlc_media_player_get_media(player: *mut libvlc_media_player_t)
        -> *mut libvlc_media_t;

    // Media player control
    pub fn libvlc_media_player_play(player: *mut libvlc_media_player_t) -> c_int;
    pub fn libvlc_media_player_pause(player: *mut libvlc_media_player_t);
    pub fn libvlc_media_player_stop(player: *mut libvlc_media_player_t);

    // Media player status
    pub fn libvlc_media_player_get_state(player: *mut libvlc_media_player_t) -> c_int;
    pub fn libvlc_media_player_get_length(player: *mut libvlc_media_player_t) -> i64;
    pub fn libvlc_media_player_set_time(player: *mut libvlc_media_player_t, time: i64);
    pub fn libvlc_media_player_get_rate(player: *mut libvlc_media_player_t) -> f32;
    pub fn libvlc_media_player_set_rate(player: *mut libvlc_media_player_t, rate: f32) -> c_int;
    pub fn libvlc_media_player_is_seekable(player: *mut libvlc_media_player_t) -> c_int;

    // Audio
    pub fn libvlc_audio_get_track(player: *mut libvlc_media_player_t) -> c_int;
    pub fn libvlc_audio_set_track(player: *mut libvlc_media_player_t, track: c_int) -> c_int;
    pub fn libvlc_audio_get_track_description(
        player: *mut libvlc_media_player_t,
    ) -> *mut libvlc_track_description_t;

    // Video
    pub fn libvlc_video_get_spu(player: *mut libvlc_media_player_t) -> c_int;
    pub fn libvlc_video_set_spu(player: *mut libvlc_media_player_t, spu: c_int) -> c_int;
    pub fn libvlc_video_get_spu_description(
        player: *mut libvlc_media_player_t,
    ) -> *mut libvlc_track_description_t;
    pub fn libvlc_video_get_track(player: *mut libvlc_media_player_t) -> c_int;
    pub fn libvlc_video_set_track(player: *mut libvlc_media_player_t, track: c_int) -> c_int;
    pub fn libvlc_video_get_track_description(
        player: *mut libvlc_media_player_t,
    ) -> *mut libvlc_track_description_t;

    // Tracks
    pub fn libvlc_track_description_list_release(list: *mut libvlc_track_description_t);
}
