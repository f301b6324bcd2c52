// LibVlc implementation backed by the system libvlc

use crate::config::VlcConfig;
use crate::ffi;
use crate::native::{EventManagerHandle, LibVlc, MediaCallbacks, MediaHandle, PlayerHandle};
use std::ffi::CStr;
use std::os::raw::{c_char, c_int, c_void};
use vlcmedia_core::{MediaError, PlayerState, Result};

/// Owns one libvlc instance
pub struct LinkedVlc {
    instance: *mut ffi::libvlc_instance_t,
}

// libvlc instances may be used from any thread.
unsafe impl Send for LinkedVlc {}
unsafe impl Sync for LinkedVlc {}

impl LinkedVlc {
    pub fn new(config: &VlcConfig) -> Result<Self> {
        config.apply_plugin_path();

        let args = config.c_args()?;
        let argv: Vec<*const c_char> = args.iter().map(|arg| arg.as_ptr()).collect();

        log::info!("Creating libvlc instance with {} argument(s)", argv.len());
        let instance = unsafe { ffi::libvlc_new(argv.len() as c_int, argv.as_ptr()) };

        if instance.is_null() {
            let message = last_error().unwrap_or_else(|| "libvlc_new returned NULL".to_string());
            log::error!("Failed to create libvlc instance: {}", message);
            return Err(MediaError::Library(message));
        }

        Ok(Self { instance })
    }
}

impl Drop for LinkedVlc {
    fn drop(&mut self) {
        log::debug!("Releasing libvlc instance");
        unsafe { ffi::libvlc_release(self.instance) };
    }
}

fn last_error() -> Option<String> {
    let message = unsafe { ffi::libvlc_errmsg() };
    if message.is_null() {
        return None;
    }
    Some(unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned())
}

impl LibVlc for LinkedVlc {
    fn errmsg(&self) -> Option<String> {
        last_error()
    }

    fn media_new_location(&self, mrl: &CStr) -> Option<MediaHandle> {
        MediaHandle::from_raw(unsafe {
            ffi::libvlc_media_new_location(self.instance, mrl.as_ptr())
        })
    }

    fn media_new_path(&self, path: &CStr) -> Option<MediaHandle> {
        MediaHandle::from_raw(unsafe { ffi::libvlc_media_new_path(self.instance, path.as_ptr()) })
    }

    fn media_new_callbacks(
        &self,
        callbacks: MediaCallbacks,
        opaque: *mut c_void,
    ) -> Option<MediaHandle> {
        MediaHandle::from_raw(unsafe {
            ffi::libvlc_media_new_callbacks(
                self.instance,
                callbacks.open,
                callbacks.read,
                callbacks.seek,
                callbacks.close,
                opaque,
            )
        })
    }

    fn media_event_manager(&self, media: MediaHandle) -> Option<EventManagerHandle> {
        EventManagerHandle::from_raw(unsafe { ffi::libvlc_media_event_manager(media.as_ptr()) })
    }

    fn media_release(&self, media: MediaHandle) {
        unsafe { ffi::libvlc_media_release(media.as_ptr()) }
    }

    fn event_attach(
        &self,
        manager: EventManagerHandle,
        event_type: ffi::libvlc_event_type_t,
        callback: ffi::libvlc_callback_t,
        user_data: *mut c_void,
    ) -> c_int {
        unsafe { ffi::libvlc_event_attach(manager.as_ptr(), event_type, callback, user_data) }
    }

    fn event_detach(
        &self,
        manager: EventManagerHandle,
        event_type: ffi::libvlc_event_type_t,
        callback: ffi::libvlc_callback_t,
        user_data: *mut c_void,
    ) {
        unsafe { ffi::libvlc_event_detach(manager.as_ptr(), event_type, callback, user_data) }
    }

    fn media_player_new_from_media(&self, media: MediaHandle) -> Option<PlayerHandle> {
        PlayerHandle::from_raw(unsafe { ffi::libvlc_media_player_new_from_media(media.as_ptr()) })
    }

    fn media_player_release(&self, player: PlayerHandle) {
        unsafe { ffi::libvlc_media_player_release(player.as_ptr()) }
    }

    fn media_player_event_manager(&self, player: PlayerHandle) -> Option<EventManagerHandle> {
        EventManagerHandle::from_raw(unsafe {
            ffi::libvlc_media_player_event_manager(player.as_ptr())
        })
    }

    fn media_player_get_media(&self, player: PlayerHandle) -> Option<MediaHandle> {
        MediaHandle::from_raw(unsafe { ffi::libvlc_media_player_get_media(player.as_ptr()) })
    }

    fn media_player_play(&self, player: PlayerHandle) -> c_int {
        unsafe { ffi::libvlc_media_player_play(player.as_ptr()) }
    }

    fn media_player_pause(&self, player: PlayerHandle) {
        unsafe { ffi::libvlc_media_player_pause(player.as_ptr()) }
    }

    fn media_player_stop(&self, player: PlayerHandle) {
        unsafe { ffi::libvlc_media_player_stop(player.as_ptr()) }
    }

    fn media_player_get_state(&self, player: PlayerHandle) -> PlayerState {
        PlayerState::from_raw(unsafe { ffi::libvlc_media_player_get_state(player.as_ptr()) })
    }

    fn media_player_get_length(&self, player: PlayerHandle) -> i64 {
        unsafe { ffi::libvlc_media_player_get_length(player.as_ptr()) }
    }

    fn media_player_set_time(&self, player: PlayerHandle, time_ms: i64) {
        unsafe { ffi::libvlc_media_player_set_time(player.as_ptr(), time_ms) }
    }

    fn media_player_get_rate(&self, player: PlayerHandle) -> f32 {
        unsafe { ffi::libvlc_media_player_get_rate(player.as_ptr()) }
    }

    fn media_player_set_rate(&self, player: PlayerHandle, rate: f32) -> c_int {
        unsafe { ffi::libvlc_media_player_set_rate(player.as_ptr(), rate) }
    }

    fn media_player_is_seekable(&self, player: PlayerHandle) -> bool {
        unsafe { ffi::libvlc_media_player_is_seekable(player.as_ptr()) != 0 }
    }

    fn audio_get_track(&self, player: PlayerHandle) -> c_int {
        unsafe { ffi::libvlc_audio_get_track(player.as_ptr()) }
    }

    fn audio_set_track(&self, player: PlayerHandle, track: c_int) -> c_int {
        unsafe { ffi::libvlc_audio_set_track(player.as_ptr(), track) }
    }

    fn video_get_spu(&self, player: PlayerHandle) -> c_int {
        unsafe { ffi::libvlc_video_get_spu(player.as_ptr()) }
    }

    fn video_set_spu(&self, player: PlayerHandle, spu: c_int) -> c_int {
        unsafe { ffi::libvlc_video_set_spu(player.as_ptr(), spu) }
    }

    fn video_get_track(&self, player: PlayerHandle) -> c_int {
        unsafe { ffi::libvlc_video_get_track(player.as_ptr()) }
    }

    fn video_set_track(&self, player: PlayerHandle, track: c_int) -> c_int {
        unsafe { ffi::libvlc_video_set_track(player.as_ptr(), track) }
    }

    fn audio_get_track_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t {
        unsafe { ffi::libvlc_audio_get_track_description(player.as_ptr()) }
    }

    fn video_get_spu_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t {
        unsafe { ffi::libvlc_video_get_spu_description(player.as_ptr()) }
    }

    fn video_get_track_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t {
        unsafe { ffi::libvlc_video_get_track_description(player.as_ptr()) }
    }

    fn track_description_list_release(&self, list: *mut ffi::libvlc_track_description_t) {
        if !list.is_null() {
            unsafe { ffi::libvlc_track_description_list_release(list) }
        }
    }
}
