// Scripted in-process libvlc for tests
//
// Handles are fake, never-dereferenced pointers. Track description lists and
// their names are real heap allocations so list walking code runs unchanged.

use crate::ffi;
use crate::native::{EventManagerHandle, LibVlc, MediaCallbacks, MediaHandle, PlayerHandle};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::ffi::{CStr, CString};
use std::os::raw::{c_int, c_void};
use std::ptr;
use vlcmedia_core::PlayerState;

type EventCallback = unsafe extern "C" fn(*const ffi::libvlc_event_t, *mut c_void);

/// How a mock media was created
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Location(String),
    Path(String),
    Callbacks,
}

/// Track description entry served by the mock
#[derive(Debug, Clone)]
pub struct TrackSpec {
    pub id: c_int,
    pub name: Option<String>,
}

impl TrackSpec {
    pub fn new(id: c_int, name: &str) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
        }
    }

    /// The "Disable" entry libvlc puts in front of real tracks
    pub fn disable() -> Self {
        Self::new(-1, "Disable")
    }
}

#[derive(Clone, Copy)]
struct Listener {
    event_type: ffi::libvlc_event_type_t,
    callback: EventCallback,
    user_data: *mut c_void,
}

enum Owner {
    Media(MediaHandle),
    Player(PlayerHandle),
}

struct MockMedia {
    source: MediaSource,
    callbacks: Option<(MediaCallbacks, *mut c_void)>,
    io_data: Option<*mut c_void>,
    refs: u32,
    manager: EventManagerHandle,
    listeners: Vec<Listener>,
}

struct MockPlayer {
    media: MediaHandle,
    released: bool,
    manager: EventManagerHandle,
    listeners: Vec<Listener>,
    state: PlayerState,
    rate: f32,
    time_ms: i64,
    length_ms: i64,
    seekable: bool,
    audio_track: c_int,
    spu: c_int,
    video_track: c_int,
}

struct MockState {
    next_addr: usize,
    media: HashMap<MediaHandle, MockMedia>,
    players: HashMap<PlayerHandle, MockPlayer>,
    managers: HashMap<EventManagerHandle, Owner>,
    last_media: Option<MediaHandle>,
    last_player: Option<PlayerHandle>,

    audio_tracks: Vec<TrackSpec>,
    spu_tracks: Vec<TrackSpec>,
    video_tracks: Vec<TrackSpec>,
    live_lists: HashSet<usize>,
    released_lists: Vec<usize>,
    bad_list_releases: usize,

    fail_media_new: bool,
    fail_player_new: bool,
    fail_event_manager: bool,
    reject_rate: bool,
    default_length_ms: i64,
    default_seekable: bool,

    calls: Vec<String>,
}

/// In-process `LibVlc` used by tests
pub struct MockVlc {
    state: Mutex<MockState>,
}

// Raw pointers stored here are opaque tokens owned by the caller.
unsafe impl Send for MockVlc {}
unsafe impl Sync for MockVlc {}

impl MockVlc {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MockState {
                next_addr: 0x1000,
                media: HashMap::new(),
                players: HashMap::new(),
                managers: HashMap::new(),
                last_media: None,
                last_player: None,
                audio_tracks: Vec::new(),
                spu_tracks: Vec::new(),
                video_tracks: Vec::new(),
                live_lists: HashSet::new(),
                released_lists: Vec::new(),
                bad_list_releases: 0,
                fail_media_new: false,
                fail_player_new: false,
                fail_event_manager: false,
                reject_rate: false,
                default_length_ms: 60_000,
                default_seekable: true,
                calls: Vec::new(),
            }),
        }
    }

    // ── scripting ──

    pub fn set_tracks(&self, audio: Vec<TrackSpec>, spu: Vec<TrackSpec>, video: Vec<TrackSpec>) {
        let mut state = self.state.lock();
        state.audio_tracks = audio;
        state.spu_tracks = spu;
        state.video_tracks = video;
    }

    pub fn fail_media_new(&self, fail: bool) {
        self.state.lock().fail_media_new = fail;
    }

    pub fn fail_player_new(&self, fail: bool) {
        self.state.lock().fail_player_new = fail;
    }

    pub fn fail_event_manager(&self, fail: bool) {
        self.state.lock().fail_event_manager = fail;
    }

    pub fn reject_rate(&self, reject: bool) {
        self.state.lock().reject_rate = reject;
    }

    pub fn set_default_length(&self, length_ms: i64) {
        self.state.lock().default_length_ms = length_ms;
    }

    pub fn set_default_seekable(&self, seekable: bool) {
        self.state.lock().default_seekable = seekable;
    }

    pub fn set_state(&self, player: PlayerHandle, new_state: PlayerState) {
        if let Some(p) = self.state.lock().players.get_mut(&player) {
            p.state = new_state;
        }
    }

    // ── inspection ──

    pub fn last_media(&self) -> Option<MediaHandle> {
        self.state.lock().last_media
    }

    pub fn last_player(&self) -> Option<PlayerHandle> {
        self.state.lock().last_player
    }

    pub fn media_source(&self, media: MediaHandle) -> Option<MediaSource> {
        self.state.lock().media.get(&media).map(|m| m.source.clone())
    }

    pub fn media_refs(&self, media: MediaHandle) -> u32 {
        self.state.lock().media.get(&media).map_or(0, |m| m.refs)
    }

    pub fn player_released(&self, player: PlayerHandle) -> bool {
        self.state
            .lock()
            .players
            .get(&player)
            .map_or(true, |p| p.released)
    }

    pub fn player_state(&self, player: PlayerHandle) -> Option<PlayerState> {
        self.state.lock().players.get(&player).map(|p| p.state)
    }

    pub fn player_rate(&self, player: PlayerHandle) -> Option<f32> {
        self.state.lock().players.get(&player).map(|p| p.rate)
    }

    pub fn player_time(&self, player: PlayerHandle) -> Option<i64> {
        self.state.lock().players.get(&player).map(|p| p.time_ms)
    }

    /// Listeners attached to a player's and its media's event managers
    pub fn listener_count(&self, player: PlayerHandle) -> usize {
        let state = self.state.lock();
        state.players.get(&player).map_or(0, |p| {
            p.listeners.len() + state.media.get(&p.media).map_or(0, |m| m.listeners.len())
        })
    }

    pub fn live_list_count(&self) -> usize {
        self.state.lock().live_lists.len()
    }

    pub fn released_list_count(&self) -> usize {
        self.state.lock().released_lists.len()
    }

    /// Releases of pointers that were not live list heads
    pub fn bad_list_releases(&self) -> usize {
        self.state.lock().bad_list_releases
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| *c == name).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    // ── driving native callbacks ──

    /// Deliver a player event to every matching listener.
    pub fn fire_player_event(&self, player: PlayerHandle, event_type: ffi::libvlc_event_type_t) {
        let listeners = {
            let state = self.state.lock();
            state
                .players
                .get(&player)
                .map(|p| p.listeners.clone())
                .unwrap_or_default()
        };
        Self::dispatch(&listeners, event_type, player.as_ptr() as *mut c_void);
    }

    /// Deliver a media event to every matching listener.
    pub fn fire_media_event(&self, media: MediaHandle, event_type: ffi::libvlc_event_type_t) {
        let listeners = {
            let state = self.state.lock();
            state
                .media
                .get(&media)
                .map(|m| m.listeners.clone())
                .unwrap_or_default()
        };
        Self::dispatch(&listeners, event_type, media.as_ptr() as *mut c_void);
    }

    fn dispatch(listeners: &[Listener], event_type: ffi::libvlc_event_type_t, obj: *mut c_void) {
        let event = ffi::libvlc_event_t::new(event_type, obj);
        for listener in listeners.iter().filter(|l| l.event_type == event_type) {
            unsafe { (listener.callback)(&event, listener.user_data) };
        }
    }

    /// Invoke the media's open callback; returns its result and reported size.
    pub fn io_open(&self, media: MediaHandle) -> Option<(c_int, u64)> {
        let (callbacks, opaque) = self.state.lock().media.get(&media)?.callbacks?;
        let open = callbacks.open?;

        let mut data: *mut c_void = ptr::null_mut();
        let mut size: u64 = 0;
        let result = unsafe { open(opaque, &mut data, &mut size) };

        if let Some(m) = self.state.lock().media.get_mut(&media) {
            m.io_data = Some(data);
        }
        Some((result, size))
    }

    /// Invoke the media's read callback for up to `len` bytes.
    pub fn io_read(&self, media: MediaHandle, len: usize) -> Option<(isize, Vec<u8>)> {
        let (read, data) = {
            let state = self.state.lock();
            let m = state.media.get(&media)?;
            (m.callbacks?.0.read?, m.io_data?)
        };

        let mut buf = vec![0u8; len];
        let result = unsafe { read(data, buf.as_mut_ptr(), len) };
        buf.truncate(result.max(0) as usize);
        Some((result, buf))
    }

    /// Invoke the media's seek callback.
    pub fn io_seek(&self, media: MediaHandle, offset: u64) -> Option<c_int> {
        let (seek, data) = {
            let state = self.state.lock();
            let m = state.media.get(&media)?;
            (m.callbacks?.0.seek?, m.io_data?)
        };
        Some(unsafe { seek(data, offset) })
    }

    /// Invoke the media's close callback.
    pub fn io_close(&self, media: MediaHandle) -> bool {
        let pending = {
            let mut state = self.state.lock();
            match state.media.get_mut(&media) {
                Some(m) => Self::take_close(m),
                None => None,
            }
        };
        Self::run_close(pending)
    }

    fn take_close(media: &mut MockMedia) -> Option<(EventCallbackClose, *mut c_void)> {
        let close = media.callbacks?.0.close?;
        let data = media.io_data.take()?;
        Some((close, data))
    }

    fn run_close(pending: Option<(EventCallbackClose, *mut c_void)>) -> bool {
        match pending {
            Some((close, data)) => {
                unsafe { close(data) };
                true
            }
            None => false,
        }
    }

    // ── internals ──

    fn alloc_addr(state: &mut MockState) -> usize {
        let addr = state.next_addr;
        state.next_addr += 0x10;
        addr
    }

    fn new_media(
        &self,
        source: MediaSource,
        callbacks: Option<(MediaCallbacks, *mut c_void)>,
    ) -> Option<MediaHandle> {
        let mut state = self.state.lock();
        state.calls.push("media_new".to_string());
        if state.fail_media_new {
            return None;
        }

        let addr = Self::alloc_addr(&mut state);
        let media = MediaHandle::from_raw(addr as *mut ffi::libvlc_media_t)?;
        let manager = EventManagerHandle::from_raw((addr + 8) as *mut ffi::libvlc_event_manager_t)?;

        state.managers.insert(manager, Owner::Media(media));
        state.media.insert(
            media,
            MockMedia {
                source,
                callbacks,
                io_data: None,
                refs: 1,
                manager,
                listeners: Vec::new(),
            },
        );
        state.last_media = Some(media);
        Some(media)
    }

    /// Drop one media reference; returns a pending close callback when the
    /// last reference goes away on an opened callback media.
    fn unref_media(
        state: &mut MockState,
        media: MediaHandle,
    ) -> Option<(EventCallbackClose, *mut c_void)> {
        let m = state.media.get_mut(&media)?;
        m.refs = m.refs.saturating_sub(1);
        if m.refs == 0 {
            Self::take_close(m)
        } else {
            None
        }
    }

    fn first_real_id(specs: &[TrackSpec]) -> c_int {
        specs.iter().map(|s| s.id).find(|id| *id != -1).unwrap_or(-1)
    }

    fn build_list(
        state: &mut MockState,
        specs: &[TrackSpec],
    ) -> *mut ffi::libvlc_track_description_t {
        let mut head: *mut ffi::libvlc_track_description_t = ptr::null_mut();
        for spec in specs.iter().rev() {
            let name = spec
                .name
                .as_ref()
                .and_then(|n| CString::new(n.as_str()).ok())
                .map_or(ptr::null_mut(), CString::into_raw);
            head = Box::into_raw(Box::new(ffi::libvlc_track_description_t {
                i_id: spec.id,
                psz_name: name,
                p_next: head,
            }));
        }
        if !head.is_null() {
            state.live_lists.insert(head as usize);
        }
        head
    }

    /// # Safety
    /// `head` must be a list produced by `build_list` and not yet freed.
    unsafe fn free_list(head: *mut ffi::libvlc_track_description_t) {
        let mut node = head;
        while !node.is_null() {
            let boxed = Box::from_raw(node);
            if !boxed.psz_name.is_null() {
                drop(CString::from_raw(boxed.psz_name));
            }
            node = boxed.p_next;
        }
    }

    fn with_player<R>(
        &self,
        player: PlayerHandle,
        call: &str,
        f: impl FnOnce(&mut MockPlayer) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock();
        state.calls.push(call.to_string());
        state.players.get_mut(&player).filter(|p| !p.released).map(f)
    }

    fn description(
        &self,
        player: PlayerHandle,
        call: &str,
        pick: impl FnOnce(&MockState) -> Vec<TrackSpec>,
    ) -> *mut ffi::libvlc_track_description_t {
        let mut state = self.state.lock();
        state.calls.push(call.to_string());
        if !state.players.contains_key(&player) {
            return ptr::null_mut();
        }
        let specs = pick(&*state);
        Self::build_list(&mut state, &specs)
    }

    fn set_selected(
        &self,
        player: PlayerHandle,
        call: &str,
        id: c_int,
        pick: impl FnOnce(&MockState) -> Vec<TrackSpec>,
        apply: impl FnOnce(&mut MockPlayer, c_int),
    ) -> c_int {
        let mut state = self.state.lock();
        state.calls.push(call.to_string());
        let known = id == -1 || pick(&*state).iter().any(|s| s.id == id);
        match state.players.get_mut(&player) {
            Some(p) if known && !p.released => {
                apply(p, id);
                0
            }
            _ => -1,
        }
    }
}

type EventCallbackClose = unsafe extern "C" fn(*mut c_void);

impl Default for MockVlc {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MockVlc {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        for head in state.live_lists.drain() {
            unsafe { Self::free_list(head as *mut ffi::libvlc_track_description_t) };
        }
    }
}

impl LibVlc for MockVlc {
    fn errmsg(&self) -> Option<String> {
        None
    }

    fn media_new_location(&self, mrl: &CStr) -> Option<MediaHandle> {
        self.new_media(MediaSource::Location(mrl.to_string_lossy().into_owned()), None)
    }

    fn media_new_path(&self, path: &CStr) -> Option<MediaHandle> {
        self.new_media(MediaSource::Path(path.to_string_lossy().into_owned()), None)
    }

    fn media_new_callbacks(
        &self,
        callbacks: MediaCallbacks,
        opaque: *mut c_void,
    ) -> Option<MediaHandle> {
        self.new_media(MediaSource::Callbacks, Some((callbacks, opaque)))
    }

    fn media_event_manager(&self, media: MediaHandle) -> Option<EventManagerHandle> {
        let state = self.state.lock();
        if state.fail_event_manager {
            return None;
        }
        state.media.get(&media).map(|m| m.manager)
    }

    fn media_release(&self, media: MediaHandle) {
        let pending = {
            let mut state = self.state.lock();
            state.calls.push("media_release".to_string());
            Self::unref_media(&mut state, media)
        };
        Self::run_close(pending);
    }

    fn event_attach(
        &self,
        manager: EventManagerHandle,
        event_type: ffi::libvlc_event_type_t,
        callback: ffi::libvlc_callback_t,
        user_data: *mut c_void,
    ) -> c_int {
        let callback = match callback {
            Some(cb) => cb,
            None => return -1,
        };
        let listener = Listener {
            event_type,
            callback,
            user_data,
        };

        let mut state = self.state.lock();
        let owner = match state.managers.get(&manager) {
            Some(Owner::Media(m)) => Owner::Media(*m),
            Some(Owner::Player(p)) => Owner::Player(*p),
            None => return -1,
        };
        let listeners = match owner {
            Owner::Media(m) => state.media.get_mut(&m).map(|m| &mut m.listeners),
            Owner::Player(p) => state.players.get_mut(&p).map(|p| &mut p.listeners),
        };
        match listeners {
            Some(listeners) => {
                listeners.push(listener);
                0
            }
            None => -1,
        }
    }

    fn event_detach(
        &self,
        manager: EventManagerHandle,
        event_type: ffi::libvlc_event_type_t,
        callback: ffi::libvlc_callback_t,
        user_data: *mut c_void,
    ) {
        let callback = match callback {
            Some(cb) => cb,
            None => return,
        };

        let mut state = self.state.lock();
        let owner = match state.managers.get(&manager) {
            Some(Owner::Media(m)) => Owner::Media(*m),
            Some(Owner::Player(p)) => Owner::Player(*p),
            None => return,
        };
        let listeners = match owner {
            Owner::Media(m) => state.media.get_mut(&m).map(|m| &mut m.listeners),
            Owner::Player(p) => state.players.get_mut(&p).map(|p| &mut p.listeners),
        };
        if let Some(listeners) = listeners {
            if let Some(pos) = listeners.iter().position(|l| {
                l.event_type == event_type
                    && l.callback as usize == callback as usize
                    && l.user_data == user_data
            }) {
                listeners.remove(pos);
            }
        }
    }

    fn media_player_new_from_media(&self, media: MediaHandle) -> Option<PlayerHandle> {
        let mut state = self.state.lock();
        state.calls.push("player_new".to_string());
        if state.fail_player_new || !state.media.contains_key(&media) {
            return None;
        }

        let addr = Self::alloc_addr(&mut state);
        let player = PlayerHandle::from_raw(addr as *mut ffi::libvlc_media_player_t)?;
        let manager = EventManagerHandle::from_raw((addr + 8) as *mut ffi::libvlc_event_manager_t)?;

        let audio_track = Self::first_real_id(&state.audio_tracks);
        let video_track = Self::first_real_id(&state.video_tracks);
        let length_ms = state.default_length_ms;
        let seekable = state.default_seekable;

        if let Some(m) = state.media.get_mut(&media) {
            m.refs += 1;
        }
        state.managers.insert(manager, Owner::Player(player));
        state.players.insert(
            player,
            MockPlayer {
                media,
                released: false,
                manager,
                listeners: Vec::new(),
                state: PlayerState::NothingSpecial,
                rate: 1.0,
                time_ms: 0,
                length_ms,
                seekable,
                audio_track,
                spu: -1,
                video_track,
            },
        );
        state.last_player = Some(player);
        Some(player)
    }

    fn media_player_release(&self, player: PlayerHandle) {
        let pending = {
            let mut state = self.state.lock();
            state.calls.push("player_release".to_string());
            let media = match state.players.get_mut(&player) {
                Some(p) if !p.released => {
                    p.released = true;
                    p.listeners.clear();
                    Some(p.media)
                }
                _ => None,
            };
            media.and_then(|m| Self::unref_media(&mut state, m))
        };
        Self::run_close(pending);
    }

    fn media_player_event_manager(&self, player: PlayerHandle) -> Option<EventManagerHandle> {
        let state = self.state.lock();
        if state.fail_event_manager {
            return None;
        }
        state.players.get(&player).map(|p| p.manager)
    }

    fn media_player_get_media(&self, player: PlayerHandle) -> Option<MediaHandle> {
        let mut state = self.state.lock();
        let media = state.players.get(&player).filter(|p| !p.released)?.media;
        if let Some(m) = state.media.get_mut(&media) {
            m.refs += 1;
        }
        Some(media)
    }

    fn media_player_play(&self, player: PlayerHandle) -> c_int {
        self.with_player(player, "play", |p| {
            p.state = PlayerState::Playing;
            0
        })
        .unwrap_or(-1)
    }

    fn media_player_pause(&self, player: PlayerHandle) {
        self.with_player(player, "pause", |p| {
            p.state = match p.state {
                PlayerState::Playing => PlayerState::Paused,
                PlayerState::Paused => PlayerState::Playing,
                other => other,
            };
        });
    }

    fn media_player_stop(&self, player: PlayerHandle) {
        self.with_player(player, "stop", |p| {
            p.state = PlayerState::Stopped;
            p.time_ms = 0;
        });
    }

    fn media_player_get_state(&self, player: PlayerHandle) -> PlayerState {
        self.state
            .lock()
            .players
            .get(&player)
            .map_or(PlayerState::Error, |p| p.state)
    }

    fn media_player_get_length(&self, player: PlayerHandle) -> i64 {
        self.state.lock().players.get(&player).map_or(-1, |p| p.length_ms)
    }

    fn media_player_set_time(&self, player: PlayerHandle, time_ms: i64) {
        self.with_player(player, "set_time", |p| p.time_ms = time_ms);
    }

    fn media_player_get_rate(&self, player: PlayerHandle) -> f32 {
        self.state.lock().players.get(&player).map_or(0.0, |p| p.rate)
    }

    fn media_player_set_rate(&self, player: PlayerHandle, rate: f32) -> c_int {
        let reject = self.state.lock().reject_rate;
        self.with_player(player, "set_rate", |p| {
            if reject {
                -1
            } else {
                p.rate = rate;
                0
            }
        })
        .unwrap_or(-1)
    }

    fn media_player_is_seekable(&self, player: PlayerHandle) -> bool {
        self.state
            .lock()
            .players
            .get(&player)
            .map_or(false, |p| p.seekable)
    }

    fn audio_get_track(&self, player: PlayerHandle) -> c_int {
        self.state.lock().players.get(&player).map_or(-1, |p| p.audio_track)
    }

    fn audio_set_track(&self, player: PlayerHandle, track: c_int) -> c_int {
        self.set_selected(
            player,
            "audio_set_track",
            track,
            |s| s.audio_tracks.clone(),
            |p, id| p.audio_track = id,
        )
    }

    fn video_get_spu(&self, player: PlayerHandle) -> c_int {
        self.state.lock().players.get(&player).map_or(-1, |p| p.spu)
    }

    fn video_set_spu(&self, player: PlayerHandle, spu: c_int) -> c_int {
        self.set_selected(
            player,
            "video_set_spu",
            spu,
            |s| s.spu_tracks.clone(),
            |p, id| p.spu = id,
        )
    }

    fn video_get_track(&self, player: PlayerHandle) -> c_int {
        self.state.lock().players.get(&player).map_or(-1, |p| p.video_track)
    }

    fn video_set_track(&self, player: PlayerHandle, track: c_int) -> c_int {
        self.set_selected(
            player,
            "video_set_track",
            track,
            |s| s.video_tracks.clone(),
            |p, id| p.video_track = id,
        )
    }

    fn audio_get_track_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t {
        self.description(player, "audio_description", |s| s.audio_tracks.clone())
    }

    fn video_get_spu_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t {
        self.description(player, "spu_description", |s| s.spu_tracks.clone())
    }

    fn video_get_track_description(
        &self,
        player: PlayerHandle,
    ) -> *mut ffi::libvlc_track_description_t {
        self.description(player, "video_description", |s| s.video_tracks.clone())
    }

    fn track_description_list_release(&self, list: *mut ffi::libvlc_track_description_t) {
        if list.is_null() {
            return;
        }
        let mut state = self.state.lock();
        if state.live_lists.remove(&(list as usize)) {
            state.released_lists.push(list as usize);
            unsafe { Self::free_list(list) };
        } else {
            log::warn!("Release of unknown track description list {:p}", list);
            state.bad_list_releases += 1;
        }
    }
}
