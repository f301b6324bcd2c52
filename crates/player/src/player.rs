// Media player adapter translating host calls into libvlc calls

use crate::context::{handle_event, CallbackContext};
use crate::events::EventKind;
use crate::track::{enumerate_tracks, PlayerLink, VlcMediaTrack};
use parking_lot::Mutex;
use std::ffi::CString;
use std::sync::{Arc, Weak};
use std::time::Duration;
use vlcmedia_core::{
    MediaError, MediaEvent, MediaInfo, MediaPlayer, ObserverList, PlaybackDirection, PlayerState,
    RateRange, Result, Ticker, TickerHandle, TrackRef,
};
use vlcmedia_libvlc::{ffi, EventManagerHandle, LibVlc, MediaHandle, PlayerHandle};

/// Rates with a smaller magnitude count as "stopped"
const RATE_EPSILON: f32 = 1.0e-8;

/// Media events the player listens to
const MEDIA_EVENTS: [ffi::libvlc_event_type_t; 1] = [ffi::libvlc_MediaParsedChanged];

/// Player events the player listens to
const PLAYER_EVENTS: [ffi::libvlc_event_type_t; 2] = [
    ffi::libvlc_MediaPlayerEndReached,
    ffi::libvlc_MediaPlayerPlaying,
];

fn is_nearly_zero(rate: f32) -> bool {
    rate.abs() <= RATE_EPSILON
}

/// Clock seconds as a duration; negative or non-finite values clamp to zero.
pub(crate) fn clock_duration(seconds: f32) -> Duration {
    Duration::try_from_secs_f32(seconds).unwrap_or(Duration::ZERO)
}

/// State shared between the host-facing handle and the frame ticker
struct PlayerInner {
    vlc: Arc<dyn LibVlc>,
    context: Arc<CallbackContext>,
    player: Option<PlayerHandle>,
    link: Option<Arc<PlayerLink>>,
    attached: Vec<(EventManagerHandle, ffi::libvlc_event_type_t)>,
    media_url: String,
    /// Seconds of playback, tracked locally because native time is unreliable
    current_time: f32,
    desired_rate: f32,
    should_loop: bool,
    tracks: Vec<Arc<VlcMediaTrack>>,
    tracks_initialized: bool,
    /// A player was released since the host handle last looked
    closed_pending: bool,
}

impl PlayerInner {
    fn new(vlc: Arc<dyn LibVlc>) -> Self {
        Self {
            vlc,
            context: CallbackContext::new(),
            player: None,
            link: None,
            attached: Vec::new(),
            media_url: String::new(),
            current_time: 0.0,
            desired_rate: 0.0,
            should_loop: false,
            tracks: Vec::new(),
            tracks_initialized: false,
            closed_pending: false,
        }
    }

    fn native_error(&self, what: &str) -> MediaError {
        match self.vlc.errmsg() {
            Some(message) => MediaError::NativeCall(format!("{}: {}", what, message)),
            None => MediaError::NativeCall(what.to_string()),
        }
    }

    // ── open / close ──

    fn open_url(&mut self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(MediaError::InvalidInput("empty URL".to_string()));
        }
        let c_url = CString::new(url)
            .map_err(|_| MediaError::InvalidInput(format!("URL contains NUL: {:?}", url)))?;

        self.close();

        let media = if url.contains("://") {
            self.vlc.media_new_location(&c_url)
        } else {
            self.vlc.media_new_path(&c_url)
        };
        let media = media.ok_or_else(|| self.native_error("media creation failed"))?;

        self.media_url = url.to_string();
        self.initialize_player(media)
    }

    fn open_buffer(&mut self, buffer: Arc<Vec<u8>>, original_url: &str) -> Result<()> {
        if buffer.is_empty() {
            return Err(MediaError::InvalidInput("empty buffer".to_string()));
        }
        if original_url.is_empty() {
            return Err(MediaError::InvalidInput("empty original URL".to_string()));
        }

        self.close();

        self.context.buffer.lock().set(buffer);
        let media = self
            .vlc
            .media_new_callbacks(CallbackContext::media_callbacks(), self.context.as_opaque());

        let media = match media {
            Some(media) => media,
            None => {
                self.context.buffer.lock().clear();
                return Err(self.native_error("callback media creation failed"));
            }
        };

        self.media_url = original_url.to_string();
        self.initialize_player(media)
    }

    /// Create the native player for `media`, hook up events and start playing.
    /// Consumes the caller's media reference.
    fn initialize_player(&mut self, media: MediaHandle) -> Result<()> {
        let player = match self.vlc.media_player_new_from_media(media) {
            Some(player) => player,
            None => {
                let err = self.native_error("player creation failed");
                self.vlc.media_release(media);
                self.close();
                return Err(err);
            }
        };
        self.player = Some(player);
        self.link = Some(PlayerLink::new(self.vlc.clone(), player));

        let managers = (
            self.vlc.media_event_manager(media),
            self.vlc.media_player_event_manager(player),
        );
        let (media_events, player_events) = match managers {
            (Some(media_events), Some(player_events)) => (media_events, player_events),
            _ => {
                self.vlc.media_release(media);
                self.close();
                return Err(MediaError::NativeCall(
                    "event manager unavailable".to_string(),
                ));
            }
        };

        for event_type in MEDIA_EVENTS {
            self.attach(media_events, event_type);
        }
        for event_type in PLAYER_EVENTS {
            self.attach(player_events, event_type);
        }

        self.vlc.media_player_play(player);
        self.vlc.media_release(media);
        Ok(())
    }

    fn attach(&mut self, manager: EventManagerHandle, event_type: ffi::libvlc_event_type_t) {
        let result = self.vlc.event_attach(
            manager,
            event_type,
            Some(handle_event),
            self.context.as_opaque(),
        );
        if result == 0 {
            self.attached.push((manager, event_type));
        } else {
            log::warn!("Failed to attach to native event {:#x}", event_type);
        }
    }

    /// Tear down all media state. Safe to call with nothing open.
    fn close(&mut self) {
        let player = self.player.take();

        if let Some(link) = self.link.take() {
            link.invalidate();
        }

        if let Some(player) = player {
            for (manager, event_type) in self.attached.drain(..) {
                self.vlc.event_detach(
                    manager,
                    event_type,
                    Some(handle_event),
                    self.context.as_opaque(),
                );
            }
            self.vlc.media_player_stop(player);
            self.vlc.media_player_release(player);
        }
        self.attached.clear();

        self.context.buffer.lock().clear();
        self.context.events.clear();
        self.tracks.clear();
        self.tracks_initialized = false;
        self.media_url.clear();
        self.current_time = 0.0;

        if player.is_some() {
            self.closed_pending = true;
        }
    }

    fn take_closed(&mut self) -> bool {
        std::mem::take(&mut self.closed_pending)
    }

    // ── queries ──

    fn state(&self) -> Option<PlayerState> {
        self.player.map(|player| self.vlc.media_player_get_state(player))
    }

    fn is_playing(&self) -> bool {
        self.state() == Some(PlayerState::Playing)
    }

    fn is_paused(&self) -> bool {
        self.state() == Some(PlayerState::Paused)
    }

    fn is_ready(&self) -> bool {
        self.state().map_or(false, |state| state.is_ready())
    }

    fn is_seekable(&self) -> bool {
        self.player.map_or(false, |player| self.vlc.media_player_is_seekable(player))
    }

    fn rate(&self) -> f32 {
        match self.player {
            Some(player) if self.is_playing() => self.vlc.media_player_get_rate(player),
            _ => 0.0,
        }
    }

    fn duration(&self) -> Duration {
        self.player.map_or(Duration::ZERO, |player| {
            let length = self.vlc.media_player_get_length(player);
            Duration::from_millis(length.max(0) as u64)
        })
    }

    fn time(&self) -> Duration {
        if self.player.is_none() {
            return Duration::ZERO;
        }
        clock_duration(self.current_time)
    }

    // ── control ──

    fn seek(&mut self, time: Duration) -> Result<()> {
        let player = match self.player {
            Some(player) if self.is_ready() => player,
            _ => return Err(MediaError::InvalidState("player not ready".to_string())),
        };

        self.vlc.media_player_set_time(player, time.as_millis() as i64);
        self.current_time = time.as_secs_f32();
        Ok(())
    }

    fn set_rate(&mut self, rate: f32) -> Result<()> {
        let player = self
            .player
            .ok_or_else(|| MediaError::InvalidState("no media open".to_string()))?;

        if self.vlc.media_player_set_rate(player, rate) == -1 {
            return Err(self.native_error("rate rejected"));
        }

        self.desired_rate = rate;

        if is_nearly_zero(rate) {
            if self.is_playing() {
                self.vlc.media_player_pause(player);
            }
        } else if !self.is_playing() {
            self.vlc.media_player_play(player);
        }
        Ok(())
    }

    // ── per-frame update ──

    fn initialize_tracks(&mut self) {
        let (player, link) = match (self.player, self.link.clone()) {
            (Some(player), Some(link)) => (player, link),
            _ => return,
        };

        self.vlc.media_player_stop(player);

        match self.vlc.media_player_get_media(player) {
            Some(media) => self.vlc.media_release(media),
            None => return,
        }

        self.tracks = enumerate_tracks(&link);
        self.tracks_initialized = true;
        log::info!(
            "Initialized {} track(s) for {}",
            self.tracks.len(),
            self.media_url
        );
    }

    fn handle_ticker(&mut self, delta_seconds: f32) {
        if !self.tracks_initialized {
            self.initialize_tracks();
            return;
        }

        while let Some(event) = self.context.events.pop() {
            match event {
                EventKind::EndReached => {
                    log::debug!("End of media reached: {}", self.media_url);
                    if let Some(player) = self.player {
                        self.vlc.media_player_stop(player);
                    }
                    self.current_time = 0.0;

                    if self.should_loop && self.desired_rate != 0.0 {
                        let rate = self.desired_rate;
                        if let Err(e) = self.set_rate(rate) {
                            log::warn!("Failed to restart looping playback: {}", e);
                        }
                    }
                }
                // TODO: re-enumerate tracks once parsing reports new streams
                EventKind::Playing | EventKind::ParsedChanged => {}
                EventKind::Other(_) => continue,
            }
        }

        if self.is_playing() {
            self.current_time += self.rate() * delta_seconds;
            for track in &self.tracks {
                track.set_time(self.current_time);
            }
        }
    }
}

/// Media player backed by libvlc.
///
/// Registers itself with the host's [`Ticker`] on construction and
/// deregisters on drop; every tick drains native events and advances the
/// playback clock.
pub struct VlcMediaPlayer {
    inner: Arc<Mutex<PlayerInner>>,
    observers: ObserverList,
    ticker: Ticker,
    ticker_handle: TickerHandle,
}

impl VlcMediaPlayer {
    pub fn new(vlc: Arc<dyn LibVlc>, ticker: &Ticker) -> Self {
        let inner = Arc::new(Mutex::new(PlayerInner::new(vlc)));

        let weak: Weak<Mutex<PlayerInner>> = Arc::downgrade(&inner);
        let ticker_handle = ticker.add(move |delta_seconds| {
            if let Some(inner) = weak.upgrade() {
                inner.lock().handle_ticker(delta_seconds);
            }
            true
        });

        Self {
            inner,
            observers: ObserverList::new(),
            ticker: ticker.clone(),
            ticker_handle,
        }
    }

    /// Create a player on a fresh libvlc instance.
    #[cfg(feature = "link")]
    pub fn from_config(config: &vlcmedia_libvlc::VlcConfig, ticker: &Ticker) -> Result<Self> {
        let vlc = vlcmedia_libvlc::LinkedVlc::new(config)?;
        Ok(Self::new(Arc::new(vlc), ticker))
    }

    /// Run one frame of event processing directly.
    pub fn tick(&self, delta_seconds: f32) {
        self.inner.lock().handle_ticker(delta_seconds);
    }

    /// Observers run with the inner lock released so they may query the player.
    fn notify_closed(&self, closed: bool) {
        if closed {
            log::info!("Closed media");
            self.observers.broadcast(MediaEvent::Closed);
        }
    }

    fn finish_open(&self, result: Result<()>, url: &str) -> bool {
        match result {
            Ok(()) => {
                log::info!("Opened {}", url);
                self.observers.broadcast(MediaEvent::Opened(url.to_string()));
                true
            }
            Err(e) => {
                log::warn!("Failed to open {}: {}", url, e);
                false
            }
        }
    }
}

impl Drop for VlcMediaPlayer {
    fn drop(&mut self) {
        self.close();
        self.ticker.remove(self.ticker_handle);
    }
}

impl MediaInfo for VlcMediaPlayer {
    fn duration(&self) -> Duration {
        self.inner.lock().duration()
    }

    fn supported_rates(&self, _direction: PlaybackDirection, _unthinned: bool) -> RateRange {
        RateRange::single(1.0)
    }

    fn url(&self) -> String {
        self.inner.lock().media_url.clone()
    }

    fn supports_rate(&self, rate: f32, _unthinned: bool) -> bool {
        rate == 1.0
    }

    fn supports_scrubbing(&self) -> bool {
        self.inner.lock().is_seekable()
    }

    fn supports_seeking(&self) -> bool {
        self.inner.lock().is_seekable()
    }
}

impl MediaPlayer for VlcMediaPlayer {
    fn open(&mut self, url: &str) -> bool {
        let mut inner = self.inner.lock();
        let result = inner.open_url(url);
        let closed = inner.take_closed();
        drop(inner);

        self.notify_closed(closed);
        self.finish_open(result, url)
    }

    fn open_buffer(&mut self, buffer: Arc<Vec<u8>>, original_url: &str) -> bool {
        let mut inner = self.inner.lock();
        let result = inner.open_buffer(buffer, original_url);
        let closed = inner.take_closed();
        drop(inner);

        self.notify_closed(closed);
        self.finish_open(result, original_url)
    }

    fn close(&mut self) {
        let mut inner = self.inner.lock();
        inner.close();
        let closed = inner.take_closed();
        drop(inner);

        self.notify_closed(closed);
    }

    fn rate(&self) -> f32 {
        self.inner.lock().rate()
    }

    fn time(&self) -> Duration {
        self.inner.lock().time()
    }

    fn tracks(&self) -> Vec<TrackRef> {
        self.inner
            .lock()
            .tracks
            .iter()
            .map(|track| track.clone() as TrackRef)
            .collect()
    }

    fn is_looping(&self) -> bool {
        self.inner.lock().should_loop
    }

    fn is_paused(&self) -> bool {
        self.inner.lock().is_paused()
    }

    fn is_playing(&self) -> bool {
        self.inner.lock().is_playing()
    }

    fn is_ready(&self) -> bool {
        self.inner.lock().is_ready()
    }

    fn seek(&mut self, time: Duration) -> bool {
        match self.inner.lock().seek(time) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("Seek to {:?} refused: {}", time, e);
                false
            }
        }
    }

    fn set_looping(&mut self, looping: bool) -> bool {
        self.inner.lock().should_loop = looping;
        true
    }

    fn set_rate(&mut self, rate: f32) -> bool {
        match self.inner.lock().set_rate(rate) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to set rate {}: {}", rate, e);
                false
            }
        }
    }

    fn observers(&self) -> &ObserverList {
        &self.observers
    }
}
