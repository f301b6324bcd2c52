// Adapter behaviour against the scripted libvlc

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use vlcmedia_core::{
    MediaEvent, MediaInfo, MediaObserver, MediaPlayer, PlaybackDirection, PlayerState, RateRange,
    Ticker, TrackKind,
};
use vlcmedia_libvlc::{ffi, MediaSource, MockVlc, PlayerHandle, TrackSpec};
use vlcmedia_player::VlcMediaPlayer;

fn setup() -> (Arc<MockVlc>, Ticker, VlcMediaPlayer) {
    let _ = env_logger::builder().is_test(true).try_init();
    let vlc = Arc::new(MockVlc::new());
    let ticker = Ticker::new();
    let player = VlcMediaPlayer::new(vlc.clone(), &ticker);
    (vlc, ticker, player)
}

fn native_player(vlc: &MockVlc) -> PlayerHandle {
    vlc.last_player().expect("a native player was created")
}

fn recorder(player: &VlcMediaPlayer) -> Arc<Mutex<Vec<MediaEvent>>> {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let observer: Arc<dyn MediaObserver> = Arc::new(move |event: &MediaEvent| {
        sink.lock().push(event.clone());
    });
    player.observers().subscribe(observer);
    events
}

/// Open, then run the first frame so tracks get enumerated.
fn open_and_initialize(vlc: &MockVlc, ticker: &Ticker, player: &mut VlcMediaPlayer) {
    assert!(player.open("file:///movies/clip.mp4"));
    ticker.tick(0.0);
    assert_eq!(vlc.call_count("audio_description"), 1);
}

#[test]
fn test_open_empty_url_fails() {
    let (vlc, _ticker, mut player) = setup();
    let events = recorder(&player);

    assert!(!player.open(""));
    assert_eq!(player.url(), "");
    assert!(vlc.last_media().is_none());
    assert!(events.lock().is_empty());
}

#[test]
fn test_invalid_open_keeps_current_media() {
    let (vlc, _ticker, mut player) = setup();
    assert!(player.open("file:///a.mp4"));
    let native = native_player(&vlc);
    let media = vlc.last_media().unwrap();
    let events = recorder(&player);

    assert!(!player.open(""));
    assert!(!player.open_buffer(Arc::new(Vec::new()), "x"));
    assert!(!player.open_buffer(Arc::new(vec![1, 2, 3]), ""));

    assert_eq!(player.url(), "file:///a.mp4");
    assert!(!vlc.player_released(native));
    assert_eq!(vlc.last_media(), Some(media));
    assert_eq!(vlc.call_count("player_release"), 0);
    assert!(player.is_playing());
    assert!(events.lock().is_empty());
}

#[test]
fn test_open_url_with_scheme_uses_location() {
    let (vlc, _ticker, mut player) = setup();
    assert!(player.open("http://example.com/stream.mp4"));

    let media = vlc.last_media().unwrap();
    assert_eq!(
        vlc.media_source(media),
        Some(MediaSource::Location("http://example.com/stream.mp4".to_string()))
    );
    assert_eq!(player.url(), "http://example.com/stream.mp4");
    assert!(player.is_playing());

    // only the player keeps the media alive
    assert_eq!(vlc.media_refs(media), 1);
    assert_eq!(vlc.listener_count(native_player(&vlc)), 3);
}

#[test]
fn test_open_plain_path_uses_path() {
    let (vlc, _ticker, mut player) = setup();
    assert!(player.open("/movies/clip.mp4"));

    let media = vlc.last_media().unwrap();
    assert_eq!(
        vlc.media_source(media),
        Some(MediaSource::Path("/movies/clip.mp4".to_string()))
    );
}

#[test]
fn test_open_url_with_nul_fails() {
    let (vlc, _ticker, mut player) = setup();
    assert!(!player.open("file:///a\0b.mp4"));
    assert!(vlc.last_media().is_none());
}

#[test]
fn test_player_creation_failure_releases_media() {
    let (vlc, _ticker, mut player) = setup();
    vlc.fail_player_new(true);

    assert!(!player.open("file:///movies/clip.mp4"));
    let media = vlc.last_media().unwrap();
    assert_eq!(vlc.media_refs(media), 0);
    assert_eq!(player.url(), "");
    assert!(!player.is_ready());
}

#[test]
fn test_media_creation_failure() {
    let (vlc, _ticker, mut player) = setup();
    vlc.fail_media_new(true);

    assert!(!player.open("file:///movies/clip.mp4"));
    assert!(vlc.last_player().is_none());
    assert_eq!(player.url(), "");
}

#[test]
fn test_event_manager_failure_tears_down_player() {
    let (vlc, _ticker, mut player) = setup();
    vlc.fail_event_manager(true);

    assert!(!player.open("file:///movies/clip.mp4"));
    let native = native_player(&vlc);
    assert!(vlc.player_released(native));
    assert_eq!(vlc.media_refs(vlc.last_media().unwrap()), 0);
    assert_eq!(player.url(), "");
}

#[test]
fn test_close_resets_everything() {
    let (vlc, ticker, mut player) = setup();
    vlc.set_tracks(vec![TrackSpec::new(1, "English")], Vec::new(), Vec::new());
    open_and_initialize(&vlc, &ticker, &mut player);
    let native = native_player(&vlc);
    let media = vlc.last_media().unwrap();
    assert_eq!(player.tracks().len(), 1);

    player.close();
    assert!(vlc.player_released(native));
    assert_eq!(vlc.media_refs(media), 0);
    assert_eq!(vlc.listener_count(native), 0);
    assert_eq!(player.url(), "");
    assert_eq!(player.time(), Duration::ZERO);
    assert_eq!(player.duration(), Duration::ZERO);
    assert_eq!(player.rate(), 0.0);
    assert!(player.tracks().is_empty());
    assert!(!player.is_ready());

    // second close is a no-op
    vlc.clear_calls();
    player.close();
    assert!(vlc.calls().is_empty());
}

#[test]
fn test_tracks_outlive_close_safely() {
    let (vlc, ticker, mut player) = setup();
    vlc.set_tracks(
        vec![TrackSpec::disable(), TrackSpec::new(1, "English")],
        Vec::new(),
        Vec::new(),
    );
    open_and_initialize(&vlc, &ticker, &mut player);
    let track = player.tracks().remove(0);
    assert!(track.is_enabled());

    player.close();
    assert!(!track.is_enabled());
    assert!(!track.set_enabled(true));
}

#[test]
fn test_observers_see_open_and_close() {
    let (_vlc, _ticker, mut player) = setup();
    let events = recorder(&player);

    assert!(player.open("file:///a.mp4"));
    assert!(player.open("file:///b.mp4"));
    player.close();
    player.close();

    assert_eq!(
        *events.lock(),
        vec![
            MediaEvent::Opened("file:///a.mp4".to_string()),
            MediaEvent::Closed,
            MediaEvent::Opened("file:///b.mp4".to_string()),
            MediaEvent::Closed,
        ]
    );
}

#[test]
fn test_reopen_releases_previous_player() {
    let (vlc, _ticker, mut player) = setup();
    assert!(player.open("file:///a.mp4"));
    let first = native_player(&vlc);

    assert!(player.open("file:///b.mp4"));
    let second = native_player(&vlc);
    assert_ne!(first, second);
    assert!(vlc.player_released(first));
    assert!(!vlc.player_released(second));
    assert_eq!(player.url(), "file:///b.mp4");
}

#[test]
fn test_first_tick_initializes_tracks_once() {
    let (vlc, ticker, mut player) = setup();
    vlc.set_tracks(
        vec![
            TrackSpec::disable(),
            TrackSpec::new(1, "English"),
            TrackSpec::new(2, "French"),
        ],
        vec![TrackSpec::disable(), TrackSpec::new(3, "Subtitles")],
        vec![TrackSpec::new(0, "Main")],
    );
    assert!(player.open("file:///movies/clip.mp4"));
    assert!(player.tracks().is_empty());

    ticker.tick(0.016);
    let tracks = player.tracks();
    let kinds: Vec<(usize, TrackKind, String)> = tracks
        .iter()
        .map(|t| (t.index(), t.kind(), t.name()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (0, TrackKind::Audio, "English".to_string()),
            (1, TrackKind::Audio, "French".to_string()),
            (2, TrackKind::Caption, "Subtitles".to_string()),
            (3, TrackKind::Video, "Main".to_string()),
        ]
    );

    // initialization stops playback until the host asks for a rate
    assert_eq!(
        vlc.player_state(native_player(&vlc)),
        Some(PlayerState::Stopped)
    );
    assert!(player.is_ready());

    ticker.tick(0.016);
    ticker.tick(0.016);
    assert_eq!(vlc.call_count("audio_description"), 1);
    assert_eq!(vlc.call_count("spu_description"), 1);
    assert_eq!(vlc.call_count("video_description"), 1);
    assert_eq!(vlc.live_list_count(), 0);
    assert_eq!(vlc.bad_list_releases(), 0);
}

#[test]
fn test_media_without_tracks_initializes_once() {
    let (vlc, ticker, mut player) = setup();
    open_and_initialize(&vlc, &ticker, &mut player);
    assert!(player.tracks().is_empty());

    ticker.tick(0.016);
    assert_eq!(vlc.call_count("audio_description"), 1);
}

#[test]
fn test_seek_requires_ready_player() {
    let (vlc, _ticker, mut player) = setup();
    assert!(!player.seek(Duration::from_secs(5)));

    assert!(player.open("file:///movies/clip.mp4"));
    let native = native_player(&vlc);
    vlc.set_state(native, PlayerState::Opening);
    assert!(!player.seek(Duration::from_secs(5)));
    assert_eq!(player.time(), Duration::ZERO);
    assert_eq!(vlc.call_count("set_time"), 0);

    vlc.set_state(native, PlayerState::Paused);
    assert!(player.seek(Duration::from_millis(5_500)));
    assert_eq!(player.time(), Duration::from_millis(5_500));
    assert_eq!(vlc.player_time(native), Some(5_500));
}

#[test]
fn test_refused_seek_keeps_clock() {
    let (vlc, ticker, mut player) = setup();
    open_and_initialize(&vlc, &ticker, &mut player);
    let native = native_player(&vlc);

    assert!(player.set_rate(1.0));
    ticker.tick(0.5);
    assert_eq!(player.time(), Duration::from_millis(500));

    vlc.set_state(native, PlayerState::Opening);
    assert!(!player.seek(Duration::from_secs(10)));
    assert_eq!(player.time(), Duration::from_millis(500));
    assert_eq!(vlc.call_count("set_time"), 0);
}

#[test]
fn test_rate_controls_pause_and_resume() {
    let (vlc, ticker, mut player) = setup();
    open_and_initialize(&vlc, &ticker, &mut player);
    assert!(!player.is_playing());
    assert_eq!(player.rate(), 0.0);

    assert!(player.set_rate(1.0));
    assert!(player.is_playing());
    assert_eq!(player.rate(), 1.0);

    assert!(player.set_rate(0.0));
    assert!(player.is_paused());
    assert_eq!(player.rate(), 0.0);

    assert!(player.set_rate(1.0));
    assert!(player.is_playing());
}

#[test]
fn test_rejected_rate_fails() {
    let (vlc, ticker, mut player) = setup();
    assert!(!player.set_rate(1.0));

    open_and_initialize(&vlc, &ticker, &mut player);
    vlc.reject_rate(true);
    assert!(!player.set_rate(2.0));
    assert_eq!(vlc.call_count("play"), 1);
}

#[test]
fn test_clock_advances_while_playing() {
    let (vlc, ticker, mut player) = setup();
    vlc.set_tracks(vec![TrackSpec::new(1, "English")], Vec::new(), Vec::new());
    open_and_initialize(&vlc, &ticker, &mut player);

    // stopped: no advance
    ticker.tick(1.0);
    assert_eq!(player.time(), Duration::ZERO);

    assert!(player.set_rate(1.0));
    ticker.tick(0.5);
    ticker.tick(0.25);
    assert_eq!(player.time(), Duration::from_millis(750));
    assert_eq!(player.tracks()[0].time(), Duration::from_millis(750));

    assert!(player.set_rate(0.0));
    ticker.tick(1.0);
    assert_eq!(player.time(), Duration::from_millis(750));
}

#[test]
fn test_end_reached_loops_at_desired_rate() {
    let (vlc, ticker, mut player) = setup();
    open_and_initialize(&vlc, &ticker, &mut player);
    let native = native_player(&vlc);

    assert!(player.set_looping(true));
    assert!(player.is_looping());
    assert!(player.set_rate(1.0));
    ticker.tick(2.0);
    assert_eq!(player.time(), Duration::from_secs(2));

    vlc.fire_player_event(native, ffi::libvlc_MediaPlayerEndReached);
    ticker.tick(0.0);
    assert_eq!(player.time(), Duration::ZERO);
    assert!(player.is_playing());
    assert_eq!(vlc.call_count("stop"), 2);
}

#[test]
fn test_end_reached_without_looping_stops() {
    let (vlc, ticker, mut player) = setup();
    open_and_initialize(&vlc, &ticker, &mut player);
    let native = native_player(&vlc);

    assert!(player.set_rate(1.0));
    ticker.tick(1.0);
    vlc.fire_player_event(native, ffi::libvlc_MediaPlayerEndReached);
    ticker.tick(1.0);

    assert_eq!(player.time(), Duration::ZERO);
    assert!(!player.is_playing());
    assert!(player.is_ready());
}

#[test]
fn test_events_from_native_thread() {
    let (vlc, ticker, mut player) = setup();
    open_and_initialize(&vlc, &ticker, &mut player);
    let native = native_player(&vlc);
    let media = vlc.last_media().unwrap();
    assert!(player.set_rate(1.0));

    let remote = vlc.clone();
    thread::spawn(move || {
        remote.fire_media_event(media, ffi::libvlc_MediaParsedChanged);
        remote.fire_player_event(native, ffi::libvlc_MediaPlayerPlaying);
        remote.fire_player_event(native, ffi::libvlc_MediaPlayerEndReached);
    })
    .join()
    .unwrap();

    ticker.tick(0.0);
    assert_eq!(player.time(), Duration::ZERO);
    assert!(!player.is_playing());
}

#[test]
fn test_open_buffer_serves_bytes() {
    let (vlc, _ticker, mut player) = setup();
    let bytes: Vec<u8> = (0..100).collect();
    assert!(player.open_buffer(Arc::new(bytes), "file:///movies/clip.mp4"));
    assert_eq!(player.url(), "file:///movies/clip.mp4");

    let media = vlc.last_media().unwrap();
    assert_eq!(vlc.media_source(media), Some(MediaSource::Callbacks));

    assert_eq!(vlc.io_open(media), Some((0, 100)));
    assert_eq!(vlc.io_seek(media, 60), Some(0));
    let (count, data) = vlc.io_read(media, 150).unwrap();
    assert_eq!(count, 40);
    assert_eq!(data[0], 60);
    assert_eq!(data[39], 99);
    assert_eq!(vlc.io_seek(media, 100), Some(-1));

    // libvlc may reopen the stream after closing it
    assert!(vlc.io_close(media));
    assert_eq!(vlc.io_open(media), Some((0, 100)));
    assert_eq!(vlc.io_read(media, 10).unwrap().0, 10);
}

#[test]
fn test_open_buffer_rejects_empty_input() {
    let (vlc, _ticker, mut player) = setup();
    assert!(!player.open_buffer(Arc::new(Vec::new()), "file:///a.mp4"));
    assert!(!player.open_buffer(Arc::new(vec![1, 2, 3]), ""));
    assert!(vlc.last_media().is_none());
    assert_eq!(player.url(), "");
}

#[test]
fn test_close_runs_buffer_close_callback() {
    let (vlc, _ticker, mut player) = setup();
    assert!(player.open_buffer(Arc::new(vec![0u8; 32]), "memory://clip"));
    let media = vlc.last_media().unwrap();
    assert_eq!(vlc.io_open(media), Some((0, 32)));

    player.close();
    assert_eq!(vlc.media_refs(media), 0);
    // the close callback consumed the stream handle
    assert!(!vlc.io_close(media));
}

#[test]
fn test_media_info_defaults() {
    let (vlc, _ticker, mut player) = setup();
    assert_eq!(
        player.supported_rates(PlaybackDirection::Forward, false),
        RateRange::new(1.0, 1.0)
    );
    assert!(player.supports_rate(1.0, true));
    assert!(!player.supports_rate(2.0, false));
    assert!(!player.supports_seeking());

    vlc.set_default_length(90_500);
    assert!(player.open("file:///movies/clip.mp4"));
    assert_eq!(player.duration(), Duration::from_millis(90_500));
    assert!(player.supports_seeking());
    assert!(player.supports_scrubbing());
}

#[test]
fn test_drop_deregisters_ticker() {
    let (vlc, ticker, mut player) = setup();
    assert!(player.open("file:///movies/clip.mp4"));
    let native = native_player(&vlc);
    assert_eq!(ticker.len(), 1);

    drop(player);
    assert!(ticker.is_empty());
    assert!(vlc.player_released(native));
    ticker.tick(0.016);
}

#[test]
fn test_ticker_drives_multiple_players() {
    let (vlc, ticker, mut first) = setup();
    let mut second = VlcMediaPlayer::new(vlc.clone(), &ticker);
    assert_eq!(ticker.len(), 2);

    assert!(first.open("file:///a.mp4"));
    assert!(second.open("file:///b.mp4"));
    ticker.tick(0.0);
    assert!(first.set_rate(1.0));
    ticker.tick(1.0);

    assert_eq!(first.time(), Duration::from_secs(1));
    assert_eq!(second.time(), Duration::ZERO);
}
