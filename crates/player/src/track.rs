// Audio, caption and video tracks discovered on the native player

use crate::player::clock_duration;
use parking_lot::{Mutex, RwLock};
use std::ffi::CStr;
use std::os::raw::c_int;
use std::sync::Arc;
use std::time::Duration;
use vlcmedia_core::{MediaTrack, TrackKind};
use vlcmedia_libvlc::{ffi, LibVlc, PlayerHandle};

/// Sentinel id of the "Disable" entry in description lists
const DISABLED_ID: c_int = -1;

/// Shared back-reference from tracks to the native player.
///
/// The adapter invalidates it before releasing the player, after which
/// track queries fall back to their defaults.
pub struct PlayerLink {
    vlc: Arc<dyn LibVlc>,
    handle: RwLock<Option<PlayerHandle>>,
}

impl PlayerLink {
    pub fn new(vlc: Arc<dyn LibVlc>, handle: PlayerHandle) -> Arc<Self> {
        Arc::new(Self {
            vlc,
            handle: RwLock::new(Some(handle)),
        })
    }

    /// Run `f` against the player if it has not been released.
    pub fn with<R>(&self, f: impl FnOnce(&dyn LibVlc, PlayerHandle) -> R) -> Option<R> {
        let handle = self.handle.read();
        (*handle).map(|player| f(self.vlc.as_ref(), player))
    }

    /// Detach from the player, waiting out in-flight track calls.
    pub fn invalidate(&self) -> Option<PlayerHandle> {
        self.handle.write().take()
    }
}

/// One selectable stream of the opened media
pub struct VlcMediaTrack {
    link: Arc<PlayerLink>,
    index: usize,
    kind: TrackKind,
    id: c_int,
    name: String,
    time: Mutex<f32>,
}

impl VlcMediaTrack {
    pub fn new(
        link: Arc<PlayerLink>,
        index: usize,
        kind: TrackKind,
        id: c_int,
        name: String,
    ) -> Self {
        Self {
            link,
            index,
            kind,
            id,
            name,
            time: Mutex::new(0.0),
        }
    }

    /// Native track id
    pub fn id(&self) -> c_int {
        self.id
    }

    pub(crate) fn set_time(&self, seconds: f32) {
        *self.time.lock() = seconds;
    }

    fn selected_id(&self) -> Option<c_int> {
        self.link.with(|vlc, player| match self.kind {
            TrackKind::Audio => vlc.audio_get_track(player),
            TrackKind::Caption => vlc.video_get_spu(player),
            TrackKind::Video => vlc.video_get_track(player),
        })
    }

    fn select(&self, id: c_int) -> bool {
        self.link
            .with(|vlc, player| match self.kind {
                TrackKind::Audio => vlc.audio_set_track(player, id),
                TrackKind::Caption => vlc.video_set_spu(player, id),
                TrackKind::Video => vlc.video_set_track(player, id),
            })
            .map_or(false, |result| result == 0)
    }
}

impl MediaTrack for VlcMediaTrack {
    fn index(&self) -> usize {
        self.index
    }

    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn name(&self) -> String {
        self.name.clone()
    }

    fn is_enabled(&self) -> bool {
        self.selected_id() == Some(self.id)
    }

    fn set_enabled(&self, enabled: bool) -> bool {
        if enabled {
            return self.select(self.id);
        }
        if !self.is_enabled() {
            return true;
        }
        self.select(DISABLED_ID)
    }

    fn time(&self) -> Duration {
        clock_duration(*self.time.lock())
    }
}

/// Walk the player's audio, caption and video description lists.
///
/// Sentinel entries are skipped; indices run across all kinds in traversal
/// order. Each list is released through its own head.
pub fn enumerate_tracks(link: &Arc<PlayerLink>) -> Vec<Arc<VlcMediaTrack>> {
    let mut tracks = Vec::new();

    for kind in [TrackKind::Audio, TrackKind::Caption, TrackKind::Video] {
        link.with(|vlc, player| {
            let head = match kind {
                TrackKind::Audio => vlc.audio_get_track_description(player),
                TrackKind::Caption => vlc.video_get_spu_description(player),
                TrackKind::Video => vlc.video_get_track_description(player),
            };

            let mut node = head;
            while let Some(description) = unsafe { node.as_ref() } {
                if description.i_id != DISABLED_ID {
                    let track = VlcMediaTrack::new(
                        link.clone(),
                        tracks.len(),
                        kind,
                        description.i_id,
                        description_name(description),
                    );
                    tracks.push(Arc::new(track));
                }
                node = description.p_next;
            }

            vlc.track_description_list_release(head);
        });
    }

    log::debug!("Enumerated {} track(s)", tracks.len());
    tracks
}

fn description_name(description: &ffi::libvlc_track_description_t) -> String {
    if description.psz_name.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(description.psz_name) }
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;
    use vlcmedia_libvlc::{MockVlc, TrackSpec};

    fn open_player(vlc: &Arc<MockVlc>) -> PlayerHandle {
        let media = vlc
            .media_new_location(&CString::new("file:///a.mp4").unwrap())
            .unwrap();
        vlc.media_player_new_from_media(media).unwrap()
    }

    #[test]
    fn test_indices_span_all_kinds() {
        let vlc = Arc::new(MockVlc::new());
        vlc.set_tracks(
            vec![
                TrackSpec::disable(),
                TrackSpec::new(1, "English"),
                TrackSpec::new(2, "French"),
            ],
            vec![TrackSpec::disable(), TrackSpec::new(3, "Subtitles")],
            vec![TrackSpec::new(0, "Video")],
        );
        let player = open_player(&vlc);
        let link = PlayerLink::new(vlc.clone(), player);

        let tracks = enumerate_tracks(&link);
        let summary: Vec<(usize, TrackKind, c_int)> =
            tracks.iter().map(|t| (t.index(), t.kind(), t.id())).collect();
        assert_eq!(
            summary,
            vec![
                (0, TrackKind::Audio, 1),
                (1, TrackKind::Audio, 2),
                (2, TrackKind::Caption, 3),
                (3, TrackKind::Video, 0),
            ]
        );
        assert_eq!(tracks[2].name(), "Subtitles");

        // every list released once, through its own head
        assert_eq!(vlc.live_list_count(), 0);
        assert_eq!(vlc.released_list_count(), 3);
        assert_eq!(vlc.bad_list_releases(), 0);
    }

    #[test]
    fn test_enable_and_disable() {
        let vlc = Arc::new(MockVlc::new());
        vlc.set_tracks(
            vec![TrackSpec::disable(), TrackSpec::new(1, "A"), TrackSpec::new(2, "B")],
            Vec::new(),
            Vec::new(),
        );
        let player = open_player(&vlc);
        let link = PlayerLink::new(vlc.clone(), player);
        let tracks = enumerate_tracks(&link);

        assert!(tracks[0].is_enabled());
        assert!(!tracks[1].is_enabled());

        assert!(tracks[1].set_enabled(true));
        assert!(tracks[1].is_enabled());
        assert!(!tracks[0].is_enabled());

        // disabling an unselected track leaves the selection alone
        assert!(tracks[0].set_enabled(false));
        assert!(tracks[1].is_enabled());

        assert!(tracks[1].set_enabled(false));
        assert_eq!(vlc.audio_get_track(player), -1);
    }

    #[test]
    fn test_invalidated_link_defaults() {
        let vlc = Arc::new(MockVlc::new());
        vlc.set_tracks(vec![TrackSpec::new(1, "A")], Vec::new(), Vec::new());
        let player = open_player(&vlc);
        let link = PlayerLink::new(vlc.clone(), player);
        let tracks = enumerate_tracks(&link);

        assert_eq!(link.invalidate(), Some(player));
        assert!(!tracks[0].is_enabled());
        assert!(!tracks[0].set_enabled(true));
        assert!(enumerate_tracks(&link).is_empty());
    }
}
