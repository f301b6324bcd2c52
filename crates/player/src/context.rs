// State shared with libvlc's threads through the opaque callback pointer

use crate::events::{EventKind, EventQueue};
use parking_lot::Mutex;
use std::os::raw::{c_int, c_uchar, c_void};
use std::sync::Arc;
use vlcmedia_libvlc::{ffi, MediaCallbacks};

/// In-memory media bytes and the read cursor libvlc advances
#[derive(Default)]
pub struct MediaBuffer {
    data: Option<Arc<Vec<u8>>>,
    position: usize,
}

impl MediaBuffer {
    /// Install a new buffer and rewind.
    pub fn set(&mut self, data: Arc<Vec<u8>>) {
        self.data = Some(data);
        self.position = 0;
    }

    /// Drop the buffer and rewind.
    pub fn clear(&mut self) {
        self.data = None;
        self.position = 0;
    }

    pub fn is_set(&self) -> bool {
        self.data.is_some()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Playback of the buffer (re)starts: rewind and report its size.
    pub fn open(&mut self) -> u64 {
        self.position = 0;
        self.data.as_ref().map_or(0, |data| data.len() as u64)
    }

    /// Copy up to `out.len()` bytes from the cursor.
    /// Returns -1 without a buffer and 0 at the end.
    pub fn read(&mut self, out: &mut [u8]) -> isize {
        let data = match &self.data {
            Some(data) => data,
            None => return -1,
        };

        let remaining = data.len().saturating_sub(self.position);
        let count = out.len().min(remaining);
        if count > 0 {
            out[..count].copy_from_slice(&data[self.position..self.position + count]);
            self.position += count;
        }
        count as isize
    }

    /// Move the cursor. Offsets at or past the end are rejected with -1.
    pub fn seek(&mut self, offset: u64) -> c_int {
        match &self.data {
            Some(data) if offset < data.len() as u64 => {
                self.position = offset as usize;
                0
            }
            _ => -1,
        }
    }

    /// libvlc finished with the stream; the bytes stay until the player closes.
    pub fn rewind(&mut self) {
        self.position = 0;
    }
}

/// Context handed to libvlc as `user_data` / `opaque`.
///
/// Owned by the adapter through an `Arc` for the adapter's whole lifetime,
/// so the pointer outlives every native player it is registered with.
#[derive(Default)]
pub struct CallbackContext {
    pub events: EventQueue,
    pub buffer: Mutex<MediaBuffer>,
}

impl CallbackContext {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn as_opaque(self: &Arc<Self>) -> *mut c_void {
        Arc::as_ptr(self) as *mut c_void
    }

    pub fn media_callbacks() -> MediaCallbacks {
        MediaCallbacks {
            open: Some(handle_media_open),
            read: Some(handle_media_read),
            seek: Some(handle_media_seek),
            close: Some(handle_media_close),
        }
    }

    /// # Safety
    /// `opaque` must come from `as_opaque` on a context that is still alive.
    unsafe fn from_opaque<'a>(opaque: *mut c_void) -> Option<&'a CallbackContext> {
        (opaque as *const CallbackContext).as_ref()
    }
}

pub(crate) unsafe extern "C" fn handle_event(
    event: *const ffi::libvlc_event_t,
    user_data: *mut c_void,
) {
    let (event, context) = match (event.as_ref(), CallbackContext::from_opaque(user_data)) {
        (Some(event), Some(context)) => (event, context),
        _ => return,
    };
    let kind = EventKind::from_raw(event.type_);
    log::debug!("Native event {:?}", kind);
    context.events.push(kind);
}

unsafe extern "C" fn handle_media_open(
    opaque: *mut c_void,
    datap: *mut *mut c_void,
    sizep: *mut u64,
) -> c_int {
    let context = match CallbackContext::from_opaque(opaque) {
        Some(context) => context,
        None => return -1,
    };
    if datap.is_null() || sizep.is_null() {
        return -1;
    }

    // read/seek/close receive *datap, so keep routing them to the context
    *datap = opaque;
    *sizep = context.buffer.lock().open();
    0
}

unsafe extern "C" fn handle_media_read(
    opaque: *mut c_void,
    buf: *mut c_uchar,
    len: usize,
) -> isize {
    let context = match CallbackContext::from_opaque(opaque) {
        Some(context) => context,
        None => return -1,
    };
    if buf.is_null() {
        return -1;
    }
    let out = std::slice::from_raw_parts_mut(buf, len);
    context.buffer.lock().read(out)
}

unsafe extern "C" fn handle_media_seek(opaque: *mut c_void, offset: u64) -> c_int {
    match CallbackContext::from_opaque(opaque) {
        Some(context) => context.buffer.lock().seek(offset),
        None => -1,
    }
}

unsafe extern "C" fn handle_media_close(opaque: *mut c_void) {
    if let Some(context) = CallbackContext::from_opaque(opaque) {
        context.buffer.lock().rewind();
    }
}
