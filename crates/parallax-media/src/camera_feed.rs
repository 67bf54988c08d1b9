use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use parallax_common::CameraConfig;
use parallax_render::{Image, ImageFormat, TextureFlags, TextureId, TextureStorage};
use tracing::{debug, info, trace, warn};

use crate::{
    BufferState, FeedDataType, FeedPosition, FramePlanes, MediaError, MediaResult, Plane, Slot,
};

static NEXT_FEED_ID: AtomicU32 = AtomicU32::new(1);

/// Device-specific hooks run when a feed is switched on or off.
pub trait FeedDevice: Send {
    /// Start the capture device. The feed only becomes active on `Ok`.
    fn activate(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn deactivate(&mut self) {}
}

/// Device with nothing to start or stop.
pub struct NullDevice;

impl FeedDevice for NullDevice {}

struct FeedInner {
    name: String,
    position: FeedPosition,
    active: bool,
    datatype: FeedDataType,
    base_width: u32,
    base_height: u32,
    state: BufferState,
    device: Box<dyn FeedDevice>,
}

/// Double-buffered camera feed.
///
/// A capture source pushes frames with [`CameraFeed::set_rgb_image`] /
/// [`CameraFeed::set_ycbcr_images`] (or [`CameraFeed::begin_write`] followed
/// by [`CameraFeed::commit_frame`]) while the renderer polls
/// [`CameraFeed::read_texture`]. The renderer never sees a slot that is being
/// written; a producer that finds no free slot must drop or hold its frame.
pub struct CameraFeed {
    id: u32,
    storage: Arc<dyn TextureStorage>,
    textures: [[TextureId; 2]; 2],
    inner: Mutex<FeedInner>,
}

impl CameraFeed {
    pub fn new(
        name: impl Into<String>,
        position: FeedPosition,
        storage: Arc<dyn TextureStorage>,
    ) -> MediaResult<Self> {
        Self::with_device(name, position, storage, Box::new(NullDevice))
    }

    pub fn from_config(config: &CameraConfig, storage: Arc<dyn TextureStorage>) -> MediaResult<Self> {
        Self::new(config.feed_name.clone(), config.position.into(), storage)
    }

    pub fn with_device(
        name: impl Into<String>,
        position: FeedPosition,
        storage: Arc<dyn TextureStorage>,
        device: Box<dyn FeedDevice>,
    ) -> MediaResult<Self> {
        let textures = create_textures(storage.as_ref())?;
        let id = NEXT_FEED_ID.fetch_add(1, Ordering::Relaxed);
        let name = name.into();
        debug!(feed = id, name = %name, "camera feed created");

        Ok(Self {
            id,
            storage,
            textures,
            inner: Mutex::new(FeedInner {
                name,
                position,
                active: false,
                datatype: FeedDataType::NoImage,
                base_width: 0,
                base_height: 0,
                state: BufferState::INITIAL,
                device,
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, FeedInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> String {
        self.lock().name.clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        self.lock().name = name.into();
    }

    pub fn position(&self) -> FeedPosition {
        self.lock().position
    }

    pub fn set_position(&self, position: FeedPosition) {
        self.lock().position = position;
    }

    pub fn datatype(&self) -> FeedDataType {
        self.lock().datatype
    }

    pub fn state(&self) -> BufferState {
        self.lock().state
    }

    /// Dimensions the backing textures were last allocated with.
    pub fn base_size(&self) -> (u32, u32) {
        let inner = self.lock();
        (inner.base_width, inner.base_height)
    }

    /// Raw handle for `slot`/`plane`, regardless of buffer state.
    pub fn texture(&self, slot: Slot, plane: Plane) -> TextureId {
        self.textures[slot.index()][plane.index()]
    }

    pub fn is_active(&self) -> bool {
        self.lock().active
    }

    /// Switch the feed on or off.
    ///
    /// Turning on runs the device's activation hook and only marks the feed
    /// active if it succeeds. Turning off always runs the deactivation hook.
    /// Neither direction touches the buffer state or the textures.
    pub fn set_active(&self, active: bool) -> MediaResult<()> {
        let mut inner = self.lock();
        if inner.active == active {
            return Ok(());
        }

        if active {
            if let Err(err) = inner.device.activate() {
                warn!(feed = self.id, name = %inner.name, "activation failed: {err:#}");
                return Err(MediaError::Activation(err));
            }
            inner.active = true;
            info!(feed = self.id, name = %inner.name, "camera feed activated");
        } else {
            inner.device.deactivate();
            inner.active = false;
            info!(feed = self.id, name = %inner.name, "camera feed deactivated");
        }
        Ok(())
    }

    /// True when the feed is active and a slot is free for the producer.
    pub fn is_waiting(&self) -> bool {
        let inner = self.lock();
        inner.active && matches!(inner.state, BufferState::WaitingOn(_))
    }

    /// Claim a slot for the next frame. `None` means the feed is inactive or
    /// no slot is free; the producer should drop the frame and try next tick.
    pub fn begin_write(&self) -> Option<Slot> {
        Self::claim(&mut self.lock())
    }

    fn claim(inner: &mut FeedInner) -> Option<Slot> {
        if !inner.active {
            return None;
        }
        let (slot, next) = inner.state.begin_write()?;
        inner.state = next;
        Some(slot)
    }

    /// Upload a frame into a slot previously returned by [`Self::begin_write`]
    /// and make it available to the consumer.
    ///
    /// If the frame has malformed planes or the texture service fails, the
    /// slot is handed back to the producer and the error is returned.
    pub fn commit_frame(&self, slot: Slot, planes: &FramePlanes) -> MediaResult<()> {
        let mut inner = self.lock();
        self.commit(&mut inner, slot, planes)
    }

    fn commit(&self, inner: &mut FeedInner, slot: Slot, planes: &FramePlanes) -> MediaResult<()> {
        if inner.state != BufferState::Updating(slot) {
            return Err(MediaError::SlotNotClaimed(slot));
        }
        if let Err(err) = planes.validate() {
            warn!(feed = self.id, ?slot, "rejected malformed frame: {err}");
            inner.state = BufferState::WaitingOn(slot);
            return Err(err);
        }

        if let Err(err) = self.upload(inner, slot, planes) {
            warn!(feed = self.id, ?slot, "frame upload failed: {err}");
            inner.state = BufferState::WaitingOn(slot);
            return Err(err);
        }

        inner.datatype = planes.datatype();
        inner.state = BufferState::commit(slot);
        trace!(feed = self.id, ?slot, "frame committed");
        Ok(())
    }

    fn upload(&self, inner: &mut FeedInner, slot: Slot, planes: &FramePlanes) -> MediaResult<()> {
        let (width, height) = planes.base_size();
        let resized = (inner.base_width, inner.base_height) != (width, height);
        let relayout =
            inner.datatype != FeedDataType::NoImage && inner.datatype != planes.datatype();
        if resized || relayout {
            self.reallocate(planes)?;
            debug!(
                feed = self.id,
                from = ?(inner.base_width, inner.base_height, inner.datatype),
                to = ?(width, height, planes.datatype()),
                "reallocated feed textures"
            );
            inner.base_width = width;
            inner.base_height = height;
            inner.datatype = planes.datatype();
        }

        let [primary, chroma] = self.textures[slot.index()];
        match planes {
            FramePlanes::Rgb(image) => {
                self.storage.texture_set_data(primary, image)?;
            }
            FramePlanes::YCbCr { luma, chroma: cbcr } => {
                self.storage.texture_set_data(primary, luma)?;
                self.storage.texture_set_data(chroma, cbcr)?;
            }
        }
        Ok(())
    }

    /// Resize both slots for the frame's layout.
    fn reallocate(&self, planes: &FramePlanes) -> MediaResult<()> {
        for slot in Slot::ALL {
            let [primary, chroma] = self.textures[slot.index()];
            match planes {
                FramePlanes::Rgb(image) => {
                    self.storage.texture_allocate(
                        primary,
                        image.width(),
                        image.height(),
                        ImageFormat::Rgb8,
                        TextureFlags::DEFAULT,
                    )?;
                }
                FramePlanes::YCbCr { luma, chroma: cbcr } => {
                    self.storage.texture_allocate(
                        primary,
                        luma.width(),
                        luma.height(),
                        ImageFormat::L8,
                        TextureFlags::STREAMING,
                    )?;
                    self.storage.texture_allocate(
                        chroma,
                        cbcr.width(),
                        cbcr.height(),
                        ImageFormat::Rg8,
                        TextureFlags::DEFAULT,
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Push a single-plane RGB frame. Returns the slot written, or `None` if
    /// the frame was dropped because no slot was free.
    pub fn set_rgb_image(&self, image: Image) -> MediaResult<Option<Slot>> {
        self.push(FramePlanes::Rgb(image))
    }

    /// Push a luma + chroma frame. Returns the slot written, or `None` if the
    /// frame was dropped because no slot was free.
    pub fn set_ycbcr_images(&self, luma: Image, chroma: Image) -> MediaResult<Option<Slot>> {
        self.push(FramePlanes::YCbCr { luma, chroma })
    }

    fn push(&self, planes: FramePlanes) -> MediaResult<Option<Slot>> {
        planes.validate()?;
        let mut inner = self.lock();
        let Some(slot) = Self::claim(&mut inner) else {
            return Ok(None);
        };
        self.commit(&mut inner, slot, &planes)?;
        Ok(Some(slot))
    }

    /// Texture for `plane` of the slot the renderer should display.
    ///
    /// Picking up a freshly committed slot releases the other slot to the
    /// producer once the final plane has been read (plane 0 for RGB feeds,
    /// the chroma plane for two-plane feeds).
    pub fn read_texture(&self, plane: Plane) -> TextureId {
        let mut inner = self.lock();
        let release = inner.datatype == FeedDataType::Rgb || plane == Plane::Chroma;
        let (slot, next) = inner.state.read(release);
        if next != inner.state {
            trace!(feed = self.id, ?slot, "consumer switched slot");
        }
        inner.state = next;
        self.textures[slot.index()][plane.index()]
    }
}

impl Drop for CameraFeed {
    fn drop(&mut self) {
        for texture in self.textures.iter().flatten() {
            if let Err(err) = self.storage.free(*texture) {
                warn!(feed = self.id, texture = texture.0, "failed to free texture: {err}");
            }
        }
    }
}

fn create_textures(storage: &dyn TextureStorage) -> MediaResult<[[TextureId; 2]; 2]> {
    let mut created = Vec::with_capacity(4);
    for _ in 0..4 {
        match storage.texture_create() {
            Ok(texture) => created.push(texture),
            Err(err) => {
                for texture in created {
                    if let Err(free_err) = storage.free(texture) {
                        warn!(texture = texture.0, "failed to free texture: {free_err}");
                    }
                }
                return Err(err.into());
            }
        }
    }
    Ok([[created[0], created[1]], [created[2], created[3]]])
}
