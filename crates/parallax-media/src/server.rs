//! Registry of the camera feeds known to the engine.

use std::sync::{Arc, Mutex, MutexGuard};

use parallax_render::TextureId;
use tracing::info;

use crate::{CameraFeed, MediaError, MediaResult, Plane};

#[derive(Default)]
pub struct CameraServer {
    feeds: Mutex<Vec<Arc<CameraFeed>>>,
}

impl CameraServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Arc<CameraFeed>>> {
        match self.feeds.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add_feed(&self, feed: Arc<CameraFeed>) -> MediaResult<()> {
        let mut feeds = self.lock();
        if feeds.iter().any(|existing| existing.id() == feed.id()) {
            return Err(MediaError::DuplicateFeed(feed.id()));
        }
        info!(feed = feed.id(), name = %feed.name(), "camera feed added");
        feeds.push(feed);
        Ok(())
    }

    pub fn remove_feed(&self, id: u32) -> Option<Arc<CameraFeed>> {
        let mut feeds = self.lock();
        let pos = feeds.iter().position(|feed| feed.id() == id)?;
        let feed = feeds.remove(pos);
        info!(feed = id, name = %feed.name(), "camera feed removed");
        Some(feed)
    }

    pub fn feed(&self, id: u32) -> Option<Arc<CameraFeed>> {
        self.lock().iter().find(|feed| feed.id() == id).cloned()
    }

    /// All registered feeds, in registration order.
    pub fn feeds(&self) -> Vec<Arc<CameraFeed>> {
        self.lock().clone()
    }

    pub fn feed_count(&self) -> usize {
        self.lock().len()
    }

    /// Displayable texture of feed `id`, see [`CameraFeed::read_texture`].
    pub fn feed_texture(&self, id: u32, plane: Plane) -> Option<TextureId> {
        // Release the registry lock before taking the feed's.
        let feed = self.feed(id)?;
        Some(feed.read_texture(plane))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BufferState, FeedPosition, Slot};
    use parallax_render::{Image, ImageFormat, MemoryRenderer};

    fn new_feed(renderer: &Arc<MemoryRenderer>, name: &str) -> Arc<CameraFeed> {
        Arc::new(CameraFeed::new(name, FeedPosition::Front, renderer.clone()).unwrap())
    }

    #[test]
    fn test_add_and_lookup() {
        let renderer = Arc::new(MemoryRenderer::new());
        let server = CameraServer::new();
        let a = new_feed(&renderer, "a");
        let b = new_feed(&renderer, "b");

        server.add_feed(a.clone()).unwrap();
        server.add_feed(b.clone()).unwrap();
        assert_eq!(server.feed_count(), 2);
        assert_eq!(server.feed(b.id()).map(|f| f.name()), Some(String::from("b")));

        let ids: Vec<u32> = server.feeds().iter().map(|f| f.id()).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);
    }

    #[test]
    fn test_duplicate_feed_rejected() {
        let renderer = Arc::new(MemoryRenderer::new());
        let server = CameraServer::new();
        let a = new_feed(&renderer, "a");
        server.add_feed(a.clone()).unwrap();
        assert!(matches!(
            server.add_feed(a.clone()),
            Err(MediaError::DuplicateFeed(id)) if id == a.id()
        ));
    }

    #[test]
    fn test_remove_feed() {
        let renderer = Arc::new(MemoryRenderer::new());
        let server = CameraServer::new();
        let a = new_feed(&renderer, "a");
        let id = a.id();
        server.add_feed(a).unwrap();

        assert!(server.remove_feed(id).is_some());
        assert!(server.remove_feed(id).is_none());
        assert_eq!(server.feed_count(), 0);
        // Last reference gone: textures released.
        assert_eq!(renderer.texture_count(), 0);
    }

    #[test]
    fn test_feed_texture_forwards_to_feed() {
        let renderer = Arc::new(MemoryRenderer::new());
        let server = CameraServer::new();
        let feed = new_feed(&renderer, "a");
        server.add_feed(feed.clone()).unwrap();
        assert_eq!(server.feed_texture(feed.id() + 1000, Plane::Primary), None);

        feed.set_active(true).unwrap();
        feed.set_rgb_image(Image::filled(2, 2, ImageFormat::Rgb8, 5).unwrap())
            .unwrap();

        let texture = server.feed_texture(feed.id(), Plane::Primary);
        assert_eq!(texture, Some(feed.texture(Slot::Zero, Plane::Primary)));
        assert_eq!(feed.state(), BufferState::WaitingOn(Slot::One));
    }
}
