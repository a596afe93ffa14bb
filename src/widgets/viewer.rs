use tokio::sync::watch;

pub const MIN_ZOOM: u8 = 1;
pub const MAX_ZOOM: u8 = 3;
pub const BACK_TO_TOP_OFFSET: f64 = 300.0;

/// Keys the viewer reacts to while open.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerKey {
    Escape,
    ZoomIn,
    ZoomOut,
}

/// Fullscreen photo viewer. Opening and closing is published on a watch channel
/// so other widgets can react without knowing about the viewer.
#[derive(Debug)]
pub struct FullscreenViewer {
    open_tx: watch::Sender<bool>,
    photo_id: Option<String>,
    zoom: u8,
}

impl Default for FullscreenViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl FullscreenViewer {
    pub fn new() -> Self {
        let (open_tx, _) = watch::channel(false);
        FullscreenViewer { open_tx, photo_id: None, zoom: MIN_ZOOM }
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.open_tx.subscribe()
    }

    pub fn is_open(&self) -> bool {
        *self.open_tx.borrow()
    }

    pub fn photo_id(&self) -> Option<&str> {
        self.photo_id.as_deref()
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }

    pub fn open(&mut self, photo_id: &str) {
        self.photo_id = Some(photo_id.to_string());
        self.zoom = MIN_ZOOM;
        self.open_tx.send_replace(true);
    }

    pub fn close(&mut self) {
        self.photo_id = None;
        self.zoom = MIN_ZOOM;
        self.open_tx.send_replace(false);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 1).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.saturating_sub(1).max(MIN_ZOOM);
    }

    pub fn handle_key(&mut self, key: ViewerKey) {
        if !self.is_open() {
            return;
        }
        match key {
            ViewerKey::Escape => self.close(),
            ViewerKey::ZoomIn => self.zoom_in(),
            ViewerKey::ZoomOut => self.zoom_out(),
        }
    }
}

/// Floating "back to top" control, hidden while the fullscreen viewer is open.
#[derive(Debug)]
pub struct BackToTop {
    viewer_open: watch::Receiver<bool>,
    scroll_y: f64,
}

impl BackToTop {
    pub fn new(viewer_open: watch::Receiver<bool>) -> Self {
        BackToTop { viewer_open, scroll_y: 0.0 }
    }

    pub fn on_scroll(&mut self, scroll_y: f64) {
        self.scroll_y = scroll_y;
    }

    pub fn is_visible(&self) -> bool {
        self.scroll_y > BACK_TO_TOP_OFFSET && !*self.viewer_open.borrow()
    }

    /// Waits for the next viewer open/close and returns the resulting visibility.
    /// `None` once the viewer is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        match self.viewer_open.changed().await {
            Ok(()) => Some(self.is_visible()),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_viewer_zoom_and_keys() {
        let mut viewer = FullscreenViewer::new();
        viewer.handle_key(ViewerKey::ZoomIn);
        assert_eq!(viewer.zoom(), MIN_ZOOM);

        viewer.open("harbor");
        assert_eq!(viewer.photo_id(), Some("harbor"));
        for _ in 0..5 {
            viewer.handle_key(ViewerKey::ZoomIn);
        }
        assert_eq!(viewer.zoom(), MAX_ZOOM);
        for _ in 0..5 {
            viewer.handle_key(ViewerKey::ZoomOut);
        }
        assert_eq!(viewer.zoom(), MIN_ZOOM);

        viewer.handle_key(ViewerKey::Escape);
        assert!(!viewer.is_open());
        assert_eq!(viewer.photo_id(), None);
    }

    #[test]
    fn test_back_to_top_visibility() {
        let mut viewer = FullscreenViewer::new();
        let mut button = BackToTop::new(viewer.subscribe());

        button.on_scroll(120.0);
        assert!(!button.is_visible());
        button.on_scroll(301.0);
        assert!(button.is_visible());

        viewer.open("fog");
        assert!(!button.is_visible());
        viewer.close();
        assert!(button.is_visible());
    }

    #[tokio::test]
    async fn test_back_to_top_follows_viewer() {
        let mut viewer = FullscreenViewer::new();
        let mut button = BackToTop::new(viewer.subscribe());
        button.on_scroll(800.0);

        viewer.open("dunes");
        assert_eq!(button.changed().await, Some(false));
        viewer.close();
        assert_eq!(button.changed().await, Some(true));

        drop(viewer);
        assert_eq!(button.changed().await, None);
    }
}
