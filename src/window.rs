use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

/// A window the negotiation can create a presentable surface for.
pub trait PresentationWindow: HasWindowHandle + HasDisplayHandle {
    /// Current drawable size in pixels.
    fn drawable_size(&self) -> (u32, u32);
}

#[cfg(feature = "window")]
impl PresentationWindow for glfw::Window {
    fn drawable_size(&self) -> (u32, u32) {
        let (width, height) = self.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }
}
