use anyhow::{anyhow, Result};
use glfw::{
    fail_on_errors, Action, ClientApiHint, Glfw, GlfwReceiver, Key, PWindow, WindowEvent,
    WindowHint, WindowMode,
};
use tracing::{debug, info};

/// The glfw window and event loop the device context is negotiated against.
pub struct WindowManager {
    glfw: Glfw,
    window: PWindow,
    receiver: GlfwReceiver<(f64, WindowEvent)>,
}

impl WindowManager {
    pub fn try_new(title: &str, width: u32, height: u32) -> Result<Self> {
        let mut glfw = glfw::init(fail_on_errors!())?;
        if !glfw.vulkan_supported() {
            return Err(anyhow!("GLFW reports no Vulkan loader"));
        }
        // the swapchain presents, so no GL context
        glfw.window_hint(WindowHint::ClientApi(ClientApiHint::NoApi));
        let (mut window, events) = glfw
            .create_window(width, height, title, WindowMode::Windowed)
            .ok_or(anyhow!("Failed to create GLFW window"))?;

        window.set_key_polling(true);
        window.set_framebuffer_size_polling(true);

        Ok(Self {
            window,
            glfw,
            receiver: events,
        })
    }

    pub fn window(&self) -> &glfw::Window {
        &self.window
    }

    pub fn run_event_loop(&mut self) {
        while !self.window.should_close() {
            self.glfw.wait_events();
            for (_, event) in glfw::flush_messages(&self.receiver) {
                match event {
                    WindowEvent::Key(Key::Escape, _, Action::Press, _) => {
                        self.window.set_should_close(true);
                    }
                    WindowEvent::FramebufferSize(width, height) => {
                        info!("Framebuffer resized to {}x{}", width, height);
                    }
                    other => debug!("{:?}", other),
                }
            }
        }
    }
}
