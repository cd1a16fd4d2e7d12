mod window_manager;

use anyhow::Result;
use tracing::info;
use vk_negotiate::{logging, DeviceContext, LoggingConfig, NegotiationConfig};

use crate::window_manager::WindowManager;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;
const WINDOW_TITLE: &str = "Texture";

fn main() -> Result<()> {
    logging::init(LoggingConfig::default())?;

    let mut window_manager = WindowManager::try_new(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT)?;
    let config = NegotiationConfig::default();
    let context = DeviceContext::new(&config, window_manager.window())?;

    info!(
        "Using `{}`: {:?} {}x{}, {} swapchain images, {:?}",
        context.name(),
        context.image_format(),
        context.extent().width,
        context.extent().height,
        context.swapchain_images().len(),
        context.surface_configuration().present_mode,
    );
    info!(
        "D24S8 attachments: {}, 4x MSAA: {}, working set hint: {}",
        context.is_depth24_stencil8_pixel_format_supported(),
        context.supports_texture_sample_count(4),
        context.recommended_max_working_set_size(),
    );

    window_manager.run_event_loop();

    // the context has to go before the window it presents to
    drop(context);
    Ok(())
}
