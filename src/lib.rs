//! Negotiates a Vulkan physical device, logical device and swapchain for a
//! window, once, at startup.
//!
//! [`DeviceContext::new`] runs the whole sequence; the selection and
//! negotiation steps are also exposed on their own so they can be driven by
//! any [`DeviceQueries`] implementation.

mod config;
mod context;
mod debug_messenger;
mod error;
mod instance;
pub mod logging;
mod logical_device;
mod physical_device;
mod queries;
mod queue_families;
mod requirements;
mod surface;
mod swapchain;
mod swapchain_support;
mod window;

pub use config::{LoggingConfig, NegotiationConfig};
pub use context::DeviceContext;
pub use debug_messenger::{get_debug_messenger_create_info, DebugMessenger};
pub use error::{NegotiationError, NegotiationStage, Result};
pub use instance::Instance;
pub use logical_device::{device_layer_names, unique_queue_families, LogicalDevice};
pub use physical_device::{
    missing_device_extensions, select_physical_device, PhysicalDeviceCandidate, Rejection,
};
pub use queries::{DeviceQueries, SurfaceQueries};
pub use queue_families::{find_queue_families, QueueFamilies, QueueFamilyIndices};
pub use requirements::{DeviceFeature, RequirementCatalog};
pub use surface::Surface;
pub use swapchain::Swapchain;
pub use swapchain_support::{
    choose_extent, choose_image_count, choose_present_mode, choose_sharing_mode,
    choose_surface_format, SurfaceConfiguration, SwapchainSupportDetails,
    PREFERRED_SURFACE_FORMAT,
};
pub use window::PresentationWindow;
