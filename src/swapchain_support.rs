use ash::vk::{
    ColorSpaceKHR, CompositeAlphaFlagsKHR, Extent2D, Format, PhysicalDevice, PresentModeKHR,
    SharingMode, SurfaceCapabilitiesKHR, SurfaceFormatKHR, SurfaceTransformFlagsKHR,
};

use crate::{error::query_failed, DeviceQueries, NegotiationError, QueueFamilies, Result};

/// Surface format used when the driver has no preference, and preferred otherwise.
pub const PREFERRED_SURFACE_FORMAT: SurfaceFormatKHR = SurfaceFormatKHR {
    format: Format::B8G8R8A8_UNORM,
    color_space: ColorSpaceKHR::SRGB_NONLINEAR,
};

/// Details about what the swap chain supports for a given surface and device
#[derive(Debug, Clone)]
pub struct SwapchainSupportDetails {
    pub capabilities: SurfaceCapabilitiesKHR,
    /// The formats (color depth settings) available to use, in driver order.
    pub formats: Vec<SurfaceFormatKHR>,
    pub present_modes: Vec<PresentModeKHR>,
}

impl SwapchainSupportDetails {
    /// Queries for the details of what the swap chain supports given
    /// the physical device and surface
    pub fn query<Q: DeviceQueries + ?Sized>(
        queries: &Q,
        physical_device: PhysicalDevice,
    ) -> Result<Self> {
        Ok(Self {
            capabilities: queries
                .surface_capabilities(physical_device)
                .map_err(query_failed("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"))?,
            formats: queries
                .surface_formats(physical_device)
                .map_err(query_failed("vkGetPhysicalDeviceSurfaceFormatsKHR"))?,
            present_modes: queries
                .surface_present_modes(physical_device)
                .map_err(query_failed("vkGetPhysicalDeviceSurfacePresentModesKHR"))?,
        })
    }

    pub fn is_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

/// Picks the surface format to use from the available ones.
pub fn choose_surface_format(available_formats: &[SurfaceFormatKHR]) -> Option<SurfaceFormatKHR> {
    match available_formats {
        [only] if only.format == Format::UNDEFINED => Some(PREFERRED_SURFACE_FORMAT),
        _ => available_formats
            .iter()
            .find(|format| {
                format.format == PREFERRED_SURFACE_FORMAT.format
                    && format.color_space == PREFERRED_SURFACE_FORMAT.color_space
            })
            .or_else(|| available_formats.first())
            .copied(),
    }
}

/// Picks the preferential present mode based on the available ones.
pub fn choose_present_mode(available_modes: &[PresentModeKHR]) -> PresentModeKHR {
    // prefer mailbox, where if we can render faster than the screen can present
    // and the queue fills up, we'll replace the last image with the most up to
    // date version
    if available_modes.contains(&PresentModeKHR::MAILBOX) {
        return PresentModeKHR::MAILBOX;
    }
    // otherwise, use FIFO - basically vertical sync. This is the only setting
    // guaranteed to be available on all systems
    PresentModeKHR::FIFO
}

/// Returns the "extent" of the images to draw - the resolution to use *in pixels*.
pub fn choose_extent(capabilities: &SurfaceCapabilitiesKHR, window_size: (u32, u32)) -> Extent2D {
    match capabilities.current_extent.width {
        // the surface size is decided by the swapchain, follow the window
        u32::MAX => {
            let (width, height) = window_size;
            Extent2D {
                width: width
                    .min(capabilities.max_image_extent.width)
                    .max(capabilities.min_image_extent.width),
                height: height
                    .min(capabilities.max_image_extent.height)
                    .max(capabilities.min_image_extent.height),
            }
        }
        _ => capabilities.current_extent,
    }
}

/// Returns how many images the swap chain should use based on its support
pub fn choose_image_count(capabilities: &SurfaceCapabilitiesKHR) -> u32 {
    // one more than the minimum so we're not stuck waiting on the driver
    let image_count = capabilities.min_image_count.saturating_add(1);
    // zero means there is no max
    if capabilities.max_image_count > 0 && image_count > capabilities.max_image_count {
        capabilities.max_image_count
    } else {
        image_count
    }
}

/// Concurrent sharing between distinct graphics and present families, exclusive otherwise.
pub fn choose_sharing_mode(queue_families: &QueueFamilies) -> (SharingMode, Vec<u32>) {
    if queue_families.graphics != queue_families.present {
        (
            SharingMode::CONCURRENT,
            vec![queue_families.graphics, queue_families.present],
        )
    } else {
        (SharingMode::EXCLUSIVE, vec![])
    }
}

/// The negotiated swapchain parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceConfiguration {
    pub format: Format,
    pub color_space: ColorSpaceKHR,
    pub present_mode: PresentModeKHR,
    pub extent: Extent2D,
    pub image_count: u32,
    pub sharing_mode: SharingMode,
    /// Only populated for [`SharingMode::CONCURRENT`].
    pub queue_family_indices: Vec<u32>,
    pub pre_transform: SurfaceTransformFlagsKHR,
    pub composite_alpha: CompositeAlphaFlagsKHR,
    pub clipped: bool,
}

impl SurfaceConfiguration {
    pub fn negotiate(
        support: &SwapchainSupportDetails,
        window_size: (u32, u32),
        queue_families: &QueueFamilies,
    ) -> Result<Self> {
        let surface_format = choose_surface_format(&support.formats)
            .ok_or(NegotiationError::SurfaceFormatsUnavailable)?;
        let (sharing_mode, queue_family_indices) = choose_sharing_mode(queue_families);

        Ok(Self {
            format: surface_format.format,
            color_space: surface_format.color_space,
            present_mode: choose_present_mode(&support.present_modes),
            extent: choose_extent(&support.capabilities, window_size),
            image_count: choose_image_count(&support.capabilities),
            sharing_mode,
            queue_family_indices,
            // no extra transforms - just pass in current transform
            pre_transform: support.capabilities.current_transform,
            // ignore alpha channel
            composite_alpha: CompositeAlphaFlagsKHR::OPAQUE,
            // discard pixels hidden by something else (like another window)
            clipped: true,
        })
    }
}
