use std::{ops::Deref, rc::Rc};

use ash::{
    khr::swapchain,
    vk::{Extent2D, Format, Image, ImageUsageFlags, SwapchainCreateInfoKHR, SwapchainKHR},
};
use tracing::{debug, info};

use crate::{Instance, LogicalDevice, NegotiationError, Result, Surface, SurfaceConfiguration};

/// RAII for the swapchain and its presentable images
pub struct Swapchain {
    swapchain_fn: swapchain::Device,
    swapchain_ptr: SwapchainKHR,
    images: Vec<Image>,
    configuration: SurfaceConfiguration,
    // references we need to keep to ensure
    // we are cleaned up before they are
    _logical_device: Rc<LogicalDevice>,
    _surface: Rc<Surface>,
}

impl Swapchain {
    pub fn new(
        instance: &Instance,
        logical_device: &Rc<LogicalDevice>,
        surface: &Rc<Surface>,
        configuration: SurfaceConfiguration,
    ) -> Result<Self> {
        let swapchain_create_info = SwapchainCreateInfoKHR::default()
            .surface(***surface)
            .min_image_count(configuration.image_count)
            .image_format(configuration.format)
            .image_color_space(configuration.color_space)
            .image_extent(configuration.extent)
            // always 1 unless doing stereoscopic 3D
            .image_array_layers(1)
            // use images as color attachments for drawing color pictures to
            .image_usage(ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(configuration.sharing_mode)
            .queue_family_indices(&configuration.queue_family_indices)
            .pre_transform(configuration.pre_transform)
            .composite_alpha(configuration.composite_alpha)
            .present_mode(configuration.present_mode)
            .clipped(configuration.clipped)
            .old_swapchain(SwapchainKHR::null());
        debug!("Swapchain create info: {:?}", swapchain_create_info);

        let swapchain_fn = swapchain::Device::new(instance, logical_device);
        let swapchain_ptr = unsafe { swapchain_fn.create_swapchain(&swapchain_create_info, None) }
            .map_err(NegotiationError::SwapchainCreationFailed)?;

        let images = match unsafe { swapchain_fn.get_swapchain_images(swapchain_ptr) } {
            Ok(images) => images,
            Err(err) => {
                unsafe { swapchain_fn.destroy_swapchain(swapchain_ptr, None) };
                return Err(NegotiationError::SwapchainCreationFailed(err));
            }
        };
        info!(
            "Swapchain created with {} {:?} images at {}x{}",
            images.len(),
            configuration.format,
            configuration.extent.width,
            configuration.extent.height
        );

        Ok(Self {
            swapchain_fn,
            swapchain_ptr,
            images,
            configuration,
            _logical_device: Rc::clone(logical_device),
            _surface: Rc::clone(surface),
        })
    }

    pub fn get_handle(&self) -> SwapchainKHR {
        self.swapchain_ptr
    }

    pub fn get_images(&self) -> &[Image] {
        &self.images
    }

    pub fn get_configuration(&self) -> &SurfaceConfiguration {
        &self.configuration
    }

    pub fn get_extent(&self) -> Extent2D {
        self.configuration.extent
    }

    pub fn get_image_format(&self) -> Format {
        self.configuration.format
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        debug!("Dropping Swapchain");
        unsafe {
            self.swapchain_fn
                .destroy_swapchain(self.swapchain_ptr, None)
        }
    }
}

impl Deref for Swapchain {
    type Target = swapchain::Device;

    fn deref(&self) -> &Self::Target {
        &self.swapchain_fn
    }
}
