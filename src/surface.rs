use std::{ops::Deref, rc::Rc};

use ash::{
    khr::surface,
    prelude::VkResult,
    vk::{PhysicalDevice, PresentModeKHR, SurfaceCapabilitiesKHR, SurfaceFormatKHR, SurfaceKHR},
};
use raw_window_handle::HandleError;
use tracing::{debug, info};

use crate::{Instance, NegotiationError, PresentationWindow, Result};

pub struct Surface {
    surface_fn: surface::Instance,
    surface_ptr: SurfaceKHR,
    // references to make sure we are dropped before these
    _instance: Rc<Instance>,
}

impl Surface {
    pub fn new<W: PresentationWindow + ?Sized>(instance: &Rc<Instance>, window: &W) -> Result<Self> {
        let display_handle = window.display_handle().map_err(handle_error)?;
        let window_handle = window.window_handle().map_err(handle_error)?;

        let surface_fn = surface::Instance::new(instance.get_entry(), instance);
        let surface_ptr = unsafe {
            ash_window::create_surface(
                instance.get_entry(),
                instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
        }
        .map_err(|err| NegotiationError::SurfaceCreationFailed(err.to_string()))?;
        info!("Window surface created");

        Ok(Self {
            surface_fn,
            surface_ptr,
            _instance: Rc::clone(instance),
        })
    }

    pub(crate) fn get_physical_device_surface_capabilities(
        &self,
        physical_device: PhysicalDevice,
    ) -> VkResult<SurfaceCapabilitiesKHR> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_capabilities(physical_device, self.surface_ptr)
        }
    }

    pub(crate) fn get_physical_device_surface_formats(
        &self,
        physical_device: PhysicalDevice,
    ) -> VkResult<Vec<SurfaceFormatKHR>> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_formats(physical_device, self.surface_ptr)
        }
    }

    pub(crate) fn get_physical_device_surface_present_modes(
        &self,
        physical_device: PhysicalDevice,
    ) -> VkResult<Vec<PresentModeKHR>> {
        unsafe {
            self.surface_fn
                .get_physical_device_surface_present_modes(physical_device, self.surface_ptr)
        }
    }

    pub(crate) fn get_physical_device_surface_support(
        &self,
        physical_device: PhysicalDevice,
        queue_family_index: u32,
    ) -> VkResult<bool> {
        unsafe {
            self.surface_fn.get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                self.surface_ptr,
            )
        }
    }
}

/// An unavailable handle means the window is gone, anything else is a platform mismatch.
fn handle_error(err: HandleError) -> NegotiationError {
    match err {
        HandleError::Unavailable => NegotiationError::MissingWindowSurface,
        other => NegotiationError::SurfaceCreationFailed(other.to_string()),
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        debug!("Dropping Surface");
        unsafe { self.surface_fn.destroy_surface(self.surface_ptr, None) }
    }
}

impl Deref for Surface {
    type Target = SurfaceKHR;

    fn deref(&self) -> &Self::Target {
        &self.surface_ptr
    }
}
