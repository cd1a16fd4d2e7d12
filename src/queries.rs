use std::collections::HashSet;

use ash::{
    prelude::VkResult,
    vk::{
        PhysicalDevice, PhysicalDeviceFeatures, PresentModeKHR, QueueFamilyProperties,
        SurfaceCapabilitiesKHR, SurfaceFormatKHR,
    },
};

use crate::{Instance, Surface};

/// The driver capability queries device selection relies on, answered for one
/// presentation surface.
pub trait DeviceQueries {
    fn enumerate_physical_devices(&self) -> VkResult<Vec<PhysicalDevice>>;

    fn device_name(&self, physical_device: PhysicalDevice) -> String;

    fn queue_family_properties(&self, physical_device: PhysicalDevice)
        -> Vec<QueueFamilyProperties>;

    fn surface_support(&self, physical_device: PhysicalDevice, queue_family_index: u32)
        -> VkResult<bool>;

    fn extension_names(&self, physical_device: PhysicalDevice) -> VkResult<HashSet<String>>;

    fn features(&self, physical_device: PhysicalDevice) -> PhysicalDeviceFeatures;

    fn surface_capabilities(&self, physical_device: PhysicalDevice)
        -> VkResult<SurfaceCapabilitiesKHR>;

    fn surface_formats(&self, physical_device: PhysicalDevice) -> VkResult<Vec<SurfaceFormatKHR>>;

    fn surface_present_modes(&self, physical_device: PhysicalDevice)
        -> VkResult<Vec<PresentModeKHR>>;
}

/// Names of every extension `physical_device` exposes.
pub(crate) fn device_extension_names(
    instance: &Instance,
    physical_device: PhysicalDevice,
) -> VkResult<HashSet<String>> {
    let device_extension_properties =
        unsafe { instance.enumerate_device_extension_properties(physical_device)? };
    // a name without a terminator can never match a required one, skip it
    Ok(device_extension_properties
        .iter()
        .filter_map(|extension| extension.extension_name_as_c_str().ok())
        .map(|name| name.to_string_lossy().into_owned())
        .collect())
}

/// [`DeviceQueries`] answered by a live instance and surface.
pub struct SurfaceQueries<'a> {
    instance: &'a Instance,
    surface: &'a Surface,
}

impl<'a> SurfaceQueries<'a> {
    pub fn new(instance: &'a Instance, surface: &'a Surface) -> Self {
        Self { instance, surface }
    }
}

impl DeviceQueries for SurfaceQueries<'_> {
    fn enumerate_physical_devices(&self) -> VkResult<Vec<PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }
    }

    fn device_name(&self, physical_device: PhysicalDevice) -> String {
        let properties = unsafe {
            self.instance
                .get_physical_device_properties(physical_device)
        };
        properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|_| format!("{:?}", physical_device))
    }

    fn queue_family_properties(
        &self,
        physical_device: PhysicalDevice,
    ) -> Vec<QueueFamilyProperties> {
        unsafe {
            self.instance
                .get_physical_device_queue_family_properties(physical_device)
        }
    }

    fn surface_support(
        &self,
        physical_device: PhysicalDevice,
        queue_family_index: u32,
    ) -> VkResult<bool> {
        self.surface
            .get_physical_device_surface_support(physical_device, queue_family_index)
    }

    fn extension_names(&self, physical_device: PhysicalDevice) -> VkResult<HashSet<String>> {
        device_extension_names(self.instance, physical_device)
    }

    fn features(&self, physical_device: PhysicalDevice) -> PhysicalDeviceFeatures {
        unsafe { self.instance.get_physical_device_features(physical_device) }
    }

    fn surface_capabilities(
        &self,
        physical_device: PhysicalDevice,
    ) -> VkResult<SurfaceCapabilitiesKHR> {
        self.surface
            .get_physical_device_surface_capabilities(physical_device)
    }

    fn surface_formats(&self, physical_device: PhysicalDevice) -> VkResult<Vec<SurfaceFormatKHR>> {
        self.surface
            .get_physical_device_surface_formats(physical_device)
    }

    fn surface_present_modes(
        &self,
        physical_device: PhysicalDevice,
    ) -> VkResult<Vec<PresentModeKHR>> {
        self.surface
            .get_physical_device_surface_present_modes(physical_device)
    }
}
