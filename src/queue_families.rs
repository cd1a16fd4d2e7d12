use ash::vk::{PhysicalDevice, QueueFlags};
use tracing::debug;

use crate::{error::query_failed, DeviceQueries, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    /// family capable of running graphics related commands
    pub graphics: Option<u32>,
    /// family capable of displaying results on the surface
    pub present: Option<u32>,
    /// family capable of running compute dispatches
    pub compute: Option<u32>,
}

impl QueueFamilyIndices {
    /// True if all queue families are available for this physical device.
    pub fn is_complete(&self) -> bool {
        self.resolve().is_some()
    }

    pub fn resolve(&self) -> Option<QueueFamilies> {
        Some(QueueFamilies {
            graphics: self.graphics?,
            present: self.present?,
            compute: self.compute?,
        })
    }
}

/// Queue family indices of a device known to have every role covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueueFamilies {
    pub graphics: u32,
    pub present: u32,
    pub compute: u32,
}

/// Walks the queue families of `physical_device` once and records the index of
/// each role. Graphics keeps the first match; present and compute keep the last.
pub fn find_queue_families<Q: DeviceQueries + ?Sized>(
    queries: &Q,
    physical_device: PhysicalDevice,
) -> Result<QueueFamilyIndices> {
    let queue_family_properties = queries.queue_family_properties(physical_device);
    let mut indices = QueueFamilyIndices::default();

    for (index, queue_family) in (0u32..).zip(queue_family_properties.iter()) {
        if queue_family.queue_count == 0 {
            continue;
        }
        if indices.graphics.is_none() && queue_family.queue_flags.contains(QueueFlags::GRAPHICS) {
            indices.graphics = Some(index);
        }
        if queries
            .surface_support(physical_device, index)
            .map_err(query_failed("vkGetPhysicalDeviceSurfaceSupportKHR"))?
        {
            indices.present = Some(index);
        }
        if queue_family.queue_flags.contains(QueueFlags::COMPUTE) {
            indices.compute = Some(index);
        }
    }

    debug!(
        "Selected queue families: graphics {:?}, present {:?}, compute {:?}",
        indices.graphics, indices.present, indices.compute
    );
    Ok(indices)
}
