use std::{
    collections::{BTreeSet, HashSet},
    ffi::CStr,
    ops::Deref,
    rc::Rc,
};

use ash::{
    prelude::VkResult,
    vk::{self, DeviceCreateInfo, DeviceQueueCreateInfo, PhysicalDevice, Queue},
    Device,
};
use tracing::{debug, info, warn};

use crate::{
    instance::required_layers, physical_device::absent_extensions,
    queries::device_extension_names, DeviceFeature, Instance, NegotiationConfig, NegotiationError,
    QueueFamilies, RequirementCatalog, Result,
};

const QUEUE_PRIORITIES: [f32; 1] = [1.0];

/// Queue families that need a queue: graphics and present, deduplicated and
/// ascending. Compute is expected to alias one of them or go unused.
pub fn unique_queue_families(queue_families: &QueueFamilies) -> Vec<u32> {
    BTreeSet::from([queue_families.graphics, queue_families.present])
        .into_iter()
        .collect()
}

/// Layers enabled at device scope, for loaders that predate instance-only layers.
pub fn device_layer_names(
    catalog: &RequirementCatalog,
    config: &NegotiationConfig,
) -> &'static [&'static CStr] {
    required_layers(catalog, config.enable_validation)
}

/// Maps a failed `vkCreateDevice`. A missing extension is looked up again so
/// the error names the one that is absent rather than the whole catalog.
fn creation_error(
    err: vk::Result,
    catalog: &RequirementCatalog,
    available_extensions: impl FnOnce() -> VkResult<HashSet<String>>,
) -> NegotiationError {
    if err != vk::Result::ERROR_EXTENSION_NOT_PRESENT {
        return NegotiationError::DeviceCreationFailed(err);
    }
    let absent = available_extensions()
        .map(|available| absent_extensions(catalog, &available))
        .unwrap_or_default();
    match absent.into_iter().next() {
        Some(extension) => NegotiationError::ExtensionUnsupported { extension },
        // the driver disagrees with its own extension list, nothing specific to report
        None => NegotiationError::DeviceCreationFailed(err),
    }
}

/// RAII for the logical device and its graphics queue
pub struct LogicalDevice {
    device: Device,
    physical_device: PhysicalDevice,
    queue_families: QueueFamilies,
    graphics_queue: Queue,
    // need to keep a reference to the instance to ensure we get
    // dropped before it does
    _instance: Rc<Instance>,
}

impl LogicalDevice {
    pub fn new(
        instance: &Rc<Instance>,
        physical_device: PhysicalDevice,
        queue_families: QueueFamilies,
        catalog: &RequirementCatalog,
        config: &NegotiationConfig,
    ) -> Result<Self> {
        let device_queue_create_infos = unique_queue_families(&queue_families)
            .into_iter()
            .map(|queue_family_index| {
                DeviceQueueCreateInfo::default()
                    .queue_family_index(queue_family_index)
                    .queue_priorities(&QUEUE_PRIORITIES)
            })
            .collect::<Vec<_>>();
        debug!("Queue create infos: {:?}", device_queue_create_infos);

        warn_about_unsupported_features(instance, physical_device, catalog);
        let enabled_features = catalog.requested_features();

        let device_extension_name_ptrs = catalog
            .device_extensions
            .iter()
            .map(|extension_name| extension_name.as_ptr())
            .collect::<Vec<_>>();
        let layer_name_ptrs = device_layer_names(catalog, config)
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect::<Vec<_>>();

        #[allow(deprecated)]
        let device_create_info = DeviceCreateInfo::default()
            .queue_create_infos(&device_queue_create_infos)
            .enabled_extension_names(&device_extension_name_ptrs)
            .enabled_features(&enabled_features)
            .enabled_layer_names(&layer_name_ptrs);

        let device = unsafe { instance.create_device(physical_device, &device_create_info, None) }
            .map_err(|err| {
                creation_error(err, catalog, || {
                    device_extension_names(instance, physical_device)
                })
            })?;
        let graphics_queue = unsafe { device.get_device_queue(queue_families.graphics, 0) };
        info!("Logical device created");

        Ok(Self {
            device,
            physical_device,
            queue_families,
            graphics_queue,
            _instance: Rc::clone(instance),
        })
    }

    pub fn get_graphics_queue(&self) -> Queue {
        self.graphics_queue
    }

    pub fn get_physical_device(&self) -> PhysicalDevice {
        self.physical_device
    }

    pub fn get_queue_families(&self) -> &QueueFamilies {
        &self.queue_families
    }
}

/// Every catalog feature is requested whether or not it decided suitability.
/// Name the ones the device does not report so a creation failure can be traced.
fn warn_about_unsupported_features(
    instance: &Instance,
    physical_device: PhysicalDevice,
    catalog: &RequirementCatalog,
) {
    let supported = unsafe { instance.get_physical_device_features(physical_device) };
    let unsupported = catalog
        .device_features
        .iter()
        .copied()
        .filter(|feature| !feature.is_supported(&supported))
        .collect::<Vec<DeviceFeature>>();
    if !unsupported.is_empty() {
        warn!(
            "Requesting device features the device does not report: {:?}",
            unsupported
        );
    }
}

impl Deref for LogicalDevice {
    type Target = Device;

    fn deref(&self) -> &Self::Target {
        &self.device
    }
}

impl Drop for LogicalDevice {
    fn drop(&mut self) {
        debug!("Dropping LogicalDevice");
        unsafe { self.device.destroy_device(None) }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shared_graphics_and_present_family_needs_one_queue() {
        let queue_families = QueueFamilies {
            graphics: 1,
            present: 1,
            compute: 2,
        };
        assert_eq!(unique_queue_families(&queue_families), vec![1]);
    }

    #[test]
    fn distinct_families_get_a_queue_each_in_ascending_order() {
        let queue_families = QueueFamilies {
            graphics: 3,
            present: 0,
            compute: 3,
        };
        assert_eq!(unique_queue_families(&queue_families), vec![0, 3]);
    }

    #[test]
    fn device_layers_follow_validation_switch() {
        let catalog = RequirementCatalog::DEFAULT;
        let mut config = NegotiationConfig {
            enable_validation: false,
            ..Default::default()
        };
        assert!(device_layer_names(&catalog, &config).is_empty());

        config.enable_validation = true;
        assert_eq!(
            device_layer_names(&catalog, &config),
            catalog.validation_layers
        );
    }

    #[test]
    fn missing_extension_at_creation_names_only_the_absent_one() {
        let catalog = RequirementCatalog::DEFAULT;
        let error = creation_error(vk::Result::ERROR_EXTENSION_NOT_PRESENT, &catalog, || {
            Ok(HashSet::from([catalog.device_extensions[0]
                .to_string_lossy()
                .into_owned()]))
        });
        match error {
            NegotiationError::ExtensionUnsupported { extension } => assert_eq!(
                extension,
                catalog.device_extensions[1].to_string_lossy().into_owned()
            ),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unexplained_missing_extension_stays_a_creation_failure() {
        let catalog = RequirementCatalog::DEFAULT;
        let error = creation_error(vk::Result::ERROR_EXTENSION_NOT_PRESENT, &catalog, || {
            Err(vk::Result::ERROR_INITIALIZATION_FAILED)
        });
        assert!(matches!(
            error,
            NegotiationError::DeviceCreationFailed(vk::Result::ERROR_EXTENSION_NOT_PRESENT)
        ));
        assert_eq!(error.stage(), crate::NegotiationStage::LogicalDevice);
    }

    #[test]
    fn other_creation_failures_pass_through() {
        let error = creation_error(
            vk::Result::ERROR_OUT_OF_DEVICE_MEMORY,
            &RequirementCatalog::DEFAULT,
            || panic!("extensions are only looked up for a missing extension"),
        );
        assert!(matches!(
            error,
            NegotiationError::DeviceCreationFailed(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY)
        ));
    }
}
