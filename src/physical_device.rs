use std::{collections::HashSet, fmt};

use ash::vk::PhysicalDevice;
use tracing::{debug, info};

use crate::{
    error::query_failed, find_queue_families, DeviceFeature, DeviceQueries, NegotiationError,
    QueueFamilyIndices, RequirementCatalog, Result, SwapchainSupportDetails,
};

/// Why a physical device was turned down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    IncompleteQueueFamilies(QueueFamilyIndices),
    MissingExtensions(Vec<String>),
    InadequateSwapchain { formats: usize, present_modes: usize },
    MissingFeatures(Vec<DeviceFeature>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompleteQueueFamilies(indices) => write!(
                f,
                "incomplete queue families (graphics {:?}, present {:?}, compute {:?})",
                indices.graphics, indices.present, indices.compute
            ),
            Self::MissingExtensions(names) => {
                write!(f, "missing extensions {}", names.join(", "))
            }
            Self::InadequateSwapchain {
                formats,
                present_modes,
            } => write!(
                f,
                "inadequate swapchain support ({formats} formats, {present_modes} present modes)"
            ),
            Self::MissingFeatures(features) => write!(f, "missing features {:?}", features),
        }
    }
}

/// A physical device together with everything learnt while evaluating it.
#[derive(Debug, Clone)]
pub struct PhysicalDeviceCandidate {
    pub physical_device: PhysicalDevice,
    pub name: String,
    pub queue_families: QueueFamilyIndices,
    /// Only queried once the required extensions are known to be present.
    pub swapchain_support: Option<SwapchainSupportDetails>,
    pub rejections: Vec<Rejection>,
}

impl PhysicalDeviceCandidate {
    /// Checks `physical_device` against the catalog. Every check is run so the
    /// candidate carries the complete list of reasons it is unusable.
    pub fn evaluate<Q: DeviceQueries + ?Sized>(
        queries: &Q,
        physical_device: PhysicalDevice,
        catalog: &RequirementCatalog,
        strict_feature_gate: bool,
    ) -> Result<Self> {
        let name = queries.device_name(physical_device);
        let mut rejections = vec![];

        let queue_families = find_queue_families(queries, physical_device)?;
        if !queue_families.is_complete() {
            rejections.push(Rejection::IncompleteQueueFamilies(queue_families));
        }

        let missing_extensions = missing_device_extensions(queries, physical_device, catalog)?;
        let supports_extensions = missing_extensions.is_empty();
        if !supports_extensions {
            rejections.push(Rejection::MissingExtensions(missing_extensions));
        }

        let mut swapchain_support = None;
        if supports_extensions {
            let support = SwapchainSupportDetails::query(queries, physical_device)?;
            if !support.is_adequate() {
                rejections.push(Rejection::InadequateSwapchain {
                    formats: support.formats.len(),
                    present_modes: support.present_modes.len(),
                });
            }
            swapchain_support = Some(support);
        }

        let features = queries.features(physical_device);
        let missing_features = catalog
            .features_to_gate(strict_feature_gate)
            .iter()
            .copied()
            .filter(|feature| !feature.is_supported(&features))
            .collect::<Vec<_>>();
        if !missing_features.is_empty() {
            rejections.push(Rejection::MissingFeatures(missing_features));
        }

        Ok(Self {
            physical_device,
            name,
            queue_families,
            swapchain_support,
            rejections,
        })
    }

    pub fn is_suitable(&self) -> bool {
        self.rejections.is_empty()
    }

    fn describe_rejections(&self) -> String {
        let reasons = self
            .rejections
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        format!("{}: {}", self.name, reasons.join(", "))
    }
}

/// Required device extensions that `physical_device` does not advertise, in catalog order.
pub fn missing_device_extensions<Q: DeviceQueries + ?Sized>(
    queries: &Q,
    physical_device: PhysicalDevice,
    catalog: &RequirementCatalog,
) -> Result<Vec<String>> {
    let available = queries
        .extension_names(physical_device)
        .map_err(query_failed("vkEnumerateDeviceExtensionProperties"))?;
    Ok(absent_extensions(catalog, &available))
}

/// Catalog device extensions not in `available`, in catalog order.
pub(crate) fn absent_extensions(
    catalog: &RequirementCatalog,
    available: &HashSet<String>,
) -> Vec<String> {
    catalog
        .device_extensions
        .iter()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !available.contains(name))
        .collect()
}

/// Returns the first enumerated device that passes every check. Devices are
/// not ranked, so on a multi GPU machine the first suitable one wins even if
/// a later one is more capable.
pub fn select_physical_device<Q: DeviceQueries + ?Sized>(
    queries: &Q,
    catalog: &RequirementCatalog,
    strict_feature_gate: bool,
) -> Result<PhysicalDeviceCandidate> {
    let physical_devices = queries
        .enumerate_physical_devices()
        .map_err(query_failed("vkEnumeratePhysicalDevices"))?;
    if physical_devices.is_empty() {
        return Err(NegotiationError::NoPhysicalDevicesFound);
    }
    debug!("Found {} physical device(s)", physical_devices.len());

    let mut rejected = vec![];
    for physical_device in physical_devices {
        let candidate = PhysicalDeviceCandidate::evaluate(
            queries,
            physical_device,
            catalog,
            strict_feature_gate,
        )?;
        if candidate.is_suitable() {
            info!("Selected physical device `{}`", candidate.name);
            return Ok(candidate);
        }
        let description = candidate.describe_rejections();
        info!("Skipping physical device {}", description);
        rejected.push(description);
    }
    Err(NegotiationError::NoSuitableDeviceFound { rejected })
}

#[cfg(test)]
mod tests {
    use ash::vk::{self, QueueFlags};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::queries::fake::{family, FakeDevice, FakeDriver};

    fn evaluate(device: FakeDevice, strict: bool) -> PhysicalDeviceCandidate {
        let driver = FakeDriver::new(vec![device]);
        PhysicalDeviceCandidate::evaluate(
            &driver,
            FakeDriver::handle(0),
            &RequirementCatalog::DEFAULT,
            strict,
        )
        .unwrap()
    }

    #[test]
    fn capable_device_is_suitable() {
        let candidate = evaluate(FakeDevice::capable("gpu"), false);
        assert!(candidate.is_suitable());
        assert_eq!(candidate.name, "gpu");
        assert!(candidate.swapchain_support.is_some());
    }

    #[test]
    fn missing_extension_rejects_an_otherwise_capable_device() {
        let mut device = FakeDevice::capable("gpu");
        device.extensions.retain(|name| name != "VK_KHR_multiview");
        let candidate = evaluate(device, false);
        assert!(!candidate.is_suitable());
        assert_eq!(
            candidate.rejections,
            vec![Rejection::MissingExtensions(vec![
                "VK_KHR_multiview".to_owned()
            ])]
        );
        // swapchain support is never queried without the extensions
        assert!(candidate.swapchain_support.is_none());
    }

    #[test]
    fn empty_present_modes_are_inadequate() {
        let mut device = FakeDevice::capable("gpu");
        device.present_modes.clear();
        let candidate = evaluate(device, false);
        assert_eq!(
            candidate.rejections,
            vec![Rejection::InadequateSwapchain {
                formats: 1,
                present_modes: 0
            }]
        );
    }

    #[test]
    fn anisotropy_is_the_only_default_gate() {
        let mut device = FakeDevice::capable("gpu");
        device.features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(true);
        assert!(evaluate(device.clone(), false).is_suitable());

        let strict = evaluate(device, true);
        assert_eq!(
            strict.rejections,
            vec![Rejection::MissingFeatures(vec![
                DeviceFeature::TessellationShader,
                DeviceFeature::MultiViewport,
                DeviceFeature::GeometryShader,
            ])]
        );

        let mut no_anisotropy = FakeDevice::capable("gpu");
        no_anisotropy.features.sampler_anisotropy = vk::FALSE;
        assert_eq!(
            evaluate(no_anisotropy, false).rejections,
            vec![Rejection::MissingFeatures(vec![
                DeviceFeature::SamplerAnisotropy
            ])]
        );
    }

    #[test]
    fn every_failed_check_is_recorded() {
        let device = FakeDevice {
            name: "bare".to_owned(),
            queue_families: vec![family(QueueFlags::TRANSFER, 1)],
            ..Default::default()
        };
        let candidate = evaluate(device, false);
        assert_eq!(candidate.rejections.len(), 3);
        assert!(matches!(
            candidate.rejections[0],
            Rejection::IncompleteQueueFamilies(_)
        ));
    }

    #[test]
    fn empty_enumeration_fails_before_evaluating_anything() {
        let driver = FakeDriver::default();
        let result = select_physical_device(&driver, &RequirementCatalog::DEFAULT, false);
        assert!(matches!(result, Err(NegotiationError::NoPhysicalDevicesFound)));
        assert_eq!(driver.device_queries.get(), 0);
    }

    #[test]
    fn first_suitable_device_wins() {
        let mut unsuitable = FakeDevice::capable("integrated");
        unsuitable.extensions.clear();
        let driver = FakeDriver::new(vec![
            unsuitable,
            FakeDevice::capable("first"),
            FakeDevice::capable("second"),
        ]);
        let candidate =
            select_physical_device(&driver, &RequirementCatalog::DEFAULT, false).unwrap();
        assert_eq!(candidate.name, "first");
        assert_eq!(candidate.physical_device, FakeDriver::handle(1));
    }

    #[test]
    fn no_suitable_device_reports_each_rejection() {
        let mut first = FakeDevice::capable("a");
        first.extensions.clear();
        let mut second = FakeDevice::capable("b");
        second.formats.clear();
        let driver = FakeDriver::new(vec![first, second]);
        match select_physical_device(&driver, &RequirementCatalog::DEFAULT, false) {
            Err(NegotiationError::NoSuitableDeviceFound { rejected }) => {
                assert_eq!(rejected.len(), 2);
                assert!(rejected[0].starts_with("a: missing extensions VK_KHR_swapchain"));
                assert!(rejected[1].contains("0 formats"));
            }
            other => panic!("unexpected selection result {other:?}"),
        }
    }
}
