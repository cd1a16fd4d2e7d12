use std::ffi::NulError;

use ash::{vk, LoadingError};
use thiserror::Error;

pub type Result<T, E = NegotiationError> = std::result::Result<T, E>;

/// The step of the negotiation sequence an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NegotiationStage {
    Instance,
    Surface,
    DeviceSelection,
    LogicalDevice,
    Swapchain,
}

/// Everything that can abort device negotiation. None of these are retried.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("failed to load the Vulkan loader library")]
    LoaderUnavailable(#[from] LoadingError),
    #[error("failed to create the Vulkan instance")]
    InstanceCreationFailed(#[source] vk::Result),
    #[error("failed to register the validation debug messenger")]
    DebugMessengerCreationFailed(#[source] vk::Result),
    #[error("name passed to Vulkan contains an interior nul byte")]
    InvalidName(#[from] NulError),
    #[error("no live window handle to create a presentation surface from")]
    MissingWindowSurface,
    #[error("failed to create window surface: {0}")]
    SurfaceCreationFailed(String),
    #[error("driver query `{query}` failed")]
    DriverQuery {
        query: &'static str,
        #[source]
        source: vk::Result,
    },
    #[error("failed to find GPUs with Vulkan support")]
    NoPhysicalDevicesFound,
    #[error("failed to find a suitable GPU: {}", rejected.join("; "))]
    NoSuitableDeviceFound { rejected: Vec<String> },
    #[error("required device extension `{extension}` is not supported")]
    ExtensionUnsupported { extension: String },
    #[error("failed to create the logical device")]
    DeviceCreationFailed(#[source] vk::Result),
    #[error("the surface reports no usable formats")]
    SurfaceFormatsUnavailable,
    #[error("failed to create the swapchain")]
    SwapchainCreationFailed(#[source] vk::Result),
}

impl NegotiationError {
    pub fn stage(&self) -> NegotiationStage {
        match self {
            Self::LoaderUnavailable(_)
            | Self::InstanceCreationFailed(_)
            | Self::DebugMessengerCreationFailed(_)
            | Self::InvalidName(_) => NegotiationStage::Instance,
            Self::MissingWindowSurface | Self::SurfaceCreationFailed(_) => {
                NegotiationStage::Surface
            }
            Self::DriverQuery { .. }
            | Self::NoPhysicalDevicesFound
            | Self::NoSuitableDeviceFound { .. } => NegotiationStage::DeviceSelection,
            Self::ExtensionUnsupported { .. } | Self::DeviceCreationFailed(_) => {
                NegotiationStage::LogicalDevice
            }
            Self::SurfaceFormatsUnavailable | Self::SwapchainCreationFailed(_) => {
                NegotiationStage::Swapchain
            }
        }
    }
}

/// Adapts a failed driver query into a [`NegotiationError::DriverQuery`].
pub(crate) fn query_failed(query: &'static str) -> impl FnOnce(vk::Result) -> NegotiationError {
    move |source| NegotiationError::DriverQuery { query, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_distinguish_missing_gpu_from_incompatible_gpu() {
        assert_eq!(
            NegotiationError::NoPhysicalDevicesFound.stage(),
            NegotiationStage::DeviceSelection
        );
        assert_eq!(
            NegotiationError::ExtensionUnsupported {
                extension: "VK_KHR_swapchain".to_owned()
            }
            .stage(),
            NegotiationStage::LogicalDevice
        );
        assert_eq!(
            query_failed("vkEnumeratePhysicalDevices")(vk::Result::ERROR_INITIALIZATION_FAILED)
                .stage(),
            NegotiationStage::DeviceSelection
        );
        assert_eq!(
            NegotiationError::MissingWindowSurface.stage(),
            NegotiationStage::Surface
        );
        assert_eq!(
            NegotiationError::SwapchainCreationFailed(vk::Result::ERROR_OUT_OF_DEVICE_MEMORY)
                .stage(),
            NegotiationStage::Swapchain
        );
    }

    #[test]
    fn debug_messenger_failure_belongs_to_instance_setup() {
        let error =
            NegotiationError::DebugMessengerCreationFailed(vk::Result::ERROR_OUT_OF_HOST_MEMORY);
        assert_eq!(error.stage(), NegotiationStage::Instance);
        assert_eq!(
            error.to_string(),
            "failed to register the validation debug messenger"
        );
    }

    #[test]
    fn no_suitable_device_lists_every_rejection() {
        let error = NegotiationError::NoSuitableDeviceFound {
            rejected: vec!["gpu0: a".to_owned(), "gpu1: b".to_owned()],
        };
        assert_eq!(
            error.to_string(),
            "failed to find a suitable GPU: gpu0: a; gpu1: b"
        );
    }
}
