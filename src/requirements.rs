use std::ffi::CStr;

use ash::vk::{
    self, EXT_DEBUG_UTILS_NAME, KHR_MULTIVIEW_NAME, KHR_SURFACE_NAME, KHR_SWAPCHAIN_NAME,
};

/// Device features the negotiation knows how to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceFeature {
    SamplerAnisotropy,
    TessellationShader,
    MultiViewport,
    GeometryShader,
}

impl DeviceFeature {
    pub fn is_supported(self, features: &vk::PhysicalDeviceFeatures) -> bool {
        let flag = match self {
            Self::SamplerAnisotropy => features.sampler_anisotropy,
            Self::TessellationShader => features.tessellation_shader,
            Self::MultiViewport => features.multi_viewport,
            Self::GeometryShader => features.geometry_shader,
        };
        flag == vk::TRUE
    }

    pub fn enable(self, features: vk::PhysicalDeviceFeatures) -> vk::PhysicalDeviceFeatures {
        match self {
            Self::SamplerAnisotropy => features.sampler_anisotropy(true),
            Self::TessellationShader => features.tessellation_shader(true),
            Self::MultiViewport => features.multi_viewport(true),
            Self::GeometryShader => features.geometry_shader(true),
        }
    }
}

/// Fixed set of names and features a device has to provide.
#[derive(Debug, Clone, Copy)]
pub struct RequirementCatalog {
    pub instance_extensions: &'static [&'static CStr],
    /// Only enabled together with the validation layers.
    pub debug_extension: &'static CStr,
    pub validation_layers: &'static [&'static CStr],
    pub device_extensions: &'static [&'static CStr],
    /// Requested at logical device creation.
    pub device_features: &'static [DeviceFeature],
    /// Subset of `device_features` a candidate is rejected for lacking.
    pub gated_features: &'static [DeviceFeature],
}

impl RequirementCatalog {
    pub const DEFAULT: Self = Self {
        instance_extensions: &[KHR_SURFACE_NAME],
        debug_extension: EXT_DEBUG_UTILS_NAME,
        validation_layers: &[c"VK_LAYER_KHRONOS_validation"],
        device_extensions: &[KHR_SWAPCHAIN_NAME, KHR_MULTIVIEW_NAME],
        device_features: &[
            DeviceFeature::SamplerAnisotropy,
            DeviceFeature::TessellationShader,
            DeviceFeature::MultiViewport,
            DeviceFeature::GeometryShader,
        ],
        gated_features: &[DeviceFeature::SamplerAnisotropy],
    };

    /// Features that decide suitability, either the gated subset or all of them.
    pub fn features_to_gate(&self, strict: bool) -> &'static [DeviceFeature] {
        if strict {
            self.device_features
        } else {
            self.gated_features
        }
    }

    /// Feature struct with every catalog feature switched on.
    pub fn requested_features(&self) -> vk::PhysicalDeviceFeatures {
        self.device_features
            .iter()
            .fold(vk::PhysicalDeviceFeatures::default(), |features, feature| {
                feature.enable(features)
            })
    }
}

impl Default for RequirementCatalog {
    fn default() -> Self {
        Self::DEFAULT
    }
}
