use std::{
    ffi::{c_char, CStr, CString},
    ops::Deref,
};

use ash::{
    vk::{make_api_version, ApplicationInfo, InstanceCreateInfo, API_VERSION_1_1},
    Entry,
};
use tracing::{debug, info};

use crate::{
    get_debug_messenger_create_info, NegotiationConfig, NegotiationError, RequirementCatalog,
    Result,
};

const API_VERSION: u32 = API_VERSION_1_1;

pub struct Instance {
    instance: ash::Instance,
    entry: Entry,
}

impl Instance {
    /// Creates an Instance to interact with the core of Vulkan. Registers the needed extensions and
    /// layers, as well as basic information about the application.
    pub fn new(
        entry: Entry,
        window_extensions: &[*const c_char],
        catalog: &RequirementCatalog,
        config: &NegotiationConfig,
    ) -> Result<Self> {
        let appname = CString::new(config.application_name.as_str())?;
        let app_version = make_api_version(0, 1, 0, 0);

        let app_info = ApplicationInfo::default()
            .application_name(&appname)
            .application_version(app_version)
            .api_version(API_VERSION)
            .engine_name(&appname)
            .engine_version(app_version);

        let window_extensions = window_extensions
            .iter()
            .map(|extension| unsafe { CStr::from_ptr(*extension) })
            .collect::<Vec<_>>();
        let enabled_extension_names =
            required_instance_extensions(&window_extensions, catalog, config.enable_validation);
        let enabled_extension_name_ptrs = enabled_extension_names
            .iter()
            .map(|extension_name| extension_name.as_ptr())
            .collect::<Vec<_>>();
        debug!("Instance extensions to enable: {:?}", enabled_extension_names);

        let enabled_layer_names = required_layers(catalog, config.enable_validation);
        let enabled_layer_name_ptrs = enabled_layer_names
            .iter()
            .map(|layer_name| layer_name.as_ptr())
            .collect::<Vec<_>>();
        debug!("Layers to enable: {:?}", enabled_layer_names);

        let mut debug_messenger_create_info = get_debug_messenger_create_info();

        let mut instance_create_info = InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&enabled_extension_name_ptrs)
            .enabled_layer_names(&enabled_layer_name_ptrs);
        // only chain the messenger when its extension is actually enabled
        if config.enable_validation {
            instance_create_info = instance_create_info.push_next(&mut debug_messenger_create_info);
        }

        let instance = unsafe { entry.create_instance(&instance_create_info, None) }
            .map_err(NegotiationError::InstanceCreationFailed)?;
        info!("Vulkan instance created");

        Ok(Self { instance, entry })
    }

    pub fn get_entry(&self) -> &Entry {
        &self.entry
    }
}

/// Returns the needed instance extensions: whatever the windowing system needs,
/// the catalog's instance extensions, and the debug extension if validations
/// are enabled. Duplicates are dropped, first occurrence wins.
fn required_instance_extensions(
    window_extensions: &[&'static CStr],
    catalog: &RequirementCatalog,
    enable_validation: bool,
) -> Vec<&'static CStr> {
    let mut extension_names: Vec<&'static CStr> = Vec::new();
    let debug_extension = enable_validation.then_some(catalog.debug_extension);
    for name in window_extensions
        .iter()
        .chain(catalog.instance_extensions)
        .copied()
        .chain(debug_extension)
    {
        if !extension_names.contains(&name) {
            extension_names.push(name);
        }
    }
    extension_names
}

/// Returns the required layers needed for Vulkan. Notably, includes the validation
/// layer if validations are enabled.
pub(crate) fn required_layers(
    catalog: &RequirementCatalog,
    enable_validation: bool,
) -> &'static [&'static CStr] {
    if enable_validation {
        catalog.validation_layers
    } else {
        &[]
    }
}

impl Drop for Instance {
    fn drop(&mut self) {
        debug!("Dropping Instance");
        unsafe { self.instance.destroy_instance(None) }
    }
}

impl Deref for Instance {
    type Target = ash::Instance;

    fn deref(&self) -> &Self::Target {
        &self.instance
    }
}

#[cfg(test)]
mod tests {
    use ash::vk::{EXT_DEBUG_UTILS_NAME, KHR_SURFACE_NAME};
    use pretty_assertions::assert_eq;

    use super::*;

    const XLIB_SURFACE: &CStr = c"VK_KHR_xlib_surface";

    #[test]
    fn window_extensions_are_merged_without_duplicates() {
        let names = required_instance_extensions(
            &[KHR_SURFACE_NAME, XLIB_SURFACE],
            &RequirementCatalog::DEFAULT,
            false,
        );
        assert_eq!(names, vec![KHR_SURFACE_NAME, XLIB_SURFACE]);
    }

    #[test]
    fn debug_extension_follows_validation_switch() {
        let catalog = RequirementCatalog::DEFAULT;
        let with = required_instance_extensions(&[], &catalog, true);
        let without = required_instance_extensions(&[], &catalog, false);
        assert!(with.contains(&EXT_DEBUG_UTILS_NAME));
        assert!(!without.contains(&EXT_DEBUG_UTILS_NAME));
    }

    #[test]
    fn layers_only_with_validation() {
        let catalog = RequirementCatalog::DEFAULT;
        assert!(required_layers(&catalog, false).is_empty());
        assert_eq!(
            required_layers(&catalog, true),
            &[c"VK_LAYER_KHRONOS_validation"]
        );
    }
}
