use std::{ffi::CStr, rc::Rc};

use ash::{
    ext::debug_utils,
    vk::{
        self, Bool32, DebugUtilsMessageSeverityFlagsEXT, DebugUtilsMessageTypeFlagsEXT,
        DebugUtilsMessengerCallbackDataEXT, DebugUtilsMessengerCreateInfoEXT,
        DebugUtilsMessengerEXT,
    },
};
use tracing::{debug, event, Level};

use crate::{Instance, NegotiationError, Result};

/// Create info routing every validation message into [`vulkan_debug_utils_callback`].
pub fn get_debug_messenger_create_info<'a>() -> DebugUtilsMessengerCreateInfoEXT<'a> {
    DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            DebugUtilsMessageSeverityFlagsEXT::ERROR
                | DebugUtilsMessageSeverityFlagsEXT::WARNING
                | DebugUtilsMessageSeverityFlagsEXT::INFO
                | DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
        )
        .message_type(
            DebugUtilsMessageTypeFlagsEXT::GENERAL
                | DebugUtilsMessageTypeFlagsEXT::PERFORMANCE
                | DebugUtilsMessageTypeFlagsEXT::VALIDATION,
        )
        .pfn_user_callback(Some(vulkan_debug_utils_callback))
}

/// RAII for the debug utils messenger
pub struct DebugMessenger {
    debug_utils: debug_utils::Instance,
    messenger: DebugUtilsMessengerEXT,
    // keeps the instance alive until the messenger is destroyed
    _instance: Rc<Instance>,
}

impl DebugMessenger {
    pub fn new(instance: &Rc<Instance>) -> Result<Self> {
        let debug_utils = debug_utils::Instance::new(instance.get_entry(), instance);
        let create_info = get_debug_messenger_create_info();
        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }
            .map_err(NegotiationError::DebugMessengerCreationFailed)?;
        debug!("Debug messenger registered");
        Ok(Self {
            debug_utils,
            messenger,
            _instance: Rc::clone(instance),
        })
    }
}

impl Drop for DebugMessenger {
    fn drop(&mut self) {
        debug!("Dropping DebugMessenger");
        unsafe {
            self.debug_utils
                .destroy_debug_utils_messenger(self.messenger, None)
        }
    }
}

unsafe extern "system" fn vulkan_debug_utils_callback(
    message_severity: DebugUtilsMessageSeverityFlagsEXT,
    message_type: DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const DebugUtilsMessengerCallbackDataEXT<'_>,
    _p_user_data: *mut std::ffi::c_void,
) -> Bool32 {
    if p_callback_data.is_null() || (*p_callback_data).p_message.is_null() {
        return vk::FALSE;
    }
    let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();
    let ty = format!("{:?}", message_type).to_lowercase();

    match message_severity {
        DebugUtilsMessageSeverityFlagsEXT::VERBOSE => {
            event!(Level::TRACE, message = %message, ty = %ty)
        }
        DebugUtilsMessageSeverityFlagsEXT::INFO => {
            event!(Level::INFO, message = %message, ty = %ty)
        }
        DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            event!(Level::WARN, message = %message, ty = %ty)
        }
        _ => event!(Level::ERROR, message = %message, ty = %ty),
    }
    // dont skip driver
    vk::FALSE
}
