use log::LevelFilter;

#[cfg(feature = "enable_validations")]
const ENABLE_VALIDATIONS: bool = true;
#[cfg(not(feature = "enable_validations"))]
const ENABLE_VALIDATIONS: bool = false;

/// Startup switches for [`crate::DeviceContext::new`].
#[derive(Debug, Clone)]
pub struct NegotiationConfig {
    /// Reported to the driver as both application and engine name.
    pub application_name: String,
    /// Enables the validation layers and the debug messenger.
    pub enable_validation: bool,
    /// Gate device suitability on every requested device feature, not only
    /// sampler anisotropy.
    pub strict_feature_gate: bool,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            application_name: env!("CARGO_PKG_NAME").to_owned(),
            enable_validation: ENABLE_VALIDATIONS,
            strict_feature_gate: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LoggingConfig {
    /// Default level; `RUST_LOG` takes precedence when set.
    pub level: LevelFilter,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::Info,
        }
    }
}
