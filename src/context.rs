use std::rc::Rc;

use ash::{
    vk::{
        self, Extent2D, Format, FormatFeatureFlags, Image, PhysicalDevice, Queue,
        SampleCountFlags,
    },
    Device, Entry,
};
use tracing::{debug, info};

use crate::{
    find_queue_families, missing_device_extensions, select_physical_device, DebugMessenger,
    Instance, LogicalDevice, NegotiationConfig, NegotiationError, PresentationWindow,
    QueueFamilies, RequirementCatalog, Result, Surface, SurfaceConfiguration, SurfaceQueries,
    Swapchain, SwapchainSupportDetails,
};

/// Everything negotiated at startup. Fields drop top to bottom, which is the
/// required teardown order: swapchain, logical device, debug messenger,
/// surface, instance.
pub struct DeviceContext {
    swapchain: Swapchain,
    device: Rc<LogicalDevice>,
    _debug_messenger: Option<DebugMessenger>,
    surface: Rc<Surface>,
    instance: Rc<Instance>,
}

impl DeviceContext {
    /// Runs the whole negotiation once against `window`.
    pub fn new<W: PresentationWindow + ?Sized>(
        config: &NegotiationConfig,
        window: &W,
    ) -> Result<Self> {
        Self::with_catalog(config, &RequirementCatalog::DEFAULT, window)
    }

    pub fn with_catalog<W: PresentationWindow + ?Sized>(
        config: &NegotiationConfig,
        catalog: &RequirementCatalog,
        window: &W,
    ) -> Result<Self> {
        let display_handle = window
            .display_handle()
            .map_err(|_| NegotiationError::MissingWindowSurface)?;
        let window_extensions = ash_window::enumerate_required_extensions(display_handle.as_raw())
            .map_err(|err| NegotiationError::SurfaceCreationFailed(err.to_string()))?;

        let entry = unsafe { Entry::load()? };
        let instance = Rc::new(Instance::new(entry, window_extensions, catalog, config)?);
        let debug_messenger = config
            .enable_validation
            .then(|| DebugMessenger::new(&instance))
            .transpose()?;
        let surface = Rc::new(Surface::new(&instance, window)?);

        let queries = SurfaceQueries::new(&instance, &surface);
        let candidate = select_physical_device(&queries, catalog, config.strict_feature_gate)?;
        let physical_device = candidate.physical_device;

        // the candidate is dropped here, everything below is queried again for the winner
        let queue_families = resolve_queue_families(&queries, physical_device)?;
        if let Some(extension) = missing_device_extensions(&queries, physical_device, catalog)?
            .into_iter()
            .next()
        {
            return Err(NegotiationError::ExtensionUnsupported { extension });
        }
        let device = Rc::new(LogicalDevice::new(
            &instance,
            physical_device,
            queue_families,
            catalog,
            config,
        )?);

        let support = SwapchainSupportDetails::query(&queries, physical_device)
            .map_err(|err| match err {
                NegotiationError::DriverQuery { source, .. } => {
                    NegotiationError::SwapchainCreationFailed(source)
                }
                other => other,
            })?;
        let window_size = window.drawable_size();
        let configuration =
            SurfaceConfiguration::negotiate(&support, window_size, &queue_families)?;
        debug!(
            "Negotiated surface configuration for window size {:?}: {:?}",
            window_size, configuration
        );
        let swapchain = Swapchain::new(&instance, &device, &surface, configuration)?;
        info!("Device negotiation complete");

        Ok(Self {
            swapchain,
            device,
            _debug_messenger: debug_messenger,
            surface,
            instance,
        })
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn logical_device(&self) -> &Rc<LogicalDevice> {
        &self.device
    }

    pub fn instance(&self) -> &Rc<Instance> {
        &self.instance
    }

    pub fn surface(&self) -> &Rc<Surface> {
        &self.surface
    }

    pub fn physical_device(&self) -> PhysicalDevice {
        self.device.get_physical_device()
    }

    pub fn graphics_queue(&self) -> Queue {
        self.device.get_graphics_queue()
    }

    pub fn queue_families(&self) -> &QueueFamilies {
        self.device.get_queue_families()
    }

    pub fn swapchain(&self) -> &Swapchain {
        &self.swapchain
    }

    pub fn swapchain_images(&self) -> &[Image] {
        self.swapchain.get_images()
    }

    pub fn surface_configuration(&self) -> &SurfaceConfiguration {
        self.swapchain.get_configuration()
    }

    pub fn image_format(&self) -> Format {
        self.swapchain.get_image_format()
    }

    pub fn extent(&self) -> Extent2D {
        self.swapchain.get_extent()
    }

    fn properties(&self) -> vk::PhysicalDeviceProperties {
        unsafe {
            self.instance
                .get_physical_device_properties(self.physical_device())
        }
    }

    /// Name the driver reports for the selected GPU.
    pub fn name(&self) -> String {
        self.properties()
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// The device's allocation count limit, used as the working set hint.
    pub fn recommended_max_working_set_size(&self) -> u64 {
        u64::from(self.properties().limits.max_memory_allocation_count)
    }

    pub fn is_depth24_stencil8_pixel_format_supported(&self) -> bool {
        let properties = unsafe {
            self.instance.get_physical_device_format_properties(
                self.physical_device(),
                Format::D24_UNORM_S8_UINT,
            )
        };
        properties
            .optimal_tiling_features
            .contains(FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
    }

    pub fn is_low_power(&self) -> bool {
        false
    }

    /// Always false, a context is only ever built against a window surface.
    pub fn is_headless(&self) -> bool {
        false
    }

    pub fn supports_texture_sample_count(&self, sample_count: u32) -> bool {
        sample_count_supported(
            self.properties().limits.framebuffer_color_sample_counts,
            sample_count,
        )
    }
}

impl Drop for DeviceContext {
    fn drop(&mut self) {
        debug!("Tearing down device context");
        // nothing may still be using the swapchain images
        if let Err(err) = unsafe { self.device.device_wait_idle() } {
            debug!("device_wait_idle failed during teardown: {}", err);
        }
    }
}

fn resolve_queue_families(
    queries: &SurfaceQueries<'_>,
    physical_device: PhysicalDevice,
) -> Result<QueueFamilies> {
    let indices = find_queue_families(queries, physical_device)?;
    // selection already required completeness, a change here means the driver changed its mind
    indices
        .resolve()
        .ok_or(NegotiationError::NoSuitableDeviceFound {
            rejected: vec![format!("queue families changed after selection: {indices:?}")],
        })
}

/// Whether `sample_count` is one of the counts in `supported`.
fn sample_count_supported(supported: SampleCountFlags, sample_count: u32) -> bool {
    if !sample_count.is_power_of_two() || sample_count > 64 {
        return false;
    }
    supported.contains(SampleCountFlags::from_raw(sample_count))
}
