use ash::vk::{
    ColorSpaceKHR, CompositeAlphaFlagsKHR, Extent2D, Format, PresentModeKHR, SharingMode,
    SurfaceCapabilitiesKHR, SurfaceFormatKHR, SurfaceTransformFlagsKHR,
};
use pretty_assertions::assert_eq;
use vk_negotiate::{
    NegotiationError, NegotiationStage, QueueFamilies, SurfaceConfiguration,
    SwapchainSupportDetails,
};

fn support(
    formats: Vec<SurfaceFormatKHR>,
    present_modes: Vec<PresentModeKHR>,
) -> SwapchainSupportDetails {
    SwapchainSupportDetails {
        capabilities: SurfaceCapabilitiesKHR {
            min_image_count: 2,
            max_image_count: 0,
            current_extent: Extent2D {
                width: u32::MAX,
                height: u32::MAX,
            },
            min_image_extent: Extent2D {
                width: 64,
                height: 64,
            },
            max_image_extent: Extent2D {
                width: 4096,
                height: 4096,
            },
            current_transform: SurfaceTransformFlagsKHR::IDENTITY,
            ..Default::default()
        },
        formats,
        present_modes,
    }
}

fn families(graphics: u32, present: u32) -> QueueFamilies {
    QueueFamilies {
        graphics,
        present,
        compute: graphics,
    }
}

#[test]
fn desktop_surface_with_split_queues() {
    let support = support(
        vec![
            SurfaceFormatKHR {
                format: Format::R8G8B8A8_UNORM,
                color_space: ColorSpaceKHR::EXTENDED_SRGB_LINEAR_EXT,
            },
            SurfaceFormatKHR {
                format: Format::B8G8R8A8_UNORM,
                color_space: ColorSpaceKHR::SRGB_NONLINEAR,
            },
        ],
        vec![PresentModeKHR::FIFO, PresentModeKHR::MAILBOX],
    );

    let configuration =
        SurfaceConfiguration::negotiate(&support, (8000, 10), &families(0, 1)).unwrap();

    assert_eq!(
        configuration,
        SurfaceConfiguration {
            format: Format::B8G8R8A8_UNORM,
            color_space: ColorSpaceKHR::SRGB_NONLINEAR,
            present_mode: PresentModeKHR::MAILBOX,
            extent: Extent2D {
                width: 4096,
                height: 64,
            },
            image_count: 3,
            sharing_mode: SharingMode::CONCURRENT,
            queue_family_indices: vec![0, 1],
            pre_transform: SurfaceTransformFlagsKHR::IDENTITY,
            composite_alpha: CompositeAlphaFlagsKHR::OPAQUE,
            clipped: true,
        }
    );
}

#[test]
fn fixed_extent_and_capped_image_count() {
    let mut support = support(
        vec![SurfaceFormatKHR {
            format: Format::UNDEFINED,
            color_space: ColorSpaceKHR::SRGB_NONLINEAR,
        }],
        vec![PresentModeKHR::FIFO],
    );
    support.capabilities.current_extent = Extent2D {
        width: 800,
        height: 600,
    };
    support.capabilities.max_image_count = 2;

    let configuration =
        SurfaceConfiguration::negotiate(&support, (1920, 1080), &families(2, 2)).unwrap();

    assert_eq!(configuration.format, Format::B8G8R8A8_UNORM);
    assert_eq!(configuration.present_mode, PresentModeKHR::FIFO);
    assert_eq!(
        configuration.extent,
        Extent2D {
            width: 800,
            height: 600,
        }
    );
    assert_eq!(configuration.image_count, 2);
    assert_eq!(configuration.sharing_mode, SharingMode::EXCLUSIVE);
    assert!(configuration.queue_family_indices.is_empty());
}

#[test]
fn negotiation_is_repeatable() {
    let support = support(
        vec![SurfaceFormatKHR {
            format: Format::R8G8B8A8_UNORM,
            color_space: ColorSpaceKHR::SRGB_NONLINEAR,
        }],
        vec![PresentModeKHR::MAILBOX],
    );
    let first = SurfaceConfiguration::negotiate(&support, (1280, 720), &families(0, 3)).unwrap();
    let second = SurfaceConfiguration::negotiate(&support, (1280, 720), &families(0, 3)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn surface_without_formats_fails_in_the_swapchain_stage() {
    let error = SurfaceConfiguration::negotiate(
        &support(vec![], vec![PresentModeKHR::FIFO]),
        (1280, 720),
        &families(0, 0),
    )
    .unwrap_err();
    assert!(matches!(error, NegotiationError::SurfaceFormatsUnavailable));
    assert_eq!(error.stage(), NegotiationStage::Swapchain);
}
