use raw_window_handle::{HasDisplayHandle, HasWindowHandle};

use crate::error::PlaygroundError;
use crate::types::SurfaceExtent;

/// Where frames end up: a window swapchain or an offscreen texture.
///
/// The offscreen variant exists so embedders and tests can construct the
/// playground without a windowing system; it renders into a private texture
/// of the same extent.
enum RenderTarget {
    Windowed {
        surface: wgpu::Surface<'static>,
        config: wgpu::SurfaceConfiguration,
    },
    Headless {
        _texture: wgpu::Texture,
        view: wgpu::TextureView,
    },
}

/// A frame acquired for drawing. Swapchain frames must be presented after
/// submission; offscreen frames only need the submit.
pub(crate) enum FrameTarget {
    Swapchain {
        frame: wgpu::SurfaceTexture,
        view: wgpu::TextureView,
    },
    Offscreen {
        view: wgpu::TextureView,
    },
}

impl FrameTarget {
    pub fn view(&self) -> &wgpu::TextureView {
        match self {
            FrameTarget::Swapchain { view, .. } => view,
            FrameTarget::Offscreen { view } => view,
        }
    }

    pub fn present(self) {
        if let FrameTarget::Swapchain { frame, .. } = self {
            frame.present();
        }
    }
}

/// Owns the acceleration context and the drawable surface.
///
/// Every resize reconfigures the target so the viewport always equals
/// `(0, 0, width, height)` for the stored extent.
pub(crate) struct GpuContext {
    _instance: wgpu::Instance,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_format: wgpu::TextureFormat,
    target: RenderTarget,
    extent: SurfaceExtent,
}

impl GpuContext {
    /// Acquires an acceleration context bound to a window target.
    ///
    /// Fails with [`PlaygroundError::EnvironmentUnavailable`] when no
    /// surface, adapter, or device can be acquired; construction failures
    /// are fatal and never retried.
    pub(crate) fn new<T>(target: &T, extent: SurfaceExtent) -> Result<Self, PlaygroundError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target.window_handle().map_err(|err| {
            PlaygroundError::EnvironmentUnavailable(format!(
                "failed to acquire window handle: {err}"
            ))
        })?;
        let display_handle = target.display_handle().map_err(|err| {
            PlaygroundError::EnvironmentUnavailable(format!(
                "failed to acquire display handle: {err}"
            ))
        })?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| {
            PlaygroundError::EnvironmentUnavailable(format!(
                "failed to create rendering surface: {err}"
            ))
        })?;

        let (adapter, device, queue) = request_device(&instance, Some(&surface))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let present_mode = surface_caps
            .present_modes
            .iter()
            .copied()
            .find(|mode| *mode == wgpu::PresentMode::Fifo)
            .unwrap_or(surface_caps.present_modes[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: extent.width(),
            height: extent.height(),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 1,
        };
        surface.configure(&device, &config);

        tracing::debug!(
            width = extent.width(),
            height = extent.height(),
            format = ?surface_format,
            "configured windowed surface"
        );

        Ok(Self {
            _instance: instance,
            device,
            queue,
            surface_format,
            target: RenderTarget::Windowed { surface, config },
            extent,
        })
    }

    /// Acquires an acceleration context rendering into an offscreen texture.
    pub(crate) fn headless(extent: SurfaceExtent) -> Result<Self, PlaygroundError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let (_adapter, device, queue) = request_device(&instance, None)?;
        let surface_format = wgpu::TextureFormat::Rgba8UnormSrgb;
        let (texture, view) = offscreen_target(&device, surface_format, extent);

        tracing::debug!(
            width = extent.width(),
            height = extent.height(),
            "configured headless target"
        );

        Ok(Self {
            _instance: instance,
            device,
            queue,
            surface_format,
            target: RenderTarget::Headless {
                _texture: texture,
                view,
            },
            extent,
        })
    }

    pub(crate) fn extent(&self) -> SurfaceExtent {
        self.extent
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.extent = SurfaceExtent::new(width, height);
        self.sync_target();
    }

    pub(crate) fn set_width(&mut self, width: u32) {
        self.extent.set_width(width);
        self.sync_target();
    }

    pub(crate) fn set_height(&mut self, height: u32) {
        self.extent.set_height(height);
        self.sync_target();
    }

    /// Reapplies the stored extent to the underlying target.
    fn sync_target(&mut self) {
        match &mut self.target {
            RenderTarget::Windowed { surface, config } => {
                config.width = self.extent.width();
                config.height = self.extent.height();
                surface.configure(&self.device, config);
            }
            RenderTarget::Headless { _texture, view } => {
                let (texture, new_view) =
                    offscreen_target(&self.device, self.surface_format, self.extent);
                *_texture = texture;
                *view = new_view;
            }
        }
        tracing::debug!(
            width = self.extent.width(),
            height = self.extent.height(),
            "viewport resynchronized"
        );
    }

    /// Acquires the next frame to draw into.
    pub(crate) fn acquire_frame(&self) -> Result<FrameTarget, PlaygroundError> {
        match &self.target {
            RenderTarget::Windowed { surface, .. } => {
                let frame = surface.get_current_texture()?;
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                Ok(FrameTarget::Swapchain { frame, view })
            }
            RenderTarget::Headless { view, .. } => Ok(FrameTarget::Offscreen { view: view.clone() }),
        }
    }
}

fn request_device(
    instance: &wgpu::Instance,
    compatible_surface: Option<&wgpu::Surface<'_>>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), PlaygroundError> {
    let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::HighPerformance,
        compatible_surface,
        force_fallback_adapter: false,
    }))
    .map_err(|err| {
        PlaygroundError::EnvironmentUnavailable(format!("no suitable GPU adapter: {err}"))
    })?;

    let limits = adapter.limits();
    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("shaderquad device"),
        required_features: wgpu::Features::empty(),
        required_limits: limits,
        memory_hints: wgpu::MemoryHints::default(),
        trace: wgpu::Trace::default(),
    }))
    .map_err(|err| {
        PlaygroundError::EnvironmentUnavailable(format!("failed to create GPU device: {err}"))
    })?;

    Ok((adapter, device, queue))
}

fn offscreen_target(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    extent: SurfaceExtent,
) -> (wgpu::Texture, wgpu::TextureView) {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("headless color target"),
        size: wgpu::Extent3d {
            width: extent.width(),
            height: extent.height(),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
