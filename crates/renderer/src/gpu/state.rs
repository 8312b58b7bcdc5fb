use std::time::Instant;

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::debug;

use crate::error::PlaygroundError;
use crate::gpu::clock::FrameClock;
use crate::gpu::context::GpuContext;
use crate::gpu::pipeline::{PipelineLayouts, ShaderProgram, QUAD_VERTEX_COUNT};
use crate::gpu::uniforms::FrameUniforms;
use crate::input::{PointerFeed, PointerSample};
use crate::types::{SurfaceExtent, UniformValue};

/// Aggregates every GPU resource needed to present a frame.
///
/// The program slot starts empty; `render()` refuses to draw until a
/// `set_source` call has linked a program. Replacing the program drops the
/// previous one, releasing its pipeline and buffers.
pub(crate) struct GpuState {
    context: GpuContext,
    layouts: PipelineLayouts,
    frame_buffer: wgpu::Buffer,
    uniforms: FrameUniforms,
    program: Option<ShaderProgram>,
    clock: FrameClock,
    clear_color: wgpu::Color,
    pointer_tx: Sender<PointerSample>,
    pointer_rx: Receiver<PointerSample>,
    pointer: PointerSample,
}

impl GpuState {
    pub(crate) fn new(context: GpuContext) -> Result<Self, PlaygroundError> {
        let layouts = PipelineLayouts::new(&context.device)?;

        let uniforms = FrameUniforms::new(context.extent());
        let frame_buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame uniform buffer"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let (pointer_tx, pointer_rx) = unbounded();

        Ok(Self {
            context,
            layouts,
            frame_buffer,
            uniforms,
            program: None,
            clock: FrameClock::new(),
            clear_color: wgpu::Color::BLACK,
            pointer_tx,
            pointer_rx,
            pointer: PointerSample::default(),
        })
    }

    pub(crate) fn extent(&self) -> SurfaceExtent {
        self.context.extent()
    }

    pub(crate) fn device(&self) -> &wgpu::Device {
        &self.context.device
    }

    pub(crate) fn queue(&self) -> &wgpu::Queue {
        &self.context.queue
    }

    pub(crate) fn pointer_feed(&self) -> PointerFeed {
        PointerFeed::new(self.pointer_tx.clone())
    }

    pub(crate) fn set_size(&mut self, width: u32, height: u32) {
        self.context.set_size(width, height);
        self.uniforms.set_resolution(self.context.extent());
    }

    pub(crate) fn set_width(&mut self, width: u32) {
        self.context.set_width(width);
        self.uniforms.set_resolution(self.context.extent());
    }

    pub(crate) fn set_height(&mut self, height: u32) {
        self.context.set_height(height);
        self.uniforms.set_resolution(self.context.extent());
    }

    /// Compiles and links a new fragment program.
    ///
    /// Re-entrant: a successful call supersedes the active program; a failed
    /// call reports the diagnostic and leaves the active program in place.
    pub(crate) fn set_source(&mut self, source: &str) -> Result<(), PlaygroundError> {
        let program = ShaderProgram::build(
            &self.context.device,
            &self.layouts,
            &self.frame_buffer,
            self.context.surface_format,
            source,
        )?;
        let replaced = self.program.replace(program).is_some();
        debug!(replaced, "fragment program linked and activated");
        Ok(())
    }

    /// Sets the color the framebuffer is cleared to ahead of each draw.
    pub(crate) fn set_clear_color(&mut self, r: f64, g: f64, b: f64, a: f64) {
        self.clear_color = wgpu::Color { r, g, b, a };
    }

    /// Writes a custom uniform in the active program.
    pub(crate) fn set_uniform(
        &mut self,
        name: &str,
        value: &UniformValue,
    ) -> Result<(), PlaygroundError> {
        let program = self.program.as_mut().ok_or(PlaygroundError::NoProgram)?;
        program.set_uniform(name, value)
    }

    /// Draws one frame.
    ///
    /// Latches the start timestamp on first invocation, refreshes the frame
    /// uniforms from the surface extent, elapsed seconds, and the latest
    /// pointer sample, then clears, draws the quad strip, and submits.
    pub(crate) fn render(&mut self, now: Instant) -> Result<(), PlaygroundError> {
        if self.program.is_none() {
            return Err(PlaygroundError::NoProgram);
        }

        if let Some(sample) = self.pointer_rx.try_iter().last() {
            self.pointer = sample;
        }

        let seconds = self.clock.elapsed_seconds(now);
        self.uniforms.set_time(seconds);
        self.uniforms.set_pointer(self.pointer);
        self.context.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&self.uniforms),
        );

        let program = self.program.as_mut().expect("program checked above");
        program.flush_user_uniforms(&self.context.queue);

        let frame = self.context.acquire_frame()?;
        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("render encoder"),
                });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&program.pipeline);
            render_pass.set_bind_group(0, &program.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.layouts.position_buffer.slice(..));
            render_pass.draw(0..QUAD_VERTEX_COUNT, 0..1);
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        tracing::trace!(
            time = seconds,
            width = self.context.extent().width(),
            height = self.context.extent().height(),
            "presented frame"
        );
        Ok(())
    }
}
