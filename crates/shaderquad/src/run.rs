use std::fs;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use renderer::{Playground, PlaygroundError, PlaygroundOptions, PointerTracker};
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

use crate::cli::{parse_clear_color, parse_surface_size, Cli};
use crate::config::PreviewConfig;
use crate::pacing::FramePacing;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(cli: Cli) -> Result<()> {
    let file_config = match &cli.config {
        Some(path) => PreviewConfig::load_or_default(path)?,
        None => PreviewConfig::default(),
    };

    let (width, height) = match &cli.size {
        Some(spec) => parse_surface_size(spec)?,
        None => (
            file_config.width.unwrap_or(640),
            file_config.height.unwrap_or(480),
        ),
    };
    let target_fps = cli.fps.or(file_config.fps).filter(|fps| *fps > 0.0);
    let shader_path = cli
        .shader
        .clone()
        .or(file_config.shader)
        .context("no fragment shader given; pass a path or set `shader` in the config file")?;
    let source = fs::read_to_string(&shader_path)
        .with_context(|| format!("failed to read shader at {}", shader_path.display()))?;

    let event_loop = EventLoop::new().context("failed to initialize event loop")?;
    let window = WindowBuilder::new()
        .with_title("shaderquad")
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .context("failed to create preview window")?;
    let window = Arc::new(window);

    let options = PlaygroundOptions {
        width,
        height,
        source: Some(source),
    };
    let mut playground = Playground::new(window.as_ref(), options)
        .map_err(|err| anyhow!("failed to initialise playground: {err}"))?;

    if let Some(spec) = &cli.clear {
        let [r, g, b, a] = parse_clear_color(spec)?;
        playground.set_clear_color(r, g, b, a);
    }

    tracing::info!(
        width,
        height,
        shader = %shader_path.display(),
        fps_cap = ?target_fps,
        "starting preview loop"
    );

    let feed = playground.pointer_feed();
    let mut tracker = PointerTracker::default();
    let mut pacing = FramePacing::new(target_fps);

    window.request_redraw();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);

            match event {
                Event::WindowEvent { window_id, event } if window_id == window.id() => {
                    match event {
                        WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                            elwt.exit();
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed
                                && matches!(event.logical_key, Key::Named(NamedKey::Escape))
                            {
                                elwt.exit();
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            tracker.handle_moved(position.x, position.y);
                            feed.push(tracker.sample(playground.surface().height() as f32));
                        }
                        WindowEvent::MouseInput { state, button, .. } => {
                            if button == MouseButton::Left {
                                tracker.handle_button(state == ElementState::Pressed);
                                feed.push(tracker.sample(playground.surface().height() as f32));
                            }
                        }
                        WindowEvent::Resized(new_size) => {
                            playground.set_size(new_size.width, new_size.height);
                        }
                        WindowEvent::ScaleFactorChanged {
                            mut inner_size_writer,
                            ..
                        } => {
                            // Keep the current surface size when the scale factor changes.
                            let extent = playground.surface();
                            let _ = inner_size_writer.request_inner_size(PhysicalSize::new(
                                extent.width(),
                                extent.height(),
                            ));
                        }
                        WindowEvent::RedrawRequested => match playground.render() {
                            Ok(()) => pacing.mark_rendered(Instant::now()),
                            Err(PlaygroundError::Surface(
                                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                            )) => {
                                let extent = playground.surface();
                                playground.set_size(extent.width(), extent.height());
                            }
                            Err(PlaygroundError::Surface(wgpu::SurfaceError::OutOfMemory)) => {
                                tracing::error!("surface out of memory; exiting preview");
                                elwt.exit();
                            }
                            Err(PlaygroundError::Surface(other)) => {
                                tracing::warn!("surface error: {other:?}; retrying next frame");
                            }
                            Err(err) => {
                                tracing::error!(error = %err, "render failed");
                                elwt.exit();
                            }
                        },
                        _ => {}
                    }
                }
                Event::AboutToWait => {
                    let now = Instant::now();
                    if pacing.ready_for_frame(now) {
                        window.request_redraw();
                    } else if let Some(deadline) = pacing.next_deadline() {
                        elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("event loop error: {err}"))
}
