mod config;

use anyhow::{Context, Result};
use clap::Parser;
use config::AppConfig;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use stilllife_input::{HeldKeys, Key, KeyAction, ViewState};
use stilllife_render_wgpu::WgpuRenderer;
use stilllife_scene::{PrepareReport, SceneComposer, still_life};
use stilllife_tools::SceneInspector;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{
    DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent,
};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

/// Pixels of touchpad scroll that count as one wheel notch.
const PIXELS_PER_SCROLL_LINE: f32 = 40.0;

#[derive(Parser)]
#[command(name = "stilllife-desktop", about = "Interactive still-life viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory holding the texture images
    #[arg(long)]
    textures: Option<PathBuf>,

    /// Window title
    #[arg(long)]
    title: Option<String>,
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyP => Key::P,
        KeyCode::Escape => Key::Escape,
        KeyCode::F1 => Key::F1,
        _ => Key::Other,
    }
}

fn key_action(state: ElementState, repeat: bool) -> KeyAction {
    match (state, repeat) {
        (ElementState::Released, _) => KeyAction::Release,
        (ElementState::Pressed, true) => KeyAction::Repeat,
        (ElementState::Pressed, false) => KeyAction::Press,
    }
}

/// Application state.
struct AppState {
    scene: SceneComposer,
    view: ViewState,
    keys: HeldKeys,
    pointer_captured: bool,
    show_hud: bool,
    last_frame: Instant,
    last_dt: f32,
    prepare_report: Option<PrepareReport>,
}

impl AppState {
    fn new(config: &AppConfig) -> Self {
        Self {
            scene: SceneComposer::new(still_life::definition(), &config.scene),
            view: ViewState::new(config.view.clone()),
            keys: HeldKeys::new(),
            pointer_captured: false,
            show_hud: true,
            last_frame: Instant::now(),
            last_dt: 0.0,
            prepare_report: None,
        }
    }

    fn capture_pointer(&mut self, captured: bool) {
        self.pointer_captured = captured;
        // Re-seed so the first motion after capture does not jump.
        self.view.reset_pointer();
    }

    /// Raw mouse motion turns the view only while the pointer is captured.
    fn handle_mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.pointer_captured {
            self.view.on_pointer_delta(dx as f32, dy as f32);
        }
    }

    /// Returns `true` when the key asks the viewer to quit.
    fn handle_key(&mut self, key: Key, action: KeyAction) -> bool {
        self.keys.handle(key, action);
        self.view.on_key(key, action);

        if action != KeyAction::Press {
            return false;
        }
        match key {
            Key::F1 => {
                self.show_hud = !self.show_hud;
                false
            }
            Key::Escape => true,
            _ => false,
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_hud {
            return;
        }

        let summary = SceneInspector::summary(&self.scene);
        let view = SceneInspector::view_summary(&self.view);

        egui::Window::new("Still Life")
            .default_pos([12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                let fps = if self.last_dt > 0.0 { 1.0 / self.last_dt } else { 0.0 };
                ui.label(format!("{fps:.0} fps"));
                ui.label(format!(
                    "Objects: {}  Materials: {}  Textures: {}",
                    summary.objects, summary.materials, summary.textures
                ));
                ui.label(format!("Spin: {:.2}°", summary.spin_degrees));
                ui.separator();
                ui.label(format!(
                    "Camera: ({:.1}, {:.1}, {:.1})",
                    view.position.x, view.position.y, view.position.z
                ));
                ui.label(format!(
                    "Yaw {:.1}  Pitch {:.1}  Speed {:.1}",
                    view.yaw_degrees, view.pitch_degrees, view.speed
                ));
                ui.label(format!("Projection: {:?}", view.projection));

                if let Some(report) = &self.prepare_report {
                    if !report.texture_failures.is_empty() {
                        ui.separator();
                        ui.colored_label(egui::Color32::YELLOW, "Missing textures:");
                        for (tag, err) in &report.texture_failures {
                            ui.small(format!("{tag}: {err}"));
                        }
                    }
                }

                ui.separator();
                ui.small("RMB: Look | WASD: Move | Q/E: Up/Down | Wheel: Speed");
                ui.small("P: Projection | F1: HUD | Esc: Quit");
            });
    }
}

struct GpuApp {
    state: AppState,
    config: AppConfig,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    surface_config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(&config),
            config,
            window: None,
            surface: None,
            surface_config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
            init_error: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| anyhow::anyhow!("create window: {e}"))?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("stilllife_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &surface_config);

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);
        let mut renderer = WgpuRenderer::new(
            device,
            queue,
            surface_format,
            surface_config.width,
            surface_config.height,
        );

        self.state.prepare_report = Some(self.state.scene.prepare(&mut renderer));

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.surface_config = Some(surface_config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
        self.state.last_frame = now;
        self.state.last_dt = dt;

        let movement = self.state.keys.movement();
        self.state.view.apply_movement(&movement, dt);

        let (Some(window), Some(surface), Some(surface_config), Some(renderer)) = (
            &self.window,
            &self.surface,
            &self.surface_config,
            &mut self.renderer,
        ) else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(renderer.device(), surface_config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let aspect = surface_config.width as f32 / surface_config.height.max(1) as f32;
        renderer.begin_frame();
        self.state.view.upload(renderer, aspect);
        self.state.scene.update(dt);
        self.state.scene.render(renderer);
        renderer.end_frame(&view);

        if let (Some(egui_winit), Some(egui_renderer)) =
            (self.egui_winit.as_mut(), self.egui_renderer.as_mut())
        {
            let raw_input = egui_winit.take_egui_input(window);
            let full_output = self.egui_ctx.run(raw_input, |ctx| {
                self.state.draw_ui(ctx);
            });
            egui_winit.handle_platform_output(window, full_output.platform_output);

            let paint_jobs = self
                .egui_ctx
                .tessellate(full_output.shapes, full_output.pixels_per_point);
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [surface_config.width, surface_config.height],
                pixels_per_point: full_output.pixels_per_point,
            };

            let (device, queue) = (renderer.device(), renderer.queue());
            for (id, image_delta) in &full_output.textures_delta.set {
                egui_renderer.update_texture(device, queue, *id, image_delta);
            }
            let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
            egui_renderer.update_buffers(
                device,
                queue,
                &mut encoder,
                &paint_jobs,
                &screen_descriptor,
            );
            {
                let mut pass = encoder
                    .begin_render_pass(&wgpu::RenderPassDescriptor {
                        label: Some("egui_pass"),
                        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Load,
                                store: wgpu::StoreOp::Store,
                            },
                        })],
                        depth_stencil_attachment: None,
                        ..Default::default()
                    })
                    .forget_lifetime();
                egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
            }
            queue.submit(std::iter::once(encoder.finish()));
            for id in &full_output.textures_delta.free {
                egui_renderer.free_texture(id);
            }
        }

        output.present();
        window.request_redraw();
    }

    fn set_pointer_captured(&mut self, captured: bool) {
        self.state.capture_pointer(captured);
        let Some(window) = &self.window else {
            return;
        };
        window.set_cursor_visible(!captured);
        let grab = if captured {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::debug!("cursor grab unavailable: {e}");
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(config), Some(renderer)) =
                    (&self.surface, &mut self.surface_config, &mut self.renderer)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(renderer.device(), config);
                    renderer.resize(config.width, config.height);
                }
            }
            WindowEvent::Focused(false) => {
                self.state.keys.clear();
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                if self.state.handle_key(map_key(code), key_action(key_state, repeat)) {
                    event_loop.exit();
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.set_pointer_captured(btn_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_SCROLL_LINE,
                };
                self.state.view.on_scroll(lines);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.handle_mouse_motion(delta.0, delta.1);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &mut self.renderer {
            self.state.scene.release(renderer);
        }
        tracing::info!("stilllife-desktop exiting");
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(textures) = cli.textures {
        config.scene.texture_root = textures;
    }
    if let Some(title) = cli.title {
        config.title = title;
    }

    tracing::info!(
        textures = %config.scene.texture_root.display(),
        spin = ?config.scene.spin_mode,
        "stilllife-desktop starting"
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
