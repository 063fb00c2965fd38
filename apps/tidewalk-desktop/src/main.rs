use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tidewalk_common::Settings;
use tidewalk_locomotion::{Integrator, MoveKey, MoveState, Tuning};
use tidewalk_render_wgpu::{WalkCamera, WgpuRenderer};
use tidewalk_scene::{SkyState, WaterState};
use tidewalk_terrain::Heightfield;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "tidewalk-desktop", about = "First-person terrain walk demo")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Settings file (YAML); defaults are used when absent
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Baked terrain snapshot (JSON); generated from settings when absent
    #[arg(long)]
    terrain: Option<PathBuf>,
}

/// Simulation state, independent of the GPU objects.
struct AppState {
    settings: Settings,
    camera: WalkCamera,
    integrator: Integrator,
    move_state: MoveState,
    terrain: Option<Heightfield>,
    sky: SkyState,
    water: WaterState,
    mouse_locked: bool,
    show_overlay: bool,
    last_frame: Instant,
}

impl AppState {
    fn new(settings: Settings, terrain: Option<Heightfield>) -> Self {
        let camera = WalkCamera::new(settings.spawn.position_vec(), settings.spawn.yaw_deg);
        Self {
            camera,
            integrator: Integrator::new(Tuning::from(settings.movement)),
            move_state: MoveState::default(),
            sky: SkyState::from(settings.sky),
            water: WaterState::from(settings.water),
            settings,
            terrain,
            mouse_locked: false,
            show_overlay: true,
            last_frame: Instant::now(),
        }
    }

    fn update(&mut self, dt: f32) {
        if self.mouse_locked {
            self.integrator
                .step(&mut self.move_state, dt, &mut self.camera, &self.terrain);
        }
        self.water.advance();
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let move_key = match key {
            KeyCode::KeyW | KeyCode::ArrowUp => Some(MoveKey::Forward),
            KeyCode::KeyS | KeyCode::ArrowDown => Some(MoveKey::Backward),
            KeyCode::KeyA | KeyCode::ArrowLeft => Some(MoveKey::Left),
            KeyCode::KeyD | KeyCode::ArrowRight => Some(MoveKey::Right),
            _ => None,
        };
        if let Some(mk) = move_key {
            if pressed {
                self.move_state.on_key_down(mk);
            } else {
                self.move_state.on_key_up(mk);
            }
            return;
        }

        if !pressed {
            return;
        }

        match key {
            KeyCode::Space => {
                self.integrator.try_jump(&mut self.move_state);
            }
            KeyCode::F1 => {
                self.show_overlay = !self.show_overlay;
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        egui::Window::new("Tidewalk")
            .default_width(260.0)
            .show(ctx, |ui| {
                let p = self.camera.position;
                let v = self.integrator.velocity();
                ui.label(format!("Position: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
                ui.label(format!("Velocity: ({:.2}, {:.2}, {:.2})", v.x, v.y, v.z));
                ui.label(if self.move_state.grounded {
                    "Grounded"
                } else {
                    "Airborne"
                });
                ui.separator();

                ui.heading("Sun");
                ui.add(
                    egui::Slider::new(&mut self.sky.elevation_deg, 0.0..=90.0).text("elevation"),
                );
                ui.add(
                    egui::Slider::new(&mut self.sky.azimuth_deg, -180.0..=180.0).text("azimuth"),
                );
                ui.add(egui::Slider::new(&mut self.sky.turbidity, 1.0..=20.0).text("turbidity"));
                ui.separator();

                ui.heading("Water");
                ui.add(
                    egui::Slider::new(&mut self.water.distortion_scale, 0.0..=8.0)
                        .text("distortion"),
                );
                ui.add(egui::Slider::new(&mut self.water.uv_size, 1.0..=30.0).text("uv size"));
                ui.separator();

                ui.small("Click: capture mouse | Esc: release | F1: overlay");
            });
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WgpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn set_mouse_lock(&mut self, locked: bool) {
        let Some(window) = &self.window else {
            return;
        };
        let grab = if locked {
            window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(e) = grab {
            tracing::warn!("cursor grab failed: {e}");
            return;
        }
        window.set_cursor_visible(!locked);
        self.state.mouse_locked = locked;
        if locked {
            // Avoid a burst of motion integrating against a stale timestamp.
            self.state.last_frame = Instant::now();
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Tidewalk")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tidewalk_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.camera.aspect = size.width as f32 / size.height.max(1) as f32;

        let mut renderer = WgpuRenderer::new(&device, surface_format, size.width, size.height);
        if let Some(terrain) = &self.state.terrain {
            renderer.upload_terrain(&device, terrain);
        }

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.state.mouse_locked {
            if let Some(egui_winit) = &mut self.egui_winit {
                let response = egui_winit.on_window_event(self.window.as_ref().unwrap(), &event);
                if response.consumed {
                    return;
                }
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width.max(1);
                    config.height = new_size.height.max(1);
                    surface.configure(device, config);
                    self.state.camera.aspect =
                        config.width as f32 / config.height.max(1) as f32;
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if key == KeyCode::Escape && key_state == ElementState::Pressed {
                    self.set_mouse_lock(false);
                    return;
                }
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                if !self.state.mouse_locked {
                    self.set_mouse_lock(true);
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = (now - self.state.last_frame).as_secs_f32();
                self.state.last_frame = now;
                self.state.update(dt);

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
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

                if let Some(renderer) = &self.renderer {
                    renderer.render(
                        device,
                        queue,
                        &view,
                        &self.state.camera,
                        &self.state.sky,
                        &self.state.water,
                    );
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_ui(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
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
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.mouse_locked {
                self.state.camera.rotate(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let settings = match &cli.settings {
        Some(path) => match Settings::load(path) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("settings file {} unusable ({e}); using defaults", path.display());
                Settings::default()
            }
        },
        None => Settings::default(),
    };

    // A broken snapshot leaves the walker without ground rather than
    // aborting; every probe misses until terrain exists.
    let terrain = match &cli.terrain {
        Some(path) => match Heightfield::load(path) {
            Ok(hf) => Some(hf),
            Err(e) => {
                tracing::warn!("terrain snapshot {} unusable ({e}); no ground", path.display());
                None
            }
        },
        None => {
            let t = settings.terrain;
            Some(Heightfield::generate(t.size, t.extent, t.seed))
        }
    };

    match &terrain {
        Some(t) => tracing::info!(
            grid = t.size,
            extent = t.extent,
            seed = t.seed,
            "tidewalk-desktop starting"
        ),
        None => tracing::info!("tidewalk-desktop starting without terrain"),
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(settings, terrain));
    event_loop.run_app(&mut app)?;

    Ok(())
}
