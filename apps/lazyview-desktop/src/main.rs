use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use lazyview_particles::{FieldConfig, FrameClock, FrameLoop, FrameSubscription, ParticleField};
use lazyview_particles_wgpu::{GpuContext, PointCloudRenderer};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

mod page;

use page::Page;

#[derive(Parser)]
#[command(name = "lazyview-desktop", about = "Deferred sections over a particle field")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Particle count; zero or negative disables the field
    #[arg(long, default_value = "2000", allow_negative_numbers = true)]
    count: i64,

    /// Number of deferred sections on the page
    #[arg(long, default_value = "12")]
    sections: usize,

    /// RNG seed for a reproducible field
    #[arg(long)]
    seed: Option<u64>,
}

/// Application state.
struct AppState {
    field: Rc<RefCell<ParticleField>>,
    frames: FrameLoop,
    clock: FrameClock,
    _field_frames: FrameSubscription,
    page: Page,
    requested_count: usize,
    show_overlay: bool,
}

impl AppState {
    fn new(cli: &Cli) -> Self {
        let field = Rc::new(RefCell::new(ParticleField::from_requested(
            cli.count,
            FieldConfig {
                seed: cli.seed,
                ..FieldConfig::default()
            },
        )));
        let frames = FrameLoop::new();
        let field_frames = ParticleField::attach(&field, &frames);
        let requested_count = field.borrow().count();

        Self {
            field,
            frames,
            clock: FrameClock::start(),
            _field_frames: field_frames,
            page: Page::new(cli.sections),
            requested_count,
            show_overlay: true,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if !pressed {
            return;
        }
        if key == KeyCode::F1 {
            self.show_overlay = !self.show_overlay;
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE.inner_margin(24.0))
            .show(ctx, |ui| self.page.show(ui));

        if !self.show_overlay {
            return;
        }

        egui::Window::new("Field")
            .anchor(egui::Align2::RIGHT_TOP, [-12.0, 12.0])
            .resizable(false)
            .show(ctx, |ui| {
                let rotation = self.field.borrow().rotation();
                ui.label(format!("Points: {}", self.field.borrow().count()));
                ui.label(format!(
                    "Rotation: ({:.2}, {:.2}) rad",
                    rotation.x, rotation.y
                ));
                ui.add(egui::Slider::new(&mut self.requested_count, 0..=20_000).text("count"));
                ui.separator();
                ui.label(format!(
                    "Sections: {} / {} revealed",
                    self.page.revealed(),
                    self.page.section_count()
                ));
                ui.label(format!("Observing: {}", self.page.observed()));
                ui.small("F1: Toggle overlay");
            });
    }

    /// One animation frame: advance the field, then apply UI-driven changes.
    fn frame(&mut self) -> f32 {
        let elapsed = self.clock.elapsed();
        self.frames.tick(elapsed);
        self.field.borrow_mut().set_count(self.requested_count);
        elapsed
    }
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    renderer: Option<PointCloudRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            window: None,
            gpu: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("lazyview")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let size = window.inner_size();
        let gpu = pollster::block_on(GpuContext::new(window.clone(), size.width, size.height))?;
        let (width, height) = gpu.size();

        let material = self.state.field.borrow().config().material;
        let renderer = PointCloudRenderer::new(&gpu.device, gpu.format(), width, height, &material);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format(), None, 1, false);

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn redraw(&mut self) {
        let elapsed = self.state.frame();

        let (Some(window), Some(gpu), Some(renderer), Some(egui_winit), Some(egui_renderer)) = (
            &self.window,
            &self.gpu,
            &mut self.renderer,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        ) else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.reconfigure();
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

        let (width, height) = gpu.size();
        let scene = self.state.field.borrow().scene(width, height);
        renderer.render(&gpu.device, &gpu.queue, &view, &scene);

        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        // Layout rects were reported during the pass; reveal what crossed in.
        self.state.page.update(elapsed);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
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
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            tracing::error!("failed to initialize window: {e:#}");
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
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    let (width, height) = gpu.size();
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(&gpu.device, width, height);
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
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
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

    tracing::info!("lazyview-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(&cli));
    event_loop.run_app(&mut app)?;

    Ok(())
}
