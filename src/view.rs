//! View control and application event loop.
//!
//! This module provides the view controller and the main event loop of the
//! viewer. The [`View`] owns the camera and the currently loaded scene and
//! translates window events into camera mutations and redraw requests; the
//! [`App`] hosts it inside the winit event loop.
//!
//! # Lifecycle Flow
//!
//! The event loop follows this pattern each frame:
//! 1. Collect window events
//! 2. Forward mouse input to the view (orbit drag, wheel zoom)
//! 3. Render the view's [`Render`] composition to the frame buffer
//! 4. Fire the fixed-rate tick when its interval elapsed
//! 5. Write the camera uniform for the next frame
//! 6. Present frame
//!
//! The view enters its initialized state once the first GPU context is
//! available (`resumed`); a second `resumed` reinitializes it.

use std::{iter, sync::Arc};

use instant::{Duration, Instant};

#[cfg(feature = "integration-tests")]
use tokio::runtime::Runtime;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalPosition,
    event::{MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    camera::{Camera, OrbitingCamera},
    context::{Context, InitContext},
    data_structures::texture::Texture,
    render::{Flat, Render},
    scene::{Scene, SceneParser, SceneviewScene},
};

/// Compute the logical viewport for a physical size and device-pixel ratio.
///
/// Both dimensions are truncated toward zero.
pub fn scaled_viewport(width: u32, height: u32, ratio: f32) -> [u32; 2] {
    [
        (width as f32 / ratio) as u32,
        (height as f32 / ratio) as u32,
    ]
}

/// The view controller: camera, scene and input state.
///
/// The view holds no GPU resources itself, so all input handling is plain
/// state manipulation; the [`App`] pairs it with a [`Context`] for actual
/// rendering. Mouse positions are forwarded to the camera raw; the camera
/// computes drag deltas itself.
#[derive(Debug)]
pub struct View {
    camera: Box<dyn Camera>,
    scene: Option<Box<dyn Scene>>,
    capture_mouse: bool,
    dirty: bool,
    cursor: PhysicalPosition<f64>,
    clock: Instant,
}

impl View {
    pub fn new() -> Self {
        Self::with_camera(Box::new(OrbitingCamera::new()))
    }

    pub fn with_camera(camera: Box<dyn Camera>) -> Self {
        Self {
            camera,
            scene: None,
            capture_mouse: false,
            dirty: true,
            cursor: PhysicalPosition::new(0.0, 0.0),
            clock: Instant::now(),
        }
    }

    /// Enter the initialized state. Called once the first GPU context is
    /// available; calling it again reinitializes.
    pub fn initialize(&mut self) {
        self.clock = Instant::now();
        self.camera.update_matrices();
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> &mut dyn Camera {
        self.camera.as_mut()
    }

    /// Whether a drag is currently forwarding mouse moves to the camera.
    pub fn captures_mouse(&self) -> bool {
        self.capture_mouse
    }

    /// Consume the redraw request flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Fixed-rate render tick: restart the elapsed clock and mark dirty.
    pub fn tick(&mut self) {
        // Seconds since the last tick (variable update rate); per-frame
        // update logic would consume this.
        let _seconds = self.clock.elapsed().as_secs_f32();
        self.clock = Instant::now();
        self.dirty = true;
    }

    /// Apply a window resize.
    ///
    /// `ratio` is the device-pixel ratio; the camera aspect ratio is set to
    /// it and the returned viewport is the physical size scaled down by it,
    /// truncated toward zero.
    pub fn resize(&mut self, width: u32, height: u32, ratio: f32) -> [u32; 2] {
        self.camera.set_aspect_ratio(ratio);
        scaled_viewport(width, height, ratio)
    }

    pub fn mouse_pressed(&mut self, button: MouseButton, x: f32, y: f32) {
        if button == MouseButton::Right {
            self.camera.mouse_down(x, y);
            self.capture_mouse = true;
            self.dirty = true;
        }
    }

    pub fn mouse_moved(&mut self, x: f32, y: f32) {
        if self.capture_mouse {
            self.camera.mouse_dragged(x, y);
            self.dirty = true;
        }
    }

    pub fn mouse_released(&mut self, button: MouseButton, x: f32, y: f32) {
        if self.capture_mouse && button == MouseButton::Right {
            self.camera.mouse_up(x, y);
            self.capture_mouse = false;
            self.dirty = true;
        }
    }

    /// Forward a wheel delta (eighth-of-a-degree units) to the camera.
    pub fn wheel(&mut self, delta: f32) {
        self.camera.mouse_scrolled(delta);
        self.dirty = true;
    }

    /// Translate a winit window event into view input.
    pub fn handle_window_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = *position;
                self.mouse_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let (x, y) = (self.cursor.x as f32, self.cursor.y as f32);
                if state.is_pressed() {
                    self.mouse_pressed(*button, x, y);
                } else {
                    self.mouse_released(*button, x, y);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                // Line deltas arrive in wheel notches; scale them to the
                // eighth-of-a-degree units the camera expects.
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y * 120.0,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32,
                };
                self.wheel(delta);
            }
            WindowEvent::KeyboardInput { .. } => {
                // Keyboard control is not part of the viewer.
            }
            _ => (),
        }
    }

    /// Replace the owned scene with a fresh one built from the parser.
    ///
    /// On error the previous scene stays loaded.
    pub fn load_from_parser(
        &mut self,
        gpu: &InitContext,
        parser: &dyn SceneParser,
    ) -> anyhow::Result<()> {
        let mut scene = Box::new(SceneviewScene::new());
        scene.load_scene(gpu, parser)?;
        self.install_scene(scene);
        Ok(())
    }

    /// Install a scene, dropping any previously loaded one. The old scene
    /// receives no further calls.
    pub fn install_scene(&mut self, scene: Box<dyn Scene>) {
        self.scene = Some(scene);
        self.dirty = true;
    }

    /// Propagate a settings change to the scene and request a redraw.
    pub fn settings_changed(&mut self) {
        if let Some(scene) = &mut self.scene {
            scene.settings_changed();
        }
        self.dirty = true;
    }

    /// The view's draw work for this frame; [`Render::None`] while no scene
    /// is loaded.
    pub fn render<'a, 'pass>(&'a self) -> Render<'a, 'pass> {
        match &self.scene {
            Some(scene) => scene.render(),
            None => Render::None,
        }
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}

/// Out-of-band events delivered through the event loop proxy.
#[derive(Debug)]
pub enum ViewEvent {
    /// Global render settings changed; forward to the scene and redraw.
    SettingsChanged,
    /// Replace the loaded scene with one built from this parser.
    LoadScene(Box<dyn SceneParser>),
    Exit,
}

#[cfg(feature = "integration-tests")]
pub enum FrameTestResult {
    Passed,
    Waiting,
}

/// Inspects a rendered frame during integration tests.
#[cfg(feature = "integration-tests")]
pub type FrameProbe = Box<dyn FnMut(&image::RgbaImage) -> anyhow::Result<FrameTestResult>>;

/// One-shot context setup for integration tests (clear colour, tick rate).
#[cfg(feature = "integration-tests")]
pub type Configure = Box<dyn FnOnce(&mut Context)>;

/// Application state bundle: GPU context, view and surface status.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    pub(crate) view: View,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>) -> Self {
        let ctx = Context::new(window).await;
        let ctx = match ctx {
            Ok(ctx) => ctx,
            Err(e) => panic!(
                "App initialization failed. Cannot create the main context: {}",
                e
            ),
        };
        Self {
            ctx,
            view: View::new(),
            is_surface_configured: false,
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.ctx.config.width = width;
            self.ctx.config.height = height;
            self.is_surface_configured = true;
            let ratio = self.ctx.window.scale_factor() as f32;
            self.ctx.viewport = self.view.resize(width, height, ratio);
            self.ctx
                .surface
                .configure(&self.ctx.device, &self.ctx.config);
            self.ctx.depth_texture = Texture::create_depth_texture(
                &self.ctx.device,
                [self.ctx.config.width, self.ctx.config.height],
                "depth_texture",
            );
        }
    }

    #[cfg(feature = "integration-tests")]
    fn padded_size(&self) -> (u32, u32) {
        // Buffer readback requires rows aligned to 256 bytes.
        let width = self.ctx.config.width;
        let height = self.ctx.config.height;
        (
            width + (256 - width % 256) % 256,
            height + (256 - height % 256) % 256,
        )
    }

    #[cfg(feature = "integration-tests")]
    fn probe_extent(&self) -> wgpu::Extent3d {
        let (width, height) = self.padded_size();
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        }
    }

    #[cfg(feature = "integration-tests")]
    fn probe_texture(&self, extent: wgpu::Extent3d, format: wgpu::TextureFormat) -> wgpu::Texture {
        self.ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Probe Output Texture"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::COPY_SRC | wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
    }

    fn render(
        &mut self,
        #[cfg(feature = "integration-tests")] async_runtime: &Runtime,
        #[cfg(feature = "integration-tests")] proxy: &EventLoopProxy<ViewEvent>,
        #[cfg(feature = "integration-tests")] probe: &mut Option<FrameProbe>,
    ) -> Result<(), wgpu::SurfaceError> {
        // invoke main render loop
        self.ctx.window.request_redraw();

        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return Ok(());
        }

        let output = self.ctx.surface.get_current_texture()?;
        #[cfg(not(feature = "integration-tests"))]
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        #[cfg(feature = "integration-tests")]
        let (tex, depth) = {
            let extent = self.probe_extent();
            let tex = self.probe_texture(extent, self.ctx.config.format);
            let depth = self.probe_texture(extent, Texture::DEPTH_FORMAT);
            (tex, depth)
        };

        let mut encoder: wgpu::CommandEncoder =
            self.ctx
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });
        {
            let mut render_pass: wgpu::RenderPass<'_> =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        #[cfg(feature = "integration-tests")]
                        view: &tex.create_view(&wgpu::TextureViewDescriptor::default()),
                        #[cfg(not(feature = "integration-tests"))]
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(self.ctx.clear_colour),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        #[cfg(feature = "integration-tests")]
                        view: &depth.create_view(&wgpu::TextureViewDescriptor::default()),
                        #[cfg(not(feature = "integration-tests"))]
                        view: &self.ctx.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });

            // The GPU viewport uses the logical size, capped to the surface.
            let vw = self.ctx.viewport[0].min(self.ctx.config.width) as f32;
            let vh = self.ctx.viewport[1].min(self.ctx.config.height) as f32;
            render_pass.set_viewport(0.0, 0.0, vw, vh, 0.0, 1.0);

            // Actual rendering:
            let mut flats: Vec<Flat> = Vec::new();
            let render = self.view.render();
            render.set_pipelines(&self.ctx, &mut render_pass, &mut flats);

            render_pass.set_pipeline(&self.ctx.pipelines.textured);
            render_pass.set_bind_group(1, &self.ctx.camera.bind_group, &[]);
            for flat in flats {
                if flat.amount == 0 {
                    log::warn!("you attempted to render something with zero indices");
                    continue;
                }
                render_pass.set_bind_group(0, flat.group, &[]);
                render_pass.set_vertex_buffer(0, flat.vertex.slice(..));
                render_pass.set_index_buffer(flat.index.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..flat.amount as u32, 0, 0..1);
            }
        }

        #[cfg(feature = "integration-tests")]
        let output_buffer = {
            let u32_size = std::mem::size_of::<u32>() as u32;
            let (width, height) = self.padded_size();
            let output_buffer_size = (u32_size * width * height) as wgpu::BufferAddress;
            let output_buffer = self.ctx.device.create_buffer(&wgpu::BufferDescriptor {
                size: output_buffer_size,
                usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
                label: None,
                mapped_at_creation: false,
            });
            encoder.copy_texture_to_buffer(
                wgpu::TexelCopyTextureInfo {
                    aspect: wgpu::TextureAspect::All,
                    texture: &tex,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                },
                wgpu::TexelCopyBufferInfo {
                    buffer: &output_buffer,
                    layout: wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(u32_size * width),
                        rows_per_image: Some(height),
                    },
                },
                self.probe_extent(),
            );
            output_buffer
        };

        self.ctx.queue.submit(iter::once(encoder.finish()));

        #[cfg(feature = "integration-tests")]
        if let Some(probe) = probe {
            let fut_img = async {
                let (tx, rx) = futures_intrusive::channel::shared::oneshot_channel();
                let buffer_slice = output_buffer.slice(..);
                buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
                    tx.send(result).unwrap();
                });
                self.ctx
                    .device
                    .poll(wgpu::PollType::Wait {
                        submission_index: None,
                        timeout: Some(std::time::Duration::from_secs(3)),
                    })
                    .unwrap();
                rx.receive().await.unwrap().unwrap();
                let data = buffer_slice.get_mapped_range();
                let (width, height) = self.padded_size();
                image::RgbaImage::from_raw(width, height, data.to_vec()).unwrap()
            };
            let img = async_runtime.block_on(fut_img);
            match probe(&img) {
                Err(e) => panic!("{}", e),
                Ok(FrameTestResult::Passed) => proxy
                    .send_event(ViewEvent::Exit)
                    .expect("The frame probe passed but the winit event-loop could not exit"),
                Ok(FrameTestResult::Waiting) => (),
            }
        }

        output.present();
        Ok(())
    }
}

/// The winit application hosting the view.
pub struct App {
    async_runtime: tokio::runtime::Runtime,
    #[cfg(feature = "integration-tests")]
    proxy: EventLoopProxy<ViewEvent>,
    state: Option<AppState>,
    startup_parser: Option<Box<dyn SceneParser>>,
    last_time: Instant,
    time_since_tick: Duration,
    #[cfg(feature = "integration-tests")]
    configure: Option<Configure>,
    #[cfg(feature = "integration-tests")]
    probe: Option<FrameProbe>,
}

impl App {
    #[cfg_attr(not(feature = "integration-tests"), allow(unused_variables))]
    fn new(
        event_loop: &EventLoop<ViewEvent>,
        startup_parser: Option<Box<dyn SceneParser>>,
    ) -> anyhow::Result<Self> {
        #[cfg(feature = "integration-tests")]
        let proxy = event_loop.create_proxy();
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            #[cfg(feature = "integration-tests")]
            proxy,
            state: None,
            startup_parser,
            last_time: Instant::now(),
            time_since_tick: Duration::from_millis(0),
            #[cfg(feature = "integration-tests")]
            configure: None,
            #[cfg(feature = "integration-tests")]
            probe: None,
        })
    }
}

impl ApplicationHandler<ViewEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes().with_title("view-ngin");
        let window = Arc::new(
            event_loop
                .create_window(window_attributes)
                .expect("Failed to create a window"),
        );

        let mut app_state = self.async_runtime.block_on(AppState::new(window));
        app_state.view.initialize();

        #[cfg(feature = "integration-tests")]
        if let Some(configure) = self.configure.take() {
            configure(&mut app_state.ctx);
        }

        if let Some(parser) = self.startup_parser.take() {
            let gpu = InitContext::from(&app_state.ctx);
            if let Err(e) = app_state.view.load_from_parser(&gpu, parser.as_ref()) {
                log::error!("Failed to load the startup scene: {}", e);
            }
        }

        self.state = Some(app_state);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewEvent) {
        match event {
            ViewEvent::SettingsChanged => {
                if let Some(state) = &mut self.state {
                    state.view.settings_changed();
                    if state.view.take_dirty() {
                        state.ctx.window.request_redraw();
                    }
                }
            }
            ViewEvent::LoadScene(parser) => {
                if let Some(state) = &mut self.state {
                    let gpu = InitContext::from(&state.ctx);
                    if let Err(e) = state.view.load_from_parser(&gpu, parser.as_ref()) {
                        log::error!("Failed to load the requested scene: {}", e);
                    }
                    state.ctx.window.request_redraw();
                }
            }
            ViewEvent::Exit => {
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let state = match &mut self.state {
            Some(state) => state,
            None => return,
        };

        state.view.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                self.time_since_tick += dt;

                match state.render(
                    #[cfg(feature = "integration-tests")]
                    &self.async_runtime,
                    #[cfg(feature = "integration-tests")]
                    &self.proxy,
                    #[cfg(feature = "integration-tests")]
                    &mut self.probe,
                ) {
                    Ok(_) => {
                        if self.time_since_tick
                            >= Duration::from_millis(state.ctx.tick_duration_millis)
                        {
                            state.view.tick();
                            self.time_since_tick = Duration::from_millis(0);
                        }
                        // Update the camera for the next frame
                        state
                            .ctx
                            .camera
                            .uniform
                            .update_view_proj(state.view.camera());
                        state.ctx.queue.write_buffer(
                            &state.ctx.camera.buffer,
                            0,
                            bytemuck::cast_slice(&[state.ctx.camera.uniform]),
                        );
                    }
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = state.ctx.window.inner_size();
                        state.resize(size.width, size.height);
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }

        if state.view.take_dirty() {
            state.ctx.window.request_redraw();
        }
    }
}

fn mk_event_loop() -> anyhow::Result<EventLoop<ViewEvent>> {
    #[cfg(all(feature = "integration-tests", target_os = "linux"))]
    let event_loop: EventLoop<ViewEvent> = {
        use winit::platform::wayland::EventLoopBuilderExtWayland;

        EventLoop::with_user_event()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(all(feature = "integration-tests", target_os = "windows"))]
    let event_loop: EventLoop<ViewEvent> = {
        use winit::platform::windows::EventLoopBuilderExtWindows;

        EventLoop::with_user_event()
            .with_any_thread(true)
            .build()
            .expect("Failed to create an event loop")
    };

    #[cfg(not(feature = "integration-tests"))]
    let event_loop: EventLoop<ViewEvent> = EventLoop::with_user_event().build()?;

    Ok(event_loop)
}

/// Run the viewer, optionally loading a scene from `parser` at startup.
///
/// Blocks until the window closes.
pub fn run(parser: Option<Box<dyn SceneParser>>) -> anyhow::Result<()> {
    run_with_events(parser, |_| ())
}

/// Run the viewer and hand the event-loop proxy to `on_start` first.
///
/// The proxy is the out-of-band surface of the viewer: other threads use it
/// to deliver [`ViewEvent::SettingsChanged`] or [`ViewEvent::LoadScene`]
/// while the loop is running. Blocks until the window closes.
pub fn run_with_events(
    parser: Option<Box<dyn SceneParser>>,
    on_start: impl FnOnce(EventLoopProxy<ViewEvent>),
) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let event_loop = mk_event_loop()?;
    let mut app = App::new(&event_loop, parser)?;
    on_start(event_loop.create_proxy());
    event_loop.run_app(&mut app)?;

    Ok(())
}

/// Run the viewer with a frame probe that inspects every rendered frame.
///
/// The loop exits once the probe reports [`FrameTestResult::Passed`].
#[cfg(feature = "integration-tests")]
pub fn run_with_probe(
    parser: Option<Box<dyn SceneParser>>,
    configure: Configure,
    probe: FrameProbe,
) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    }

    let event_loop = mk_event_loop()?;
    let mut app = App::new(&event_loop, parser)?;
    app.configure = Some(configure);
    app.probe = Some(probe);
    event_loop.run_app(&mut app)?;

    Ok(())
}
