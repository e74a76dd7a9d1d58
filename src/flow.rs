//! Application event loop.
//!
//! [`App`] is a winit [`ApplicationHandler`] that owns the GPU [`Context`] and
//! the [`Viewer`]. Everything asynchronous (GPU setup on the web, the model
//! download on every platform) runs outside the loop and reports back through
//! the [`EventLoopProxy`] as a [`ViewerEvent`], so all state is mutated on the
//! event-loop thread.
//!
//! # Frame
//!
//! 1. Hide the progress bar if its deadline passed
//! 2. Apply pending camera input and upload the camera uniform
//! 3. Upload new or changed scene nodes
//! 4. Draw and present
//! 5. Request the next frame

use std::{fmt::Debug, sync::Arc};

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    config::ViewerConfig,
    context::{Context, output_size},
    hud::Hud,
    render::render,
    resources::{download::LoadEvent, load_model},
    viewer::{Command, Viewer},
};

/// Messages delivered to the event loop from async tasks and DOM listeners.
pub enum ViewerEvent {
    /// GPU setup finished (web only, natively setup blocks in `resumed`).
    Initialized { state: AppState },
    Load(LoadEvent),
    Command(Command),
    /// Container size in CSS pixels.
    Resize { width: u32, height: u32 },
}

impl Debug for ViewerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Initialized { .. } => f.write_str("Initialized"),
            Self::Load(event) => f.debug_tuple("Load").field(event).finish(),
            Self::Command(command) => f.debug_tuple("Command").field(command).finish(),
            Self::Resize { width, height } => f
                .debug_struct("Resize")
                .field("width", width)
                .field("height", height)
                .finish(),
        }
    }
}

/// GPU context plus surface status.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    async fn new(window: Arc<Window>, config: &ViewerConfig) -> anyhow::Result<Self> {
        let ctx = Context::new(window, config).await?;
        Ok(Self {
            ctx,
            is_surface_configured: false,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if self.ctx.resize(width, height) {
            self.is_surface_configured = true;
        }
    }
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<ViewerEvent>,
    config: ViewerConfig,
    state: Option<AppState>,
    viewer: Viewer,
    hud: Option<Box<dyn Hud>>,
    window: Option<Arc<Window>>,
}

impl App {
    fn new(event_loop: &EventLoop<ViewerEvent>, config: ViewerConfig) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        #[cfg(not(target_arch = "wasm32"))]
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime,
            proxy,
            viewer: Viewer::new(&config),
            config,
            state: None,
            hud: None,
            window: None,
        })
    }

    /// Starts the model download; its events come back as [`ViewerEvent::Load`].
    fn start_model_load(&self) {
        let file_name = self.config.assets.model.clone();
        let proxy = self.proxy.clone();
        let load = async move {
            log::info!("Loading model {file_name}");
            load_model(&file_name, move |event| {
                if let Err(e) = proxy.send_event(ViewerEvent::Load(event)) {
                    log::warn!("Event loop closed while loading: {e}");
                }
            })
            .await;
        };

        #[cfg(not(target_arch = "wasm32"))]
        self.async_runtime.spawn(load);

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(load);
    }

    fn handle_command(&mut self, command: Command) {
        if let Some(hud) = self.hud.as_deref_mut() {
            self.viewer.execute(command, hud);
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        if let Some(hud) = self.hud.as_deref_mut() {
            self.viewer.update(now, hud);
        }

        let Some(state) = &mut self.state else {
            return;
        };
        // invoke main render loop
        state.ctx.window.request_redraw();
        if !state.is_surface_configured {
            return;
        }

        state.ctx.update_camera();
        if let Some(model) = self.viewer.model_mut() {
            model.write_to_buffers(&state.ctx.queue, &state.ctx.device, &state.ctx.material_layout);
        }

        match render(&state.ctx, self.viewer.model()) {
            Ok(()) => {}
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) =
                    output_size(&state.ctx.window, state.ctx.window.inner_size());
                state.resize(width, height);
            }
            Err(e) => log::error!("Unable to render {e}"),
        }
    }
}

impl ApplicationHandler<ViewerEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("Model Viewer");

        #[cfg(target_arch = "wasm32")]
        let container = {
            use crate::hud::web::{container_size, document};

            let container = document()
                .ok()
                .and_then(|document| container_size(&document, &self.config.dom.container));
            if let Some((width, height)) = container {
                window_attributes = window_attributes
                    .with_inner_size(winit::dpi::LogicalSize::new(width, height));
            }
            container
        };

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Cannot create a window: {e}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        #[cfg(not(target_arch = "wasm32"))]
        {
            self.hud = Some(Box::new(crate::hud::NativeHud::new(Some(window.clone()))));
            self.start_model_load();

            let config = self.config.clone();
            match self
                .async_runtime
                .block_on(AppState::new(window, &config))
            {
                Ok(mut state) => {
                    let (width, height) =
                        output_size(&state.ctx.window, state.ctx.window.inner_size());
                    state.resize(width, height);
                    state.ctx.window.request_redraw();
                    self.state = Some(state);
                }
                Err(e) => {
                    log::error!("Viewer initialization failed: {e:#}");
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::WindowExtWebSys;

            let attach = || -> anyhow::Result<()> {
                let document = crate::hud::web::document()?;
                let container = document
                    .get_element_by_id(&self.config.dom.container)
                    .ok_or_else(|| anyhow::anyhow!("#{} not found", self.config.dom.container))?;
                let canvas = window
                    .canvas()
                    .ok_or_else(|| anyhow::anyhow!("the window has no canvas"))?;
                container
                    .append_child(&canvas)
                    .map_err(|e| anyhow::anyhow!("cannot attach the canvas: {e:?}"))?;
                Ok(())
            };
            if let Err(e) = attach() {
                log::error!("{e:#}");
            }
            if container.is_none() {
                log::warn!("Container size unknown, using the default window size");
            }

            match crate::hud::WebHud::new(&self.config.dom) {
                Ok(hud) => self.hud = Some(Box::new(hud)),
                Err(e) => log::error!("Cannot set up the page controls: {e:#}"),
            }
            if let Err(e) = crate::hud::bind_controls(&self.config.dom, self.proxy.clone()) {
                log::error!("{e:#}");
            }
            self.start_model_load();

            let proxy = self.proxy.clone();
            let config = self.config.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match AppState::new(window, &config).await {
                    Ok(state) => {
                        if proxy.send_event(ViewerEvent::Initialized { state }).is_err() {
                            log::error!("Event loop closed before the viewer was ready");
                        }
                    }
                    Err(e) => log::error!("Viewer initialization failed: {e:#}"),
                }
            });
        }
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Initialized { mut state } => {
                // This is the message from our wasm `spawn_local`
                let (width, height) =
                    output_size(&state.ctx.window, state.ctx.window.inner_size());
                state.resize(width, height);
                state.ctx.window.request_redraw();
                self.state = Some(state);
            }
            ViewerEvent::Load(load_event) => {
                match self.hud.as_deref_mut() {
                    Some(hud) => self.viewer.on_load_event(load_event, hud, Instant::now()),
                    None => log::warn!("No HUD to report to, dropping {load_event:?}"),
                }
            }
            ViewerEvent::Command(command) => self.handle_command(command),
            ViewerEvent::Resize { width, height } => {
                if let Some(window) = &self.window {
                    let _ = window.request_inner_size(winit::dpi::LogicalSize::new(width, height));
                }
                if let Some(state) = &mut self.state {
                    state.resize(width, height);
                }
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let Some(state) = &mut self.state {
            state.ctx.camera.controller.handle_window_events(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state {
                    let (width, height) = output_size(&state.ctx.window, size);
                    state.resize(width, height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            #[cfg(not(target_arch = "wasm32"))]
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(command) = keyboard_command(&event) {
                    self.handle_command(command);
                }
            }
            _ => {}
        }
    }
}

/// Maps the native shortcuts: `1`/`2` pick a texture set, `Tab` toggles the panel.
pub fn keyboard_command(event: &winit::event::KeyEvent) -> Option<Command> {
    use crate::data_structures::material::TextureSet;
    use winit::keyboard::{Key, NamedKey};

    if !event.state.is_pressed() || event.repeat {
        return None;
    }
    match &event.logical_key {
        Key::Character(c) if c.as_str() == "1" => Some(Command::ApplyTextureSet(TextureSet::Primary)),
        Key::Character(c) if c.as_str() == "2" => {
            Some(Command::ApplyTextureSet(TextureSet::Alternate))
        }
        Key::Named(NamedKey::Tab) => Some(Command::TogglePanel),
        _ => None,
    }
}

/// Runs the viewer until its window is closed.
pub fn run(config: ViewerConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            log::warn!("Could not initialize logger: {e}");
        }
    }

    let event_loop: EventLoop<ViewerEvent> = EventLoop::with_user_event().build()?;

    let mut app = App::new(&event_loop, config)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}
