use anyhow::{Context, Result};
use nback_experiment::{ConfigField, ExperimentStateMachine, SessionEvent, Transition};
use nback_render::{load_font, FontVec, SkiaRenderer};
use nback_timing::{HighPrecisionTimer, Ticker, Timer, TICK_PERIOD};
use pixels::{Pixels, SurfaceTexture};
use rand::rngs::ThreadRng;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Fullscreen, Window, WindowId},
};

use crate::input::{map_key, Command};
use crate::settings::SettingsStore;

/// Overrides the UI font.
pub const FONT_ENV: &str = "NBACK_FONT";

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    font: Option<FontVec>,
    experiment: ExperimentStateMachine<ThreadRng>,
    settings: Option<SettingsStore>,
    selected: ConfigField,
    ticker: Ticker,
    tick_timer: HighPrecisionTimer,
    frame_timer: HighPrecisionTimer,
    current_size: Option<PhysicalSize<u32>>,
    should_exit: bool,
}

impl App {
    pub fn new() -> Result<Self> {
        let font_path = std::env::var_os(FONT_ENV).map(PathBuf::from);
        let font = load_font(font_path.as_deref())?;

        let settings = match SettingsStore::locate() {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("settings will not be persisted: {}", e);
                None
            }
        };
        let config = settings
            .as_ref()
            .map(SettingsStore::load_or_default)
            .unwrap_or_default();
        let experiment = ExperimentStateMachine::new(config, rand::rng());

        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            font: Some(font),
            experiment,
            settings,
            selected: ConfigField::TrialCount,
            ticker: Ticker::new(TICK_PERIOD, Instant::now()),
            tick_timer: HighPrecisionTimer::new(),
            frame_timer: HighPrecisionTimer::with_capacity(240),
            current_size: None,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "N-back trainer starting"
        );
        if let Some(store) = &self.settings {
            info!(path = %store.path().display(), "settings file");
        }
        info!("Press SPACE to start, ESC to stop or exit.");

        event_loop.run_app(&mut self)?;
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title("try N-back")
            .with_fullscreen(Some(Fullscreen::Borderless(event_loop.primary_monitor())))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let size = window.inner_size();
        debug!(
            width = size.width,
            height = size.height,
            scale_factor = window.scale_factor(),
            "window created"
        );

        let surface_texture = SurfaceTexture::new(size.width, size.height, window.clone());
        self.pixels = Some(Pixels::new(size.width, size.height, surface_texture)?);

        let font = self.font.take().context("font was already consumed")?;
        self.renderer = Some(SkiaRenderer::new(size.width, size.height, font)?);
        self.current_size = Some(size);

        window.request_redraw();
        self.window = Some(window);
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let Some(size) = self.current_size else {
            return Ok(());
        };
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let stats = renderer.render_frame(
            self.experiment.state(),
            self.selected,
            pixels.frame_mut(),
            &mut self.frame_timer,
        )?;
        pixels.render()?;

        trace!(
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );
        Ok(())
    }

    fn request_redraw(&self) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn dispatch(&mut self, event: SessionEvent) -> Transition {
        let transition = self.experiment.handle_event(event);
        match &transition {
            Transition::Ignored | Transition::Waiting { .. } => {}
            Transition::Started { .. } => {
                self.ticker.reset(Instant::now());
                self.tick_timer.clear();
                self.request_redraw();
            }
            t if t.is_terminal() => {
                self.log_timing();
                self.request_redraw();
            }
            _ => self.request_redraw(),
        }
        transition
    }

    fn poll_ticker(&mut self) {
        if !self.experiment.state().is_running() {
            return;
        }
        if let Some(interval) = self.ticker.poll(Instant::now()) {
            if interval > Duration::ZERO {
                self.tick_timer.record_sample(interval);
            }
            self.dispatch(SessionEvent::Tick);
        }
    }

    fn handle_input(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) {
        let PhysicalKey::Code(code) = key else {
            return;
        };
        let Some(command) = map_key(code, self.experiment.state().is_running()) else {
            return;
        };
        match command {
            Command::Start => {
                self.dispatch(SessionEvent::Start);
            }
            Command::Stop => {
                self.dispatch(SessionEvent::Stop);
            }
            Command::Judge(judgment) => {
                self.dispatch(SessionEvent::Judge(judgment));
            }
            Command::SelectNext => {
                self.selected = self.selected.next();
                self.request_redraw();
            }
            Command::SelectPrev => {
                self.selected = self.selected.prev();
                self.request_redraw();
            }
            Command::Adjust(steps) => self.adjust_setting(steps),
            Command::Quit => self.cleanup_and_exit(event_loop),
        }
    }

    fn adjust_setting(&mut self, steps: i64) {
        let current = *self.experiment.state().config();
        let config = self.selected.adjust(current, steps);
        if config == current {
            return;
        }
        if self.dispatch(SessionEvent::Configure(config)) != Transition::Reconfigured {
            return;
        }
        if let Some(store) = &self.settings {
            if let Err(e) = store.save(self.experiment.state().config()) {
                warn!("failed to save settings: {}", e);
            }
        }
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        self.current_size = Some(new_size);
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                error!("Failed to resize surface: {}", e);
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                error!("Failed to resize buffer: {}", e);
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                error!("Failed to resize renderer: {:#}", e);
            }
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
        self.request_redraw();
    }

    fn log_timing(&self) {
        let ticks = self.tick_timer.stats();
        let frames = self.frame_timer.stats();
        info!(
            tick_samples = ticks.samples,
            tick_mean_ms = ticks.average_ms(),
            tick_jitter_ms = ticks.jitter_ms(),
            frame_mean_ms = frames.average_ms(),
            "timing"
        );
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if self.experiment.state().is_running() {
            self.dispatch(SessionEvent::Stop);
        }
        info!("N-back trainer exiting");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!("Failed to create window and surface: {:#}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!("Render error: {:#}", e);
                }
            }
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() => {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
            return;
        }
        self.poll_ticker();
        if self.experiment.state().is_running() {
            event_loop.set_control_flow(ControlFlow::WaitUntil(self.ticker.deadline()));
        } else {
            event_loop.set_control_flow(ControlFlow::Wait);
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        debug!("Application resources cleaned up");
    }
}
