use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use gonogo_core::{Phase, TaskPhase};
use gonogo_experiment::{TaskConfig, TaskEvent, TaskSession};
use gonogo_export::{records_to_csv, save_csv, spawn_upload};
use gonogo_render::{SkiaRenderer, ViewState, load_interface_font};
use gonogo_timing::{HighPrecisionTimer, Timer};
use pixels::{Pixels, SurfaceTexture};
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    session: TaskSession<TaskPhase, HighPrecisionTimer>,
    renderer: Option<SkiaRenderer<TaskPhase>>,
    upload_started: bool,
    should_exit: bool,
}

impl App {
    pub fn new() -> Result<Self> {
        let config = TaskConfig::default();
        let timer = HighPrecisionTimer::new();
        let session = TaskSession::new(config, timer, rand::rng());

        Ok(Self {
            window: None,
            pixels: None,
            session,
            renderer: None,
            upload_started: false,
            should_exit: false,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            participant = self.session.participant_id(),
            platform = std::env::consts::OS,
            "behavioral task starting"
        );

        event_loop.run_app(&mut self).map_err(Into::into)
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow::anyhow!("No monitor available"))?;

        let window_attributes = Window::default_attributes()
            .with_title("Behavioral Task")
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        debug!(
            width = physical_size.width,
            height = physical_size.height,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);

        let font = load_interface_font()?;
        self.renderer = Some(SkiaRenderer::new(
            physical_size.width,
            physical_size.height,
            font,
            self.session.config.main_trials,
        ));

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        Ok(())
    }

    fn view_state(&self) -> ViewState {
        ViewState {
            trial_state: self.session.current_trial_state(),
            stimulus: self.session.current_stimulus(),
            progress: self.session.trial_progress(),
            practice_score: self
                .session
                .phase
                .is_feedback()
                .then(|| self.session.practice_score()),
            summary: self.session.summary().cloned(),
        }
    }

    fn render(&mut self) -> Result<()> {
        let phase = self.session.phase;
        let view = self.view_state();
        let timer = self.session.timer.clone();

        let (Some(pixels), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };

        let stats = renderer.render_frame(phase, &view, pixels.frame_mut(), &timer)?;
        pixels.render()?;
        if stats.redrawn {
            debug!(
                draw_ms = stats.draw.as_secs_f64() * 1e3,
                copy_ms = stats.copy.as_secs_f64() * 1e3,
                "scene redrawn"
            );
        }

        Ok(())
    }

    fn update(&mut self) {
        for event in self.session.update() {
            self.session.handle_event(event);
        }

        // Entering results triggers the one-shot, best-effort upload. Its
        // outcome never feeds back into the session.
        if self.session.phase.is_results() && !self.upload_started {
            self.upload_started = true;
            self.start_upload();
        }
    }

    fn start_upload(&self) {
        let csv = records_to_csv(self.session.records());
        let filename = format!("{}.csv", self.session.participant_id());
        info!(%filename, records = self.session.records().len(), "uploading session data");
        spawn_upload(
            self.session.config.upload_endpoint.clone(),
            self.session.config.experiment_id.clone(),
            filename,
            csv,
        );
    }

    fn save_results(&self) {
        let csv = records_to_csv(self.session.records());
        match save_csv(Path::new("."), self.session.participant_id(), &csv) {
            Ok(path) => info!(path = %path.display(), "data saved"),
            Err(err) => error!(%err, "saving data failed"),
        }
    }

    fn handle_input(&mut self, key: winit::keyboard::PhysicalKey, event_loop: &ActiveEventLoop) {
        use winit::keyboard::{KeyCode, PhysicalKey};
        if let PhysicalKey::Code(k) = key {
            match k {
                KeyCode::Enter => {
                    self.session.handle_event(TaskEvent::AdvancePressed);
                }
                KeyCode::Space => {
                    self.session.handle_event(TaskEvent::ResponsePressed);
                }
                KeyCode::KeyS => {
                    if self.session.phase.is_results() {
                        self.save_results();
                    }
                }
                KeyCode::Escape => self.cleanup_and_exit(event_loop),
                _ => {}
            }
        }
    }

    fn handle_resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!(%e, "failed to resize surface");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!(%e, "failed to resize buffer");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            renderer.resize(new_size.width, new_size.height);
        }
    }

    fn cleanup_and_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        info!(records = self.session.records().len(), "task window closed");
        self.should_exit = true;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                error!(%e, "failed to create window and surface");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.cleanup_and_exit(event_loop),
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.render() {
                    error!(%e, "render failed");
                }
                self.update();
                if let Some(window) = &self.window {
                    // Continuous poll loop, capped so the deadline scan does
                    // not spin a full core.
                    self.session.timer.sleep(Duration::from_millis(1));
                    window.request_redraw();
                }
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state.is_pressed() && !event.repeat =>
            {
                self.handle_input(event.physical_key, event_loop);
            }
            WindowEvent::Resized(size) => self.handle_resize(size),
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = &self.window {
                    self.handle_resize(window.inner_size());
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.should_exit {
            event_loop.exit();
        }
    }
}
