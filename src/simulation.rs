//! Simulation builder and runner

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use crate::config::{BloomSettings, CameraSettings, RainConfig};
use crate::error::SimulationError;
use crate::gpu::GpuState;
use crate::input::{KeyAction, KeyboardSource};
use crate::interpolator::InterpolatedState;
use crate::particles::Bounds;
use crate::rain::RainState;
use crate::regime::Regime;
use crate::signal::ControlSignal;
use crate::time::Time;

type Observer = Box<dyn FnMut(Regime, &InterpolatedState)>;

/// A rain simulation builder.
///
/// Use method chaining to configure, then call `.run()` to start.
///
/// ```ignore
/// let sim = RainSimulation::new().with_particle_count(5_000);
/// let signal = sim.control_signal();
///
/// std::thread::spawn(move || loop {
///     signal.report_source_count(count_hands());
/// });
///
/// sim.run()?;
/// ```
pub struct RainSimulation {
    config: RainConfig,
    signal: ControlSignal,
    observer: Option<Observer>,
}

impl RainSimulation {
    /// Create a simulation with the reference settings.
    pub fn new() -> Self {
        Self {
            config: RainConfig::default(),
            signal: ControlSignal::new(),
            observer: None,
        }
    }

    /// Start from an explicit configuration.
    pub fn from_config(config: RainConfig) -> Self {
        Self {
            config,
            ..Self::new()
        }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.config.particle_count = count;
        self
    }

    /// Set the size of the rain volume.
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.config.bounds = bounds;
        self
    }

    /// Set the per-frame regime blend factor.
    pub fn with_lerp_factor(mut self, factor: f32) -> Self {
        self.config.lerp_factor = factor;
        self
    }

    /// Set the streak length multiplier.
    pub fn with_stretch(mut self, stretch: f32) -> Self {
        self.config.stretch = stretch;
        self
    }

    pub fn with_bloom(mut self, bloom: BloomSettings) -> Self {
        self.config.bloom = bloom;
        self
    }

    pub fn with_camera(mut self, camera: CameraSettings) -> Self {
        self.config.camera = camera;
        self
    }

    /// Use a fixed seed so the initial layout is reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Open borderless fullscreen on the current monitor.
    pub fn with_fullscreen(mut self, fullscreen: bool) -> Self {
        self.config.fullscreen = fullscreen;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.config.title = title.into();
        self
    }

    /// Called once per frame with the active regime and blended values.
    pub fn with_observer<F>(mut self, observer: F) -> Self
    where
        F: FnMut(Regime, &InterpolatedState) + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Handle for reporting detected sources from any thread.
    pub fn control_signal(&self) -> ControlSignal {
        self.signal.clone()
    }

    pub fn config(&self) -> &RainConfig {
        &self.config
    }

    /// Run the simulation. This blocks until the window is closed.
    pub fn run(self) -> Result<(), SimulationError> {
        self.config.validate()?;

        let state = RainState::new(&self.config, self.signal.clone());
        let bounds = self.config.bounds;
        log::info!(
            "Spawned {} drops in {}x{}x{} volume",
            state.particles().len(),
            bounds.width,
            bounds.height,
            bounds.depth
        );

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(self.config, state, self.signal, self.observer);
        event_loop.run_app(&mut app)?;

        match app.startup_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for RainSimulation {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    config: RainConfig,
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    state: RainState,
    keyboard: KeyboardSource,
    observer: Option<Observer>,
    time: Time,
    shown_regime: Option<Regime>,
    shown_fps: u32,
    startup_error: Option<SimulationError>,
}

impl App {
    fn new(
        config: RainConfig,
        state: RainState,
        signal: ControlSignal,
        observer: Option<Observer>,
    ) -> Self {
        Self {
            config,
            window: None,
            gpu_state: None,
            state,
            keyboard: KeyboardSource::new(signal),
            observer,
            time: Time::new(),
            shown_regime: None,
            shown_fps: 0,
            startup_error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), SimulationError> {
        let mut window_attrs = Window::default_attributes()
            .with_title(self.config.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
        if self.config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        self.window = Some(window.clone());

        let gpu_state = pollster::block_on(GpuState::new(
            window,
            self.state.particles().vertices(),
            &self.config,
        ))?;
        self.gpu_state = Some(gpu_state);
        self.time = Time::new();
        Ok(())
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(gpu_state) = self.gpu_state.take() {
            gpu_state.destroy();
        }
        log::info!("Shutting down after {} frames", self.time.frame());
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(gpu_state) = &mut self.gpu_state else {
            return;
        };

        let (elapsed, _) = self.time.update();
        let frame = self.state.advance(elapsed);
        let regime = self.state.active_regime();
        if let Some(observer) = &mut self.observer {
            observer(regime, self.state.interpolated());
        }

        match gpu_state.render(self.state.particles().vertices(), &frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu_state.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                self.shutdown(event_loop);
                return;
            }
            Err(e) => log::warn!("Skipping frame: {:?}", e),
        }

        if let Some(window) = &self.window {
            let fps = self.time.fps().round() as u32;
            if self.shown_regime != Some(regime) || self.shown_fps != fps {
                window.set_title(&format!("{} | {} | {} fps", self.config.title, regime, fps));
                self.shown_regime = Some(regime);
                self.shown_fps = fps;
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.startup_error.is_some() {
            return;
        }
        if let Err(err) = self.start(event_loop) {
            log::error!("Startup failed: {}", err);
            self.startup_error = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size.width, physical_size.height);
                }
            }
            WindowEvent::KeyboardInput { .. } => {
                if let Some(KeyAction::Quit) = self.keyboard.handle_event(&event) {
                    self.shutdown(event_loop);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_config() {
        let sim = RainSimulation::new()
            .with_particle_count(500)
            .with_bounds(Bounds::new(10.0, 20.0, 10.0))
            .with_lerp_factor(0.2)
            .with_stretch(3.0)
            .with_seed(9)
            .with_fullscreen(true)
            .with_title("Rain");

        let config = sim.config();
        assert_eq!(config.particle_count, 500);
        assert_eq!(config.bounds.height, 20.0);
        assert_eq!(config.lerp_factor, 0.2);
        assert_eq!(config.stretch, 3.0);
        assert_eq!(config.seed, Some(9));
        assert!(config.fullscreen);
        assert_eq!(config.title, "Rain");
    }

    #[test]
    fn test_control_signal_is_shared() {
        let sim = RainSimulation::new();
        let signal = sim.control_signal();
        signal.report_source_count(2);
        assert_eq!(sim.control_signal().load(), Regime::Reverse);
    }

    #[test]
    fn test_invalid_config_fails_before_window() {
        let err = RainSimulation::new().with_particle_count(0).run();
        assert!(matches!(err, Err(SimulationError::InvalidConfig(_))));
    }
}
