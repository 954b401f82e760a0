use std::any::Any;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{error, info};
use pollster::block_on;

use orbit_scene::{
    AnimationLoop, CameraController, FrameStatus, HeadlessRenderer, InputState, OrbitControls,
    RendererOptions, Scene, SceneContext, SceneNode, SceneRenderer, ViewportConfig,
};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;

    if options.headless {
        return run_headless(&options);
    }
    match native::run_windowed(&options) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --headless mode (set DISPLAY or install a GPU driver to enable rendering)."
                );
                run_headless(&options)
            } else {
                Err(err)
            }
        }
    }
}

fn run_headless(options: &CliOptions) -> Result<()> {
    let viewport = options.viewport(options.device_pixel_ratio.unwrap_or(1.0));
    let renderer_options = RendererOptions::for_viewport(&viewport);
    let input = Arc::new(InputState::new());
    let controls = OrbitControls::new(input, &viewport);
    let mut context = SceneContext::new(
        HeadlessRenderer::new(renderer_options),
        &viewport,
        controls,
    )?;

    print_summary(context.scene(), &renderer_options);
    if let Some(path) = options.dump_scene.as_deref() {
        dump_scene(context.scene(), path)?;
    }

    let mut animation = AnimationLoop::new().with_frame_limit(options.frames.unwrap_or(1));
    while animation.tick(|| context.draw())? == FrameStatus::Continue {}

    let stats = context.renderer().last_frame();
    println!(
        "Rendered {} frame(s): {} draw calls, {} shadow caster(s), {} shadow receiver(s)",
        context.renderer().frames(),
        stats.draw_calls,
        stats.shadow_casters,
        stats.shadow_receivers
    );
    let camera = context.camera();
    println!(
        "Camera at ({:.2}, {:.2}, {:.2})",
        camera.position.x, camera.position.y, camera.position.z
    );
    Ok(())
}

fn print_summary(scene: &Scene, options: &RendererOptions) {
    println!(
        "Loaded scene with {} objects ({} lights)",
        scene.len(),
        scene.light_count()
    );
    for node in scene.children() {
        match node {
            SceneNode::Mesh(mesh) => println!(" - {} ({})", mesh.name, node.kind()),
            other => println!(" - {}", other.kind()),
        }
    }
    let (width, height) = options.drawing_buffer_size();
    println!(
        "Drawing buffer {}x{} at pixel ratio {}",
        width, height, options.pixel_ratio
    );
}

fn dump_scene(scene: &Scene, path: &Path) -> Result<()> {
    let json = scene.to_json()?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    info!("scene written to {}", path.display());
    Ok(())
}

/// Runs one frame of `context` under `animation`; logs and reports whether
/// another frame should be requested.
fn step<R: SceneRenderer, C: CameraController>(
    animation: &mut AnimationLoop,
    context: &mut SceneContext<R, C>,
) -> Result<bool> {
    match animation.tick(|| context.draw()) {
        Ok(FrameStatus::Continue) => Ok(true),
        Ok(FrameStatus::Stopped) => {
            info!("animation loop stopped after {} frames", animation.frames());
            Ok(false)
        }
        Err(err) => {
            error!("frame failed: {err:#}");
            Err(err)
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use winit::application::ApplicationHandler;
    use winit::dpi::PhysicalSize;
    use winit::event::{
        ElementState, MouseButton, MouseScrollDelta, Touch, TouchPhase, WindowEvent,
    };
    use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
    use winit::window::{Window, WindowId};

    use orbit_scene::{GpuRenderer, PointerButton, PointerEvent};

    use super::*;

    /// Pixels one wheel "line" scrolls, matching DOM line-mode deltas.
    const LINE_HEIGHT: f32 = 100.0;

    pub(super) fn run_windowed(options: &CliOptions) -> Result<()> {
        let default_hook = panic::take_hook();
        panic::set_hook(Box::new(|_| {}));
        let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
        panic::set_hook(default_hook);
        let event_loop = event_loop
            .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
            .map_err(|err| WindowInitError::from_error("event loop", err))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = NativeApp::new(options.clone());
        event_loop
            .run_app(&mut app)
            .context("event loop terminated abnormally")?;

        match app.last_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    struct NativeApp {
        options: CliOptions,
        input: Arc<InputState>,
        animation: AnimationLoop,
        window: Option<Arc<Window>>,
        context: Option<SceneContext<GpuRenderer, OrbitControls>>,
        pixel_ratio: f32,
        touch: Option<u64>,
        last_error: Option<anyhow::Error>,
    }

    impl NativeApp {
        fn new(options: CliOptions) -> Self {
            let animation = match options.frames {
                Some(frames) => AnimationLoop::new().with_frame_limit(frames),
                None => AnimationLoop::new(),
            };
            Self {
                options,
                input: Arc::new(InputState::new()),
                animation,
                window: None,
                context: None,
                pixel_ratio: 1.0,
                touch: None,
                last_error: None,
            }
        }

        fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
            let device_pixel_ratio = self.options.device_pixel_ratio.unwrap_or_else(|| {
                event_loop
                    .primary_monitor()
                    .map(|monitor| monitor.scale_factor() as f32)
                    .unwrap_or(1.0)
            });
            let viewport = self.options.viewport(device_pixel_ratio);
            let renderer_options = RendererOptions::for_viewport(&viewport);
            let (width, height) = renderer_options.drawing_buffer_size();

            let attributes = Window::default_attributes()
                .with_title("Orbit Scene")
                .with_inner_size(PhysicalSize::new(width, height));
            let window = Arc::new(
                event_loop
                    .create_window(attributes)
                    .map_err(|err| WindowInitError::from_error("window", err))?,
            );
            let renderer = block_on(GpuRenderer::new(Arc::clone(&window), renderer_options))
                .map_err(|err| WindowInitError::from_error("renderer", format!("{err:#}")))?;

            let controls = OrbitControls::new(Arc::clone(&self.input), &viewport);
            let context = SceneContext::new(renderer, &viewport, controls)?;
            print_summary(context.scene(), &renderer_options);
            if let Some(path) = self.options.dump_scene.as_deref() {
                dump_scene(context.scene(), path)?;
            }

            self.pixel_ratio = renderer_options.pixel_ratio;
            window.request_redraw();
            self.window = Some(window);
            self.context = Some(context);
            Ok(())
        }

        fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
            self.animation.handle().stop();
            self.last_error = Some(err);
            event_loop.exit();
        }

        /// Physical window coordinates to the logical pixels the controls use.
        fn logical(&self, x: f64, y: f64) -> Vec2 {
            Vec2::new(x as f32, y as f32) / self.pixel_ratio
        }

        fn handle_mouse_button(&self, state: ElementState, button: MouseButton) {
            let button = match button {
                MouseButton::Left => PointerButton::Primary,
                MouseButton::Right => PointerButton::Secondary,
                MouseButton::Middle => PointerButton::Auxiliary,
                _ => return,
            };
            match state {
                ElementState::Pressed => self.input.push(PointerEvent::Down {
                    button,
                    position: self.input.pointer_position(),
                }),
                ElementState::Released => self.input.push(PointerEvent::Up { button }),
            }
        }

        fn handle_touch(&mut self, touch: Touch) {
            let position = self.logical(touch.location.x, touch.location.y);
            // Only the first finger orbits; further fingers are ignored.
            match touch.phase {
                TouchPhase::Started if self.touch.is_none() => {
                    self.touch = Some(touch.id);
                    self.input.push(PointerEvent::Down {
                        button: PointerButton::Primary,
                        position,
                    });
                }
                TouchPhase::Moved if self.touch == Some(touch.id) => {
                    self.input.push(PointerEvent::Move { position });
                }
                TouchPhase::Ended | TouchPhase::Cancelled if self.touch == Some(touch.id) => {
                    self.touch = None;
                    self.input.push(PointerEvent::Up {
                        button: PointerButton::Primary,
                    });
                }
                _ => {}
            }
        }
    }

    impl ApplicationHandler for NativeApp {
        fn resumed(&mut self, event_loop: &ActiveEventLoop) {
            if self.window.is_some() {
                return;
            }
            if let Err(err) = self.init(event_loop) {
                self.fail(event_loop, err);
            }
        }

        fn window_event(
            &mut self,
            event_loop: &ActiveEventLoop,
            _window_id: WindowId,
            event: WindowEvent,
        ) {
            match event {
                WindowEvent::CloseRequested => {
                    self.animation.handle().stop();
                    event_loop.exit();
                }
                WindowEvent::Resized(size) => {
                    if let Some(context) = self.context.as_mut() {
                        context.renderer_mut().resize(size.width, size.height);
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let position = self.logical(position.x, position.y);
                    self.input.push(PointerEvent::Move { position });
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    self.handle_mouse_button(state, button);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    // winit reports scrolling away from the user as positive.
                    let delta_y = match delta {
                        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
                        MouseScrollDelta::PixelDelta(position) => -(position.y as f32),
                    };
                    self.input.push(PointerEvent::Wheel { delta_y });
                }
                WindowEvent::Touch(touch) => self.handle_touch(touch),
                WindowEvent::RedrawRequested => {
                    let Some(context) = self.context.as_mut() else {
                        return;
                    };
                    match step(&mut self.animation, context) {
                        Ok(true) => {
                            if let Some(window) = self.window.as_ref() {
                                window.request_redraw();
                            }
                        }
                        Ok(false) => event_loop.exit(),
                        Err(err) => self.fail(event_loop, err),
                    }
                }
                _ => {}
            }
        }
    }
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

const USAGE: &str = "Usage: orbit-scene [--width <px>] [--height <px>] [--pixel-ratio <ratio>] \
[--headless] [--frames <n>] [--dump-scene <path>]";

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    width: u32,
    height: u32,
    device_pixel_ratio: Option<f32>,
    headless: bool,
    frames: Option<u64>,
    dump_scene: Option<PathBuf>,
}

impl Default for CliOptions {
    fn default() -> Self {
        let viewport = ViewportConfig::default();
        Self {
            width: viewport.width,
            height: viewport.height,
            device_pixel_ratio: None,
            headless: false,
            frames: None,
            dump_scene: None,
        }
    }
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let flag = arg.as_str();
            let mut value = || {
                args.next()
                    .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
            };
            match flag {
                "--width" => options.width = parse_number(flag, &value()?)?,
                "--height" => options.height = parse_number(flag, &value()?)?,
                "--pixel-ratio" => {
                    options.device_pixel_ratio = Some(parse_number(flag, &value()?)?)
                }
                "--frames" => options.frames = Some(parse_number(flag, &value()?)?),
                "--dump-scene" => options.dump_scene = Some(PathBuf::from(value()?)),
                "--headless" => options.headless = true,
                "--help" | "-h" => return Err(anyhow!(USAGE)),
                other => return Err(anyhow!("Unknown argument: {other}. {USAGE}")),
            }
        }
        if options.frames == Some(0) {
            return Err(anyhow!("--frames must be at least 1"));
        }
        options.viewport(1.0).validate()?;
        Ok(options)
    }

    fn viewport(&self, device_pixel_ratio: f32) -> ViewportConfig {
        ViewportConfig::new(self.width, self.height, device_pixel_ratio)
    }
}

fn parse_number<T>(flag: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value for {flag}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_to_a_windowed_720p_viewport() {
        let options = parse(&[]).unwrap();
        assert_eq!(options, CliOptions::default());
        assert_eq!((options.width, options.height), (1280, 720));
        assert!(!options.headless);
    }

    #[test]
    fn parses_every_flag() {
        let options = parse(&[
            "--width",
            "640",
            "--height",
            "480",
            "--pixel-ratio",
            "3",
            "--headless",
            "--frames",
            "5",
            "--dump-scene",
            "scene.json",
        ])
        .unwrap();
        assert_eq!(options.width, 640);
        assert_eq!(options.height, 480);
        assert_eq!(options.device_pixel_ratio, Some(3.0));
        assert!(options.headless);
        assert_eq!(options.frames, Some(5));
        assert_eq!(options.dump_scene, Some(PathBuf::from("scene.json")));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--width"]).is_err());
        assert!(parse(&["--width", "wide"]).is_err());
        assert!(parse(&["--height", "0"]).is_err());
        assert!(parse(&["--frames", "0"]).is_err());
        assert!(parse(&["--fullscreen"]).is_err());
    }
}
