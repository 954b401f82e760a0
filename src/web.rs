#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{window, HtmlCanvasElement};

use crate::bootstrap::SceneContext;
use crate::config::{RendererOptions, ViewportConfig};
use crate::controls::OrbitControls;
use crate::frame_loop::{AnimationLoop, FrameStatus, LoopHandle};
use crate::input::web::WebInputHandler;
use crate::input::InputState;
use crate::render::GpuRenderer;

const DEFAULT_CANVAS: &str = "#three-canvas";

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
    let _ = wasm_logger::init(wasm_logger::Config::default());
}

/// Builds the scene on the canvas matching `selector` (default
/// `#three-canvas`) and starts drawing on every animation frame.
#[wasm_bindgen]
pub async fn start(selector: Option<String>) -> Result<WebApp, JsValue> {
    let selector = selector.unwrap_or_else(|| DEFAULT_CANVAS.to_string());
    let app = WebApp::launch(&selector)
        .await
        .map_err(|err| JsValue::from_str(&format!("{err:#}")))?;
    Ok(app)
}

/// Handle to a running scene. Dropping it (or calling `free()` from JS)
/// cancels the pending frame and detaches the input listeners.
#[wasm_bindgen]
pub struct WebApp {
    inner: Rc<RefCell<AppState>>,
    handle: LoopHandle,
}

#[wasm_bindgen]
impl WebApp {
    /// Stops the loop; the frame already queued is cancelled.
    pub fn stop(&self) {
        self.handle.stop();
        self.inner.borrow_mut().cancel_frame();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.handle.is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.inner.borrow().animation.frames() as f64
    }
}

impl WebApp {
    async fn launch(selector: &str) -> Result<Self> {
        let window = window().ok_or_else(|| anyhow!("window not available"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("document not available"))?;
        let canvas = document
            .query_selector(selector)
            .map_err(|err| anyhow!("invalid selector {selector}: {err:?}"))?
            .ok_or_else(|| anyhow!("no element matches {selector}"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| anyhow!("{selector} is not a canvas element"))?;

        let viewport = ViewportConfig::new(
            js_dimension(window.inner_width())?,
            js_dimension(window.inner_height())?,
            window.device_pixel_ratio() as f32,
        );
        viewport.validate().context("window has no visible area")?;

        let options = RendererOptions::for_viewport(&viewport);
        let (buffer_width, buffer_height) = options.drawing_buffer_size();
        canvas.set_width(buffer_width);
        canvas.set_height(buffer_height);
        let style = canvas.style();
        style
            .set_property("width", &format!("{}px", viewport.width))
            .and_then(|_| style.set_property("height", &format!("{}px", viewport.height)))
            .map_err(|err| anyhow!("failed to size canvas: {err:?}"))?;

        let renderer = GpuRenderer::new(wgpu::SurfaceTarget::Canvas(canvas.clone()), options)
            .await
            .context("failed to initialize renderer")?;

        let input = Arc::new(InputState::new());
        let input_handler = WebInputHandler::attach(&canvas, Arc::clone(&input))?;
        let controls = OrbitControls::new(input, &viewport);
        let context = SceneContext::new(renderer, &viewport, controls)?;

        let animation = AnimationLoop::new();
        let handle = animation.handle();
        let inner = Rc::new(RefCell::new(AppState {
            context,
            animation,
            _input_handler: input_handler,
            callback: None,
            pending_frame: None,
        }));

        let weak: Weak<RefCell<AppState>> = Rc::downgrade(&inner);
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Some(state) = weak.upgrade() {
                run_frame(&state);
            }
        });
        {
            let mut state = inner.borrow_mut();
            state.callback = Some(callback);
            state.request_frame()?;
        }

        info!("scene attached to {selector}");
        Ok(Self { inner, handle })
    }
}

impl Drop for WebApp {
    fn drop(&mut self) {
        self.handle.stop();
        if let Ok(mut state) = self.inner.try_borrow_mut() {
            state.cancel_frame();
        }
    }
}

struct AppState {
    context: SceneContext<GpuRenderer, OrbitControls>,
    animation: AnimationLoop,
    _input_handler: WebInputHandler,
    callback: Option<Closure<dyn FnMut()>>,
    pending_frame: Option<i32>,
}

impl AppState {
    fn request_frame(&mut self) -> Result<()> {
        let window = window().ok_or_else(|| anyhow!("window not available"))?;
        let callback = self
            .callback
            .as_ref()
            .ok_or_else(|| anyhow!("frame callback not installed"))?;
        let id = window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|err| anyhow!("requestAnimationFrame failed: {err:?}"))?;
        self.pending_frame = Some(id);
        Ok(())
    }

    fn cancel_frame(&mut self) {
        if let (Some(id), Some(window)) = (self.pending_frame.take(), window()) {
            let _ = window.cancel_animation_frame(id);
        }
    }
}

fn run_frame(state: &Rc<RefCell<AppState>>) {
    let mut state = state.borrow_mut();
    state.pending_frame = None;
    let AppState {
        context, animation, ..
    } = &mut *state;
    match animation.tick(|| context.draw()) {
        Ok(FrameStatus::Continue) => {
            if let Err(err) = state.request_frame() {
                error!("{err:#}");
            }
        }
        Ok(FrameStatus::Stopped) => {
            info!("animation loop stopped after {} frames", state.animation.frames());
        }
        Err(err) => error!("frame failed, stopping: {err:#}"),
    }
}

fn js_dimension(value: Result<JsValue, JsValue>) -> Result<u32> {
    value
        .ok()
        .and_then(|value| value.as_f64())
        .map(|value| value.max(0.0) as u32)
        .ok_or_else(|| anyhow!("window size not available"))
}
