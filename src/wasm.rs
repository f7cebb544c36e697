// Browser bindings. The page owns the canvas and the animation loop; it hands the
// WebGL2 context over once and then calls `draw` every frame.

use wasm_bindgen::{prelude::wasm_bindgen, JsValue};
use web_sys::WebGl2RenderingContext;

use crate::{
    config::EngineConfig,
    engine::{self, App},
    guard::RawParameters,
    helper,
    surface::WebGlSurface,
};

#[wasm_bindgen]
pub fn initialise() {
    console_error_panic_hook::set_once();
    // A second call finds the logger already installed; that is fine.
    let _ = console_log::init_with_level(log::Level::Info);
    engine::initialise();
}

#[wasm_bindgen]
pub fn create_app(
    context: WebGl2RenderingContext,
    width: u32,
    height: u32,
) -> Result<WebApp, JsValue> {
    create_app_with_config(context, width, height, None)
}

// `config` is an optional JSON document with any subset of the engine settings.
#[wasm_bindgen]
pub fn create_app_with_config(
    context: WebGl2RenderingContext,
    width: u32,
    height: u32,
    config: Option<String>,
) -> Result<WebApp, JsValue> {
    let config = match config {
        Some(text) => {
            EngineConfig::from_json(&text).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => EngineConfig::default(),
    };

    let app = engine::create_app_with_config(WebGlSurface::new(context), width, height, config)
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(WebApp { app })
}

// Pointer position (normalized, origin bottom-left) to steering phase.
#[wasm_bindgen]
pub fn steering_phase(spacing: f64, pointer_x: f64, pointer_y: f64) -> f64 {
    helper::steering_phase(spacing, pointer_x, pointer_y)
}

#[wasm_bindgen]
pub struct WebApp {
    app: App<WebGlSurface>,
}

#[wasm_bindgen]
impl WebApp {
    // Returns whether the frame reached the canvas. Never throws.
    pub fn draw(
        &mut self,
        time: f64,
        num_elements: f64,
        spacing: f64,
        frequency: f64,
        phase: f64,
        zoom: f64,
    ) -> bool {
        // Slider values arrive as JS numbers; the cast saturates and maps NaN to 0,
        // which the guard then raises to 1.
        self.app
            .draw_raw(RawParameters {
                time,
                num_elements: num_elements as i64,
                spacing,
                frequency,
                phase,
                zoom,
            })
            .is_presented()
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.app
            .resize(width, height)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn frames_skipped(&self) -> f64 {
        self.app.stats().skipped as f64
    }
}
