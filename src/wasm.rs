#![cfg(target_arch = "wasm32")]

use crate::config::{
    charge_presets, field_presets, mass_presets, rate_presets, speed_presets, Preset, SimConfig,
};
use crate::engine::SimulationContext;
use crate::field::FieldBounds;
use crate::right_hand::{Overlays, ThumbRule};
use crate::sim::Scheme;
use nalgebra::Vector3;
use serde::Deserialize;
use wasm_bindgen::prelude::*;

fn to_js<E: std::fmt::Display>(e: E) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn vec_to_flat(v: &Vector3<f64>) -> Vec<f64> {
    vec![v.x, v.y, v.z]
}

fn presets_to_js(presets: &[Preset]) -> js_sys::Array {
    let out = js_sys::Array::new();
    for p in presets {
        let obj = js_sys::Object::new();
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("id"), &JsValue::from_str(p.id));
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("label"), &JsValue::from_str(p.label));
        let _ = js_sys::Reflect::set(&obj, &JsValue::from_str("value"), &JsValue::from_f64(p.value));
        out.push(&JsValue::from(obj));
    }
    out
}

#[wasm_bindgen]
pub fn mass_options() -> js_sys::Array { presets_to_js(mass_presets()) }

#[wasm_bindgen]
pub fn charge_options() -> js_sys::Array { presets_to_js(charge_presets()) }

#[wasm_bindgen]
pub fn speed_options() -> js_sys::Array { presets_to_js(speed_presets()) }

#[wasm_bindgen]
pub fn field_options() -> js_sys::Array { presets_to_js(field_presets()) }

#[wasm_bindgen]
pub fn rate_options() -> js_sys::Array { presets_to_js(rate_presets()) }

#[wasm_bindgen]
pub fn default_config() -> JsValue {
    serde_wasm_bindgen::to_value(&SimConfig::default()).unwrap_or(JsValue::NULL)
}

#[wasm_bindgen]
pub struct WasmSim {
    ctx: SimulationContext,
}

#[wasm_bindgen]
impl WasmSim {
    /// Default classroom scene. `now` is `performance.now() / 1000`.
    #[wasm_bindgen(constructor)]
    pub fn new(now: f64) -> Result<WasmSim, JsValue> {
        let ctx = SimulationContext::new(&SimConfig::default(), now).map_err(to_js)?;
        Ok(WasmSim { ctx })
    }

    /// Build from a partial config object, e.g. `{ charge: -1e-19, scheme: "euler" }`.
    #[wasm_bindgen(js_name = "newFromConfig")]
    pub fn new_from_config(config: JsValue, now: f64) -> Result<WasmSim, JsValue> {
        let cfg: SimConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("invalid config: {}", e)))?;
        let ctx = SimulationContext::new(&cfg, now).map_err(to_js)?;
        Ok(WasmSim { ctx })
    }

    /// Returns the simulated seconds of this frame.
    pub fn tick(&mut self, now: f64) -> f64 { self.ctx.tick(now).sim_dt }

    pub fn position(&self) -> Vec<f64> { vec_to_flat(self.ctx.particle().position()) }

    pub fn velocity(&self) -> Vec<f64> { vec_to_flat(self.ctx.particle().velocity()) }

    pub fn force(&self) -> Vec<f64> { vec_to_flat(self.ctx.particle().force()) }

    pub fn speed(&self) -> f64 { self.ctx.particle().speed() }

    /// Tip of the velocity arrow.
    pub fn endpoint(&self) -> Vec<f64> { vec_to_flat(self.ctx.handle().endpoint()) }

    pub fn trail(&self) -> Vec<f64> { self.ctx.trail().flat() }

    pub fn snapshot(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.ctx.snapshot()).unwrap_or(JsValue::NULL)
    }

    /// Bumped whenever field lines need rebuilding.
    pub fn field_revision(&self) -> f64 { self.ctx.field().revision() as f64 }

    pub fn field_bounds(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.ctx.field().bounds()).unwrap_or(JsValue::NULL)
    }

    pub fn field_magnitude(&self) -> f64 { self.ctx.field().magnitude() }

    pub fn is_paused(&self) -> bool { self.ctx.is_paused() }

    #[wasm_bindgen(js_name = "togglePause")]
    pub fn toggle_pause(&mut self) -> bool { self.ctx.toggle_pause() }

    pub fn set_mass(&mut self, mass: f64) -> Result<(), JsValue> {
        self.ctx.set_mass(mass).map_err(to_js)
    }

    pub fn set_charge(&mut self, charge: f64) -> Result<(), JsValue> {
        self.ctx.set_charge(charge).map_err(to_js)
    }

    pub fn set_speed(&mut self, speed: f64) -> Result<(), JsValue> {
        self.ctx.set_speed(speed).map_err(to_js)
    }

    pub fn set_field_magnitude(&mut self, magnitude: f64) -> Result<(), JsValue> {
        self.ctx.set_field_magnitude(magnitude).map_err(to_js)
    }

    pub fn set_field_bounds(&mut self, bounds: JsValue) -> Result<(), JsValue> {
        let bounds: FieldBounds = serde_wasm_bindgen::from_value(bounds)
            .map_err(|e| JsValue::from_str(&format!("invalid bounds: {}", e)))?;
        self.ctx.set_field_bounds(bounds).map_err(to_js)
    }

    pub fn set_time_slow_rate(&mut self, rate: f64) -> Result<(), JsValue> {
        self.ctx.set_time_slow_rate(rate).map_err(to_js)
    }

    pub fn set_scheme(&mut self, scheme: &str) -> Result<(), JsValue> {
        let scheme = Scheme::from_id(scheme)
            .ok_or_else(|| JsValue::from_str(&format!("unknown scheme '{}'", scheme)))?;
        self.ctx.set_scheme(scheme);
        Ok(())
    }

    pub fn apply_preset(&mut self, kind: &str, id: &str) -> Result<(), JsValue> {
        self.ctx.apply_preset(kind, id).map_err(to_js)
    }

    pub fn move_particle_to(&mut self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.ctx.move_particle_to(Vector3::new(x, y, z)).map_err(to_js)
    }

    pub fn begin_velocity_drag(&mut self) -> Result<(), JsValue> {
        self.ctx.begin_velocity_drag().map_err(to_js)
    }

    pub fn drag_velocity_to(&mut self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.ctx.drag_velocity_to(Vector3::new(x, y, z)).map_err(to_js)
    }

    pub fn end_velocity_drag(&mut self) { self.ctx.end_velocity_drag(); }

    pub fn drag_thumb_to(&mut self, x: f64, y: f64, z: f64) -> Result<(), JsValue> {
        self.ctx.drag_thumb_to(Vector3::new(x, y, z)).map_err(to_js)
    }

    pub fn thumb(&self) -> Vec<f64> { vec_to_flat(self.ctx.guide().thumb()) }

    /// [anchor xyz, look-at xyz, roll]
    pub fn hand_pose(&self) -> Vec<f64> {
        let pose = self.ctx.guide().hand_pose();
        vec![
            pose.anchor.x, pose.anchor.y, pose.anchor.z,
            pose.look_at.x, pose.look_at.y, pose.look_at.z,
            pose.roll,
        ]
    }

    pub fn guide_stage(&self) -> String { self.ctx.guide().stage().name().to_string() }

    pub fn can_finish_guide(&self) -> bool { self.ctx.guide().can_finish() }

    pub fn overlays(&self) -> JsValue {
        let force = *self.ctx.particle().force();
        let guide = self.ctx.guide();
        let visible = Overlays {
            hand: guide.hand_visible(&force),
            velocity: guide.overlays().velocity,
            force: guide.force_visible(&force),
            trail: guide.overlays().trail,
        };
        serde_wasm_bindgen::to_value(&visible).unwrap_or(JsValue::NULL)
    }

    pub fn set_overlays(&mut self, overlays: JsValue) -> Result<(), JsValue> {
        let o: OverlayFlags = serde_wasm_bindgen::from_value(overlays)
            .map_err(|e| JsValue::from_str(&format!("invalid overlays: {}", e)))?;
        let current = *self.ctx.guide().overlays();
        self.ctx.guide_mut().set_overlays(Overlays {
            hand: o.hand.unwrap_or(current.hand),
            velocity: o.velocity.unwrap_or(current.velocity),
            force: o.force.unwrap_or(current.force),
            trail: o.trail.unwrap_or(current.trail),
        });
        Ok(())
    }

    pub fn start_guide(&mut self) -> Result<(), JsValue> {
        self.ctx.start_guide().map_err(to_js)
    }

    pub fn guide_point_fingers(&mut self) -> Result<(), JsValue> {
        self.ctx.guide_point_fingers().map_err(to_js)
    }

    pub fn guide_open_palm(&mut self) -> Result<(), JsValue> {
        self.ctx.guide_open_palm().map_err(to_js)
    }

    /// "along", "against", or "" when no force acts.
    pub fn guide_read_thumb(&mut self) -> Result<String, JsValue> {
        let rule = self.ctx.guide_read_thumb().map_err(to_js)?;
        Ok(match rule {
            Some(ThumbRule::AlongThumb) => "along".to_string(),
            Some(ThumbRule::AgainstThumb) => "against".to_string(),
            None => String::new(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OverlayFlags {
    #[serde(default)]
    hand: Option<bool>,
    #[serde(default)]
    velocity: Option<bool>,
    #[serde(default)]
    force: Option<bool>,
    #[serde(default)]
    trail: Option<bool>,
}
