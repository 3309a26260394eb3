use wasm_bindgen::prelude::*;

pub mod math;
pub mod mesh;
pub mod tree;
pub mod animation;

use rand::SeedableRng;
use rand::rngs::StdRng;

use tree::{Preset, Tree};
use animation::TreeAnimator;

/// Initialize panic hook for better error messages
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Engine state exposed to JavaScript
///
/// Holds one preset, the tree built from it, and an optional growth
/// animator over the tree's vertex buffer. The host owns the render loop and
/// drives `animate` from its own ticks.
#[wasm_bindgen]
pub struct GenerativeTree {
    preset: Preset,
    tree: Option<Tree>,
    animator: Option<TreeAnimator>,
}

#[wasm_bindgen]
impl GenerativeTree {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GenerativeTree {
        Self {
            preset: Preset::default(),
            tree: None,
            animator: None,
        }
    }

    /// Load a preset from a YAML string; discards any built tree
    #[wasm_bindgen]
    pub fn load_preset(&mut self, yaml: &str) -> Result<(), JsValue> {
        self.preset = Preset::from_yaml(yaml).map_err(|e| JsValue::from_str(&e))?;
        self.tree = None;
        self.animator = None;
        Ok(())
    }

    /// Build the tree with the preset's seed
    #[wasm_bindgen]
    pub fn build(&mut self) -> Result<(), JsValue> {
        self.build_with_seed(self.preset.seed)
    }

    /// Build the tree with an explicit seed; same seed, same tree
    #[wasm_bindgen]
    pub fn build_with_seed(&mut self, seed: u64) -> Result<(), JsValue> {
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = Tree::build(&self.preset, &mut rng).map_err(|e| JsValue::from_str(&e))?;
        self.tree = Some(tree);
        self.animator = None;
        Ok(())
    }

    #[wasm_bindgen]
    pub fn vertex_count(&self) -> u32 {
        self.tree.as_ref().map_or(0, |t| t.mesh.vertex_count() as u32)
    }

    #[wasm_bindgen]
    pub fn triangle_count(&self) -> u32 {
        self.tree.as_ref().map_or(0, |t| t.mesh.triangle_count() as u32)
    }

    #[wasm_bindgen]
    pub fn branch_count(&self) -> u32 {
        self.tree.as_ref().map_or(0, |t| t.branch_count() as u32)
    }

    /// Interleaved static buffer: position(3) + normal(3) + uv(2) per vertex
    #[wasm_bindgen]
    pub fn vertex_data(&self) -> Result<js_sys::Float32Array, JsValue> {
        let tree = self.tree.as_ref().ok_or_else(no_tree)?;
        Ok(js_sys::Float32Array::from(tree.mesh.vertex_data().as_slice()))
    }

    /// Triangle index list for the combined mesh
    #[wasm_bindgen]
    pub fn index_data(&self) -> Result<js_sys::Uint32Array, JsValue> {
        let tree = self.tree.as_ref().ok_or_else(no_tree)?;
        Ok(js_sys::Uint32Array::from(tree.mesh.index_data()))
    }

    /// UV coordinates only, flat
    #[wasm_bindgen]
    pub fn uv_data(&self) -> Result<js_sys::Float32Array, JsValue> {
        let tree = self.tree.as_ref().ok_or_else(no_tree)?;
        Ok(js_sys::Float32Array::from(tree.mesh.uv_data().as_slice()))
    }

    /// Start growing from the collapsed state, using the preset's speed and
    /// smoothing
    #[wasm_bindgen]
    pub fn start_animation(&mut self) -> Result<(), JsValue> {
        let tree = self.tree.as_ref().ok_or_else(no_tree)?;
        self.animator = Some(TreeAnimator::new(
            tree,
            self.preset.growth_speed,
            self.preset.smooth_growth,
        ));
        Ok(())
    }

    /// Advance the growth animation one step; returns true when finished
    #[wasm_bindgen]
    pub fn animate(&mut self, dt: f32) -> Result<bool, JsValue> {
        let tree = self.tree.as_ref().ok_or_else(no_tree)?;
        let animator = self
            .animator
            .as_mut()
            .ok_or_else(|| JsValue::from_str("Animation not started"))?;
        Ok(animator.tick(tree, dt))
    }

    /// Live vertex positions of the growing mesh, flat
    #[wasm_bindgen]
    pub fn animated_position_data(&self) -> Result<js_sys::Float32Array, JsValue> {
        let animator = self
            .animator
            .as_ref()
            .ok_or_else(|| JsValue::from_str("Animation not started"))?;
        Ok(js_sys::Float32Array::from(
            animator.position_data().as_slice(),
        ))
    }

    #[wasm_bindgen]
    pub fn is_animation_finished(&self) -> bool {
        self.animator.as_ref().is_some_and(|a| a.is_finished())
    }
}

impl Default for GenerativeTree {
    fn default() -> Self {
        Self::new()
    }
}

fn no_tree() -> JsValue {
    JsValue::from_str("No tree built yet")
}
