//! WebAssembly bindings for Graph Explorer
//!
//! Exposes a [`GraphExplorer`] handle to JavaScript. Structured values cross
//! the boundary as JSON strings; errors become thrown JavaScript errors.

use wasm_bindgen::prelude::*;

use crate::core::{ArcData, GraphError, GraphSnapshot, NodeData, Point, Size, Viewport};
use crate::layout::{ForceConfig, ForceDirectedLayout};
use crate::model::GraphModel;

/// Initialize WASM module
///
/// Sets up panic hooks and logging for better error messages in the browser.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    use crate::core::logging::init_logging;
    let _ = init_logging(Some("info"), None);
}

fn js_error(error: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// A graph model owned by JavaScript
#[wasm_bindgen]
pub struct GraphExplorer {
    model: GraphModel,
}

impl Default for GraphExplorer {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl GraphExplorer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> GraphExplorer {
        GraphExplorer {
            model: GraphModel::new(),
        }
    }

    /// Create an explorer whose layout engine uses a JSON `ForceConfig`
    pub fn with_config(config_json: &str) -> Result<GraphExplorer, JsValue> {
        let config: ForceConfig = serde_json::from_str(config_json).map_err(js_error)?;
        Ok(GraphExplorer {
            model: GraphModel::with_engine(ForceDirectedLayout::with_config(config)),
        })
    }

    /// Replace the graph with a JSON snapshot
    pub fn load(&mut self, snapshot_json: &str) -> Result<(), JsValue> {
        let snapshot = GraphSnapshot::from_json(snapshot_json)
            .map_err(|e| js_error(GraphError::from(e)))?;
        self.model.load(snapshot).map_err(js_error)
    }

    /// Current graph as a JSON snapshot
    pub fn snapshot(&self) -> Result<String, JsValue> {
        self.model.snapshot().to_json().map_err(js_error)
    }

    pub fn add_node(&mut self, id: &str, x: f64, y: f64) -> Result<(), JsValue> {
        self.model.add_node(NodeData::at(id, x, y)).map_err(js_error)
    }

    pub fn add_arc(&mut self, id: &str, source: &str, destination: &str) -> Result<(), JsValue> {
        self.model
            .add_arc(ArcData::new(id), source, destination)
            .map_err(js_error)
    }

    /// Remove a node and its arcs; returns the removed arc ids as JSON
    pub fn remove_node(&mut self, id: &str) -> Result<String, JsValue> {
        let removed = self.model.remove_node(id).map_err(js_error)?;
        let arc_ids: Vec<&str> = removed.arcs.iter().map(ArcData::id).collect();
        serde_json::to_string(&arc_ids).map_err(js_error)
    }

    pub fn remove_arc(&mut self, id: &str) -> bool {
        self.model.remove_arc(id).is_some()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.model.degree(id)
    }

    /// Neighbor ids as a JSON array
    pub fn neighbors(&self, id: &str) -> String {
        let ids: Vec<&str> = self.model.neighbors(id).into_iter().map(NodeData::id).collect();
        serde_json::json!(ids).to_string()
    }

    pub fn set_size(&mut self, id: &str, width: f64, height: f64) -> Result<(), JsValue> {
        self.model
            .set_size(id, Size::new(width, height))
            .map_err(js_error)
    }

    /// Drop a node at a point; returns the clamped position as JSON
    pub fn move_node(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<String, JsValue> {
        let applied = self
            .model
            .move_node(id, Point::new(x, y), Viewport::new(width, height))
            .map_err(js_error)?;
        Ok(serde_json::json!({ "x": applied.x, "y": applied.y }).to_string())
    }

    pub fn expand(&mut self, id: &str) -> Result<(), JsValue> {
        self.model.expand(id).map_err(js_error)
    }

    /// Collapse a node; returns the pruned node ids as JSON
    pub fn collapse(&mut self, id: &str) -> Result<String, JsValue> {
        let removed = self.model.collapse(id).map_err(js_error)?;
        serde_json::to_string(&removed).map_err(js_error)
    }

    /// Flip a node between expanded and collapsed; returns pruned ids as JSON
    pub fn toggle(&mut self, id: &str) -> Result<String, JsValue> {
        let removed = self.model.toggle(id).map_err(js_error)?;
        serde_json::to_string(&removed).map_err(js_error)
    }

    pub fn set_label(&mut self, id: &str, label: Option<String>) -> Result<(), JsValue> {
        self.model.set_label(id, label).map_err(js_error)
    }

    /// Run one layout pass
    ///
    /// `locked_json` is a JSON array of node ids. Returns the layout report
    /// as JSON.
    pub fn layout(&mut self, width: f64, height: f64, locked_json: &str) -> Result<String, JsValue> {
        let locked: Vec<String> = if locked_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(locked_json).map_err(js_error)?
        };

        let report = self.model.layout(width, height, &locked);
        Ok(serde_json::json!({
            "iterations": report.iterations,
            "movable": report.movable,
            "max_displacement": report.max_displacement,
            "converged": report.converged,
        })
        .to_string())
    }
}
