#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records one relaxation pass of a run.
#[allow(unused)]
pub fn debug_relax(iter: usize, angles: &[f64], residual: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "relax",
            "iter": iter,
            "angles": angles,
            "residual": residual,
        }))
    })
}

/// Records the blended curvature chosen for an anchor.
#[allow(unused)]
pub fn debug_blend(index: usize, curvature: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "blend",
            "index": index,
            "curvature": curvature,
        }))
    })
}

/// Drains everything recorded on this thread since the last call.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
