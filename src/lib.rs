//! Periodic Sprint core crate.
//!
//! Browser quiz game drilling the first twenty chemical elements against the
//! clock. The element catalog, recognition-text normalizer and round state
//! machine are plain Rust and natively testable; everything touching the page
//! (DOM wiring, the freehand canvas, handwriting recognition, audio cues, the
//! best-time store) lives in the wasm-only `quiz` module behind `start_game()`.

use wasm_bindgen::prelude::*;

pub mod catalog;
pub mod normalize;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod quiz;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Wires the quiz to the host page and schedules the recognition-engine
/// warmup. Expects the page markup (screens, buttons, drawing canvas) to
/// already exist; a missing structural element is a startup error.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    quiz::mount()
}
