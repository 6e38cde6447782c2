//! Personal-best persistence in `localStorage`. Unreachable storage degrades
//! to "no best time".

use web_sys::window;

const BEST_TIME_KEY: &str = "periodic-best";

/// Saved best time, if storage is reachable and one exists.
pub(crate) fn load() -> Option<String> {
    let storage = window()?.local_storage().ok()??;
    storage.get_item(BEST_TIME_KEY).ok()?
}

/// Stores a new best. Write errors are dropped; the next round simply reads
/// whatever made it in.
pub(crate) fn save(time: &str) {
    if let Some(storage) = window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = storage.set_item(BEST_TIME_KEY, time);
    }
}
