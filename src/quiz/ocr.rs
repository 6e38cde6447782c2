//! Handwriting recognition: bindings to the host page's Tesseract.js bundle,
//! the lazily-initialized engine slot and the recognize → normalize → submit
//! flow. Nothing in here is fatal; a failed attempt reports through the
//! preview and the console and the round keeps going.

use std::cell::RefCell;

use js_sys::{Object, Promise, Reflect};
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::window;

use crate::catalog;
use crate::normalize::normalize_symbol;

const ENGINE_LANG: &str = "eng";

/// Preview shown while an attempt is pending, and the idle state after clear.
const PREVIEW_IDLE: &str = "...";
/// Preview when no engine is available for this attempt.
const PREVIEW_ENGINE_DOWN: &str = "Err";
/// Preview when the engine call itself failed.
const PREVIEW_UNREADABLE: &str = "?";

#[wasm_bindgen]
extern "C" {
    /// Worker handle owned by the page's Tesseract.js bundle.
    type TesseractWorker;

    #[wasm_bindgen(js_namespace = Tesseract, js_name = createWorker, catch)]
    fn create_worker(lang: &str) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, js_name = setParameters, catch)]
    fn set_parameters(this: &TesseractWorker, params: &Object) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn recognize(
        this: &TesseractWorker,
        image: &web_sys::HtmlCanvasElement,
    ) -> Result<Promise, JsValue>;
}

/// Engine lifecycle. `Initializing` doubles as the in-flight guard: no second
/// init ever starts while one is pending.
enum EngineSlot {
    Uninitialized,
    Initializing,
    Ready(TesseractWorker),
    Failed,
}

thread_local! {
    static ENGINE: RefCell<EngineSlot> = RefCell::new(EngineSlot::Uninitialized);
}

/// Why a recognition attempt produced nothing.
#[derive(Debug, Error)]
enum RecognizeError {
    /// No engine for this attempt: init failed, or one is still in flight.
    #[error("recognition engine unavailable")]
    EngineUnavailable,
    /// The engine call itself rejected.
    #[error("recognition attempt failed")]
    RecognitionFailed,
}

/// Idle-time engine init so the first real attempt usually finds it ready.
pub(crate) async fn warmup() {
    let _ = ensure_engine().await;
}

/// Runs one best-effort recognition pass over the settled sketch and submits
/// the result when it names a catalog element. Text with no catalog match is
/// only previewed.
pub(crate) async fn recognize_sketch() {
    set_preview(PREVIEW_IDLE);
    match attempt().await {
        Ok(Some(number)) => super::submit_answer(number, true),
        Ok(None) => {}
        Err(err) => {
            web_sys::console::warn_1(&JsValue::from_str(&err.to_string()));
            set_preview(match err {
                RecognizeError::EngineUnavailable => PREVIEW_ENGINE_DOWN,
                RecognizeError::RecognitionFailed => PREVIEW_UNREADABLE,
            });
        }
    }
}

async fn attempt() -> Result<Option<u32>, RecognizeError> {
    let worker = ensure_engine().await?;
    let Some(canvas) = super::canvas::sketch_canvas() else {
        return Ok(None);
    };
    let promise = worker.recognize(&canvas).map_err(trace_failure)?;
    let done = JsFuture::from(promise).await.map_err(trace_failure)?;
    let symbol = normalize_symbol(result_text(&done).trim());
    set_preview(&symbol);
    Ok(catalog::by_symbol(&symbol).map(|element| element.number))
}

/// Hands out the shared worker, initializing it on first use. A failed init
/// leaves the slot `Failed`; the next attempt retries from scratch.
async fn ensure_engine() -> Result<TesseractWorker, RecognizeError> {
    enum Plan {
        Use(TesseractWorker),
        Init,
        Busy,
    }
    let plan = ENGINE.with(|slot| {
        let mut slot = slot.borrow_mut();
        match &*slot {
            EngineSlot::Ready(worker) => Plan::Use(worker.clone()),
            EngineSlot::Initializing => Plan::Busy,
            EngineSlot::Uninitialized | EngineSlot::Failed => {
                *slot = EngineSlot::Initializing;
                Plan::Init
            }
        }
    });
    match plan {
        Plan::Use(worker) => Ok(worker),
        Plan::Busy => Err(RecognizeError::EngineUnavailable),
        Plan::Init => match init_worker().await {
            Ok(worker) => {
                ENGINE.with(|slot| {
                    slot.replace(EngineSlot::Ready(worker.clone()));
                });
                web_sys::console::log_1(&JsValue::from_str("recognition engine ready"));
                Ok(worker)
            }
            Err(err) => {
                ENGINE.with(|slot| {
                    slot.replace(EngineSlot::Failed);
                });
                web_sys::console::error_2(
                    &JsValue::from_str("recognition engine init failed"),
                    &err,
                );
                Err(RecognizeError::EngineUnavailable)
            }
        },
    }
}

async fn init_worker() -> Result<TesseractWorker, JsValue> {
    let worker: TesseractWorker = JsFuture::from(create_worker(ENGINE_LANG)?)
        .await?
        .unchecked_into();
    let params = Object::new();
    Reflect::set(
        &params,
        &JsValue::from_str("tessedit_char_whitelist"),
        &JsValue::from_str(&catalog::symbol_whitelist()),
    )?;
    JsFuture::from(worker.set_parameters(&params)?).await?;
    Ok(worker)
}

fn trace_failure(err: JsValue) -> RecognizeError {
    web_sys::console::error_2(&JsValue::from_str("recognition failed"), &err);
    RecognizeError::RecognitionFailed
}

/// Pulls `data.text` out of a recognition result object.
fn result_text(result: &JsValue) -> String {
    Reflect::get(result, &JsValue::from_str("data"))
        .and_then(|data| Reflect::get(&data, &JsValue::from_str("text")))
        .ok()
        .and_then(|text| text.as_string())
        .unwrap_or_default()
}

pub(crate) fn reset_preview() {
    set_preview(PREVIEW_IDLE);
}

fn set_preview(text: &str) {
    if let Some(doc) = window().and_then(|w| w.document()) {
        super::set_text(&doc, "recognition-preview", text);
    }
}
