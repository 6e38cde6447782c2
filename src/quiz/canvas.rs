//! Freehand sketch surface: pointer strokes, pen styling and the settle
//! debounce that hands a finished sketch to recognition.

use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, window};

/// Pen-up inactivity before recognition fires on the settled sketch.
pub(crate) const DEBOUNCE_MS: i32 = 800;

const PEN_COLOR: &str = "#00ff9d";
const PEN_WIDTH: f64 = 5.0;

struct Sketch {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    drawing: bool,
    last_x: f64,
    last_y: f64,
    settle_timer: Option<i32>,
}

thread_local! {
    static SKETCH: RefCell<Option<Sketch>> = RefCell::new(None);
}

/// Binds the drawing canvas and its pointer listeners. Runs once at mount;
/// [`prepare`] re-sizes and re-inks per round.
pub(crate) fn install(doc: &Document) -> Result<(), JsValue> {
    let canvas: HtmlCanvasElement = doc
        .get_element_by_id("write-canvas")
        .ok_or_else(|| JsValue::from_str("no #write-canvas"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context on #write-canvas"))?
        .dyn_into()?;

    SKETCH.with(|cell| {
        cell.replace(Some(Sketch {
            canvas: canvas.clone(),
            ctx,
            drawing: false,
            last_x: 0.0,
            last_y: 0.0,
            settle_timer: None,
        }));
    });

    // Pointer down: start a stroke and cancel any pending recognition.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::PointerEvent| {
            // offset_x/offset_y give canvas-local coordinates without pulling
            // in DomRect.
            SKETCH.with(|cell| {
                if let Some(sketch) = cell.borrow_mut().as_mut() {
                    sketch.drawing = true;
                    sketch.last_x = evt.offset_x() as f64;
                    sketch.last_y = evt.offset_y() as f64;
                    if let Some(token) = sketch.settle_timer.take() {
                        if let Some(win) = window() {
                            win.clear_timeout_with_handle(token);
                        }
                    }
                }
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Pointer move: extend the stroke segment by segment.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::PointerEvent| {
            SKETCH.with(|cell| {
                if let Some(sketch) = cell.borrow_mut().as_mut() {
                    if !sketch.drawing {
                        return;
                    }
                    let x = evt.offset_x() as f64;
                    let y = evt.offset_y() as f64;
                    sketch.ctx.begin_path();
                    sketch.ctx.move_to(sketch.last_x, sketch.last_y);
                    sketch.ctx.line_to(x, y);
                    sketch.ctx.stroke();
                    sketch.last_x = x;
                    sketch.last_y = y;
                }
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    // Pointer up or out: end the stroke and arm the settle debounce.
    for event in ["pointerup", "pointerout"] {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::PointerEvent| {
            end_stroke();
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn end_stroke() {
    let was_drawing = SKETCH.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .map(|sketch| std::mem::replace(&mut sketch.drawing, false))
            .unwrap_or(false)
    });
    if was_drawing {
        arm_settle_timer();
    }
}

/// At most one recognition is ever pending: re-arming replaces the token.
fn arm_settle_timer() {
    let Some(win) = window() else { return };
    SKETCH.with(|cell| {
        if let Some(sketch) = cell.borrow_mut().as_mut() {
            if let Some(token) = sketch.settle_timer.take() {
                win.clear_timeout_with_handle(token);
            }
        }
    });
    let closure = Closure::wrap(Box::new(move || {
        SKETCH.with(|cell| {
            if let Some(sketch) = cell.borrow_mut().as_mut() {
                sketch.settle_timer = None;
            }
        });
        wasm_bindgen_futures::spawn_local(super::ocr::recognize_sketch());
    }) as Box<dyn FnMut()>);
    let token = win
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            DEBOUNCE_MS,
        )
        .ok();
    closure.forget();
    SKETCH.with(|cell| {
        if let Some(sketch) = cell.borrow_mut().as_mut() {
            sketch.settle_timer = token;
        }
    });
}

/// Sizes the raster to its container and re-inks the pen (resizing resets
/// canvas context state). Runs at each round start.
pub(crate) fn prepare() {
    SKETCH.with(|cell| {
        if let Some(sketch) = cell.borrow().as_ref() {
            if let Some(parent) = sketch.canvas.parent_element() {
                sketch.canvas.set_width(parent.client_width().max(0) as u32);
                sketch.canvas.set_height(parent.client_height().max(0) as u32);
            }
            sketch.ctx.set_stroke_style_str(PEN_COLOR);
            sketch.ctx.set_line_width(PEN_WIDTH);
            sketch.ctx.set_line_cap("round");
            sketch.ctx.set_line_join("round");
        }
    });
}

/// Wipes the raster and resets the recognition preview.
pub(crate) fn clear() {
    SKETCH.with(|cell| {
        if let Some(sketch) = cell.borrow().as_ref() {
            sketch.ctx.clear_rect(
                0.0,
                0.0,
                sketch.canvas.width() as f64,
                sketch.canvas.height() as f64,
            );
        }
    });
    super::ocr::reset_preview();
}

/// Handle to the sketch raster, passed to the recognition engine as its image.
pub(crate) fn sketch_canvas() -> Option<HtmlCanvasElement> {
    SKETCH.with(|cell| cell.borrow().as_ref().map(|sketch| sketch.canvas.clone()))
}
