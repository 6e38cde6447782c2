//! Browser shell: screens, question rendering, answer fan-in, verdict
//! feedback and the round timer loop. Everything here is glue between the
//! host page and the pure `session` state machine.

use std::cell::RefCell;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, HtmlInputElement, window};

use crate::catalog;
use crate::session::{
    ADVANCE_DELAY_MS, InputMode, Outcome, Prompt, QuizMode, Session, Step, format_elapsed,
    improves_best,
};

mod audio;
mod canvas;
mod ocr;
mod store;

/// How long the verdict overlay stays lit before fading out.
const FEEDBACK_FADE_MS: i32 = 400;

/// Idle delay before the recognition-engine warmup starts at mount.
const WARMUP_DELAY_MS: i32 = 1_000;

const SCREEN_IDS: [&str; 3] = ["start-screen", "game-screen", "result-screen"];

/// Live round plus the timer tokens its closures juggle. At most one advance
/// and one feedback-fade timeout are ever pending.
struct Round {
    session: Session,
    rng: StdRng,
    advance_timer: Option<i32>,
    feedback_timer: Option<i32>,
}

thread_local! {
    static ROUND: RefCell<Option<Round>> = RefCell::new(None);
}

/// Mounts the quiz onto the current document: wires every control, shows the
/// stored best time and schedules the recognition-engine warmup.
pub(crate) fn mount() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    if let Some(best) = store::load() {
        set_text(&doc, "best-time-display", &best);
    }

    canvas::install(&doc)?;
    wire_controls(&doc)?;
    schedule_warmup(&win);
    Ok(())
}

// --- Control wiring -----------------------------------------------------------

fn wire_controls(doc: &Document) -> Result<(), JsValue> {
    // Start button: read the radio config and launch a round.
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            if let Some(doc) = document() {
                if let Err(err) = start_round(&doc) {
                    web_sys::console::error_1(&err);
                }
            }
        }) as Box<dyn FnMut(_)>);
        listen(doc, "start-btn", &closure)?;
        closure.forget();
    }
    // Retry returns to the start screen; the next start rebuilds the round.
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            if let Some(doc) = document() {
                show_screen(&doc, "start-screen");
            }
        }) as Box<dyn FnMut(_)>);
        listen(doc, "retry-btn", &closure)?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            canvas::clear();
        }) as Box<dyn FnMut(_)>);
        listen(doc, "clear-btn", &closure)?;
        closure.forget();
    }
    {
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            if let Some(doc) = document() {
                if let Err(err) = toggle_keyboard(&doc) {
                    web_sys::console::error_1(&err);
                }
            }
        }) as Box<dyn FnMut(_)>);
        listen(doc, "kb-toggle-btn", &closure)?;
        closure.forget();
    }
    wire_element_buttons(doc)?;
    Ok(())
}

fn listen(
    doc: &Document,
    id: &str,
    closure: &Closure<dyn FnMut(web_sys::MouseEvent)>,
) -> Result<(), JsValue> {
    doc.get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("no #{id}")))?
        .add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
}

/// One listener per answer button in the selector grid; each captures its
/// element's number from the `data-n` attribute at wiring time.
fn wire_element_buttons(doc: &Document) -> Result<(), JsValue> {
    let buttons = doc.query_selector_all(".element-btn")?;
    for i in 0..buttons.length() {
        let Some(button) = buttons.item(i).and_then(|n| n.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        let Some(number) = button.dataset().get("n").and_then(|v| v.parse::<u32>().ok()) else {
            continue;
        };
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            submit_answer(number, false);
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

/// Shows/hides the symbol keyboard, generating its buttons on first open.
fn toggle_keyboard(doc: &Document) -> Result<(), JsValue> {
    let bank = doc
        .get_element_by_id("keyboard-fallback")
        .ok_or_else(|| JsValue::from_str("no #keyboard-fallback"))?;
    bank.class_list().toggle("hidden")?;
    if !bank.inner_html().trim().is_empty() {
        return Ok(());
    }
    for element in catalog::ELEMENTS.iter() {
        let button = doc.create_element("button")?;
        button.set_class_name("kb-btn");
        button.set_text_content(Some(element.symbol));
        let number = element.number;
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
            submit_answer(number, false);
        }) as Box<dyn FnMut(_)>);
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        bank.append_child(&button)?;
    }
    Ok(())
}

fn schedule_warmup(win: &web_sys::Window) {
    let closure = Closure::wrap(Box::new(move || {
        wasm_bindgen_futures::spawn_local(ocr::warmup());
    }) as Box<dyn FnMut()>);
    let _ = win.set_timeout_with_callback_and_timeout_and_arguments_0(
        closure.as_ref().unchecked_ref(),
        WARMUP_DELAY_MS,
    );
    closure.forget();
}

// --- Round lifecycle ----------------------------------------------------------

/// Reads the start-screen configuration and launches a fresh round.
fn start_round(doc: &Document) -> Result<(), JsValue> {
    // Context creation must happen inside a user gesture to be audible.
    audio::init();

    let mode = quiz_mode_from(radio_value(doc, "quizMode").as_deref());
    let input = input_mode_from(radio_value(doc, "inputMode").as_deref());

    canvas::prepare();

    let mut rng = StdRng::from_entropy();
    let session = Session::start(mode, input, performance_now(), &mut rng);

    let stale = ROUND.with(|cell| {
        cell.replace(Some(Round {
            session,
            rng,
            advance_timer: None,
            feedback_timer: None,
        }))
    });
    if let (Some(win), Some(old)) = (window(), stale) {
        if let Some(token) = old.advance_timer {
            win.clear_timeout_with_handle(token);
        }
        if let Some(token) = old.feedback_timer {
            win.clear_timeout_with_handle(token);
        }
    }

    show_screen(doc, "game-screen");
    apply_input_visibility(doc, input);
    paint_question(doc)?;
    start_timer_loop();
    Ok(())
}

/// Single submission path for every input surface. `from_recognition` marks
/// answers produced by the handwriting pipeline, whose sketch is consumed by
/// the attempt whatever the verdict.
pub(crate) fn submit_answer(candidate: u32, from_recognition: bool) {
    let outcome = ROUND.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .and_then(|round| round.session.submit_answer(candidate))
    });
    // No active question (round over, or the gap before the finish step):
    // the submission is dropped without side effects.
    let Some(outcome) = outcome else { return };

    match outcome {
        Outcome::Correct => {
            audio::play(audio::Cue::Correct);
            flash_feedback(outcome);
            schedule_advance();
        }
        Outcome::Tempted => {
            audio::play(audio::Cue::Tempt);
            flash_feedback(outcome);
        }
        Outcome::Incorrect => {
            audio::play(audio::Cue::Wrong);
            flash_feedback(outcome);
        }
    }
    if from_recognition {
        canvas::clear();
    }
}

/// Arms the single post-answer delay; an already pending one is replaced.
fn schedule_advance() {
    let Some(win) = window() else { return };
    ROUND.with(|cell| {
        if let Some(round) = cell.borrow_mut().as_mut() {
            if let Some(token) = round.advance_timer.take() {
                win.clear_timeout_with_handle(token);
            }
        }
    });
    let closure = Closure::wrap(Box::new(move || {
        advance_round();
    }) as Box<dyn FnMut()>);
    let token = win
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            ADVANCE_DELAY_MS,
        )
        .ok();
    closure.forget();
    ROUND.with(|cell| {
        if let Some(round) = cell.borrow_mut().as_mut() {
            round.advance_timer = token;
        }
    });
}

fn advance_round() {
    let step = ROUND.with(|cell| {
        cell.borrow_mut().as_mut().map(|round| {
            round.advance_timer = None;
            round.session.advance(&mut round.rng)
        })
    });
    match step {
        Some(Step::Question(_)) => {
            if let Some(doc) = document() {
                if let Err(err) = paint_question(&doc) {
                    web_sys::console::error_1(&err);
                }
            }
        }
        Some(Step::Finished) => finish_round(),
        None => {}
    }
}

/// Closes the round: result screen, final time, miss list, best-time update.
fn finish_round() {
    let summary = ROUND.with(|cell| {
        cell.borrow_mut()
            .as_mut()
            .map(|round| round.session.finish(performance_now()))
    });
    let Some(summary) = summary else { return };
    let Some(doc) = document() else { return };

    show_screen(&doc, "result-screen");
    set_text(&doc, "result-time", &summary.time);

    if let Some(list) = doc.get_element_by_id("miss-list") {
        list.set_inner_html("");
        for symbol in &summary.missed {
            if let Ok(item) = doc.create_element("li") {
                item.set_text_content(Some(symbol));
                let _ = list.append_child(&item);
            }
        }
    }

    if improves_best(&summary.time, store::load().as_deref()) {
        store::save(&summary.time);
    }
}

// --- Rendering ----------------------------------------------------------------

/// Renders the pending question: prompt text, atom view, progress bar, and a
/// clean sketch surface.
fn paint_question(doc: &Document) -> Result<(), JsValue> {
    let pending = ROUND.with(|cell| {
        cell.borrow()
            .as_ref()
            .and_then(|round| round.session.prompt().map(|p| (p, round.session.progress())))
    });
    let Some((prompt, progress)) = pending else {
        return Ok(());
    };

    let question = doc
        .get_element_by_id("question-text")
        .ok_or_else(|| JsValue::from_str("no #question-text"))?;
    let atom_view = doc
        .get_element_by_id("atom-view")
        .ok_or_else(|| JsValue::from_str("no #atom-view"))?;

    match prompt {
        Prompt::Name(name) => {
            question.set_text_content(Some(name));
            let _ = atom_view.class_list().add_1("hidden");
        }
        Prompt::Symbol(symbol) => {
            question.set_text_content(Some(symbol));
            let _ = atom_view.class_list().add_1("hidden");
        }
        Prompt::ProtonCount(number) => {
            question.set_text_content(Some("?"));
            let _ = atom_view.class_list().remove_1("hidden");
            set_text(doc, "proton-count", &number.to_string());
        }
    }

    if let Some(bar) = doc
        .get_element_by_id("progress-fill")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    {
        bar.style()
            .set_property("width", &format!("{}%", progress * 100.0))?;
    }

    canvas::clear();
    Ok(())
}

/// Lights the verdict overlay and schedules its fade. A fresh verdict
/// restarts the fade timer instead of stacking another.
fn flash_feedback(outcome: Outcome) {
    let Some(doc) = document() else { return };
    let Some(overlay) = doc
        .get_element_by_id("feedback-overlay")
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return;
    };

    // Temptation borrows the incorrect styling plus a taunt.
    let (class, text) = match outcome {
        Outcome::Correct => ("feedback-overlay correct", ""),
        Outcome::Tempted => ("feedback-overlay incorrect", "本当に？"),
        Outcome::Incorrect => ("feedback-overlay incorrect", ""),
    };
    overlay.set_class_name(class);
    overlay.set_text_content(Some(text));
    // Reading offsetWidth forces a reflow so the opacity transition restarts.
    let _ = overlay.offset_width();
    let _ = overlay.style().set_property("opacity", "0.5");

    let Some(win) = window() else { return };
    ROUND.with(|cell| {
        if let Some(round) = cell.borrow_mut().as_mut() {
            if let Some(token) = round.feedback_timer.take() {
                win.clear_timeout_with_handle(token);
            }
        }
    });
    let fade = Closure::wrap(Box::new(move || {
        ROUND.with(|cell| {
            if let Some(round) = cell.borrow_mut().as_mut() {
                round.feedback_timer = None;
            }
        });
        if let Some(doc) = document() {
            if let Some(overlay) = doc
                .get_element_by_id("feedback-overlay")
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let _ = overlay.style().set_property("opacity", "0");
                overlay.set_text_content(Some(""));
            }
        }
    }) as Box<dyn FnMut()>);
    let token = win
        .set_timeout_with_callback_and_timeout_and_arguments_0(
            fade.as_ref().unchecked_ref(),
            FEEDBACK_FADE_MS,
        )
        .ok();
    fade.forget();
    ROUND.with(|cell| {
        if let Some(round) = cell.borrow_mut().as_mut() {
            round.feedback_timer = token;
        }
    });
}

fn show_screen(doc: &Document, id: &str) {
    for screen in SCREEN_IDS {
        if let Some(el) = doc.get_element_by_id(screen) {
            let _ = el.class_list().remove_1("active");
        }
    }
    if let Some(el) = doc.get_element_by_id(id) {
        let _ = el.class_list().add_1("active");
    }
}

fn apply_input_visibility(doc: &Document, input: InputMode) {
    let target = match input {
        InputMode::Selector => "input-area-selector",
        InputMode::Handwriting => "input-area-write",
    };
    for area in ["input-area-selector", "input-area-write"] {
        if let Some(el) = doc.get_element_by_id(area) {
            let _ = el.class_list().remove_1("active");
        }
    }
    if let Some(el) = doc.get_element_by_id(target) {
        let _ = el.class_list().add_1("active");
    }
}

// --- Timer loop ---------------------------------------------------------------

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Drives the mm:ss.cc readout via requestAnimationFrame while the round is
/// live. The chain simply stops rescheduling once the round is over.
fn start_timer_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        let elapsed = ROUND.with(|cell| {
            cell.borrow()
                .as_ref()
                .filter(|round| round.session.is_playing())
                .map(|round| round.session.elapsed_ms(ts))
        });
        let Some(elapsed) = elapsed else { return };
        if let Some(doc) = document() {
            set_text(&doc, "timer", &format_elapsed(elapsed));
        }
        if let Some(win) = window() {
            let _ =
                win.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(win) = window() {
        let _ = win.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

// --- Config & small helpers ---------------------------------------------------

/// Value of the checked radio in a named group.
fn radio_value(doc: &Document, group: &str) -> Option<String> {
    let radios = doc.get_elements_by_name(group);
    for i in 0..radios.length() {
        if let Some(radio) = radios.item(i).and_then(|n| n.dyn_into::<HtmlInputElement>().ok()) {
            if radio.checked() {
                return Some(radio.value());
            }
        }
    }
    None
}

fn quiz_mode_from(value: Option<&str>) -> QuizMode {
    match value {
        Some("symbol") => QuizMode::BySymbol,
        Some("atom") => QuizMode::ByAtomicNumber,
        _ => QuizMode::ByName,
    }
}

fn input_mode_from(value: Option<&str>) -> InputMode {
    match value {
        Some("write") => InputMode::Handwriting,
        _ => InputMode::Selector,
    }
}

fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

fn performance_now() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

/// Sets an element's text, silently skipping when the node is absent.
fn set_text(doc: &Document, id: &str, text: &str) {
    if let Some(el) = doc.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}
