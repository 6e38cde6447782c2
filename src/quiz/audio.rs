//! Verdict sound cues, synthesized per press through the Web Audio API.
//! Missing or blocked audio degrades to silence.

use std::cell::RefCell;

use wasm_bindgen::JsValue;
use web_sys::{AudioContext, OscillatorType};

/// The three verdict sounds.
pub(crate) enum Cue {
    Correct,
    Wrong,
    Tempt,
}

thread_local! {
    static AUDIO: RefCell<Option<AudioContext>> = RefCell::new(None);
}

/// Creates the shared context. Must run inside a user gesture or the browser
/// starts it suspended.
pub(crate) fn init() {
    AUDIO.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.is_none() {
            *slot = AudioContext::new().ok();
        }
    });
}

pub(crate) fn play(cue: Cue) {
    AUDIO.with(|cell| {
        if let Some(ctx) = cell.borrow().as_ref() {
            let _ = synth(ctx, cue);
        }
    });
}

/// One oscillator + gain envelope per cue. A rising chirp for correct, a
/// falling sawtooth buzz for wrong, a wavering triangle for the temptation.
fn synth(ctx: &AudioContext, cue: Cue) -> Result<(), JsValue> {
    let osc = ctx.create_oscillator()?;
    let gain = ctx.create_gain()?;
    osc.connect_with_audio_node(&gain)?;
    gain.connect_with_audio_node(&ctx.destination())?;
    let now = ctx.current_time();

    match cue {
        Cue::Correct => {
            osc.frequency().set_value_at_time(880.0, now)?;
            osc.frequency()
                .exponential_ramp_to_value_at_time(1760.0, now + 0.1)?;
            gain.gain().set_value_at_time(0.1, now)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, now + 0.3)?;
            osc.start_with_when(now)?;
            osc.stop_with_when(now + 0.3)?;
        }
        Cue::Wrong => {
            osc.set_type(OscillatorType::Sawtooth);
            osc.frequency().set_value_at_time(150.0, now)?;
            osc.frequency()
                .linear_ramp_to_value_at_time(100.0, now + 0.2)?;
            gain.gain().set_value_at_time(0.2, now)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, now + 0.4)?;
            osc.start_with_when(now)?;
            osc.stop_with_when(now + 0.4)?;
        }
        Cue::Tempt => {
            osc.set_type(OscillatorType::Triangle);
            osc.frequency().set_value_at_time(200.0, now)?;
            osc.frequency()
                .linear_ramp_to_value_at_time(180.0, now + 0.15)?;
            gain.gain().set_value_at_time(0.1, now)?;
            gain.gain()
                .exponential_ramp_to_value_at_time(0.01, now + 0.3)?;
            osc.start_with_when(now)?;
            osc.stop_with_when(now + 0.3)?;
        }
    }
    Ok(())
}
