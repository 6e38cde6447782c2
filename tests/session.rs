// Round state-machine behavior: shuffling, verdicts, temptation, miss
// tracking and the timing helpers. Native tests; randomness is injected so
// every path is deterministic.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use periodic_sprint::session::{
    InputMode, Outcome, Prompt, QUESTION_COUNT, QuizMode, Session, Step, format_elapsed,
    improves_best,
};

/// Rng stub emitting one fixed word forever.
struct FixedRng(u64);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }
    fn next_u64(&mut self) -> u64 {
        self.0
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.0 as u8;
        }
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// All-zero words land under the Bernoulli threshold: every question tempts.
fn always_tempt() -> FixedRng {
    FixedRng(0)
}

/// A half-range word clears the 0.2 Bernoulli threshold (no question tempts)
/// while staying inside the accept zone of the shuffle's uniform sampling.
fn never_tempt() -> FixedRng {
    FixedRng(1 << 63)
}

/// Picks an atomic number different from `avoid`.
fn wrong_answer_for(avoid: u32) -> u32 {
    if avoid == 1 { 2 } else { 1 }
}

#[test]
fn full_round_visits_every_element_exactly_once() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);

    let mut seen = Vec::new();
    loop {
        let element = session
            .current_element()
            .expect("a question must be pending while the round runs");
        seen.push(element.number);
        match session.submit_answer(element.number) {
            Some(Outcome::Tempted) => {
                // Resubmitting the same correct answer must pass.
                assert_eq!(session.submit_answer(element.number), Some(Outcome::Correct));
            }
            Some(Outcome::Correct) => {}
            other => panic!("correct answer produced {:?}", other),
        }
        match session.advance(&mut rng) {
            Step::Question(_) => {}
            Step::Finished => break,
        }
    }

    assert_eq!(seen.len(), QUESTION_COUNT);
    let unique: HashSet<u32> = seen.iter().copied().collect();
    assert_eq!(unique.len(), QUESTION_COUNT, "an element repeated within the round");
    for number in 1..=QUESTION_COUNT as u32 {
        assert!(unique.contains(&number), "element {} never asked", number);
    }

    let summary = session.finish(83_450.0);
    assert_eq!(summary.time, "01:23.45");
    assert!(summary.missed.is_empty());
    assert!(!session.is_playing());
    assert_eq!(session.submit_answer(1), None, "submissions after finish must be dropped");
}

#[test]
fn temptation_soft_rejects_then_accepts() {
    let mut rng = always_tempt();
    let mut session = Session::start(QuizMode::BySymbol, InputMode::Selector, 0.0, &mut rng);
    let element = session.current_element().unwrap();

    assert_eq!(session.submit_answer(element.number), Some(Outcome::Tempted));
    assert_eq!(session.current_index(), 0, "a tempted answer must not advance");
    assert!(session.missed().is_empty(), "a tempted answer is not a miss");
    assert_eq!(session.submit_answer(element.number), Some(Outcome::Correct));
    assert_eq!(session.current_index(), 1);
}

#[test]
fn temptation_fires_once_even_across_interleaved_misses() {
    let mut rng = always_tempt();
    let mut session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);
    let element = session.current_element().unwrap();
    let wrong = wrong_answer_for(element.number);

    assert_eq!(session.submit_answer(element.number), Some(Outcome::Tempted));
    assert_eq!(session.submit_answer(wrong), Some(Outcome::Incorrect));
    // The temptation is already spent; the next correct answer passes.
    assert_eq!(session.submit_answer(element.number), Some(Outcome::Correct));
    assert_eq!(session.missed(), [element.symbol]);
}

#[test]
fn unarmed_question_accepts_the_first_correct_answer() {
    let mut rng = never_tempt();
    let mut session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);
    let element = session.current_element().unwrap();

    assert_eq!(session.submit_answer(element.number), Some(Outcome::Correct));
    assert_eq!(session.current_index(), 1);
}

#[test]
fn repeated_misses_record_one_entry_in_first_miss_order() {
    let mut rng = never_tempt();
    let mut session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);

    let first = session.current_element().unwrap();
    let wrong = wrong_answer_for(first.number);
    assert_eq!(session.submit_answer(wrong), Some(Outcome::Incorrect));
    assert_eq!(session.submit_answer(wrong), Some(Outcome::Incorrect));
    assert_eq!(session.submit_answer(wrong), Some(Outcome::Incorrect));
    assert_eq!(session.missed(), [first.symbol], "one entry per missed element");
    assert_eq!(session.current_index(), 0, "misses must not advance the round");

    assert_eq!(session.submit_answer(first.number), Some(Outcome::Correct));
    let _ = session.advance(&mut rng);

    let second = session.current_element().unwrap();
    assert_eq!(session.submit_answer(wrong_answer_for(second.number)), Some(Outcome::Incorrect));
    assert_eq!(session.missed(), [first.symbol, second.symbol], "misses keep first-miss order");
}

#[test]
fn answers_between_verdict_and_next_question_target_the_upcoming_element() {
    let mut rng = never_tempt();
    let mut session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);

    let first = session.current_element().unwrap();
    assert_eq!(session.submit_answer(first.number), Some(Outcome::Correct));
    // The index has already moved even though the next prompt is not loaded
    // yet; a submission landing in that window is judged against the new
    // element, not the one still on screen.
    let upcoming = session.current_element().unwrap();
    assert_ne!(upcoming.number, first.number);
    assert_eq!(session.submit_answer(upcoming.number), Some(Outcome::Correct));
    assert_eq!(session.current_index(), 2);
}

#[test]
fn submissions_with_no_pending_question_are_dropped() {
    let mut rng = never_tempt();
    let mut session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);

    for _ in 0..QUESTION_COUNT {
        let element = session.current_element().unwrap();
        assert_eq!(session.submit_answer(element.number), Some(Outcome::Correct));
    }
    // Every question answered, finish step still pending: nothing to judge.
    assert!(session.is_playing());
    assert_eq!(session.current_element(), None);
    assert_eq!(session.submit_answer(20), None);
    assert!(session.missed().is_empty(), "dropped submissions must not record misses");

    assert_eq!(session.advance(&mut rng), Step::Finished);
    let summary = session.finish(1_000.0);
    assert_eq!(summary.time, "00:01.00");
    assert_eq!(session.submit_answer(1), None);
}

#[test]
fn prompt_tracks_quiz_mode() {
    let mut rng = never_tempt();

    let session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);
    let element = session.current_element().unwrap();
    assert_eq!(session.prompt(), Some(Prompt::Name(element.name)));

    let session = Session::start(QuizMode::BySymbol, InputMode::Handwriting, 0.0, &mut rng);
    let element = session.current_element().unwrap();
    assert_eq!(session.prompt(), Some(Prompt::Symbol(element.symbol)));
    assert_eq!(session.input_mode(), InputMode::Handwriting);

    let session = Session::start(QuizMode::ByAtomicNumber, InputMode::Selector, 0.0, &mut rng);
    let element = session.current_element().unwrap();
    assert_eq!(session.prompt(), Some(Prompt::ProtonCount(element.number)));
    assert_eq!(session.mode(), QuizMode::ByAtomicNumber);
}

#[test]
fn fresh_round_state_is_clean() {
    let mut rng = StdRng::seed_from_u64(42);
    let session = Session::start(QuizMode::ByName, InputMode::Selector, 500.0, &mut rng);

    assert!(session.is_playing());
    assert_eq!(session.current_index(), 0);
    assert!(session.missed().is_empty());
    assert_eq!(session.progress(), 0.0);
    assert_eq!(session.elapsed_ms(1_500.0), 1_000.0);
}

#[test]
fn progress_tracks_answered_questions() {
    let mut rng = never_tempt();
    let mut session = Session::start(QuizMode::ByName, InputMode::Selector, 0.0, &mut rng);

    for answered in 0..5 {
        assert!((session.progress() - answered as f32 / 20.0).abs() < f32::EPSILON);
        let element = session.current_element().unwrap();
        session.submit_answer(element.number);
        let _ = session.advance(&mut rng);
    }
    assert!((session.progress() - 0.25).abs() < f32::EPSILON);
}

#[test]
fn elapsed_formatting_is_fixed_width() {
    assert_eq!(format_elapsed(0.0), "00:00.00");
    assert_eq!(format_elapsed(1_234.0), "00:01.23");
    assert_eq!(format_elapsed(59_999.0), "00:59.99");
    assert_eq!(format_elapsed(90_000.0), "01:30.00");
    assert_eq!(format_elapsed(3_600_000.0), "60:00.00", "minute field keeps counting");
    assert_eq!(format_elapsed(-5.0), "00:00.00", "negative clock skew clamps to zero");
}

#[test]
fn best_time_comparison_is_lexicographic() {
    assert!(improves_best("01:15.42", None));
    assert!(improves_best("01:15.42", Some("01:30.00")));
    assert!(!improves_best("01:30.00", Some("01:15.42")));
    assert!(!improves_best("01:15.42", Some("01:15.42")), "a tie does not improve");
    assert!(improves_best("00:59.99", Some("01:00.00")));
}
