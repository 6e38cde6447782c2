//! Round state machine: shuffled question order, answer verdicts, temptation
//! rolls, miss tracking and elapsed-time bookkeeping. Pure logic — the browser
//! shell injects clock readings (`performance.now()`) and an RNG, so a round
//! can be driven entirely off-target in native tests.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::{self, Element};

/// Questions per round: the whole catalog, each element exactly once.
pub const QUESTION_COUNT: usize = catalog::ELEMENTS.len();

/// Chance that a question arms a temptation, which soft-rejects the first
/// correct answer and only accepts it on resubmission.
pub const TEMPTATION_PROBABILITY: f64 = 0.2;

/// Pause between a correct verdict and loading the next question. The shell
/// owns the timer; the constant lives here with the rest of the tuning.
pub const ADVANCE_DELAY_MS: i32 = 500;

// --- Round configuration ------------------------------------------------------

/// Which element field the prompt shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizMode {
    ByName,
    BySymbol,
    ByAtomicNumber,
}

/// Which answer surface the player picked on the start screen. Purely
/// presentational: answers are validated identically wherever they come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Selector,
    Handwriting,
}

// --- Per-question signals -----------------------------------------------------

/// What the shell renders for the current question.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prompt {
    Name(&'static str),
    Symbol(&'static str),
    ProtonCount(u32),
}

/// Verdict for one submitted answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    /// Correct answer soft-rejected by an armed temptation. Not a miss; the
    /// same answer passes when resubmitted.
    Tempted,
    Incorrect,
}

/// What comes after the post-answer pause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Question(Prompt),
    Finished,
}

/// End-of-round report: formatted final time plus the elements missed at
/// least once, in first-miss order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundSummary {
    pub time: String,
    pub missed: Vec<&'static str>,
}

// --- The round itself ---------------------------------------------------------

/// One quiz round. Built by [`Session::start`], driven by `submit_answer` and
/// `advance`, closed by `finish`.
pub struct Session {
    mode: QuizMode,
    input: InputMode,
    playing: bool,
    started_ms: f64,
    /// Permutation of catalog indices; the round walks it front to back.
    order: [usize; QUESTION_COUNT],
    /// Position in `order`. `QUESTION_COUNT` means every question is answered
    /// and only the finish step remains.
    current: usize,
    missed: Vec<&'static str>,
    temptation_armed: bool,
    temptation_spent: bool,
}

impl Session {
    /// Starts a fresh round: shuffled order, cleared misses, clock anchored at
    /// `now_ms`, first question loaded (with its own temptation roll).
    pub fn start(mode: QuizMode, input: InputMode, now_ms: f64, rng: &mut impl Rng) -> Self {
        let mut order: [usize; QUESTION_COUNT] = std::array::from_fn(|i| i);
        order.shuffle(rng);
        let mut session = Self {
            mode,
            input,
            playing: true,
            started_ms: now_ms,
            order,
            current: 0,
            missed: Vec::new(),
            temptation_armed: false,
            temptation_spent: false,
        };
        session.load_question(rng);
        session
    }

    fn load_question(&mut self, rng: &mut impl Rng) {
        self.temptation_armed = rng.gen_bool(TEMPTATION_PROBABILITY);
        self.temptation_spent = false;
    }

    /// Judges a submitted atomic number against the current question.
    ///
    /// Returns `None` when the round is over or no question is pending (the
    /// window between the final correct answer and the finish step); such
    /// submissions are dropped without side effects.
    pub fn submit_answer(&mut self, candidate: u32) -> Option<Outcome> {
        if !self.playing {
            return None;
        }
        let element = self.current_element()?;
        if candidate != element.number {
            if !self.missed.contains(&element.symbol) {
                self.missed.push(element.symbol);
            }
            return Some(Outcome::Incorrect);
        }
        if self.temptation_armed && !self.temptation_spent {
            self.temptation_spent = true;
            return Some(Outcome::Tempted);
        }
        // The index moves immediately; the next prompt appears only once the
        // shell's delay elapses and `advance` runs.
        self.current += 1;
        Some(Outcome::Correct)
    }

    /// Loads the question at the current index, rolling a fresh temptation,
    /// or reports the round complete. Called once the post-answer pause ends.
    pub fn advance(&mut self, rng: &mut impl Rng) -> Step {
        if self.current >= QUESTION_COUNT {
            return Step::Finished;
        }
        self.load_question(rng);
        match self.prompt() {
            Some(prompt) => Step::Question(prompt),
            None => Step::Finished,
        }
    }

    /// Ends the round. The formatted time and ordered miss list reported here
    /// are the authoritative ones.
    pub fn finish(&mut self, now_ms: f64) -> RoundSummary {
        self.playing = false;
        RoundSummary {
            time: format_elapsed(self.elapsed_ms(now_ms)),
            missed: self.missed.clone(),
        }
    }

    // --- Read accessors for the shell ----------------------------------------

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn input_mode(&self) -> InputMode {
        self.input
    }

    /// Element behind the current question; `None` once all are answered.
    pub fn current_element(&self) -> Option<&'static Element> {
        self.order.get(self.current).map(|&idx| &catalog::ELEMENTS[idx])
    }

    /// Prompt for the current question under the round's quiz mode.
    pub fn prompt(&self) -> Option<Prompt> {
        self.current_element().map(|element| match self.mode {
            QuizMode::ByName => Prompt::Name(element.name),
            QuizMode::BySymbol => Prompt::Symbol(element.symbol),
            QuizMode::ByAtomicNumber => Prompt::ProtonCount(element.number),
        })
    }

    /// Questions answered so far, which is also the pending question's index.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Completed fraction of the round, 0.0 ..= 1.0.
    pub fn progress(&self) -> f32 {
        self.current as f32 / QUESTION_COUNT as f32
    }

    pub fn elapsed_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.started_ms
    }

    /// Symbols answered wrong at least once, in first-miss order.
    pub fn missed(&self) -> &[&'static str] {
        &self.missed
    }
}

// --- Timing helpers -----------------------------------------------------------

/// Formats a duration as `mm:ss.cc` (centisecond resolution), every field
/// zero-padded to two digits. The minute field keeps counting past 59.
pub fn format_elapsed(elapsed_ms: f64) -> String {
    let total = elapsed_ms.max(0.0) as u64;
    let mins = total / 60_000;
    let secs = (total % 60_000) / 1_000;
    let centis = (total % 1_000) / 10;
    format!("{mins:02}:{secs:02}.{centis:02}")
}

/// Whether `candidate` beats the stored best. Plain lexicographic comparison,
/// which is ordering-correct for [`format_elapsed`] strings as long as the
/// minute field stays two digits wide.
pub fn improves_best(candidate: &str, best: Option<&str>) -> bool {
    match best {
        None => true,
        Some(best) => candidate < best,
    }
}
