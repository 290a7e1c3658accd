//! Rosco: one timed pass around the Spanish alphabet.
//!
//! Each letter with at least one eligible word gets a single clue. Answers
//! within one edit of the word are accepted. Passing leaves the clue pending
//! so it comes around again. Time is passed in explicitly, which keeps the
//! session deterministic under test.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;

use crate::models::WordEntry;

pub const SPANISH_ALPHABET: [char; 27] = [
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'Ñ', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z',
];

/// Largest edit distance still accepted as a correct answer.
pub const TYPO_TOLERANCE: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemStatus {
    Pending,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoscoItem {
    pub id: String,
    pub letter: String,
    pub word: String,
    pub definition: String,
    pub rule: String,
    pub status: ItemStatus,
}

impl RoscoItem {
    fn from_entry(entry: &WordEntry) -> Self {
        Self {
            id: entry.id.clone(),
            letter: entry.letter.clone(),
            word: entry.word.clone(),
            definition: entry.definition.clone(),
            rule: entry.rule.clone(),
            status: ItemStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Complete,
    NoWords,
}

impl FinishReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::NoWords => "no-words",
        }
    }
}

/// Presentation delays between an action and the next clue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoscoTiming {
    pub correct_delay: Duration,
    pub wrong_delay: Duration,
    pub pass_delay: Duration,
    pub pass_finish_delay: Duration,
}

impl Default for RoscoTiming {
    fn default() -> Self {
        Self {
            correct_delay: Duration::from_millis(600),
            wrong_delay: Duration::from_millis(2000),
            pass_delay: Duration::from_millis(200),
            pass_finish_delay: Duration::from_millis(400),
        }
    }
}

/// Once-per-second elapsed counter. `stop` is idempotent.
#[derive(Debug, Default)]
pub struct SessionTimer {
    running_since: Option<Instant>,
    counted: u64,
}

impl SessionTimer {
    pub fn start(&mut self, now: Instant) {
        self.running_since = Some(now);
        self.counted = 0;
    }

    pub fn stop(&mut self) {
        self.running_since = None;
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Whole seconds that ticked since the previous poll.
    pub fn poll(&mut self, now: Instant) -> u32 {
        let Some(since) = self.running_since else {
            return 0;
        };
        let total = now.saturating_duration_since(since).as_secs();
        let fresh = total.saturating_sub(self.counted);
        self.counted = total.max(self.counted);
        fresh as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Advance {
    ShowNext,
    Finish(FinishReason),
}

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    due: Instant,
    then: Advance,
}

/// Result of a submitted answer, for feedback display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub letter: String,
    pub expected: String,
    pub accepted: bool,
}

/// One position on the letter wheel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelSlot {
    pub letter: String,
    pub status: ItemStatus,
    pub active: bool,
}

/// Final tally of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoscoSummary {
    pub total: usize,
    pub correct: usize,
    pub wrong: usize,
    /// Items never answered.
    pub pending: usize,
    /// Times "pasapalabra" was used; one item can be passed many times.
    pub passes: u32,
    pub seconds: u32,
}

impl RoscoSummary {
    pub fn is_perfect(&self) -> bool {
        self.total > 0 && self.correct == self.total
    }
}

pub struct RoscoSession {
    items: Vec<RoscoItem>,
    current: usize,
    seconds_elapsed: u32,
    correct_count: u32,
    wrong_count: u32,
    skipped_count: u32,
    finished: Option<FinishReason>,
    timer: SessionTimer,
    pending: Option<PendingAdvance>,
    timing: RoscoTiming,
}

impl RoscoSession {
    /// Sample one word per letter and start the clock.
    pub fn start<R: Rng + ?Sized>(
        catalog: &[WordEntry],
        excluded: &HashSet<String>,
        timing: RoscoTiming,
        rng: &mut R,
        now: Instant,
    ) -> Self {
        let items = SPANISH_ALPHABET
            .iter()
            .filter_map(|letter| {
                let letter = letter.to_string();
                let pool: Vec<&WordEntry> = catalog
                    .iter()
                    .filter(|w| w.letter == letter && !excluded.contains(&w.id))
                    .collect();
                pool.choose(rng).map(|entry| RoscoItem::from_entry(entry))
            })
            .collect();

        Self::from_items(items, timing, now)
    }

    pub fn from_items(items: Vec<RoscoItem>, timing: RoscoTiming, now: Instant) -> Self {
        let mut session = Self {
            items,
            current: 0,
            seconds_elapsed: 0,
            correct_count: 0,
            wrong_count: 0,
            skipped_count: 0,
            finished: None,
            timer: SessionTimer::default(),
            pending: None,
            timing,
        };

        if session.items.is_empty() {
            session.finish(FinishReason::NoWords);
        } else {
            info!(letters = session.items.len(), "rosco started");
            session.timer.start(now);
            session.advance_to_next_pending();
        }
        session
    }

    pub fn items(&self) -> &[RoscoItem] {
        &self.items
    }

    /// The clue on screen, if the session is still running.
    pub fn current_item(&self) -> Option<&RoscoItem> {
        if self.finished.is_some() {
            return None;
        }
        self.items.get(self.current)
    }

    pub fn seconds_elapsed(&self) -> u32 {
        self.seconds_elapsed
    }

    pub fn correct_count(&self) -> u32 {
        self.correct_count
    }

    pub fn wrong_count(&self) -> u32 {
        self.wrong_count
    }

    pub fn skipped_count(&self) -> u32 {
        self.skipped_count
    }

    pub fn is_finished(&self) -> bool {
        self.finished.is_some()
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finished
    }

    /// True while feedback is showing and input is ignored.
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.status == ItemStatus::Pending)
            .count()
    }

    /// Judge an answer for the current clue.
    ///
    /// Ignored (returns `None`) once finished, while feedback is showing, or
    /// for blank input.
    pub fn submit_answer(&mut self, raw: &str, now: Instant) -> Option<AnswerOutcome> {
        if self.finished.is_some() || self.pending.is_some() {
            return None;
        }
        let answer = raw.trim().to_uppercase();
        if answer.is_empty() {
            return None;
        }

        let idx = self.current;
        let item = self.items.get_mut(idx)?;
        if item.status != ItemStatus::Pending {
            return None;
        }

        let expected = item.word.to_uppercase();
        let accepted = is_near_match(&answer, &expected);
        if accepted {
            item.status = ItemStatus::Correct;
            self.correct_count += 1;
        } else {
            item.status = ItemStatus::Wrong;
            self.wrong_count += 1;
        }
        let outcome = AnswerOutcome {
            letter: item.letter.clone(),
            expected: item.word.clone(),
            accepted,
        };

        let delay = if accepted {
            self.timing.correct_delay
        } else {
            self.timing.wrong_delay
        };

        if self.pending_count() == 0 {
            self.schedule(now + delay, Advance::Finish(FinishReason::Complete));
        } else {
            self.current = (idx + 1) % self.items.len();
            self.schedule(now + delay, Advance::ShowNext);
        }

        Some(outcome)
    }

    /// Pasapalabra: leave the clue pending and move on.
    pub fn skip(&mut self, now: Instant) -> bool {
        if self.finished.is_some() || self.pending.is_some() {
            return false;
        }
        self.skipped_count += 1;

        if self.pending_count() == 0 {
            self.schedule(
                now + self.timing.pass_finish_delay,
                Advance::Finish(FinishReason::Complete),
            );
            return true;
        }

        let len = self.items.len();
        let mut attempts = 0;
        loop {
            self.current = (self.current + 1) % len;
            attempts += 1;
            if self.items[self.current].status == ItemStatus::Pending || attempts >= len {
                break;
            }
        }

        self.schedule(now + self.timing.pass_delay, Advance::ShowNext);
        true
    }

    /// Advance the clock and run any delayed step that is due.
    ///
    /// Returns the reason when this call ended the session.
    pub fn poll(&mut self, now: Instant) -> Option<FinishReason> {
        if self.timer.is_running() {
            self.seconds_elapsed += self.timer.poll(now);
        }

        let pending = self.pending?;
        if now < pending.due {
            return None;
        }
        self.pending = None;

        match pending.then {
            Advance::ShowNext => self.advance_to_next_pending(),
            Advance::Finish(reason) => self.finish(reason),
        }
        self.finished
    }

    pub fn wheel(&self) -> Vec<WheelSlot> {
        let running = self.finished.is_none();
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| WheelSlot {
                letter: item.letter.clone(),
                status: item.status,
                active: running && i == self.current,
            })
            .collect()
    }

    pub fn summary(&self) -> RoscoSummary {
        let by_status =
            |status: ItemStatus| self.items.iter().filter(|item| item.status == status).count();
        RoscoSummary {
            total: self.items.len(),
            correct: by_status(ItemStatus::Correct),
            wrong: by_status(ItemStatus::Wrong),
            pending: by_status(ItemStatus::Pending),
            passes: self.skipped_count,
            seconds: self.seconds_elapsed,
        }
    }

    fn schedule(&mut self, due: Instant, then: Advance) {
        self.pending = Some(PendingAdvance { due, then });
    }

    fn advance_to_next_pending(&mut self) {
        let len = self.items.len();
        if len == 0 {
            self.finish(FinishReason::NoWords);
            return;
        }

        let mut attempts = 0;
        while self.items[self.current].status != ItemStatus::Pending && attempts < len {
            self.current = (self.current + 1) % len;
            attempts += 1;
        }

        if self.items[self.current].status != ItemStatus::Pending {
            self.finish(FinishReason::Complete);
        }
    }

    fn finish(&mut self, reason: FinishReason) {
        if self.finished.is_some() {
            return;
        }
        self.finished = Some(reason);
        self.pending = None;
        self.timer.stop();
        info!(
            reason = reason.as_str(),
            correct = self.correct_count,
            wrong = self.wrong_count,
            passes = self.skipped_count,
            seconds = self.seconds_elapsed,
            "rosco finished"
        );
    }
}

/// Equal, or within [`TYPO_TOLERANCE`] edits.
pub fn is_near_match(answer: &str, expected: &str) -> bool {
    answer == expected || levenshtein(answer, expected) <= TYPO_TOLERANCE
}

/// Edit distance over Unicode scalar values.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut row = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            row[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(row[j])
            };
        }
        std::mem::swap(&mut prev, &mut row);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const WORDS: [&str; 27] = [
        "ABEJA", "BARCO", "CASA", "DEDO", "ELEFANTE", "FUEGO", "GATO", "HIELO", "ISLA", "JIRAFA",
        "KIWI", "LUNA", "MESA", "NUBE", "ÑANDÚ", "OSO", "PERRO", "QUESO", "RATÓN", "SOL", "TREN",
        "UVA", "VACA", "WIFI", "XILÓFONO", "YATE", "ZAPATO",
    ];

    fn entry(id: usize, letter: char, word: &str) -> WordEntry {
        WordEntry {
            id: format!("word_{}", id),
            letter: letter.to_string(),
            word: word.to_string(),
            definition: format!("Definición de {}", word.to_lowercase()),
            rule: "Empieza por".to_string(),
        }
    }

    fn full_catalog() -> Vec<WordEntry> {
        SPANISH_ALPHABET
            .iter()
            .zip(WORDS.iter())
            .enumerate()
            .map(|(i, (&letter, word))| entry(i, letter, word))
            .collect()
    }

    fn start(catalog: &[WordEntry], now: Instant) -> RoscoSession {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        RoscoSession::start(catalog, &HashSet::new(), RoscoTiming::default(), &mut rng, now)
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn levenshtein_counts_edits() {
        assert_eq!(levenshtein("", "ABC"), 3);
        assert_eq!(levenshtein("KITTEN", "SITTING"), 3);
        assert_eq!(levenshtein("CASA", "CASA"), 0);
        assert_eq!(levenshtein("ÑANDU", "NANDU"), 1);
        assert_eq!(levenshtein("RATON", "RATÓN"), 1);
    }

    #[test]
    fn full_alphabet_all_correct_scores_27() {
        let mut now = Instant::now();
        let mut session = start(&full_catalog(), now);
        assert_eq!(session.items().len(), 27);

        let mut reason = None;
        for _ in 0..27 {
            let word = session.current_item().unwrap().word.to_lowercase();
            let outcome = session.submit_answer(&word, now).unwrap();
            assert!(outcome.accepted);
            now += ms(700);
            reason = session.poll(now);
        }

        assert_eq!(reason, Some(FinishReason::Complete));
        let summary = session.summary();
        assert_eq!(summary.correct, 27);
        assert_eq!(summary.wrong, 0);
        assert_eq!(summary.pending, 0);
        assert!(summary.is_perfect());
        assert_eq!(session.correct_count(), 27);
    }

    #[test]
    fn answers_within_one_edit_are_accepted() {
        let now = Instant::now();
        let catalog = vec![entry(0, 'C', "CASA"), entry(1, 'D', "DEDO"), entry(2, 'G', "GATO")];
        let mut session = start(&catalog, now);

        // Exact, case-insensitive.
        assert!(session.submit_answer("  casa ", now).unwrap().accepted);
        session.poll(now + ms(600));
        // One substitution.
        assert!(session.submit_answer("dado", now + ms(600)).unwrap().accepted);
        session.poll(now + ms(1200));
        // Two substitutions.
        let outcome = session.submit_answer("pito", now + ms(1200)).unwrap();
        assert!(!outcome.accepted);
        assert_eq!(outcome.expected, "GATO");

        let statuses: Vec<ItemStatus> = session.items().iter().map(|i| i.status).collect();
        assert_eq!(
            statuses,
            vec![ItemStatus::Correct, ItemStatus::Correct, ItemStatus::Wrong]
        );
        assert_eq!(session.wrong_count(), 1);
    }

    #[test]
    fn letters_without_words_are_omitted() {
        let catalog: Vec<WordEntry> = full_catalog()
            .into_iter()
            .filter(|w| w.letter != "Ñ" && w.letter != "W")
            .collect();
        let session = start(&catalog, Instant::now());
        assert_eq!(session.items().len(), 25);
        assert!(session.items().iter().all(|i| i.letter != "Ñ" && i.letter != "W"));
        assert_eq!(session.items()[0].letter, "A");
    }

    #[test]
    fn excluded_words_are_never_sampled() {
        let catalog = vec![entry(0, 'A', "ABEJA"), entry(1, 'A', "ÁRBOL"), entry(2, 'B', "BARCO")];
        let excluded: HashSet<String> = ["word_0".to_string(), "word_2".to_string()].into();
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let session =
                RoscoSession::start(&catalog, &excluded, RoscoTiming::default(), &mut rng, Instant::now());
            assert_eq!(session.items().len(), 1);
            assert_eq!(session.items()[0].id, "word_1");
        }
    }

    #[test]
    fn empty_session_finishes_with_no_words() {
        let session = start(&[], Instant::now());
        assert_eq!(session.finish_reason(), Some(FinishReason::NoWords));
        assert!(session.current_item().is_none());
        assert!(!session.timer.is_running());
    }

    #[test]
    fn blank_input_is_ignored() {
        let now = Instant::now();
        let mut session = start(&full_catalog(), now);
        assert!(session.submit_answer("   ", now).is_none());
        assert_eq!(session.pending_count(), 27);
        assert!(!session.is_busy());
    }

    #[test]
    fn input_is_ignored_while_feedback_shows() {
        let now = Instant::now();
        let mut session = start(&full_catalog(), now);

        assert!(session.submit_answer("abeja", now).is_some());
        assert!(session.is_busy());
        assert!(session.submit_answer("barco", now + ms(100)).is_none());
        assert!(!session.skip(now + ms(100)));
        assert_eq!(session.skipped_count(), 0);

        session.poll(now + ms(600));
        assert!(!session.is_busy());
        assert_eq!(session.current_item().unwrap().letter, "B");
    }

    #[test]
    fn wrong_answers_hold_feedback_longer() {
        let now = Instant::now();
        let mut session = start(&full_catalog(), now);

        session.submit_answer("nada", now).unwrap();
        session.poll(now + ms(600));
        assert!(session.is_busy());
        session.poll(now + ms(2000));
        assert!(!session.is_busy());
    }

    #[test]
    fn skipping_keeps_item_pending_and_moves_on() {
        let now = Instant::now();
        let mut session = start(&full_catalog(), now);

        assert!(session.skip(now));
        assert_eq!(session.items()[0].status, ItemStatus::Pending);
        assert_eq!(session.current, 1);
        assert_eq!(session.skipped_count(), 1);
        assert!(session.submit_answer("barco", now + ms(100)).is_none());
        session.poll(now + ms(200));
        assert_eq!(session.current_item().unwrap().letter, "B");
    }

    #[test]
    fn skip_jumps_over_answered_items() {
        let now = Instant::now();
        let catalog = vec![entry(0, 'A', "ABEJA"), entry(1, 'B', "BARCO"), entry(2, 'C', "CASA")];
        let mut session = start(&catalog, now);

        session.submit_answer("xx", now).unwrap();
        session.poll(now + ms(2000));
        session.submit_answer("barco", now + ms(2000)).unwrap();
        session.poll(now + ms(2600));
        assert_eq!(session.current, 2);

        // Only C is pending; passing it wraps back around to itself.
        assert!(session.skip(now + ms(2600)));
        assert_eq!(session.current, 2);
        session.poll(now + ms(2800));
        assert_eq!(session.current_item().unwrap().letter, "C");
    }

    #[test]
    fn passing_the_last_pending_item_never_finishes() {
        let mut now = Instant::now();
        let catalog = vec![entry(0, 'A', "ABEJA"), entry(1, 'B', "BARCO")];
        let mut session = start(&catalog, now);

        session.submit_answer("abeja", now).unwrap();
        now += ms(600);
        session.poll(now);

        for _ in 0..5 {
            assert!(session.skip(now));
            now += ms(200);
            assert_eq!(session.poll(now), None);
            assert_eq!(session.current_item().unwrap().letter, "B");
        }
        assert_eq!(session.skipped_count(), 5);
        assert!(!session.is_finished());

        session.submit_answer("barco", now).unwrap();
        assert_eq!(session.poll(now + ms(600)), Some(FinishReason::Complete));

        let summary = session.summary();
        assert_eq!(summary.passes, 5);
        assert_eq!(summary.pending, 0);
    }

    #[test]
    fn finished_session_ignores_input() {
        let now = Instant::now();
        let mut session = start(&[entry(0, 'A', "ABEJA")], now);
        session.submit_answer("abeja", now).unwrap();
        assert_eq!(session.poll(now + ms(600)), Some(FinishReason::Complete));

        assert!(session.submit_answer("abeja", now + ms(700)).is_none());
        assert!(!session.skip(now + ms(700)));
        assert_eq!(session.poll(now + ms(800)), None);
    }

    #[test]
    fn timer_counts_whole_seconds_until_finish() {
        let now = Instant::now();
        let mut session = start(&[entry(0, 'A', "ABEJA"), entry(1, 'B', "BARCO")], now);

        session.poll(now + ms(3500));
        assert_eq!(session.seconds_elapsed(), 3);
        session.poll(now + ms(4100));
        assert_eq!(session.seconds_elapsed(), 4);

        session.submit_answer("abeja", now + ms(4100)).unwrap();
        session.poll(now + ms(4700));
        session.submit_answer("barco", now + ms(4700)).unwrap();
        session.poll(now + ms(5300));
        assert!(session.is_finished());
        assert!(!session.timer.is_running());

        let frozen = session.seconds_elapsed();
        session.poll(now + ms(60_000));
        assert_eq!(session.seconds_elapsed(), frozen);
        assert_eq!(session.summary().seconds, 5);
    }

    #[test]
    fn timer_stop_is_idempotent() {
        let now = Instant::now();
        let mut timer = SessionTimer::default();
        assert_eq!(timer.poll(now + ms(5000)), 0);
        timer.start(now);
        assert_eq!(timer.poll(now + ms(2500)), 2);
        assert_eq!(timer.poll(now + ms(2900)), 0);
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(timer.poll(now + ms(9000)), 0);
    }

    #[test]
    fn wheel_marks_active_and_answered_letters() {
        let now = Instant::now();
        let mut session = start(&[entry(0, 'A', "ABEJA"), entry(1, 'B', "BARCO")], now);
        session.submit_answer("oso", now).unwrap();
        session.poll(now + ms(2000));

        let wheel = session.wheel();
        assert_eq!(wheel[0].status, ItemStatus::Wrong);
        assert!(!wheel[0].active);
        assert_eq!(wheel[1].status, ItemStatus::Pending);
        assert!(wheel[1].active);

        session.submit_answer("barco", now + ms(2000)).unwrap();
        session.poll(now + ms(2600));
        assert!(session.wheel().iter().all(|slot| !slot.active));
    }
}
