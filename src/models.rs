//! Data models for words, player progress and word reports.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// Rule label used when the catalog leaves it blank.
pub const DEFAULT_RULE: &str = "Empieza por";

/// Correct answers needed for a word to count as learned.
pub const LEARNED_CORRECT_THRESHOLD: u32 = 10;

/// Distinct days with a correct answer needed for a word to count as learned.
pub const LEARNED_DAYS_THRESHOLD: usize = 5;

/// A single vocabulary entry from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub id: String,
    pub letter: String,
    pub word: String,
    pub definition: String,
    pub rule: String,
}

impl WordEntry {
    pub fn rule_kind(&self) -> RuleKind {
        RuleKind::classify(&self.rule)
    }
}

/// Whether the answer starts with the letter or only contains it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    StartsWith,
    Contains,
}

impl RuleKind {
    pub fn classify(rule: &str) -> Self {
        if rule.to_lowercase().contains("contiene") {
            Self::Contains
        } else {
            Self::StartsWith
        }
    }
}

/// How the player judged their own answer on a flashcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerRating {
    Correct,
    Practice,
    Wrong,
}

impl AnswerRating {
    pub const ALL: [AnswerRating; 3] = [Self::Correct, Self::Practice, Self::Wrong];

    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Self::Correct),
            '2' => Some(Self::Practice),
            '3' => Some(Self::Wrong),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Correct => "Correct",
            Self::Practice => "Practice",
            Self::Wrong => "Wrong",
        }
    }

    pub fn color_for_theme(&self, theme: &crate::ui::theme::Theme) -> ratatui::style::Color {
        match self {
            Self::Correct => theme.colors.answer_correct,
            Self::Practice => theme.colors.answer_practice,
            Self::Wrong => theme.colors.answer_wrong,
        }
    }
}

/// Mastery level of a word.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryStatus {
    #[default]
    Learning,
    Practicing,
    Learned,
}

impl MasteryStatus {
    /// Number of copies a word gets in the shuffle pool.
    pub fn weight(&self) -> usize {
        match self {
            Self::Learning => 3,
            Self::Practicing => 2,
            Self::Learned => 1,
        }
    }
}

/// Per-word progress counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub correct_count: u32,
    #[serde(default)]
    pub days_played: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub status: MasteryStatus,
}

impl ProgressEntry {
    /// Apply a flashcard answer.
    ///
    /// A wrong answer always drops the word back to `Learning`, even if it
    /// was already learned; the correct count is kept.
    pub fn apply(&mut self, rating: AnswerRating, today: NaiveDate) {
        match rating {
            AnswerRating::Correct => {
                self.correct_count += 1;
                self.days_played.insert(today);
                self.status = if self.correct_count >= LEARNED_CORRECT_THRESHOLD
                    || self.days_played.len() >= LEARNED_DAYS_THRESHOLD
                {
                    MasteryStatus::Learned
                } else {
                    MasteryStatus::Practicing
                };
            }
            AnswerRating::Practice => self.status = MasteryStatus::Practicing,
            AnswerRating::Wrong => self.status = MasteryStatus::Learning,
        }
    }
}

/// Best rosco result: most correct answers, then fastest time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoscoBest {
    pub correct: u32,
    /// Seconds taken.
    pub time: u32,
}

impl RoscoBest {
    pub fn beats(&self, best: Option<&RoscoBest>) -> bool {
        if self.correct == 0 {
            return false;
        }
        match best {
            None => true,
            Some(best) => {
                self.correct > best.correct || (self.correct == best.correct && self.time < best.time)
            }
        }
    }
}

/// Aggregate progress for the stats bar.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProgressStats {
    pub total_words: usize,
    pub learned: usize,
    pub in_progress: usize,
}

impl ProgressStats {
    pub fn learned_ratio(&self) -> f64 {
        if self.total_words == 0 {
            return 0.0;
        }
        (self.learned as f64 / self.total_words as f64).min(1.0)
    }
}

/// Everything persisted for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default)]
    pub progress: HashMap<String, ProgressEntry>,
    #[serde(default)]
    pub rosco_best: Option<RoscoBest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Local>>,
}

impl UserData {
    /// Status of a word; words never answered are still being learned.
    pub fn status_of(&self, word_id: &str) -> MasteryStatus {
        self.progress
            .get(word_id)
            .map(|p| p.status)
            .unwrap_or_default()
    }

    pub fn record_answer(&mut self, word_id: &str, rating: AnswerRating, today: NaiveDate) -> &ProgressEntry {
        let entry = self.progress.entry(word_id.to_string()).or_default();
        entry.apply(rating, today);
        entry
    }

    /// Store a rosco result if it is a new personal best.
    pub fn record_rosco(&mut self, correct: u32, seconds: u32) -> bool {
        let candidate = RoscoBest { correct, time: seconds };
        if candidate.beats(self.rosco_best.as_ref()) {
            self.rosco_best = Some(candidate);
            true
        } else {
            false
        }
    }

    pub fn stats(&self, total_words: usize) -> ProgressStats {
        let learned = self
            .progress
            .values()
            .filter(|p| p.status == MasteryStatus::Learned)
            .count();
        ProgressStats {
            total_words,
            learned,
            in_progress: self.progress.len() - learned,
        }
    }

    pub fn reset(&mut self) {
        self.progress.clear();
        self.rosco_best = None;
    }
}

/// Moderation state of a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Pending,
    Resolved,
}

/// A player's complaint about a catalog word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub word_id: String,
    pub word: String,
    pub issue: String,
    pub reported_by: String,
    pub timestamp: DateTime<Local>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Local>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn first_correct_answer_moves_word_to_practicing() {
        let mut data = UserData::default();
        let entry = data.record_answer("word_0", AnswerRating::Correct, day(1));
        assert_eq!(entry.correct_count, 1);
        assert_eq!(entry.status, MasteryStatus::Practicing);
    }

    #[test]
    fn ten_correct_answers_mark_word_learned() {
        let mut data = UserData::default();
        for i in 1..=9 {
            let entry = data.record_answer("word_0", AnswerRating::Correct, day(1));
            assert_eq!(entry.correct_count, i);
            assert_eq!(entry.status, MasteryStatus::Practicing);
        }
        let entry = data.record_answer("word_0", AnswerRating::Correct, day(1));
        assert_eq!(entry.correct_count, 10);
        assert_eq!(entry.status, MasteryStatus::Learned);
    }

    #[test]
    fn wrong_answer_demotes_learned_word_but_keeps_count() {
        let mut data = UserData::default();
        for _ in 0..10 {
            data.record_answer("word_0", AnswerRating::Correct, day(1));
        }
        let entry = data.record_answer("word_0", AnswerRating::Wrong, day(2));
        assert_eq!(entry.status, MasteryStatus::Learning);
        assert_eq!(entry.correct_count, 10);
    }

    #[test]
    fn five_distinct_days_mark_word_learned() {
        let mut data = UserData::default();
        for d in 1..=4 {
            data.record_answer("word_0", AnswerRating::Correct, day(d));
            data.record_answer("word_0", AnswerRating::Correct, day(d));
        }
        assert_eq!(data.status_of("word_0"), MasteryStatus::Practicing);
        let entry = data.record_answer("word_0", AnswerRating::Correct, day(5));
        assert_eq!(entry.days_played.len(), 5);
        assert_eq!(entry.status, MasteryStatus::Learned);
    }

    #[test]
    fn practice_answer_only_changes_status() {
        let mut data = UserData::default();
        let entry = data.record_answer("word_3", AnswerRating::Practice, day(1));
        assert_eq!(entry.correct_count, 0);
        assert!(entry.days_played.is_empty());
        assert_eq!(entry.status, MasteryStatus::Practicing);
    }

    #[test]
    fn unseen_words_are_learning() {
        assert_eq!(UserData::default().status_of("nope"), MasteryStatus::Learning);
    }

    #[test]
    fn personal_best_requires_more_correct_or_faster_tie() {
        let best = RoscoBest { correct: 20, time: 300 };
        assert!(RoscoBest { correct: 20, time: 250 }.beats(Some(&best)));
        assert!(!RoscoBest { correct: 19, time: 100 }.beats(Some(&best)));
        assert!(!RoscoBest { correct: 20, time: 300 }.beats(Some(&best)));
        assert!(RoscoBest { correct: 21, time: 900 }.beats(Some(&best)));
    }

    #[test]
    fn zero_correct_never_sets_a_best() {
        let mut data = UserData::default();
        assert!(!data.record_rosco(0, 10));
        assert!(data.rosco_best.is_none());
        assert!(data.record_rosco(3, 10));
        assert_eq!(data.rosco_best, Some(RoscoBest { correct: 3, time: 10 }));
    }

    #[test]
    fn stats_split_learned_from_in_progress() {
        let mut data = UserData::default();
        for _ in 0..10 {
            data.record_answer("a", AnswerRating::Correct, day(1));
        }
        data.record_answer("b", AnswerRating::Wrong, day(1));
        data.record_answer("c", AnswerRating::Practice, day(1));

        let stats = data.stats(4);
        assert_eq!(stats.learned, 1);
        assert_eq!(stats.in_progress, 2);
        assert!((stats.learned_ratio() - 0.25).abs() < f64::EPSILON);
        assert_eq!(UserData::default().stats(0).learned_ratio(), 0.0);
    }

    #[test]
    fn user_data_uses_camel_case_documents() {
        let mut data = UserData::default();
        data.record_answer("word_1", AnswerRating::Correct, day(7));
        data.record_rosco(5, 42);

        let json = serde_json::to_value(&data).unwrap();
        assert_eq!(json["progress"]["word_1"]["correctCount"], 1);
        assert_eq!(json["progress"]["word_1"]["status"], "practicing");
        assert_eq!(json["progress"]["word_1"]["daysPlayed"][0], "2024-03-07");
        assert_eq!(json["roscoBest"]["time"], 42);
    }

    #[test]
    fn rule_kind_detects_contains() {
        assert_eq!(RuleKind::classify("Empieza por"), RuleKind::StartsWith);
        assert_eq!(RuleKind::classify("Contiene la"), RuleKind::Contains);
        assert_eq!(RuleKind::classify("CONTIENE"), RuleKind::Contains);
    }
}
