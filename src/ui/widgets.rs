//! Custom widgets for the pasapalabra TUI.

use std::f64::consts::PI;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::{icons, Theme};
use crate::models::{AnswerRating, ProgressStats, RoscoBest, RuleKind, WordEntry};
use crate::rosco::{RoscoSummary, WheelSlot};

/// `m:ss`
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

// ══════════════════════════════════════════════════════════════════════════
// Logo Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Logo;

impl Logo {
    const ART: &'static str = r#"
  ╭──────────────────────────────────────────╮
  │                                          │
  │   ╔═╗╔═╗╔═╗╔═╗╔═╗╔═╗╦  ╔═╗╔╗ ╦═╗╔═╗      │
  │   ╠═╝╠═╣╚═╗╠═╣╠═╝╠═╣║  ╠═╣╠╩╗╠╦╝╠═╣      │
  │   ╩  ╩ ╩╚═╝╩ ╩╩  ╩ ╩╩═╝╩ ╩╚═╝╩╚═╩ ╩      │
  │       A · B · C · ... · Ñ · ... · Z      │
  ╰──────────────────────────────────────────╯"#;

    pub fn render_to(theme: &Theme, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = Self::ART
            .lines()
            .skip(1)
            .map(|line| Line::from(Span::styled(line, Style::default().fg(theme.colors.primary))))
            .collect();

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Stats Bar Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct StatsBar<'a> {
    stats: ProgressStats,
    theme: &'a Theme,
}

impl<'a> StatsBar<'a> {
    pub fn new(stats: ProgressStats, theme: &'a Theme) -> Self {
        Self { stats, theme }
    }
}

impl Widget for StatsBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Percentage(30),
        ])
        .split(area);

        let learned_text = Line::from(vec![
            Span::styled("● ", self.theme.stats_learned()),
            Span::styled("Learned: ", Style::default().fg(self.theme.colors.text_muted)),
            Span::styled(self.stats.learned.to_string(), self.theme.stats_learned()),
        ]);
        Paragraph::new(learned_text)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let learning_text = Line::from(vec![
            Span::styled("● ", self.theme.stats_learning()),
            Span::styled("In progress: ", Style::default().fg(self.theme.colors.text_muted)),
            Span::styled(self.stats.in_progress.to_string(), self.theme.stats_learning()),
        ]);
        Paragraph::new(learning_text)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let total_text = Line::from(vec![
            Span::styled("Words: ", Style::default().fg(self.theme.colors.text_muted)),
            Span::styled(
                self.stats.total_words.to_string(),
                Style::default().fg(self.theme.colors.text_dim),
            ),
        ]);
        Paragraph::new(total_text)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        // Learned ratio as a small bar
        let ratio = self.stats.learned_ratio();
        let width = chunks[3].width.saturating_sub(6).min(20) as usize;
        let filled = (ratio * width as f64).round() as usize;
        let bar = Line::from(vec![
            Span::styled("█".repeat(filled), self.theme.stats_learned()),
            Span::styled(
                "░".repeat(width - filled),
                Style::default().fg(self.theme.colors.text_dim),
            ),
            Span::styled(
                format!(" {:>3.0}%", ratio * 100.0),
                Style::default().fg(self.theme.colors.text_muted),
            ),
        ]);
        Paragraph::new(bar)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Flashcard Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct FlashcardWidget<'a> {
    word: &'a WordEntry,
    content: &'a str,
    is_front: bool,
    theme: &'a Theme,
}

impl<'a> FlashcardWidget<'a> {
    pub fn new(word: &'a WordEntry, content: &'a str, is_front: bool, theme: &'a Theme) -> Self {
        Self { word, content, is_front, theme }
    }
}

impl Widget for FlashcardWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label, label_style, border_style) = if self.is_front {
            ("QUESTION", self.theme.card_front(), Style::default().fg(self.theme.colors.accent))
        } else {
            ("ANSWER", self.theme.card_back(), Style::default().fg(self.theme.colors.success))
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(label, label_style),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        // Letter badge and rule on the first row
        let mut header = Vec::new();
        if !self.word.letter.is_empty() {
            header.push(Span::styled(format!(" {} ", self.word.letter), self.theme.letter_badge()));
            header.push(Span::raw("  "));
        }
        header.push(Span::styled(
            self.word.rule.as_str(),
            self.theme.rule(self.word.rule_kind()),
        ));
        Paragraph::new(Line::from(header))
            .alignment(Alignment::Center)
            .render(Rect { height: 1.min(inner.height), ..inner }, buf);

        // Content, centered vertically below the header
        let body = Rect {
            y: inner.y + 1,
            height: inner.height.saturating_sub(1),
            ..inner
        };
        let text_width = body.width.saturating_sub(4).max(1) as usize;
        let content_height = textwrap::wrap(self.content, text_width).len() as u16;
        let vertical_padding = body.height.saturating_sub(content_height) / 2;

        let content_style = if self.is_front {
            Style::default().fg(self.theme.colors.text)
        } else {
            Style::default().fg(self.theme.colors.text).add_modifier(Modifier::BOLD)
        };

        Paragraph::new(self.content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(content_style)
            .render(
                Rect {
                    x: body.x + 2,
                    y: body.y + vertical_padding,
                    width: body.width.saturating_sub(4),
                    height: body.height.saturating_sub(vertical_padding),
                },
                buf,
            );
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Answer Buttons Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct AnswerButtons<'a> {
    enabled: bool,
    theme: &'a Theme,
}

impl<'a> AnswerButtons<'a> {
    pub fn new(enabled: bool, theme: &'a Theme) -> Self {
        Self { enabled, theme }
    }
}

impl Widget for AnswerButtons<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

        for (i, rating) in AnswerRating::ALL.iter().enumerate() {
            let color = if self.enabled {
                rating.color_for_theme(self.theme)
            } else {
                self.theme.colors.text_dim
            };

            let button = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color));

            let inner = button.inner(chunks[i]);
            button.render(chunks[i], buf);

            let line = Line::from(vec![
                Span::styled(
                    (i + 1).to_string(),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(rating.name(), Style::default().fg(color)),
            ]);
            Paragraph::new(line)
                .alignment(Alignment::Center)
                .render(inner, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(*key, self.theme.key_highlight()),
                    Span::styled(format!(" {} ", desc), self.theme.key_hint()),
                    Span::styled("│ ", Style::default().fg(self.theme.colors.text_dim)),
                ]
            })
            .collect();

        Paragraph::new(Line::from(spans))
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Rosco Wheel Widget
// ══════════════════════════════════════════════════════════════════════════

/// Letters laid out on an ellipse, clockwise from the top.
pub struct RoscoWheel<'a> {
    slots: &'a [WheelSlot],
    center: Option<(&'a str, &'a str)>,
    theme: &'a Theme,
}

impl<'a> RoscoWheel<'a> {
    pub fn new(slots: &'a [WheelSlot], theme: &'a Theme) -> Self {
        Self { slots, center: None, theme }
    }

    /// Big letter and rule shown in the middle of the wheel.
    pub fn center(mut self, letter: &'a str, rule: &'a str) -> Self {
        self.center = Some((letter, rule));
        self
    }

    /// Top-left cell of each slot label inside `area`.
    pub fn positions(count: usize, area: Rect) -> Vec<(u16, u16)> {
        if count == 0 || area.width < 5 || area.height < 3 {
            return Vec::new();
        }
        let cx = area.x as f64 + area.width as f64 / 2.0;
        let cy = area.y as f64 + area.height as f64 / 2.0;
        let rx = (area.width as f64 / 2.0 - 2.5).max(0.0);
        let ry = (area.height as f64 / 2.0 - 1.0).max(0.0);

        let max_x = area.x + area.width - 3;
        let max_y = area.y + area.height - 1;
        (0..count)
            .map(|i| {
                let angle = 2.0 * PI * i as f64 / count as f64 - PI / 2.0;
                let x = (cx + rx * angle.cos() - 1.5).round().max(area.x as f64) as u16;
                let y = (cy + ry * angle.sin()).round().max(area.y as f64) as u16;
                (x.min(max_x), y.min(max_y))
            })
            .collect()
    }
}

impl Widget for RoscoWheel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let positions = Self::positions(self.slots.len(), area);
        for (slot, (x, y)) in self.slots.iter().zip(positions) {
            let label = format!(" {} ", slot.letter);
            buf.set_string(x, y, label, self.theme.wheel_slot(slot.status, slot.active));
        }

        if let Some((letter, rule)) = self.center.filter(|_| area.height >= 3 && area.width >= 3) {
            let cy = area.y + area.height / 2;
            let letter_label = format!(" {} ", letter);
            let lx = area.x + area.width.saturating_sub(letter_label.width() as u16) / 2;
            buf.set_string(lx, cy.saturating_sub(1), letter_label, self.theme.letter_badge());

            let rule_width = (rule.width() as u16).min(area.width);
            let rx = area.x + area.width.saturating_sub(rule_width) / 2;
            buf.set_stringn(rx, cy + 1, rule, rule_width as usize, self.theme.rule(RuleKind::classify(rule)));
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Scoreboard Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Scoreboard<'a> {
    total: usize,
    correct: u32,
    wrong: u32,
    passes: u32,
    seconds: u32,
    theme: &'a Theme,
}

impl<'a> Scoreboard<'a> {
    pub fn new(total: usize, correct: u32, wrong: u32, passes: u32, seconds: u32, theme: &'a Theme) -> Self {
        Self { total, correct, wrong, passes, seconds, theme }
    }
}

impl Widget for Scoreboard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let muted = Style::default().fg(self.theme.colors.text_muted);
        let line = Line::from(vec![
            Span::styled(format!("{} ", icons::CHECK), Style::default().fg(self.theme.colors.answer_correct)),
            Span::styled(self.correct.to_string(), self.theme.stats_learned()),
            Span::styled(format!("/{}", self.total), muted),
            Span::styled("   ", muted),
            Span::styled(format!("{} ", icons::CROSS), Style::default().fg(self.theme.colors.answer_wrong)),
            Span::styled(
                self.wrong.to_string(),
                Style::default().fg(self.theme.colors.answer_wrong).add_modifier(Modifier::BOLD),
            ),
            Span::styled("   ", muted),
            Span::styled(format!("{} ", icons::ARROW_RIGHT), Style::default().fg(self.theme.colors.answer_practice)),
            Span::styled(self.passes.to_string(), self.theme.stats_learning()),
            Span::styled("   ", muted),
            Span::styled(format!("{} ", icons::CLOCK), muted),
            Span::styled(format_clock(self.seconds), self.theme.title()),
        ]);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Rosco Results Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct RoscoResults<'a> {
    summary: RoscoSummary,
    best: Option<RoscoBest>,
    new_best: bool,
    theme: &'a Theme,
}

impl<'a> RoscoResults<'a> {
    pub fn new(summary: RoscoSummary, best: Option<RoscoBest>, new_best: bool, theme: &'a Theme) -> Self {
        Self { summary, best, new_best, theme }
    }
}

impl Widget for RoscoResults<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, border) = if self.summary.is_perfect() {
            (format!("{} ROSCO COMPLETE", icons::TROPHY), self.theme.colors.success)
        } else {
            ("ROSCO RESULTS".to_string(), self.theme.colors.primary)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(title, self.theme.card_back()),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let muted = Style::default().fg(self.theme.colors.text_muted);
        let value = |color| Style::default().fg(color).add_modifier(Modifier::BOLD);

        let mut text = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("Correct: ", muted),
                Span::styled(self.summary.correct.to_string(), value(self.theme.colors.answer_correct)),
                Span::styled(format!(" / {}", self.summary.total), muted),
            ]),
            Line::from(vec![
                Span::styled("Wrong: ", muted),
                Span::styled(self.summary.wrong.to_string(), value(self.theme.colors.answer_wrong)),
            ]),
            Line::from(vec![
                Span::styled("Unanswered: ", muted),
                Span::styled(self.summary.pending.to_string(), value(self.theme.colors.text_dim)),
                Span::styled(format!("  (passes: {})", self.summary.passes), muted),
            ]),
            Line::from(vec![
                Span::styled("Time: ", muted),
                Span::styled(format_clock(self.summary.seconds), value(self.theme.colors.primary)),
            ]),
            Line::from(""),
        ];

        if self.new_best {
            text.push(Line::from(Span::styled(
                format!("{} New personal best!", icons::STAR),
                value(self.theme.colors.accent),
            )));
        } else if let Some(best) = self.best {
            text.push(Line::from(vec![
                Span::styled("Personal best: ", muted),
                Span::styled(
                    format!("{} correct in {}", best.correct, format_clock(best.time)),
                    value(self.theme.colors.secondary),
                ),
            ]));
        }

        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(self.theme.colors.text_dim)),
            Span::styled("Enter", self.theme.key_highlight()),
            Span::styled(" to play again, ", Style::default().fg(self.theme.colors.text_dim)),
            Span::styled("Esc", self.theme.key_highlight()),
            Span::styled(" to return", Style::default().fg(self.theme.colors.text_dim)),
        ]));

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rosco::ItemStatus;

    #[test]
    fn clock_pads_seconds() {
        assert_eq!(format_clock(0), "0:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(600), "10:00");
    }

    #[test]
    fn wheel_positions_stay_inside_area() {
        let area = Rect::new(4, 2, 40, 16);
        let positions = RoscoWheel::positions(27, area);
        assert_eq!(positions.len(), 27);
        for (x, y) in positions {
            assert!(x >= area.x && x + 3 <= area.x + area.width);
            assert!(y >= area.y && y < area.y + area.height);
        }
        assert!(RoscoWheel::positions(27, Rect::new(0, 0, 2, 2)).is_empty());
    }

    #[test]
    fn wheel_draws_every_letter() {
        let theme = Theme::default();
        let slots: Vec<WheelSlot> = ["A", "B", "Ñ"]
            .iter()
            .enumerate()
            .map(|(i, letter)| WheelSlot {
                letter: letter.to_string(),
                status: ItemStatus::Pending,
                active: i == 0,
            })
            .collect();
        let area = Rect::new(0, 0, 30, 12);
        let mut buf = Buffer::empty(area);
        RoscoWheel::new(&slots, &theme).render(area, &mut buf);

        let drawn: String = buf.content().iter().map(|cell| cell.symbol()).collect();
        for letter in ["A", "B", "Ñ"] {
            assert!(drawn.contains(letter), "missing {}", letter);
        }
    }
}
