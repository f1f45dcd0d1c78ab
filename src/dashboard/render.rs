//! Dashboard layout as styled lines, plus painters for a raw terminal frame
//! and for plain stdout.
//!
//! Layout is built once as `Vec<Line>` and painted twice over: `paint_frame`
//! for the interactive alternate screen, `paint_lines` for `report`. With
//! colour disabled the spans are written without escape sequences.

#![allow(missing_docs)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

use std::io::{self, Write};

use chrono::NaiveDateTime;
use crossterm::cursor::MoveTo;
use crossterm::style::{Attribute, Print, ResetColor, SetAttribute, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::queue;

use super::picker::{CustomPicker, PickerStage};
use super::state::DashboardState;
use super::theme::{SemanticToken, Theme};
use crate::metrics::format::{compact_number, percent, percent_change};
use crate::metrics::{DisplayData, SeriesPoint};
use crate::range::label::{format_label, format_label_with_year, selector_label};

/// Unicode block characters for sparkline rendering (8 levels).
const SPARK_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Bars shown in the engagement chart.
const BAR_CHART_POINTS: usize = 7;

// ──────────────────── line model ────────────────────

/// A run of text with one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub token: SemanticToken,
    pub bold: bool,
}

impl Span {
    #[must_use]
    pub fn new(text: impl Into<String>, token: SemanticToken) -> Self {
        Self {
            text: text.into(),
            token,
            bold: false,
        }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text, SemanticToken::Text)
    }

    #[must_use]
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// One rendered row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub spans: Vec<Span>,
}

impl Line {
    #[must_use]
    pub fn new(spans: Vec<Span>) -> Self {
        Self { spans }
    }

    #[must_use]
    pub fn blank() -> Self {
        Self::default()
    }

    /// Text without styling.
    #[must_use]
    pub fn plain(&self) -> String {
        self.spans.iter().map(|s| s.text.as_str()).collect()
    }

    /// Display width in characters.
    #[must_use]
    pub fn width(&self) -> usize {
        self.spans.iter().map(|s| s.text.chars().count()).sum()
    }
}

// ──────────────────── primitives ────────────────────

/// Horizontal bar gauge: `[████████░░░░] 62.0%`.
#[must_use]
pub fn render_gauge(pct: f64, width: usize) -> String {
    let filled = ((pct / 100.0) * width as f64).round() as usize;
    let filled = filled.min(width);
    format!(
        "[{}{}] {}",
        "█".repeat(filled),
        "░".repeat(width - filled),
        percent(pct)
    )
}

/// Sparkline from values normalized to `0.0..=1.0`.
#[must_use]
pub fn render_sparkline(values: &[f64]) -> String {
    values
        .iter()
        .map(|v| {
            let idx = (v.clamp(0.0, 1.0) * 7.0).round() as usize;
            SPARK_CHARS[idx.min(7)]
        })
        .collect()
}

/// Scale values to `0.0..=1.0` against their maximum, averaging adjacent
/// values so at most `max_points` remain.
#[must_use]
pub fn normalize_series(values: &[f64], max_points: usize) -> Vec<f64> {
    if values.is_empty() || max_points == 0 {
        return Vec::new();
    }

    let chunk = values.len().div_ceil(max_points);
    let reduced: Vec<f64> = values
        .chunks(chunk)
        .map(|c| c.iter().sum::<f64>() / c.len() as f64)
        .collect();

    let max = reduced.iter().copied().fold(0.0f64, f64::max);
    if max <= 0.0 {
        return vec![0.0; reduced.len()];
    }
    reduced.iter().map(|v| v / max).collect()
}

fn change_span(change: Option<f64>) -> Span {
    match change {
        Some(pct) if pct >= 0.05 => Span::new(format!("▲ {}", percent_change(pct)), SemanticToken::Positive),
        Some(pct) if pct <= -0.05 => Span::new(format!("▼ {}", percent_change(pct)), SemanticToken::Negative),
        Some(_) => Span::new("● 0.0%", SemanticToken::Muted),
        None => Span::new("  n/a", SemanticToken::Muted),
    }
}

// ──────────────────── layout ────────────────────

/// Section builder that optionally wraps content in box borders.
struct Sections {
    lines: Vec<Line>,
    bordered: bool,
    width: usize,
}

impl Sections {
    fn heading(&mut self, title: &str) {
        if self.bordered {
            let fill = self.width.saturating_sub(title.chars().count() + 5);
            self.lines.push(Line::new(vec![
                Span::new("┌─ ", SemanticToken::Muted),
                Span::new(title, SemanticToken::Heading).bold(),
                Span::new(format!(" {}┐", "─".repeat(fill)), SemanticToken::Muted),
            ]));
        } else {
            self.lines.push(Line::new(vec![
                Span::new(format!(" {title}"), SemanticToken::Heading).bold(),
            ]));
        }
    }

    fn row(&mut self, mut spans: Vec<Span>) {
        if self.bordered {
            let inner: usize = spans.iter().map(|s| s.text.chars().count()).sum();
            let pad = self.width.saturating_sub(inner + 4);
            spans.insert(0, Span::new("│ ", SemanticToken::Muted));
            spans.push(Span::text(" ".repeat(pad)));
            spans.push(Span::new(" │", SemanticToken::Muted));
        } else {
            spans.insert(0, Span::text("   "));
        }
        self.lines.push(Line::new(spans));
    }

    fn end(&mut self) {
        if self.bordered {
            self.lines.push(Line::new(vec![Span::new(
                format!("└{}┘", "─".repeat(self.width.saturating_sub(2))),
                SemanticToken::Muted,
            )]));
        }
        self.lines.push(Line::blank());
    }
}

/// Build the full dashboard for the state's current range.
#[must_use]
pub fn build_lines(state: &DashboardState, now: NaiveDateTime, theme: &Theme) -> Vec<Line> {
    let width = usize::from(theme.width.max(40));
    let mut out = Sections {
        lines: Vec::new(),
        bordered: theme.bordered,
        width,
    };

    header(&mut out, state);

    match state.data() {
        Some(data) if data.range == state.range() => {
            cards(&mut out, data);
            charts(&mut out, data, width);
            platforms(&mut out, data, width);
            posts(&mut out, data);
        }
        _ => out.lines.push(Line::new(vec![Span::new(
            "   Loading…",
            SemanticToken::Muted,
        )])),
    }

    footer(&mut out, state, now);
    out.lines
}

fn header(out: &mut Sections, state: &DashboardState) {
    let range = state.range();
    let title = format!(" reachboard · {}", selector_label(&state.selector()));
    let right = format!("{} ", format_label(&range));
    let pad = out.width.saturating_sub(title.chars().count() + right.chars().count());

    let mut spans = vec![
        Span::new(title, SemanticToken::Accent).bold(),
        Span::text(" ".repeat(pad)),
        Span::new(right, SemanticToken::Heading).bold(),
    ];
    if state.is_loading() {
        spans.push(Span::new("⟳", SemanticToken::Muted));
    }
    out.lines.push(Line::new(spans));
    out.lines.push(Line::new(vec![Span::new(
        format!(
            " {}  ({} days)",
            format_label_with_year(&range),
            range.calendar_days().count()
        ),
        SemanticToken::Muted,
    )]));
    out.lines.push(Line::blank());
}

fn cards(out: &mut Sections, data: &DisplayData) {
    out.heading("Overview");
    for card in &data.cards {
        out.row(vec![
            Span::new(format!("{:<12}", card.kind.title()), SemanticToken::Muted),
            Span::new(format!("{:>9}", card.display_value()), SemanticToken::Text).bold(),
            Span::text("  "),
            change_span(card.change_pct()),
        ]);
    }
    out.end();
}

fn charts(out: &mut Sections, data: &DisplayData, width: usize) {
    let weekly = data.series.iter().any(|p| p.days > 1);
    out.heading(if weekly { "Reach (weekly)" } else { "Reach (daily)" });

    let reach: Vec<f64> = data.series.iter().map(|p| p.reach as f64).collect();
    let spark_width = width.saturating_sub(8).max(8);
    out.row(vec![Span::new(
        render_sparkline(&normalize_series(&reach, spark_width)),
        SemanticToken::Accent,
    )]);
    if let (Some(first), Some(last)) = (data.series.first(), data.series.last()) {
        let left = first.date.format("%d %b").to_string();
        let right = last.date.format("%d %b").to_string();
        let gap = spark_width.min(reach.len()).saturating_sub(left.len() + right.len());
        out.row(vec![Span::new(
            format!("{left}{}{right}", " ".repeat(gap)),
            SemanticToken::Muted,
        )]);
    }
    out.end();

    out.heading("Engagements");
    let skip = data.series.len().saturating_sub(BAR_CHART_POINTS);
    let recent: &[SeriesPoint] = &data.series[skip..];
    let max = recent.iter().map(|p| p.engagements).max().unwrap_or(0).max(1);
    let bar_width = width.saturating_sub(30).clamp(10, 50);
    for point in recent {
        let filled = ((point.engagements as f64 / max as f64) * bar_width as f64).round() as usize;
        out.row(vec![
            Span::new(point.date.format("%d %b  ").to_string(), SemanticToken::Muted),
            Span::new("█".repeat(filled.max(1)), SemanticToken::Accent),
            Span::text(format!(" {}", compact_number(point.engagements as f64))),
        ]);
    }
    out.end();
}

fn platforms(out: &mut Sections, data: &DisplayData, width: usize) {
    out.heading("Audience by platform");
    let gauge_width = width.saturating_sub(45).clamp(10, 30);
    for share in &data.platforms {
        out.row(vec![
            Span::new(format!("{:<10}", share.platform.name()), SemanticToken::Text),
            Span::new(render_gauge(share.share_pct, gauge_width), SemanticToken::Accent),
            Span::new(
                format!("  {}", compact_number(share.followers as f64)),
                SemanticToken::Muted,
            ),
        ]);
    }
    out.end();
}

fn posts(out: &mut Sections, data: &DisplayData) {
    out.heading("Top posts");
    if data.top_posts.is_empty() {
        out.row(vec![Span::new("(no posts in range)", SemanticToken::Muted)]);
    }
    for (rank, post) in data.top_posts.iter().enumerate() {
        let mut title = post.title.clone();
        if title.chars().count() > 36 {
            title = title.chars().take(35).collect::<String>() + "…";
        }
        out.row(vec![
            Span::new(format!("{}. ", rank + 1), SemanticToken::Muted),
            Span::text(format!("{title:<37}")),
            Span::new(format!("{:<10}", post.platform.name()), SemanticToken::Muted),
            Span::new(post.published.format("%d %b  ").to_string(), SemanticToken::Muted),
            Span::new(
                format!(
                    "♥ {}  💬 {}  ↻ {}",
                    compact_number(post.likes as f64),
                    compact_number(post.comments as f64),
                    compact_number(post.shares as f64)
                ),
                SemanticToken::Text,
            ),
        ]);
    }
    out.end();
}

fn footer(out: &mut Sections, state: &DashboardState, now: NaiveDateTime) {
    let mut spans = vec![Span::new(
        " ←/h prev  ",
        SemanticToken::Muted,
    )];
    if state.can_navigate_next(now) {
        spans.push(Span::new("→/l next  ", SemanticToken::Muted));
    } else {
        spans.push(Span::new("→ next disabled  ", SemanticToken::Negative));
    }
    spans.push(Span::new(
        "1-4 presets  t today  m month  p last month  y year  c custom  d theme  q quit",
        SemanticToken::Muted,
    ));
    out.lines.push(Line::new(spans));
}

// ──────────────────── overlays ────────────────────

/// Custom range picker rows, drawn below the dashboard while it is open.
#[must_use]
pub fn picker_lines(picker: &CustomPicker, now: NaiveDateTime) -> Vec<Line> {
    let bounds = picker.bounds(now);
    let day = |d: chrono::NaiveDate| d.format("%d %b %Y").to_string();

    let mut prompt = vec![Span::new(" Custom range · ", SemanticToken::Heading).bold()];
    match picker.stage() {
        PickerStage::Start => prompt.push(Span::new("start ", SemanticToken::Muted)),
        PickerStage::End { start } => {
            prompt.push(Span::text(format!("{} → ", day(start))));
            prompt.push(Span::new("end ", SemanticToken::Muted));
        }
    }
    prompt.push(Span::new(format!("◀ {} ▶", day(picker.cursor())), SemanticToken::Accent).bold());
    let earliest = bounds.min.map_or_else(|| "any day".to_string(), day);
    prompt.push(Span::new(
        format!("   ({earliest} .. {})", day(bounds.max)),
        SemanticToken::Muted,
    ));

    vec![
        Line::blank(),
        Line::new(prompt),
        Line::new(vec![Span::new(
            " ←/→ day  ↑/↓ week  PgUp/PgDn 30 days  Enter confirm  Backspace back  Esc cancel",
            SemanticToken::Muted,
        )]),
    ]
}

/// One-line status message, e.g. a refused custom range.
#[must_use]
pub fn notice_line(text: &str) -> Line {
    Line::new(vec![Span::new(format!(" {text}"), SemanticToken::Negative)])
}

// ──────────────────── painters ────────────────────

fn paint_spans<W: Write>(out: &mut W, line: &Line, theme: &Theme) -> io::Result<()> {
    for span in &line.spans {
        if theme.color.is_enabled() {
            queue!(out, SetForegroundColor(theme.palette.color(span.token)))?;
            if span.bold {
                queue!(out, SetAttribute(Attribute::Bold))?;
            }
            queue!(out, Print(&span.text), SetAttribute(Attribute::Reset), ResetColor)?;
        } else {
            queue!(out, Print(&span.text))?;
        }
    }
    Ok(())
}

/// Paint one full frame on the alternate screen.
pub fn paint_frame<W: Write>(out: &mut W, lines: &[Line], theme: &Theme, rows: u16) -> io::Result<()> {
    queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;
    for (row, line) in lines.iter().take(usize::from(rows)).enumerate() {
        queue!(out, MoveTo(0, row as u16))?;
        paint_spans(out, line, theme)?;
    }
    out.flush()
}

/// Write lines to a normal stream, one per row.
pub fn paint_lines<W: Write>(out: &mut W, lines: &[Line], theme: &Theme) -> io::Result<()> {
    for line in lines {
        paint_spans(out, line, theme)?;
        queue!(out, Print("\n"))?;
    }
    out.flush()
}

/// Unstyled text, one line per row.
#[must_use]
pub fn to_plain(lines: &[Line]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.plain().trim_end());
        text.push('\n');
    }
    text
}
