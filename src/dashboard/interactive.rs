//! Interactive dashboard: raw-mode event loop over [`DashboardState`].
//!
//! Keys map to [`Action`]s, actions update the state, and every range change
//! issues a fresh load ticket before the next frame is painted. While the
//! custom range picker is open its keys are resolved first. Theme toggles
//! are saved through a debounced writer and flushed on exit.

#![allow(missing_docs)]

use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};

use super::picker::CustomPicker;
use super::preferences::{self, DebouncedWriter, SessionOverrides, ThemeSettings};
use super::render::{build_lines, notice_line, paint_frame, picker_lines};
use super::state::DashboardState;
use super::theme::{ColorMode, Theme, ThemePalette};
use crate::logger::activity::{ActivityEvent, ActivityLog};
use crate::metrics::Generator;
use crate::range::Clock;
use crate::range::navigator::Direction;
use crate::range::selector::{FIXED_PRESET_DAYS, PeriodSelector};

/// Raw mode flag checked by the panic hook.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Navigate(Direction),
    Select(PeriodSelector),
    OpenPicker,
    Picker(PickerInput),
    ToggleTheme,
    Quit,
}

/// Keys understood by the open custom range picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerInput {
    /// Move the cursor by a signed number of days.
    Move(i64),
    Confirm,
    Back,
    Cancel,
}

/// Map a key event to an action. Picker keys win while the picker is open;
/// unbound keys yield `None`.
#[must_use]
pub fn map_key(key: KeyEvent, picking: bool) -> Option<Action> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Some(Action::Quit);
    }
    if picking {
        return map_picker_key(key.code).map(Action::Picker);
    }
    let action = match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Left | KeyCode::Char('h') => Action::Navigate(Direction::Previous),
        KeyCode::Right | KeyCode::Char('l') => Action::Navigate(Direction::Next),
        KeyCode::Char(c @ '1'..='4') => {
            let idx = usize::from(c as u8 - b'1');
            Action::Select(PeriodSelector::LastDays(FIXED_PRESET_DAYS[idx]))
        }
        KeyCode::Char('t') => Action::Select(PeriodSelector::Today),
        KeyCode::Char('m') => Action::Select(PeriodSelector::ThisMonth),
        KeyCode::Char('p') => Action::Select(PeriodSelector::LastMonth),
        KeyCode::Char('y') => Action::Select(PeriodSelector::ThisYear),
        KeyCode::Char('c') => Action::OpenPicker,
        KeyCode::Char('d') => Action::ToggleTheme,
        _ => return None,
    };
    Some(action)
}

fn map_picker_key(code: KeyCode) -> Option<PickerInput> {
    let input = match code {
        KeyCode::Left | KeyCode::Char('h') => PickerInput::Move(-1),
        KeyCode::Right | KeyCode::Char('l') => PickerInput::Move(1),
        KeyCode::Up | KeyCode::Char('k') => PickerInput::Move(-7),
        KeyCode::Down | KeyCode::Char('j') => PickerInput::Move(7),
        KeyCode::PageUp => PickerInput::Move(-30),
        KeyCode::PageDown => PickerInput::Move(30),
        KeyCode::Enter => PickerInput::Confirm,
        KeyCode::Backspace => PickerInput::Back,
        KeyCode::Esc | KeyCode::Char('q') => PickerInput::Cancel,
        _ => return None,
    };
    Some(input)
}

/// Everything the loop needs besides the terminal.
pub struct DashboardOptions {
    pub selector: PeriodSelector,
    pub generator: Generator,
    pub refresh: Duration,
    pub theme_file: PathBuf,
    pub overrides: SessionOverrides,
    pub color: ColorMode,
}

/// Non-terminal session state: dashboard state plus theme persistence.
pub struct Session<'a> {
    pub state: DashboardState,
    pub persisted: ThemeSettings,
    pub effective: ThemeSettings,
    picker: Option<CustomPicker>,
    notice: Option<String>,
    generator: Generator,
    writer: DebouncedWriter,
    log: &'a mut ActivityLog,
}

impl<'a> Session<'a> {
    /// Load persisted theme settings and resolve the starting range.
    pub fn start(options: &DashboardOptions, clock: &dyn Clock, log: &'a mut ActivityLog) -> Self {
        let outcome = preferences::load(&options.theme_file);
        if let Some(details) = outcome.failure() {
            log.record(ActivityEvent::ThemeLoadFailed {
                path: options.theme_file.display().to_string(),
                details: details.to_string(),
            });
        }
        let persisted = outcome.into_settings();
        let effective = preferences::merge(&persisted, &options.overrides);

        let now = clock.now();
        let state = DashboardState::new(options.selector, now);
        log.record(ActivityEvent::RangeSelected {
            selector: state.selector(),
            range: state.range(),
        });

        let mut session = Self {
            state,
            persisted,
            effective,
            picker: None,
            notice: None,
            generator: options.generator,
            writer: DebouncedWriter::new(options.theme_file.clone()),
            log,
        };
        session.reload();
        session
    }

    /// Issue a load for the current range and complete it.
    fn reload(&mut self) {
        let ticket = self.state.begin_load();
        let data = self.generator.generate(&ticket.range());
        self.state.finish_load(ticket, data);
    }

    /// The open custom range picker, if any.
    #[must_use]
    pub const fn picker(&self) -> Option<&CustomPicker> {
        self.picker.as_ref()
    }

    /// Status message from the last action, e.g. a refused custom range.
    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Apply one action. Returns `false` when the loop should stop.
    pub fn apply(&mut self, action: Action, clock: &dyn Clock) -> bool {
        let now = clock.now();
        self.notice = None;
        match action {
            Action::Quit => return false,
            Action::OpenPicker => self.picker = Some(CustomPicker::open(&self.state.range(), now)),
            Action::Picker(input) => self.apply_picker(input, now),
            Action::Navigate(direction) => {
                let outcome = self.state.navigate(direction, now);
                self.log.record(ActivityEvent::RangeNavigated { outcome });
                if outcome.changed() {
                    self.reload();
                }
            }
            Action::Select(selector) => {
                let range = self.state.select(selector, now);
                self.log.record(ActivityEvent::RangeSelected { selector, range });
                self.reload();
            }
            Action::ToggleTheme => {
                self.effective.mode = self.effective.mode.toggled();
                self.persisted.mode = self.effective.mode;
                self.writer.request_save();
            }
        }
        true
    }

    fn apply_picker(&mut self, input: PickerInput, now: NaiveDateTime) {
        let Some(picker) = self.picker.as_mut() else {
            return;
        };
        match input {
            PickerInput::Move(days) => picker.move_by(days, now),
            PickerInput::Back => {
                if !picker.back() {
                    self.picker = None;
                }
            }
            PickerInput::Cancel => self.picker = None,
            PickerInput::Confirm => {
                let Some((start, end)) = picker.confirm(now) else {
                    return;
                };
                self.picker = None;
                match self.state.apply_custom(start, end, now) {
                    Ok(range) => {
                        self.log.record(ActivityEvent::RangeSelected {
                            selector: self.state.selector(),
                            range,
                        });
                        self.reload();
                    }
                    Err(e) => {
                        self.log.record(ActivityEvent::custom_range_rejected(&e));
                        self.notice = Some(e.to_string());
                    }
                }
            }
        }
    }

    /// Persist pending theme changes if the debounce allows, or
    /// unconditionally when `force` is set.
    pub fn flush_theme(&mut self, force: bool) {
        let result = if force {
            self.writer.force_flush(&self.persisted)
        } else {
            self.writer.try_flush(&self.persisted)
        };
        match result {
            Some(Ok(path)) => self.log.record(ActivityEvent::ThemeSaved {
                path: path.display().to_string(),
            }),
            Some(Err(e)) => {
                eprintln!(
                    "[RB-THEME] failed to save {}: {e}",
                    self.writer.path().display()
                );
            }
            None => {}
        }
    }

    #[must_use]
    pub fn theme(&self, color: ColorMode, terminal_cols: u16) -> Theme {
        Theme::new(
            ThemePalette::new(self.effective.mode, self.effective.primary_color)
                .with_semi_dark(self.effective.semi_dark),
            color,
            self.effective.skin == preferences::Skin::Bordered,
            self.effective.content_width.columns(terminal_cols),
        )
    }
}

// ──────────────────── terminal lifecycle ────────────────────

/// RAII guard: raw mode + alternate screen on creation, restored on drop
/// and from the panic hook.
struct TerminalGuard {
    hook_installed: bool,
}

impl TerminalGuard {
    fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            restore_terminal_best_effort();
            return Err(e);
        }

        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));

        Ok(Self {
            hook_installed: true,
        })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();
        if self.hook_installed {
            let _ = panic::take_hook();
        }
    }
}

/// Safe to call repeatedly; only the first call after entering raw mode
/// does anything.
fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
        let _ = stdout.flush();
    }
}

// ──────────────────── main loop ────────────────────

/// Run the dashboard until the user quits (q/Esc/Ctrl-C).
pub fn run(options: &DashboardOptions, clock: &dyn Clock, log: &mut ActivityLog) -> io::Result<()> {
    let started = Instant::now();
    let mut session = Session::start(options, clock, log);

    let result = {
        let _guard = TerminalGuard::new()?;
        run_inner(&mut session, options, clock)
    };

    session.flush_theme(true);
    session.log.record(ActivityEvent::DashboardStopped {
        uptime_secs: started.elapsed().as_secs(),
    });
    session.log.flush();
    result
}

fn run_inner(session: &mut Session<'_>, options: &DashboardOptions, clock: &dyn Clock) -> io::Result<()> {
    let mut stdout = io::stdout();
    let mut dirty = true;

    loop {
        if dirty {
            let (cols, rows) = terminal::size()?;
            let theme = session.theme(options.color, cols);
            let now = clock.now();
            let mut lines = build_lines(&session.state, now, &theme);
            if let Some(picker) = session.picker() {
                lines.extend(picker_lines(picker, now));
            }
            if let Some(notice) = session.notice() {
                lines.push(notice_line(notice));
            }
            paint_frame(&mut stdout, &lines, &theme, rows)?;
            dirty = false;
        }

        if event::poll(options.refresh)? {
            match event::read()? {
                Event::Key(key) => {
                    if let Some(action) = map_key(key, session.picker().is_some()) {
                        if !session.apply(action, clock) {
                            return Ok(());
                        }
                        dirty = true;
                    }
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        } else {
            // Idle tick: the clock may have crossed midnight, which changes
            // whether forward paging is allowed.
            dirty = true;
        }

        session.flush_theme(false);
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime};
    use crossterm::event::KeyEventState;

    use super::*;
    use crate::dashboard::theme::ThemeMode;
    use crate::range::FixedClock;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn options(theme_file: PathBuf) -> DashboardOptions {
        DashboardOptions {
            selector: PeriodSelector::LastDays(30),
            generator: Generator::new(),
            refresh: Duration::from_millis(250),
            theme_file,
            overrides: SessionOverrides::default(),
            color: ColorMode::Disabled,
        }
    }

    #[test]
    fn keys_map_to_actions() {
        assert_eq!(map_key(key(KeyCode::Left), false), Some(Action::Navigate(Direction::Previous)));
        assert_eq!(map_key(key(KeyCode::Char('l')), false), Some(Action::Navigate(Direction::Next)));
        assert_eq!(
            map_key(key(KeyCode::Char('3')), false),
            Some(Action::Select(PeriodSelector::LastDays(90)))
        );
        assert_eq!(map_key(key(KeyCode::Char('p')), false), Some(Action::Select(PeriodSelector::LastMonth)));
        assert_eq!(map_key(key(KeyCode::Esc), false), Some(Action::Quit));
        assert_eq!(map_key(key(KeyCode::Char('z')), false), None);
    }

    #[test]
    fn picker_keys_win_while_picking() {
        assert_eq!(map_key(key(KeyCode::Char('c')), false), Some(Action::OpenPicker));
        assert_eq!(
            map_key(key(KeyCode::Left), true),
            Some(Action::Picker(PickerInput::Move(-1)))
        );
        assert_eq!(
            map_key(key(KeyCode::Down), true),
            Some(Action::Picker(PickerInput::Move(7)))
        );
        assert_eq!(map_key(key(KeyCode::Enter), true), Some(Action::Picker(PickerInput::Confirm)));
        assert_eq!(map_key(key(KeyCode::Esc), true), Some(Action::Picker(PickerInput::Cancel)));
        assert_eq!(map_key(key(KeyCode::Char('t')), true), None);

        let mut ctrl_c = key(KeyCode::Char('c'));
        ctrl_c.modifiers = KeyModifiers::CONTROL;
        assert_eq!(map_key(ctrl_c, true), Some(Action::Quit));
    }

    #[test]
    fn key_release_is_ignored() {
        let mut release = key(KeyCode::Char('q'));
        release.kind = KeyEventKind::Release;
        assert_eq!(map_key(release, false), None);
    }

    #[test]
    fn session_loads_data_for_starting_range() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock(at(2024, 3, 15, 12));
        let mut log = ActivityLog::disabled();
        let session = Session::start(&options(dir.path().join("theme.json")), &clock, &mut log);
        assert_eq!(session.state.data().map(|d| d.range), Some(session.state.range()));
    }

    #[test]
    fn forward_at_today_keeps_range_and_data() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock(at(2024, 3, 15, 12));
        let mut log = ActivityLog::disabled();
        let mut session = Session::start(&options(dir.path().join("theme.json")), &clock, &mut log);
        let before = session.state.range();
        assert!(session.apply(Action::Navigate(Direction::Next), &clock));
        assert_eq!(session.state.range(), before);

        session.apply(Action::Navigate(Direction::Previous), &clock);
        assert_eq!(session.state.selector(), PeriodSelector::LastDays(30));
        assert_ne!(session.state.range(), before);
        assert_eq!(session.state.data().map(|d| d.range), Some(session.state.range()));
    }

    #[test]
    fn picker_applies_a_custom_range() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock(at(2024, 3, 15, 12));
        let mut log = ActivityLog::disabled();
        let mut session = Session::start(&options(dir.path().join("theme.json")), &clock, &mut log);

        session.apply(Action::OpenPicker, &clock);
        assert_eq!(
            session.picker().map(CustomPicker::cursor),
            Some(session.state.range().start().date())
        );
        session.apply(Action::Picker(PickerInput::Move(2)), &clock);
        session.apply(Action::Picker(PickerInput::Confirm), &clock);
        session.apply(Action::Picker(PickerInput::Move(9)), &clock);
        session.apply(Action::Picker(PickerInput::Confirm), &clock);

        assert!(session.picker().is_none());
        assert!(session.state.selector().is_custom());
        let range = session.state.range();
        assert_eq!(range.start(), at(2024, 2, 16, 0));
        assert_eq!(range.end().date(), NaiveDate::from_ymd_opt(2024, 2, 25).unwrap());
        assert_eq!(session.state.data().map(|d| d.range), Some(range));
        assert!(session.notice().is_none());
    }

    #[test]
    fn cancelled_picker_leaves_range_alone() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock(at(2024, 3, 15, 12));
        let mut log = ActivityLog::disabled();
        let mut session = Session::start(&options(dir.path().join("theme.json")), &clock, &mut log);
        let before = session.state.range();

        session.apply(Action::OpenPicker, &clock);
        session.apply(Action::Picker(PickerInput::Confirm), &clock);
        session.apply(Action::Picker(PickerInput::Back), &clock);
        assert!(session.picker().is_some());
        session.apply(Action::Picker(PickerInput::Cancel), &clock);

        assert!(session.picker().is_none());
        assert_eq!(session.state.range(), before);
        assert_eq!(session.state.selector(), PeriodSelector::LastDays(30));
    }

    #[test]
    fn theme_toggle_is_persisted_on_flush() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("theme.json");
        let clock = FixedClock(at(2024, 3, 15, 12));
        let mut log = ActivityLog::disabled();
        let mut session = Session::start(&options(path.clone()), &clock, &mut log);

        session.apply(Action::ToggleTheme, &clock);
        session.flush_theme(true);

        let saved = preferences::load(&path).into_settings();
        assert_eq!(saved.mode, ThemeMode::Dark);
    }

    #[test]
    fn quit_stops_the_loop() {
        let dir = tempfile::tempdir().unwrap();
        let clock = FixedClock(at(2024, 3, 15, 12));
        let mut log = ActivityLog::disabled();
        let mut session = Session::start(&options(dir.path().join("theme.json")), &clock, &mut log);
        assert!(!session.apply(Action::Quit, &clock));
    }
}
