//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::time::Duration;

use chrono::NaiveDateTime;
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use reachboard::core::config::Config;
use reachboard::core::errors::RbError;
use reachboard::dashboard::interactive::{self, DashboardOptions};
use reachboard::dashboard::preferences::{self, LoadOutcome, SessionOverrides, ThemeSettings};
use reachboard::dashboard::render::{build_lines, paint_lines};
use reachboard::dashboard::state::DashboardState;
use reachboard::dashboard::theme::{ColorMode, PrimaryColor, Theme, ThemeMode, ThemePalette};
use reachboard::logger::activity::{ActivityEvent, ActivityLog};
use reachboard::metrics::Generator;
use reachboard::range::calendar::{format_timestamp, parse_timestamp};
use reachboard::range::label::{format_label, format_label_with_year, selector_label};
use reachboard::range::navigator::{self, Direction, Navigation};
use reachboard::range::selector::PeriodSelector;
use reachboard::range::validation::validate_custom;
use reachboard::range::{Clock, DateRange, FixedClock, SystemClock};

/// Social-media analytics dashboard over mock data.
#[derive(Debug, Parser)]
#[command(
    name = "reachboard",
    author,
    version,
    about = "Social-media analytics dashboard with period presets and range paging",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<std::path::PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Resolve a period preset (or a custom pair) to a date range.
    Range(RangeArgs),
    /// Page a range backward or forward by its own length.
    Navigate(NavigateArgs),
    /// Render the dashboard once to stdout.
    Report(ReportArgs),
    /// Interactive terminal dashboard.
    Dashboard(DashboardArgs),
    /// Show or change persisted theme settings.
    Theme(ThemeArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Show version; `-v` adds build metadata.
    Version,
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

/// Period or explicit pair, shared by `range` and `report`.
#[derive(Debug, Clone, Args, Default)]
struct SelectionArgs {
    /// Period preset: `7days`, `30days`, `today`, `thisMonth`, `lastMonth`, `thisYear`.
    #[arg(value_name = "PERIOD", conflicts_with = "start")]
    period: Option<String>,
    /// Custom range start (RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`).
    #[arg(long, requires = "end", value_name = "TIME")]
    start: Option<String>,
    /// Custom range end; must not be later than now.
    #[arg(long, requires = "start", value_name = "TIME")]
    end: Option<String>,
    /// Pretend the current time is TIME.
    #[arg(long, value_name = "TIME")]
    now: Option<String>,
}

#[derive(Debug, Clone, Args, Default)]
struct RangeArgs {
    #[command(flatten)]
    selection: SelectionArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DirectionArg {
    #[value(alias = "previous", alias = "back")]
    Prev,
    #[value(alias = "forward")]
    Next,
}

impl From<DirectionArg> for Direction {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Prev => Self::Previous,
            DirectionArg::Next => Self::Next,
        }
    }
}

#[derive(Debug, Clone, Args)]
struct NavigateArgs {
    /// Paging direction.
    #[arg(value_enum)]
    direction: DirectionArg,
    /// Current range start.
    #[arg(long, value_name = "TIME")]
    start: String,
    /// Current range end.
    #[arg(long, value_name = "TIME")]
    end: String,
    /// Pretend the current time is TIME.
    #[arg(long, value_name = "TIME")]
    now: Option<String>,
    /// Number of periods to page.
    #[arg(long, default_value_t = 1, value_name = "N")]
    steps: u32,
}

#[derive(Debug, Clone, Args, Default)]
struct ReportArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Length of the top posts list (overrides config).
    #[arg(long, value_name = "N")]
    posts: Option<usize>,
}

#[derive(Debug, Clone, Args, Default)]
struct DashboardArgs {
    /// Starting period preset.
    #[arg(value_name = "PERIOD", conflicts_with = "start")]
    period: Option<String>,
    /// Start on a custom range beginning at TIME.
    #[arg(long, requires = "end", value_name = "TIME")]
    start: Option<String>,
    /// Custom range end; must not be later than now.
    #[arg(long, requires = "start", value_name = "TIME")]
    end: Option<String>,
    /// Theme mode for this session only.
    #[arg(long, value_name = "MODE")]
    theme_mode: Option<ThemeMode>,
    /// Accent colour for this session only.
    #[arg(long, value_name = "COLOR")]
    primary_color: Option<PrimaryColor>,
    /// Input poll interval (overrides config).
    #[arg(long, value_name = "MS")]
    refresh_ms: Option<u64>,
}

#[derive(Debug, Clone, Args, Default)]
struct ThemeArgs {
    /// Theme operation to run.
    #[command(subcommand)]
    command: Option<ThemeCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ThemeCommand {
    /// Print effective theme settings.
    Show,
    /// Print the theme settings file path.
    Path,
    /// Set one theme key (mode, primary_color, skin, content_width, semi_dark).
    Set(ThemeSetArgs),
    /// Restore default theme settings.
    Reset,
}

#[derive(Debug, Clone, Args)]
struct ThemeSetArgs {
    /// Theme key to set.
    key: String,
    /// New value to apply.
    value: String,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
        }
    }
}

impl From<RbError> for CliError {
    fn from(err: RbError) -> Self {
        match err {
            RbError::Serialization { .. } => Self::Internal(err.to_string()),
            e if e.is_user_error() => Self::User(e.to_string()),
            e => Self::Runtime(e.to_string()),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if no_color(cli) {
        control::set_override(false);
    }

    match &cli.command {
        Command::Range(args) => run_range(cli, args),
        Command::Navigate(args) => run_navigate(cli, args),
        Command::Report(args) => run_report(cli, args),
        Command::Dashboard(args) => run_dashboard(cli, args),
        Command::Theme(args) => run_theme(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Version => emit_version(cli),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── shared helpers ────────────────────

fn load_config(cli: &Cli) -> Result<Config, CliError> {
    Config::load(cli.config.as_deref()).map_err(|e| match e {
        RbError::MissingConfig { .. } => CliError::User(e.to_string()),
        other => CliError::from(other),
    })
}

fn clock_for(now: Option<&str>) -> Result<Box<dyn Clock>, CliError> {
    Ok(match now {
        Some(raw) => Box::new(FixedClock(parse_timestamp(raw)?)),
        None => Box::new(SystemClock),
    })
}

fn no_color(cli: &Cli) -> bool {
    cli.no_color || std::env::var_os("NO_COLOR").is_some()
}

/// Parse a period name honouring `dashboard.strict_selectors`.
fn parse_period(
    cli: &Cli,
    config: &Config,
    log: &mut ActivityLog,
    name: Option<&str>,
) -> Result<PeriodSelector, CliError> {
    let Some(name) = name else {
        return Ok(config.default_selector()?);
    };

    if config.dashboard.strict_selectors {
        return Ok(name.parse::<PeriodSelector>()?);
    }

    let lenient = PeriodSelector::parse_or_default(name);
    if lenient.fell_back {
        log.record(ActivityEvent::SelectorFallback {
            input: name.to_string(),
            fallback: lenient.selector,
        });
        if !cli.quiet {
            eprintln!(
                "[RB-2001] unrecognized period {name:?}; showing {}",
                selector_label(&lenient.selector).to_lowercase()
            );
        }
    }
    Ok(lenient.selector)
}

/// Build the dashboard state for a period or custom pair.
fn select_range(
    cli: &Cli,
    config: &Config,
    log: &mut ActivityLog,
    selection: &SelectionArgs,
    now: NaiveDateTime,
) -> Result<DashboardState, CliError> {
    let mut state = DashboardState::new(PeriodSelector::default(), now);

    if let (Some(start), Some(end)) = (&selection.start, &selection.end) {
        let start = parse_timestamp(start)?;
        let end = parse_timestamp(end)?;
        if let Err(e) = state.apply_custom(start, end, now) {
            log.record(ActivityEvent::custom_range_rejected(&e));
            return Err(e.into());
        }
    } else {
        let selector = parse_period(cli, config, log, selection.period.as_deref())?;
        state.select(selector, now);
    }

    log.record(ActivityEvent::RangeSelected {
        selector: state.selector(),
        range: state.range(),
    });
    Ok(state)
}

fn range_json(range: &DateRange) -> Value {
    json!({
        "start": format_timestamp(range.start()),
        "end": format_timestamp(range.end()),
        "label": format_label(range),
        "label_long": format_label_with_year(range),
        "days": range.calendar_days().count(),
    })
}

fn print_range_human(selector: &PeriodSelector, range: &DateRange, next_enabled: bool) {
    println!(
        "{}  {}",
        format_label(range).bold(),
        format!("({})", selector_label(selector)).dimmed()
    );
    println!("  start: {}", format_timestamp(range.start()));
    println!("  end:   {}", format_timestamp(range.end()));
    println!("  days:  {}", range.calendar_days().count());
    if !next_enabled {
        println!("  {}", "next: disabled (range reaches today)".yellow());
    }
}

// ──────────────────── range / navigate ────────────────────

fn run_range(cli: &Cli, args: &RangeArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut log = ActivityLog::open(&config);
    let now = clock_for(args.selection.now.as_deref())?.now();
    let state = select_range(cli, &config, &mut log, &args.selection, now)?;
    log.flush();

    let range = state.range();
    let next_enabled = state.can_navigate_next(now);
    match output_mode(cli) {
        OutputMode::Human => print_range_human(&state.selector(), &range, next_enabled),
        OutputMode::Json => {
            let payload = json!({
                "command": "range",
                "selector": state.selector().name(),
                "now": format_timestamp(now),
                "range": range_json(&range),
                "next_enabled": next_enabled,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn run_navigate(cli: &Cli, args: &NavigateArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut log = ActivityLog::open(&config);
    let now = clock_for(args.now.as_deref())?.now();
    let start = parse_timestamp(&args.start)?;
    let end = parse_timestamp(&args.end)?;
    let mut range = DateRange::new(start, end)?;
    let direction = Direction::from(args.direction);

    let mut outcome = Navigation::Moved(range);
    for _ in 0..args.steps {
        outcome = navigator::navigate(&range, direction, now);
        if outcome.is_out_of_bounds() {
            log.record(ActivityEvent::RangeNavigated { outcome });
            log.flush();
            return Err(RbError::RangeOutOfBounds {
                start: format_timestamp(range.start()),
                end: format_timestamp(range.end()),
            }
            .into());
        }
        if outcome.is_disabled() {
            break;
        }
        range = outcome.range();
    }
    log.record(ActivityEvent::RangeNavigated { outcome });
    log.flush();

    let next_enabled = navigator::can_navigate_next(&range, now);
    match output_mode(cli) {
        OutputMode::Human => {
            if outcome.is_disabled() && !cli.quiet {
                eprintln!("next is disabled: the range already reaches today");
            } else if outcome.is_clamped() && cli.verbose {
                eprintln!("forward page clamped to end at now");
            }
            print_range_human(&PeriodSelector::Custom(range), &range, next_enabled);
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "navigate",
                "direction": direction,
                "outcome": outcome.kind(),
                "now": format_timestamp(now),
                "range": range_json(&range),
                "next_enabled": next_enabled,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ──────────────────── report / dashboard ────────────────────

fn persisted_theme(config: &Config, log: &mut ActivityLog) -> ThemeSettings {
    let outcome = preferences::load(&config.paths.theme_file);
    if let Some(details) = outcome.failure() {
        log.record(ActivityEvent::ThemeLoadFailed {
            path: config.paths.theme_file.display().to_string(),
            details: details.to_string(),
        });
    }
    outcome.into_settings()
}

fn run_report(cli: &Cli, args: &ReportArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let mut log = ActivityLog::open(&config);
    let now = clock_for(args.selection.now.as_deref())?.now();
    let mut state = select_range(cli, &config, &mut log, &args.selection, now)?;

    let top_posts = args.posts.unwrap_or(config.dashboard.top_posts);
    if !(1..=50).contains(&top_posts) {
        return Err(CliError::User(format!(
            "--posts must be in [1, 50], got {top_posts}"
        )));
    }

    let generator = Generator::new()
        .with_salt(config.generator.salt)
        .with_top_posts(top_posts);
    let ticket = state.begin_load();
    state.finish_load(ticket, generator.generate(&ticket.range()));
    let data = state
        .data()
        .ok_or_else(|| CliError::Internal("report data missing after load".to_string()))?;

    match output_mode(cli) {
        OutputMode::Human => {
            let settings = persisted_theme(&config, &mut log);
            let color = ColorMode::from_no_color_flag(no_color(cli) || !io::stdout().is_terminal());
            let theme = Theme::new(
                ThemePalette::new(settings.mode, settings.primary_color)
                    .with_semi_dark(settings.semi_dark),
                color,
                settings.skin == preferences::Skin::Bordered,
                settings.content_width.columns(terminal_columns()),
            );
            let lines = build_lines(&state, now, &theme);
            paint_lines(&mut io::stdout().lock(), &lines, &theme)?;
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "report",
                "selector": state.selector().name(),
                "now": format_timestamp(now),
                "range": range_json(&state.range()),
                "next_enabled": state.can_navigate_next(now),
                "data": serde_json::to_value(data)?,
            });
            write_json_line(&payload)?;
        }
    }
    log.flush();
    Ok(())
}

fn terminal_columns() -> u16 {
    crossterm::terminal::size().map_or(100, |(cols, _)| cols)
}

fn run_dashboard(cli: &Cli, args: &DashboardArgs) -> Result<(), CliError> {
    if cli.json {
        return Err(CliError::User(
            "dashboard does not support --json; use `reachboard report --json`".to_string(),
        ));
    }

    let config = load_config(cli)?;
    let mut log = ActivityLog::open(&config);
    let selector = match (&args.start, &args.end) {
        (Some(start), Some(end)) => {
            let start = parse_timestamp(start)?;
            let end = parse_timestamp(end)?;
            match validate_custom(start, end, SystemClock.now()) {
                Ok(range) => PeriodSelector::Custom(range),
                Err(e) => {
                    log.record(ActivityEvent::custom_range_rejected(&e));
                    log.flush();
                    return Err(e.into());
                }
            }
        }
        _ => parse_period(cli, &config, &mut log, args.period.as_deref())?,
    };

    if !io::stdout().is_terminal() {
        return Err(CliError::User(
            "dashboard needs an interactive terminal; use `reachboard report` instead".to_string(),
        ));
    }
    let hash = config.stable_hash()?;
    log.record(ActivityEvent::DashboardStarted {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_hash: hash,
    });

    let refresh_ms = args.refresh_ms.unwrap_or(config.dashboard.refresh_ms);
    if !(16..=10_000).contains(&refresh_ms) {
        return Err(CliError::User(format!(
            "--refresh-ms must be in [16, 10000], got {refresh_ms}"
        )));
    }

    let options = DashboardOptions {
        selector,
        generator: Generator::new()
            .with_salt(config.generator.salt)
            .with_top_posts(config.dashboard.top_posts),
        refresh: Duration::from_millis(refresh_ms),
        theme_file: config.paths.theme_file.clone(),
        overrides: SessionOverrides {
            mode: args.theme_mode,
            primary_color: args.primary_color,
        },
        color: ColorMode::from_environment(cli.no_color),
    };

    interactive::run(&options, &SystemClock, &mut log)
        .map_err(|e| CliError::Runtime(format!("dashboard terminal failure: {e}")))
}

// ──────────────────── theme ────────────────────

fn theme_json(settings: &ThemeSettings) -> Result<Value, CliError> {
    Ok(serde_json::to_value(settings)?)
}

fn print_theme_human(settings: &ThemeSettings) {
    println!("mode:          {}", settings.mode);
    println!("primary_color: {}", settings.primary_color);
    println!("skin:          {}", settings.skin);
    println!("content_width: {}", settings.content_width);
    println!("semi_dark:     {}", settings.semi_dark);
}

fn run_theme(cli: &Cli, args: &ThemeArgs) -> Result<(), CliError> {
    let config = load_config(cli)?;
    let path = config.paths.theme_file.clone();
    let mut log = ActivityLog::open(&config);

    match &args.command {
        None | Some(ThemeCommand::Show) => {
            let outcome = preferences::load(&path);
            let source = match &outcome {
                LoadOutcome::Loaded { report, .. } => {
                    if !cli.quiet {
                        for warning in &report.warnings {
                            eprintln!("[RB-THEME] {warning}");
                        }
                    }
                    "file"
                }
                LoadOutcome::Missing => "defaults",
                LoadOutcome::Corrupt { details } | LoadOutcome::IoError { details } => {
                    log.record(ActivityEvent::ThemeLoadFailed {
                        path: path.display().to_string(),
                        details: details.clone(),
                    });
                    if !cli.quiet {
                        eprintln!("[RB-THEME] ignoring unreadable {}: {details}", path.display());
                    }
                    "defaults"
                }
            };
            let settings = outcome.into_settings();

            match output_mode(cli) {
                OutputMode::Human => print_theme_human(&settings),
                OutputMode::Json => {
                    let payload = json!({
                        "command": "theme show",
                        "path": path.to_string_lossy(),
                        "source": source,
                        "settings": theme_json(&settings)?,
                    });
                    write_json_line(&payload)?;
                }
            }
        }
        Some(ThemeCommand::Path) => match output_mode(cli) {
            OutputMode::Human => println!("{}", path.display()),
            OutputMode::Json => {
                let payload = json!({
                    "command": "theme path",
                    "path": path.to_string_lossy(),
                    "exists": path.exists(),
                });
                write_json_line(&payload)?;
            }
        },
        Some(ThemeCommand::Set(set)) => {
            let mut settings = preferences::load(&path).into_settings();
            settings.set_field(&set.key, &set.value).map_err(CliError::User)?;
            save_theme(&settings, &path, &mut log)?;

            match output_mode(cli) {
                OutputMode::Human => {
                    if !cli.quiet {
                        println!("Saved {} = {} to {}", set.key, set.value, path.display());
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "theme set",
                        "key": set.key,
                        "path": path.to_string_lossy(),
                        "settings": theme_json(&settings)?,
                    });
                    write_json_line(&payload)?;
                }
            }
        }
        Some(ThemeCommand::Reset) => {
            let settings = ThemeSettings::default();
            save_theme(&settings, &path, &mut log)?;
            match output_mode(cli) {
                OutputMode::Human => {
                    if !cli.quiet {
                        println!("Theme reset to defaults at {}", path.display());
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "theme reset",
                        "path": path.to_string_lossy(),
                        "settings": theme_json(&settings)?,
                    });
                    write_json_line(&payload)?;
                }
            }
        }
    }
    log.flush();
    Ok(())
}

fn save_theme(
    settings: &ThemeSettings,
    path: &std::path::Path,
    log: &mut ActivityLog,
) -> Result<(), CliError> {
    let written = preferences::save(settings, path)
        .map_err(|e| CliError::Runtime(format!("failed to save {}: {e}", path.display())))?;
    log.record(ActivityEvent::ThemeSaved {
        path: written.display().to_string(),
    });
    Ok(())
}

// ──────────────────── config / version ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            let exists = path.exists();

            match output_mode(cli) {
                OutputMode::Human => {
                    println!("{}", path.display());
                    if !exists {
                        println!("  (file does not exist; defaults will be used)");
                    }
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config path",
                        "path": path.to_string_lossy(),
                        "exists": exists,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Show) => {
            let config = load_config(cli)?;

            match output_mode(cli) {
                OutputMode::Human => println!("{}", config.to_toml()?),
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;

                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("{}", "Configuration is valid.".green());
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                match output_mode(cli) {
                    OutputMode::Human => eprintln!("Configuration is INVALID: {e}"),
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": false,
                            "code": e.code(),
                            "error": e.to_string(),
                        });
                        write_json_line(&payload)?;
                    }
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

fn emit_version(cli: &Cli) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let package = env!("CARGO_PKG_NAME");
    let target = option_env!("TARGET").unwrap_or("unknown");
    let profile = option_env!("PROFILE").unwrap_or("unknown");

    match output_mode(cli) {
        OutputMode::Human => {
            println!("reachboard {version}");
            if cli.verbose {
                println!("package: {package}");
                println!("target: {target}");
                println!("profile: {profile}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "binary": "reachboard",
                "version": version,
                "package": package,
                "build": {
                    "target": target,
                    "profile": profile,
                }
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("RB_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        Some(_) | None => fallback,
    }
}
