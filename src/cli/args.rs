//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::context::Theme;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Content discovery and navigation-menu tooling for static book sites.
#[derive(Parser, Debug)]
#[command(name = "booknav", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-error output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "BOOKNAV_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "BOOKNAV_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan content roots and emit navigation data.
    Scan(ScanArgs),

    /// Extract the headings of a chapter page.
    Headings(HeadingsArgs),

    /// Render the navigation menu as HTML.
    Render(RenderArgs),

    /// Show the contributor leaderboard.
    Contributors(ContributorsArgs),

    /// Show or change the theme preference.
    Theme(ThemeArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Site location and config shared by site-aware commands.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site root directory.
    #[arg(long, default_value = ".", env = "BOOKNAV_SITE_ROOT")]
    pub site_root: PathBuf,

    /// Site config file (default: `booknav.yaml` in the site root).
    #[arg(short, long, env = "BOOKNAV_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for `scan`.
#[derive(Args, Debug)]
pub struct ScanArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Output format.
    #[arg(short, long, default_value = "json")]
    pub format: DataFormatArg,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Global binding for the `js` format (overrides config).
    #[arg(long)]
    pub binding: Option<String>,
}

/// Arguments for `headings`.
#[derive(Args, Debug)]
#[command(group = clap::ArgGroup::new("source").multiple(false))]
pub struct HeadingsArgs {
    /// Page href, relative to the site root.
    pub href: String,

    /// Site root directory to read the page from.
    #[arg(long, group = "source", env = "BOOKNAV_SITE_ROOT")]
    pub site_root: Option<PathBuf>,

    /// Base URL to fetch the page from.
    #[arg(long, group = "source", env = "BOOKNAV_BASE_URL")]
    pub base_url: Option<String>,

    /// Link headings as on the current page (`#id`).
    #[arg(long)]
    pub current: bool,

    /// Content container class (overrides config).
    #[arg(long)]
    pub content_class: Option<String>,

    /// Fetch timeout, e.g. `5s` (overrides config).
    #[arg(long, value_parser = humantime::parse_duration)]
    pub timeout: Option<std::time::Duration>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

/// Arguments for `render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Href of the page being viewed.
    #[arg(long)]
    pub current: Option<String>,

    /// Preference store file (expand flags, cached headings).
    #[arg(long, env = "BOOKNAV_STORE")]
    pub store: Option<PathBuf>,

    /// Item ids to toggle before rendering, in order.
    #[arg(long = "toggle", value_name = "ID")]
    pub toggles: Vec<String>,

    /// Expand every item before rendering.
    #[arg(long, conflicts_with = "collapse_all")]
    pub expand_all: bool,

    /// Collapse every item before rendering.
    #[arg(long)]
    pub collapse_all: bool,

    /// Heading of the current page to highlight.
    #[arg(long)]
    pub active: Option<String>,

    /// Print the theme toggle button before the menu.
    #[arg(long)]
    pub theme_toggle: bool,

    /// System theme preference used when nothing is stored.
    #[arg(long, default_value = "light", env = "BOOKNAV_SYSTEM_THEME")]
    pub system: Theme,
}

/// Arguments for `contributors`.
#[derive(Args, Debug)]
pub struct ContributorsArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Repository owner (overrides config).
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name (overrides config).
    #[arg(long)]
    pub repo: Option<String>,

    /// API base URL (overrides config).
    #[arg(long, env = "BOOKNAV_API_BASE")]
    pub api_base: Option<String>,

    /// Preference store file holding the cache.
    #[arg(long, env = "BOOKNAV_STORE")]
    pub store: Option<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: LeaderboardFormat,
}

/// Arguments for `theme`.
#[derive(Args, Debug)]
pub struct ThemeArgs {
    /// Preference store file.
    #[arg(long, env = "BOOKNAV_STORE")]
    pub store: Option<PathBuf>,

    /// Switch to the opposite theme and persist it.
    #[arg(long, conflicts_with = "set")]
    pub toggle: bool,

    /// Set and persist a theme.
    #[arg(long)]
    pub set: Option<Theme>,

    /// System preference used when nothing is stored.
    #[arg(long, default_value = "light", env = "BOOKNAV_SYSTEM_THEME")]
    pub system: Theme,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Navigation data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DataFormatArg {
    /// JSON document.
    #[default]
    Json,
    /// `window.<binding> = ...;` script.
    Js,
}

/// Leaderboard output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LeaderboardFormat {
    /// Plain text table.
    #[default]
    Human,
    /// JSON list.
    Json,
    /// HTML table rows.
    Html,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::try_parse_from(["booknav", "scan"]).unwrap();
        let Commands::Scan(args) = cli.command else {
            panic!("expected scan");
        };
        assert_eq!(args.format, DataFormatArg::Json);
        assert!(args.output.is_none());
        assert_eq!(cli.log_format, LogFormat::Human);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["booknav", "scan", "-vv", "--log-format", "json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn test_headings_sources_mutually_exclusive() {
        let cli = Cli::try_parse_from([
            "booknav",
            "headings",
            "a.html",
            "--site-root",
            ".",
            "--base-url",
            "https://example.org",
        ]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_headings_timeout_parses_humantime() {
        let cli = Cli::try_parse_from(["booknav", "headings", "a.html", "--timeout", "1500ms"]).unwrap();
        let Commands::Headings(args) = cli.command else {
            panic!("expected headings");
        };
        assert_eq!(args.timeout, Some(std::time::Duration::from_millis(1500)));
    }

    #[test]
    fn test_render_repeated_toggles() {
        let cli = Cli::try_parse_from([
            "booknav", "render", "--toggle", "books", "--toggle", "books-algorithms",
        ])
        .unwrap();
        let Commands::Render(args) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.toggles, vec!["books", "books-algorithms"]);
    }

    #[test]
    fn test_theme_toggle_conflicts_with_set() {
        assert!(Cli::try_parse_from(["booknav", "theme", "--toggle", "--set", "dark"]).is_err());
    }

    #[test]
    fn test_help_output() {
        let err = Cli::try_parse_from(["booknav", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_flag() {
        let err = Cli::try_parse_from(["booknav", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }
}
