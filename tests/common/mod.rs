//! Shared helpers for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

/// Runs the `booknav` binary with `args` and waits for it to exit.
#[allow(clippy::missing_panics_doc)]
pub fn run_booknav(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_booknav"))
        .args(args)
        .env_remove("BOOKNAV_LOG_LEVEL")
        .env_remove("BOOKNAV_SITE_ROOT")
        .env_remove("BOOKNAV_CONFIG")
        .env_remove("BOOKNAV_STORE")
        .env_remove("BOOKNAV_SYSTEM_THEME")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run booknav binary")
}

/// Stdout of a run as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stderr of a run as text.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// A throwaway site directory.
pub struct SiteFixture {
    dir: TempDir,
}

impl SiteFixture {
    /// Creates an empty site.
    #[allow(clippy::missing_panics_doc)]
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("failed to create temp dir"),
        }
    }

    /// A site with one book, one paper and math notes.
    pub fn sample() -> Self {
        let site = Self::new();
        site.page(
            "books/algorithms/chapters/00-prologue.html",
            &chapter("Prologue", &["Books and algorithms", "Enter Fibonacci"]),
        );
        site.page(
            "books/algorithms/chapters/01-algorithms-with-numbers.html",
            &chapter("Algorithms with numbers", &["Basic arithmetic", "Modular arithmetic"]),
        );
        site.page("books/algorithms/index.html", "<html></html>");
        site.page(
            "papers/attention-is-all-you-need.html",
            &chapter("Attention", &["Model architecture"]),
        );
        site.page(
            "math-foundations/chapters/linear_algebra.html",
            &chapter("Linear algebra", &[]),
        );
        site
    }

    /// Writes a file below the site root, creating parent directories.
    #[allow(clippy::missing_panics_doc)]
    pub fn page(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(rel);
        std::fs::create_dir_all(path.parent().expect("page has a parent"))
            .expect("failed to create page dir");
        std::fs::write(&path, content).expect("failed to write page");
        path
    }

    /// Creates an empty directory below the site root.
    #[allow(clippy::missing_panics_doc)]
    pub fn dir(&self, rel: &str) {
        std::fs::create_dir_all(self.dir.path().join(rel)).expect("failed to create dir");
    }

    /// Site root path.
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Site root as a CLI argument.
    #[allow(clippy::missing_panics_doc)]
    pub fn root_arg(&self) -> &str {
        self.dir.path().to_str().expect("non-UTF-8 temp path")
    }
}

/// Minimal chapter page with the given `h2` headings inside `.content`.
pub fn chapter(title: &str, headings: &[&str]) -> String {
    let body: String = headings
        .iter()
        .map(|h| format!("<h2>{h}</h2>\n<p>Text.</p>\n"))
        .collect();
    format!(
        "<!DOCTYPE html><html><head><title>{title}</title></head>\
         <body><main class=\"content\"><h1>{title}</h1>\n{body}</main></body></html>"
    )
}
