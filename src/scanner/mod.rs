//! Content discovery.
//!
//! Walks the configured content roots and builds the [`NavigationTree`].
//! Three layouts are recognized:
//!
//! - `{root}/chapters/*.html`: the root is a chapter source, no subsections
//! - `{root}/{subdir}/chapters/*.html`: the nested `chapters` directory is
//!   the chapter source for `subdir`
//! - `{root}/{subdir}/*.html`: `subdir` is its own chapter source
//!
//! Files directly inside a root also become chapters of the root section.
//! Missing roots and unreadable subdirectories are skipped, never fatal.

pub mod emit;
pub mod title;

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::ScanError;
use crate::model::{Chapter, ContentRoot, NavigationTree, Section};

pub use title::{derive_title, derive_title_with, slugify};

/// Default chapter source directory name.
pub const DEFAULT_CHAPTERS_DIR: &str = "chapters";

/// File stem excluded from chapter listings (avoids self-listing).
pub const INDEX_STEM: &str = "index";

/// Scanner tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Recognized content extensions, compared case-insensitively.
    pub extensions: Vec<String>,

    /// Name of the nested chapter source directory.
    pub chapters_dir: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["html".to_string()],
            chapters_dir: DEFAULT_CHAPTERS_DIR.to_string(),
        }
    }
}

/// Builds navigation trees from a site directory.
#[derive(Debug, Clone)]
pub struct ContentScanner {
    site_root: PathBuf,
    options: ScanOptions,
}

impl ContentScanner {
    /// Creates a scanner for the given site root.
    ///
    /// # Errors
    ///
    /// Returns `ScanError::SiteRoot` if `site_root` is not a directory.
    pub fn new(site_root: impl Into<PathBuf>, options: ScanOptions) -> Result<Self, ScanError> {
        let site_root = site_root.into();
        if !site_root.is_dir() {
            return Err(ScanError::SiteRoot(site_root));
        }
        Ok(Self { site_root, options })
    }

    /// The site root all hrefs are relative to.
    #[must_use]
    pub fn site_root(&self) -> &Path {
        &self.site_root
    }

    /// Scans every root in order and returns the resulting tree.
    ///
    /// Roots that do not exist or hold no content produce no section.
    #[must_use]
    pub fn scan(&self, roots: &[ContentRoot]) -> NavigationTree {
        let sections: Vec<Section> = roots.iter().filter_map(|r| self.scan_root(r)).collect();
        info!(
            sections = sections.len(),
            roots = roots.len(),
            "content scan complete"
        );
        NavigationTree::new(sections)
    }

    /// Scans a single root. Returns `None` when it is missing or empty.
    #[must_use]
    pub fn scan_root(&self, root: &ContentRoot) -> Option<Section> {
        let root_path = self.site_root.join(&root.path);
        if !root_path.is_dir() {
            debug!(root = %root.id, path = %root_path.display(), "root not found, skipping");
            return None;
        }

        let mut section = Section {
            id: root.id.clone(),
            title: root.title.clone(),
            chapters: Vec::new(),
            subsections: Vec::new(),
        };

        let nested = root_path.join(&self.options.chapters_dir);
        if nested.is_dir() {
            // Flat root: chapters only, subdirectories are not consulted.
            section.chapters = self.chapters_or_skip(&nested)?;
        } else {
            let listing = match list_dir(&root_path) {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(root = %root.id, path = %root_path.display(), error = %e, "cannot read root, skipping");
                    return None;
                }
            };

            for subdir in &listing.dirs {
                if let Some(sub) = self.scan_subdir(subdir) {
                    section.subsections.push(sub);
                }
            }
            section.chapters = self.chapters_from_files(&listing.files);
        }

        if section.is_empty() {
            debug!(root = %root.id, "root has no content, pruned");
            return None;
        }

        debug!(
            root = %root.id,
            subsections = section.subsections.len(),
            chapters = section.chapters.len(),
            "root scanned"
        );
        Some(section)
    }

    fn scan_subdir(&self, dir: &Path) -> Option<Section> {
        let name = dir.file_name()?.to_string_lossy().into_owned();

        let nested = dir.join(&self.options.chapters_dir);
        let source = if nested.is_dir() { nested } else { dir.to_path_buf() };

        let chapters = self.chapters_or_skip(&source)?;
        if chapters.is_empty() {
            debug!(subdir = %name, "no chapters, pruned");
            return None;
        }

        Some(Section {
            title: derive_title_with(&name, &[] as &[&str]),
            id: name,
            chapters,
            subsections: Vec::new(),
        })
    }

    /// Lists chapters in `dir`, logging and returning `None` on read errors.
    fn chapters_or_skip(&self, dir: &Path) -> Option<Vec<Chapter>> {
        match list_dir(dir) {
            Ok(listing) => Some(self.chapters_from_files(&listing.files)),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "cannot read directory, skipping");
                None
            }
        }
    }

    fn chapters_from_files(&self, files: &[PathBuf]) -> Vec<Chapter> {
        files
            .iter()
            .filter(|f| self.is_chapter_file(f))
            .filter_map(|f| {
                let name = f.file_name()?.to_string_lossy().into_owned();
                let href = self.href_for(f)?;
                Some(Chapter {
                    title: derive_title_with(&name, &self.options.extensions[..]),
                    href,
                })
            })
            .collect()
    }

    fn is_chapter_file(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let recognized = self
            .options
            .extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext));
        let is_index = path
            .file_stem()
            .is_some_and(|stem| stem.eq_ignore_ascii_case(INDEX_STEM));
        recognized && !is_index
    }

    /// `/`-separated path of `file` relative to the site root.
    fn href_for(&self, file: &Path) -> Option<String> {
        let rel = file.strip_prefix(&self.site_root).ok()?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Some(parts.join("/"))
    }
}

/// Sorted directory listing split into subdirectories and files.
#[derive(Debug, Default)]
struct Listing {
    dirs: Vec<PathBuf>,
    files: Vec<PathBuf>,
}

fn list_dir(dir: &Path) -> io::Result<Listing> {
    let mut listing = Listing::default();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            listing.dirs.push(path);
        } else if path.is_file() {
            listing.files.push(path);
        }
    }
    listing.dirs.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    listing.files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(listing)
}
