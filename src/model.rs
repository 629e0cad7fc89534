//! Navigation tree data model.
//!
//! The tree is produced by the scanner at build time and consumed by the
//! menu renderer. Its serialized form is the navigation data the browser
//! loads, so field names here are part of the output contract.

use serde::{Deserialize, Serialize};

/// A configured top-level content directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRoot {
    /// Stable identifier, used as the section id.
    pub id: String,

    /// Display title shown in the menu.
    pub title: String,

    /// Directory path relative to the site root.
    pub path: String,
}

impl ContentRoot {
    /// Creates a root whose path equals its id.
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            path: id.clone(),
            id,
            title: title.into(),
        }
    }
}

/// One content file (menu leaf).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Title derived from the filename.
    pub title: String,

    /// `/`-separated path relative to the site root.
    pub href: String,
}

/// A directory in the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section identifier (root id, or subdirectory name).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Chapters directly inside this section, in filename order.
    #[serde(default)]
    pub chapters: Vec<Chapter>,

    /// Nested sections (one level below a root only).
    #[serde(default)]
    pub subsections: Vec<Section>,
}

impl Section {
    /// Returns `true` if the section holds no chapters and no subsections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty() && self.subsections.is_empty()
    }

    /// Iterates over every chapter in this section, subsections first.
    pub fn all_chapters(&self) -> impl Iterator<Item = &Chapter> + '_ {
        self.subsections
            .iter()
            .flat_map(|s| s.chapters.iter())
            .chain(self.chapters.iter())
    }
}

/// Ordered list of root sections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationTree {
    /// One section per content root that produced content.
    pub sections: Vec<Section>,
}

impl NavigationTree {
    /// Creates a tree from its root sections.
    #[must_use]
    pub const fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    /// Looks up a root section by id.
    #[must_use]
    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    /// Total number of chapters across the whole tree.
    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.sections.iter().map(|s| s.all_chapters().count()).sum()
    }

    /// Returns `true` if no root produced content.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}
