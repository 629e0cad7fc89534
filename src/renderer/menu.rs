//! Navigation menu state.
//!
//! The menu is an arena of items: one group per [`Section`] and one page
//! entry per [`Chapter`]. Visibility (`expanded`) and heading load status
//! are tracked separately, so a page can be collapsed while its fetch is
//! still in flight and re-expanding it never starts a second fetch.
//!
//! This module performs no I/O. Toggling a page that needs its headings
//! returns a [`ToggleEffect::Fetch`] for the caller to execute, and the
//! caller reports back through [`Menu::finish_load`].

use std::collections::HashMap;

use crate::error::{FetchError, NavError};
use crate::headings::Heading;
use crate::model::{NavigationTree, Section};
use crate::scanner::slugify;

/// What a menu item represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemKind {
    /// A section or subsection; children are static.
    Group,
    /// A chapter; children are its headings, loaded lazily.
    Page {
        /// Chapter href relative to the site root.
        href: String,
    },
}

/// Heading load status of a page entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Nothing requested yet.
    #[default]
    Unloaded,
    /// A fetch is in flight.
    Loading,
    /// Headings are available.
    Loaded(Vec<Heading>),
    /// The last fetch failed; the next expansion retries.
    Failed(FetchError),
}

/// Observable state of a menu item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionState {
    /// Hidden.
    Collapsed,
    /// Visible, headings not (yet) available.
    ExpandedUnloaded,
    /// Visible with content.
    ExpandedLoaded,
    /// Visible, showing the inline error placeholder.
    ExpandedError,
}

/// Side effect requested by [`Menu::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleEffect {
    /// Nothing to do.
    None,
    /// Fetch the page at `href` and report back for item `id`.
    Fetch {
        /// Menu item id.
        id: String,
        /// Page to fetch.
        href: String,
    },
}

/// A single menu entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    /// Stable item id (also the DOM id prefix).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Group or page.
    pub kind: ItemKind,

    /// Whether the item's container is visible.
    pub expanded: bool,

    /// Heading load status (always `Unloaded` for groups).
    pub load: LoadStatus,

    /// Whether this page is the one being viewed (or a group on its path).
    pub current: bool,

    children: Vec<usize>,
}

impl MenuItem {
    /// Derived observable state.
    #[must_use]
    pub fn state(&self) -> SectionState {
        if !self.expanded {
            return SectionState::Collapsed;
        }
        match (&self.kind, &self.load) {
            (ItemKind::Group, _) | (_, LoadStatus::Loaded(_)) => SectionState::ExpandedLoaded,
            (_, LoadStatus::Failed(_)) => SectionState::ExpandedError,
            _ => SectionState::ExpandedUnloaded,
        }
    }

    /// Whether this is a section or subsection group.
    #[must_use]
    pub const fn is_group(&self) -> bool {
        matches!(self.kind, ItemKind::Group)
    }

    /// Page href, or `None` for groups.
    #[must_use]
    pub fn href(&self) -> Option<&str> {
        match &self.kind {
            ItemKind::Page { href } => Some(href),
            ItemKind::Group => None,
        }
    }

    /// Loaded headings, if any.
    #[must_use]
    pub fn headings(&self) -> Option<&[Heading]> {
        match &self.load {
            LoadStatus::Loaded(headings) => Some(headings),
            _ => None,
        }
    }

    /// DOM id of the item's collapsible container.
    #[must_use]
    pub fn container_id(&self) -> String {
        format!("{}-chapters", self.id)
    }
}

/// The navigation menu.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    items: Vec<MenuItem>,
    index: HashMap<String, usize>,
    roots: Vec<usize>,
}

impl Menu {
    /// Builds the menu for `tree`.
    ///
    /// Every item starts collapsed, except the groups on the path to the
    /// chapter whose href equals `current_page`. That chapter starts
    /// expanded with `current_headings` already loaded.
    #[must_use]
    pub fn build(
        tree: &NavigationTree,
        current_page: Option<&str>,
        current_headings: Vec<Heading>,
    ) -> Self {
        let mut menu = Self::default();
        for section in &tree.sections {
            let root = menu.add_section(section, &section.id);
            menu.roots.push(root);
        }

        if let Some(page) = current_page {
            menu.mark_current(page, current_headings);
        }
        menu
    }

    fn add_section(&mut self, section: &Section, id: &str) -> usize {
        let group = self.push(id, &section.title, ItemKind::Group);

        for sub in &section.subsections {
            let sub_id = format!("{id}-{}", sub.id);
            let child = self.add_section(sub, &sub_id);
            self.items[group].children.push(child);
        }
        for chapter in &section.chapters {
            let child = self.push(
                &slugify(&chapter.href),
                &chapter.title,
                ItemKind::Page {
                    href: chapter.href.clone(),
                },
            );
            self.items[group].children.push(child);
        }
        group
    }

    fn push(&mut self, id: &str, title: &str, kind: ItemKind) -> usize {
        let mut unique = id.to_string();
        let mut n = 2;
        while self.index.contains_key(&unique) {
            unique = format!("{id}-{n}");
            n += 1;
        }

        let idx = self.items.len();
        self.index.insert(unique.clone(), idx);
        self.items.push(MenuItem {
            id: unique,
            title: title.to_string(),
            kind,
            expanded: false,
            load: LoadStatus::Unloaded,
            current: false,
            children: Vec::new(),
        });
        idx
    }

    fn mark_current(&mut self, page: &str, headings: Vec<Heading>) {
        let Some(path) = self.path_to_page(page) else {
            return;
        };
        for &idx in &path {
            self.items[idx].expanded = true;
            self.items[idx].current = true;
        }
        if let Some(&page_idx) = path.last() {
            self.items[page_idx].load = LoadStatus::Loaded(headings);
        }
    }

    fn path_to_page(&self, href: &str) -> Option<Vec<usize>> {
        fn walk(menu: &Menu, idx: usize, href: &str, path: &mut Vec<usize>) -> bool {
            path.push(idx);
            let item = &menu.items[idx];
            if item.href() == Some(href) {
                return true;
            }
            if item.children.iter().any(|&c| walk(menu, c, href, path)) {
                return true;
            }
            path.pop();
            false
        }

        let mut path = Vec::new();
        let found = self.roots.iter().any(|&r| walk(self, r, href, &mut path));
        found.then_some(path)
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&MenuItem> {
        self.index.get(id).map(|&i| &self.items[i])
    }

    /// Finds the page entry for `href`.
    #[must_use]
    pub fn find_page(&self, href: &str) -> Option<&MenuItem> {
        self.items.iter().find(|item| item.href() == Some(href))
    }

    /// Top-level groups in order.
    pub fn roots(&self) -> impl Iterator<Item = &MenuItem> + '_ {
        self.roots.iter().map(|&i| &self.items[i])
    }

    /// Children of `item` in order (subsection groups, then pages).
    pub fn children<'a>(&'a self, item: &'a MenuItem) -> impl Iterator<Item = &'a MenuItem> + 'a {
        item.children.iter().map(|&i| &self.items[i])
    }

    /// All items, depth-first in insertion order.
    pub fn items(&self) -> impl Iterator<Item = &MenuItem> + '_ {
        self.items.iter()
    }

    /// Observable state of item `id`.
    ///
    /// # Errors
    ///
    /// Returns `NavError::UnknownSection` if no item has that id.
    pub fn state(&self, id: &str) -> Result<SectionState, NavError> {
        self.get(id)
            .map(MenuItem::state)
            .ok_or_else(|| NavError::UnknownSection(id.to_string()))
    }

    fn index_of(&self, id: &str) -> Result<usize, NavError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| NavError::UnknownSection(id.to_string()))
    }

    /// Flips the visibility of item `id`.
    ///
    /// Expanding a page whose headings are neither loaded nor loading
    /// marks it `Loading` and returns a fetch effect. Toggles while a
    /// fetch is in flight, or once headings are loaded, never fetch again.
    ///
    /// # Errors
    ///
    /// Returns `NavError::UnknownSection` if no item has that id.
    pub fn toggle(&mut self, id: &str) -> Result<ToggleEffect, NavError> {
        let idx = self.index_of(id)?;
        let item = &mut self.items[idx];
        item.expanded = !item.expanded;

        if !item.expanded {
            return Ok(ToggleEffect::None);
        }
        let ItemKind::Page { href } = &item.kind else {
            return Ok(ToggleEffect::None);
        };
        if !matches!(item.load, LoadStatus::Unloaded | LoadStatus::Failed(_)) {
            return Ok(ToggleEffect::None);
        }
        let effect = ToggleEffect::Fetch {
            id: item.id.clone(),
            href: href.clone(),
        };
        item.load = LoadStatus::Loading;
        Ok(effect)
    }

    /// Sets the visibility of item `id` without starting any fetch.
    ///
    /// # Errors
    ///
    /// Returns `NavError::UnknownSection` if no item has that id.
    pub fn set_expanded(&mut self, id: &str, expanded: bool) -> Result<(), NavError> {
        let idx = self.index_of(id)?;
        self.items[idx].expanded = expanded;
        Ok(())
    }

    /// Marks page `id` as loaded from a cache, without a fetch.
    ///
    /// Items that are not pages, or already have headings, are untouched.
    pub fn preload(&mut self, id: &str, headings: Vec<Heading>) {
        if let Some(&idx) = self.index.get(id) {
            let item = &mut self.items[idx];
            if matches!(item.kind, ItemKind::Page { .. })
                && matches!(item.load, LoadStatus::Unloaded)
            {
                item.load = LoadStatus::Loaded(headings);
            }
        }
    }

    /// Applies a fetch result to item `id`.
    ///
    /// Results for unknown items, or items not waiting on a fetch, are
    /// ignored. Returns `true` if the result was applied.
    pub fn finish_load(&mut self, id: &str, result: Result<Vec<Heading>, FetchError>) -> bool {
        let Some(&idx) = self.index.get(id) else {
            return false;
        };
        let item = &mut self.items[idx];
        if !matches!(item.load, LoadStatus::Loading) {
            return false;
        }
        item.load = match result {
            Ok(headings) => LoadStatus::Loaded(headings),
            Err(e) => LoadStatus::Failed(e),
        };
        true
    }

    /// Expands every group and page entry. Starts no fetches.
    pub fn expand_all(&mut self) {
        self.set_all(true);
    }

    /// Collapses every group and page entry.
    pub fn collapse_all(&mut self) {
        self.set_all(false);
    }

    fn set_all(&mut self, expanded: bool) {
        for item in &mut self.items {
            item.expanded = expanded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Chapter;

    fn chapter(href: &str, title: &str) -> Chapter {
        Chapter {
            title: title.into(),
            href: href.into(),
        }
    }

    fn sample_tree() -> NavigationTree {
        NavigationTree::new(vec![
            Section {
                id: "books".into(),
                title: "📚 Books".into(),
                chapters: vec![],
                subsections: vec![Section {
                    id: "algorithms".into(),
                    title: "Algorithms".into(),
                    chapters: vec![
                        chapter("books/algorithms/chapters/00-prologue.html", "00 Prologue"),
                        chapter(
                            "books/algorithms/chapters/01-algorithms-with-numbers.html",
                            "01 Algorithms With Numbers",
                        ),
                    ],
                    subsections: vec![],
                }],
            },
            Section {
                id: "papers".into(),
                title: "📄 Papers".into(),
                chapters: vec![chapter("papers/attention.html", "Attention")],
                subsections: vec![],
            },
        ])
    }

    const PROLOGUE: &str = "books-algorithms-chapters-00-prologue-html";
    const NUMBERS: &str = "books-algorithms-chapters-01-algorithms-with-numbers-html";

    fn heading(id: &str) -> Heading {
        Heading {
            level: 2,
            id: id.into(),
            text: id.into(),
        }
    }

    #[test]
    fn test_ids_and_default_collapsed() {
        let menu = Menu::build(&sample_tree(), None, vec![]);
        let ids: Vec<_> = menu.items().map(|i| i.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "books",
                "books-algorithms",
                PROLOGUE,
                NUMBERS,
                "papers",
                "papers-attention-html"
            ]
        );
        assert!(menu.items().all(|i| i.state() == SectionState::Collapsed));
    }

    #[test]
    fn test_current_page_path_expanded() {
        let current = "books/algorithms/chapters/00-prologue.html";
        let menu = Menu::build(&sample_tree(), Some(current), vec![heading("intro")]);

        assert_eq!(menu.state("books").unwrap(), SectionState::ExpandedLoaded);
        assert_eq!(menu.state("books-algorithms").unwrap(), SectionState::ExpandedLoaded);
        assert_eq!(menu.state(PROLOGUE).unwrap(), SectionState::ExpandedLoaded);
        assert_eq!(menu.get(PROLOGUE).unwrap().headings().unwrap().len(), 1);
        assert_eq!(menu.state(NUMBERS).unwrap(), SectionState::Collapsed);
        assert_eq!(menu.state("papers").unwrap(), SectionState::Collapsed);
    }

    #[test]
    fn test_single_fetch_per_expansion_cycle() {
        let mut menu = Menu::build(&sample_tree(), None, vec![]);

        let first = menu.toggle(NUMBERS).unwrap();
        assert!(matches!(first, ToggleEffect::Fetch { ref id, .. } if id == NUMBERS));
        assert_eq!(menu.state(NUMBERS).unwrap(), SectionState::ExpandedUnloaded);

        // Collapse and re-expand while the fetch is still in flight.
        assert_eq!(menu.toggle(NUMBERS).unwrap(), ToggleEffect::None);
        assert_eq!(menu.state(NUMBERS).unwrap(), SectionState::Collapsed);
        assert_eq!(menu.toggle(NUMBERS).unwrap(), ToggleEffect::None);

        assert!(menu.finish_load(NUMBERS, Ok(vec![heading("a")])));
        assert_eq!(menu.state(NUMBERS).unwrap(), SectionState::ExpandedLoaded);

        menu.toggle(NUMBERS).unwrap();
        assert_eq!(menu.toggle(NUMBERS).unwrap(), ToggleEffect::None);
    }

    #[test]
    fn test_failure_allows_exactly_one_retry() {
        let mut menu = Menu::build(&sample_tree(), None, vec![]);

        menu.toggle(NUMBERS).unwrap();
        menu.finish_load(NUMBERS, Err(FetchError::Status(500)));
        assert_eq!(menu.state(NUMBERS).unwrap(), SectionState::ExpandedError);

        assert_eq!(menu.toggle(NUMBERS).unwrap(), ToggleEffect::None);
        assert!(matches!(menu.toggle(NUMBERS).unwrap(), ToggleEffect::Fetch { .. }));
        assert_eq!(menu.state(NUMBERS).unwrap(), SectionState::ExpandedUnloaded);

        menu.toggle(NUMBERS).unwrap();
        assert_eq!(menu.toggle(NUMBERS).unwrap(), ToggleEffect::None);
    }

    #[test]
    fn test_current_page_never_fetches() {
        let current = "papers/attention.html";
        let mut menu = Menu::build(&sample_tree(), Some(current), vec![]);
        let id = menu.find_page(current).unwrap().id.clone();

        assert_eq!(menu.toggle(&id).unwrap(), ToggleEffect::None);
        assert_eq!(menu.toggle(&id).unwrap(), ToggleEffect::None);
        assert_eq!(menu.state(&id).unwrap(), SectionState::ExpandedLoaded);
    }

    #[test]
    fn test_groups_never_fetch() {
        let mut menu = Menu::build(&sample_tree(), None, vec![]);
        assert_eq!(menu.toggle("books").unwrap(), ToggleEffect::None);
        assert_eq!(menu.state("books").unwrap(), SectionState::ExpandedLoaded);
    }

    #[test]
    fn test_unknown_ids() {
        let mut menu = Menu::build(&sample_tree(), None, vec![]);
        assert_eq!(
            menu.toggle("nope"),
            Err(NavError::UnknownSection("nope".into()))
        );
        assert!(!menu.finish_load("nope", Ok(vec![])));
    }

    #[test]
    fn test_stale_completion_ignored() {
        let mut menu = Menu::build(&sample_tree(), None, vec![]);
        assert!(!menu.finish_load(NUMBERS, Ok(vec![heading("x")])));
        assert_eq!(menu.get(NUMBERS).unwrap().load, LoadStatus::Unloaded);
    }

    #[test]
    fn test_bulk_operations_start_no_fetches() {
        let mut menu = Menu::build(&sample_tree(), None, vec![]);
        menu.expand_all();
        assert!(menu.items().all(|i| i.expanded));
        assert!(menu.items().all(|i| i.load == LoadStatus::Unloaded));

        menu.collapse_all();
        assert!(menu.items().all(|i| i.state() == SectionState::Collapsed));
    }

    #[test]
    fn test_preload_marks_loaded() {
        let mut menu = Menu::build(&sample_tree(), None, vec![]);
        menu.preload(NUMBERS, vec![heading("cached")]);
        assert_eq!(menu.toggle(NUMBERS).unwrap(), ToggleEffect::None);
        assert_eq!(menu.state(NUMBERS).unwrap(), SectionState::ExpandedLoaded);
    }

    #[test]
    fn test_duplicate_slugs_get_suffix() {
        let tree = NavigationTree::new(vec![Section {
            id: "papers".into(),
            title: "Papers".into(),
            chapters: vec![chapter("papers/a_b.html", "A B"), chapter("papers/a-b.html", "A B")],
            subsections: vec![],
        }]);
        let menu = Menu::build(&tree, None, vec![]);
        assert!(menu.get("papers-a-b-html").is_some());
        assert!(menu.get("papers-a-b-html-2").is_some());
    }
}
