//! Async driver for the navigation menu.
//!
//! Owns the [`Menu`], executes the fetch effects it requests on the tokio
//! runtime, and mirrors expand flags and loaded headings into the
//! preference store. Each completion only touches its own item.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::menu::{Menu, MenuItem, SectionState, ToggleEffect};
use crate::context::{AppContext, Theme};
use crate::error::{FetchError, NavError};
use crate::fetch::PageFetcher;
use crate::headings::{Heading, extract_headings};
use crate::store::{PreferenceStore, keys, load_json, save_json};

/// Stored heading set for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedHeadings {
    /// Always `true` for a completed load.
    pub loaded: bool,
    /// The page's headings.
    pub headings: Vec<Heading>,
}

/// Shared, lock-protected navigation menu with lazy heading loading.
pub struct NavController {
    menu: Mutex<Menu>,
    theme: Theme,
    store: Arc<dyn PreferenceStore>,
    fetcher: Arc<dyn PageFetcher>,
    content_class: String,
    in_flight: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for NavController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavController")
            .field("theme", &self.theme)
            .field("content_class", &self.content_class)
            .finish_non_exhaustive()
    }
}

impl NavController {
    /// Builds the root menu for the context's tree.
    ///
    /// The current page's path starts expanded with `current_headings`.
    /// Stored expand flags then override the default collapsed state of
    /// groups, and cached heading sets mark pages as loaded.
    #[must_use]
    pub fn render_root_menu(
        ctx: &AppContext,
        current_page: Option<&str>,
        current_headings: Vec<Heading>,
        fetcher: Arc<dyn PageFetcher>,
        content_class: &str,
    ) -> Arc<Self> {
        let mut menu = Menu::build(&ctx.tree, current_page, current_headings);
        restore(&mut menu, ctx.store.as_ref());

        Arc::new(Self {
            menu: Mutex::new(menu),
            theme: ctx.theme,
            store: Arc::clone(&ctx.store),
            fetcher,
            content_class: content_class.to_string(),
            in_flight: Mutex::new(Vec::new()),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Menu> {
        self.menu.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Theme the menu was initialised with.
    #[must_use]
    pub const fn theme(&self) -> Theme {
        self.theme
    }

    /// Returns a snapshot of the menu.
    #[must_use]
    pub fn snapshot(&self) -> Menu {
        self.lock().clone()
    }

    /// Observable state of item `id`.
    ///
    /// # Errors
    ///
    /// Returns `NavError::UnknownSection` if no item has that id.
    pub fn state(&self, id: &str) -> Result<SectionState, NavError> {
        self.lock().state(id)
    }

    /// Toggles item `id`, spawning a heading fetch if it needs one.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `NavError::UnknownSection` if no item has that id.
    pub fn toggle(self: &Arc<Self>, id: &str) -> Result<SectionState, NavError> {
        let (effect, state, group) = {
            let mut menu = self.lock();
            let effect = menu.toggle(id)?;
            let group = menu.get(id).is_some_and(MenuItem::is_group);
            (effect, menu.state(id)?, group)
        };
        if group {
            self.persist_expanded(id, state != SectionState::Collapsed);
        }

        if let ToggleEffect::Fetch { id, href } = effect {
            debug!(id = %id, href = %href, "loading headings");
            let this = Arc::clone(self);
            let handle = tokio::spawn(async move {
                let result = this
                    .fetcher
                    .fetch(&href)
                    .await
                    .map(|html| extract_headings(&html, &this.content_class));
                this.complete(&id, &href, result);
            });
            self.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(handle);
        }
        Ok(state)
    }

    fn complete(&self, id: &str, href: &str, result: Result<Vec<Heading>, FetchError>) {
        if let Err(e) = &result {
            warn!(href, error = %e, "failed to load headings");
        }
        let cached = result.as_ref().ok().map(|headings| CachedHeadings {
            loaded: true,
            headings: headings.clone(),
        });

        if !self.lock().finish_load(id, result) {
            debug!(id, "ignoring completion for item not awaiting headings");
            return;
        }
        if let Some(cached) = cached {
            if let Err(e) = save_json(self.store.as_ref(), &keys::headings(href), &cached) {
                warn!(href, error = %e, "failed to cache headings");
            }
        }
    }

    /// Waits for every fetch spawned so far to complete.
    pub async fn settle(&self) {
        loop {
            let handles: Vec<_> = std::mem::take(
                &mut *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner),
            );
            if handles.is_empty() {
                return;
            }
            for handle in handles {
                if let Err(e) = handle.await {
                    warn!(error = %e, "heading fetch task failed");
                }
            }
        }
    }

    /// Expands every item. Starts no fetches.
    pub fn expand_all(&self) {
        let ids = {
            let mut menu = self.lock();
            menu.expand_all();
            group_ids(&menu)
        };
        for id in ids {
            self.persist_expanded(&id, true);
        }
    }

    /// Collapses every item.
    pub fn collapse_all(&self) {
        let ids = {
            let mut menu = self.lock();
            menu.collapse_all();
            group_ids(&menu)
        };
        for id in ids {
            self.persist_expanded(&id, false);
        }
    }

    fn persist_expanded(&self, id: &str, expanded: bool) {
        if let Err(e) = save_json(self.store.as_ref(), &keys::expanded(id), &expanded) {
            warn!(id, error = %e, "failed to store expand state");
        }
    }
}

// Only group expand flags are persisted. A page entry always starts
// collapsed, so its container is never open without headings or a fetch.
fn group_ids(menu: &Menu) -> Vec<String> {
    menu.items()
        .filter(|item| item.is_group())
        .map(|item| item.id.clone())
        .collect()
}

fn restore(menu: &mut Menu, store: &dyn PreferenceStore) {
    let entries: Vec<(String, Option<String>, bool)> = menu
        .items()
        .map(|item| (item.id.clone(), item.href().map(str::to_string), item.current))
        .collect();

    for (id, href, current) in entries {
        if let Some(href) = href {
            if let Some(cached) = load_json::<CachedHeadings>(store, &keys::headings(&href)) {
                if cached.loaded {
                    menu.preload(&id, cached.headings);
                }
            }
            continue;
        }
        // The path to the current page stays open regardless of stored flags.
        if current {
            continue;
        }
        if let Some(expanded) = load_json::<bool>(store, &keys::expanded(&id)) {
            let _ = menu.set_expanded(&id, expanded);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::model::{Chapter, NavigationTree, Section};
    use crate::store::MemoryStore;

    const PAGE: &str = "<main class=\"content\"><h2 id=\"one\">One</h2><h3>Two</h3></main>";

    struct StubFetcher {
        pages: HashMap<String, Result<String, FetchError>>,
        calls: AtomicUsize,
        delay: Duration,
    }

    impl StubFetcher {
        fn new(pages: &[(&str, Result<&str, FetchError>)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(href, r)| ((*href).to_string(), r.clone().map(str::to_string)))
                    .collect(),
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(50),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch(&self, href: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.pages
                .get(href)
                .cloned()
                .unwrap_or(Err(FetchError::Status(404)))
        }
    }

    fn tree() -> NavigationTree {
        NavigationTree::new(vec![Section {
            id: "papers".into(),
            title: "Papers".into(),
            chapters: vec![
                Chapter {
                    title: "A".into(),
                    href: "papers/a.html".into(),
                },
                Chapter {
                    title: "B".into(),
                    href: "papers/b.html".into(),
                },
            ],
            subsections: vec![],
        }])
    }

    fn controller(
        fetcher: Arc<StubFetcher>,
        store: Arc<MemoryStore>,
    ) -> Arc<NavController> {
        let ctx = AppContext::new(tree(), store, Theme::Light);
        NavController::render_root_menu(&ctx, None, vec![], fetcher, "content")
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_toggles_fetch_once() {
        let fetcher = Arc::new(StubFetcher::new(&[("papers/a.html", Ok(PAGE))]));
        let store = Arc::new(MemoryStore::new());
        let nav = controller(Arc::clone(&fetcher), Arc::clone(&store));

        for _ in 0..5 {
            nav.toggle("papers-a-html").unwrap();
        }
        nav.settle().await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(nav.state("papers-a-html").unwrap(), SectionState::ExpandedLoaded);
        let menu = nav.snapshot();
        let headings = menu.get("papers-a-html").unwrap().headings().unwrap();
        assert_eq!(headings.len(), 2);
        assert_eq!(headings[1].id, "two");

        let cached: CachedHeadings =
            load_json(store.as_ref(), &keys::headings("papers/a.html")).unwrap();
        assert!(cached.loaded);
        assert_eq!(load_json::<bool>(store.as_ref(), "nav.expanded.papers-a-html"), None);
    }

    #[tokio::test]
    async fn test_toggling_group_persists_flag() {
        let store = Arc::new(MemoryStore::new());
        let nav = controller(Arc::new(StubFetcher::new(&[])), Arc::clone(&store));

        nav.toggle("papers").unwrap();
        assert_eq!(load_json::<bool>(store.as_ref(), "nav.expanded.papers"), Some(true));
        nav.toggle("papers").unwrap();
        assert_eq!(load_json::<bool>(store.as_ref(), "nav.expanded.papers"), Some(false));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_page_flag_without_cache_starts_collapsed() {
        let store = Arc::new(MemoryStore::new());
        save_json(store.as_ref(), &keys::expanded("papers-b-html"), &true).unwrap();
        let fetcher = Arc::new(StubFetcher::new(&[("papers/b.html", Ok(PAGE))]));

        let nav = controller(Arc::clone(&fetcher), store);
        nav.settle().await;
        assert_eq!(nav.state("papers-b-html").unwrap(), SectionState::Collapsed);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        nav.toggle("papers-b-html").unwrap();
        nav.settle().await;
        assert_eq!(nav.state("papers-b-html").unwrap(), SectionState::ExpandedLoaded);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_fetch_restores_collapsed() {
        let store = Arc::new(MemoryStore::new());
        let nav = controller(Arc::new(StubFetcher::new(&[])), Arc::clone(&store));
        nav.toggle("papers-b-html").unwrap();
        nav.settle().await;
        assert_eq!(nav.state("papers-b-html").unwrap(), SectionState::ExpandedError);

        let reopened = controller(Arc::new(StubFetcher::new(&[])), store);
        assert_eq!(reopened.state("papers-b-html").unwrap(), SectionState::Collapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_then_retry() {
        let fetcher = Arc::new(StubFetcher::new(&[]));
        let nav = controller(Arc::clone(&fetcher), Arc::new(MemoryStore::new()));

        nav.toggle("papers-b-html").unwrap();
        nav.settle().await;
        assert_eq!(nav.state("papers-b-html").unwrap(), SectionState::ExpandedError);

        nav.toggle("papers-b-html").unwrap();
        nav.toggle("papers-b-html").unwrap();
        nav.settle().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_completions_touch_own_items() {
        let fetcher = Arc::new(StubFetcher::new(&[
            ("papers/a.html", Ok(PAGE)),
            ("papers/b.html", Err(FetchError::Timeout(10_000))),
        ]));
        let nav = controller(fetcher, Arc::new(MemoryStore::new()));

        nav.toggle("papers-a-html").unwrap();
        nav.toggle("papers-b-html").unwrap();
        nav.settle().await;

        assert_eq!(nav.state("papers-a-html").unwrap(), SectionState::ExpandedLoaded);
        assert_eq!(nav.state("papers-b-html").unwrap(), SectionState::ExpandedError);
    }

    #[tokio::test]
    async fn test_restores_flags_and_cache() {
        let store = Arc::new(MemoryStore::new());
        save_json(store.as_ref(), &keys::expanded("papers"), &true).unwrap();
        save_json(
            store.as_ref(),
            &keys::headings("papers/a.html"),
            &CachedHeadings {
                loaded: true,
                headings: vec![],
            },
        )
        .unwrap();
        store.set(&keys::expanded("papers-b-html"), "not json").unwrap();

        let fetcher = Arc::new(StubFetcher::new(&[]));
        let nav = controller(Arc::clone(&fetcher), store);

        assert_eq!(nav.state("papers").unwrap(), SectionState::ExpandedLoaded);
        assert_eq!(nav.state("papers-b-html").unwrap(), SectionState::Collapsed);

        nav.toggle("papers-a-html").unwrap();
        nav.settle().await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(nav.state("papers-a-html").unwrap(), SectionState::ExpandedLoaded);
    }

    #[tokio::test]
    async fn test_bulk_operations_persist_without_fetching() {
        let fetcher = Arc::new(StubFetcher::new(&[]));
        let store = Arc::new(MemoryStore::new());
        let nav = controller(Arc::clone(&fetcher), Arc::clone(&store));

        nav.expand_all();
        nav.collapse_all();
        nav.settle().await;

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(load_json::<bool>(store.as_ref(), "nav.expanded.papers"), Some(false));
        assert_eq!(load_json::<bool>(store.as_ref(), "nav.expanded.papers-a-html"), None);
    }

    #[tokio::test]
    async fn test_expand_all_reopens_without_empty_pages() {
        let store = Arc::new(MemoryStore::new());
        let nav = controller(Arc::new(StubFetcher::new(&[])), Arc::clone(&store));
        nav.expand_all();

        let reopened = controller(Arc::new(StubFetcher::new(&[])), store);
        assert_eq!(reopened.state("papers").unwrap(), SectionState::ExpandedLoaded);
        assert_eq!(reopened.state("papers-a-html").unwrap(), SectionState::Collapsed);
    }

    #[tokio::test]
    async fn test_theme_taken_from_context() {
        let store: Arc<dyn PreferenceStore> = Arc::new(MemoryStore::new());
        save_json(store.as_ref(), keys::THEME, "dark").unwrap();
        let ctx = AppContext::new(tree(), store, Theme::Light);

        let nav = NavController::render_root_menu(
            &ctx,
            None,
            vec![],
            Arc::new(StubFetcher::new(&[])),
            "content",
        );
        assert_eq!(nav.theme(), Theme::Dark);
        assert_eq!(nav.state("papers").unwrap(), SectionState::Collapsed);
    }

    #[tokio::test]
    async fn test_unknown_section() {
        let nav = controller(Arc::new(StubFetcher::new(&[])), Arc::new(MemoryStore::new()));
        assert_eq!(
            nav.toggle("missing"),
            Err(NavError::UnknownSection("missing".into()))
        );
    }
}
