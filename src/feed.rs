use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex},
};

use crate::{
    models::{CategoryFilter, ConfessionRecord, SortOption},
    utils::escape_markdown,
};

/// Everything the feed view lets the user choose.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    pub category: CategoryFilter,
    pub search: String,
    pub sort: SortOption,
}

impl FeedQuery {
    pub fn trimmed_search(&self) -> &str {
        self.search.trim()
    }

    pub fn is_searching(&self) -> bool {
        !self.trimmed_search().is_empty()
    }
}

/// Search only looks at the category label, matching it by prefix.
fn matches_search(record: &ConfessionRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    record
        .category
        .label()
        .to_lowercase()
        .starts_with(&query.to_lowercase())
}

/// Filters by category, then by search query, then sorts by creation time.
/// Equal timestamps keep their input order.
pub fn filter_feed<'a>(
    records: &'a [ConfessionRecord],
    query: &FeedQuery,
) -> Vec<&'a ConfessionRecord> {
    let search = query.trimmed_search();

    let mut view: Vec<&ConfessionRecord> = records
        .iter()
        .filter(|r| query.category.matches(r.category))
        .filter(|r| matches_search(r, search))
        .collect();

    match query.sort {
        SortOption::Newest => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortOption::Oldest => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
    }

    view
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub title: &'static str,
    pub body: String,
}

impl EmptyState {
    pub fn for_query(query: &FeedQuery) -> Self {
        let body = if query.is_searching() {
            format!(
                "No results for \"{}\". Try different keywords.",
                escape_markdown(&query.search)
            )
        } else {
            "Try adjusting your filters.".to_string()
        };

        Self {
            title: "No secrets found 🕵️‍♂️",
            body,
        }
    }
}

/// Result count line shown above the cards while a search is active.
pub fn search_summary(query: &FeedQuery, count: usize) -> Option<String> {
    if !query.is_searching() {
        return None;
    }
    Some(format!(
        "🔍 **{}** result{} for *\"{}\"*",
        count,
        if count == 1 { "" } else { "s" },
        escape_markdown(&query.search)
    ))
}

/// One page of the pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub index: usize,
    pub total_pages: usize,
}

impl<T> Page<'_, T> {
    pub fn has_previous(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total_pages
    }
}

/// Returns the requested page, clamped into range. An empty input is a single empty page.
pub fn paginate<T>(items: &[T], page_size: usize, page: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let index = page.min(total_pages - 1);
    let start = (index * page_size).min(items.len());
    let end = (start + page_size).min(items.len());

    Page {
        items: &items[start..end],
        index,
        total_pages,
    }
}

/// Open/closed state of the category and sort menus. At most one is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectorState {
    category_open: bool,
    sort_open: bool,
}

impl SelectorState {
    pub fn is_category_open(&self) -> bool {
        self.category_open
    }

    pub fn is_sort_open(&self) -> bool {
        self.sort_open
    }

    pub fn toggle_category(&mut self) {
        self.category_open = !self.category_open;
        if self.category_open {
            self.sort_open = false;
        }
    }

    pub fn toggle_sort(&mut self) {
        self.sort_open = !self.sort_open;
        if self.sort_open {
            self.category_open = false;
        }
    }

    pub fn select_category(&mut self, query: &mut FeedQuery, category: CategoryFilter) {
        query.category = category;
        self.category_open = false;
    }

    pub fn select_sort(&mut self, query: &mut FeedQuery, sort: SortOption) {
        query.sort = sort;
        self.sort_open = false;
    }
}

/// Registry of live interactive views, keyed by owner. Each owner has at most
/// one current view; acquiring again hands the registration to the new view.
#[derive(Debug)]
pub struct ActiveViews<K> {
    live: Arc<Mutex<Registry<K>>>,
}

#[derive(Debug)]
struct Registry<K> {
    current: HashMap<K, u64>,
    next_generation: u64,
}

impl<K> Default for ActiveViews<K> {
    fn default() -> Self {
        Self {
            live: Arc::new(Mutex::new(Registry {
                current: HashMap::new(),
                next_generation: 0,
            })),
        }
    }
}

impl<K> Clone for ActiveViews<K> {
    fn clone(&self) -> Self {
        Self {
            live: Arc::clone(&self.live),
        }
    }
}

impl<K: Eq + Hash + Clone> ActiveViews<K> {
    /// Registers a new view for `owner`, replacing any view it already had.
    pub fn acquire(&self, owner: K) -> ViewGuard<K> {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        live.next_generation += 1;
        let generation = live.next_generation;
        let replaced = live.current.insert(owner.clone(), generation).is_some();

        ViewGuard {
            owner,
            generation,
            replaced,
            live: Arc::clone(&self.live),
        }
    }

    pub fn is_active(&self, owner: &K) -> bool {
        self.live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .current
            .contains_key(owner)
    }
}

/// One view's registration. Dropping it releases the owner, unless a newer
/// view has taken over in the meantime.
#[derive(Debug)]
pub struct ViewGuard<K: Eq + Hash> {
    owner: K,
    generation: u64,
    replaced: bool,
    live: Arc<Mutex<Registry<K>>>,
}

impl<K: Eq + Hash> ViewGuard<K> {
    /// Whether this view is still the owner's current one.
    pub fn is_current(&self) -> bool {
        let live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        live.current.get(&self.owner) == Some(&self.generation)
    }

    /// Whether acquiring this view took over an older one.
    pub fn replaced_previous(&self) -> bool {
        self.replaced
    }
}

impl<K: Eq + Hash> Drop for ViewGuard<K> {
    fn drop(&mut self) {
        let mut live = self.live.lock().unwrap_or_else(|e| e.into_inner());
        if live.current.get(&self.owner) == Some(&self.generation) {
            live.current.remove(&self.owner);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use chrono::{DateTime, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn record(id: &str, category: Category, secs: i64) -> ConfessionRecord {
        ConfessionRecord {
            id: id.to_string(),
            content: format!("confession number {}", id),
            category,
            hashtags: vec!["secret".to_string()],
            secret_code: "1234".to_string(),
            created_at: at(secs),
            reactions: Default::default(),
        }
    }

    fn ids(view: &[&ConfessionRecord]) -> Vec<String> {
        view.iter().map(|r| r.id.clone()).collect()
    }

    #[test]
    fn test_category_filter() {
        let records = vec![
            record("g", Category::General, 1),
            record("s", Category::Study, 2),
            record("c", Category::Crush, 3),
        ];
        let query = FeedQuery {
            category: CategoryFilter::Only(Category::Study),
            ..Default::default()
        };

        assert_eq!(ids(&filter_feed(&records, &query)), vec!["s"]);
    }

    #[test]
    fn test_all_keeps_every_category() {
        let records = vec![
            record("g", Category::General, 1),
            record("s", Category::Study, 2),
        ];
        assert_eq!(filter_feed(&records, &FeedQuery::default()).len(), 2);
    }

    #[test]
    fn test_search_matches_category_prefix_only() {
        let records = vec![
            record("g", Category::General, 1),
            record("s", Category::Study, 2),
        ];
        let query = FeedQuery {
            search: "  STU ".to_string(),
            ..Default::default()
        };

        assert_eq!(ids(&filter_feed(&records, &query)), vec!["s"]);

        // Content is never searched.
        let query = FeedQuery {
            search: "confession".to_string(),
            ..Default::default()
        };
        assert!(filter_feed(&records, &query).is_empty());
    }

    #[test]
    fn test_sort_newest_and_oldest() {
        let records = vec![
            record("t1", Category::General, 1),
            record("t2", Category::General, 3),
            record("t3", Category::General, 2),
        ];

        let newest = FeedQuery::default();
        assert_eq!(ids(&filter_feed(&records, &newest)), vec!["t2", "t3", "t1"]);

        let oldest = FeedQuery {
            sort: SortOption::Oldest,
            ..Default::default()
        };
        assert_eq!(ids(&filter_feed(&records, &oldest)), vec!["t1", "t3", "t2"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_timestamps() {
        let records = vec![
            record("a", Category::Funny, 5),
            record("b", Category::Rant, 5),
            record("c", Category::Study, 5),
        ];
        for sort in SortOption::ALL {
            let query = FeedQuery {
                sort,
                ..Default::default()
            };
            assert_eq!(ids(&filter_feed(&records, &query)), vec!["a", "b", "c"]);
        }
    }

    #[test]
    fn test_pipeline_is_idempotent_and_pure() {
        let records = vec![
            record("t1", Category::Crush, 1),
            record("t2", Category::Study, 3),
            record("t3", Category::Crush, 2),
        ];
        let before = records.clone();
        let query = FeedQuery {
            category: CategoryFilter::Only(Category::Crush),
            search: "cr".to_string(),
            sort: SortOption::Oldest,
        };

        let first = ids(&filter_feed(&records, &query));
        let second = ids(&filter_feed(&records, &query));

        assert_eq!(first, second);
        assert_eq!(records, before);
    }

    #[test]
    fn test_empty_category_triggers_empty_state() {
        let records = vec![record("g", Category::General, 1)];
        let query = FeedQuery {
            category: CategoryFilter::Only(Category::Rant),
            ..Default::default()
        };

        assert!(filter_feed(&records, &query).is_empty());
        assert_eq!(
            EmptyState::for_query(&query).body,
            "Try adjusting your filters."
        );
    }

    #[test]
    fn test_empty_state_mentions_search() {
        let query = FeedQuery {
            search: "xyz".to_string(),
            ..Default::default()
        };
        assert_eq!(
            EmptyState::for_query(&query).body,
            "No results for \"xyz\". Try different keywords."
        );
    }

    #[test]
    fn test_search_summary() {
        let mut query = FeedQuery::default();
        assert_eq!(search_summary(&query, 3), None);

        query.search = "fun".to_string();
        assert_eq!(
            search_summary(&query, 1).as_deref(),
            Some("🔍 **1** result for *\"fun\"*")
        );
        assert_eq!(
            search_summary(&query, 0).as_deref(),
            Some("🔍 **0** results for *\"fun\"*")
        );
    }

    #[test]
    fn test_paginate_clamps() {
        let items = [1, 2, 3, 4, 5, 6, 7];

        let first = paginate(&items, 3, 0);
        assert_eq!(first.items, &[1, 2, 3]);
        assert!(!first.has_previous());
        assert!(first.has_next());

        let last = paginate(&items, 3, 99);
        assert_eq!(last.index, 2);
        assert_eq!(last.items, &[7]);
        assert!(!last.has_next());

        let empty: [i32; 0] = [];
        let page = paginate(&empty, 3, 4);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_selector_menus_are_exclusive() {
        let mut selector = SelectorState::default();
        let mut query = FeedQuery::default();

        selector.toggle_category();
        assert!(selector.is_category_open());
        selector.toggle_sort();
        assert!(selector.is_sort_open());
        assert!(!selector.is_category_open());

        selector.select_sort(&mut query, SortOption::Oldest);
        assert_eq!(query.sort, SortOption::Oldest);
        assert!(!selector.is_sort_open());

        selector.toggle_category();
        selector.select_category(&mut query, CategoryFilter::Only(Category::Funny));
        assert_eq!(query.category, CategoryFilter::Only(Category::Funny));
        assert!(!selector.is_category_open());

        selector.toggle_sort();
        selector.toggle_sort();
        assert_eq!(selector, SelectorState::default());
    }

    #[test]
    fn test_view_guard_releases_on_drop() {
        let views = ActiveViews::default();

        let guard = views.acquire(42u64);
        assert!(views.is_active(&42));
        assert!(guard.is_current());
        assert!(!guard.replaced_previous());
        assert!(!views.is_active(&7));

        drop(guard);
        assert!(!views.is_active(&42));
    }

    #[test]
    fn test_new_view_takes_over_old_one() {
        let views = ActiveViews::default();

        let old = views.acquire(42u64);
        let new = views.acquire(42u64);
        assert!(new.replaced_previous());
        assert!(new.is_current());
        assert!(!old.is_current());

        // The stale view closing must not release the newer one
        drop(old);
        assert!(views.is_active(&42));
        assert!(new.is_current());

        drop(new);
        assert!(!views.is_active(&42));
        assert!(!views.acquire(42).replaced_previous());
    }

    #[test]
    fn test_views_of_other_owners_are_independent() {
        let views = ActiveViews::default();
        let mine = views.acquire(1u64);
        let theirs = views.acquire(2u64);
        assert!(!theirs.replaced_previous());
        assert!(mine.is_current());

        drop(theirs);
        assert!(views.is_active(&1));
    }

    #[test]
    fn test_search_text_is_escaped() {
        let query = FeedQuery {
            search: "a*b".to_string(),
            ..Default::default()
        };
        let summary = search_summary(&query, 0).unwrap();
        assert!(summary.contains("a\\*b"));
        assert!(!summary.contains("a*b"));
        assert!(!EmptyState::for_query(&query).body.contains("a*b"));
    }
}
