//! Paging configuration.

/// How many pages the initial load spans by default.
const DEFAULT_INITIAL_PAGE_MULTIPLIER: usize = 3;

/// Tuning knobs for a paged list.
///
/// Defaults follow the original library: prefetch distance equals the page
/// size and the initial load spans three pages so the first viewport has
/// content on both sides.
#[derive(Clone, Debug)]
pub struct PagingConfig {
    /// Number of items requested per prepend/append load.
    pub page_size: usize,
    /// Distance from a loaded edge, in items, at which the next load is
    /// scheduled.
    pub prefetch_distance: usize,
    /// Number of items requested by the initial refresh load.
    pub initial_load_size: usize,
    /// Upper bound on loaded items. When exceeded, whole pages are dropped
    /// from the end opposite to the current access direction. `None`
    /// disables dropping.
    pub max_size: Option<usize>,
    /// Whether unloaded positions with a known count are presented as
    /// placeholder slots. When disabled, counts reported by the source are
    /// ignored for the generation's lifetime.
    pub placeholders_enabled: bool,
}

impl PagingConfig {
    /// Creates a config with defaults derived from `page_size`.
    ///
    /// # Panics
    ///
    /// Panics if `page_size` is zero.
    pub fn new(page_size: usize) -> Self {
        assert!(page_size > 0, "page_size must be positive");
        Self {
            page_size,
            prefetch_distance: page_size,
            initial_load_size: page_size * DEFAULT_INITIAL_PAGE_MULTIPLIER,
            max_size: None,
            placeholders_enabled: true,
        }
    }

    pub fn with_prefetch_distance(mut self, prefetch_distance: usize) -> Self {
        self.prefetch_distance = prefetch_distance;
        self
    }

    pub fn with_initial_load_size(mut self, initial_load_size: usize) -> Self {
        assert!(initial_load_size > 0, "initial_load_size must be positive");
        self.initial_load_size = initial_load_size;
        self
    }

    /// Bounds loaded items to `max_size`.
    ///
    /// # Panics
    ///
    /// Panics if the bound is too tight to hold a full page plus prefetch
    /// slack on both sides (`page_size + 2 * prefetch_distance`), which
    /// would make the coordinator drop pages it is about to need.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        assert!(
            max_size >= self.page_size + 2 * self.prefetch_distance,
            "max_size {} too small for page_size {} and prefetch_distance {}",
            max_size,
            self.page_size,
            self.prefetch_distance,
        );
        self.max_size = Some(max_size);
        self
    }

    pub fn without_placeholders(mut self) -> Self {
        self.placeholders_enabled = false;
        self
    }
}
