use thiserror::Error;
use tracing::{debug, info};

use crate::api::{PageResult, DEFAULT_BASE_URL, PAGE_SIZE};
use crate::fetcher::{ClientError, FetchError, FetcherOptions, HttpPageFetcher, PageFetcher};
use crate::selector::{self, SelectionRun};
use crate::session::{Navigation, ViewState};

pub const MAX_PREFETCH: usize = 16;

#[derive(Clone, Debug)]
pub struct Options {
    pub base_url: String,
    pub start_page: usize,
    pub rate: Option<u32>,
    pub timeout_seconds: Option<u64>,
    pub proxy: Option<String>,
    /// Pages a select-N run may request at once; 1 keeps it sequential.
    pub prefetch: usize,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_page: 1,
            rate: None,
            timeout_seconds: None,
            proxy: None,
            prefetch: 1,
        }
    }
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid start page {value}, pages start at 1")]
    InvalidStartPage { value: usize },

    #[error("invalid prefetch window {value}, expected 1 to 16")]
    InvalidPrefetch { value: usize },

    #[error("page {page} is out of range (1-{last})")]
    PageOutOfRange { page: usize, last: usize },

    #[error("cannot select {requested} rows, expected 1 to {total}")]
    SelectCountOutOfRange { requested: usize, total: usize },
}

/// Owns the fetcher and the view state and runs every operation the table
/// offers against them.
#[derive(Debug)]
pub struct Viewer<F = HttpPageFetcher> {
    fetcher: F,
    state: ViewState,
    start_page: usize,
    prefetch: usize,
}

impl Viewer<HttpPageFetcher> {
    pub fn new(options: Options) -> Result<Self, ViewerError> {
        validate_options(&options)?;
        let fetcher = HttpPageFetcher::new(&FetcherOptions {
            base_url: options.base_url.clone(),
            page_size: PAGE_SIZE,
            rate: options.rate,
            timeout_seconds: options.timeout_seconds,
            proxy: options.proxy.clone(),
            system_proxy: true,
        })?;
        Ok(Self {
            fetcher,
            state: ViewState::new(PAGE_SIZE),
            start_page: options.start_page,
            prefetch: options.prefetch,
        })
    }
}

impl<F: PageFetcher> Viewer<F> {
    pub fn with_fetcher(fetcher: F, options: &Options) -> Result<Self, ViewerError> {
        validate_options(options)?;
        Ok(Self {
            fetcher,
            state: ViewState::new(PAGE_SIZE),
            start_page: options.start_page,
            prefetch: options.prefetch,
        })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Row toggles, header toggle, clear and sort go straight to the state.
    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Loads the configured start page.
    pub async fn open(&mut self) -> Result<usize, ViewerError> {
        self.load_page(self.start_page).await
    }

    /// Loads `page` and returns how many rows it holds. A failed fetch still
    /// leaves the view on `page`, empty and with the previous total, before the
    /// error is returned.
    pub async fn load_page(&mut self, page: usize) -> Result<usize, ViewerError> {
        let token = self.state.begin_page_request();
        match self.fetcher.fetch(page).await {
            Ok(result) => {
                let rows = result.records.len();
                if !self.state.apply_page(token, page, result) {
                    debug!(page, "page result superseded");
                }
                Ok(rows)
            }
            Err(error) => {
                debug!(page, %error, "error fetching data");
                let total = self.state.total();
                if !self.state.apply_page(token, page, PageResult::empty(total)) {
                    debug!(page, "page result superseded");
                }
                Err(error.into())
            }
        }
    }

    pub async fn navigate(&mut self, nav: Navigation) -> Result<usize, ViewerError> {
        match self.state.resolve(nav) {
            Some(page) => self.load_page(page).await,
            None => {
                let current = self.state.page();
                let page = match nav {
                    Navigation::Next => current.saturating_add(1),
                    Navigation::Previous => current.saturating_sub(1),
                    Navigation::Goto(page) => page,
                };
                Err(ViewerError::PageOutOfRange {
                    page,
                    last: self.state.last_page().max(1),
                })
            }
        }
    }

    pub async fn refresh(&mut self) -> Result<usize, ViewerError> {
        self.load_page(self.state.page()).await
    }

    /// Replaces the selection with the first `n` rows counted from the front
    /// of the displayed page. `n` must lie in `1..=total`.
    pub async fn select_first_n(&mut self, n: usize) -> Result<SelectionRun, ViewerError> {
        let total = self.state.total();
        if n == 0 || n > total {
            return Err(ViewerError::SelectCountOutOfRange {
                requested: n,
                total,
            });
        }
        let token = self.state.begin_selection_request();
        let current = self.state.current_page();
        let run = selector::select_first_n_prefetch(
            n,
            &current,
            self.state.page(),
            self.state.page_size(),
            total,
            &self.fetcher,
            self.prefetch,
        )
        .await;
        if !self.state.apply_selection(token, run.records.clone()) {
            debug!(requested = n, "selection result superseded");
        }
        info!(
            requested = n,
            selected = run.len(),
            pages = run.pages_fetched.len(),
            failed = run.failed_pages.len(),
            "selection replaced"
        );
        Ok(run)
    }
}

fn validate_options(options: &Options) -> Result<(), ViewerError> {
    if options.start_page == 0 {
        return Err(ViewerError::InvalidStartPage { value: 0 });
    }
    if options.prefetch == 0 || options.prefetch > MAX_PREFETCH {
        return Err(ViewerError::InvalidPrefetch {
            value: options.prefetch,
        });
    }
    Ok(())
}
