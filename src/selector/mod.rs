use futures::stream::{self, StreamExt};
use tracing::debug;

use crate::api::{page_count, PageResult, Record};
use crate::fetcher::{FetchError, PageFetcher};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionRun {
    pub records: Vec<Record>,
    pub pages_fetched: Vec<usize>,
    pub failed_pages: Vec<usize>,
}

impl SelectionRun {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_short(&self, requested: usize) -> bool {
        self.records.len() < requested
    }
}

struct Accumulator {
    run: SelectionRun,
    remaining: usize,
}

impl Accumulator {
    fn start(n: usize, current: &PageResult) -> Self {
        let take = n.min(current.records.len());
        Self {
            run: SelectionRun {
                records: current.records[..take].to_vec(),
                ..SelectionRun::default()
            },
            remaining: n - take,
        }
    }

    fn absorb(&mut self, page: usize, result: Result<PageResult, FetchError>) {
        self.run.pages_fetched.push(page);
        match result {
            Ok(fetched) => {
                let take = self.remaining.min(fetched.records.len());
                self.run
                    .records
                    .extend(fetched.records.into_iter().take(take));
                self.remaining -= take;
                debug!(page, taken = take, remaining = self.remaining, "absorbed page");
            }
            Err(error) => {
                debug!(page, %error, "error fetching next page");
                self.run.failed_pages.push(page);
            }
        }
    }
}

/// Sequential: one fetch at a time, from the page after `page_index`.
pub async fn select_first_n<F: PageFetcher>(
    n: usize,
    current: &PageResult,
    page_index: usize,
    page_size: usize,
    total: usize,
    fetcher: &F,
) -> SelectionRun {
    if n == 0 || page_size == 0 {
        return SelectionRun::default();
    }
    let mut acc = Accumulator::start(n, current);
    let last_page = page_count(total, page_size);
    let mut next = page_index.saturating_add(1);

    while acc.remaining > 0 && next <= last_page {
        let result = fetcher.fetch(next).await;
        acc.absorb(next, result);
        next += 1;
    }
    acc.run
}

/// Fetches up to `window` still-needed pages at once, consuming them in page order.
pub async fn select_first_n_prefetch<F: PageFetcher>(
    n: usize,
    current: &PageResult,
    page_index: usize,
    page_size: usize,
    total: usize,
    fetcher: &F,
    window: usize,
) -> SelectionRun {
    if window <= 1 {
        return select_first_n(n, current, page_index, page_size, total, fetcher).await;
    }
    if n == 0 || page_size == 0 {
        return SelectionRun::default();
    }
    let mut acc = Accumulator::start(n, current);
    let last_page = page_count(total, page_size);
    let mut next = page_index.saturating_add(1);

    while acc.remaining > 0 && next <= last_page {
        let needed = acc.remaining.div_ceil(page_size).min(window);
        let batch_end = last_page.min(next + needed - 1);
        debug!(from = next, to = batch_end, "prefetching pages");

        let results: Vec<(usize, Result<PageResult, FetchError>)> = stream::iter(next..=batch_end)
            .map(move |page| async move { (page, fetcher.fetch(page).await) })
            .buffered(needed)
            .collect()
            .await;

        for (page, result) in results {
            acc.absorb(page, result);
        }
        next = batch_end + 1;
    }
    acc.run
}
