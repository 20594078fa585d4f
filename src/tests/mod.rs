use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::api::{PageResult, Record, PAGE_SIZE};
use crate::fetcher::{fetch_or_empty, FetchError, FetcherOptions, HttpPageFetcher, PageFetcher};
use crate::selector::select_first_n;

pub(crate) fn record(id: u64) -> Record {
    Record {
        id,
        title: format!("Artwork {id}"),
        place_of_origin: "France".to_string(),
        artist_display: format!("Artist {id}"),
        inscriptions: String::new(),
        date_start: "1900".to_string(),
        date_end: "1901".to_string(),
    }
}

pub(crate) fn records(first_id: u64, count: usize) -> Vec<Record> {
    (first_id..first_id + count as u64).map(record).collect()
}

/// In-memory dataset of `total` rows with ids `1..=total`, split into pages.
#[derive(Debug, Default)]
pub(crate) struct ScriptedFetcher {
    total: usize,
    page_size: usize,
    failing: HashSet<usize>,
    overrides: HashMap<usize, Vec<Record>>,
    calls: Mutex<Vec<usize>>,
}

impl ScriptedFetcher {
    pub(crate) fn full(total: usize, page_size: usize) -> Self {
        Self {
            total,
            page_size,
            ..Self::default()
        }
    }

    pub(crate) fn failing(mut self, page: usize) -> Self {
        self.failing.insert(page);
        self
    }

    pub(crate) fn with_page(mut self, page: usize, rows: Vec<Record>) -> Self {
        self.overrides.insert(page, rows);
        self
    }

    pub(crate) fn calls(&self) -> Vec<usize> {
        self.calls.lock().unwrap().clone()
    }
}

impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, page: usize) -> Result<PageResult, FetchError> {
        self.calls.lock().unwrap().push(page);
        if page == 0 {
            return Err(FetchError::InvalidPage { page });
        }
        if self.failing.contains(&page) {
            return Err(FetchError::Status { page, status: 503 });
        }
        if let Some(rows) = self.overrides.get(&page) {
            return Ok(PageResult {
                records: rows.clone(),
                total: self.total,
            });
        }
        let first = (page - 1) * self.page_size;
        let count = self.page_size.min(self.total.saturating_sub(first));
        Ok(PageResult {
            records: records(first as u64 + 1, count),
            total: self.total,
        })
    }
}

fn ids(rows: &[Record]) -> Vec<u64> {
    rows.iter().map(|r| r.id).collect()
}

#[tokio::test]
async fn scenario_a_takes_from_current_page_only() {
    let fetcher = ScriptedFetcher::full(126, PAGE_SIZE);
    let current = PageResult {
        records: records(1, 12),
        total: 126,
    };
    let run = select_first_n(5, &current, 1, PAGE_SIZE, 126, &fetcher).await;
    assert_eq!(ids(&run.records), vec![1, 2, 3, 4, 5]);
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn scenario_b_spills_into_next_page() {
    let fetcher = ScriptedFetcher::full(24, PAGE_SIZE);
    let current = PageResult {
        records: records(1, 12),
        total: 24,
    };
    let run = select_first_n(15, &current, 1, PAGE_SIZE, 24, &fetcher).await;
    assert_eq!(ids(&run.records), (1..=15).collect::<Vec<u64>>());
    assert_eq!(fetcher.calls(), vec![2]);
}

#[tokio::test]
async fn scenario_c_stops_at_last_page() {
    let fetcher = ScriptedFetcher::full(20, PAGE_SIZE);
    let current = PageResult {
        records: records(13, 8),
        total: 20,
    };
    let run = select_first_n(100, &current, 2, PAGE_SIZE, 20, &fetcher).await;
    assert_eq!(run.len(), 8);
    assert!(run.failed_pages.is_empty());
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn scenario_d_failure_returns_empty_page_and_keeps_total() {
    let fetcher = ScriptedFetcher::full(40, PAGE_SIZE).failing(2);
    let page = fetch_or_empty(&fetcher, 2, 40).await;
    assert!(page.records.is_empty());
    assert_eq!(page.total, 40);

    let initial = fetch_or_empty(&fetcher, 2, 0).await;
    assert_eq!(initial, PageResult::empty(0));
}

#[tokio::test]
async fn zero_count_is_empty_without_fetching() {
    let fetcher = ScriptedFetcher::full(50, PAGE_SIZE);
    let current = PageResult {
        records: records(1, 12),
        total: 50,
    };
    let run = select_first_n(0, &current, 1, PAGE_SIZE, 50, &fetcher).await;
    assert!(run.is_empty());
    assert!(fetcher.calls().is_empty());
}

#[tokio::test]
async fn count_above_total_returns_whole_dataset() {
    let fetcher = ScriptedFetcher::full(30, PAGE_SIZE);
    let current = PageResult {
        records: records(1, 12),
        total: 30,
    };
    let run = select_first_n(1_000, &current, 1, PAGE_SIZE, 30, &fetcher).await;
    assert_eq!(ids(&run.records), (1..=30).collect::<Vec<u64>>());
    assert_eq!(fetcher.calls(), vec![2, 3]);
}

#[tokio::test]
async fn length_is_min_of_count_and_total_from_first_page() {
    for total in [0usize, 1, 12, 13, 47] {
        for n in [1usize, 5, 12, 13, 24, 60] {
            let fetcher = ScriptedFetcher::full(total, PAGE_SIZE);
            let current = fetcher.fetch(1).await.unwrap();
            let run = select_first_n(n, &current, 1, PAGE_SIZE, total, &fetcher).await;
            assert_eq!(run.len(), n.min(total), "n={n} total={total}");
        }
    }
}

#[tokio::test]
async fn no_fetch_when_current_page_suffices() {
    for n in 1..=12 {
        let fetcher = ScriptedFetcher::full(100, PAGE_SIZE);
        let current = PageResult {
            records: records(1, 12),
            total: 100,
        };
        select_first_n(n, &current, 1, PAGE_SIZE, 100, &fetcher).await;
        assert!(fetcher.calls().is_empty(), "n={n}");
    }
}

#[tokio::test]
async fn repeated_runs_are_identical() {
    let fetcher = ScriptedFetcher::full(80, PAGE_SIZE);
    let current = PageResult {
        records: records(25, 12),
        total: 80,
    };
    let a = select_first_n(31, &current, 3, PAGE_SIZE, 80, &fetcher).await;
    let b = select_first_n(31, &current, 3, PAGE_SIZE, 80, &fetcher).await;
    assert_eq!(a, b);
    assert_eq!(ids(&a.records), (25..=55).collect::<Vec<u64>>());
}

#[tokio::test]
async fn empty_current_page_starts_at_following_page() {
    let fetcher = ScriptedFetcher::full(60, PAGE_SIZE);
    let current = PageResult::empty(60);
    let run = select_first_n(3, &current, 2, PAGE_SIZE, 60, &fetcher).await;
    assert_eq!(fetcher.calls(), vec![3]);
    assert_eq!(ids(&run.records), vec![25, 26, 27]);
}

#[tokio::test]
async fn short_pages_keep_the_loop_going() {
    let fetcher = ScriptedFetcher::full(48, PAGE_SIZE).with_page(2, records(500, 2));
    let current = PageResult {
        records: records(1, 12),
        total: 48,
    };
    let run = select_first_n(20, &current, 1, PAGE_SIZE, 48, &fetcher).await;
    assert_eq!(run.len(), 20);
    assert_eq!(fetcher.calls(), vec![2, 3]);
    assert_eq!(&ids(&run.records)[12..14], &[500, 501]);
}

/// Serves canned HTTP responses, one per connection, and records each
/// request line.
async fn serve(responses: Vec<(u16, String)>) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    tokio::spawn(async move {
        let mut queue = responses.into_iter();
        let mut last: Option<(u16, String)> = None;
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut chunk).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => buf.extend_from_slice(&chunk[..n]),
                }
            }
            let request = String::from_utf8_lossy(&buf);
            let line = request.lines().next().unwrap_or_default().to_string();
            log.lock().unwrap().push(line);

            if let Some(next) = queue.next() {
                last = Some(next);
            }
            let (status, body) = last.clone().unwrap_or((404, String::new()));
            let reason = if status == 200 { "OK" } else { "Error" };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    (format!("http://{addr}/api/v1/"), seen)
}

fn listing(first_id: u64, count: usize, total: usize) -> String {
    let data = serde_json::to_string(&records(first_id, count)).unwrap();
    format!(r#"{{"pagination":{{"total":{total},"limit":12}},"data":{data}}}"#)
}

fn http_fetcher(base_url: String) -> HttpPageFetcher {
    HttpPageFetcher::new(&FetcherOptions {
        base_url,
        system_proxy: false,
        ..FetcherOptions::default()
    })
    .unwrap()
}

#[tokio::test]
async fn http_fetch_requests_page_and_limit() {
    let (base, seen) = serve(vec![(200, listing(13, 12, 126))]).await;
    let fetcher = http_fetcher(base);
    let page = fetcher.fetch(2).await.unwrap();
    assert_eq!(page.total, 126);
    assert_eq!(ids(&page.records), (13..=24).collect::<Vec<u64>>());
    assert_eq!(
        seen.lock().unwrap().clone(),
        vec!["GET /api/v1/artworks?page=2&limit=12 HTTP/1.1".to_string()]
    );
}

#[tokio::test]
async fn http_fetch_truncates_oversized_pages() {
    let (base, _) = serve(vec![(200, listing(1, 20, 20))]).await;
    let page = http_fetcher(base).fetch(1).await.unwrap();
    assert_eq!(page.records.len(), PAGE_SIZE);
}

#[tokio::test]
async fn http_error_status_is_reported() {
    let (base, _) = serve(vec![(500, r#"{"error":"boom"}"#.to_string())]).await;
    let err = http_fetcher(base).fetch(1).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { page: 1, status: 500 }));
}

#[tokio::test]
async fn http_malformed_body_is_a_decode_error() {
    let (base, _) = serve(vec![(200, "<html>maintenance</html>".to_string())]).await;
    let err = http_fetcher(base).fetch(4).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode { page: 4, .. }));
}

#[tokio::test]
async fn http_connection_failure_degrades_to_empty_page() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let fetcher = http_fetcher(format!("http://{addr}"));
    assert!(matches!(
        fetcher.fetch(1).await,
        Err(FetchError::Request { page: 1, .. })
    ));
    let page = fetch_or_empty(&fetcher, 1, 77).await;
    assert_eq!(page, PageResult::empty(77));
}

#[tokio::test]
async fn http_selection_walks_pages_in_order() {
    let (base, seen) = serve(vec![
        (200, listing(13, 12, 30)),
        (200, listing(25, 6, 30)),
    ])
    .await;
    let fetcher = http_fetcher(base);
    let current = PageResult {
        records: records(1, 12),
        total: 30,
    };
    let run = select_first_n(28, &current, 1, PAGE_SIZE, 30, &fetcher).await;
    assert_eq!(ids(&run.records), (1..=28).collect::<Vec<u64>>());
    let lines = seen.lock().unwrap().clone();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("page=2&limit=12"));
    assert!(lines[1].contains("page=3&limit=12"));
}
