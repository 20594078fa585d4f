use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use crate::api::{page_count, page_offset, PageResult, Record};

/// Tag handed out when an asynchronous operation starts. Only the most
/// recently issued token of each kind may apply its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    None,
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "none" | "off" | "" => Some(Self::None),
            "asc" | "ascending" | "up" => Some(Self::Ascending),
            "desc" | "descending" | "down" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn cycle(self) -> Self {
        match self {
            Self::None => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    records: Vec<Record>,
}

impl Selection {
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut seen = HashSet::new();
        let records = records
            .into_iter()
            .filter(|r| seen.insert(r.id))
            .collect();
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.records.iter().any(|r| r.id == id)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn ids(&self) -> Vec<u64> {
        self.records.iter().map(|r| r.id).collect()
    }

    pub fn insert(&mut self, record: &Record) -> bool {
        if self.contains(record.id) {
            return false;
        }
        self.records.push(record.clone());
        true
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        before != self.records.len()
    }

    pub fn toggle(&mut self, record: &Record) -> bool {
        if self.remove(record.id) {
            false
        } else {
            self.records.push(record.clone());
            true
        }
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub selected: Vec<u64>,
    pub deselected: Vec<u64>,
    pub unknown: Vec<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Navigation {
    Next,
    Previous,
    Goto(usize),
}

/// Everything the table shows. Fetching happens elsewhere.
#[derive(Clone, Debug)]
pub struct ViewState {
    page: usize,
    page_size: usize,
    records: Vec<Record>,
    total: usize,
    loading: bool,
    selection: Selection,
    sort: SortOrder,
    page_tokens: u64,
    selection_tokens: u64,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size,
            records: Vec::new(),
            total: 0,
            loading: false,
            selection: Selection::default(),
            sort: SortOrder::None,
            page_tokens: 0,
            selection_tokens: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn offset(&self) -> usize {
        page_offset(self.page, self.page_size)
    }

    pub fn last_page(&self) -> usize {
        page_count(self.total, self.page_size)
    }

    pub fn current_page(&self) -> PageResult {
        PageResult {
            records: self.records.clone(),
            total: self.total,
        }
    }

    pub fn resolve(&self, nav: Navigation) -> Option<usize> {
        let last = self.last_page().max(1);
        let target = match nav {
            Navigation::Next => self.page.checked_add(1)?,
            Navigation::Previous => self.page.checked_sub(1)?,
            Navigation::Goto(page) => page,
        };
        (1..=last).contains(&target).then_some(target)
    }

    pub fn begin_page_request(&mut self) -> RequestToken {
        self.page_tokens += 1;
        self.loading = true;
        RequestToken(self.page_tokens)
    }

    pub fn begin_selection_request(&mut self) -> RequestToken {
        self.selection_tokens += 1;
        RequestToken(self.selection_tokens)
    }

    /// Installs a fetched page unless a newer page request was issued since
    /// `token`. Returns whether the page was applied.
    pub fn apply_page(&mut self, token: RequestToken, page: usize, result: PageResult) -> bool {
        if token.0 != self.page_tokens {
            debug!(?token, latest = self.page_tokens, page, "discarding stale page");
            return false;
        }
        self.page = page;
        self.records = result.records;
        self.total = result.total;
        self.loading = false;
        true
    }

    pub fn apply_selection(&mut self, token: RequestToken, records: Vec<Record>) -> bool {
        if token.0 != self.selection_tokens {
            debug!(?token, latest = self.selection_tokens, "discarding stale selection");
            return false;
        }
        self.selection = Selection::from_records(records);
        true
    }

    pub fn toggle_rows(&mut self, ids: &[u64]) -> ToggleOutcome {
        let mut outcome = ToggleOutcome::default();
        for id in ids {
            match self.records.iter().find(|r| r.id == *id) {
                Some(record) => {
                    if self.selection.toggle(record) {
                        outcome.selected.push(*id);
                    } else {
                        outcome.deselected.push(*id);
                    }
                }
                None => outcome.unknown.push(*id),
            }
        }
        outcome
    }

    pub fn toggle_page(&mut self) -> bool {
        if self.records.is_empty() {
            return false;
        }
        let all_selected = self
            .records
            .iter()
            .all(|r| self.selection.contains(r.id));
        if all_selected {
            for r in self.records.iter() {
                self.selection.remove(r.id);
            }
            false
        } else {
            for r in self.records.iter() {
                self.selection.insert(r);
            }
            true
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.sort = sort;
    }

    pub fn displayed_rows(&self) -> Vec<&Record> {
        let mut rows: Vec<&Record> = self.records.iter().collect();
        match self.sort {
            SortOrder::None => {}
            SortOrder::Ascending => rows.sort_by(|a, b| compare_titles(a, b)),
            SortOrder::Descending => rows.sort_by(|a, b| compare_titles(b, a)),
        }
        rows
    }
}

fn compare_titles(a: &Record, b: &Record) -> Ordering {
    a.title.to_lowercase().cmp(&b.title.to_lowercase())
}
