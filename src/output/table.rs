use colored::Colorize;

use crate::session::{SortOrder, ViewState};

pub const HEADERS: [&str; 7] = [
    "Title",
    "Place of Origin",
    "Artist Display",
    "Inscriptions",
    "Start Date",
    "End Date",
    "Id",
];

#[derive(Clone, Copy, Debug)]
pub struct TableOptions {
    pub max_width: Option<usize>,
    pub color: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            max_width: Some(160),
            color: true,
        }
    }
}

const CHECKBOX_WIDTH: usize = 3;
const MIN_COLUMN_WIDTH: usize = 6;

/// Renders the displayed page with a checkbox column, a header row and a
/// paging footer.
pub fn render_page(state: &ViewState, options: TableOptions) -> String {
    let rows: Vec<(bool, Vec<String>)> = state
        .displayed_rows()
        .into_iter()
        .map(|r| {
            let cells = vec![
                r.title.clone(),
                r.place_of_origin.clone(),
                r.artist_display.clone(),
                r.inscriptions.clone(),
                r.date_start.clone(),
                r.date_end.clone(),
                r.id.to_string(),
            ];
            (state.selection().contains(r.id), cells)
        })
        .collect();

    let mut widths: Vec<usize> = HEADERS
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .map(|(_, cells)| single_line(&cells[index]).chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
                .max(MIN_COLUMN_WIDTH)
        })
        .collect();
    fit_widths(
        &mut widths,
        options
            .max_width
            .map(|w| w.saturating_sub(CHECKBOX_WIDTH + 2)),
    );

    let sort_marker = match state.sort() {
        SortOrder::Ascending => " ^",
        SortOrder::Descending => " v",
        SortOrder::None => "",
    };
    let all_selected = !rows.is_empty() && rows.iter().all(|(selected, _)| *selected);

    let mut lines = Vec::with_capacity(rows.len() + 3);
    let header_cells = HEADERS
        .iter()
        .zip(widths.iter())
        .enumerate()
        .map(|(index, (header, width))| {
            let label = if index == 0 {
                format!("{header}{sort_marker}")
            } else {
                header.to_string()
            };
            pad(&truncate_text(&label, *width), *width)
        })
        .collect::<Vec<_>>()
        .join("  ");
    let header_line = format!("{}  {}", checkbox(all_selected), header_cells);
    let divider = "-".repeat(header_line.chars().count());
    if options.color {
        lines.push(header_line.bold().to_string());
    } else {
        lines.push(header_line);
    }
    lines.push(divider);

    for (selected, cells) in rows.iter() {
        let body = cells
            .iter()
            .zip(widths.iter())
            .map(|(value, width)| pad(&truncate_text(&single_line(value), *width), *width))
            .collect::<Vec<_>>()
            .join("  ");
        let line = format!("{}  {}", checkbox(*selected), body);
        if options.color && *selected {
            lines.push(line.cyan().to_string());
        } else {
            lines.push(line);
        }
    }
    if rows.is_empty() {
        lines.push("(no rows)".to_string());
    }

    lines.push(footer(state));
    lines.join("\n")
}

pub fn footer(state: &ViewState) -> String {
    let shown = state.records().len();
    let (from, to) = if shown == 0 {
        (0, 0)
    } else {
        (state.offset() + 1, state.offset() + shown)
    };
    let loading = if state.is_loading() { " · loading" } else { "" };
    format!(
        "page {}/{} · rows {}-{} of {} · {} selected{}",
        state.page(),
        state.last_page().max(1),
        from,
        to,
        state.total(),
        state.selection().len(),
        loading
    )
}

fn checkbox(checked: bool) -> &'static str {
    if checked {
        "[x]"
    } else {
        "[ ]"
    }
}

fn fit_widths(widths: &mut [usize], max_width: Option<usize>) {
    let Some(max_width) = max_width else {
        return;
    };
    let separators = widths.len().saturating_sub(1) * 2;
    let mut total = widths.iter().sum::<usize>() + separators;

    while total > max_width {
        let widest = widths
            .iter()
            .enumerate()
            .filter(|(_, w)| **w > MIN_COLUMN_WIDTH)
            .max_by_key(|(_, w)| **w)
            .map(|(idx, _)| idx);
        let Some(idx) = widest else {
            break;
        };
        widths[idx] -= 1;
        total -= 1;
    }
}

fn single_line(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_text(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 1 {
        return "…".to_string();
    }
    let mut out: String = value.chars().take(width - 1).collect();
    out.push('…');
    out
}

fn pad(value: &str, width: usize) -> String {
    let len = value.chars().count();
    format!("{}{}", value, " ".repeat(width.saturating_sub(len)))
}
