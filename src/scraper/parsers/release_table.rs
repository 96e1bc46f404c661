//! Release table parser for the yearly video game encyclopedia page.
//!
//! Locates every `wikitable` whose header cells include Title, Month, Day
//! and Platform(s), and flattens their rows into one ordered sequence.
//! Column order inside a table does not matter; matching is by header text.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

/// Header cells a table must contain to be read
pub const REQUIRED_COLUMNS: [&str; 4] = ["Title", "Month", "Day", "Platform(s)"];

/// Upper bound for `rowspan`/`colspan` values taken from the page
const MAX_SPAN: usize = 500;

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// One scraped table row, before cleaning. Extra columns are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawReleaseRow {
    pub title: String,
    pub month: String,
    pub day: String,
    pub platforms: String,
}

/// A cell after span expansion
#[derive(Debug, Clone)]
struct GridCell {
    text: String,
    is_header: bool,
}

/// A `rowspan` cell still covering rows below it
#[derive(Debug, Clone)]
struct PendingSpan {
    cell: GridCell,
    rows_left: usize,
}

/// Parser for release tables
pub struct ReleaseTableParser;

impl ReleaseTableParser {
    /// Parse the page and return the rows of all matching tables, in page order
    pub fn parse(html: &str) -> Vec<RawReleaseRow> {
        let document = Html::parse_document(html);
        let table_selector = Selector::parse("table.wikitable").unwrap();

        let mut rows = Vec::new();
        let mut matched = 0;

        for table in document.select(&table_selector) {
            if !Self::has_required_headers(&table) {
                continue;
            }
            matched += 1;
            rows.extend(Self::parse_table(&table));
        }

        debug!(tables = matched, rows = rows.len(), "Parsed release tables");
        rows
    }

    /// Whether the table's header cells are a superset of [`REQUIRED_COLUMNS`]
    fn has_required_headers(table: &ElementRef) -> bool {
        let headers: Vec<String> = Self::own_rows(table)
            .iter()
            .flat_map(Self::own_cells)
            .filter(|cell| cell.value().name() == "th")
            .map(|cell| cell_text(&cell))
            .collect();

        REQUIRED_COLUMNS
            .iter()
            .all(|required| headers.iter().any(|h| h == required))
    }

    fn parse_table(table: &ElementRef) -> Vec<RawReleaseRow> {
        let grid = Self::expand_grid(table);

        // Column names come from the first all-header row
        let Some(header_idx) = grid
            .iter()
            .position(|row| !row.is_empty() && row.iter().all(|c| c.is_header))
        else {
            return Vec::new();
        };

        let mut columns: HashMap<&str, usize> = HashMap::new();
        for (idx, cell) in grid[header_idx].iter().enumerate() {
            columns.entry(cell.text.as_str()).or_insert(idx);
        }
        let [title_idx, month_idx, day_idx, platforms_idx] =
            REQUIRED_COLUMNS.map(|name| columns.get(name).copied());
        let (Some(title_idx), Some(month_idx), Some(day_idx), Some(platforms_idx)) =
            (title_idx, month_idx, day_idx, platforms_idx)
        else {
            return Vec::new();
        };

        let mut rows = Vec::new();
        for row in &grid[header_idx + 1..] {
            // Repeated header rows inside the body
            if row.iter().all(|c| c.is_header) {
                continue;
            }

            let get = |idx: usize| row.get(idx).map(|c| c.text.clone());
            match (get(title_idx), get(month_idx), get(day_idx), get(platforms_idx)) {
                (Some(title), Some(month), Some(day), Some(platforms)) => {
                    rows.push(RawReleaseRow {
                        title,
                        month,
                        day,
                        platforms,
                    });
                }
                _ => debug!(cells = row.len(), "Skipping short table row"),
            }
        }

        rows
    }

    /// Lay the table out as a rectangular grid, copying `rowspan`/`colspan`
    /// cells into every position they cover.
    fn expand_grid(table: &ElementRef) -> Vec<Vec<GridCell>> {
        let mut grid = Vec::new();
        let mut pending: Vec<Option<PendingSpan>> = Vec::new();

        for row in Self::own_rows(table) {
            let mut out: Vec<GridCell> = Vec::new();
            let mut cells = Self::own_cells(&row).into_iter();

            loop {
                Self::fill_pending(&mut pending, &mut out);

                let Some(cell) = cells.next() else {
                    Self::fill_trailing(&mut pending, &mut out);
                    break;
                };

                let grid_cell = GridCell {
                    text: cell_text(&cell),
                    is_header: cell.value().name() == "th",
                };
                let rowspan = span_attr(&cell, "rowspan");
                let colspan = span_attr(&cell, "colspan");

                for _ in 0..colspan {
                    let col = out.len();
                    if pending.len() <= col {
                        pending.resize(col + 1, None);
                    }
                    pending[col] = (rowspan > 1).then(|| PendingSpan {
                        cell: grid_cell.clone(),
                        rows_left: rowspan - 1,
                    });
                    out.push(grid_cell.clone());
                }
            }

            grid.push(out);
        }

        grid
    }

    /// Copy spans from rows above into the next free positions of `out`
    fn fill_pending(pending: &mut [Option<PendingSpan>], out: &mut Vec<GridCell>) {
        while let Some(slot) = pending.get_mut(out.len()) {
            let Some(span) = slot else {
                break;
            };
            out.push(span.cell.clone());
            span.rows_left -= 1;
            if span.rows_left == 0 {
                *slot = None;
            }
        }
    }

    /// Once a row's own cells run out, spans further right still cover it.
    /// Uncovered columns before them become empty cells.
    fn fill_trailing(pending: &mut [Option<PendingSpan>], out: &mut Vec<GridCell>) {
        let Some(last) = pending.iter().rposition(Option::is_some) else {
            return;
        };

        while out.len() <= last {
            if pending[out.len()].is_some() {
                Self::fill_pending(pending, out);
            } else {
                out.push(GridCell {
                    text: String::new(),
                    is_header: false,
                });
            }
        }
    }

    /// `<tr>` elements belonging to this table, skipping nested tables
    fn own_rows<'a>(table: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
        let row_selector = Selector::parse("tr").unwrap();
        table
            .select(&row_selector)
            .filter(|row| {
                row.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|el| el.value().name() == "table")
                    .is_some_and(|owner| owner.id() == table.id())
            })
            .collect()
    }

    /// Direct `<th>`/`<td>` children of a row
    fn own_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
        row.children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "th" | "td"))
            .collect()
    }
}

/// Cell text with whitespace runs collapsed and trimmed
fn cell_text(cell: &ElementRef) -> String {
    let text = cell.text().collect::<String>();
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn span_attr(cell: &ElementRef, name: &str) -> usize {
    cell.value()
        .attr(name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, MAX_SPAN)
}
