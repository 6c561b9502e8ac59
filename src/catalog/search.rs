use scraper::{ElementRef, Html, Selector};

/// Rows of the request board result table. The first row is the header.
const BOARD_ROW_SELECTOR: &str = "#BoardType1 > table > tbody > tr";
const REQUEST_LINK_SELECTOR: &str = "td:nth-child(7) > a";
const TITLE_CELL_SELECTOR: &str = "td:nth-child(3)";
const SINGER_CELL_SELECTOR: &str = "td:nth-child(4)";

/// Marker image the request form shows when the song was already requested.
pub const ALREADY_REQUESTED_MARKER: &str = "/images/tjsong/ico_quest_30.gif";

/// One row of the request board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRow {
    pub idx: u64,
    pub title: String,
    pub singer: String,
}

fn selector(css: &str) -> Result<Selector, String> {
    Selector::parse(css).map_err(|e| format!("invalid selector '{css}': {e:?}"))
}

/// Index carried by a request link, e.g. `javascript:fn_request(62866)`.
pub fn index_from_href(href: &str) -> Option<u64> {
    let (_, rest) = href.split_once('(')?;
    let inner = rest.strip_suffix(')').unwrap_or(rest);
    inner
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .parse()
        .ok()
}

fn cell_text(row: ElementRef<'_>, cell: &Selector) -> String {
    row.select(cell)
        .next()
        .map(|td| td.text().collect::<String>())
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Parse the request board page into rows.
///
/// Rows without a request link carrying a numeric index (the header, the
/// "no results" placeholder) are skipped.
pub fn parse_request_board(html: &str) -> Result<Vec<SearchRow>, String> {
    let rows = selector(BOARD_ROW_SELECTOR)?;
    let link = selector(REQUEST_LINK_SELECTOR)?;
    let title = selector(TITLE_CELL_SELECTOR)?;
    let singer = selector(SINGER_CELL_SELECTOR)?;

    let document = Html::parse_document(html);
    Ok(document
        .select(&rows)
        .filter_map(|row| {
            let idx = row
                .select(&link)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(index_from_href)?;
            Some(SearchRow {
                idx,
                title: cell_text(row, &title),
                singer: cell_text(row, &singer),
            })
        })
        .collect())
}

/// Whether the request form page carries the already-requested marker.
pub fn has_request_marker(html: &str) -> Result<bool, String> {
    let marker = selector(&format!("img[src$=\"{ALREADY_REQUESTED_MARKER}\"]"))?;
    Ok(Html::parse_document(html).select(&marker).next().is_some())
}

pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Pick the catalog index for `singer`/`title` among search rows.
///
/// With `exact`, a row whose normalized singer and title both match wins
/// wherever it sits; otherwise (or when none matches) the first row is used.
pub fn select_index(rows: &[SearchRow], singer: &str, title: &str, exact: bool) -> Option<u64> {
    if exact {
        let singer = normalize(singer);
        let title = normalize(title);
        if let Some(row) = rows
            .iter()
            .find(|row| normalize(&row.singer) == singer && normalize(&row.title) == title)
        {
            return Some(row.idx);
        }
    }
    rows.first().map(|row| row.idx)
}
