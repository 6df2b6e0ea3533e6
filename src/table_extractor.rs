use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::error::{QuerybotError, QuerybotResult};
use crate::layout::{ColumnLayout, MAX_COLUMNS};

pub const DEFAULT_TABLE_SELECTOR: &str = "table";

/// Text and first link destination of one body cell, before labeling
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawCell {
    pub text: String,
    pub link: Option<String>,
}

impl RawCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
        }
    }

    pub fn with_link(text: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: Some(link.into()),
        }
    }
}

/// Positional cells of one body row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawRow {
    /// 0-based position among the body rows (header excluded)
    pub index: usize,
    pub cells: Vec<RawCell>,
}

impl RawRow {
    pub fn new(index: usize, cells: Vec<RawCell>) -> Self {
        Self { index, cells }
    }

    pub fn cell(&self, offset: usize) -> Option<&RawCell> {
        self.cells.get(offset)
    }
}

/// Body rows of one result table plus the layout its header announced
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTable {
    pub layout: ColumnLayout,
    pub rows: Vec<RawRow>,
}

impl RawTable {
    /// No table on the page is a normal outcome (zero search results)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_slots_and_emu(&self) -> bool {
        self.layout.has_slots_and_emu()
    }
}

/// Reads the result table out of a parsed page
pub struct TableExtractor {
    table_selector: String,
    table: Selector,
    rows: Selector,
    header_cells: Selector,
    body_cells: Selector,
    links: Selector,
}

impl TableExtractor {
    pub fn new() -> QuerybotResult<Self> {
        Self::with_selector(DEFAULT_TABLE_SELECTOR)
    }

    /// Use the first element matching `table_selector` as the result table
    pub fn with_selector(table_selector: &str) -> QuerybotResult<Self> {
        Ok(Self {
            table_selector: table_selector.to_string(),
            table: parse_selector(table_selector)?,
            rows: parse_selector("tr")?,
            header_cells: parse_selector("th")?,
            body_cells: parse_selector("td")?,
            links: parse_selector("a")?,
        })
    }

    pub fn extract(&self, document: &Html) -> RawTable {
        match document.select(&self.table).next() {
            Some(table) => self.extract_table(table),
            None => {
                debug!(selector = %self.table_selector, "No result table on page");
                RawTable::empty()
            }
        }
    }

    pub fn extract_table(&self, table: ElementRef) -> RawTable {
        let mut rows = table.select(&self.rows);

        let Some(header_row) = rows.next() else {
            debug!("Result table has no rows");
            return RawTable::empty();
        };

        let header_width = header_row.select(&self.header_cells).count();
        let layout = ColumnLayout::from_header_width(header_width);
        debug!(header_width, ?layout, "Detected column layout");

        let rows = rows
            .enumerate()
            .map(|(index, row)| RawRow::new(index, self.extract_cells(row)))
            .collect::<Vec<_>>();

        RawTable { layout, rows }
    }

    fn extract_cells(&self, row: ElementRef) -> Vec<RawCell> {
        row.select(&self.body_cells)
            .take(MAX_COLUMNS)
            .map(|cell| RawCell {
                text: cell.text().collect::<String>(),
                link: cell
                    .select(&self.links)
                    .next()
                    .and_then(|a| a.value().attr("href"))
                    .map(|href| href.to_string()),
            })
            .collect()
    }
}

fn parse_selector(selector: &str) -> QuerybotResult<Selector> {
    Selector::parse(selector)
        .map_err(|e| QuerybotError::invalid_selector(selector, format!("{:?}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD_PAGE: &str = r#"
        <html><body>
        <table>
          <tr><th>Hoster</th><th>Bot</th><th>Owner</th><th>Location</th>
              <th>Action</th><th>Qty</th><th>Price</th><th>Item</th></tr>
          <tr><td> Ana </td><td><a href="/bot/trader">Trader</a></td><td>Bob</td><td>VotD</td>
              <td>Buy</td><td>5</td><td>12.50gc</td><td>Iron Sword</td></tr>
          <tr><td>Ana</td><td>Plainbot</td><td>Bob</td><td>WS</td>
              <td>Sell</td><td>unlimited</td><td>1.00gc</td><td>Bones</td></tr>
        </table>
        </body></html>"#;

    #[test]
    fn test_absent_table_is_empty() {
        let extractor = TableExtractor::new().unwrap();
        let document = Html::parse_document("<html><body><p>No results</p></body></html>");
        let table = extractor.extract(&document);
        assert!(table.rows.is_empty());
        assert!(!table.has_slots_and_emu());
    }

    #[test]
    fn test_header_excluded_and_cells_positional() {
        let extractor = TableExtractor::new().unwrap();
        let document = Html::parse_document(STANDARD_PAGE);
        let table = extractor.extract(&document);

        assert_eq!(table.layout, ColumnLayout::Standard);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0].index, 0);
        assert_eq!(table.rows[0].cells.len(), 8);
        assert_eq!(table.rows[0].cells[0].text, " Ana ");
        assert_eq!(table.rows[0].cells[1].link.as_deref(), Some("/bot/trader"));
        assert_eq!(table.rows[1].cells[1].link, None);
        assert_eq!(table.rows[1].index, 1);
    }

    #[test]
    fn test_wide_header_selects_extended_layout() {
        let extractor = TableExtractor::new().unwrap();
        let html = format!(
            "<table><tr>{}</tr></table>",
            "<th>h</th>".repeat(10)
        );
        let table = extractor.extract(&Html::parse_document(&html));
        assert_eq!(table.layout, ColumnLayout::Extended);
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_extra_cells_are_capped() {
        let extractor = TableExtractor::new().unwrap();
        let html = format!(
            "<table><tr><th>h</th></tr><tr>{}</tr></table>",
            "<td>x</td>".repeat(12)
        );
        let table = extractor.extract(&Html::parse_document(&html));
        assert_eq!(table.rows[0].cells.len(), MAX_COLUMNS);
    }

    #[test]
    fn test_custom_selector_picks_matching_table() {
        let extractor = TableExtractor::with_selector("table.results").unwrap();
        let html = r#"
            <table><tr><th>nav</th></tr><tr><td>menu</td></tr></table>
            <table class="results"><tr><th>a</th></tr></table>"#;
        let table = extractor.extract(&Html::parse_document(html));
        assert!(table.rows.is_empty());
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let err = TableExtractor::with_selector("table[[").err().unwrap();
        assert!(matches!(err, QuerybotError::InvalidSelector { .. }));
    }
}
