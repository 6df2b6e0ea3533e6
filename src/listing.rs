use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::{QuerybotError, QuerybotResult};
use crate::layout::{ColumnLayout, ListingField};
use crate::table_extractor::{RawCell, RawRow};

/// One trading-post offer parsed from a result row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub hoster: String,
    pub bot_name: String,
    pub bot_url: Option<String>,
    /// Only set for the extended layout; may be empty text but never absent there
    pub slots: Option<String>,
    pub emu: Option<String>,
    pub owner: String,
    pub location: String,
    pub action: String,
    /// Kept as text: the site prints values like "unlimited"
    pub quantity: String,
    pub price: f64,
    pub item_name: String,
}

/// Matches prices such as `12.50gc`.
///
/// The group repeats, so `1.51.0gc` matches as `1.5` then `1.0`; the value
/// taken is the last repetition of the group, not the whole number.
const PRICE_PATTERN: &str = r"^(\d+\.\d+)+gc$";

pub struct PriceParser {
    pattern: Regex,
}

impl PriceParser {
    pub fn new() -> QuerybotResult<Self> {
        let pattern = Regex::new(PRICE_PATTERN).map_err(anyhow::Error::from)?;
        Ok(Self { pattern })
    }

    /// Returns `None` for anything that is not `digits.digits` repeated and suffixed with `gc`.
    pub fn parse(&self, text: &str) -> Option<f64> {
        let captures = self.pattern.captures(text.trim())?;
        captures.get(1)?.as_str().parse::<f64>().ok()
    }
}

/// Turns raw rows into typed listings
pub struct ListingParser {
    prices: PriceParser,
    base_url: Option<Url>,
}

impl ListingParser {
    pub fn new() -> QuerybotResult<Self> {
        Ok(Self {
            prices: PriceParser::new()?,
            base_url: None,
        })
    }

    /// Resolve relative bot links against `base_url`, as a browser would
    pub fn with_base_url(mut self, base_url: &str) -> QuerybotResult<Self> {
        let url = Url::parse(base_url).map_err(|e| QuerybotError::invalid_url(base_url, e))?;
        self.base_url = Some(url);
        Ok(self)
    }

    /// Fields are read in column order, so the first missing or malformed
    /// column is the one reported.
    pub fn parse(&self, row: &RawRow, layout: ColumnLayout) -> QuerybotResult<Listing> {
        let hoster = required_text(row, layout, ListingField::Hoster)?;
        let bot = required(row, layout, ListingField::Bot)?;
        let slots = optional_text(row, layout, ListingField::Slots)?;
        let emu = optional_text(row, layout, ListingField::Emu)?;
        let owner = required_text(row, layout, ListingField::Owner)?;
        let location = required_text(row, layout, ListingField::Location)?;
        let action = required_text(row, layout, ListingField::Action)?;
        let quantity = required_text(row, layout, ListingField::Quantity)?;

        let price_text = required_text(row, layout, ListingField::Price)?;
        let price = self
            .prices
            .parse(&price_text)
            .ok_or_else(|| QuerybotError::malformed_price(row.index, price_text.as_str()))?;

        Ok(Listing {
            hoster,
            bot_name: text_of(bot),
            bot_url: bot.link.as_deref().map(|href| self.resolve_link(href)),
            slots,
            emu,
            owner,
            location,
            action,
            quantity,
            price,
            item_name: required_text(row, layout, ListingField::Item)?,
        })
    }

    fn resolve_link(&self, href: &str) -> String {
        let Some(base) = &self.base_url else {
            return href.to_string();
        };

        match base.join(href) {
            Ok(url) => url.to_string(),
            Err(e) => {
                debug!(href, error = %e, "Keeping unresolvable bot link as-is");
                href.to_string()
            }
        }
    }
}

fn text_of(cell: &RawCell) -> String {
    cell.text.trim().to_string()
}

fn required<'a>(
    row: &'a RawRow,
    layout: ColumnLayout,
    field: ListingField,
) -> QuerybotResult<&'a RawCell> {
    layout
        .offset(field)
        .and_then(|offset| row.cell(offset))
        .ok_or_else(|| QuerybotError::missing_cell(row.index, field))
}

fn required_text(row: &RawRow, layout: ColumnLayout, field: ListingField) -> QuerybotResult<String> {
    required(row, layout, field).map(text_of)
}

/// Absent when the layout has no such column, required when it does
fn optional_text(
    row: &RawRow,
    layout: ColumnLayout,
    field: ListingField,
) -> QuerybotResult<Option<String>> {
    match layout.offset(field) {
        Some(_) => required_text(row, layout, field).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard_row(price: &str) -> RawRow {
        RawRow::new(
            0,
            vec![
                RawCell::new(" Ana\n"),
                RawCell::with_link(" Trader ", "/bot/trader"),
                RawCell::new("Bob"),
                RawCell::new(" VotD "),
                RawCell::new("Buy"),
                RawCell::new(" unlimited "),
                RawCell::new(price),
                RawCell::new("  Iron Sword  "),
            ],
        )
    }

    fn extended_row() -> RawRow {
        RawRow::new(
            4,
            vec![
                RawCell::new("Ana"),
                RawCell::new("Trader"),
                RawCell::new(" 12 "),
                RawCell::new(""),
                RawCell::new("Bob"),
                RawCell::new("VotD"),
                RawCell::new("Sell"),
                RawCell::new("3"),
                RawCell::new("0.75gc"),
                RawCell::new("Bones"),
            ],
        )
    }

    #[test]
    fn test_price_parsing() {
        let prices = PriceParser::new().unwrap();
        assert_eq!(prices.parse("3.75gc"), Some(3.75));
        assert_eq!(prices.parse("12.50gc"), Some(12.5));
        assert_eq!(prices.parse("  0.01gc "), Some(0.01));
    }

    #[test]
    fn test_repeated_price_group_takes_last() {
        let prices = PriceParser::new().unwrap();
        assert_eq!(prices.parse("1.51.0gc"), Some(1.0));
    }

    #[test]
    fn test_price_rejects_other_shapes() {
        let prices = PriceParser::new().unwrap();
        for text in ["free", "3gc", "3.75", "", "3.75 gc", "3.75GC", "-1.00gc", "1.5.0gc"] {
            assert_eq!(prices.parse(text), None, "{:?} should not parse", text);
        }
    }

    #[test]
    fn test_parse_standard_row() {
        let parser = ListingParser::new().unwrap();
        let listing = parser.parse(&standard_row("12.50gc"), ColumnLayout::Standard).unwrap();

        assert_eq!(listing.hoster, "Ana");
        assert_eq!(listing.bot_name, "Trader");
        assert_eq!(listing.bot_url.as_deref(), Some("/bot/trader"));
        assert_eq!(listing.slots, None);
        assert_eq!(listing.emu, None);
        assert_eq!(listing.owner, "Bob");
        assert_eq!(listing.location, "VotD");
        assert_eq!(listing.action, "Buy");
        assert_eq!(listing.quantity, "unlimited");
        assert_eq!(listing.price, 12.5);
        assert_eq!(listing.item_name, "Iron Sword");
    }

    #[test]
    fn test_parse_extended_row_keeps_empty_emu() {
        let parser = ListingParser::new().unwrap();
        let listing = parser.parse(&extended_row(), ColumnLayout::Extended).unwrap();

        assert_eq!(listing.slots.as_deref(), Some("12"));
        assert_eq!(listing.emu.as_deref(), Some(""));
        assert_eq!(listing.owner, "Bob");
        assert_eq!(listing.action, "Sell");
        assert_eq!(listing.price, 0.75);
        assert_eq!(listing.item_name, "Bones");
        assert_eq!(listing.bot_url, None);
    }

    #[test]
    fn test_malformed_price_fails() {
        let parser = ListingParser::new().unwrap();
        let err = parser.parse(&standard_row("free"), ColumnLayout::Standard).unwrap_err();
        match err {
            QuerybotError::MalformedPrice { row, text } => {
                assert_eq!(row, 0);
                assert_eq!(text, "free");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_short_row_reports_missing_cell() {
        let parser = ListingParser::new().unwrap();
        let mut row = standard_row("1.00gc");
        row.cells.truncate(7);

        let err = parser.parse(&row, ColumnLayout::Standard).unwrap_err();
        assert!(matches!(
            err,
            QuerybotError::MissingCell { row: 0, field: ListingField::Item }
        ));
    }

    #[test]
    fn test_empty_row_reports_hoster_first() {
        let parser = ListingParser::new().unwrap();
        let err = parser
            .parse(&RawRow::new(0, Vec::new()), ColumnLayout::Standard)
            .unwrap_err();
        assert!(matches!(
            err,
            QuerybotError::MissingCell { row: 0, field: ListingField::Hoster }
        ));
    }

    #[test]
    fn test_missing_location_reported_before_bad_price() {
        let parser = ListingParser::new().unwrap();
        let row = RawRow::new(
            1,
            vec![RawCell::new("Ana"), RawCell::new("Trader"), RawCell::new("Bob")],
        );
        let err = parser.parse(&row, ColumnLayout::Standard).unwrap_err();
        assert!(matches!(
            err,
            QuerybotError::MissingCell { row: 1, field: ListingField::Location }
        ));
    }

    #[test]
    fn test_standard_row_under_extended_layout_is_short() {
        let parser = ListingParser::new().unwrap();
        let err = parser
            .parse(&standard_row("1.00gc"), ColumnLayout::Extended)
            .unwrap_err();
        assert!(matches!(err, QuerybotError::MissingCell { .. }));
    }

    #[test]
    fn test_bot_link_resolves_against_base_url() {
        let parser = ListingParser::new()
            .unwrap()
            .with_base_url("http://www.example.org/querybot/search.php?item=sword")
            .unwrap();
        let listing = parser.parse(&standard_row("1.00gc"), ColumnLayout::Standard).unwrap();
        assert_eq!(
            listing.bot_url.as_deref(),
            Some("http://www.example.org/bot/trader")
        );
    }

    #[test]
    fn test_bad_base_url_is_rejected() {
        let err = ListingParser::new().unwrap().with_base_url("not a url").err().unwrap();
        assert!(matches!(err, QuerybotError::InvalidUrl { .. }));
    }
}
