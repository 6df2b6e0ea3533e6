use clap::ValueEnum;
use serde::Serialize;

use crate::error::QuerybotResult;
use crate::extraction::ExtractionResult;
use crate::listing::Listing;
use crate::summary::PriceSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Csv,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ItemSummaryRecord<'a> {
    item_name: &'a str,
    #[serde(flatten)]
    summary: &'a PriceSummary,
}

pub fn render_listings(result: &ExtractionResult, format: OutputFormat) -> QuerybotResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Markdown => Ok(listings_to_markdown(result)),
        OutputFormat::Csv => Ok(listings_to_csv(result)),
    }
}

pub fn render_summary(
    summary: &[(String, PriceSummary)],
    action: &str,
    format: OutputFormat,
) -> QuerybotResult<String> {
    match format {
        OutputFormat::Json => {
            let records = summary
                .iter()
                .map(|(item_name, summary)| ItemSummaryRecord { item_name, summary })
                .collect::<Vec<_>>();
            Ok(serde_json::to_string_pretty(&records)?)
        }
        OutputFormat::Markdown => Ok(summary_to_markdown(summary, action)),
        OutputFormat::Csv => Ok(summary_to_csv(summary)),
    }
}

fn listing_headers(has_slots_and_emu: bool) -> Vec<&'static str> {
    let mut headers = vec!["Hoster", "Bot"];
    if has_slots_and_emu {
        headers.extend(["Slots", "Emu"]);
    }
    headers.extend(["Owner", "Location", "Action", "Quantity", "Price", "Item", "Bot URL"]);
    headers
}

fn listing_fields(listing: &Listing, has_slots_and_emu: bool) -> Vec<String> {
    let mut fields = vec![listing.hoster.clone(), listing.bot_name.clone()];
    if has_slots_and_emu {
        fields.push(listing.slots.clone().unwrap_or_default());
        fields.push(listing.emu.clone().unwrap_or_default());
    }
    fields.extend([
        listing.owner.clone(),
        listing.location.clone(),
        listing.action.clone(),
        listing.quantity.clone(),
        format_price(listing.price),
        listing.item_name.clone(),
        listing.bot_url.clone().unwrap_or_default(),
    ]);
    fields
}

/// Presentation rounding only; the parsed value keeps full precision.
pub fn format_price(price: f64) -> String {
    format!("{:.2}gc", price)
}

fn listings_to_markdown(result: &ExtractionResult) -> String {
    if result.entries.is_empty() {
        return "*[No listings]*\n".to_string();
    }

    let headers = listing_headers(result.has_slots_and_emu);
    let rows = result
        .entries
        .iter()
        .map(|listing| listing_fields(listing, result.has_slots_and_emu))
        .collect::<Vec<_>>();

    markdown_table(&headers, &rows)
}

fn listings_to_csv(result: &ExtractionResult) -> String {
    let headers = listing_headers(result.has_slots_and_emu);
    let mut csv_content = csv_line(headers.iter().copied());

    for listing in &result.entries {
        let fields = listing_fields(listing, result.has_slots_and_emu);
        csv_content.push_str(&csv_line(fields.iter().map(String::as_str)));
    }

    csv_content
}

fn summary_to_markdown(summary: &[(String, PriceSummary)], action: &str) -> String {
    if summary.is_empty() {
        return format!("*[No {} listings]*\n", action);
    }

    let rows = summary
        .iter()
        .map(|(item_name, prices)| {
            vec![
                item_name.clone(),
                format_price(prices.min_price),
                format_price(prices.max_price),
                format_price(prices.avg_price),
            ]
        })
        .collect::<Vec<_>>();

    format!(
        "**{} prices**\n\n{}",
        action,
        markdown_table(&["Item", "Min", "Max", "Avg"], &rows)
    )
}

fn summary_to_csv(summary: &[(String, PriceSummary)]) -> String {
    let mut csv_content = csv_line(["item", "min_price", "max_price", "avg_price"].into_iter());

    for (item_name, prices) in summary {
        let fields = [
            item_name.clone(),
            prices.min_price.to_string(),
            prices.max_price.to_string(),
            prices.avg_price.to_string(),
        ];
        csv_content.push_str(&csv_line(fields.iter().map(String::as_str)));
    }

    csv_content
}

fn markdown_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut table_content = String::new();

    table_content.push_str("| ");
    table_content.push_str(&headers.join(" | "));
    table_content.push_str(" |\n|");
    for _ in headers {
        table_content.push_str("---|");
    }
    table_content.push('\n');

    for row in rows {
        let cells = row
            .iter()
            .map(|cell| cell.replace('\n', " ").replace('|', "\\|"))
            .collect::<Vec<_>>();
        table_content.push_str("| ");
        table_content.push_str(&cells.join(" | "));
        table_content.push_str(" |\n");
    }

    table_content
}

fn csv_line<'a>(fields: impl Iterator<Item = &'a str>) -> String {
    let mut line = fields.map(escape_csv_field).collect::<Vec<_>>().join(",");
    line.push('\n');
    line
}

fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
