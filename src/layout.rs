use serde::{Deserialize, Serialize};
use std::fmt;

/// Header widths above this use the extended layout with slots/emu columns
pub const EXTENDED_HEADER_THRESHOLD: usize = 8;

/// Column scheme of a result table, detected once from the header row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnLayout {
    /// hoster, bot, owner, location, action, quantity, price, item
    Standard,
    /// hoster, bot, slots, emu, owner, location, action, quantity, price, item
    Extended,
}

/// The semantic columns a listing row can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingField {
    Hoster,
    Bot,
    Slots,
    Emu,
    Owner,
    Location,
    Action,
    Quantity,
    Price,
    Item,
}

const STANDARD_FIELDS: [ListingField; 8] = [
    ListingField::Hoster,
    ListingField::Bot,
    ListingField::Owner,
    ListingField::Location,
    ListingField::Action,
    ListingField::Quantity,
    ListingField::Price,
    ListingField::Item,
];

const EXTENDED_FIELDS: [ListingField; 10] = [
    ListingField::Hoster,
    ListingField::Bot,
    ListingField::Slots,
    ListingField::Emu,
    ListingField::Owner,
    ListingField::Location,
    ListingField::Action,
    ListingField::Quantity,
    ListingField::Price,
    ListingField::Item,
];

/// Widest layout, and so the most cells a raw row ever keeps
pub const MAX_COLUMNS: usize = EXTENDED_FIELDS.len();

impl ColumnLayout {
    /// Column count is the only signal: more than eight header cells means extended.
    pub fn from_header_width(header_cells: usize) -> Self {
        if header_cells > EXTENDED_HEADER_THRESHOLD {
            ColumnLayout::Extended
        } else {
            ColumnLayout::Standard
        }
    }

    pub fn has_slots_and_emu(self) -> bool {
        matches!(self, ColumnLayout::Extended)
    }

    /// Fields in the order their cells appear in a row
    pub fn fields(self) -> &'static [ListingField] {
        match self {
            ColumnLayout::Standard => &STANDARD_FIELDS,
            ColumnLayout::Extended => &EXTENDED_FIELDS,
        }
    }

    /// Number of body cells a row needs under this layout
    pub fn width(self) -> usize {
        self.fields().len()
    }

    /// Cell offset of `field`, or `None` when the layout has no such column
    pub fn offset(self, field: ListingField) -> Option<usize> {
        self.fields().iter().position(|&f| f == field)
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        ColumnLayout::Standard
    }
}

impl ListingField {
    pub fn name(self) -> &'static str {
        match self {
            ListingField::Hoster => "hoster",
            ListingField::Bot => "bot",
            ListingField::Slots => "slots",
            ListingField::Emu => "emu",
            ListingField::Owner => "owner",
            ListingField::Location => "location",
            ListingField::Action => "action",
            ListingField::Quantity => "quantity",
            ListingField::Price => "price",
            ListingField::Item => "item",
        }
    }
}

impl fmt::Display for ListingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
