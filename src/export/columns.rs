//! Column layout of the exported table
//!
//! Columns A through AH. Reserved columns are filled in downstream by the
//! people who consume the table, so they are always written blank.

use super::rows::ExportRow;

/// Number of columns in the export table
pub const COLUMN_COUNT: usize = 34;

/// Header row, in column order
pub const HEADERS: [&str; COLUMN_COUNT] = [
    "url",
    "Image",
    "date",
    "sku",
    "PN",
    "CCC",
    "VID",
    "HOL",
    "RVID",
    "RHOL",
    "IID",
    "IDHol",
    "",
    "AC$",
    "Shipping",
    "Price",
    "Core",
    "msrp",
    "STL",
    "CC",
    "RPN",
    "PaintCode",
    "ColDesc",
    "title",
    "also_known_as",
    "positions",
    "description",
    "applications",
    "replaces",
    "year",
    "make",
    "model",
    "trims",
    "engines",
];

/// What fills a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Url,
    Image,
    Date,
    Sku,
    PartNumber,
    Price,
    Msrp,
    Title,
    AlsoKnownAs,
    Positions,
    Description,
    Applications,
    Replaces,
    Year,
    Make,
    Model,
    Trim,
    Engine,
    Reserved,
}

/// Source of each column, aligned with `HEADERS`
pub const LAYOUT: [Column; COLUMN_COUNT] = [
    Column::Url,
    Column::Image,
    Column::Date,
    Column::Sku,
    Column::PartNumber,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Price,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Msrp,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Reserved,
    Column::Title,
    Column::AlsoKnownAs,
    Column::Positions,
    Column::Description,
    Column::Applications,
    Column::Replaces,
    Column::Year,
    Column::Make,
    Column::Model,
    Column::Trim,
    Column::Engine,
];

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Maps an export row onto the fixed column layout
pub fn to_record(row: &ExportRow) -> Vec<String> {
    LAYOUT
        .iter()
        .map(|column| match column {
            Column::Url => row.url.clone(),
            Column::Image => text(&row.image_url),
            Column::Date => row.scraped_at.format("%Y-%m-%d").to_string(),
            Column::Sku => row.sku.clone(),
            Column::PartNumber => row.part_number.clone(),
            Column::Price => text(&row.price),
            Column::Msrp => text(&row.msrp),
            Column::Title => row.title.clone(),
            Column::AlsoKnownAs => text(&row.also_known_as),
            Column::Positions => text(&row.positions),
            Column::Description => text(&row.description),
            Column::Applications => text(&row.applications),
            Column::Replaces => text(&row.replaces),
            Column::Year => row.fitment.year.clone(),
            Column::Make => row.fitment.make.clone(),
            Column::Model => row.fitment.model.clone(),
            Column::Trim => row.fitment.trim.clone(),
            Column::Engine => row.fitment.engine.clone(),
            Column::Reserved => String::new(),
        })
        .collect()
}

/// Header row as owned strings
pub fn header_record() -> Vec<String> {
    HEADERS.iter().map(|h| h.to_string()).collect()
}
