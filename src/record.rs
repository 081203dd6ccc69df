use serde::Serialize;

/// Column order shared by the CSV header and the serialized field order.
pub const CSV_COLUMNS: [&str; 10] = [
    "id",
    "title",
    "url",
    "description",
    "category_h1",
    "category_h2",
    "category_h3",
    "category_path",
    "file_path",
    "raw_line",
];

/// One extracted link with the heading context it was found under.
/// Field order matches `CSV_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(test, derive(serde::Deserialize))]
pub struct ResourceRecord {
    pub id: u64,
    pub title: String,
    pub url: String,
    pub description: String,
    pub category_h1: String,
    pub category_h2: String,
    pub category_h3: String,
    pub category_path: String,
    pub file_path: String,
    pub raw_line: String,
}
