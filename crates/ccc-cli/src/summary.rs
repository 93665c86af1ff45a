//! Terminal output for command results.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, ContentArrangement, Table};

use ccc_schema::SchemaRegistry;
use ccc_transform::ImportedRecord;

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

/// One row per domain, upstream domains first.
pub fn domains_table(registry: &SchemaRegistry) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "Domain",
        "Key field",
        "Order",
        "Index prefix",
        "Doc type",
        "Fields",
    ]);
    apply_table_style(&mut table);
    for domain in registry.domains() {
        table.add_row(vec![
            Cell::new(&domain.name),
            Cell::new(&domain.key_field),
            Cell::new(domain.import_order),
            Cell::new(&domain.collection.index_prefix),
            Cell::new(&domain.collection.doc_type),
            Cell::new(domain.field_descriptors.len()),
        ]);
    }
    table
}

/// One row per imported record with the store's verdict.
pub fn import_table(records: &[ImportedRecord]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Key", "Collection", "Result"]);
    apply_table_style(&mut table);
    for imported in records {
        table.add_row(vec![
            Cell::new(imported.key.as_str()),
            Cell::new(&imported.collection),
            Cell::new(ack_result(imported.ack.as_ref())),
        ]);
    }
    table
}

/// The `result` reported by the store, `-` when there is none.
pub fn ack_result(ack: Option<&serde_json::Value>) -> &str {
    ack.and_then(|ack| ack.get("result"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or("-")
}

/// Pretty JSON for records that were normalized but not written.
pub fn records_json(records: &[ImportedRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}
