use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use regload_model::{MappingSpec, RunSummary, TransformCode};

pub fn print_summary(summary: &RunSummary) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);

    table.add_row(vec![Cell::new("Rows read"), Cell::new(summary.rows)]);
    table.add_row(vec![
        Cell::new("Created (primary)"),
        Cell::new(summary.created_primary),
    ]);
    table.add_row(vec![
        Cell::new("Created (address)"),
        Cell::new(summary.created_address),
    ]);
    table.add_row(vec![
        Cell::new("Skipped by rule"),
        count_cell(summary.skipped_by_rule, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Skipped as duplicate"),
        count_cell(summary.skipped_duplicate, Color::Yellow),
    ]);
    table.add_row(vec![
        Cell::new("Failed reference lookups"),
        count_cell(summary.failed_reference_lookups, Color::Red),
    ]);
    println!("{table}");
}

pub fn print_summary_json(summary: &RunSummary) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// One row per declared source column: its rename target and the rule
/// attached to it, if any.
pub fn print_mapping(spec: &MappingSpec) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source column"),
        header_cell("Target field"),
        header_cell("Rule"),
        header_cell("Parameter"),
    ]);
    apply_table_style(&mut table);

    for column in spec.source_columns() {
        let target = spec
            .field_map()
            .iter()
            .find(|(_, source)| *source == column)
            .map(|(target, _)| target.as_str());
        let rule = target
            .or(Some(column.as_str()))
            .and_then(|key| spec.transforms().get(key));
        table.add_row(vec![
            Cell::new(column),
            match target {
                Some(target) => Cell::new(target),
                None => dim_cell("-"),
            },
            match rule {
                Some(rule) => Cell::new(rule_label(rule.code)),
                None => dim_cell("-"),
            },
            match rule {
                Some(rule) if !rule.param.is_empty() => Cell::new(&rule.param),
                _ => dim_cell("-"),
            },
        ]);
    }
    println!("{table}");
}

fn rule_label(code: TransformCode) -> &'static str {
    match code {
        TransformCode::Skip => "skip",
        TransformCode::SkipIfU => "skip_if_u",
        TransformCode::SkipIfJ => "skip_if_j",
        TransformCode::ParentId => "parent_id",
        TransformCode::VisitationAddressId => "visitation_address_id",
        TransformCode::ExternalId => "external_id",
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn count_cell(value: u64, color: Color) -> Cell {
    if value > 0 {
        Cell::new(value).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(value)
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
