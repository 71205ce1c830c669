use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use deltalake::arrow::array::Array;
use deltalake::arrow::error::ArrowError;
use deltalake::arrow::util::display::{ArrayFormatter, FormatOptions};

use bronze_cli::RunSummary;
use bronze_delta::TableContents;
use bronze_model::{HASH_KEY, HASH_VALUE, InstanceDefinition, METADATA_COLUMNS};

pub fn print_summary(summary: &RunSummary) {
    println!("Instance: {}", summary.instance);
    println!("Landing: {}", summary.landing);
    println!("Bronze: {}", summary.bronze);
    println!("{}", summary_table(summary));
    if !summary.added_columns.is_empty() {
        println!("Columns added to table schema: {}", summary.added_columns.join(", "));
    }
}

fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Load type"),
        header_cell("Files"),
        header_cell("Rows"),
        header_cell("Nulled values"),
        header_cell("Deleted objects"),
        header_cell("Version"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    let version = match (summary.version, summary.dry_run) {
        (Some(version), _) => Cell::new(version)
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        (None, true) => dim_cell("dry run"),
        (None, false) => dim_cell("-"),
    };
    table.add_row(vec![
        Cell::new(summary.delivery_mode.as_str())
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.files),
        Cell::new(summary.rows).add_attribute(Attribute::Bold),
        count_cell(summary.nulled_values, Color::Yellow),
        count_cell(summary.deleted_objects, Color::DarkGrey),
        version,
    ]);
    table
}

pub fn print_schema(definition: &InstanceDefinition) {
    println!("Instance: {}", definition.name);
    if let Some(description) = &definition.description {
        println!("{description}");
    }
    println!("{}", schema_table(definition));
}

fn schema_table(definition: &InstanceDefinition) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Type"),
        header_cell("Nullable"),
        header_cell("Length"),
        header_cell("Role"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Center);
    align_column(&mut table, 3, CellAlignment::Right);

    for column in definition.columns.columns() {
        let mut roles = Vec::new();
        if let Some(position) = definition.business_keys.iter().position(|k| *k == column.name) {
            roles.push(format!("business key #{}", position + 1));
        }
        if let Some(position) = definition.attributes.iter().position(|a| *a == column.name) {
            roles.push(format!("attribute #{}", position + 1));
        }
        table.add_row(vec![
            Cell::new(&column.name).add_attribute(Attribute::Bold),
            Cell::new(column.data_type.to_string()),
            flag_cell(column.nullable),
            column.length.map_or_else(|| dim_cell("-"), Cell::new),
            if roles.is_empty() {
                dim_cell("-")
            } else {
                Cell::new(roles.join(", "))
            },
        ]);
    }
    for name in METADATA_COLUMNS {
        let role = if name == HASH_KEY || name == HASH_VALUE {
            "hash"
        } else {
            "metadata"
        };
        table.add_row(vec![
            Cell::new(name).fg(Color::Cyan),
            Cell::new("string"),
            flag_cell(false),
            dim_cell("-"),
            dim_cell(role),
        ]);
    }
    table
}

pub fn print_preview(contents: &TableContents) -> Result<(), ArrowError> {
    println!(
        "Version {}: showing {} rows",
        contents.version,
        contents.num_rows()
    );
    println!("{}", preview_table(contents)?);
    Ok(())
}

fn preview_table(contents: &TableContents) -> Result<Table, ArrowError> {
    let mut table = Table::new();
    table.set_header(
        contents
            .schema
            .fields()
            .iter()
            .map(|field| header_cell(field.name())),
    );
    apply_table_style(&mut table);

    let options = FormatOptions::default();
    for batch in &contents.batches {
        let formatters = batch
            .columns()
            .iter()
            .map(|column| ArrayFormatter::try_new(column.as_ref(), &options))
            .collect::<Result<Vec<_>, _>>()?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(formatters.len());
            for (formatter, column) in formatters.iter().zip(batch.columns()) {
                if column.is_null(row) {
                    cells.push(dim_cell("null"));
                } else {
                    cells.push(Cell::new(formatter.value(row).try_to_string()?));
                }
            }
            table.add_row(cells);
        }
    }
    Ok(table)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn flag_cell(value: bool) -> Cell {
    if value {
        Cell::new("✓").fg(Color::Green)
    } else {
        dim_cell("-")
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
