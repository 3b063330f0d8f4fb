use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ccda_cli::types::{BatchResult, FileSummary};
use ccda_model::{FileOutcome, Totals};

pub fn print_summary(result: &BatchResult) {
    println!("Report: {}", result.report_path().display());
    println!("{}", summary_table(result));
    let failed: Vec<&FileSummary> = result.failed_files().collect();
    if !failed.is_empty() {
        eprintln!("Failed documents:");
        for file in failed {
            match &file.error {
                Some(error) => eprintln!("- {}: {error}", file.name),
                None => eprintln!("- {}", file.name),
            }
        }
    }
}

fn summary_table(result: &BatchResult) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Document"),
        header_cell("Labs"),
        header_cell("Vitals"),
        header_cell("Labs (LOINC)"),
        header_cell("Vitals (LOINC)"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 5, CellAlignment::Center);

    for file in &result.files {
        table.add_row(file_row(file));
    }
    table.add_row(total_row(&result.totals));
    table
}

fn file_row(file: &FileSummary) -> Vec<Cell> {
    match &file.outcome {
        FileOutcome::Counted(counts) => vec![
            Cell::new(&file.name),
            count_cell(counts.labs.total),
            count_cell(counts.vitals.total),
            count_cell(counts.labs.codified),
            count_cell(counts.vitals.codified),
            Cell::new("✓").fg(Color::Green).add_attribute(Attribute::Bold),
        ],
        FileOutcome::Failed => vec![
            Cell::new(&file.name).fg(Color::Red),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            dim_cell("-"),
            Cell::new("failed").fg(Color::Red).add_attribute(Attribute::Bold),
        ],
    }
}

fn total_row(totals: &Totals) -> Vec<Cell> {
    let status = if totals.files_failed > 0 {
        Cell::new(format!("{} failed", totals.files_failed)).fg(Color::Red)
    } else {
        dim_cell(format!("{} ok", totals.files_succeeded))
    };
    vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(totals.labs).add_attribute(Attribute::Bold),
        Cell::new(totals.vitals).add_attribute(Attribute::Bold),
        Cell::new(totals.labs_w_loinc).add_attribute(Attribute::Bold),
        Cell::new(totals.vitals_w_loinc).add_attribute(Attribute::Bold),
        status.add_attribute(Attribute::Bold),
    ]
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
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

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
