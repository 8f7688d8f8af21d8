use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use linkage_core::{RunPlan, RunReport};
use linkage_model::SingletonPolicy;

pub fn print_run_summary(report: &RunReport, output: Option<&Path>) {
    match output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run, nothing written)"),
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Strategy"),
        header_cell("Threshold"),
        header_cell("Candidates"),
        header_cell("Matches"),
        header_cell("Score distribution"),
        header_cell("Time (ms)"),
    ]);
    apply_summary_table_style(&mut table);
    for index in [1, 2, 3, 5] {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for strategy in &report.strategies {
        let elapsed = strategy.block_time + strategy.classify_time;
        table.add_row(vec![
            Cell::new(&strategy.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(strategy.threshold),
            Cell::new(strategy.candidate_pairs),
            count_cell(strategy.matches, Color::Green),
            histogram_cell(&strategy.histogram.to_string()),
            dim_cell(elapsed.as_millis()),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(report.strategies.iter().map(|s| s.candidate_pairs).sum::<usize>())
            .add_attribute(Attribute::Bold),
        count_cell(report.matched_pairs, Color::Green).add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(report.total_time.as_millis()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    let mut totals = Table::new();
    totals.set_header(vec![header_cell("Result"), header_cell("Count")]);
    apply_summary_table_style(&mut totals);
    align_column(&mut totals, 1, CellAlignment::Right);
    let singleton_label = match report.singleton_policy {
        SingletonPolicy::Include => "Unmatched records (reported)",
        SingletonPolicy::Exclude => "Unmatched records (omitted)",
    };
    for (label, count) in [
        ("Records", report.records),
        ("Distinct matched pairs", report.unique_edges),
        ("Merges", report.cluster.unions),
        ("Groups written", report.groups),
        ("Groups with 2+ records", report.linked_groups),
        (singleton_label, report.singletons),
    ] {
        totals.add_row(vec![Cell::new(label), Cell::new(count)]);
    }
    println!("{totals}");
}

pub fn print_plan(plan: &RunPlan) {
    println!("Records: {}", plan.records);
    println!("Candidate ceiling per strategy: {}", plan.ceiling);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Strategy"),
        header_cell("Blocking"),
        header_cell("Threshold"),
        header_cell("Candidates"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for strategy in &plan.strategies {
        let status = if strategy.exceeds_ceiling {
            Cell::new("OVER CEILING")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        } else {
            Cell::new("ok").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&strategy.name)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(strategy.blocking.to_string()),
            Cell::new(strategy.threshold),
            Cell::new(strategy.candidate_pairs),
            status,
        ]);
    }
    println!("{table}");
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

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn histogram_cell(text: &str) -> Cell {
    if text.is_empty() {
        dim_cell("-")
    } else {
        Cell::new(text)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
