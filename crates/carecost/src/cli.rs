//! Terminal rendering for CLI lookups

use carecost_core::models::{PlanId, ProcedureSummary, SearchResults, StatsResult};
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};

fn table_with_header(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn money(value: f64) -> Cell {
    Cell::new(format!("${:.2}", value)).set_alignment(CellAlignment::Right)
}

pub fn print_plans(plans: &[PlanId], no_color: bool) {
    if plans.is_empty() {
        println!("No plans loaded");
        return;
    }

    let mut table = table_with_header(&["Insurance", "Type"], no_color);
    for plan in plans {
        table.add_row(vec![plan.insurance.as_str(), plan.plan_type.as_str()]);
    }
    println!("{table}");
}

pub fn print_procedures(procedures: &[ProcedureSummary], no_color: bool) {
    if procedures.is_empty() {
        println!("No matching procedures");
        return;
    }

    let mut table = table_with_header(&["Procedure", "Billing Code"], no_color);
    for procedure in procedures {
        table.add_row(vec![
            procedure.procedure_name.as_str(),
            procedure.billing_code.as_str(),
        ]);
    }
    println!("{table}");
}

pub fn print_results(results: &SearchResults, no_color: bool) {
    if let Some(kind) = results.error {
        eprintln!("{}", kind.message());
        return;
    }

    let show_distance = results.records.iter().any(|r| r.zip_distance.is_some());
    let mut headers = vec!["Rate", "Provider", "NPI", "City", "State", "Zip"];
    if show_distance {
        headers.push("Zip Delta");
    }

    let mut table = table_with_header(&headers, no_color);
    for record in &results.records {
        let mut row = vec![
            money(record.negotiated_rate),
            Cell::new(&record.provider_name),
            Cell::new(&record.provider_npi),
            Cell::new(&record.city),
            Cell::new(&record.state),
            Cell::new(&record.postal_code),
        ];
        if show_distance {
            row.push(Cell::new(
                record
                    .zip_distance
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ));
        }
        table.add_row(row);
    }
    println!("{table}");
    println!("{} providers", results.records.len());
}

pub fn print_stats(procedure: &str, stats: &StatsResult, no_color: bool) {
    if let Some(kind) = stats.error {
        eprintln!("{}", kind.message());
        return;
    }

    println!("{procedure}");
    let mut table = table_with_header(&["Plan", "Min", "Q1", "Median", "Q3", "Max"], no_color);
    for (plan, q) in &stats.data {
        table.add_row(vec![
            Cell::new(plan),
            money(q.min),
            money(q.q1),
            money(q.median),
            money(q.q3),
            money(q.max),
        ]);
    }
    println!("{table}");
}
