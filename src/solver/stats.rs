use std::collections::HashMap;

use prettytable::{Cell, Row, Table};
use serde::Serialize;

use crate::solver::constraint::{Constraint, ConstraintId};

/// Counters for a single constraint across one search run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PerConstraintStats {
    pub revisions: u64,
    pub prunings: u64,
    pub time_spent_micros: u64,
}

/// Aggregate counters for one search run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    pub nodes_visited: u64,
    pub backtracks: u64,
    pub solutions: u64,
    pub constraint_stats: HashMap<ConstraintId, PerConstraintStats>,
}

pub fn render_stats_table(stats: &SearchStats, constraints: &[Box<dyn Constraint>]) -> String {
    let mut table = Table::new();
    table.add_row(Row::new(vec![
        Cell::new("Constraint Type"),
        Cell::new("ID"),
        Cell::new("Description"),
        Cell::new("Revisions"),
        Cell::new("Prunings"),
        Cell::new("Time / Call (µs)"),
        Cell::new("Total Time (ms)"),
    ]));

    let mut sorted_stats: Vec<(&ConstraintId, &PerConstraintStats)> =
        stats.constraint_stats.iter().collect();
    sorted_stats.sort_by_key(|(_, stats)| stats.time_spent_micros);

    for (constraint_id, constraint_stats) in sorted_stats {
        let descriptor = constraints[*constraint_id].descriptor();
        let avg_time = if constraint_stats.revisions > 0 {
            constraint_stats.time_spent_micros as f64 / constraint_stats.revisions as f64
        } else {
            0.0
        };

        table.add_row(Row::new(vec![
            Cell::new(&descriptor.name),
            Cell::new(&constraint_id.to_string()),
            Cell::new(&descriptor.description),
            Cell::new(&constraint_stats.revisions.to_string()),
            Cell::new(&constraint_stats.prunings.to_string()),
            Cell::new(&format!("{avg_time:.2}")),
            Cell::new(&format!(
                "{:.2}",
                constraint_stats.time_spent_micros as f64 / 1000.0
            )),
        ]));
    }

    table.to_string()
}
