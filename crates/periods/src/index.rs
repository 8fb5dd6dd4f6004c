use crate::resolver::{PeriodResolver, format};
use core_types::{CityTable, Period, PeriodOption, columns};
use std::collections::HashSet;

/// Builds the period selector options from every table's `periodo` column.
///
/// Labels are collected in table order, then row order. Each one is resolved, and labels that
/// do not land after 2000 are dropped. The first label seen for a month becomes that month's
/// representative, so the operator's own spelling is what gets displayed. The result is
/// sorted chronologically.
pub fn period_index(resolver: &PeriodResolver, tables: &[CityTable]) -> Vec<PeriodOption> {
    let mut seen_labels: HashSet<String> = HashSet::new();
    let mut seen_months: HashSet<Period> = HashSet::new();
    let mut options = Vec::new();

    for table in tables {
        for cell in table.column_cells(columns::PERIOD) {
            let Some(label) = cell.label() else {
                continue;
            };
            if !seen_labels.insert(label.clone()) {
                continue;
            }
            let period = resolver.resolve_cell(cell);
            if !period.is_plausible() {
                tracing::warn!(city = %table.city, label = %label, "Ignoring unresolvable period label.");
                continue;
            }
            if seen_months.insert(period) {
                options.push(PeriodOption {
                    value: label,
                    label: format(period),
                    period,
                });
            }
        }
    }

    options.sort_by_key(|o| o.period);
    options
}
