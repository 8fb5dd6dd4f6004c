use analytics::{
    CorrelationRow, EfficiencyRow, LinearFit, OriginMetrics, PeriodMetrics, ShareSlice, ViewReport,
};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, ContentArrangement, Table};
use core_types::{PeriodOption, RowSet};

/// Shown wherever a metric is undefined.
const NOT_AVAILABLE: &str = "N/A";

fn count(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.0}"))
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn decimal(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn periods(options: &[PeriodOption]) -> Table {
    let mut out = table(["Label", "Raw value", "Year", "Month"]);
    for option in options {
        out.add_row(vec![
            option.label.clone(),
            option.value.clone(),
            option.period.year.to_string(),
            option.period.month.to_string(),
        ]);
    }
    out
}

pub fn row_set(rows: &RowSet) -> Table {
    let mut out = table(rows.columns.iter().map(String::as_str));
    for row in &rows.rows {
        out.add_row(row.iter().map(|cell| cell.label().unwrap_or_default()));
    }
    out
}

fn origins(metrics: &[OriginMetrics]) -> Table {
    let mut out = table([
        "Origem",
        "Contatos",
        "Aproveitados",
        "Vendas",
        "% Aproveit.",
        "Conv. Total",
        "Conv. Aproveitados",
        "Lead/Venda",
    ]);
    for m in metrics {
        out.add_row(vec![
            m.origin.clone(),
            count(m.contacts),
            count(m.qualified),
            count(m.sales),
            percent(m.qualified_share),
            percent(m.conversion),
            percent(m.qualified_conversion),
            decimal(m.contacts_per_sale),
        ]);
    }
    out
}

fn shares(slices: &[ShareSlice]) -> Table {
    let mut out = table(["Origem", "Contatos", "Share"]);
    for slice in slices {
        out.add_row(vec![
            slice.label.clone(),
            count(Some(slice.contacts)),
            percent(slice.share),
        ]);
    }
    out
}

fn monthly(periods: &[PeriodMetrics]) -> Table {
    let mut out = table([
        "Período",
        "Contatos",
        "Aproveitados",
        "Vendas",
        "Conv. Total",
        "Conv. Aproveitados",
    ]);
    for p in periods {
        out.add_row(vec![
            p.label.clone(),
            count(p.contacts),
            count(p.qualified),
            count(p.sales),
            percent(p.conversion),
            percent(p.qualified_conversion),
        ]);
    }
    out
}

fn efficiency(rows: &[EfficiencyRow]) -> Table {
    let mut out = table(["Origem", "Contatos", "Vendas", "Eficiência"]);
    for r in rows {
        out.add_row(vec![
            r.origin.clone(),
            count(Some(r.contacts)),
            count(Some(r.sales)),
            format!("{:.1}%", r.efficiency),
        ]);
    }
    out
}

fn correlations(rows: &[CorrelationRow]) -> Table {
    let mut out = table(["Canal", "Coeficiente", "Períodos"]);
    for r in rows {
        out.add_row(vec![
            r.origin.clone(),
            format!("{:.3}", r.coefficient),
            r.periods.to_string(),
        ]);
    }
    out
}

fn trendline(fit: Option<LinearFit>) -> String {
    fit.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |f| format!("vendas = {:.4} x + {:.2}", f.slope, f.intercept),
    )
}

/// Renders a view as titled terminal tables.
pub fn view(report: &ViewReport) -> Vec<(String, Table)> {
    match report {
        ViewReport::Summary {
            summary,
            distribution,
            top_conversion,
        } => {
            let mut headline = table(["Métrica", "Valor"]);
            let totals = &summary.totals;
            headline.add_row(vec!["Contatos".to_string(), count(totals.contacts)]);
            headline.add_row(vec!["Aproveitados".to_string(), count(totals.qualified)]);
            headline.add_row(vec!["Vendas".to_string(), count(totals.sales)]);
            headline.add_row(vec!["Conversão".to_string(), percent(summary.conversion)]);
            headline.add_row(vec![
                "Conversão de aproveitados".to_string(),
                percent(summary.qualified_conversion),
            ]);
            headline.add_row(vec![
                "% Aproveitamento".to_string(),
                percent(summary.qualified_share),
            ]);
            headline.add_row(vec![
                "Contatos por venda".to_string(),
                decimal(summary.contacts_per_sale),
            ]);
            vec![
                ("Visão geral".to_string(), headline),
                ("Distribuição por origem".to_string(), shares(distribution)),
                ("Top canais por conversão".to_string(), origins(top_conversion)),
            ]
        }
        ViewReport::OriginPerformance(metrics) => {
            vec![("Desempenho por origem".to_string(), origins(metrics))]
        }
        ViewReport::ConversionByChannel(metrics) => {
            vec![("Conversão por canal".to_string(), origins(metrics))]
        }
        ViewReport::MonthlyTrend(periods) => {
            vec![("Evolução mensal".to_string(), monthly(periods))]
        }
        ViewReport::TopChannels(top) => vec![
            ("Top canais - conversão total".to_string(), origins(&top.by_conversion)),
            (
                "Top canais - conversão de aproveitados".to_string(),
                origins(&top.by_qualified_conversion),
            ),
        ],
        ViewReport::SalesEfficiency(rows) => {
            vec![("Eficiência de vendas".to_string(), efficiency(rows))]
        }
        ViewReport::Correlation { best, worst } => vec![
            ("Melhores correlações".to_string(), correlations(best)),
            ("Piores correlações".to_string(), correlations(worst)),
        ],
        ViewReport::Scatter(scatter) => vec![
            (
                format!(
                    "Leads x vendas ({}; aproveitados: {})",
                    trendline(scatter.sales_on_contacts),
                    trendline(scatter.sales_on_qualified)
                ),
                origins(&scatter.points),
            ),
        ],
        ViewReport::Details(rows) => vec![("Detalhes".to_string(), row_set(rows))],
    }
}

/// Whether a view came out with nothing to show.
pub fn is_empty(report: &ViewReport) -> bool {
    match report {
        ViewReport::Summary { summary, .. } => summary.totals.contacts.is_none(),
        ViewReport::OriginPerformance(m) | ViewReport::ConversionByChannel(m) => m.is_empty(),
        ViewReport::MonthlyTrend(p) => p.is_empty(),
        ViewReport::TopChannels(top) => {
            top.by_conversion.is_empty() && top.by_qualified_conversion.is_empty()
        }
        ViewReport::SalesEfficiency(r) => r.is_empty(),
        ViewReport::Correlation { best, .. } => best.is_empty(),
        ViewReport::Scatter(s) => s.points.is_empty(),
        ViewReport::Details(rows) => rows.is_empty(),
    }
}
