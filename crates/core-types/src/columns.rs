//! Canonical column names produced by normalization.

pub const PERIOD: &str = "periodo";
pub const ORIGIN: &str = "origem";
pub const CITY: &str = "cidade";
pub const CONTACTS: &str = "contatos";
pub const QUALIFIED: &str = "aproveitados";
pub const SALES: &str = "vendas";
pub const LEADS: &str = "leads";
pub const CONVERSION: &str = "conversao";

/// Columns whose cells are coerced to counts on ingestion and on decode.
pub const COUNT_COLUMNS: [&str; 5] = [CONTACTS, QUALIFIED, SALES, LEADS, CONVERSION];

pub fn is_count_column(name: &str) -> bool {
    COUNT_COLUMNS.contains(&name)
}
