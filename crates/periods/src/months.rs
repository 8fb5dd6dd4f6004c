//! Portuguese month names as the spreadsheets spell them.

pub const FULL_NAMES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

pub const ABBREVIATIONS: [&str; 12] = [
    "jan", "fev", "mar", "abr", "mai", "jun", "jul", "ago", "set", "out", "nov", "dez",
];

/// Month number for an exact, already lower-cased full name.
pub fn from_full_name(name: &str) -> Option<u32> {
    position(&FULL_NAMES, name)
}

/// Month number for an already lower-cased three-letter abbreviation.
pub fn from_abbreviation(abbr: &str) -> Option<u32> {
    position(&ABBREVIATIONS, abbr)
}

/// Abbreviation for `month` in `1..=12`.
pub fn abbreviation(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    ABBREVIATIONS.get(idx).copied()
}

fn position(table: &[&str; 12], needle: &str) -> Option<u32> {
    table
        .iter()
        .position(|m| *m == needle)
        .map(|i| i as u32 + 1)
}
