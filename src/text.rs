use chrono::{Datelike, Local};

pub const YEAR_PLACEHOLDER: &str = "{year}";

/// Replaces every `{year}` with the current local four-digit year.
pub fn replace_year_placeholder(template: &str) -> String {
    replace_year_placeholder_with(template, Local::now().year())
}

pub fn replace_year_placeholder_with(template: &str, year: i32) -> String {
    template.replace(YEAR_PLACEHOLDER, &format!("{year:04}"))
}
