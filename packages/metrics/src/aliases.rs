//! Built-in country name aliases.
//!
//! Maps names used by the world population CSV to the names used by the
//! world boundary `GeoJSON` where the two disagree beyond what
//! [`crate::normalize`] can reconcile.

use std::collections::BTreeMap;
use std::sync::LazyLock;

static ALIASES: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("United States", "United States of America"),
        ("DR Congo", "Democratic Republic of the Congo"),
        ("Tanzania", "United Republic of Tanzania"),
        ("Serbia", "Republic of Serbia"),
        ("Bahamas", "The Bahamas"),
        ("North Macedonia", "Macedonia"),
        ("Eswatini", "Swaziland"),
        ("Timor-Leste", "East Timor"),
        ("Czechia", "Czech Republic"),
        ("Cote d'Ivoire", "Ivory Coast"),
    ])
});

/// The boundary name for `population_name`, if it has a built-in alias.
#[must_use]
pub fn builtin_alias(population_name: &str) -> Option<&'static str> {
    ALIASES.get(population_name).copied()
}
