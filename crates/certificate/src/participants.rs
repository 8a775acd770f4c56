//! Registration CSV ingestion and eligibility filtering
//!
//! Registration exports carry a header row; the columns used here are
//! located by name, so extra or reordered columns are fine:
//!
//! ```text
//! Status,Name,Country,WCA ID,...
//! a,Alice Smith,United Kingdom,,...
//! a,Li Wei (李伟),China,2024LIWE01,...
//! ```

use crate::Result;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

/// One row of a registration export
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Registration {
    /// Registration status (`a`/`accepted` when accepted)
    #[serde(rename = "Status", default)]
    pub status: String,

    /// Display name, possibly with an alternate part in parentheses
    #[serde(rename = "Name")]
    pub name: String,

    /// Prior competitor id; empty for newcomers
    #[serde(rename = "WCA ID", default)]
    pub prior_id: String,
}

impl Registration {
    /// Whether the registration was accepted
    ///
    /// Exports without a status column count as accepted.
    pub fn is_accepted(&self) -> bool {
        let status = self.status.trim();
        status.is_empty()
            || status.eq_ignore_ascii_case("a")
            || status.eq_ignore_ascii_case("accepted")
    }

    /// Whether this is the person's first competition
    pub fn is_newcomer(&self) -> bool {
        self.prior_id.trim().is_empty()
    }
}

/// Who gets a certificate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Eligibility {
    /// Also include competitors whose id was issued in this year
    pub include_year: Option<i32>,
}

impl Eligibility {
    /// Newcomers only
    pub fn newcomers() -> Self {
        Self::default()
    }

    /// Newcomers plus ids issued in `year`
    pub fn with_year(year: i32) -> Self {
        Self {
            include_year: Some(year),
        }
    }

    /// Whether `registration` qualifies
    pub fn admits(&self, registration: &Registration) -> bool {
        if !registration.is_accepted() {
            return false;
        }
        if registration.is_newcomer() {
            return true;
        }
        match self.include_year {
            Some(year) => registration.prior_id.trim().starts_with(&year.to_string()),
            None => false,
        }
    }
}

/// Read every registration from CSV data with a header row
pub fn read_csv<R: Read>(reader: R) -> Result<Vec<Registration>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut registrations = Vec::new();
    for record in csv_reader.deserialize() {
        registrations.push(record?);
    }
    Ok(registrations)
}

/// Read registrations from a CSV file
pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<Registration>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let registrations = read_csv(file)?;
    log::info!(
        "Read {} registrations from {}",
        registrations.len(),
        path.display()
    );
    Ok(registrations)
}

/// Display names of eligible registrations, sorted ascending
pub fn select_names(registrations: &[Registration], eligibility: Eligibility) -> Vec<String> {
    let mut names: Vec<String> = registrations
        .iter()
        .filter(|r| eligibility.admits(r))
        .map(|r| r.name.clone())
        .collect();
    names.sort();
    log::debug!(
        "{} of {} registrations eligible",
        names.len(),
        registrations.len()
    );
    names
}
