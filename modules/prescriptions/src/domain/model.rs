use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::DomainError;

pub const MAX_AGE: i32 = 150;
pub const MAX_PAGE_SIZE: u64 = 100;
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A stored prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: i64,
    pub prescription_date: NaiveDate,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    pub next_visit_date: Option<NaiveDate>,
}

/// Data for a prescription that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrescription {
    pub prescription_date: NaiveDate,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    pub next_visit_date: Option<NaiveDate>,
}

/// Replacement values for an existing prescription.
///
/// The prescription date is fixed at creation and cannot be edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrescriptionEdit {
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    pub next_visit_date: Option<NaiveDate>,
}

impl NewPrescription {
    /// # Errors
    /// Returns [`DomainError::Validation`] naming the first offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_patient(&self.name, self.age, &self.gender)?;
        validate_treatment(&self.diagnosis, &self.medicines)?;
        validate_next_visit(self.prescription_date, self.next_visit_date)
    }
}

impl PrescriptionEdit {
    /// Checks the edit against the date of the prescription it replaces.
    ///
    /// # Errors
    /// Returns [`DomainError::Validation`] naming the first offending field.
    pub fn validate(&self, prescription_date: NaiveDate) -> Result<(), DomainError> {
        validate_patient(&self.name, self.age, &self.gender)?;
        validate_treatment(&self.diagnosis, &self.medicines)?;
        validate_next_visit(prescription_date, self.next_visit_date)
    }
}

fn require_text(field: &str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    Ok(())
}

fn validate_patient(name: &str, age: i32, gender: &str) -> Result<(), DomainError> {
    require_text("name", name)?;
    if !(0..=MAX_AGE).contains(&age) {
        return Err(DomainError::validation(
            "age",
            format!("must be between 0 and {MAX_AGE}"),
        ));
    }
    require_text("gender", gender)
}

fn validate_treatment(diagnosis: &str, medicines: &str) -> Result<(), DomainError> {
    require_text("diagnosis", diagnosis)?;
    require_text("medicines", medicines)
}

fn validate_next_visit(
    prescription_date: NaiveDate,
    next_visit_date: Option<NaiveDate>,
) -> Result<(), DomainError> {
    match next_visit_date {
        Some(next) if next < prescription_date => Err(DomainError::validation(
            "nextVisitDate",
            "must not be before the prescription date",
        )),
        _ => Ok(()),
    }
}

/// Inclusive range of prescription dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// # Errors
    /// Returns [`DomainError::Validation`] when `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DomainError> {
        if start > end {
            return Err(DomainError::validation(
                "startDate",
                "must not be after endDate",
            ));
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    size: u64,
}

impl PageRequest {
    /// # Errors
    /// Returns [`DomainError::Validation`] for page 0 or a size outside `1..=100`.
    pub fn new(page: u64, size: u64) -> Result<Self, DomainError> {
        if page == 0 {
            return Err(DomainError::validation("page", "must be at least 1"));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(DomainError::validation(
                "size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }
        Ok(Self { page, size })
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Zero-based index for storage paginators.
    #[must_use]
    pub fn index(&self) -> u64 {
        self.page - 1
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// Number of prescriptions written on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}
