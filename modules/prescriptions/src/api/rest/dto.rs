use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::catalog::Role;
use crate::domain::error::DomainError;
use crate::domain::model::{
    DEFAULT_PAGE_SIZE, DailyCount, DateRange, NewPrescription, Page, PageRequest, Prescription,
    PrescriptionEdit,
};

/// Day format used by the report endpoint.
pub const REPORT_DATE_FORMAT: &str = "%d-%m-%Y";

/// REST DTO for a stored prescription.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionDto {
    pub id: i64,
    pub prescription_date: NaiveDate,
    pub name: String,
    pub age: i32,
    pub gender: String,
    pub diagnosis: String,
    pub medicines: String,
    pub next_visit_date: Option<NaiveDate>,
}

impl From<Prescription> for PrescriptionDto {
    fn from(p: Prescription) -> Self {
        Self {
            id: p.id,
            prescription_date: p.prescription_date,
            name: p.name,
            age: p.age,
            gender: p.gender,
            diagnosis: p.diagnosis,
            medicines: p.medicines,
            next_visit_date: p.next_visit_date,
        }
    }
}

/// Request body for `POST /prescriptions`.
///
/// Text fields default to empty so a missing field is reported the same way
/// as a blank one.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePrescriptionReq {
    pub prescription_date: Option<NaiveDate>,
    #[serde(default)]
    pub name: String,
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub medicines: String,
    #[serde(default)]
    pub next_visit_date: Option<NaiveDate>,
}

impl TryFrom<CreatePrescriptionReq> for NewPrescription {
    type Error = DomainError;

    fn try_from(req: CreatePrescriptionReq) -> Result<Self, Self::Error> {
        Ok(Self {
            prescription_date: req
                .prescription_date
                .ok_or_else(|| DomainError::validation("prescriptionDate", "is required"))?,
            name: req.name,
            age: req
                .age
                .ok_or_else(|| DomainError::validation("age", "is required"))?,
            gender: req.gender,
            diagnosis: req.diagnosis,
            medicines: req.medicines,
            next_visit_date: req.next_visit_date,
        })
    }
}

/// Request body for `PATCH /prescriptions/{id}`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditPrescriptionReq {
    #[serde(default)]
    pub name: String,
    pub age: Option<i32>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub medicines: String,
    #[serde(default)]
    pub next_visit_date: Option<NaiveDate>,
}

impl TryFrom<EditPrescriptionReq> for PrescriptionEdit {
    type Error = DomainError;

    fn try_from(req: EditPrescriptionReq) -> Result<Self, Self::Error> {
        Ok(Self {
            name: req.name,
            age: req
                .age
                .ok_or_else(|| DomainError::validation("age", "is required"))?,
            gender: req.gender,
            diagnosis: req.diagnosis,
            medicines: req.medicines,
            next_visit_date: req.next_visit_date,
        })
    }
}

/// Query string of `GET /prescription`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based page number, default 1
    pub page: Option<u64>,
    /// Page size, default 10, at most 100
    pub size: Option<u64>,
    /// First prescription date to include (ISO 8601)
    pub start_date: Option<NaiveDate>,
    /// Last prescription date to include (ISO 8601)
    pub end_date: Option<NaiveDate>,
}

impl ListQuery {
    /// # Errors
    /// Returns [`DomainError::Validation`] for bad paging or a half-open date range.
    pub fn to_domain(&self) -> Result<(PageRequest, Option<DateRange>), DomainError> {
        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;
        let range = match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
            (None, None) => None,
            (Some(_), None) => {
                return Err(DomainError::validation(
                    "endDate",
                    "is required when startDate is given",
                ));
            }
            (None, Some(_)) => {
                return Err(DomainError::validation(
                    "startDate",
                    "is required when endDate is given",
                ));
            }
        };
        Ok((page, range))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionPageDto {
    pub content: Vec<PrescriptionDto>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl From<Page<Prescription>> for PrescriptionPageDto {
    fn from(p: Page<Prescription>) -> Self {
        Self {
            content: p.content.into_iter().map(Into::into).collect(),
            page: p.page,
            size: p.size,
            total_elements: p.total_elements,
            total_pages: p.total_pages,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DailyCountDto {
    /// Day formatted as `dd-mm-yyyy`
    pub date: String,
    pub count: u64,
}

impl From<DailyCount> for DailyCountDto {
    fn from(c: DailyCount) -> Self {
        Self {
            date: c.date.format(REPORT_DATE_FORMAT).to_string(),
            count: c.count,
        }
    }
}

/// Status envelope returned by mutating endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    /// HTTP status code
    pub status: u16,
    pub message: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: http::StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrescriptionEnvelope {
    pub status: u16,
    pub message: String,
    pub data: PrescriptionDto,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InteractionsEnvelope {
    pub status: u16,
    pub message: String,
    /// Upstream body, passed through untouched
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RoleDto {
    pub name: String,
    pub permissions: BTreeSet<String>,
}

impl From<&Role> for RoleDto {
    fn from(r: &Role) -> Self {
        Self {
            name: r.name.clone(),
            permissions: r.permissions.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PrivilegeDto {
    pub permission: String,
    pub roles: BTreeSet<String>,
}

#[must_use]
pub fn privileges_to_dto(privileges: BTreeMap<&str, BTreeSet<&str>>) -> Vec<PrivilegeDto> {
    privileges
        .into_iter()
        .map(|(permission, roles)| PrivilegeDto {
            permission: permission.to_owned(),
            roles: roles.into_iter().map(str::to_owned).collect(),
        })
        .collect()
}
