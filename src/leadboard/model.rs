//! Core value types: [`Lead`], [`Campaign`], their status enumerations, and the
//! filter/sort vocabulary shared by the query layer and the view state.
//!
//! These are plain values. Records are checked with `validate` by whoever builds
//! them (the data source, or a deserialization boundary in a real backend).

use crate::error::{QueryError, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Sentinel used wherever a status filter is disabled.
pub const ALL: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    Pending,
    Contacted,
    Responded,
    Converted,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 4] = [
        LeadStatus::Pending,
        LeadStatus::Contacted,
        LeadStatus::Responded,
        LeadStatus::Converted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LeadStatus::Pending => "pending",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Responded => "responded",
            LeadStatus::Converted => "converted",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LeadStatus {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeadStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QueryError::InvalidStatus {
                kind: "lead",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

impl CampaignStatus {
    pub const ALL: [CampaignStatus; 4] = [
        CampaignStatus::Draft,
        CampaignStatus::Active,
        CampaignStatus::Paused,
        CampaignStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Active => "active",
            CampaignStatus::Paused => "paused",
            CampaignStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignStatus {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CampaignStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| QueryError::InvalidStatus {
                kind: "campaign",
                value: s.to_string(),
            })
    }
}

/// Either every status (`all`) or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFilter<S> {
    All,
    Only(S),
}

impl<S> Default for StatusFilter<S> {
    fn default() -> Self {
        StatusFilter::All
    }
}

impl<S: PartialEq> StatusFilter<S> {
    pub fn matches(&self, status: &S) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

impl<S: fmt::Display> fmt::Display for StatusFilter<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str(ALL),
            StatusFilter::Only(status) => status.fmt(f),
        }
    }
}

impl<S: FromStr<Err = QueryError>> FromStr for StatusFilter<S> {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case(ALL) {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl<S: fmt::Display> Serialize for StatusFilter<S> {
    fn serialize<Z: Serializer>(&self, serializer: Z) -> Result<Z::Ok, Z::Error> {
        serializer.collect_str(self)
    }
}

impl<'de, S: FromStr<Err = QueryError>> Deserialize<'de> for StatusFilter<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

pub type LeadStatusFilter = StatusFilter<LeadStatus>;
pub type CampaignStatusFilter = StatusFilter<CampaignStatus>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            _ => Err(QueryError::InvalidSortDirection(s.to_string())),
        }
    }
}

/// Campaign attributes that support a total ordering.
///
/// `description` is free text and is not a sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CampaignSortField {
    Id,
    #[default]
    Name,
    Status,
    TotalLeads,
    SuccessfulLeads,
    ResponseRate,
    CreatedAt,
    Budget,
}

impl CampaignSortField {
    pub const ALL: [CampaignSortField; 8] = [
        CampaignSortField::Id,
        CampaignSortField::Name,
        CampaignSortField::Status,
        CampaignSortField::TotalLeads,
        CampaignSortField::SuccessfulLeads,
        CampaignSortField::ResponseRate,
        CampaignSortField::CreatedAt,
        CampaignSortField::Budget,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignSortField::Id => "id",
            CampaignSortField::Name => "name",
            CampaignSortField::Status => "status",
            CampaignSortField::TotalLeads => "totalLeads",
            CampaignSortField::SuccessfulLeads => "successfulLeads",
            CampaignSortField::ResponseRate => "responseRate",
            CampaignSortField::CreatedAt => "createdAt",
            CampaignSortField::Budget => "budget",
        }
    }
}

impl fmt::Display for CampaignSortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CampaignSortField {
    type Err = QueryError;

    /// Accepts `responseRate`, `response_rate` and `response-rate` alike.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        CampaignSortField::ALL
            .into_iter()
            .find(|field| field.as_str().to_ascii_lowercase() == wanted)
            .ok_or_else(|| QueryError::InvalidSortField(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    pub company: String,
    pub campaign_id: String,
    /// Copy of the campaign's name; not kept in sync if the campaign is renamed.
    pub campaign_name: String,
    pub status: LeadStatus,
    pub last_contact_date: NaiveDate,
    pub created_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<u64>,
}

impl Lead {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    pub total_leads: u32,
    pub successful_leads: u32,
    /// Stored independently of the lead counts; see [`Campaign::derived_response_rate`].
    pub response_rate: u8,
    pub created_at: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<u64>,
}

impl Campaign {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        if self.successful_leads > self.total_leads {
            return Err(ValidationError::SuccessfulExceedsTotal {
                id: self.id.clone(),
                successful: self.successful_leads,
                total: self.total_leads,
            });
        }
        if self.response_rate > 100 {
            return Err(ValidationError::ResponseRateOutOfRange {
                id: self.id.clone(),
                rate: self.response_rate,
            });
        }
        Ok(())
    }

    /// `round(successful / total * 100)`, or 0 for a campaign without leads.
    pub fn derived_response_rate(&self) -> u8 {
        if self.total_leads == 0 {
            return 0;
        }
        let rate = f64::from(self.successful_leads) / f64::from(self.total_leads) * 100.0;
        rate.round() as u8
    }
}
