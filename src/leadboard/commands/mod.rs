//! # Command Layer
//!
//! Pure query logic over a [`DataSource`](crate::store::DataSource): filtering,
//! sorting, pagination, lookup, and aggregation. Nothing here caches, sleeps, or
//! touches the view state; those concerns belong to [`crate::query`] and
//! [`crate::state`]. Every function reads the source, derives a fresh copy, and
//! never mutates source records.

use crate::model::{
    CampaignSortField, CampaignStatusFilter, Lead, LeadStatusFilter, SortDirection,
};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod campaigns;
pub mod leads;
pub mod stats;

/// Fixed page size for paginated lead listings.
pub const PAGE_SIZE: usize = 20;

/// How many leads the dashboard lists under recent activity.
pub const RECENT_LEADS: usize = 5;

/// Parameters of a lead listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct LeadQuery {
    /// Case-insensitive substring matched against name, email, company and
    /// campaign name. Empty matches everything.
    pub search_term: String,
    pub status: LeadStatusFilter,
}

impl LeadQuery {
    pub fn new(search_term: impl Into<String>, status: LeadStatusFilter) -> Self {
        Self {
            search_term: search_term.into(),
            status,
        }
    }

    pub fn matches(&self, lead: &Lead) -> bool {
        self.status.matches(&lead.status) && matches_search(lead, &self.search_term)
    }
}

fn matches_search(lead: &Lead, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    [
        &lead.name,
        &lead.email,
        &lead.company,
        &lead.campaign_name,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&needle))
}

/// Parameters of a campaign listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CampaignQuery {
    pub status: CampaignStatusFilter,
    pub sort_field: CampaignSortField,
    pub direction: SortDirection,
}

impl CampaignQuery {
    pub fn new(
        status: CampaignStatusFilter,
        sort_field: CampaignSortField,
        direction: SortDirection,
    ) -> Self {
        Self {
            status,
            sort_field,
            direction,
        }
    }
}

/// Opaque position of the next page in a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor(usize);

impl PageCursor {
    pub fn first() -> Self {
        PageCursor(0)
    }

    pub fn from_page_index(page_index: usize) -> Self {
        PageCursor(page_index)
    }

    pub fn page_index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One page of a filtered lead listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPage {
    pub items: Vec<Lead>,
    /// Present iff filtered results remain beyond this page.
    pub next_cursor: Option<PageCursor>,
    /// Size of the whole filtered set, not of this page.
    pub total_count: usize,
}

/// Lead counts per status over the entire, unfiltered collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LeadStats {
    pub all: usize,
    pub pending: usize,
    pub contacted: usize,
    pub responded: usize,
    pub converted: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignStats {
    pub total_campaigns: usize,
    pub active_campaigns: usize,
    pub total_leads: u64,
    pub successful_leads: u64,
    /// `100 * successful / total`, one decimal place; 0 without any leads.
    pub avg_response_rate: f64,
}

/// Headline figures for the dashboard overview.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_leads: usize,
    pub converted_leads: usize,
    pub active_campaigns: usize,
    /// `100 * converted / total` rounded to a whole percent; 0 without leads.
    pub conversion_rate: u32,
    /// Sum of `value` over converted leads, missing values counting as 0.
    pub total_revenue: u64,
    /// The first [`RECENT_LEADS`] leads in source order.
    pub recent_leads: Vec<Lead>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LeadStatus, StatusFilter};
    use crate::store::memory::fixtures::lead;

    #[test]
    fn search_matches_any_text_field_case_insensitively() {
        let mut l = lead("1", "Sarah Johnson", LeadStatus::Pending);
        l.company = "TechCorp Industries".into();
        l.campaign_name = "Q4 Enterprise Outreach".into();

        for term in ["sarah", "JOHNSON@", "techcorp", "enterprise", ""] {
            assert!(LeadQuery::new(term, StatusFilter::All).matches(&l), "{term}");
        }
        assert!(!LeadQuery::new("globex", StatusFilter::All).matches(&l));
    }

    #[test]
    fn status_and_search_must_both_match() {
        let l = lead("1", "Sarah Johnson", LeadStatus::Pending);
        assert!(LeadQuery::new("sarah", StatusFilter::Only(LeadStatus::Pending)).matches(&l));
        assert!(!LeadQuery::new("sarah", StatusFilter::Only(LeadStatus::Converted)).matches(&l));
    }

    #[test]
    fn cursor_exposes_page_index() {
        assert_eq!(PageCursor::first().page_index(), 0);
        assert_eq!(PageCursor::from_page_index(3).to_string(), "3");
    }
}
