//! # View-State Store
//!
//! [`ViewStateStore`] is the single writer of the UI-facing filter, sort, and
//! selection state. Consumers read it through getters and change it only
//! through setters; there is no global instance, the application root owns one
//! and passes it where it is needed.
//!
//! Every setter writes the persisted subset ([`PersistedViewState`]) through the
//! store's [`StatePersistence`] backend:
//!
//! | field                     | persisted |
//! |---------------------------|-----------|
//! | `sidebar_collapsed`       | yes       |
//! | `leads_status_filter`     | yes       |
//! | `campaigns_status_filter` | yes       |
//! | everything else           | no, resets to default on restart |
//!
//! The string setters parse first and leave the state untouched on error.

use crate::commands::{CampaignQuery, LeadQuery};
use crate::error::Result;
use crate::model::{
    CampaignSortField, CampaignStatusFilter, LeadStatusFilter, SortDirection,
};
use crate::store::StatePersistence;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// The subset of [`ViewState`] that survives a restart.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PersistedViewState {
    pub sidebar_collapsed: bool,
    pub leads_status_filter: LeadStatusFilter,
    pub campaigns_status_filter: CampaignStatusFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub sidebar_collapsed: bool,
    pub selected_lead_id: Option<String>,
    pub lead_detail_open: bool,
    pub leads_search_term: String,
    pub leads_status_filter: LeadStatusFilter,
    pub campaigns_status_filter: CampaignStatusFilter,
    pub campaigns_sort_field: CampaignSortField,
    pub campaigns_sort_direction: SortDirection,
}

impl ViewState {
    /// Defaults with the persisted fields reapplied.
    pub fn from_persisted(persisted: PersistedViewState) -> Self {
        Self {
            sidebar_collapsed: persisted.sidebar_collapsed,
            leads_status_filter: persisted.leads_status_filter,
            campaigns_status_filter: persisted.campaigns_status_filter,
            ..Self::default()
        }
    }

    pub fn persisted(&self) -> PersistedViewState {
        PersistedViewState {
            sidebar_collapsed: self.sidebar_collapsed,
            leads_status_filter: self.leads_status_filter,
            campaigns_status_filter: self.campaigns_status_filter,
        }
    }

    pub fn leads_query(&self) -> LeadQuery {
        LeadQuery::new(self.leads_search_term.clone(), self.leads_status_filter)
    }

    pub fn campaigns_query(&self) -> CampaignQuery {
        CampaignQuery::new(
            self.campaigns_status_filter,
            self.campaigns_sort_field,
            self.campaigns_sort_direction,
        )
    }
}

pub struct ViewStateStore<P: StatePersistence> {
    state: ViewState,
    persistence: P,
}

impl<P: StatePersistence> ViewStateStore<P> {
    /// Start from defaults plus whatever `persistence` holds.
    pub fn restore(persistence: P) -> Result<Self> {
        let state = match persistence.load()? {
            Some(persisted) => {
                info!(
                    sidebar_collapsed = persisted.sidebar_collapsed,
                    leads_status_filter = %persisted.leads_status_filter,
                    campaigns_status_filter = %persisted.campaigns_status_filter,
                    "restored view state"
                );
                ViewState::from_persisted(persisted)
            }
            None => {
                info!("no persisted view state, using defaults");
                ViewState::default()
            }
        };
        Ok(Self { state, persistence })
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn leads_query(&self) -> LeadQuery {
        self.state.leads_query()
    }

    pub fn campaigns_query(&self) -> CampaignQuery {
        self.state.campaigns_query()
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.state.sidebar_collapsed
    }

    pub fn selected_lead_id(&self) -> Option<&str> {
        self.state.selected_lead_id.as_deref()
    }

    pub fn lead_detail_open(&self) -> bool {
        self.state.lead_detail_open
    }

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) -> Result<()> {
        self.update(|s| s.sidebar_collapsed = collapsed)
    }

    pub fn toggle_sidebar(&mut self) -> Result<()> {
        self.update(|s| s.sidebar_collapsed = !s.sidebar_collapsed)
    }

    pub fn set_selected_lead_id(&mut self, id: Option<String>) -> Result<()> {
        self.update(|s| s.selected_lead_id = id)
    }

    pub fn set_lead_detail_open(&mut self, open: bool) -> Result<()> {
        self.update(|s| s.lead_detail_open = open)
    }

    pub fn set_leads_search_term(&mut self, term: impl Into<String>) -> Result<()> {
        let term = term.into();
        self.update(|s| s.leads_search_term = term)
    }

    pub fn set_leads_status_filter(&mut self, filter: LeadStatusFilter) -> Result<()> {
        self.update(|s| s.leads_status_filter = filter)
    }

    pub fn set_leads_status_filter_str(&mut self, filter: &str) -> Result<()> {
        let filter = filter.parse()?;
        self.set_leads_status_filter(filter)
    }

    pub fn set_campaigns_status_filter(&mut self, filter: CampaignStatusFilter) -> Result<()> {
        self.update(|s| s.campaigns_status_filter = filter)
    }

    pub fn set_campaigns_status_filter_str(&mut self, filter: &str) -> Result<()> {
        let filter = filter.parse()?;
        self.set_campaigns_status_filter(filter)
    }

    pub fn set_campaigns_sort_field(&mut self, field: CampaignSortField) -> Result<()> {
        self.update(|s| s.campaigns_sort_field = field)
    }

    pub fn set_campaigns_sort_field_str(&mut self, field: &str) -> Result<()> {
        let field = field.parse()?;
        self.set_campaigns_sort_field(field)
    }

    pub fn set_campaigns_sort_direction(&mut self, direction: SortDirection) -> Result<()> {
        self.update(|s| s.campaigns_sort_direction = direction)
    }

    pub fn set_campaigns_sort_direction_str(&mut self, direction: &str) -> Result<()> {
        let direction = direction.parse()?;
        self.set_campaigns_sort_direction(direction)
    }

    /// Column-header sort: the current field flips direction, any other field
    /// becomes the sort field in ascending order.
    pub fn sort_campaigns_by(&mut self, field: CampaignSortField) -> Result<()> {
        self.update(|s| {
            if s.campaigns_sort_field == field {
                s.campaigns_sort_direction = s.campaigns_sort_direction.reversed();
            } else {
                s.campaigns_sort_field = field;
                s.campaigns_sort_direction = SortDirection::Asc;
            }
        })
    }

    pub fn sort_campaigns_by_str(&mut self, field: &str) -> Result<()> {
        let field = field.parse()?;
        self.sort_campaigns_by(field)
    }

    /// Search term back to empty, status filter back to `all`.
    pub fn reset_leads_filters(&mut self) -> Result<()> {
        self.update(|s| {
            s.leads_search_term.clear();
            s.leads_status_filter = LeadStatusFilter::All;
        })
    }

    /// Status filter `all`, sorted by name ascending.
    pub fn reset_campaigns_filters(&mut self) -> Result<()> {
        self.update(|s| {
            s.campaigns_status_filter = CampaignStatusFilter::All;
            s.campaigns_sort_field = CampaignSortField::Name;
            s.campaigns_sort_direction = SortDirection::Asc;
        })
    }

    /// Apply `change` only once its persisted subset has been saved.
    fn update(&mut self, change: impl FnOnce(&mut ViewState)) -> Result<()> {
        let mut next = self.state.clone();
        change(&mut next);
        self.persistence.save(&next.persisted())?;
        debug!(state = ?next, "view state changed");
        self.state = next;
        Ok(())
    }
}
