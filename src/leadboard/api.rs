//! # API Facade
//!
//! The single entry point for any UI. [`LeadboardApi`] owns the [`QueryClient`]
//! and the [`ViewStateStore`] and wires one to the other: view-driven reads build
//! their query parameters from the current view state, and every state change
//! goes through a setter here.
//!
//! ## What the API Does NOT Do
//!
//! - **Query logic**: filtering, sorting and aggregation live in `commands/`
//! - **Caching policy**: that is `cache.rs` and `query.rs`
//! - **Presentation**: no stdout, no formatting; results are plain data
//!
//! ## Superseded responses
//!
//! The leads and campaigns views each track their newest request with a
//! [`LatestResponse`]. `current_leads` and `current_campaigns` return a
//! [`Resolved`]: `Accepted` when the call still holds the view's newest ticket,
//! `Superseded` when another call for the same view was issued while it was in
//! flight. Setters take `&mut self` and so never overlap a read; they cancel the
//! view's ticket so that any stale ticket held elsewhere is rejected.
//!
//! ## Generic Over Backends
//!
//! - Production: `LeadboardApi<InMemorySource, FileStatePersistence>`
//! - Testing: `LeadboardApi<CountingSource<_>, InMemoryStatePersistence>`

use crate::cache::{LatestResponse, Resolved};
use crate::commands::{
    CampaignQuery, CampaignStats, DashboardStats, LeadPage, LeadQuery, LeadStats,
};
use crate::error::Result;
use crate::model::{
    Campaign, CampaignSortField, CampaignStatusFilter, Lead, LeadStatusFilter, SortDirection,
};
use crate::query::QueryClient;
use crate::state::{ViewState, ViewStateStore};
use crate::store::{DataSource, StatePersistence};

pub struct LeadboardApi<S: DataSource + 'static, P: StatePersistence> {
    queries: QueryClient<S>,
    view: ViewStateStore<P>,
    leads_view: LatestResponse,
    campaigns_view: LatestResponse,
}

impl<S: DataSource + 'static, P: StatePersistence> LeadboardApi<S, P> {
    pub fn new(queries: QueryClient<S>, view: ViewStateStore<P>) -> Self {
        Self {
            queries,
            view,
            leads_view: LatestResponse::new(),
            campaigns_view: LatestResponse::new(),
        }
    }

    pub fn queries(&self) -> &QueryClient<S> {
        &self.queries
    }

    pub fn view_state(&self) -> &ViewState {
        self.view.state()
    }

    // --- View-driven reads ---

    /// Leads for the current search term and status filter.
    pub async fn current_leads(&self) -> Result<Resolved<Vec<Lead>>> {
        let ticket = self.leads_view.issue();
        let leads = self.queries.leads(&self.view.leads_query()).await?;
        Ok(self.leads_view.resolve(ticket, leads))
    }

    pub async fn current_leads_page(&self, page_index: usize) -> Result<LeadPage> {
        Ok(self
            .queries
            .leads_page(&self.view.leads_query(), page_index)
            .await?)
    }

    /// Every page for the current leads query, concatenated.
    pub async fn current_leads_all_pages(&self) -> Result<Vec<Lead>> {
        Ok(self
            .queries
            .collect_all_leads(&self.view.leads_query())
            .await?)
    }

    pub async fn current_campaigns(&self) -> Result<Resolved<Vec<Campaign>>> {
        let ticket = self.campaigns_view.issue();
        let campaigns = self.queries.campaigns(self.view.campaigns_query()).await?;
        Ok(self.campaigns_view.resolve(ticket, campaigns))
    }

    /// The lead in the detail panel, if one is selected and exists.
    pub async fn selected_lead(&self) -> Result<Option<Lead>> {
        match self.view.selected_lead_id() {
            Some(id) => Ok(self.queries.lead(id).await?),
            None => Ok(None),
        }
    }

    // --- Direct queries ---

    pub async fn leads(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
        Ok(self.queries.leads(query).await?)
    }

    pub async fn leads_page(&self, query: &LeadQuery, page_index: usize) -> Result<LeadPage> {
        Ok(self.queries.leads_page(query, page_index).await?)
    }

    pub async fn lead(&self, id: &str) -> Result<Option<Lead>> {
        Ok(self.queries.lead(id).await?)
    }

    pub async fn campaigns(&self, query: CampaignQuery) -> Result<Vec<Campaign>> {
        Ok(self.queries.campaigns(query).await?)
    }

    pub async fn campaign(&self, id: &str) -> Result<Option<Campaign>> {
        Ok(self.queries.campaign(id).await?)
    }

    pub async fn lead_stats(&self) -> Result<LeadStats> {
        Ok(self.queries.lead_stats().await?)
    }

    pub async fn campaign_stats(&self) -> Result<CampaignStats> {
        Ok(self.queries.campaign_stats().await?)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats> {
        Ok(self.queries.dashboard_stats().await?)
    }

    // --- View-state setters ---

    pub fn set_sidebar_collapsed(&mut self, collapsed: bool) -> Result<()> {
        self.view.set_sidebar_collapsed(collapsed)
    }

    pub fn toggle_sidebar(&mut self) -> Result<()> {
        self.view.toggle_sidebar()
    }

    /// Select a lead and open its detail panel.
    pub fn select_lead(&mut self, id: impl Into<String>) -> Result<()> {
        self.view.set_selected_lead_id(Some(id.into()))?;
        self.view.set_lead_detail_open(true)
    }

    pub fn close_lead_detail(&mut self) -> Result<()> {
        self.view.set_lead_detail_open(false)?;
        self.view.set_selected_lead_id(None)
    }

    pub fn set_leads_search_term(&mut self, term: impl Into<String>) -> Result<()> {
        self.leads_view.cancel();
        self.view.set_leads_search_term(term)
    }

    pub fn set_leads_status_filter(&mut self, filter: LeadStatusFilter) -> Result<()> {
        self.leads_view.cancel();
        self.view.set_leads_status_filter(filter)
    }

    pub fn set_leads_status_filter_str(&mut self, filter: &str) -> Result<()> {
        self.view.set_leads_status_filter_str(filter)?;
        self.leads_view.cancel();
        Ok(())
    }

    pub fn set_campaigns_status_filter(&mut self, filter: CampaignStatusFilter) -> Result<()> {
        self.campaigns_view.cancel();
        self.view.set_campaigns_status_filter(filter)
    }

    pub fn set_campaigns_status_filter_str(&mut self, filter: &str) -> Result<()> {
        self.view.set_campaigns_status_filter_str(filter)?;
        self.campaigns_view.cancel();
        Ok(())
    }

    pub fn set_campaigns_sort_field(&mut self, field: CampaignSortField) -> Result<()> {
        self.campaigns_view.cancel();
        self.view.set_campaigns_sort_field(field)
    }

    pub fn set_campaigns_sort_field_str(&mut self, field: &str) -> Result<()> {
        self.view.set_campaigns_sort_field_str(field)?;
        self.campaigns_view.cancel();
        Ok(())
    }

    pub fn set_campaigns_sort_direction(&mut self, direction: SortDirection) -> Result<()> {
        self.campaigns_view.cancel();
        self.view.set_campaigns_sort_direction(direction)
    }

    pub fn set_campaigns_sort_direction_str(&mut self, direction: &str) -> Result<()> {
        self.view.set_campaigns_sort_direction_str(direction)?;
        self.campaigns_view.cancel();
        Ok(())
    }

    /// Sort the campaigns view as a click on a column header would.
    pub fn sort_campaigns_by(&mut self, field: CampaignSortField) -> Result<()> {
        self.campaigns_view.cancel();
        self.view.sort_campaigns_by(field)
    }

    pub fn sort_campaigns_by_str(&mut self, field: &str) -> Result<()> {
        self.view.sort_campaigns_by_str(field)?;
        self.campaigns_view.cancel();
        Ok(())
    }

    pub fn reset_leads_filters(&mut self) -> Result<()> {
        self.leads_view.cancel();
        self.view.reset_leads_filters()
    }

    pub fn reset_campaigns_filters(&mut self) -> Result<()> {
        self.campaigns_view.cancel();
        self.view.reset_campaigns_filters()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeadboardConfig;
    use crate::model::{CampaignStatus, LeadStatus, StatusFilter};
    use crate::store::memory::fixtures::CountingSource;
    use crate::store::memory::{InMemorySource, InMemoryStatePersistence};

    type TestApi = LeadboardApi<CountingSource<InMemorySource>, InMemoryStatePersistence>;

    fn make_api() -> TestApi {
        let source = CountingSource::new(InMemorySource::seeded().unwrap());
        let queries = QueryClient::new(source, LeadboardConfig::instant());
        let view = ViewStateStore::restore(InMemoryStatePersistence::new()).unwrap();
        LeadboardApi::new(queries, view)
    }

    #[tokio::test]
    async fn current_leads_follow_view_filters() {
        let mut api = make_api();
        assert_eq!(api.current_leads().await.unwrap().into_inner().len(), 8);

        api.set_leads_status_filter(StatusFilter::Only(LeadStatus::Converted))
            .unwrap();
        let converted = api.current_leads().await.unwrap();
        assert!(converted.is_accepted());
        let converted = converted.into_inner();
        assert_eq!(converted.len(), 2);
        assert!(converted.iter().all(|l| l.status == LeadStatus::Converted));
    }

    #[tokio::test]
    async fn filter_change_rejects_ticket_issued_before_it() {
        let mut api = make_api();
        let ticket = api.leads_view.issue();
        api.set_leads_search_term("sarah").unwrap();

        // A response for the old parameters arrives after the change.
        assert!(!api.leads_view.resolve(ticket, Vec::<Lead>::new()).is_accepted());

        let shown = api.current_leads().await.unwrap();
        assert!(shown.is_accepted());
        assert_eq!(shown.into_inner().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_reads_report_the_older_one_as_superseded() {
        let source = CountingSource::new(InMemorySource::seeded().unwrap());
        let queries = QueryClient::new(source, LeadboardConfig::default());
        let view = ViewStateStore::restore(InMemoryStatePersistence::new()).unwrap();
        let api = LeadboardApi::new(queries, view);

        let (older, newer) = tokio::join!(api.current_leads(), api.current_leads());
        let (older, newer) = (older.unwrap(), newer.unwrap());

        assert!(matches!(older, Resolved::Superseded(_)));
        assert!(matches!(newer, Resolved::Accepted(_)));
        assert_eq!(older.into_inner(), newer.into_inner());
        assert_eq!(api.queries().fetch_count(), 1);
    }

    #[tokio::test]
    async fn current_campaigns_follow_sort() {
        let mut api = make_api();
        api.set_campaigns_status_filter_str("active").unwrap();
        api.set_campaigns_sort_field_str("responseRate").unwrap();
        api.set_campaigns_sort_direction(SortDirection::Desc).unwrap();

        let rates: Vec<u8> = api
            .current_campaigns()
            .await
            .unwrap()
            .into_inner()
            .iter()
            .map(|c| c.response_rate)
            .collect();
        assert_eq!(rates, [36, 30]);

        api.reset_campaigns_filters().unwrap();
        assert_eq!(api.current_campaigns().await.unwrap().into_inner().len(), 5);
    }

    #[tokio::test]
    async fn header_sort_toggles_then_switches_field() {
        let mut api = make_api();
        let ids = |campaigns: Vec<Campaign>| -> Vec<String> {
            campaigns.into_iter().map(|c| c.id).collect()
        };

        api.sort_campaigns_by(CampaignSortField::Id).unwrap();
        let ascending = ids(api.current_campaigns().await.unwrap().into_inner());
        assert_eq!(ascending, ["1", "2", "3", "4", "5"]);

        api.sort_campaigns_by(CampaignSortField::Id).unwrap();
        let descending = ids(api.current_campaigns().await.unwrap().into_inner());
        assert_eq!(descending, ["5", "4", "3", "2", "1"]);

        api.sort_campaigns_by_str("totalLeads").unwrap();
        assert_eq!(
            api.view_state().campaigns_sort_field,
            CampaignSortField::TotalLeads
        );
        assert_eq!(api.view_state().campaigns_sort_direction, SortDirection::Asc);
    }

    #[tokio::test]
    async fn select_and_close_lead_detail() {
        let mut api = make_api();
        assert_eq!(api.selected_lead().await.unwrap(), None);

        api.select_lead("2").unwrap();
        assert!(api.view_state().lead_detail_open);
        assert_eq!(api.selected_lead().await.unwrap().unwrap().name, "Michael Chen");

        api.close_lead_detail().unwrap();
        assert!(!api.view_state().lead_detail_open);
        assert_eq!(api.view_state().selected_lead_id, None);
        assert_eq!(api.selected_lead().await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_sort_field_leaves_view_unchanged() {
        let mut api = make_api();
        assert!(api.set_campaigns_sort_field_str("description").is_err());
        assert_eq!(api.view_state().campaigns_sort_field, CampaignSortField::Name);
    }

    #[tokio::test]
    async fn pages_cover_current_query() {
        let mut api = make_api();
        api.set_leads_status_filter(StatusFilter::Only(LeadStatus::Pending))
            .unwrap();

        let first = api.current_leads_page(0).await.unwrap();
        assert_eq!(first.total_count, 2);
        assert!(first.next_cursor.is_none());
        assert_eq!(
            api.current_leads_all_pages().await.unwrap(),
            api.current_leads().await.unwrap().into_inner()
        );
    }

    #[tokio::test]
    async fn stats_pass_through() {
        let api = make_api();
        assert_eq!(api.lead_stats().await.unwrap().all, 8);
        let stats = api.campaign_stats().await.unwrap();
        assert_eq!(stats.total_campaigns, 5);
        assert_eq!(api.dashboard_stats().await.unwrap().total_revenue, 80_000);
        assert_eq!(
            api.campaign("2").await.unwrap().map(|c| c.status),
            Some(CampaignStatus::Active)
        );
    }
}
