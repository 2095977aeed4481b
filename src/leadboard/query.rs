//! # Query Layer
//!
//! [`QueryClient`] exposes the seven read operations over a [`DataSource`], plus
//! the dashboard summary, each backed by its own [`QueryCache`]. A fetch sleeps for the configured latency
//! (the stand-in for network I/O) and then runs the matching pure function from
//! [`crate::commands`].
//!
//! | operation        | key                                   | staleness |
//! |------------------|---------------------------------------|-----------|
//! | `leads`          | `["leads", search, status]`           | list      |
//! | `leads_page`     | `["leads-infinite", search, status, page]` | list |
//! | `lead`           | `["lead", id]`                        | list      |
//! | `campaigns`      | `["campaigns", status, field, dir]`   | list      |
//! | `campaign`       | `["campaign", id]`                    | list      |
//! | `lead_stats`     | `["lead-stats"]`                      | stats     |
//! | `campaign_stats` | `["campaign-stats"]`                  | stats     |
//! | `dashboard_stats`| `["dashboard-stats"]`                 | stats     |
//!
//! Not-found is `Ok(None)`; an empty id resolves to `Ok(None)` without fetching.

use crate::cache::{QueryCache, QueryKey};
use crate::commands::{
    self, CampaignQuery, CampaignStats, DashboardStats, LeadPage, LeadQuery, LeadStats,
};
use crate::config::LeadboardConfig;
use crate::error::QueryError;
use crate::model::{Campaign, Lead};
use crate::store::DataSource;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub type QueryResult<T> = std::result::Result<T, QueryError>;

pub struct QueryClient<S> {
    source: Arc<S>,
    config: LeadboardConfig,
    leads: QueryCache<Vec<Lead>>,
    lead_pages: QueryCache<LeadPage>,
    lead: QueryCache<Option<Lead>>,
    campaigns: QueryCache<Vec<Campaign>>,
    campaign: QueryCache<Option<Campaign>>,
    lead_stats: QueryCache<LeadStats>,
    campaign_stats: QueryCache<CampaignStats>,
    dashboard_stats: QueryCache<DashboardStats>,
}

impl<S: DataSource + 'static> QueryClient<S> {
    pub fn new(source: S, config: LeadboardConfig) -> Self {
        let stale = config.stale_time();
        let stats_stale = config.stats_stale_time();
        Self {
            source: Arc::new(source),
            leads: QueryCache::new("leads", stale),
            lead_pages: QueryCache::new("leads-infinite", stale),
            lead: QueryCache::new("lead", stale),
            campaigns: QueryCache::new("campaigns", stale),
            campaign: QueryCache::new("campaign", stale),
            lead_stats: QueryCache::new("lead-stats", stats_stale),
            campaign_stats: QueryCache::new("campaign-stats", stats_stale),
            dashboard_stats: QueryCache::new("dashboard-stats", stats_stale),
            config,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &LeadboardConfig {
        &self.config
    }

    pub async fn leads(&self, query: &LeadQuery) -> QueryResult<Vec<Lead>> {
        let source = Arc::clone(&self.source);
        let latency = self.config.list_latency();
        let owned = query.clone();
        self.leads
            .get_or_fetch(QueryKey::Leads(query.clone()), move || async move {
                simulate_latency(latency).await;
                commands::leads::list(source.as_ref(), &owned)
            })
            .await
    }

    /// One zero-indexed page of [`commands::PAGE_SIZE`] leads.
    pub async fn leads_page(&self, query: &LeadQuery, page_index: usize) -> QueryResult<LeadPage> {
        let source = Arc::clone(&self.source);
        let latency = self.config.page_latency();
        let owned = query.clone();
        self.lead_pages
            .get_or_fetch(
                QueryKey::LeadsPage(query.clone(), page_index),
                move || async move {
                    simulate_latency(latency).await;
                    commands::leads::page(source.as_ref(), &owned, page_index)
                },
            )
            .await
    }

    /// Follow cursors from the first page and concatenate every page.
    pub async fn collect_all_leads(&self, query: &LeadQuery) -> QueryResult<Vec<Lead>> {
        let mut leads = Vec::new();
        let mut page_index = 0;
        loop {
            let page = self.leads_page(query, page_index).await?;
            leads.extend(page.items);
            match page.next_cursor {
                Some(cursor) => page_index = cursor.page_index(),
                None => return Ok(leads),
            }
        }
    }

    pub async fn lead(&self, id: &str) -> QueryResult<Option<Lead>> {
        if id.is_empty() {
            return Ok(None);
        }
        let source = Arc::clone(&self.source);
        let latency = self.config.get_latency();
        let owned = id.to_string();
        self.lead
            .get_or_fetch(QueryKey::Lead(id.to_string()), move || async move {
                simulate_latency(latency).await;
                commands::leads::find(source.as_ref(), &owned)
            })
            .await
    }

    pub async fn campaigns(&self, query: CampaignQuery) -> QueryResult<Vec<Campaign>> {
        let source = Arc::clone(&self.source);
        let latency = self.config.list_latency();
        self.campaigns
            .get_or_fetch(QueryKey::Campaigns(query), move || async move {
                simulate_latency(latency).await;
                commands::campaigns::list(source.as_ref(), &query)
            })
            .await
    }

    pub async fn campaign(&self, id: &str) -> QueryResult<Option<Campaign>> {
        if id.is_empty() {
            return Ok(None);
        }
        let source = Arc::clone(&self.source);
        let latency = self.config.get_latency();
        let owned = id.to_string();
        self.campaign
            .get_or_fetch(QueryKey::Campaign(id.to_string()), move || async move {
                simulate_latency(latency).await;
                commands::campaigns::find(source.as_ref(), &owned)
            })
            .await
    }

    pub async fn lead_stats(&self) -> QueryResult<LeadStats> {
        let source = Arc::clone(&self.source);
        let latency = self.config.stats_latency();
        self.lead_stats
            .get_or_fetch(QueryKey::LeadStats, move || async move {
                simulate_latency(latency).await;
                commands::stats::lead_stats(source.as_ref())
            })
            .await
    }

    pub async fn campaign_stats(&self) -> QueryResult<CampaignStats> {
        let source = Arc::clone(&self.source);
        let latency = self.config.stats_latency();
        self.campaign_stats
            .get_or_fetch(QueryKey::CampaignStats, move || async move {
                simulate_latency(latency).await;
                commands::stats::campaign_stats(source.as_ref())
            })
            .await
    }

    /// Totals, conversion rate, revenue and recent leads for the overview.
    pub async fn dashboard_stats(&self) -> QueryResult<DashboardStats> {
        let source = Arc::clone(&self.source);
        let latency = self.config.stats_latency();
        self.dashboard_stats
            .get_or_fetch(QueryKey::DashboardStats, move || async move {
                simulate_latency(latency).await;
                commands::stats::dashboard_stats(source.as_ref())
            })
            .await
    }

    /// Drop the cached value for `key` and discard any response still in flight for it.
    pub fn invalidate(&self, key: &QueryKey) {
        match key {
            QueryKey::Leads(_) => self.leads.invalidate(key),
            QueryKey::LeadsPage(..) => self.lead_pages.invalidate(key),
            QueryKey::Lead(_) => self.lead.invalidate(key),
            QueryKey::Campaigns(_) => self.campaigns.invalidate(key),
            QueryKey::Campaign(_) => self.campaign.invalidate(key),
            QueryKey::LeadStats => self.lead_stats.invalidate(key),
            QueryKey::CampaignStats => self.campaign_stats.invalidate(key),
            QueryKey::DashboardStats => self.dashboard_stats.invalidate(key),
        }
    }

    pub fn clear(&self) {
        debug!("clearing all query caches");
        self.leads.clear();
        self.lead_pages.clear();
        self.lead.clear();
        self.campaigns.clear();
        self.campaign.clear();
        self.lead_stats.clear();
        self.campaign_stats.clear();
        self.dashboard_stats.clear();
    }

    /// Fetches started across all operations.
    pub fn fetch_count(&self) -> usize {
        self.leads.fetch_count()
            + self.lead_pages.fetch_count()
            + self.lead.fetch_count()
            + self.campaigns.fetch_count()
            + self.campaign.fetch_count()
            + self.lead_stats.fetch_count()
            + self.campaign_stats.fetch_count()
            + self.dashboard_stats.fetch_count()
    }
}

async fn simulate_latency(latency: Duration) {
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }
}
