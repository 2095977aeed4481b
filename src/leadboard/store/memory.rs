use super::{DataSource, StatePersistence};
use crate::error::{LeadboardError, QueryError, Result, ValidationError};
use crate::model::{Campaign, Lead};
use crate::state::PersistedViewState;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

const SEED: &str = include_str!("seed.json");

#[derive(Deserialize)]
struct Seed {
    leads: Vec<Lead>,
    campaigns: Vec<Campaign>,
}

/// Static, validated lead and campaign collections.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    leads: Vec<Lead>,
    campaigns: Vec<Campaign>,
}

impl InMemorySource {
    /// Build a source from explicit records, rejecting any that break a model constraint.
    pub fn new(leads: Vec<Lead>, campaigns: Vec<Campaign>) -> Result<Self> {
        for lead in &leads {
            lead.validate()?;
        }
        ensure_unique("lead", leads.iter().map(|l| l.id.as_str()))?;

        for campaign in &campaigns {
            campaign.validate()?;
        }
        ensure_unique("campaign", campaigns.iter().map(|c| c.id.as_str()))?;

        Ok(Self { leads, campaigns })
    }

    /// The bundled sample data: five campaigns and eight leads.
    pub fn seeded() -> Result<Self> {
        let seed: Seed = serde_json::from_str(SEED)?;
        Self::new(seed.leads, seed.campaigns)
    }
}

fn ensure_unique<'a>(kind: &'static str, ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            }
            .into());
        }
    }
    Ok(())
}

impl DataSource for InMemorySource {
    fn leads(&self) -> std::result::Result<Vec<Lead>, QueryError> {
        Ok(self.leads.clone())
    }

    fn campaigns(&self) -> std::result::Result<Vec<Campaign>, QueryError> {
        Ok(self.campaigns.clone())
    }
}

/// In-memory persisted view state. Clones share the same slot, so a test can
/// hand one clone to a store, drop the store, and restore a new one from
/// another clone as if the process had restarted.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStatePersistence {
    slot: Arc<Mutex<Option<PersistedViewState>>>,
}

impl InMemoryStatePersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Option<PersistedViewState> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

impl StatePersistence for InMemoryStatePersistence {
    fn load(&self) -> Result<Option<PersistedViewState>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| LeadboardError::State("state slot poisoned".to_string()))?;
        Ok(slot.clone())
    }

    fn save(&mut self, state: &PersistedViewState) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| LeadboardError::State("state slot poisoned".to_string()))?;
        *slot = Some(state.clone());
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{CampaignStatus, LeadStatus};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn lead(id: &str, name: &str, status: LeadStatus) -> Lead {
        Lead {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            company: format!("{} Ltd", name),
            campaign_id: "1".to_string(),
            campaign_name: "Fixture Campaign".to_string(),
            status,
            last_contact_date: date(2024, 3, 1),
            created_at: date(2024, 1, 1),
            phone: None,
            notes: None,
            value: None,
        }
    }

    pub fn campaign(id: &str, name: &str, status: CampaignStatus) -> Campaign {
        Campaign {
            id: id.to_string(),
            name: name.to_string(),
            status,
            total_leads: 0,
            successful_leads: 0,
            response_rate: 0,
            created_at: date(2024, 1, 1),
            description: None,
            budget: None,
        }
    }

    /// Builder for sources with hand-picked records.
    #[derive(Default)]
    pub struct SourceFixture {
        leads: Vec<Lead>,
        campaigns: Vec<Campaign>,
    }

    impl SourceFixture {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_lead(mut self, lead: Lead) -> Self {
            self.leads.push(lead);
            self
        }

        pub fn with_leads(mut self, count: usize, status: LeadStatus) -> Self {
            let start = self.leads.len();
            for i in start..start + count {
                let name = format!("Lead {}", i + 1);
                self.leads.push(lead(&(i + 1).to_string(), &name, status));
            }
            self
        }

        pub fn with_campaign(mut self, campaign: Campaign) -> Self {
            self.campaigns.push(campaign);
            self
        }

        pub fn build(self) -> InMemorySource {
            InMemorySource::new(self.leads, self.campaigns).unwrap()
        }
    }

    /// Wraps a source and counts every read, for verifying cache behaviour.
    pub struct CountingSource<S> {
        inner: S,
        lead_reads: AtomicUsize,
        campaign_reads: AtomicUsize,
    }

    impl<S> CountingSource<S> {
        pub fn new(inner: S) -> Self {
            Self {
                inner,
                lead_reads: AtomicUsize::new(0),
                campaign_reads: AtomicUsize::new(0),
            }
        }

        pub fn lead_reads(&self) -> usize {
            self.lead_reads.load(Ordering::SeqCst)
        }

        pub fn campaign_reads(&self) -> usize {
            self.campaign_reads.load(Ordering::SeqCst)
        }
    }

    impl<S: DataSource> DataSource for CountingSource<S> {
        fn leads(&self) -> std::result::Result<Vec<Lead>, QueryError> {
            self.lead_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.leads()
        }

        fn campaigns(&self) -> std::result::Result<Vec<Campaign>, QueryError> {
            self.campaign_reads.fetch_add(1, Ordering::SeqCst);
            self.inner.campaigns()
        }
    }

    /// A source whose backend is always down.
    pub struct UnavailableSource;

    impl DataSource for UnavailableSource {
        fn leads(&self) -> std::result::Result<Vec<Lead>, QueryError> {
            Err(QueryError::SourceUnavailable("connection refused".into()))
        }

        fn campaigns(&self) -> std::result::Result<Vec<Campaign>, QueryError> {
            Err(QueryError::SourceUnavailable("connection refused".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::model::{CampaignStatus, LeadStatus, StatusFilter};

    #[test]
    fn seed_loads_and_validates() {
        let source = InMemorySource::seeded().unwrap();
        assert_eq!(source.leads().unwrap().len(), 8);
        assert_eq!(source.campaigns().unwrap().len(), 5);
    }

    #[test]
    fn seed_preserves_insertion_order() {
        let source = InMemorySource::seeded().unwrap();
        let ids: Vec<_> = source.leads().unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn seed_campaign_counts_hold_invariant() {
        let source = InMemorySource::seeded().unwrap();
        for campaign in source.campaigns().unwrap() {
            assert!(campaign.successful_leads <= campaign.total_leads);
        }
    }

    #[test]
    fn seed_response_rate_is_stored_not_derived() {
        let source = InMemorySource::seeded().unwrap();
        let holiday = source
            .campaigns()
            .unwrap()
            .into_iter()
            .find(|c| c.name == "Holiday Special Promo")
            .unwrap();
        // 85 / 200 = 42.5
        assert_eq!(holiday.response_rate, 42);
        assert_eq!(holiday.derived_response_rate(), 43);
    }

    #[test]
    fn rejects_duplicate_ids() {
        let result = InMemorySource::new(
            vec![
                lead("1", "A", LeadStatus::Pending),
                lead("1", "B", LeadStatus::Pending),
            ],
            vec![],
        );
        assert!(matches!(
            result,
            Err(LeadboardError::Validation(ValidationError::DuplicateId {
                kind: "lead",
                ..
            }))
        ));
    }

    #[test]
    fn rejects_invalid_campaign() {
        let mut bad = campaign("1", "Bad", CampaignStatus::Active);
        bad.total_leads = 1;
        bad.successful_leads = 2;
        assert!(InMemorySource::new(vec![], vec![bad]).is_err());
    }

    #[test]
    fn in_memory_persistence_is_shared_between_clones() {
        let mut writer = InMemoryStatePersistence::new();
        let reader = writer.clone();
        assert!(reader.load().unwrap().is_none());

        let state = PersistedViewState {
            sidebar_collapsed: true,
            leads_status_filter: StatusFilter::Only(LeadStatus::Responded),
            campaigns_status_filter: StatusFilter::All,
        };
        writer.save(&state).unwrap();
        assert_eq!(reader.load().unwrap(), Some(state));
    }
}
