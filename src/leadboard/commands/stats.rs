use super::{CampaignStats, DashboardStats, LeadStats, RECENT_LEADS};
use crate::error::QueryError;
use crate::model::{Campaign, CampaignStatus, Lead, LeadStatus};
use crate::store::DataSource;

pub fn lead_stats<S: DataSource + ?Sized>(source: &S) -> Result<LeadStats, QueryError> {
    Ok(summarize_leads(&source.leads()?))
}

pub fn summarize_leads(leads: &[Lead]) -> LeadStats {
    leads.iter().fold(
        LeadStats {
            all: leads.len(),
            ..LeadStats::default()
        },
        |mut stats, lead| {
            match lead.status {
                LeadStatus::Pending => stats.pending += 1,
                LeadStatus::Contacted => stats.contacted += 1,
                LeadStatus::Responded => stats.responded += 1,
                LeadStatus::Converted => stats.converted += 1,
            }
            stats
        },
    )
}

pub fn campaign_stats<S: DataSource + ?Sized>(source: &S) -> Result<CampaignStats, QueryError> {
    Ok(summarize_campaigns(&source.campaigns()?))
}

pub fn summarize_campaigns(campaigns: &[Campaign]) -> CampaignStats {
    let total_leads: u64 = campaigns.iter().map(|c| u64::from(c.total_leads)).sum();
    let successful_leads: u64 = campaigns.iter().map(|c| u64::from(c.successful_leads)).sum();

    CampaignStats {
        total_campaigns: campaigns.len(),
        active_campaigns: campaigns
            .iter()
            .filter(|c| c.status == CampaignStatus::Active)
            .count(),
        total_leads,
        successful_leads,
        avg_response_rate: average_response_rate(successful_leads, total_leads),
    }
}

/// `100 * successful / total` rounded to one decimal place, 0 when `total` is 0.
pub fn average_response_rate(successful: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = successful as f64 / total as f64 * 100.0;
    (rate * 10.0).round() / 10.0
}

pub fn dashboard_stats<S: DataSource + ?Sized>(source: &S) -> Result<DashboardStats, QueryError> {
    Ok(summarize_dashboard(&source.leads()?, &source.campaigns()?))
}

pub fn summarize_dashboard(leads: &[Lead], campaigns: &[Campaign]) -> DashboardStats {
    let converted: Vec<&Lead> = leads
        .iter()
        .filter(|l| l.status == LeadStatus::Converted)
        .collect();

    DashboardStats {
        total_leads: leads.len(),
        converted_leads: converted.len(),
        active_campaigns: campaigns
            .iter()
            .filter(|c| c.status == CampaignStatus::Active)
            .count(),
        conversion_rate: conversion_rate(converted.len(), leads.len()),
        total_revenue: converted.iter().filter_map(|l| l.value).sum(),
        recent_leads: leads.iter().take(RECENT_LEADS).cloned().collect(),
    }
}

/// Whole-percent conversion rate, halves rounding up.
pub fn conversion_rate(converted: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (converted as f64 / total as f64 * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::{campaign, lead, SourceFixture};
    use crate::store::memory::InMemorySource;
    use proptest::prelude::*;

    #[test]
    fn seed_lead_stats() {
        let stats = lead_stats(&InMemorySource::seeded().unwrap()).unwrap();
        assert_eq!(
            stats,
            LeadStats {
                all: 8,
                pending: 2,
                contacted: 2,
                responded: 2,
                converted: 2,
            }
        );
    }

    #[test]
    fn seed_campaign_stats() {
        let stats = campaign_stats(&InMemorySource::seeded().unwrap()).unwrap();
        assert_eq!(stats.total_campaigns, 5);
        assert_eq!(stats.active_campaigns, 2);
        assert_eq!(stats.total_leads, 506);
        assert_eq!(stats.successful_leads, 174);
        // 174 / 506 = 34.387...
        assert_eq!(stats.avg_response_rate, 34.4);
    }

    #[test]
    fn no_leads_means_zero_rate() {
        let source = SourceFixture::new()
            .with_campaign(campaign("1", "Empty", CampaignStatus::Draft))
            .build();
        let stats = campaign_stats(&source).unwrap();
        assert_eq!(stats.total_leads, 0);
        assert_eq!(stats.avg_response_rate, 0.0);
    }

    #[test]
    fn empty_collections() {
        assert_eq!(summarize_leads(&[]), LeadStats::default());
        assert_eq!(summarize_campaigns(&[]), CampaignStats::default());
        assert_eq!(summarize_dashboard(&[], &[]), DashboardStats::default());
    }

    #[test]
    fn seed_dashboard_stats() {
        let stats = dashboard_stats(&InMemorySource::seeded().unwrap()).unwrap();
        assert_eq!(stats.total_leads, 8);
        assert_eq!(stats.converted_leads, 2);
        assert_eq!(stats.active_campaigns, 2);
        assert_eq!(stats.conversion_rate, 25);
        // 45000 + 35000
        assert_eq!(stats.total_revenue, 80_000);
        let recent: Vec<_> = stats.recent_leads.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(recent, ["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn revenue_counts_only_converted_leads_with_a_value() {
        let mut won = lead("1", "Won", LeadStatus::Converted);
        won.value = Some(1_000);
        let unpriced = lead("2", "Unpriced", LeadStatus::Converted);
        let mut open = lead("3", "Open", LeadStatus::Responded);
        open.value = Some(50_000);

        let source = SourceFixture::new()
            .with_lead(won)
            .with_lead(unpriced)
            .with_lead(open)
            .build();
        let stats = dashboard_stats(&source).unwrap();
        assert_eq!(stats.total_revenue, 1_000);
        assert_eq!(stats.converted_leads, 2);
        // 2 / 3 = 66.67
        assert_eq!(stats.conversion_rate, 67);
        assert_eq!(stats.recent_leads.len(), 3);
    }

    #[test]
    fn conversion_rate_rounds_halves_up() {
        assert_eq!(conversion_rate(0, 0), 0);
        assert_eq!(conversion_rate(1, 8), 13);
        assert_eq!(conversion_rate(1, 200), 1);
        assert_eq!(conversion_rate(3, 3), 100);
    }

    proptest! {
        #[test]
        fn lead_counts_sum_to_total(statuses in prop::collection::vec(0usize..4, 0..100)) {
            let leads: Vec<_> = statuses
                .iter()
                .enumerate()
                .map(|(i, s)| lead(&i.to_string(), "L", LeadStatus::ALL[*s]))
                .collect();
            let stats = summarize_leads(&leads);
            prop_assert_eq!(stats.all, leads.len());
            prop_assert_eq!(stats.pending + stats.contacted + stats.responded + stats.converted, stats.all);
        }

        #[test]
        fn rate_has_one_decimal(successful in 0u64..10_000, extra in 0u64..10_000) {
            let total = successful + extra;
            let rate = average_response_rate(successful, total);
            if total == 0 {
                prop_assert_eq!(rate, 0.0);
            } else {
                let raw = successful as f64 / total as f64 * 100.0;
                prop_assert!((rate - raw).abs() <= 0.05 + 1e-9);
                prop_assert!(((rate * 10.0) - (rate * 10.0).round()).abs() < 1e-6);
                prop_assert!((0.0..=100.0).contains(&rate));
            }
        }
    }
}
