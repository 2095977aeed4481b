use super::CampaignQuery;
use crate::error::QueryError;
use crate::model::{Campaign, CampaignSortField, SortDirection};
use crate::store::DataSource;
use std::cmp::Ordering;

/// Campaigns matching the query's status, sorted by its field and direction.
pub fn list<S: DataSource + ?Sized>(
    source: &S,
    query: &CampaignQuery,
) -> Result<Vec<Campaign>, QueryError> {
    let mut campaigns: Vec<Campaign> = source
        .campaigns()?
        .into_iter()
        .filter(|campaign| query.status.matches(&campaign.status))
        .collect();
    sort(&mut campaigns, query.sort_field, query.direction);
    Ok(campaigns)
}

/// Stable sort: campaigns with equal keys keep their relative source order in
/// both directions.
pub fn sort(campaigns: &mut [Campaign], field: CampaignSortField, direction: SortDirection) {
    campaigns.sort_by(|a, b| {
        let ordering = compare(a, b, field);
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Total order on `field`. Text compares case-insensitively, `createdAt` as a
/// calendar date, and a missing budget sorts before any present one.
pub fn compare(a: &Campaign, b: &Campaign, field: CampaignSortField) -> Ordering {
    match field {
        CampaignSortField::Id => compare_text(&a.id, &b.id),
        CampaignSortField::Name => compare_text(&a.name, &b.name),
        CampaignSortField::Status => a.status.as_str().cmp(b.status.as_str()),
        CampaignSortField::TotalLeads => a.total_leads.cmp(&b.total_leads),
        CampaignSortField::SuccessfulLeads => a.successful_leads.cmp(&b.successful_leads),
        CampaignSortField::ResponseRate => a.response_rate.cmp(&b.response_rate),
        CampaignSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        CampaignSortField::Budget => a.budget.cmp(&b.budget),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

/// The campaign with `id`, `None` when the id is empty or unknown.
pub fn find<S: DataSource + ?Sized>(
    source: &S,
    id: &str,
) -> Result<Option<Campaign>, QueryError> {
    if id.is_empty() {
        return Ok(None);
    }
    Ok(source
        .campaigns()?
        .into_iter()
        .find(|campaign| campaign.id == id))
}
