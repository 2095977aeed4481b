use super::{LeadPage, LeadQuery, PageCursor, PAGE_SIZE};
use crate::error::QueryError;
use crate::model::Lead;
use crate::store::DataSource;

/// Leads matching `query`, in source order.
pub fn list<S: DataSource + ?Sized>(source: &S, query: &LeadQuery) -> Result<Vec<Lead>, QueryError> {
    Ok(filter(source.leads()?, query))
}

pub fn filter(leads: Vec<Lead>, query: &LeadQuery) -> Vec<Lead> {
    leads.into_iter().filter(|lead| query.matches(lead)).collect()
}

/// Page `page_index` (zero-based) of the leads matching `query`.
pub fn page<S: DataSource + ?Sized>(
    source: &S,
    query: &LeadQuery,
    page_index: usize,
) -> Result<LeadPage, QueryError> {
    Ok(paginate(list(source, query)?, page_index))
}

/// Slice `[page_index * PAGE_SIZE, page_index * PAGE_SIZE + PAGE_SIZE)` out of
/// `filtered`. Out-of-range pages are empty and have no next cursor.
pub fn paginate(filtered: Vec<Lead>, page_index: usize) -> LeadPage {
    let total_count = filtered.len();
    let start = page_index.saturating_mul(PAGE_SIZE);
    let end = start.saturating_add(PAGE_SIZE);

    let items: Vec<Lead> = filtered
        .into_iter()
        .skip(start)
        .take(PAGE_SIZE)
        .collect();
    let next_cursor = (end < total_count).then(|| PageCursor::from_page_index(page_index + 1));

    LeadPage {
        items,
        next_cursor,
        total_count,
    }
}

/// The lead with `id`, `None` when the id is empty or unknown.
pub fn find<S: DataSource + ?Sized>(source: &S, id: &str) -> Result<Option<Lead>, QueryError> {
    if id.is_empty() {
        return Ok(None);
    }
    Ok(source.leads()?.into_iter().find(|lead| lead.id == id))
}
