use colored::{ColoredString, Colorize};
use leadboard::commands::{CampaignStats, DashboardStats, LeadPage, LeadStats};
use leadboard::model::{Campaign, CampaignStatus, Lead, LeadStatus};
use leadboard::state::ViewState;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ID_WIDTH: usize = 4;
const NAME_WIDTH: usize = 20;
const COMPANY_WIDTH: usize = 22;
const STATUS_WIDTH: usize = 11;
const CAMPAIGN_WIDTH: usize = 26;
const LABEL_WIDTH: usize = 16;

pub(super) fn print_message(message: &str) {
    println!("{}", message.dimmed());
}

pub(super) fn print_warning(message: &str) {
    println!("{}", message.yellow());
}

pub(super) fn render_leads(leads: &[Lead]) -> String {
    if leads.is_empty() {
        return "No leads found.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        header(&[
            ("ID", ID_WIDTH),
            ("Name", NAME_WIDTH),
            ("Company", COMPANY_WIDTH),
            ("Status", STATUS_WIDTH),
            ("Campaign", CAMPAIGN_WIDTH),
            ("Last contact", 0),
        ])
    ));
    for lead in leads {
        out.push_str(&format!(
            "{}{}{}{}{}{}\n",
            cell(&lead.id, ID_WIDTH).dimmed(),
            cell(&lead.name, NAME_WIDTH).bold(),
            cell(&lead.company, COMPANY_WIDTH),
            lead_status(lead.status, STATUS_WIDTH),
            cell(&lead.campaign_name, CAMPAIGN_WIDTH),
            lead.last_contact_date
        ));
    }
    out
}

pub(super) fn render_lead_page(page: &LeadPage, page_index: usize) -> String {
    let mut out = render_leads(&page.items);
    let footer = match page.next_cursor {
        Some(next) => format!(
            "Page {} · {} of {} leads · next page: {}",
            page_index,
            page.items.len(),
            page.total_count,
            next
        ),
        None => format!(
            "Page {} · {} of {} leads · last page",
            page_index,
            page.items.len(),
            page.total_count
        ),
    };
    out.push_str(&format!("{}\n", footer.dimmed()));
    out
}

pub(super) fn render_lead_detail(lead: &Lead) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", lead.id.yellow(), lead.name.bold()));
    out.push_str("--------------------------------\n");
    out.push_str(&field("Email", &lead.email));
    out.push_str(&field("Company", &lead.company));
    out.push_str(&format!(
        "{}{}\n",
        cell("Status", LABEL_WIDTH).dimmed(),
        lead_status(lead.status, 0)
    ));
    out.push_str(&field(
        "Campaign",
        &format!("{} ({})", lead.campaign_name, lead.campaign_id),
    ));
    out.push_str(&field("Last contact", &lead.last_contact_date.to_string()));
    out.push_str(&field("Created", &lead.created_at.to_string()));
    if let Some(phone) = &lead.phone {
        out.push_str(&field("Phone", phone));
    }
    if let Some(value) = lead.value {
        out.push_str(&field("Value", &format_money(value)));
    }
    if let Some(notes) = &lead.notes {
        out.push_str(&field("Notes", notes));
    }
    out
}

pub(super) fn render_campaigns(campaigns: &[Campaign]) -> String {
    if campaigns.is_empty() {
        return "No campaigns found.\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!(
        "{}\n",
        header(&[
            ("ID", ID_WIDTH),
            ("Name", CAMPAIGN_WIDTH),
            ("Status", STATUS_WIDTH),
            ("Leads", 8),
            ("Won", 6),
            ("Rate", 7),
            ("Created", 12),
            ("Budget", 0),
        ])
    ));
    for campaign in campaigns {
        let budget = campaign.budget.map(format_money).unwrap_or_else(|| "-".into());
        out.push_str(&format!(
            "{}{}{}{:<8}{:<6}{:<7}{:<12}{}\n",
            cell(&campaign.id, ID_WIDTH).dimmed(),
            cell(&campaign.name, CAMPAIGN_WIDTH).bold(),
            campaign_status(campaign.status, STATUS_WIDTH),
            campaign.total_leads,
            campaign.successful_leads,
            format!("{}%", campaign.response_rate),
            campaign.created_at.to_string(),
            budget
        ));
    }
    out
}

pub(super) fn render_campaign_detail(campaign: &Campaign) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} {}\n",
        campaign.id.yellow(),
        campaign.name.bold()
    ));
    out.push_str("--------------------------------\n");
    out.push_str(&format!(
        "{}{}\n",
        cell("Status", LABEL_WIDTH).dimmed(),
        campaign_status(campaign.status, 0)
    ));
    out.push_str(&field("Leads", &campaign.total_leads.to_string()));
    out.push_str(&field("Successful", &campaign.successful_leads.to_string()));
    out.push_str(&field("Response rate", &format!("{}%", campaign.response_rate)));
    out.push_str(&field("Created", &campaign.created_at.to_string()));
    if let Some(budget) = campaign.budget {
        out.push_str(&field("Budget", &format_money(budget)));
    }
    if let Some(description) = &campaign.description {
        out.push_str(&field("Description", description));
    }
    out
}

pub(super) fn render_stats(leads: &LeadStats, campaigns: &CampaignStats) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Leads".bold()));
    out.push_str(&field("Total", &leads.all.to_string()));
    out.push_str(&field("Pending", &leads.pending.to_string()));
    out.push_str(&field("Contacted", &leads.contacted.to_string()));
    out.push_str(&field("Responded", &leads.responded.to_string()));
    out.push_str(&field("Converted", &leads.converted.to_string()));
    out.push('\n');
    out.push_str(&format!("{}\n", "Campaigns".bold()));
    out.push_str(&field("Total", &campaigns.total_campaigns.to_string()));
    out.push_str(&field("Active", &campaigns.active_campaigns.to_string()));
    out.push_str(&field("Leads", &campaigns.total_leads.to_string()));
    out.push_str(&field("Successful", &campaigns.successful_leads.to_string()));
    out.push_str(&field(
        "Avg. response",
        &format!("{:.1}%", campaigns.avg_response_rate),
    ));
    out
}

pub(super) fn render_dashboard(stats: &DashboardStats) -> String {
    let mut out = String::new();
    out.push_str(&field("Total leads", &stats.total_leads.to_string()));
    out.push_str(&field("Live campaigns", &stats.active_campaigns.to_string()));
    out.push_str(&field(
        "Conversion rate",
        &format!("{}%", stats.conversion_rate),
    ));
    out.push_str(&field("Revenue", &format_money(stats.total_revenue)));
    out.push('\n');
    out.push_str(&format!("{}\n", "Recent leads".bold()));
    out.push_str(&render_leads(&stats.recent_leads));
    out
}

pub(super) fn render_view_state(state: &ViewState) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "Saved".bold()));
    out.push_str(&field(
        "Sidebar",
        if state.sidebar_collapsed {
            "collapsed"
        } else {
            "expanded"
        },
    ));
    out.push_str(&field("Lead status", &state.leads_status_filter.to_string()));
    out.push_str(&field(
        "Campaign status",
        &state.campaigns_status_filter.to_string(),
    ));
    out.push('\n');
    out.push_str(&format!("{}\n", "This session".bold()));
    out.push_str(&field("Search", &state.leads_search_term));
    out.push_str(&field(
        "Selected lead",
        state.selected_lead_id.as_deref().unwrap_or("-"),
    ));
    out.push_str(&field(
        "Campaign sort",
        &format!(
            "{} {}",
            state.campaigns_sort_field, state.campaigns_sort_direction
        ),
    ));
    out
}

fn field(label: &str, value: &str) -> String {
    format!("{}{}\n", cell(label, LABEL_WIDTH).dimmed(), value)
}

fn header(columns: &[(&str, usize)]) -> String {
    columns
        .iter()
        .map(|(title, width)| cell(title, *width))
        .collect::<String>()
        .underline()
        .to_string()
}

fn lead_status(status: LeadStatus, width: usize) -> ColoredString {
    let text = cell(status.as_str(), width);
    match status {
        LeadStatus::Pending => text.yellow(),
        LeadStatus::Contacted => text.blue(),
        LeadStatus::Responded => text.cyan(),
        LeadStatus::Converted => text.green(),
    }
}

fn campaign_status(status: CampaignStatus, width: usize) -> ColoredString {
    let text = cell(status.as_str(), width);
    match status {
        CampaignStatus::Draft => text.dimmed(),
        CampaignStatus::Active => text.green(),
        CampaignStatus::Paused => text.yellow(),
        CampaignStatus::Completed => text.blue(),
    }
}

/// `s` truncated and padded to exactly `width` columns; width 0 leaves it as is.
fn cell(s: &str, width: usize) -> String {
    if width == 0 {
        return s.to_string();
    }
    let mut text = truncate_to_width(s, width.saturating_sub(1));
    let padding = width.saturating_sub(text.width());
    text.push_str(&" ".repeat(padding));
    text
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            result.push('…');
            return result;
        }
        result.push(c);
        current_width += char_width;
    }
    result
}

fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("${}", grouped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_pads_to_width() {
        assert_eq!(cell("abc", 6), "abc   ");
        assert_eq!(cell("abc", 0), "abc");
    }

    #[test]
    fn cell_truncates_long_text() {
        let out = cell("Tech Conference Follow-up", 10);
        assert_eq!(out.width(), 10);
        assert!(out.trim_end().ends_with('…'));
    }

    #[test]
    fn truncation_counts_wide_characters() {
        let out = truncate_to_width("日本語テキスト", 6);
        assert!(out.width() <= 6);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn money_is_grouped() {
        assert_eq!(format_money(0), "$0");
        assert_eq!(format_money(950), "$950");
        assert_eq!(format_money(15000), "$15,000");
        assert_eq!(format_money(1234567), "$1,234,567");
    }

    #[test]
    fn empty_lists_say_so() {
        colored::control::set_override(false);
        assert_eq!(render_leads(&[]), "No leads found.\n");
        assert_eq!(render_campaigns(&[]), "No campaigns found.\n");
    }
}
