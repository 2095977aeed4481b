//! # CLI Layer
//!
//! This module is **one possible UI client** for leadboard, standing in for a
//! dashboard's pages. It turns subcommands into view-state setter calls and
//! view-driven reads on the API, then prints the results.
//!
//! It is the only place that:
//! - Knows about stdout and stderr
//! - Installs a logging subscriber
//! - Builds the async runtime
//!
//! ## Saved vs. session options
//!
//! `--status` on `leads` and `campaigns` goes through the view-state setters, so
//! it is saved and applies to later runs. `--search`, `--sort` and `--direction`
//! are session-only and last for this invocation, as is `view sort`.
//!
//! ## Structure
//!
//! - `run()`: parse, set up logging and context, dispatch (called by `main.rs`)
//! - `handle_*()`: per-command handlers that call the API and print
//! - `emit()`: JSON or rendered table, depending on `--json`

use super::logging::init_logging;
use super::print::{
    print_message, print_warning, render_campaign_detail, render_campaigns, render_dashboard,
    render_lead_detail, render_lead_page, render_leads, render_stats, render_view_state,
};
use super::setup::{Cli, Commands, SidebarState, ViewCommands};
use clap::Parser;
use leadboard::error::Result;
use leadboard::init::{data_dir, initialize, LeadboardContext};
use serde::Serialize;

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let data_dir = data_dir()?;
    let mut ctx = initialize(&data_dir)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(dispatch(&mut ctx, cli))
}

async fn dispatch(ctx: &mut LeadboardContext, cli: Cli) -> Result<()> {
    let json = cli.json;
    match cli.command {
        Some(Commands::Leads {
            search,
            status,
            page,
            all_pages,
        }) => handle_leads(ctx, json, search, status, page, all_pages).await,
        Some(Commands::Lead { id }) => handle_lead(ctx, json, id).await,
        Some(Commands::Campaigns {
            status,
            sort,
            direction,
        }) => handle_campaigns(ctx, json, status, sort, direction).await,
        Some(Commands::Campaign { id }) => handle_campaign(ctx, json, id).await,
        Some(Commands::Stats) => handle_stats(ctx, json).await,
        Some(Commands::Dashboard) => handle_dashboard(ctx, json).await,
        Some(Commands::View { action }) => handle_view(ctx, json, action),
        None => handle_leads(ctx, json, None, None, None, false).await,
    }
}

fn emit<T: Serialize>(json: bool, value: &T, render: impl FnOnce(&T) -> String) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

async fn handle_leads(
    ctx: &mut LeadboardContext,
    json: bool,
    search: Option<String>,
    status: Option<String>,
    page: Option<usize>,
    all_pages: bool,
) -> Result<()> {
    if let Some(status) = status {
        ctx.api.set_leads_status_filter_str(&status)?;
    }
    if let Some(search) = search {
        ctx.api.set_leads_search_term(search)?;
    }

    match page {
        Some(page_index) => {
            let page = ctx.api.current_leads_page(page_index).await?;
            emit(json, &page, |p| render_lead_page(p, page_index))
        }
        None if all_pages => {
            let leads = ctx.api.current_leads_all_pages().await?;
            emit(json, &leads, |l| render_leads(l))
        }
        None => {
            let leads = ctx.api.current_leads().await?.into_inner();
            emit(json, &leads, |l| render_leads(l))
        }
    }
}

async fn handle_lead(ctx: &mut LeadboardContext, json: bool, id: String) -> Result<()> {
    ctx.api.select_lead(id.as_str())?;
    let lead = ctx.api.selected_lead().await?;
    ctx.api.close_lead_detail()?;

    match lead {
        Some(lead) => emit(json, &lead, render_lead_detail),
        None if json => emit(json, &Option::<()>::None, |_| String::new()),
        None => {
            print_warning(&format!("Lead not found: {}", id));
            Ok(())
        }
    }
}

async fn handle_campaigns(
    ctx: &mut LeadboardContext,
    json: bool,
    status: Option<String>,
    sort: Option<String>,
    direction: Option<String>,
) -> Result<()> {
    if let Some(status) = status {
        ctx.api.set_campaigns_status_filter_str(&status)?;
    }
    if let Some(sort) = sort {
        ctx.api.set_campaigns_sort_field_str(&sort)?;
    }
    if let Some(direction) = direction {
        ctx.api.set_campaigns_sort_direction_str(&direction)?;
    }

    let campaigns = ctx.api.current_campaigns().await?.into_inner();
    emit(json, &campaigns, |c| render_campaigns(c))
}

async fn handle_campaign(ctx: &mut LeadboardContext, json: bool, id: String) -> Result<()> {
    match ctx.api.campaign(&id).await? {
        Some(campaign) => emit(json, &campaign, render_campaign_detail),
        None if json => emit(json, &Option::<()>::None, |_| String::new()),
        None => {
            print_warning(&format!("Campaign not found: {}", id));
            Ok(())
        }
    }
}

#[derive(Serialize)]
struct StatsOutput {
    leads: leadboard::commands::LeadStats,
    campaigns: leadboard::commands::CampaignStats,
}

async fn handle_stats(ctx: &mut LeadboardContext, json: bool) -> Result<()> {
    let (leads, campaigns) = tokio::join!(ctx.api.lead_stats(), ctx.api.campaign_stats());
    let stats = StatsOutput {
        leads: leads?,
        campaigns: campaigns?,
    };
    emit(json, &stats, |s| render_stats(&s.leads, &s.campaigns))
}

async fn handle_dashboard(ctx: &mut LeadboardContext, json: bool) -> Result<()> {
    let dashboard = ctx.api.dashboard_stats().await?;
    emit(json, &dashboard, render_dashboard)
}

fn handle_view(ctx: &mut LeadboardContext, json: bool, action: Option<ViewCommands>) -> Result<()> {
    match action.unwrap_or(ViewCommands::Show) {
        ViewCommands::Show => emit(json, ctx.api.view_state(), render_view_state),
        ViewCommands::Sidebar { state } => {
            match state.unwrap_or(SidebarState::Toggle) {
                SidebarState::Toggle => ctx.api.toggle_sidebar()?,
                SidebarState::Collapsed => ctx.api.set_sidebar_collapsed(true)?,
                SidebarState::Expanded => ctx.api.set_sidebar_collapsed(false)?,
            }
            if ctx.api.view_state().sidebar_collapsed {
                print_message("Sidebar collapsed");
            } else {
                print_message("Sidebar expanded");
            }
            Ok(())
        }
        ViewCommands::Sort { field } => {
            ctx.api.sort_campaigns_by_str(&field)?;
            let state = ctx.api.view_state();
            print_message(&format!(
                "Campaigns sorted by {} {}",
                state.campaigns_sort_field, state.campaigns_sort_direction
            ));
            Ok(())
        }
        ViewCommands::ResetLeads => {
            ctx.api.reset_leads_filters()?;
            print_message("Leads filters reset");
            Ok(())
        }
        ViewCommands::ResetCampaigns => {
            ctx.api.reset_campaigns_filters()?;
            print_message("Campaigns filters reset");
            Ok(())
        }
    }
}
