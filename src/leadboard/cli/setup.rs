use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "leadboard", bin_name = "leadboard", version)]
#[command(about = "Lead and campaign dashboard for the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// More log output on stderr (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true, help_heading = "Options")]
    pub verbose: u8,

    /// Print JSON instead of tables
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List leads using the saved status filter
    Leads {
        /// Case-insensitive search over name, email, company and campaign
        #[arg(short, long)]
        search: Option<String>,

        /// Set the saved status filter first (all, pending, contacted, responded, converted)
        #[arg(long)]
        status: Option<String>,

        /// Show a single zero-indexed page of 20
        #[arg(long, conflicts_with = "all_pages")]
        page: Option<usize>,

        /// Fetch page by page and show everything
        #[arg(long)]
        all_pages: bool,
    },

    /// Show one lead
    Lead { id: String },

    /// List campaigns using the saved status filter
    Campaigns {
        /// Set the saved status filter first (all, draft, active, paused, completed)
        #[arg(long)]
        status: Option<String>,

        /// Sort field (name, status, totalLeads, successfulLeads, responseRate, createdAt, budget, id)
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction (asc, desc)
        #[arg(long)]
        direction: Option<String>,
    },

    /// Show one campaign
    Campaign { id: String },

    /// Lead and campaign totals
    Stats,

    /// Overview: totals, conversion rate, revenue and recent leads
    Dashboard,

    /// Inspect or change the saved view state
    View {
        #[command(subcommand)]
        action: Option<ViewCommands>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ViewCommands {
    /// Print the current view state
    Show,

    /// Collapse, expand, or toggle the sidebar
    Sidebar {
        #[arg(value_enum)]
        state: Option<SidebarState>,
    },

    /// Sort campaigns by a field; the current field flips direction
    Sort {
        /// name, status, totalLeads, successfulLeads, responseRate, createdAt, budget, id
        field: String,
    },

    /// Clear the leads search and status filter
    ResetLeads,

    /// Restore the default campaigns filter and sort
    ResetCampaigns,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SidebarState {
    Collapsed,
    Expanded,
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_verbosity_count() {
        let cli = Cli::try_parse_from(["leadboard", "-vv", "stats"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Commands::Stats)));
    }

    #[test]
    fn parses_campaign_sort_options() {
        let cli = Cli::try_parse_from([
            "leadboard",
            "campaigns",
            "--status",
            "active",
            "--sort",
            "responseRate",
            "--direction",
            "desc",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Campaigns {
                status,
                sort,
                direction,
            }) => {
                assert_eq!(status.as_deref(), Some("active"));
                assert_eq!(sort.as_deref(), Some("responseRate"));
                assert_eq!(direction.as_deref(), Some("desc"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn page_conflicts_with_all_pages() {
        assert!(Cli::try_parse_from(["leadboard", "leads", "--page", "1", "--all-pages"]).is_err());
    }

    #[test]
    fn parses_view_sort_field() {
        let cli = Cli::try_parse_from(["leadboard", "view", "sort", "budget"]).unwrap();
        match cli.command {
            Some(Commands::View {
                action: Some(ViewCommands::Sort { field }),
            }) => assert_eq!(field, "budget"),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn sidebar_accepts_named_states() {
        let cli = Cli::try_parse_from(["leadboard", "view", "sidebar", "collapsed"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::View {
                action: Some(ViewCommands::Sidebar {
                    state: Some(SidebarState::Collapsed)
                })
            })
        ));
    }
}
