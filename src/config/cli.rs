use crate::domain::model::{split_name_list, SearchCriteria, SearchSources};
use crate::utils::error::{LeadError, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "lead-scout.toml";

#[derive(Debug, Parser)]
#[command(name = "lead-scout")]
#[command(about = "Research international B2B leads with a web-grounded generative model")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the lead book location from config
    #[arg(long, global = true)]
    pub lead_book: Option<String>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search for new leads and add them to the lead book
    Generate {
        #[command(flatten)]
        criteria: CriteriaArgs,

        /// Print the prompt instead of calling the model
        #[arg(long)]
        dry_run: bool,
    },
    /// Find companies similar to a lead already in the book
    Lookalikes { company: String },
    /// Re-check public contact details of leads in the book
    Verify {
        #[arg(required_unless_present = "all")]
        companies: Vec<String>,

        /// Verify every lead in the book
        #[arg(long, conflicts_with = "companies")]
        all: bool,
    },
    /// Generate a competitor battle card for a lead
    BattleCard { company: String },
    /// Draft talking points for one contact of a lead
    TalkingPoints { company: String, contact: String },
    /// Write a market-entry report for an industry and region
    MarketReport {
        #[arg(long)]
        industry: String,

        #[arg(long)]
        region: String,
    },
    /// Show the lead book ranked by score
    List {
        /// Include drafted outreach emails
        #[arg(long)]
        emails: bool,
    },
    /// Remove every lead from the book
    Clear,
    /// Show the selectable categories, departments, regions and platforms
    Catalog,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SourceArg {
    Web,
    Linkedin,
    Reddit,
    Facebook,
    X,
    Instagram,
}

/// Search criteria flags; anything left unset keeps the config file value.
#[derive(Debug, Clone, Default, Args)]
pub struct CriteriaArgs {
    /// Company to research in depth
    #[arg(long)]
    pub client: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    /// Look for companies similar to --client instead
    #[arg(long)]
    pub similar: bool,

    #[arg(long, value_delimiter = ',')]
    pub departments: Option<Vec<String>>,

    #[arg(long, value_delimiter = ',')]
    pub regions: Option<Vec<String>>,

    #[arg(long, value_delimiter = ',')]
    pub platforms: Option<Vec<String>>,

    #[arg(long, value_delimiter = ',')]
    pub territories: Option<Vec<String>>,

    #[arg(long)]
    pub origin_region: Option<String>,

    /// Focus on startups and emerging businesses
    #[arg(long)]
    pub startups: bool,

    /// Skip drafting the outreach email sequence
    #[arg(long)]
    pub no_email: bool,

    #[arg(long, value_enum, value_delimiter = ',')]
    pub sources: Option<Vec<SourceArg>>,

    /// Company to leave out of the results (repeatable)
    #[arg(long = "exclude")]
    pub excluded: Vec<String>,

    /// File with one excluded company per line
    #[arg(long)]
    pub exclude_file: Option<PathBuf>,

    /// Agency whose existing clients should be left out (repeatable)
    #[arg(long = "agency")]
    pub agencies: Vec<String>,
}

impl CriteriaArgs {
    /// Overlay the flags onto criteria loaded from config.
    pub fn apply_to(&self, criteria: &mut SearchCriteria) -> Result<()> {
        if let Some(client) = &self.client {
            criteria.client_name = client.trim().to_string();
        }
        if let Some(category) = &self.category {
            criteria.client_category = category.trim().to_string();
        }
        if self.similar {
            criteria.find_similar = true;
        }
        if let Some(departments) = &self.departments {
            criteria.target_departments = departments.clone();
        }
        if let Some(regions) = &self.regions {
            criteria.target_regions = regions.clone();
        }
        if let Some(platforms) = &self.platforms {
            criteria.platforms = platforms.clone();
        }
        if let Some(territories) = &self.territories {
            criteria.sales_territories = territories.clone();
        }
        if let Some(origin) = &self.origin_region {
            criteria.origin_region = origin.trim().to_string();
        }
        if self.startups {
            criteria.target_startups = true;
        }
        if self.no_email {
            criteria.generate_email = false;
        }
        if let Some(sources) = &self.sources {
            criteria.sources = sources_from(sources);
        }

        criteria.excluded_clients.extend(self.excluded.iter().cloned());
        if let Some(path) = &self.exclude_file {
            let content = std::fs::read_to_string(path).map_err(|e| LeadError::ConfigError {
                message: format!("cannot read exclude file '{}': {}", path.display(), e),
            })?;
            let names = split_name_list(&content);
            tracing::debug!("Loaded {} excluded companies from {}", names.len(), path.display());
            criteria.excluded_clients.extend(names);
        }
        criteria.agency_names.extend(self.agencies.iter().cloned());
        Ok(())
    }
}

fn sources_from(selected: &[SourceArg]) -> SearchSources {
    SearchSources {
        web: selected.contains(&SourceArg::Web),
        linkedin: selected.contains(&SourceArg::Linkedin),
        reddit: selected.contains(&SourceArg::Reddit),
        facebook: selected.contains(&SourceArg::Facebook),
        x: selected.contains(&SourceArg::X),
        instagram: selected.contains(&SourceArg::Instagram),
    }
}
