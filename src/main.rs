use anyhow::Context;
use clap::Parser;
use lead_scout::config::cli::{Cli, Command, DEFAULT_CONFIG_FILE};
use lead_scout::core::prompt;
use lead_scout::domain::catalog;
use lead_scout::domain::model::{Lead, MarketReport};
use lead_scout::utils::error::{ErrorSeverity, LeadError};
use lead_scout::utils::{logger, validation::Validate};
use lead_scout::{AppConfig, GeminiClient, LeadAssistant, LeadBook, LeadBookStore, LocalStorage};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;

    // 初始化日誌
    let verbose = cli.verbose || config.logging.verbose;
    if config.logging.json {
        logger::init_json_logger(verbose);
    } else {
        logger::init_cli_logger(verbose);
    }

    tracing::info!("Starting lead-scout");
    if verbose {
        tracing::debug!(
            "Models: {:?}, lead book: {}",
            config.model_settings(),
            config.storage.lead_book
        );
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = run(cli.command, config).await {
        report_error(&e);
    }

    Ok(())
}

/// An explicit `--config` must exist; the default file is optional.
fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path.display()))?,
        None if std::path::Path::new(DEFAULT_CONFIG_FILE).exists() => {
            AppConfig::from_file(DEFAULT_CONFIG_FILE)
                .with_context(|| format!("Failed to load config file '{}'", DEFAULT_CONFIG_FILE))?
        }
        None => AppConfig::default(),
    };

    // 應用命令列覆蓋設定
    if let Some(lead_book) = &cli.lead_book {
        config.storage.lead_book = lead_book.clone();
    }
    Ok(config)
}

fn report_error(e: &LeadError) {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low | ErrorSeverity::High => 1,
        ErrorSeverity::Medium => 2, // 可重試
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn assistant(config: &AppConfig) -> lead_scout::Result<LeadAssistant<GeminiClient>> {
    let client = GeminiClient::new(
        config.api_key()?,
        config.provider.base_url.clone(),
        config.request_timeout(),
    )?;
    Ok(LeadAssistant::new(client, config.model_settings()))
}

async fn run(command: Command, config: AppConfig) -> lead_scout::Result<()> {
    let store = LeadBookStore::new(LocalStorage::new("."), config.storage.lead_book.clone());

    match command {
        Command::Generate { criteria, dry_run } => {
            let mut search = config.search.clone();
            criteria.apply_to(&mut search)?;
            search.validate()?;

            if dry_run {
                tracing::info!("🔍 DRY RUN MODE - the model will not be called");
                println!("{}", prompt::build_lead_prompt(&search));
                return Ok(());
            }

            let leads = assistant(&config)?.generate_into_store(&store, &search).await?;
            println!("✅ Found {} leads", leads.len());
            for lead in &leads {
                print_lead_summary(lead);
            }
            println!("📁 Lead book saved to: {}", store.path());
        }
        Command::Lookalikes { company } => {
            let mut book = store.load().await?;
            let seed = book.find(&company)?.clone();
            let lookalikes = assistant(&config)?
                .find_lookalikes(&config.search, &seed, &book.leads)
                .await?;

            if lookalikes.is_empty() {
                println!("No new companies similar to {}", seed.company_name);
                return Ok(());
            }
            println!("✅ Found {} companies similar to {}", lookalikes.len(), seed.company_name);
            for lead in &lookalikes {
                print_lead_summary(lead);
            }
            book.prepend(lookalikes);
            store.save(&book).await?;
        }
        Command::Verify { companies, all } => {
            let mut book = store.load().await?;
            let targets: Vec<String> = if all {
                book.leads.iter().map(|l| l.company_name.clone()).collect()
            } else {
                companies
            };
            if targets.is_empty() {
                println!("Lead book is empty, nothing to verify");
                return Ok(());
            }

            let summary = assistant(&config)?.verify_in_book(&mut book, &targets).await?;
            store.save(&book).await?;
            println!(
                "✅ Verified: {}, unconfirmed: {}, failed: {}",
                summary.verified, summary.unconfirmed, summary.failed
            );
            let mut shown: Vec<&str> = Vec::new();
            for name in &targets {
                let lead = book.find(name)?;
                if shown.contains(&lead.company_name.as_str()) {
                    continue;
                }
                shown.push(&lead.company_name);
                println!(
                    "- {} [{:?}] {}",
                    lead.company_name,
                    lead.verification_status,
                    lead.verification_report.as_deref().unwrap_or("")
                );
            }
        }
        Command::BattleCard { company } => {
            let mut book = store.load().await?;
            if assistant(&config)?.analyze_in_book(&mut book, &company).await? {
                store.save(&book).await?;
            }
            let lead = book.find(&company)?;
            println!("{}", lead.competitor_analysis.as_deref().unwrap_or_default());
        }
        Command::TalkingPoints { company, contact } => {
            let mut book = store.load().await?;
            if assistant(&config)?
                .talking_points_in_book(&mut book, &company, &contact)
                .await?
            {
                store.save(&book).await?;
            }
            let (_, found) = book.find_contact(&company, &contact)?;
            for point in found.talking_points.as_deref().unwrap_or_default() {
                println!("• {}", point);
            }
        }
        Command::MarketReport { industry, region } => {
            let report = assistant(&config)?.market_report(&industry, &region).await?;
            print_market_report(&report);
        }
        Command::List { emails } => {
            let book = store.load().await?;
            print_book(&book, emails);
        }
        Command::Clear => {
            let mut book = store.load().await?;
            let removed = book.len();
            book.clear();
            store.save(&book).await?;
            println!("🗑️  Removed {} leads from {}", removed, store.path());
        }
        Command::Catalog => print_catalog(),
    }

    Ok(())
}

fn print_lead_summary(lead: &Lead) {
    println!(
        "- {} ({}) score {} [{}]",
        lead.company_name,
        lead.category,
        lead.lead_score,
        lead.score_tier().label()
    );
}

fn print_book(book: &LeadBook, emails: bool) {
    if book.is_empty() {
        println!("Lead book is empty");
        return;
    }
    if let Some(updated_at) = book.updated_at {
        println!("{} leads, updated {}", book.len(), updated_at.format("%Y-%m-%d %H:%M UTC"));
    }

    for lead in book.ranked() {
        println!();
        println!(
            "## {} [{} {}] {:?}",
            lead.company_name,
            lead.lead_score,
            lead.score_tier().label(),
            lead.verification_status
        );
        println!("Category: {}", lead.category);
        println!("Why: {}", lead.justification);
        println!("Email: {}  Phone: {}", lead.email, lead.phone);
        println!("LinkedIn: {}", lead.company_linked_in);
        println!("Employees: {}  Funding: {}", lead.employee_count, lead.latest_funding);
        if !lead.tech_stack.is_empty() {
            println!("Tech stack: {}", lead.tech_stack.join(", "));
        }
        if !lead.competitors.is_empty() {
            println!("Competitors: {}", lead.competitors.join(", "));
        }
        if !lead.platform_presence.is_empty() {
            println!("Platforms: {}", lead.platform_presence.join(", "));
        }
        if lead.latest_news.is_available() {
            println!("News: {} <{}>", lead.latest_news.title, lead.latest_news.url);
        }
        if lead.latest_international_news.is_available() {
            println!(
                "International news: {} <{}>",
                lead.latest_international_news.title, lead.latest_international_news.url
            );
        }
        println!("Outreach: {}", lead.outreach_suggestion);
        for contact in &lead.contacts {
            let profile = if contact.has_profile() {
                contact.contact_linked_in.as_str()
            } else {
                "no verified profile"
            };
            println!("  • {}, {} ({})", contact.contact_name, contact.designation, profile);
        }
        if emails {
            for step in lead.ordered_sequence() {
                println!();
                println!("--- Email {} ---", step.step);
                println!("{}", step.as_email_text());
            }
        }
    }
}

fn print_market_report(report: &MarketReport) {
    println!("# {} in {}", report.industry, report.region);
    println!();
    println!("{}", report.text);
    if !report.sources.is_empty() {
        println!();
        println!("Sources:");
        for source in &report.sources {
            println!("- {} <{}>", source.title, source.uri);
        }
    }
}

fn print_catalog() {
    let sections: [(&str, &[&str]); 5] = [
        ("Client categories", catalog::CLIENT_CATEGORIES),
        ("Target departments", catalog::TARGET_DEPARTMENTS),
        ("International regions", catalog::INTERNATIONAL_REGIONS),
        ("Platforms of interest", catalog::PLATFORMS_OF_INTEREST),
        ("Sales territories", catalog::SALES_TERRITORIES),
    ];
    for (title, items) in sections {
        println!("{}:", title);
        for item in items {
            println!("  {}", item);
        }
    }
}
