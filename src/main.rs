use clap::Parser;
use company_infosearcher::config::api_key::load_api_key;
use company_infosearcher::core::catalog::parse_catalog;
use company_infosearcher::core::report::format_duration;
use company_infosearcher::utils::error::ErrorSeverity;
use company_infosearcher::utils::{logger, validation::Validate};
use company_infosearcher::{
    CliConfig, CompanyPipeline, EtlEngine, GeminiClient, InfosearchError, LocalStorage, Settings,
};
use std::path::Path;

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose, cli.log_format);
    tracing::info!("Starting company-infosearcher");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = run(&cli).await {
        tracing::error!(
            "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(cli: &CliConfig) -> Result<(), InfosearchError> {
    let settings = cli.resolve()?;
    settings.validate()?;

    if !Path::new(&settings.input_file).is_file() {
        return Err(InfosearchError::InputError {
            message: format!("File not found: {}", settings.input_file),
        });
    }
    tracing::info!("✅ File found: {}", settings.input_file);

    if cli.dry_run {
        return dry_run(&settings);
    }

    let api_key = load_api_key(Path::new(&settings.env_file))?;
    let generator = GeminiClient::new(
        api_key,
        settings.model.clone(),
        settings.api_base.clone(),
        settings.timeout,
    )?;

    let storage = LocalStorage::new(".".to_string());
    let pipeline = CompanyPipeline::new(storage, generator, settings);
    let engine = EtlEngine::new(pipeline);

    let report = engine.run().await?;
    println!("✅ All responses saved to {}", report.output_path);
    println!(
        "📊 {} companies processed, {} failed",
        report.total_companies, report.failed_companies
    );
    println!(
        "⏱ Total execution time: {}",
        format_duration(report.metadata.duration)
    );
    Ok(())
}

fn dry_run(settings: &Settings) -> Result<(), InfosearchError> {
    tracing::info!("🔍 DRY RUN MODE - No API calls will be made");

    let text = std::fs::read_to_string(&settings.input_file)?;
    let catalog = parse_catalog(&text);

    println!("📋 Run plan:");
    println!("  Input: {}", settings.input_file);
    println!("  Output: {}", settings.output_path);
    println!("  Model: {}", settings.model);
    for country in &catalog.countries {
        println!("  {} ({} companies)", country.name, country.companies.len());
        for company in &country.companies {
            println!("    {}- {}", company.number, company.name);
        }
    }
    for line in &catalog.skipped {
        println!("  ⚠️ line {} skipped: {}", line.line_number, line.reason);
    }
    println!(
        "  Total: {} companies, estimated time {}",
        catalog.company_count(),
        format_duration(settings.rate_limit.estimate(catalog.company_count()))
    );
    Ok(())
}
