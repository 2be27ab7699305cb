mod api;
mod server;

use adcopy_insights::config::{default_config_path, InsightsConfig};
use adcopy_insights::generation::record_generation;
use adcopy_insights::insights::SuggestionPipeline;
use adcopy_insights::llm::{GenerationRequest, LlmClient};
use adcopy_insights::store::{AdStore, JsonAdStore};
use adcopy_insights::{format_cost, format_percent, GeneratedAd};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "adcopy-insights", about = "Ad copy generation and optimization dashboard")]
struct Cli {
    /// Path to the TOML config (defaults to INSIGHTS_CONFIG_PATH or config/insights.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print optimization suggestions for a user
    Suggest(SuggestArgs),
    /// Generate ad copy with the language model
    Generate(GenerateArgs),
    /// List a user's stored ads
    Ads(UserArgs),
    /// Show language-model spend for a user
    Usage(UserArgs),
    /// Import ads (with performance data) from a JSON array
    Import(ImportArgs),
    /// Run the dashboard API and serve the web bundle
    Serve(ServeArgs),
    /// Write the default config file
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct UserArgs {
    #[arg(long)]
    user: String,
}

#[derive(Args, Debug, Clone)]
struct SuggestArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(long)]
    user: String,
    #[arg(long)]
    business: String,
    #[arg(long, value_delimiter = ',')]
    keywords: Vec<String>,
    #[arg(long)]
    tone: Option<String>,
    #[arg(long)]
    focus: Option<String>,
    #[arg(long, default_value_t = 3)]
    variations: usize,
    #[arg(long)]
    url: Option<String>,
    #[arg(long)]
    campaign: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    no_save: bool,
}

#[derive(Args, Debug, Clone)]
struct ImportArgs {
    #[arg(long)]
    file: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 8787)]
    port: u16,
    #[arg(long, default_value = "../dashboard/dist")]
    web_root: String,
}

#[derive(Args, Debug, Clone)]
struct InitConfigArgs {
    #[arg(long)]
    path: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    load_dotenv();
    init_tracing();
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), String> {
    let cli = Cli::parse();
    let (config, _) = InsightsConfig::load(cli.config)?;

    match cli.command {
        Command::Suggest(args) => run_suggest(args, &config).await,
        Command::Generate(args) => run_generate(args, &config).await,
        Command::Ads(args) => run_ads(args, &config).await,
        Command::Usage(args) => run_usage(args, &config).await,
        Command::Import(args) => run_import(args, &config).await,
        Command::Serve(args) => server::serve(args, config).await,
        Command::InitConfig(args) => run_init_config(args),
    }
}

async fn open_store(config: &InsightsConfig) -> Result<JsonAdStore, String> {
    JsonAdStore::load(config.store.path.clone())
        .await
        .map_err(|err| format!("failed to open store: {}", err))
}

async fn run_suggest(args: SuggestArgs, config: &InsightsConfig) -> Result<(), String> {
    let store = open_store(config).await?;
    let pipeline = SuggestionPipeline::from_config(config);
    let suggestions = pipeline
        .suggest(&store, &args.user, Utc::now())
        .await
        .map_err(|err| format!("failed to compute suggestions: {}", err))?;

    if args.json {
        let payload = serde_json::to_string_pretty(&api::ApiSuggestionsResponse { suggestions })
            .map_err(|err| format!("failed to serialize suggestions: {}", err))?;
        println!("{}", payload);
        return Ok(());
    }

    println!("Suggestions for {}:", args.user);
    for suggestion in suggestions {
        println!(
            "\n[{} | {} | {}%] {}",
            suggestion.priority.label(),
            suggestion.kind.label(),
            suggestion.confidence,
            suggestion.title
        );
        println!("  {}", suggestion.description);
        println!("  Impact: {}", suggestion.impact);
        println!("  Based on: {}", suggestion.based_on);
    }
    Ok(())
}

async fn run_generate(args: GenerateArgs, config: &InsightsConfig) -> Result<(), String> {
    let store = open_store(config).await?;
    let client = LlmClient::from_env(args.model, &config.generation)?
        .ok_or_else(|| "LLM_API_KEY is not set".to_string())?;
    let settings = store.settings(&args.user).await;

    let request = GenerationRequest {
        business_description: args.business,
        keywords: args.keywords,
        tone: args.tone.unwrap_or(settings.default_tone),
        focus: args.focus.unwrap_or(settings.default_focus),
        variations: args.variations,
        landing_page_url: args.url,
    };
    let result = client.generate(&request).await?;
    let save_override = if args.no_save { Some(false) } else { None };
    let generation = record_generation(
        &store,
        &args.user,
        args.campaign,
        &request,
        result,
        save_override,
    )
    .await
    .map_err(|err| format!("failed to record generation: {}", err))?;

    for (index, variant) in generation.variants.iter().enumerate() {
        println!("{}. {}", index + 1, variant.headline);
        println!("   {}", variant.description);
        if !variant.display_url.is_empty() {
            println!("   {}", variant.display_url);
        }
    }
    println!(
        "\nModel {} | tokens {} | cost {} | saved {}",
        generation.usage.model,
        generation.usage.total_tokens,
        format_cost(generation.usage.cost),
        generation.saved.len()
    );
    Ok(())
}

async fn run_ads(args: UserArgs, config: &InsightsConfig) -> Result<(), String> {
    let store = open_store(config).await?;
    let ads = store
        .list_ads(&args.user)
        .await
        .map_err(|err| format!("failed to list ads: {}", err))?;
    if ads.is_empty() {
        println!("No ads stored for {}", args.user);
        return Ok(());
    }
    for ad in ads {
        println!("{}", describe_ad(&ad));
    }
    Ok(())
}

async fn run_usage(args: UserArgs, config: &InsightsConfig) -> Result<(), String> {
    let store = open_store(config).await?;
    let records = store.list_usage(&args.user).await;
    for record in &records {
        println!(
            "{} {} tokens {} cost {}",
            record.created_at.format("%Y-%m-%d %H:%M"),
            record.model,
            record.total_tokens,
            format_cost(record.cost)
        );
    }
    let summary = store.usage_summary(&args.user, None).await;
    println!(
        "Total: {} calls | {} tokens | {}",
        summary.calls,
        summary.total_tokens,
        format_cost(summary.total_cost)
    );
    Ok(())
}

async fn run_import(args: ImportArgs, config: &InsightsConfig) -> Result<(), String> {
    let store = open_store(config).await?;
    let contents = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|err| format!("failed to read {}: {}", args.file.display(), err))?;
    let ads: Vec<GeneratedAd> = serde_json::from_str(&contents)
        .map_err(|err| format!("failed to parse ads: {}", err))?;
    let count = store
        .upsert_ads(ads)
        .await
        .map_err(|err| format!("failed to import ads: {}", err))?;
    println!("Imported {} ads", count);
    Ok(())
}

fn run_init_config(args: InitConfigArgs) -> Result<(), String> {
    let path = args
        .path
        .or_else(default_config_path)
        .ok_or_else(|| "no config path".to_string())?;
    InsightsConfig::write_default(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn describe_ad(ad: &GeneratedAd) -> String {
    let ctr = ad
        .ctr()
        .map(format_percent)
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "{} [{}] {} | {} (tone {}, CTR {})",
        ad.id,
        ad.status.label(),
        ad.headline,
        ad.description,
        if ad.tone.is_empty() { "-" } else { ad.tone.as_str() },
        ctr
    )
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("adcopy_insights=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_dotenv() {
    let _ = dotenvy::dotenv();
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let manifest_path = Path::new(manifest_dir).join(".env");
    let _ = dotenvy::from_path(manifest_path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn every_subcommand_has_help_text() {
        let cli = Cli::command();
        for command in cli.get_subcommands() {
            assert!(
                command.get_about().is_some(),
                "{} has no help text",
                command.get_name()
            );
        }
        assert!(cli.find_subcommand("serve").is_some());
    }
}
