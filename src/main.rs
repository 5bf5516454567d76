//! page-translator - translate every text node of an HTML page

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use page_translator::env::{core::LogLevel, EnvVar};
use page_translator::translation::{
    translate_html, ConfigManager, DispatchMode, ProviderKind, TranslationConfig, TranslationReport,
    TranslationService,
};
use page_translator::TranslationResult;

#[derive(Parser)]
#[command(name = "page-translator")]
#[command(version, about = "Translate every text node of an HTML page in place", long_about = None)]
#[command(after_help = "EXAMPLES:
    page-translator index.html -t es -o index.es.html
    cat page.html | page-translator - -t fr --provider deeplx
    page-translator --generate-config page-translator.toml")]
struct Cli {
    /// Input HTML file, `-` for stdin
    #[arg(value_name = "INPUT", required_unless_present = "generate_config")]
    input: Option<String>,

    /// Target language tag (e.g. es, fr, zh-TW)
    #[arg(short = 't', long = "target", value_name = "LANG")]
    target: Option<String>,

    /// Output file, stdout when omitted
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// Configuration file (TOML or JSON)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<String>,

    /// Translation API endpoint
    #[arg(long)]
    api_url: Option<String>,

    /// Google Cloud Translation API key
    #[arg(long)]
    api_key: Option<String>,

    /// Translation provider: google, deeplx
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// Maximum text segments per request
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Dispatch up to N batches at once
    #[arg(long, value_name = "N")]
    concurrent: Option<usize>,

    /// Input charset label, detected from the document when omitted
    #[arg(long, value_name = "LABEL")]
    encoding: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Write an example configuration file and exit
    #[arg(long, value_name = "PATH")]
    generate_config: Option<String>,
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        LogLevel::get().unwrap_or_else(|e| {
            eprintln!("warning: {e}");
            "info".to_string()
        })
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> TranslationResult<TranslationConfig> {
    let manager = match &cli.config {
        Some(path) => ConfigManager::from_file(path)?,
        None => ConfigManager::new()?,
    };
    if let Some(source) = manager.source() {
        tracing::debug!("已加载配置文件: {}", source);
    }
    let mut config = manager.into_config();

    if let Some(provider) = cli.provider {
        config.set_provider(provider);
    }
    if let Some(api_url) = &cli.api_url {
        config.api_url = api_url.clone();
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    if let Some(batch_size) = cli.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(concurrent) = cli.concurrent {
        config.dispatch_mode = DispatchMode::Concurrent;
        config.max_concurrent_batches = concurrent;
    }
    if let Some(target) = &cli.target {
        config.target_lang = target.clone();
    }

    config.validate()?;
    Ok(config)
}

fn read_input(input: &str) -> io::Result<Vec<u8>> {
    if input == "-" {
        let mut data = Vec::new();
        io::stdin().read_to_end(&mut data)?;
        Ok(data)
    } else {
        fs::read(input)
    }
}

fn write_output(output: Option<&str>, data: &[u8]) -> io::Result<()> {
    match output {
        Some(path) => fs::write(path, data),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()
        }
    }
}

fn print_summary(report: &TranslationReport) {
    eprintln!(
        "Translated {}/{} text nodes to '{}' in {} batch(es), {:.2?}",
        report.units_translated(),
        report.units_collected,
        report.target_language,
        report.batches.len(),
        report.elapsed
    );
    for failed in report.failed_batches() {
        if let Some(error) = failed.error() {
            eprintln!(
                "  batch {} ({} nodes) left untranslated: {}",
                failed.index + 1,
                failed.unit_count,
                error
            );
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    if let Some(path) = &cli.generate_config {
        ConfigManager::generate_example_config(path).map_err(|e| e.to_string())?;
        eprintln!("Wrote example configuration to {path}");
        return Ok(());
    }

    let input = cli.input.as_deref().ok_or("missing INPUT")?;
    let config = load_config(&cli).map_err(|e| e.to_string())?;
    let target = config.target_lang.clone();

    let data = read_input(input).map_err(|e| format!("cannot read {input}: {e}"))?;
    let service = TranslationService::new(config).map_err(|e| e.to_string())?;

    let (html, report) = translate_html(&service, &data, cli.encoding.as_deref(), &target)
        .await
        .map_err(|e| e.to_string())?;

    write_output(cli.output.as_deref(), &html).map_err(|e| format!("cannot write output: {e}"))?;
    print_summary(&report);

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
