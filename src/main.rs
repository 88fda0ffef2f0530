use crawl_core::collaborators::enricher::IdentityEnricher;
use crawl_core::collaborators::extractor::HtmlExtractor;
use crawl_core::collaborators::fetcher::HttpFetcher;
use crawl_core::collaborators::seed_provider::DuckDuckGoSeedProvider;
use crawl_core::{crawl_and_query, Collaborators, Config, CrawlRequest};
use tracing::info;

struct ParsedArgs {
    prompt: String,
    urls: Vec<String>,
    max_depth: Option<usize>,
    num_results: Option<usize>,
    base_threshold: Option<f64>,
    force_crawl: bool,
}

fn parse_args() -> ParsedArgs {
    let mut prompt = String::new();
    let mut urls = Vec::new();
    let mut max_depth = None;
    let mut num_results = None;
    let mut base_threshold = None;
    let mut force_crawl = false;

    let mut args = std::env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--prompt" => prompt = args.next().unwrap_or_default(),
            "--url" => {
                if let Some(u) = args.next() {
                    urls.push(u);
                }
            }
            "--max-depth" => max_depth = args.next().and_then(|v| v.parse().ok()),
            "--num-results" => num_results = args.next().and_then(|v| v.parse().ok()),
            "--base-threshold" => base_threshold = args.next().and_then(|v| v.parse().ok()),
            "--force-crawl" => force_crawl = true,
            other => {
                if prompt.is_empty() {
                    prompt = other.to_string();
                }
            }
        }
    }

    ParsedArgs {
        prompt,
        urls,
        max_depth,
        num_results,
        base_threshold,
        force_crawl,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = parse_args();
    if args.prompt.trim().is_empty() {
        anyhow::bail!("usage: crawl-core --prompt <text> [--url <url> ...] [--max-depth N] [--num-results N] [--base-threshold F] [--force-crawl]");
    }

    info!("loading config");
    let config = Config::load();

    let seed_provider = DuckDuckGoSeedProvider::new();
    let fetcher = HttpFetcher::new();
    let extractor = HtmlExtractor::new();
    let enricher = IdentityEnricher::new();
    let collaborators = Collaborators {
        seed_provider: &seed_provider,
        fetcher: &fetcher,
        extractor: &extractor,
        enricher: &enricher,
        synthesizer: None,
        judge: None,
    };

    let request = CrawlRequest {
        prompt: args.prompt.clone(),
        urls: args.urls,
        n: args.num_results,
        num_seed: None,
        max_depth: args.max_depth,
        force_crawl: Some(args.force_crawl),
        base_threshold: args.base_threshold,
        use_llm: Some(false),
    };

    info!("running crawl_and_query for prompt {:?}", args.prompt);
    let response = crawl_and_query(request, &config, &collaborators).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
