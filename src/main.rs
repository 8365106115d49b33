use anyhow::Result;
use clap::{Parser, Subcommand};
use proxy_harvester::{
    CheckerConfig, DiscoveryConfig, DiscoverySource, FetcherConfig, HarvestRunner, PoolFetcher,
    ProxyChecker, ProxyStore, SearchDiscovery,
};
use std::path::PathBuf;
use std::time::Duration;

/// A proxy pool harvester and liveness checker
#[derive(Parser)]
#[command(name = "proxy-harvester")]
#[command(about = "A proxy pool harvester and liveness checker")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Proxy store file path
    #[arg(short, long, default_value = "latest.txt")]
    store: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Discover pools, harvest their proxies and refresh the store
    Run {
        /// Search expression for finding pool services
        #[arg(short, long, default_value = r#"body="get all proxy from proxy pool""#)]
        query: String,
        /// Search engine endpoint
        #[arg(long, default_value = "https://fofa.info/result")]
        search_url: String,
        /// URL fetched through each proxy to decide liveness
        #[arg(long, default_value = "http://www.baidu.com")]
        target: String,
        /// Timeout in seconds for each probe
        #[arg(long, default_value = "5")]
        timeout: u64,
        /// Number of concurrent probes
        #[arg(short = 'n', long, default_value = "50")]
        concurrency: usize,
    },
    /// Check proxies from a file and keep the live ones
    Check {
        /// Input file containing one proxy address per line
        input: PathBuf,
        /// Output file for live proxies
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// URL fetched through each proxy to decide liveness
        #[arg(long, default_value = "http://www.baidu.com")]
        target: String,
        /// Timeout in seconds for each probe
        #[arg(long, default_value = "5")]
        timeout: u64,
        /// Number of concurrent probes
        #[arg(short = 'n', long, default_value = "50")]
        concurrency: usize,
    },
    /// Discover pool endpoints without refreshing the store
    Discover {
        /// Search expression for finding pool services
        #[arg(short, long, default_value = r#"body="get all proxy from proxy pool""#)]
        query: String,
        /// Search engine endpoint
        #[arg(long, default_value = "https://fofa.info/result")]
        search_url: String,
        /// Timeout in seconds for search requests
        #[arg(long, default_value = "30")]
        timeout: u64,
        /// Also fetch each discovered pool's listing
        #[arg(long)]
        fetch: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Stdout)
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => {
            // Default to a full harvest run
            run_harvest(
                cli.store,
                DiscoveryConfig::default(),
                FetcherConfig::default(),
                CheckerConfig::default(),
            )
            .await?;
        }
        Some(Commands::Run {
            query,
            search_url,
            target,
            timeout,
            concurrency,
        }) => {
            let timeout = Duration::from_secs(timeout);
            run_harvest(
                cli.store,
                DiscoveryConfig::new()
                    .with_search_url(search_url)
                    .with_query(query),
                FetcherConfig::new().with_timeout(timeout),
                CheckerConfig::new()
                    .with_timeout(timeout)
                    .with_concurrency(concurrency)
                    .with_target_url(target),
            )
            .await?;
        }
        Some(Commands::Check {
            input,
            output,
            target,
            timeout,
            concurrency,
        }) => {
            let addresses = ProxyStore::new(&input).load()?;

            println!("Loaded {} proxies from {:?}", addresses.len(), input);
            println!(
                "Checking with {} concurrent probes, timeout: {}s",
                concurrency, timeout
            );
            println!("Target URL: {}", target);
            println!();

            let config = CheckerConfig::new()
                .with_concurrency(concurrency)
                .with_timeout(Duration::from_secs(timeout))
                .with_target_url(target);

            let checker = ProxyChecker::with_config(config);
            let live = checker.validate(&addresses).await;

            println!(
                "Results: {} live, {} dead",
                live.len(),
                addresses.len() - live.len()
            );

            if let Some(output_path) = output {
                ProxyStore::new(&output_path).save(&live)?;
                println!("Saved {} live proxies to {:?}", live.len(), output_path);
            } else {
                for address in &live {
                    println!("{}", address);
                }
            }
        }
        Some(Commands::Discover {
            query,
            search_url,
            timeout,
            fetch,
        }) => {
            let config = DiscoveryConfig::new()
                .with_search_url(search_url)
                .with_query(query)
                .with_timeout(Duration::from_secs(timeout));
            let discovery = SearchDiscovery::with_config(config)?;

            let endpoints = discovery.discover().await?;
            println!("Found {} pool endpoints", endpoints.len());
            for endpoint in &endpoints {
                println!("{}", endpoint);
            }

            if fetch {
                let fetcher = PoolFetcher::new()?;
                let results = fetcher.fetch_all(&endpoints).await;

                println!();
                for result in results {
                    if result.is_success() {
                        println!(
                            "Found {} candidates from {}",
                            result.candidates.len(),
                            result.endpoint
                        );
                    } else if let Some(error) = result.error {
                        eprintln!("Error fetching {}: {}", result.endpoint, error);
                    }
                }
            }
        }
    }

    Ok(())
}

async fn run_harvest(
    store: PathBuf,
    discovery: DiscoveryConfig,
    fetcher: FetcherConfig,
    checker: CheckerConfig,
) -> Result<()> {
    let runner = HarvestRunner::new(
        SearchDiscovery::with_config(discovery)?,
        PoolFetcher::with_config(fetcher)?,
        ProxyChecker::with_config(checker),
        ProxyStore::new(store),
    );

    let summary = runner.run().await?;

    println!();
    println!(
        "Harvest complete: {} endpoints, {} new live, {}/{} stored proxies still live",
        summary.endpoints, summary.new_live, summary.old_live, summary.old_candidates
    );
    println!("Persisted {} proxies", summary.persisted);

    Ok(())
}
