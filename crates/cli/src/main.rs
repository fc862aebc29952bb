use anyhow::{anyhow, bail, Context};
use daddeck_core::{
    generate_batch, holo_distribution, simulate_packs, BatchOutcome, CardCatalog, DadType,
    HoloVariant, PackDesign, PackStats, Rarity,
};
use daddeck_data::{catalog_signature, load_assets, load_pity_file, save_pity_file, Assets};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_STATS_SEED: u64 = 0xDADDECC;
const DEFAULT_STATS_PACKS: usize = 1_000;
const DEFAULT_HOLO_TRIALS: u64 = 10_000;

const USAGE: &str = "\
usage: daddeck <command> [options]

commands:
  open    open packs (--count 1..10, --type, --theme, --season, --pity FILE, --json)
  stats   simulate packs and print observed rates (--packs N)
  holo    measure holo variant rates for one rarity (--rarity R, --trials N)
  cards   list the catalog (--rarity R)

common options:
  --assets DIR   assets directory (default: $DADDECK_ASSETS or ./assets)
  --seed N       seed for reproducible output";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Open,
    Stats,
    Holo,
    Cards,
    Help,
}

#[derive(Debug, Clone, PartialEq)]
struct CliOptions {
    command: Command,
    assets: PathBuf,
    seed: Option<u64>,
    count: usize,
    packs: usize,
    trials: u64,
    pack_type: String,
    theme: Option<DadType>,
    season: Option<u32>,
    rarity: Option<Rarity>,
    pity_path: Option<PathBuf>,
    json: bool,
}

fn parse_cli_options(args: &[String]) -> anyhow::Result<CliOptions> {
    let command = match args.first().map(String::as_str) {
        None | Some("help") | Some("--help") | Some("-h") => Command::Help,
        Some("open") => Command::Open,
        Some("stats") => Command::Stats,
        Some("holo") => Command::Holo,
        Some("cards") => Command::Cards,
        Some(other) => bail!("unknown command {other}"),
    };
    let mut options = CliOptions {
        command,
        assets: std::env::var_os("DADDECK_ASSETS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
        seed: None,
        count: 1,
        packs: DEFAULT_STATS_PACKS,
        trials: DEFAULT_HOLO_TRIALS,
        pack_type: "standard".to_string(),
        theme: None,
        season: None,
        rarity: None,
        pity_path: None,
        json: false,
    };

    let mut idx = 1usize;
    while idx < args.len() {
        let flag = args[idx].as_str();
        let mut value = || next_value(args, &mut idx, flag);
        match flag {
            "--assets" => options.assets = PathBuf::from(value()?),
            "--seed" => options.seed = Some(parse_number(flag, value()?)?),
            "--count" | "-n" => options.count = parse_number(flag, value()?)?,
            "--packs" => options.packs = parse_number(flag, value()?)?,
            "--trials" => options.trials = parse_number(flag, value()?)?,
            "--type" | "-t" => options.pack_type = value()?.to_string(),
            "--theme" => {
                let raw = value()?;
                options.theme =
                    Some(DadType::from_key(raw).ok_or_else(|| anyhow!("unknown theme {raw}"))?);
            }
            "--season" => options.season = Some(parse_number(flag, value()?)?),
            "--rarity" | "-r" => {
                let raw = value()?;
                options.rarity =
                    Some(Rarity::from_key(raw).ok_or_else(|| anyhow!("unknown rarity {raw}"))?);
            }
            "--pity" => options.pity_path = Some(PathBuf::from(value()?)),
            "--json" => options.json = true,
            other => bail!("unknown option {other}"),
        }
        idx += 1;
    }
    Ok(options)
}

fn next_value<'a>(args: &'a [String], idx: &mut usize, flag: &str) -> anyhow::Result<&'a str> {
    *idx += 1;
    args.get(*idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{flag} needs a value"))
}

fn parse_number<T: std::str::FromStr>(flag: &str, raw: &str) -> anyhow::Result<T> {
    raw.parse::<T>()
        .map_err(|_| anyhow!("{flag} expects a number, got {raw}"))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("DADDECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logging setup failed: {err}");
    }
}

fn main() {
    init_logging();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_cli_options(&args).and_then(|options| run(&options));
    if let Err(err) = result {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(options: &CliOptions) -> anyhow::Result<()> {
    if options.command == Command::Help {
        println!("{USAGE}");
        return Ok(());
    }
    let assets = load_assets(&options.assets)
        .with_context(|| format!("load assets from {}", options.assets.display()))?;
    match options.command {
        Command::Open => run_open(options, &assets),
        Command::Stats => run_stats(options, &assets),
        Command::Holo => run_holo(options),
        Command::Cards => run_cards(options, &assets),
        Command::Help => Ok(()),
    }
}

#[derive(Serialize)]
struct OpenReport<'a> {
    catalog_signature: String,
    #[serde(flatten)]
    batch: &'a BatchOutcome,
}

fn run_open(options: &CliOptions, assets: &Assets) -> anyhow::Result<()> {
    let config = assets.request_config(&options.pack_type, options.theme, options.season);
    let signature = catalog_signature(&assets.catalog);
    let mut saved = match &options.pity_path {
        Some(path) => Some(load_pity_file(path, &signature)?),
        None => None,
    };

    let batch = generate_batch(
        &config,
        &assets.catalog,
        options.count,
        options.seed,
        saved.as_ref().map(|saved| &saved.counter),
    )?;

    if let (Some(path), Some(saved)) = (&options.pity_path, saved.as_mut()) {
        saved.counter = batch.pity_counter;
        saved.packs_opened += batch.outcomes.len() as u64;
        saved.catalog_signature = signature.clone();
        save_pity_file(path, saved)?;
        info!(path = %path.display(), packs_opened = saved.packs_opened, "saved pity");
    }

    if options.json {
        let report = OpenReport {
            catalog_signature: signature,
            batch: &batch,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    print!("{}", format_batch(&batch));
    Ok(())
}

fn format_batch(batch: &BatchOutcome) -> String {
    let mut out = String::new();
    for outcome in &batch.outcomes {
        let pack = &outcome.pack;
        out.push_str(&format!(
            "{} [{} pack, {} design, seed {}] best: {}\n",
            pack.id,
            pack.pack_type.as_str(),
            pack.design.as_str(),
            pack.seed,
            pack.best_rarity.as_str()
        ));
        for (index, card) in pack.cards.iter().enumerate() {
            let holo = if card.is_holo {
                format!(" *{}*", card.holo_type.as_str())
            } else {
                String::new()
            };
            out.push_str(&format!(
                "  {}. {:<8} {:<24} {:<10} {}{}\n",
                index + 1,
                card.id(),
                card.card.name,
                card.rarity().as_str(),
                card.card.dad_type.as_str(),
                holo
            ));
        }
        if let Some(tier) = outcome.pity_triggered {
            out.push_str(&format!("  pity: final slot raised to {}\n", tier.as_str()));
        }
        for anomaly in &outcome.anomalies {
            out.push_str(&format!("  warning: {anomaly:?}\n"));
        }
    }
    let counter = batch.pity_counter;
    out.push_str(&format!(
        "pity: rare {} / epic {} / legendary {} / mythic {}\n",
        counter.rare, counter.epic, counter.legendary, counter.mythic
    ));
    out
}

fn run_stats(options: &CliOptions, assets: &Assets) -> anyhow::Result<()> {
    let config = assets.request_config(&options.pack_type, options.theme, options.season);
    let seed = options.seed.unwrap_or(DEFAULT_STATS_SEED);
    let (stats, _) = simulate_packs(&config, &assets.catalog, options.packs, seed, None)?;
    if options.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }
    print!("{}", format_stats(&stats));
    Ok(())
}

fn format_stats(stats: &PackStats) -> String {
    let mut out = format!("{} packs, {} cards\n", stats.packs, stats.cards);
    out.push_str("rarity:\n");
    for rarity in Rarity::ALL {
        out.push_str(&format!(
            "  {:<10} {:>7.3}%\n",
            rarity.as_str(),
            stats.rarity_share(rarity) * 100.0
        ));
    }
    out.push_str("holo:\n");
    for variant in HoloVariant::ALL {
        out.push_str(&format!(
            "  {:<10} {:>7.3}%\n",
            variant.as_str(),
            stats.holo_share(variant) * 100.0
        ));
    }
    out.push_str("design:\n");
    for design in PackDesign::ALL {
        out.push_str(&format!(
            "  {:<10} {:>7.3}%\n",
            design.as_str(),
            stats.design_share(design) * 100.0
        ));
    }
    out.push_str("types:\n");
    for (dad_type, count) in &stats.by_type {
        out.push_str(&format!("  {:<12} {count}\n", dad_type.as_str()));
    }
    out.push_str(&format!(
        "pity triggers: {}, duplicates: {}, anomalies: {}\n",
        stats.pity_triggers, stats.duplicates, stats.anomalies
    ));
    out
}

fn run_holo(options: &CliOptions) -> anyhow::Result<()> {
    let rarity = options.rarity.unwrap_or(Rarity::Common);
    let seed = options.seed.unwrap_or(DEFAULT_STATS_SEED);
    let dist = holo_distribution(rarity, options.trials, seed);
    if options.json {
        println!("{}", serde_json::to_string_pretty(&dist)?);
        return Ok(());
    }
    println!("{} rolls for {}:", dist.trials, rarity.as_str());
    for variant in HoloVariant::ALL {
        println!(
            "  {:<10} {:>7.3}%",
            variant.as_str(),
            dist.share(variant) * 100.0
        );
    }
    Ok(())
}

fn run_cards(options: &CliOptions, assets: &Assets) -> anyhow::Result<()> {
    let cards = match options.rarity {
        Some(rarity) => assets.catalog.cards_by_rarity(rarity),
        None => assets.catalog.all_cards(),
    };
    if options.json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
        return Ok(());
    }
    for card in cards {
        let season = card
            .season_id
            .map(|season| format!(" (season {season})"))
            .unwrap_or_default();
        println!(
            "{:<8} {:<24} {:<10} {}{}",
            card.id,
            card.name,
            card.rarity.as_str(),
            card.dad_type.as_str(),
            season
        );
    }
    Ok(())
}
