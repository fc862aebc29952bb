use anyhow::{anyhow, Context};
use daddeck_core::{
    draw_cards, generate_batch, Card, CardCatalog, CardFilter, DadType, DistributionAnomaly,
    Pack, PackDesign, PityCounter, Rarity, RngState,
};
use daddeck_data::{load_assets, Assets};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:7878";

fn main() {
    let filter = EnvFilter::try_from_env("DADDECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logging setup failed: {err}");
    }
    if let Err(err) = serve() {
        error!("{err:#}");
        std::process::exit(1);
    }
}

fn serve() -> anyhow::Result<()> {
    let assets_dir = std::env::var_os("DADDECK_ASSETS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"));
    let assets = load_assets(&assets_dir)
        .with_context(|| format!("load assets from {}", assets_dir.display()))?;
    let addr = std::env::var("DADDECK_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let server = Server::http(&addr).map_err(|err| anyhow!("start server on {addr}: {err}"))?;
    info!(%addr, "daddeck web server listening");

    let state = Arc::new(Mutex::new(AppState::new(assets)));
    for request in server.incoming_requests() {
        let state = state.clone();
        if let Err(err) = handle_request(request, state) {
            warn!("request error: {err:#}");
        }
    }
    Ok(())
}

struct AppState {
    assets: Assets,
    pity: PityCounter,
}

impl AppState {
    fn new(assets: Assets) -> Self {
        Self {
            assets,
            pity: PityCounter::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateRequest {
    pack_type: Option<String>,
    count: Option<usize>,
    design: Option<PackDesign>,
    seed: Option<u64>,
    theme_type: Option<DadType>,
    season_id: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    ok: bool,
    packs: Vec<Pack>,
    pity_counter: PityCounter,
    anomalies: Vec<DistributionAnomaly>,
}

#[derive(Debug, Serialize)]
struct CardsResponse<'a> {
    ok: bool,
    cards: Vec<&'a Card>,
}

#[derive(Debug, Serialize)]
struct CardResponse<'a> {
    ok: bool,
    card: &'a Card,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RandomCardsRequest {
    exclude: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PityResponse {
    ok: bool,
    pity_counter: PityCounter,
}

#[derive(Debug, Serialize)]
struct ApiError {
    ok: bool,
    error: String,
}

fn handle_request(
    mut request: tiny_http::Request,
    state: Arc<Mutex<AppState>>,
) -> anyhow::Result<()> {
    let url = request.url().to_string();
    let (path, query) = url.split_once('?').unwrap_or((url.as_str(), ""));
    let method = request.method().clone();
    match (&method, path) {
        (&Method::Post, "/api/packs/generate") => {
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body)?;
            let result = parse_generate(&body).and_then(|req| {
                let mut guard = state.lock().map_err(|_| anyhow!("state lock poisoned"))?;
                generate(&mut guard, req)
            });
            match result {
                Ok(response) => respond_json(request, 200, &response),
                Err(err) => respond_error(request, 400, &err),
            }
        }
        (&Method::Post, "/api/cards/random") => {
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body)?;
            let guard = state.lock().map_err(|_| anyhow!("state lock poisoned"))?;
            match random_cards(&guard.assets, query, &body) {
                Ok(cards) => respond_json(request, 200, &CardsResponse { ok: true, cards }),
                Err(err) => respond_error(request, 400, &err),
            }
        }
        (&Method::Get, "/api/cards") => {
            let guard = state.lock().map_err(|_| anyhow!("state lock poisoned"))?;
            match list_cards(&guard.assets, query) {
                Ok(cards) => respond_json(request, 200, &CardsResponse { ok: true, cards }),
                Err(err) => respond_error(request, 400, &err),
            }
        }
        (&Method::Get, path) if path.starts_with("/api/cards/") => {
            let id = &path["/api/cards/".len()..];
            let guard = state.lock().map_err(|_| anyhow!("state lock poisoned"))?;
            match find_card(&guard.assets, id) {
                Ok(card) => respond_json(request, 200, &CardResponse { ok: true, card }),
                Err(err) => respond_error(request, 404, &err),
            }
        }
        (&Method::Get, "/api/pity") => {
            let guard = state.lock().map_err(|_| anyhow!("state lock poisoned"))?;
            let response = PityResponse {
                ok: true,
                pity_counter: guard.pity,
            };
            respond_json(request, 200, &response)
        }
        _ => {
            request.respond(Response::empty(StatusCode(404)))?;
            Ok(())
        }
    }
}

fn parse_generate(body: &str) -> anyhow::Result<GenerateRequest> {
    if body.trim().is_empty() {
        return Ok(GenerateRequest::default());
    }
    serde_json::from_str(body).context("invalid request body")
}

/// Opens packs against the server's pity counter. The counter only moves
/// when the whole batch succeeds.
fn generate(state: &mut AppState, req: GenerateRequest) -> anyhow::Result<GenerateResponse> {
    let pack_type = req.pack_type.as_deref().unwrap_or("standard");
    let mut config = state
        .assets
        .request_config(pack_type, req.theme_type, req.season_id);
    if req.design.is_some() {
        config.design_override = req.design;
    }
    let batch = generate_batch(
        &config,
        &state.assets.catalog,
        req.count.unwrap_or(1),
        req.seed,
        Some(&state.pity),
    )?;
    state.pity = batch.pity_counter;
    info!(pack_type, packs = batch.outcomes.len(), "generated packs");
    let anomalies = batch
        .outcomes
        .iter()
        .flat_map(|outcome| outcome.anomalies.iter().cloned())
        .collect();
    Ok(GenerateResponse {
        ok: true,
        packs: batch.packs().cloned().collect(),
        pity_counter: batch.pity_counter,
        anomalies,
    })
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == key)
        .map(|(_, value)| value)
}

fn parse_rarity(query: &str) -> anyhow::Result<Option<Rarity>> {
    query_param(query, "rarity")
        .map(|value| Rarity::from_key(value).ok_or_else(|| anyhow!("unknown rarity {value}")))
        .transpose()
}

fn parse_type(query: &str) -> anyhow::Result<Option<DadType>> {
    query_param(query, "type")
        .map(|value| DadType::from_key(value).ok_or_else(|| anyhow!("unknown dad type {value}")))
        .transpose()
}

fn list_cards<'a>(assets: &'a Assets, query: &str) -> anyhow::Result<Vec<&'a Card>> {
    let rarity = parse_rarity(query)?;
    let dad_type = parse_type(query)?;
    Ok(assets
        .catalog
        .all_cards()
        .into_iter()
        .filter(|card| rarity.map_or(true, |rarity| card.rarity == rarity))
        .filter(|card| dad_type.map_or(true, |dad_type| card.dad_type == dad_type))
        .collect())
}

fn find_card<'a>(assets: &'a Assets, id: &str) -> anyhow::Result<&'a Card> {
    assets
        .catalog
        .card_by_id(id)
        .ok_or_else(|| anyhow!("unknown card {id}"))
}

/// Distinct random cards through the card selector, skipping `exclude` ids.
fn random_cards<'a>(assets: &'a Assets, query: &str, body: &str) -> anyhow::Result<Vec<&'a Card>> {
    let count = match query_param(query, "count") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| anyhow!("count expects a number, got {raw}"))?,
        None => 1,
    };
    let seed = query_param(query, "seed")
        .map(|raw| {
            raw.parse::<u64>()
                .map_err(|_| anyhow!("seed expects a number, got {raw}"))
        })
        .transpose()?;
    let request: RandomCardsRequest = if body.trim().is_empty() {
        RandomCardsRequest::default()
    } else {
        serde_json::from_str(body).context("invalid request body")?
    };
    let filter = CardFilter {
        dad_type: parse_type(query)?,
        season_id: None,
    };
    let mut excluded: HashSet<String> = request.exclude.into_iter().collect();
    let mut rng = RngState::from_optional_seed(seed);
    let picked = draw_cards(
        &assets.catalog,
        count,
        parse_rarity(query)?,
        &filter,
        &mut excluded,
        &mut rng,
    )?;
    Ok(picked.into_iter().map(|selection| selection.card).collect())
}

fn respond_json<T: Serialize>(
    request: tiny_http::Request,
    status: u16,
    body: &T,
) -> anyhow::Result<()> {
    let body = serde_json::to_vec_pretty(body)?;
    let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
        .map_err(|_| anyhow!("invalid content type header"))?;
    request.respond(
        Response::from_data(body)
            .with_header(header)
            .with_status_code(StatusCode(status)),
    )?;
    Ok(())
}

fn respond_error(
    request: tiny_http::Request,
    status: u16,
    err: &anyhow::Error,
) -> anyhow::Result<()> {
    let body = ApiError {
        ok: false,
        error: format!("{err:#}"),
    };
    respond_json(request, status, &body)
}
