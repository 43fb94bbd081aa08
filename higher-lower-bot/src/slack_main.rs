use std::{iter::once, path::PathBuf, time::Duration};

use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use clap::Parser;
use joinery::JoinableIterator;
use log::{error, info, warn};
use serde::Deserialize;
use splitty::split_unquoted_whitespace;
use steam_higher_lower::{
    api::{StorefrontClient, LISTING_PAGES},
    engine::{RoundEngine, DEFAULT_ROUND_TIMEOUT},
    listing_cache::ListingCache,
    score_table::UserId,
    search_filter::SearchFilter,
};
use steam_scraping_utils::fs_json_util::{read_secret, read_toml};
use strum::IntoEnumIterator;
use url::Url;

use crate::{
    interaction::{error_text, round_result_message, round_start_message, Action},
    slack::{respond, webhook_send, InteractionForm, InteractionPayload, ResponseMessage, SlashCommand},
};

#[derive(Parser)]
struct Opts {
    #[arg(default_value = "ignore/higher-lower-config.toml")]
    config_path: PathBuf,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    port: u16,
    slash_command_endpoint: String,
    interactivity_endpoint: String,
    token_path: PathBuf,

    #[serde(default = "default_listing_pages")]
    listing_pages: u32,
    /// Seconds.
    #[serde(default = "default_round_timeout")]
    round_timeout: u64,
    listing_snapshot_path: Option<PathBuf>,

    slack_post_webhook: Option<Url>,
}
fn default_listing_pages() -> u32 {
    LISTING_PAGES
}
fn default_round_timeout() -> u64 {
    DEFAULT_ROUND_TIMEOUT.as_secs()
}

pub async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();
    let config: Config = read_toml(&opts.config_path)?;
    let token = read_secret(&config.token_path)
        .context("The verification token is required to accept requests")?;
    let storefront = StorefrontClient::new()?;
    let listings = load_listings(&config, &storefront).await?;
    let engine = RoundEngine::new(listings, Duration::from_secs(config.round_timeout));

    let port = config.port;
    let url = config.slack_post_webhook.clone();
    let state = web::Data::new(State {
        config,
        token,
        engine,
        storefront,
    });
    let webhook_send = |message: &'static str| webhook_send(state.storefront.reqwest(), &url, message);

    webhook_send("The server has started.").await;

    let app_state = state.clone();
    HttpServer::new(move || {
        let config = &app_state.config;
        App::new()
            .app_data(app_state.clone())
            .route(&config.slash_command_endpoint, web::post().to(slash_command))
            .route(&config.interactivity_endpoint, web::post().to(interactivity))
            .wrap(Logger::default())
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    webhook_send("The server is about to shut down.").await;

    Ok(())
}

/// Reuses the snapshot when there is one, so restarts do not scrape again.
async fn load_listings(config: &Config, client: &StorefrontClient) -> anyhow::Result<ListingCache> {
    if let Some(path) = &config.listing_snapshot_path {
        if path.exists() {
            info!("Loading listings from {path:?}");
            return ListingCache::load(path);
        }
    }
    let listings = ListingCache::fetch(client, config.listing_pages)
        .await
        .context("The base listing could not be fetched")?;
    listings.log_counts();
    if let Some(path) = &config.listing_snapshot_path {
        listings.save(path)?;
        info!("Saved listings to {path:?}");
    }
    Ok(listings)
}

struct State {
    config: Config,
    token: String,
    engine: RoundEngine,
    storefront: StorefrontClient,
}

mod slash_command {
    use std::convert::Infallible;

    use clap::{Args, Parser, Subcommand};
    use steam_higher_lower::search_filter::SearchFilter;

    #[derive(Parser, Debug)]
    pub struct Opts {
        #[clap(subcommand)]
        pub sub: Option<Sub>,
    }
    #[derive(Subcommand, Debug)]
    pub enum Sub {
        /// Start a round.
        Play(Play),
        /// List the filters and how many titles each one holds.
        Filters,
        /// Show your current streak.
        Score,
    }
    #[derive(Args, Debug)]
    pub struct Play {
        #[arg(value_parser = parse_filter, default_value = "base")]
        pub filter: SearchFilter,
    }

    fn parse_filter(s: &str) -> Result<SearchFilter, Infallible> {
        Ok(SearchFilter::parse_or_base(s))
    }
}

async fn slash_command(state: web::Data<State>, info: web::Form<SlashCommand>) -> HttpResponse {
    let info = info.into_inner();
    info!("Slash command from {}: {:?}", info.user_id, info.text);
    if info.token != state.token {
        warn!("Rejected a slash command from {} with a wrong token", info.user_id);
        return HttpResponse::Unauthorized().finish();
    }

    let args = slash_command::Opts::try_parse_from(
        once(info.command.as_str()).chain(split_unquoted_whitespace(&info.text).unwrap_quotes(true)),
    );
    let args = match args {
        Ok(args) => args,
        Err(e) => return HttpResponse::Ok().json(ResponseMessage::ephemeral(format!("```{e}```"))),
    };
    let user_id = UserId::from(info.user_id);
    use slash_command::Sub;
    match args.sub.unwrap_or(Sub::Play(slash_command::Play {
        filter: SearchFilter::Base,
    })) {
        Sub::Play(play) => {
            spawn_round(state, play.filter, user_id, info.response_url);
            HttpResponse::Ok().finish()
        }
        Sub::Filters => {
            HttpResponse::Ok().json(ResponseMessage::ephemeral(filters_text(state.engine.listings())))
        }
        Sub::Score => HttpResponse::Ok().json(ResponseMessage::ephemeral(format!(
            "Your current streak: {}",
            state.engine.scores().get(&user_id)
        ))),
    }
}

async fn interactivity(state: web::Data<State>, form: web::Form<InteractionForm>) -> HttpResponse {
    let payload: InteractionPayload = match serde_json::from_str(&form.payload) {
        Ok(payload) => payload,
        Err(e) => {
            error!("Malformed interaction payload: {e}");
            return HttpResponse::BadRequest().finish();
        }
    };
    if payload.token != state.token {
        warn!("Rejected an interaction from {} with a wrong token", payload.user.id);
        return HttpResponse::Unauthorized().finish();
    }
    if payload.kind != "block_actions" {
        info!("Ignoring a {} interaction", payload.kind);
        return HttpResponse::Ok().finish();
    }
    let Some(clicked) = payload.actions.first() else {
        return HttpResponse::Ok().finish();
    };
    let action = match Action::parse(&clicked.action_id, &clicked.value) {
        Ok(action) => action,
        Err(e) => {
            error!("{e:#}");
            return HttpResponse::BadRequest().finish();
        }
    };
    info!("Interaction from {}: {action:?}", payload.user.id);

    let user_id = UserId::from(payload.user.id);
    let response_url = payload.response_url;
    match action {
        Action::Choose { round_id, choice } => {
            let message = match state.engine.resolve(round_id, choice, &user_id) {
                Ok(result) => round_result_message(&result),
                Err(e) => {
                    warn!("{user_id} could not answer: {e}");
                    ResponseMessage::ephemeral(error_text(&e))
                }
            };
            tokio::task::spawn(async move {
                respond(state.storefront.reqwest(), &response_url, &message).await;
            });
        }
        Action::NextRound(filter) => spawn_round(state, filter, user_id, response_url),
        Action::Restart => spawn_round(state, SearchFilter::Base, user_id, response_url),
    }
    HttpResponse::Ok().finish()
}

/// Scraping the player counts takes a while, so the round is posted later
/// through `response_url`.
fn spawn_round(state: web::Data<State>, filter: SearchFilter, user_id: UserId, response_url: Url) {
    tokio::task::spawn(async move {
        let message = match state
            .engine
            .start_round(&state.storefront, filter, &user_id)
            .await
        {
            Ok(start) => round_start_message(&start),
            Err(e) => {
                if e.is_fetch_failure() {
                    error!("Could not start a {filter} round for {user_id}: {e:#}");
                } else {
                    warn!("Could not start a {filter} round for {user_id}: {e}");
                }
                ResponseMessage::ephemeral(error_text(&e))
            }
        };
        respond(state.storefront.reqwest(), &response_url, &message).await;
    });
}

fn filters_text(listings: &ListingCache) -> String {
    SearchFilter::iter()
        .map(|filter| {
            format!(
                "`{}` `{filter}`: {} ({} titles)",
                filter as usize,
                filter.description(),
                listings.count(filter)
            )
        })
        .join_with("\n")
        .to_string()
}
