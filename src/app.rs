/*
 * Responsibility
 * - tracing / panic hook 初期化
 * - Config読み込み → 依存生成 (claim store, pipeline, ticket decoder) → Router 組み立て
 * - Middleware の適用 (HTTP layer / identity)
 * - axum::serve() で起動
 */
use std::{panic, process, sync::Arc};

use anyhow::Result;
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, v1::handlers::health::health};
use crate::config::Config;
use crate::middleware::{self, http::HttpLimits};
use crate::repos::membership_repo::MembershipRepo;
use crate::services::cache::ValkeyClient;
use crate::services::claim_store::{
    CachedClaimStore, PgMembershipClaimStore, SupplementaryClaimStore,
};
use crate::services::identity::{LocalClaimAugmenter, PrincipalAssembler, RequestIdentityPipeline};
use crate::services::ticket::TicketDecoder;
use crate::state::AppState;

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,household_identity=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    // Keep the default hook as a fallback (prints to stderr with location/payload).
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // Development: crash the whole process so we notice immediately.
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(?config, "starting household identity service");

    let state = build_state(&config).await?;
    let app = build_router(
        state,
        HttpLimits {
            request_timeout: config.request_timeout,
            ..HttpLimits::default()
        },
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn build_claim_store(config: &Config) -> Result<Arc<dyn SupplementaryClaimStore>> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    let store: Arc<dyn SupplementaryClaimStore> =
        Arc::new(PgMembershipClaimStore::new(MembershipRepo::new(pool)));

    let Some(redis_url) = config.redis_url.as_deref() else {
        tracing::info!("REDIS_URL not set; claim cache disabled");
        return Ok(store);
    };

    let cache = ValkeyClient::new(redis_url).await?;
    Ok(Arc::new(CachedClaimStore::new(
        store,
        cache,
        config.claim_cache_ttl,
    )))
}

async fn build_state(config: &Config) -> Result<AppState> {
    let store = build_claim_store(config).await?;

    let pipeline = RequestIdentityPipeline::new(
        PrincipalAssembler::new(),
        LocalClaimAugmenter::new(store, config.claim_store_timeout),
    );
    let tickets = TicketDecoder::new(
        &config.ticket_signing_secret,
        &config.ticket_issuer,
        config.ticket_leeway_seconds,
    );

    Ok(AppState::new(
        Arc::new(pipeline),
        Arc::new(tickets),
        config.ticket_cookie_name.as_str(),
    ))
}

/// Router with every layer applied. `/health` bypasses the identity pipeline.
pub fn build_router(state: AppState, limits: HttpLimits) -> Router {
    let v1 = middleware::identity::apply(api::v1::routes(), state.clone());

    let router = Router::new()
        .route("/health", get(health))
        .nest("/api/v1", v1)
        .with_state(state);

    middleware::http::apply(router, limits)
}
