use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;

use student_portal::{
    auth::JwtKeys,
    config::AppConfig,
    db::connection,
    logging::init_tracing,
    routes::app,
    state::AppState,
    storage::LocalImageStore,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging.rust_log);

    let database = cfg
        .database
        .as_ref()
        .context("database config is required (APP_DATABASE__URL)")?;
    let auth = cfg
        .auth
        .as_ref()
        .context("auth config is required (APP_AUTH__JWT_SECRET)")?;

    let db = connection::connect(database).await?;
    let jwt = JwtKeys::from_secret(auth.jwt_secret.as_bytes());
    let images = Arc::new(LocalImageStore::new(&cfg.storage.image_dir));

    let addr: SocketAddr = format!("{}:{}", cfg.general.host, cfg.general.port)
        .parse()
        .context("invalid host/port")?;

    let state = AppState::new(cfg, db, jwt, images);
    let app = app(Arc::clone(&state));

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
