use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use clinic_backend::auth::{seed_user, TokenService};
use clinic_backend::config::Config;
use clinic_backend::context::AppContext;
use clinic_backend::store::schema::bootstrap;
use clinic_backend::store::{Store, UserRepo};
use clinic_backend::{logging, services};
use log::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    logging::init(config.log_file.as_deref()).context("failed to initialize logging")?;

    let store = Store::open(&config.database_path, &config.pool)
        .with_context(|| format!("failed to open database {}", config.database_path.display()))?;
    bootstrap(&*store.conn()?, &config.legacy_owner).context("failed to bootstrap schema")?;

    if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
        seed_user(&UserRepo::new(store.clone()), username, password)
            .context("failed to seed admin user")?;
    }

    let tokens = TokenService::new(
        config.jwt_secret.as_bytes(),
        &config.jwt_issuer,
        config.jwt_expiry,
    );
    let ctx = web::Data::new(AppContext::new(store, tokens, config.store_timeout));

    info!(
        "Server running at http://{}:{} ({})",
        config.host, config.port, config.env
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(ctx.clone())
            .configure(services::configure)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;
    Ok(())
}
