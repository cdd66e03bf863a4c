use std::sync::Arc;

use actix_session::{SessionMiddleware, config::CookieContentSecurity, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::{Key, SameSite}, middleware, web};

use facultyrec::auth::rate_limit::LoginThrottle;
use facultyrec::config::Config;
use facultyrec::store::DocumentStore;
use facultyrec::uploads::UploadStore;
use facultyrec::{db, handlers};

fn session_key(configured: Option<&str>) -> Key {
    match configured {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::load().map_err(std::io::Error::other)?;

    std::fs::create_dir_all(&config.upload_dir)?;
    let uploads = UploadStore::new(config.upload_dir.clone(), config.max_upload_bytes);

    let store: Arc<dyn DocumentStore> = db::open_store(&config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    db::seed_coordinators_from_file(store.as_ref(), &config.coordinator_seed)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let secret_key = session_key(config.session_key.as_deref());
    let store = web::Data::from(store);
    let throttle = web::Data::new(LoginThrottle::default());
    let upload_data = web::Data::new(uploads.clone());

    log::info!(
        "Starting server at http://{} (store: {}, uploads: {})",
        config.bind_addr,
        store.backend_tag(),
        uploads.root().display()
    );

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_secure(false)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Strict)
        .build();

        let uploads = uploads.clone();
        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(store.clone())
            .app_data(throttle.clone())
            .app_data(upload_data.clone())
            .configure(move |cfg| handlers::configure(cfg, &uploads))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
