use crate::authentication::middleware::reject_anonymous_users;
use crate::configuration::Settings;
use crate::routes::{self, site};
use crate::session::SqlxSqliteSessionStore;
use crate::utils::get_connection_pool;
use actix_session::SessionMiddleware;
use actix_web::cookie::Key;
use actix_web::dev::Server;
use actix_web::middleware::from_fn;
use actix_web::rt::time;
use actix_web::{web, App, HttpServer};
use actix_web_flash_messages::storage::CookieMessageStore;
use actix_web_flash_messages::{FlashMessagesFramework, Level};
use secrecy::{ExposeSecret, Secret};
use sqlx::SqlitePool;
use std::env;
use std::io::Error;
use std::net::TcpListener;
use std::path::Path;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings, pool: Option<SqlitePool>) -> Result<Self, Error> {
        // Callers that hand us a pool own the schema; otherwise the
        // database is created and migrated on boot.
        let run_setup = pool.is_none();
        if run_setup {
            tracing::info!("Building database and running migrations...");
            configuration.database.create_database_if_missing().await;
        }
        let connection_pool = get_connection_pool(&configuration.database, pool).await;
        if run_setup {
            run_migration(&connection_pool).await;
            tracing::info!("Migrations completed.");
        }

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );

        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr().unwrap().port();
        let server = run(
            listener,
            connection_pool,
            configuration.application.hmac_secret,
        )?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    db_pool: SqlitePool,
    hmac_secret: Secret<String>,
) -> Result<Server, Error> {
    let session_store = SqlxSqliteSessionStore::new_pooled(db_pool.clone());

    let db_pool_web = web::Data::new(db_pool);
    let secret_key: Key = Key::from(hmac_secret.expose_secret().as_bytes());
    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store)
        .minimum_level(Level::Debug)
        .build();

    let session_store_clone = session_store.clone();
    tokio::spawn(async move {
        let mut interval = time::interval(Duration::from_secs(300));
        loop {
            interval.tick().await;
            if let Err(e) = session_store_clone.cleanup().await {
                tracing::warn!("Failed to clean up expired sessions: {:?}", e);
            }
        }
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(message_framework.clone())
            .wrap(TracingLogger::default())
            .wrap(SessionMiddleware::new(
                session_store.clone(),
                secret_key.clone(),
            ))
            .route(
                "/health_check",
                web::get().to(routes::health_check::health_check),
            )
            .route("/", web::get().to(site::home::home))
            .route("/login", web::get().to(site::login::get::login_form))
            .route("/login", web::post().to(site::login::post::login))
            .route("/logout", web::get().to(site::logout::log_out))
            .route("/session", web::get().to(routes::session::current_session))
            .route("/members", web::get().to(site::members::members_area))
            .route(
                "/subscriptions",
                web::post().to(routes::subscriptions::subscribe),
            )
            .route(
                "/subscriptions",
                web::get().to(routes::subscriptions::list_subscribers),
            )
            .route(
                "/subscriptions",
                web::delete().to(routes::subscriptions::unsubscribe),
            )
            .service(
                web::scope("/api/members")
                    .wrap(from_fn(reject_anonymous_users))
                    .route(
                        "/secret-stash",
                        web::get().to(routes::members::secret_stash),
                    ),
            )
            .app_data(db_pool_web.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}

pub async fn run_migration(db_pool: &SqlitePool) {
    let migrations = if env::var("APP_ENVIRONMENT") == Ok("production".to_string()) {
        Path::new("/app/migrations").join("")
    } else {
        // Development migrations dir
        let crate_dir =
            std::env::var("CARGO_MANIFEST_DIR").expect("Error getting Crate Directory.");
        Path::new(&crate_dir).join("./migrations")
    };

    tracing::info!("Running migrations with path: {:?}", migrations);

    sqlx::migrate::Migrator::new(migrations)
        .await
        .expect("Failed to create migrator")
        .run(db_pool)
        .await
        .expect("Failed to migrate database");
}
