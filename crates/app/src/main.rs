use migration::{Migrator, MigratorTrait};
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "cuentas={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let mut tasks = tokio::task::JoinSet::new();

    let server_settings = settings.server;
    let whatsapp_settings = settings.whatsapp;
    tasks.spawn(async move {
        let db = match parse_database(&server_settings.database).await {
            Ok(db) => db,
            Err(err) => {
                tracing::error!("failed to initialize database: {err}");
                return;
            }
        };

        let engine = match engine::Engine::builder().database(db).build().await {
            Ok(engine) => engine,
            Err(err) => {
                tracing::error!("failed to build engine from database: {err}");
                return;
            }
        };

        let (notifier, bot_phone) = match whatsapp_settings {
            Some(whatsapp) => (
                server::Notifier::Gateway(server::WhatsAppGateway::new(
                    whatsapp.api_url,
                    whatsapp.api_key,
                    whatsapp.phone_number_id,
                )),
                whatsapp.bot_phone,
            ),
            None => {
                tracing::warn!("no whatsapp settings; outbound messages are disabled");
                (server::Notifier::Disabled, None)
            }
        };

        let bind = server_settings.bind.unwrap_or_else(|| "127.0.0.1".to_string());
        let addr = format!("{}:{}", bind, server_settings.port);
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(err) => {
                tracing::error!("failed to bind server listener: {err}");
                return;
            }
        };
        if let Err(err) = server::run_with_listener(engine, notifier, bot_phone, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
