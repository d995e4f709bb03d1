use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::RestConfig;
use api_rest::config::{public_dir_from_env_value, rest_addr_from_env_values};
use api_rest::static_files::INDEX_HTML;
use cards_core::config::{max_upload_bytes_from_env_value, uploads_dir_from_env_value};
use cards_core::{CardService, CoreConfig};

/// Main entry point for the cards application
///
/// Resolves configuration once, creates the uploads directory if needed and serves the
/// REST API, the stored uploads and the frontend on a single address.
///
/// # Environment Variables
/// - `PORT`: listen port on all interfaces (default: 3000)
/// - `CARDS_REST_ADDR`: full listen address, overrides `PORT`
/// - `CARDS_UPLOADS_DIR`: directory for uploaded images (default: "uploads")
/// - `CARDS_PUBLIC_DIR`: directory of the frontend bundle (default: "public")
/// - `CARDS_MAX_UPLOAD_BYTES`: largest accepted image (default: 10 MiB)
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - any environment value is invalid,
/// - the uploads directory cannot be created, or
/// - the server address cannot be bound or the server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cards_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("cards_core=info".parse()?)
                .add_directive("cards_files=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = rest_addr_from_env_values(
        std::env::var("CARDS_REST_ADDR").ok(),
        std::env::var("PORT").ok(),
    )?;
    let public_dir = public_dir_from_env_value(std::env::var("CARDS_PUBLIC_DIR").ok());
    let uploads_dir = uploads_dir_from_env_value(std::env::var("CARDS_UPLOADS_DIR").ok());
    let max_upload_bytes =
        max_upload_bytes_from_env_value(std::env::var("CARDS_MAX_UPLOAD_BYTES").ok())?;

    let cfg = CoreConfig::new(uploads_dir, max_upload_bytes)?;
    let cards = CardService::new(&cfg)?;

    tracing::info!("++ Starting cards server on {}", addr);
    tracing::info!(
        "++ Uploads in {} (max {} bytes)",
        cards.uploads_dir().display(),
        cards.max_upload_bytes()
    );
    if !public_dir.join(INDEX_HTML).is_file() {
        tracing::warn!(
            "frontend entry {} not found; unmatched paths will return 404",
            public_dir.join(INDEX_HTML).display()
        );
    }

    api_rest::serve(RestConfig::new(addr, public_dir), cards).await
}
