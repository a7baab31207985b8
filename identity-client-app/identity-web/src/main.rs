use identity_shared::{telemetry::init_telemetry, AppConfig};
use identity_web::Startup;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (.env, config files, environment)
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize telemetry
    init_telemetry(config.app.env);
    info!("{} starting...", config.app.name);

    // DefaultConnection is required before anything else starts
    let startup = match Startup::from_config(config) {
        Ok(s) => s,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let application = startup.build().await?;
    application.run().await?;

    Ok(())
}
