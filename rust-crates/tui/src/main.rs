use clap::Parser;
use color_eyre::eyre::Result;
use rps_client::{
    client,
    config::{
        AppConfig,
        Cli,
    },
    logging,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let app_config = AppConfig::from_cli(cli)?;
    let _log_guard = logging::init_tracing(&app_config.log_dir)?;
    tracing::info!(
        network = %app_config.network,
        rpc_url = app_config.network.url(),
        "starting rps-client"
    );
    client::run_app(app_config).await
}
