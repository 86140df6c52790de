use mesa_server::{Config, Server, init_logger_with_file, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env()?;
    init_logger_with_file(&config.log_level, config.log_dir.as_deref());
    print_banner();

    tracing::info!(
        environment = %config.environment,
        database = %config.database_path,
        port = config.http_port,
        timezone = %config.timezone,
        "Mesa server starting"
    );

    let server = Server::new(config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
