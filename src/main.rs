use enlightened_sage::configuration::get_configuration;
use enlightened_sage::startup::Application;
use enlightened_sage::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let subscriber = get_subscriber("enlightened_sage".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration()?;
    let application = Application::build(configuration).await?;
    tracing::info!(
        "Server is running on http://localhost:{}",
        application.port()
    );
    application.run_until_stopped().await?;
    Ok(())
}
