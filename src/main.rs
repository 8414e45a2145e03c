use secret_stash::configuration::get_configuration;
use secret_stash::startup::Application;
use secret_stash::telemetry::{get_subscriber, init_subscriber};

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    let subscriber = get_subscriber("secret-stash".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration.");
    let application = Application::build(configuration, None).await?;
    application.run_until_stopped().await?;
    Ok(())
}
