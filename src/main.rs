use contact_form::configuration::get_configuration;
use contact_form::create_app;
use contact_form::errors::Error;
use contact_form::mail::SmtpMailSender;
use std::net::IpAddr;
use std::net::SocketAddr;
use std::str::FromStr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn bind_address(host: &str, port: u16) -> Result<SocketAddr, Error> {
    let host = IpAddr::from_str(host)?;
    Ok(SocketAddr::from((host, port)))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    let configuration = get_configuration()?;
    let addr = bind_address(
        &configuration.application.host,
        configuration.application.port,
    )?;
    let mailer = SmtpMailSender::new(&configuration.mail);
    let (app, _) = create_app(&configuration, mailer)?;

    info!(
        address = %addr,
        relay_host = %configuration.mail.relay_host,
        relay_port = configuration.mail.relay_port,
        "contact form listening"
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("contact form shutting down");
}
