// File: crates/slotbook_gcal/src/auth.rs
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{
        read_application_secret, read_service_account_key, InstalledFlowAuthenticator,
        InstalledFlowReturnMethod, ServiceAccountAuthenticator,
    },
    CalendarHub,
};
use slotbook_config::{CredentialSource, GcalConfig};
use std::{error::Error, path::Path};
use tracing::info;

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

fn https_connector() -> Result<Connector, Box<dyn Error + Send + Sync>> {
    Ok(HttpsConnectorBuilder::new()
        .with_native_roots()?
        .https_or_http()
        .enable_http1()
        .build())
}

/// Builds an authenticated calendar client from the configured credentials.
///
/// A service account needs `key_path`. The installed-app flow needs
/// `client_secret_path`; it prompts once on the console and caches the
/// refresh token at `token_path`.
pub async fn create_calendar_hub(
    config: &GcalConfig,
) -> Result<HubType, Box<dyn Error + Send + Sync>> {
    let hub = match config.credentials {
        CredentialSource::ServiceAccount => {
            let key_path = config
                .key_path
                .as_deref()
                .ok_or("Missing key_path in GcalConfig")?;
            let sa_key = read_service_account_key(Path::new(key_path)).await?;
            let auth = ServiceAccountAuthenticator::builder(sa_key).build().await?;
            info!("Authenticated with service account key {}", key_path);
            CalendarHub::new(
                Client::builder(hyper_util::rt::TokioExecutor::new()).build(https_connector()?),
                auth,
            )
        }
        CredentialSource::Installed => {
            let secret_path = config
                .client_secret_path
                .as_deref()
                .ok_or("Missing client_secret_path in GcalConfig")?;
            let secret = read_application_secret(Path::new(secret_path)).await?;
            let auth =
                InstalledFlowAuthenticator::builder(secret, InstalledFlowReturnMethod::Interactive)
                    .persist_tokens_to_disk(&config.token_path)
                    .build()
                    .await?;
            info!(
                "Authenticated with installed-app credentials, tokens cached at {}",
                config.token_path
            );
            CalendarHub::new(
                Client::builder(hyper_util::rt::TokioExecutor::new()).build(https_connector()?),
                auth,
            )
        }
    };

    Ok(hub)
}
