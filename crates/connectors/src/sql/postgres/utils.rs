use crate::sql::base::error::ConnectorError;
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_postgres::{Client, Config, Connection, NoTls, config::SslMode};
use tracing::{debug, error, warn};

/// Opens the remote store connection, honouring the URL's `sslmode`
/// (`prefer` tries TLS first and retries in plain text).
pub(crate) async fn connect_client(url: &str) -> Result<Client, ConnectorError> {
    let config = url
        .parse::<Config>()
        .map_err(|e| ConnectorError::InvalidUrl(e.to_string()))?;

    match config.get_ssl_mode() {
        SslMode::Disable => connect_without_tls(&config).await,
        SslMode::Prefer => match connect_with_tls(&config).await {
            Ok(client) => Ok(client),
            Err(error) => {
                warn!(%error, "Remote store TLS handshake failed, retrying without TLS");
                connect_without_tls(&config).await
            }
        },
        _ => connect_with_tls(&config).await,
    }
}

async fn connect_with_tls(config: &Config) -> Result<Client, ConnectorError> {
    let tls = MakeTlsConnector::new(TlsConnector::builder().build()?);
    let (client, connection) = config.connect(tls).await?;
    debug!("Remote store connected over TLS");
    spawn_driver(connection);
    Ok(client)
}

async fn connect_without_tls(config: &Config) -> Result<Client, ConnectorError> {
    let (client, connection) = config.connect(NoTls).await?;
    debug!("Remote store connected without TLS");
    spawn_driver(connection);
    Ok(client)
}

/// Drives the connection until the client is dropped or the server goes away.
fn spawn_driver<S, T>(connection: Connection<S, T>)
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = connection.await {
            error!(%err, "Remote store connection to Postgres lost");
        }
    });
}
