use mongodb::Client;

/// Build the async MongoDB client. Connections are established lazily, so
/// this succeeds even before the server is reachable.
pub async fn connect(uri: &str) -> mongodb::error::Result<Client> {
    Client::with_uri_str(uri).await
}
