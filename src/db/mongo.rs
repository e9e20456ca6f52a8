use mongodb::{
    error::Error,
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client,
};
use std::sync::Arc;
use std::time::Duration;

pub async fn create_mongo_client(uri: &str) -> Result<Arc<Client>, Error> {
    log::info!("Connecting to MongoDB");

    let mut client_options = ClientOptions::parse(uri).await?;

    client_options.connect_timeout = Some(Duration::from_secs(10));
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    client_options.max_pool_size = Some(10);
    client_options.min_pool_size = Some(1);

    let server_api = ServerApi::builder().version(ServerApiVersion::V1).build();
    client_options.server_api = Some(server_api);

    let client = Client::with_options(client_options)?;

    // Ping failure is logged, not fatal
    match client
        .database("admin")
        .run_command(mongodb::bson::doc! {"ping": 1})
        .await
    {
        Ok(_) => log::info!("Connected to MongoDB and verified with ping"),
        Err(e) => log::warn!("Connected to MongoDB but ping failed: {}", e),
    }

    Ok(Arc::new(client))
}
