#[tokio::main]
async fn main() {
    if let Err(err) = tr_api::run().await {
        tracing::error!(error = %err, "tr-api failed");
        std::process::exit(1);
    }
}
