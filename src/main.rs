use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    vibesplit::cli::run().await
}
