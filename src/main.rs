#[tokio::main]
async fn main() -> anyhow::Result<()> {
    selfheal_cli::cli::run().await
}
