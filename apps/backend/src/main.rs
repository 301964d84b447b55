#[tokio::main]
async fn main() -> anyhow::Result<()> {
    manabu_backend::run().await
}
