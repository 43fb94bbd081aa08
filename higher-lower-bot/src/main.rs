#[tokio::main]
async fn main() -> anyhow::Result<()> {
    higher_lower_bot::slack_main::main().await
}
