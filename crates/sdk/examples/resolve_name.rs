use namereg_sdk::{init_logging, NameService, SdkConfig};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("NAMEREG_CONFIG").ok().map(PathBuf::from);
    let config = SdkConfig::load(config_path.as_deref())?;
    init_logging(&config)?;

    let name = std::env::args().nth(1).unwrap_or_else(|| "bar.eth".to_string());
    let service = NameService::connect(&config)?;

    let owner = service.registry().owner(&name).await?;
    let resolver = service.registry().resolver(&name).await?;
    println!("{name}: owner {owner}, resolver {resolver}");

    match service.resolver().addr(&name).await {
        Ok(addr) => println!("{name}: addr {addr}"),
        Err(err) => println!("{name}: no address record ({err})"),
    }

    Ok(())
}
