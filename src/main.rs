use clap::Parser;
use color_eyre::Result;
use participant_transform_sim::{
    init_logging,
    App,
    Args,
    Config,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = Config::new(Args::parse())?;
    init_logging(config.verbose)?;
    App::new(config).run().await
}
