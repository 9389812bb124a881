use anyhow::Result;
use silverprice_localize::Config;
use silverprice_localize::pipeline::run;

fn main() -> Result<()> {
    let config = Config::from_cli()?;
    run(&config)?;
    Ok(())
}
