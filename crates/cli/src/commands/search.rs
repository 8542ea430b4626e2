use anyhow::{Context, Result};

use homescout_agent::{HomeSearchArgs, HomeSearchTool};
use homescout_harvest::HarvestClient;

use super::{init_logging, load_config};
use crate::SearchArgs;

/// One-shot search that drives the tool pipeline directly, bypassing the LLM.
/// Unlike chat turns, failures here propagate as ordinary errors.
pub async fn run(args: SearchArgs) -> Result<()> {
    let mut config = load_config(&args.global).context("could not load configuration")?;
    if let Some(limit) = args.limit {
        config.search.max_results = limit;
    }
    if args.export {
        config.export.enabled = true;
    }
    config.validate().context("invalid effective configuration")?;
    init_logging(&config);

    let source = HarvestClient::new(&config.search.source_base_url, config.search.timeout_secs)
        .context("could not build property source client")?;
    let tool = HomeSearchTool::new(source, config.search.clone(), config.export.clone());

    let digest = tool
        .run(HomeSearchArgs {
            location: args.location,
            listing_type: args.listing_type,
            radius: args.radius,
            min_price: args.min_price,
            max_price: args.max_price,
            min_beds: args.min_beds,
            min_baths: args.min_baths,
        })
        .await
        .context("listing search failed")?;

    if digest.is_empty() {
        println!("No listings matched.");
    } else {
        println!("{digest}");
    }
    Ok(())
}
