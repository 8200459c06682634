//! `generate` command.

use anyhow::Context;
use testdata_generator::{build_generator, Domain};
use testdata_populate::{PopulateArgs, PopulateMetrics, Populator};

/// Generate one domain's test data into the output directory.
pub fn run_generate(domain: Domain, args: &PopulateArgs) -> anyhow::Result<PopulateMetrics> {
    let options = args
        .to_options()
        .context("Failed to prepare generator options")?;
    let generator = build_generator(domain, &options)
        .with_context(|| format!("Failed to configure the '{domain}' generator"))?;

    let metrics = Populator::new(generator, &args.output_dir)
        .with_clean(args.clean)
        .populate()
        .with_context(|| {
            format!(
                "Failed to write '{domain}' test data to {:?}",
                args.output_dir
            )
        })?;
    Ok(metrics)
}
