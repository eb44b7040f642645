use anyhow::Result;
use snyk_api::region::regions;

use crate::output::{print_regions, OutputFormat};

pub fn run(format: &OutputFormat) -> Result<()> {
    print_regions(regions(), format)
}
