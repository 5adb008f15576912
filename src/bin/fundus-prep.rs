//! Fundus preprocessing CLI tool
//!
//! Enhances and background-removes every image of a SUBSET/CLASS dataset
//! tree, writing transparent PNGs and a CSV report.

use fundus_prep::cli;

fn main() -> anyhow::Result<()> {
    cli::main()
}
