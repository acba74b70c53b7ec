use anyhow::Result;
use logsift::{report, Aggregator};

/// Takes in one or more CSV reports written by the main program (bin.rs)
fn main() -> Result<()> {
    env_logger::init();
    let mut aggregator = Aggregator::new();
    for path in std::env::args().skip(1) {
        report::read_csv_report(&path, &mut aggregator)?;
    }
    let table = aggregator.into_table();
    let mut results: Vec<_> = table.iter().collect();
    // Stable sort, so ties keep first-seen order
    results.sort_by(|(_, a), (_, b)| b.cmp(a));
    for (signature, count) in &results {
        println!("{:>8}  {}", count, signature.headline());
    }
    println!("Total: {} occurrences of {} distinct errors.", table.total(), table.len());
    Ok(())
}
