use anyhow::Result;
use jsonshard::JsonPartitioner;

const DATA_GLOB: &str = "./data/*.json";
const QUERY: &str = "$[*]";

fn main() -> Result<()> {
    let hw = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(8);

    let driver = JsonPartitioner::new()
        .filepath(DATA_GLOB)
        .query(QUERY)
        .parallelism(hw)
        .file_concurrency(hw)
        .progress(true)
        .progress_label("Scanning buckets");

    let parts = driver.partition_full()?;

    println!("{} partitions:", parts.len());
    for p in &parts {
        println!(
            "#{:<4} {} [{}..{}) level={} state={} init={:?}",
            p.id,
            p.path.display(),
            p.start,
            p.end,
            p.start_level,
            p.dfa_state,
            p.initial_state
        );
    }
    Ok(())
}
