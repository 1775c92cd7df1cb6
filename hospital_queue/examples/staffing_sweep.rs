//! Sweep the number of doctors for the morning session
//!
//! Runs one independent scenario per staffing level on four worker threads
//! and prints how the waits fall as doctors are added.
//!
//! Run with:
//!   cargo run --example staffing_sweep -p hospital_queue

use hospital_queue::{ArrivalMode, dataset, report, run_server_counts};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let records = dataset::morning_session();
    let server_counts: Vec<usize> = (1..=8).collect();

    let start = std::time::Instant::now();
    match run_server_counts(&records, &server_counts, ArrivalMode::AtArrival, Some(4)) {
        Ok(outcomes) => {
            println!(
                "Completed {} scenarios in {:.3}s\n",
                outcomes.len(),
                start.elapsed().as_secs_f64()
            );
            println!("{}", report::render_comparison(&outcomes));
        }
        Err(err) => eprintln!("sweep failed: {err}"),
    }
}
