use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fluxlog::{flux_info, LoggerBuilder};

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let num_threads: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(4);
    let messages_per_thread: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(1000);
    let path = args.get(3).cloned().unwrap_or_else(|| "fluxlog-demo-mt.log".to_string());

    println!(
        "MultiThread: {num_threads} producers x {messages_per_thread} messages -> {path}"
    );

    let logger = Arc::new(
        LoggerBuilder::new()
            .with_path(&path)
            .with_drain_interval(Duration::from_millis(50))
            .build()?,
    );

    let start = std::time::Instant::now();
    let workers: Vec<_> = (0..num_threads)
        .map(|id| {
            let logger = Arc::clone(&logger);
            thread::spawn(move || {
                for i in 0..messages_per_thread {
                    flux_info!(logger, "thread-{} msg {}", id, i);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("producer thread panicked");
    }
    let elapsed = start.elapsed();

    let total = num_threads * messages_per_thread;
    println!("MultiThread: enqueued {total} messages in {elapsed:.2?}");
    println!(
        "MultiThread: throughput {:.2} messages/sec",
        total as f64 / elapsed.as_secs_f64()
    );

    // Give the background drain thread time to catch up before we exit.
    std::thread::sleep(Duration::from_millis(300));
    println!("MultiThread: done, see {path}");
    Ok(())
}
