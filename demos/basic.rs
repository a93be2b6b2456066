use std::env;
use std::time::Duration;

use fluxlog::{flux_debug, flux_error, flux_info, LoggerBuilder};

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let path = args.get(1).cloned().unwrap_or_else(|| "fluxlog-demo.log".to_string());

    println!("Basic: writing to {path}");

    let logger = LoggerBuilder::new()
        .with_path(&path)
        .with_drain_interval(Duration::from_millis(50))
        .build()?;

    flux_info!(logger, "demo started");
    for i in 0..5 {
        flux_info!(logger, "iteration {} of {}", i, 5);
    }
    flux_debug!(logger, "this line is filtered out at the default INFO threshold");
    flux_error!(logger, "demo finished with {} warnings", 0);

    std::thread::sleep(Duration::from_millis(200));
    println!("Basic: done, see {path}");
    Ok(())
}
