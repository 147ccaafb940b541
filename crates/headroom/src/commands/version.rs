pub fn run() -> anyhow::Result<()> {
    println!("headroom {}", env!("CARGO_PKG_VERSION"));
    println!("Context compression sidecar with content-addressable retrieval");
    Ok(())
}
