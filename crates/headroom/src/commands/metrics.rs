use super::{print_json, Session};

/// Metrics live in process memory; a one-shot run reports its own counters
/// plus the number of persisted entries. Use `serve` for cumulative numbers.
pub fn run() -> anyhow::Result<()> {
    let session = Session::open()?;
    print_json(&session.sidecar.metrics())
}
