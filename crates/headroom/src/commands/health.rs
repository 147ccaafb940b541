use super::{print_json, Session};

pub fn run() -> anyhow::Result<()> {
    let session = Session::open()?;
    let report = session.sidecar.health();
    // health sweeps expired entries; keep the snapshot in step
    session.persist()?;
    print_json(&report)
}
