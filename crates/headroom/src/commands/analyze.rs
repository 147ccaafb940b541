use super::{print_json, Session};
use headroom_compress::AnalyzeRequest;

pub fn run(query: String, turn_number: u32) -> anyhow::Result<()> {
    let session = Session::open()?;
    let response = session.sidecar.analyze(&AnalyzeRequest { query, turn_number })?;
    print_json(&response)
}
