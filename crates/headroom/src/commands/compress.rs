use super::{print_json, read_input, runtime, Session};
use headroom_core::CompressRequest;

pub fn run(file: Option<&str>) -> anyhow::Result<()> {
    let input = read_input(file)?;
    let request: CompressRequest = serde_json::from_str(&input)?;

    let session = Session::open()?;
    let response = runtime()?.block_on(session.sidecar.compress(request))?;
    session.persist()?;

    print_json(&response)
}
