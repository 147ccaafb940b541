use super::{print_json, Session};
use headroom_compress::RetrieveRequest;

pub fn run(hash: String, query: Option<String>, max_results: usize) -> anyhow::Result<()> {
    let session = Session::open()?;
    let response = session.sidecar.retrieve(&RetrieveRequest {
        hash,
        query,
        max_results,
    });
    print_json(&response)
}
