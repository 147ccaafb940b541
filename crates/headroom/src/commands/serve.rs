use super::{runtime, Session};
use headroom_compress::{
    AnalyzeRequest, CompressError, RetrieveRequest, Sidecar, TextCompressRequest, TrackRequest,
};
use headroom_core::CompressRequest;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

/// One line of input in serve mode
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum SidecarRequest {
    Compress(CompressRequest),
    Retrieve(RetrieveRequest),
    Analyze(AnalyzeRequest),
    Track(TrackRequest),
    Health,
    Metrics,
    CompressText(TextCompressRequest),
}

pub fn run() -> anyhow::Result<()> {
    let session = Session::open()?;
    let rt = runtime()?;
    tracing::info!(
        pipeline = session.sidecar.pipeline_loaded(),
        entries = session.sidecar.store().len(),
        "headroom sidecar serving on stdio"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let response = rt.block_on(handle_line(&session.sidecar, &line));
        writeln!(stdout, "{}", serde_json::to_string(&response)?)?;
        stdout.flush()?;
    }

    session.persist()?;
    tracing::info!("stdin closed, sidecar stopped");
    Ok(())
}

async fn handle_line(sidecar: &Sidecar, line: &str) -> Value {
    let request: SidecarRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "invalid request line");
            return json!({"error": e.to_string(), "kind": "invalid_request"});
        }
    };

    match dispatch(sidecar, request).await {
        Ok(value) => value,
        Err(e) => json!({"error": e.to_string(), "kind": e.kind()}),
    }
}

async fn dispatch(sidecar: &Sidecar, request: SidecarRequest) -> Result<Value, CompressError> {
    let value = match request {
        SidecarRequest::Compress(req) => serde_json::to_value(sidecar.compress(req).await?)?,
        SidecarRequest::Retrieve(req) => serde_json::to_value(sidecar.retrieve(&req))?,
        SidecarRequest::Analyze(req) => serde_json::to_value(sidecar.analyze(&req)?)?,
        SidecarRequest::Track(req) => serde_json::to_value(sidecar.track(&req))?,
        SidecarRequest::Health => serde_json::to_value(sidecar.health())?,
        SidecarRequest::Metrics => serde_json::to_value(sidecar.metrics())?,
        SidecarRequest::CompressText(req) => {
            serde_json::to_value(sidecar.compress_text(&req).await?)?
        }
    };
    Ok(value)
}
