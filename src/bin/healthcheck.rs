//! Liveness check
//!
//! Requests `/health` from the local server and exits 0 on HTTP 200, 1 otherwise.

use http_body_util::Empty;
use hyper::body::Bytes;
use hyper::StatusCode;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::process::ExitCode;
use std::time::Duration;

use versions_cdn::config::Config;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PORT: u16 = 80;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let port = Config::load().map_or(DEFAULT_PORT, |cfg| cfg.server.port);
    let url = format!("http://localhost:{port}/health");

    match check_health(&url).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("[healthcheck] {url}: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn check_health(url: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let uri: hyper::Uri = url.parse()?;
    let client = Client::builder(TokioExecutor::new()).build_http::<Empty<Bytes>>();
    let response = tokio::time::timeout(CHECK_TIMEOUT, client.get(uri)).await??;
    Ok(response.status() == StatusCode::OK)
}
