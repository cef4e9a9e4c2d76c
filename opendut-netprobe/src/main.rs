use std::process::ExitCode;

use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(cause) = opendut_util::logging::initialize() {
        eprintln!("{cause}");
        return ExitCode::FAILURE;
    }

    match opendut_netprobe::run().await {
        Ok(summary) => {
            let findings = summary.findings().count();
            if findings == 0 {
                info!("Probe finished without findings.");
            } else {
                warn!("Probe finished with {findings} finding(s).");
            }
            ExitCode::SUCCESS
        }
        Err(cause) => {
            error!("{cause}");
            ExitCode::FAILURE
        }
    }
}
