use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    homescout_cli::run().await
}
