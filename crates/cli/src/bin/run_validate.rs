//! `run-validate`: dispatch the validate task over every project of the workspace

use sweep_core::TaskKind;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let code = sweep_cli::run_entry_point(TaskKind::Validate).await?;
    std::process::exit(code)
}
