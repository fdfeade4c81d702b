use std::process::ExitCode;

use virus_sim::runner::run_with_args;

fn main() -> ExitCode {
    let summary = run_with_args().and_then(|simulation| {
        let summary = simulation.summary()?;
        Ok(serde_json::to_string_pretty(&summary)?)
    });
    match summary {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("virus-sim: {e}");
            ExitCode::FAILURE
        }
    }
}
