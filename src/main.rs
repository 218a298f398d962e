//=========================================================================
// Aetheric Flap: Binary
//=========================================================================
//
// Usage:
//   aetheric_flap [ASSET_ROOT]
//
// ASSET_ROOT defaults to `res`. Logging follows `RUST_LOG` (default
// `info`). Exits with status 2 when the game stops on an error.
//
//=========================================================================

use std::process::ExitCode;

use aetheric_flap::EngineBuilder;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut builder = EngineBuilder::new();
    if let Some(root) = std::env::args_os().nth(1) {
        builder = builder.with_assets(root);
    }

    log::info!("Aetheric Flap starting...");

    match builder.build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
