//! claw - run `law` inside the configured sandbox
//!
//! Thin binary entry point. No flags are interpreted here; every argument is
//! handed to the sandbox launcher.

use std::ffi::OsString;
use std::process::ExitCode;

use claw_config::EnvSnapshot;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let env = EnvSnapshot::capture();

    let args: Vec<OsString> = std::env::args_os().skip(1).collect();

    match claw::run(args, &env).await {
        Ok(code) => u8::try_from(code).map_or(ExitCode::FAILURE, ExitCode::from),
        Err(err) => {
            let code = err.exit_code();
            eprintln!("claw: {:#}", anyhow::Error::from(err));
            ExitCode::from(code)
        }
    }
}
