use std::process::ExitCode;

fn main() -> ExitCode {
    match vaultlint::cli::run() {
        Ok(code) => ExitCode::from(code as u8),
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(vaultlint::cli::EXIT_ABORTED as u8)
        }
    }
}
