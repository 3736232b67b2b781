fn main() -> std::process::ExitCode {
    match relief::cli::run_relief(std::env::args()) {
        Ok(_) => std::process::ExitCode::SUCCESS,
        Err(_) => std::process::ExitCode::FAILURE,
    }
}
