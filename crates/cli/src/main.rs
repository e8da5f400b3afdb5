use std::process::ExitCode;

fn main() -> ExitCode {
    catalog_cli::run()
}
