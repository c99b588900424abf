use std::process::ExitCode;

fn main() -> ExitCode {
    timer::run()
}
