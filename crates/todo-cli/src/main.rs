use std::process::ExitCode;

fn main() -> ExitCode {
    match todo_core::run(std::env::args_os().collect()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("todo: {err:#}");
            ExitCode::FAILURE
        }
    }
}
