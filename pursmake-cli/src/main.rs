//! Binary entrypoint for pursmake.

fn main() {
    if let Err(err) = pursmake_cli::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
