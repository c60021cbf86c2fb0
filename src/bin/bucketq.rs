//! Inspect and edit nested buckets in a single-file embedded key-value store.

mod cli;

use std::io;

fn main() {
    bucketq::logging::init_logging();

    let args = std::env::args_os().map(|arg| arg.to_string_lossy().into_owned());
    let stdout = io::stdout();
    let stderr = io::stderr();
    let code = cli::run(args, &mut stdout.lock(), &mut stderr.lock());

    std::process::exit(code);
}
