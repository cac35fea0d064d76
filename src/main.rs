// src/main.rs

use testwatch::{cli, logging, run};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("testwatch error: {err:?}");
        std::process::exit(1);
    }

    if let Err(err) = run(args).await {
        eprintln!("testwatch error: {err}");
        let code = if err.is_usage_error() { 2 } else { 1 };
        std::process::exit(code);
    }
}
