#![forbid(unsafe_code)]

//! ndv demo binary entry point.

use std::process;

use ndv_demo::{cli, logging, scenario};

fn main() {
    let opts = cli::Opts::parse();
    logging::init(&opts.log_level);

    let model = match scenario::run_scenario(|line: String| println!("{line}")) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Scenario failed: {e}");
            process::exit(1);
        }
    };

    if opts.dump_json {
        match serde_json::to_string_pretty(&model) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Failed to serialize model: {e}");
                process::exit(1);
            }
        }
    }
}
