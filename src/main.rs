use std::process;

use clap::Parser;

use csvpart::Arguments;

fn main() {
    env_logger::init();
    let args = Arguments::parse();

    match csvpart::run(args) {
        Ok(summary) => {
            println!(
                "done: {} file(s) created (output dir: {})",
                summary.files_created,
                summary.outdir.display()
            );
        }
        Err(e) => {
            eprintln!("Application error: {e}");
            process::exit(1)
        }
    }
}
