mod apply_cmd;
mod cli;
mod extract_cmd;
mod inspect_cmd;
mod shared;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    shared::init_logging(cli.verbose);
    let mut options = shared::base_options(cli.max_size);

    let result = match cli.command {
        Commands::Extract {
            ref file,
            ref output,
            pretty,
        } => extract_cmd::run(file, output.as_deref(), pretty, options),
        Commands::Apply {
            ref file,
            ref edits,
            ref output,
            ref insertion,
        } => {
            insertion.apply_to(&mut options);
            apply_cmd::run(file, edits, output.as_deref(), options)
        }
        Commands::Inspect { ref file, page } => inspect_cmd::run(file, page, options),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
