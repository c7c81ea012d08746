pub mod ast;
pub mod cli;
pub mod error;
pub mod filter;
pub mod format;
pub mod index;
pub mod literals;
pub mod parse;

fn main() {
    let command_line_interface = cli::CommandLineInterface::load();
    if let Err(err) = command_line_interface.run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
