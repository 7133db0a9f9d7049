use colored::Colorize;

fn main() {
    if let Err(e) = recordview::app::run_cli() {
        eprintln!("{} {}", "error:".bold().red(), e);
        std::process::exit(1);
    }
}
