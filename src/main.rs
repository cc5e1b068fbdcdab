use std::process;

fn main() {
    if let Err(e) = sayonce::cli::main() {
        eprintln!("❌ Error: {e}");
        process::exit(1);
    }
}
