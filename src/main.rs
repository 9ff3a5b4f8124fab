fn main() {
    if let Err(e) = circlegen::run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
