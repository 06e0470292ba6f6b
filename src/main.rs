fn main() {
    if let Err(e) = denomfix::cli::run() {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}
