fn main() {
    if let Err(err) = leave_normalizer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
