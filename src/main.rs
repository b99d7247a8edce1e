fn main() {
    if let Err(e) = ionbalance::adapters::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
