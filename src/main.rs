fn main() {
    if let Err(err) = vrcurate::run() {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
