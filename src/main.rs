fn main() {
    if let Err(e) = counseldesk_lib::run() {
        eprintln!("counseldesk: {e}");
        std::process::exit(1);
    }
}
