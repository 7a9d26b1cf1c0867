// Thin binary entry; everything lives in the library crate
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = shakeplay_lib::run() {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}
