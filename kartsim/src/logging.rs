use log::LevelFilter;
use std::io::Write;

/// try_init installs the global logger used by the simulator binaries. Messages are prefixed with
/// `[KART | LEVEL]`. The level defaults to Info (Debug if `debug` is set) and can be overridden
/// via `RUST_LOG`.
pub fn try_init(debug: bool) -> Result<(), log::SetLoggerError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::builder()
        .format(|buf, record| writeln!(buf, "[KART | {}] {}", record.level(), record.args()))
        .filter_level(level)
        .parse_default_env()
        .try_init()
}
