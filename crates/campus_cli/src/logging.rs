use std::io::Write;

/// Initialise env_logger; `RUST_LOG` still wins over the default filter.
pub fn init_logging(debug: bool) {
    let filter = if debug { "debug" } else { "warn" };

    let result = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialised");
    }
}
