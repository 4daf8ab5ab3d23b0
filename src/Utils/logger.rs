use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Start terminal logging at `level`. Calling it again (tests, repeated runs) is harmless: the
/// first logger wins and `false` is returned.
pub fn init_logger(level: LevelFilter) -> bool {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Debug)
        .set_target_level(LevelFilter::Trace)
        .build();
    TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto).is_ok()
}

/// Level named by the `ESTER_PFR_LOG` environment variable, `Info` when absent or unknown
pub fn level_from_env() -> LevelFilter {
    std::env::var("ESTER_PFR_LOG")
        .ok()
        .and_then(|v| v.parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::Info)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        let _ = init_logger(LevelFilter::Warn);
        assert!(!init_logger(LevelFilter::Warn));
    }
}
