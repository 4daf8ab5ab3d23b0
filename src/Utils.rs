/// logger set-up for the binary and for ad-hoc runs
pub mod logger;
