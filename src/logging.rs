//! Process-wide logger setup, done once from `main`.

use env_logger::{Builder, Env};
use log::{Level, Record};
use std::io::Write;

/// Install the global logger.
///
/// `debug` lowers the default filter to `debug` and prefixes every line with
/// its level and target. `RUST_LOG` still takes precedence.
pub fn init(debug: bool) {
    let default_filter = if debug { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(move |buf, record| {
            let style = if record.level() <= Level::Warn {
                buf.default_level_style(record.level())
            } else {
                Default::default()
            };
            writeln!(buf, "{style}{}{style:#}", format_line(record, debug))
        })
        .init();
}

fn format_line(record: &Record, debug: bool) -> String {
    if debug {
        format!("{}:{}: {}", record.level(), record.target(), record.args())
    } else {
        record.args().to_string()
    }
}
