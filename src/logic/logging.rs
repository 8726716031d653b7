//! Logging Setup
//!
//! `env_logger` behind the `log` facade. Every line goes to stderr and, when
//! configured, is appended to the log file as well. Default level is `warn`;
//! `RUST_LOG` overrides it.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use chrono::Local;
use env_logger::{Env, Target};

/// Writer that duplicates output to stderr and an optional file
pub struct Tee {
    file: Option<File>,
}

impl Tee {
    pub fn new(file: Option<File>) -> Self {
        Self { file }
    }
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            // the console copy already went out; a full disk must not stop logging
            let _ = file.write_all(buf);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            let _ = file.flush();
        }
        Ok(())
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global logger. Safe to call more than once.
pub fn init(log_file: Option<&Path>) {
    let file = log_file.and_then(|path| match open_log_file(path) {
        Ok(f) => Some(f),
        Err(e) => {
            eprintln!("Cannot open log file {}: {}", path.display(), e);
            None
        }
    });

    let result = env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .target(Target::Pipe(Box::new(Tee::new(file))))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - 🛡️ FORTRESS - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        log::debug!("Logger already initialised");
    }
}
