use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

/// Ordered from silent to most detailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            2 => Self::Debug,
            _ => Self::Trace,
        }
    }

    fn to_level(self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Debug => Level::DEBUG,
            Self::Trace => Level::TRACE,
        }
    }

    fn to_filter(self) -> String {
        let level = self.to_level();
        format!("transpile_parity={level}")
    }
}

/// Installs the global subscriber. Logs go to stderr; stdout is reserved
/// for the report. `RUST_LOG` takes precedence over the flags.
pub fn init(verbosity: Verbosity) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.to_filter()));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(verbosity >= Verbosity::Trace)
        .with_file(verbosity >= Verbosity::Debug)
        .with_line_number(verbosity >= Verbosity::Debug)
        .compact();

    let installed = match verbosity {
        Verbosity::Quiet => subscriber.with_writer(std::io::sink).try_init(),
        Verbosity::Normal => subscriber
            .with_writer(std::io::stderr)
            .without_time()
            .try_init(),
        _ => subscriber.with_writer(std::io::stderr).try_init(),
    };
    if installed.is_err() {
        tracing::debug!("global subscriber already installed");
    }
}
