//! Log output setup.

use tracing_subscriber::{fmt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor an explicit filter is usable.
pub const DEFAULT_FILTER: &str = "qtriage_core=info,qtriage_llm=info";

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise `filter` (`EnvFilter` directives) is
/// used, then [`DEFAULT_FILTER`]. Returns `false` if a subscriber was
/// already installed, which is harmless when a host calls this more than
/// once.
pub fn init(filter: Option<&str>) -> bool {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::new(select_directives(env.as_deref(), filter));

    fmt().with_env_filter(filter).with_target(true).try_init().is_ok()
}

/// First parseable directive string, in order of precedence.
fn select_directives<'a>(env: Option<&'a str>, explicit: Option<&'a str>) -> &'a str {
    [env, explicit]
        .into_iter()
        .flatten()
        .filter(|directives| !directives.trim().is_empty())
        .find(|directives| EnvFilter::try_new(directives).is_ok())
        .unwrap_or(DEFAULT_FILTER)
}
