//! Log subscriber setup.
//!
//! `LOG_LEVEL` holds `EnvFilter` directives; when it is unset or unparsable the
//! crate's targets (`devskill_backend`, `session`, `quest`, `detection`) log at
//! debug and everything else at info. `LOG_FORMAT=json` switches to one JSON
//! object per line for log shippers; any other value keeps the human format.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str =
    "info,devskill_backend=debug,session=debug,quest=debug,detection=debug,tower_http=info,axum=info";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Directives from `LOG_LEVEL` if they parse, else the crate default.
fn build_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

pub fn init_tracing() {
    let directives = std::env::var("LOG_LEVEL").ok();
    let format = LogFormat::from_env_value(std::env::var("LOG_FORMAT").ok().as_deref());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(directives.as_deref()))
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
    tracing::debug!(target: "devskill_backend", ?format, "Tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_pretty() {
        assert_eq!(LogFormat::from_env_value(None), LogFormat::Pretty);
        assert_eq!(LogFormat::from_env_value(Some("text")), LogFormat::Pretty);
        assert_eq!(LogFormat::from_env_value(Some(" JSON ")), LogFormat::Json);
    }

    #[test]
    fn bad_or_empty_directives_fall_back_to_default() {
        assert_eq!(build_filter(None).to_string(), EnvFilter::new(DEFAULT_FILTER).to_string());
        assert_eq!(build_filter(Some("  ")).to_string(), EnvFilter::new(DEFAULT_FILTER).to_string());
        assert_eq!(build_filter(Some("detection=loudest")).to_string(), EnvFilter::new(DEFAULT_FILTER).to_string());
        assert_eq!(build_filter(Some("warn")).to_string(), EnvFilter::new("warn").to_string());
        assert_ne!(build_filter(Some("warn")).to_string(), EnvFilter::new(DEFAULT_FILTER).to_string());
    }
}
