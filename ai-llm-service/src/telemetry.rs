use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefixes of the workspace crates rendered by [`layer`].
pub const TARGET_PREFIXES: &[&str] = &[
    "ai_llm_service",
    "herb_knowledge",
    "diagnostic_engine",
    "herbal_chain",
    "herbal_diagnosis_backend",
];

/// RFC3339 UTC timer implemented via `chrono`.
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        // Keep timestamps compact: no fractional seconds, Z-suffix
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

fn is_workspace_target(target: &str) -> bool {
    TARGET_PREFIXES.iter().any(|p| target.starts_with(p))
}

/// Build a formatting layer that renders ONLY events emitted by the workspace crates.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format
/// - `file:line` and target (module path)
/// - Span close events (duration at the end of spans)
/// - ANSI colors only when stderr is a terminal
///
/// Output goes to stderr so stdout stays free for JSON responses.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stderr().is_terminal();

    let only_workspace = filter::filter_fn(|meta| is_workspace_target(meta.target()));

    fmt::layer()
        .with_writer(io::stderr)
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        // Log span close to get durations for instrumented functions
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

/// Level directives for every workspace crate, e.g. `herbal_chain=debug`.
pub fn level_directives(level: Level) -> Vec<Directive> {
    let lvl = level.as_str().to_lowercase();
    TARGET_PREFIXES
        .iter()
        .filter_map(|p| Directive::from_str(&format!("{p}={lvl}")).ok())
        .collect()
}

/// Create an EnvFilter from `RUST_LOG` or the fallback `default`, then apply
/// a per-crate level directive for the workspace crates.
///
/// With `default = "warn"` and `level = Level::INFO`, third-party crates log at
/// WARN while workspace crates log at INFO.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    level_directives(level)
        .into_iter()
        .fold(base, |f, d| f.add_directive(d))
}
