// TTML clock and offset time expressions
use crate::error::{PodvttError, Result};
use std::time::Duration;
use tracing::warn;

/// First millisecond count that no longer fits in a `u64`.
const MAX_MILLIS: f64 = u64::MAX as f64;

/// Parse a time expression, falling back to zero when it is not recognized.
///
/// Missing or blank expressions are zero without a warning.
pub fn parse_time(expr: Option<&str>) -> Duration {
    let Some(expr) = expr else {
        return Duration::ZERO;
    };

    match try_parse_time(expr) {
        Ok(d) => d,
        Err(e) => {
            warn!("{}, using 00:00:00.000", e);
            Duration::ZERO
        }
    }
}

/// Parse a time expression into a millisecond-precision duration.
///
/// Accepted shapes:
/// - `H:MM:SS[.fff]` - hours, minutes and seconds
/// - `M:SS[.fff]` - minutes and seconds
/// - `S[.fff]` or `S[.fff]s` - plain seconds
///
/// Components are summed as given; `0:90` is 90 seconds.
pub fn try_parse_time(expr: &str) -> Result<Duration> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Ok(Duration::ZERO);
    }

    let parts: Vec<&str> = expr.split(':').collect();
    let seconds = match parts.as_slice() {
        [h, m, s] => {
            component(h, expr)? * 3600.0 + component(m, expr)? * 60.0 + component(s, expr)?
        }
        [m, s] => component(m, expr)? * 60.0 + component(s, expr)?,
        [single] => {
            let bare = single.strip_suffix('s').unwrap_or(*single);
            component(bare, expr)?
        }
        _ => return Err(PodvttError::TimeFormat(expr.to_string())),
    };

    let millis = (seconds * 1000.0).round();
    if millis >= MAX_MILLIS {
        return Err(PodvttError::TimeFormat(expr.to_string()));
    }

    Ok(Duration::from_millis(millis as u64))
}

fn component(part: &str, expr: &str) -> Result<f64> {
    let value: f64 = part
        .trim()
        .parse()
        .map_err(|_| PodvttError::TimeFormat(expr.to_string()))?;

    if !value.is_finite() || value < 0.0 {
        return Err(PodvttError::TimeFormat(expr.to_string()));
    }
    Ok(value)
}
