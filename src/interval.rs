use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

use crate::error::{DataError, PeriodizeResult};

pub const SECONDS_PER_DAY: f64 = 24.0 * 60.0 * 60.0;

/// A non-fatal finding about the shape of a timestamp series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Consecutive gaps differ somewhere in the series. The sampling rate
    /// was still derived from the first gap.
    IrregularSampling {
        interval: TimeDelta,
        irregular_steps: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IrregularSampling {
                interval,
                irregular_steps,
            } => write!(
                f,
                "The sampling interval is not consistent ({irregular_steps} irregular steps, \
                 using first interval {interval}). Resample onto a fixed frequency first."
            ),
        }
    }
}

/// Receives diagnostics as they are raised.
///
/// Implemented for any `FnMut(&Diagnostic)`, so a closure pushing into a
/// `Vec` or forwarding to a logger can be passed directly.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: FnMut(&Diagnostic),
{
    fn report(&mut self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Sampling cadence of a timestamp series.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingReport {
    interval: TimeDelta,
    samples_per_day: f64,
    diagnostics: Vec<Diagnostic>,
}

impl SamplingReport {
    /// The gap between the first two timestamps.
    pub fn interval(&self) -> TimeDelta {
        self.interval
    }

    pub fn samples_per_day(&self) -> f64 {
        self.samples_per_day
    }

    /// Annualization factor, e.g. `samples_per_year(252.0)` for trading days.
    pub fn samples_per_year(&self, days_per_year: f64) -> f64 {
        self.samples_per_day * days_per_year
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn is_regular(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Derives the number of samples per day from the first sampling interval.
///
/// Irregular spacing is reported through [`SamplingReport::diagnostics`]
/// and a `warn` event; it never fails the call.
///
/// # Errors
/// [`DataError::DegenerateInterval`] if fewer than two timestamps are given
/// or the first interval is not strictly positive.
pub fn samples_per_day(timestamps: &[DateTime<Utc>]) -> PeriodizeResult<SamplingReport> {
    samples_per_day_with(timestamps, &mut |_: &Diagnostic| {})
}

/// Same as [`samples_per_day`], additionally forwarding each diagnostic to `sink`.
#[tracing::instrument(skip_all, fields(len = timestamps.len()))]
pub fn samples_per_day_with<S>(
    timestamps: &[DateTime<Utc>],
    sink: &mut S,
) -> PeriodizeResult<SamplingReport>
where
    S: DiagnosticSink + ?Sized,
{
    let [first, second, ..] = timestamps else {
        return Err(DataError::DegenerateInterval(format!(
            "need at least 2 timestamps, got {}",
            timestamps.len()
        ))
        .into());
    };

    let interval = *second - *first;
    if interval <= TimeDelta::zero() {
        return Err(DataError::DegenerateInterval(format!(
            "first interval must be positive, got {interval} between {first} and {second}"
        ))
        .into());
    }

    let gaps = timestamps
        .windows(2)
        .map(|w| w[1] - w[0])
        .collect::<Vec<_>>();
    let irregular_steps = gaps.windows(2).filter(|w| w[0] != w[1]).count();

    let mut diagnostics = Vec::new();
    if irregular_steps > 0 {
        let diagnostic = Diagnostic::IrregularSampling {
            interval,
            irregular_steps,
        };
        tracing::warn!(%interval, irregular_steps, "{diagnostic}");
        sink.report(&diagnostic);
        diagnostics.push(diagnostic);
    }

    Ok(SamplingReport {
        interval,
        samples_per_day: SECONDS_PER_DAY / seconds(interval),
        diagnostics,
    })
}

/// Elapsed days between the first and the last timestamp.
///
/// A single timestamp spans zero days.
pub fn total_days(timestamps: &[DateTime<Utc>]) -> PeriodizeResult<f64> {
    match (timestamps.first(), timestamps.last()) {
        (Some(first), Some(last)) => Ok(seconds(*last - *first) / SECONDS_PER_DAY),
        _ => Err(DataError::DegenerateInterval("no timestamps to measure".to_string()).into()),
    }
}

fn seconds(delta: TimeDelta) -> f64 {
    delta.num_seconds() as f64 + f64::from(delta.subsec_nanos()) / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PeriodizeError;
    use chrono::TimeZone;

    fn series(start: DateTime<Utc>, gaps_secs: &[i64]) -> Vec<DateTime<Utc>> {
        let mut out = vec![start];
        for gap in gaps_secs {
            let last = *out.last().expect("Series is never empty");
            out.push(last + TimeDelta::seconds(*gap));
        }
        out
    }

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_uniform_interval() {
        for gap in [1, 60, 300, 3600, 86_400] {
            let ts = series(base(), &[gap; 10]);
            let report = samples_per_day(&ts).expect("Uniform series should succeed");

            assert_eq!(report.samples_per_day(), SECONDS_PER_DAY / gap as f64);
            assert_eq!(report.interval(), TimeDelta::seconds(gap));
            assert!(report.is_regular(), "No diagnostic for gap {gap}");
        }
    }

    #[test]
    fn test_sub_second_interval() {
        let ts = vec![base(), base() + TimeDelta::milliseconds(100)];
        let report = samples_per_day(&ts).expect("Should succeed");
        assert!((report.samples_per_day() - 864_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_irregular_reports_once() {
        let ts = series(base(), &[60, 60, 120, 60, 30, 60, 60]);
        let mut seen = Vec::new();
        let report = samples_per_day_with(&ts, &mut |d: &Diagnostic| seen.push(d.clone()))
            .expect("Irregular series is not fatal");

        assert_eq!(report.samples_per_day(), 1440.0, "Uses the first interval");
        assert_eq!(report.diagnostics().len(), 1);
        assert_eq!(seen.len(), 1);
        assert_eq!(
            seen[0],
            Diagnostic::IrregularSampling {
                interval: TimeDelta::seconds(60),
                irregular_steps: 4,
            }
        );
    }

    #[test]
    fn test_two_timestamps_are_regular() {
        let ts = series(base(), &[45]);
        let report = samples_per_day(&ts).expect("Should succeed");
        assert!(report.is_regular());
        assert_eq!(report.samples_per_year(365.0), 1920.0 * 365.0);
    }

    #[test]
    fn test_degenerate_inputs() {
        let one = vec![base()];
        let dup = vec![base(), base(), base() + TimeDelta::seconds(1)];
        let empty: Vec<DateTime<Utc>> = Vec::new();

        for ts in [&one[..], &dup[..], &empty[..]] {
            let err = samples_per_day(ts).expect_err("Should be degenerate");
            assert!(matches!(
                err,
                PeriodizeError::Data(DataError::DegenerateInterval(_))
            ));
        }
    }

    #[test]
    fn test_total_days() {
        let week = vec![base(), base() + TimeDelta::days(7)];
        assert!((total_days(&week).expect("Should succeed") - 7.0).abs() < 1e-12);

        let hourly = series(base(), &[3600; 36]);
        assert!((total_days(&hourly).expect("Should succeed") - 1.5).abs() < 1e-12);

        assert_eq!(total_days(&[base()]).expect("Single row"), 0.0);
        assert!(total_days(&[]).is_err());
    }
}
