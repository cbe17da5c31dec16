// ── Counter → rate conversion ──

use chrono::{DateTime, Utc};
use thiserror::Error;

use flowatch_snmp::CounterSample;

/// Why a pair of counter samples produced no rate.
///
/// Both cases are routine for the poller: the sample is skipped and the
/// current counters become the new baseline. IF-MIB 64-bit counters only
/// go backwards when the device re-initializes, so a negative delta means
/// "baseline restart", not arithmetic to be guessed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RateError {
    #[error("counter wrap detected")]
    CounterWrap,

    #[error("zero or negative elapsed time")]
    InvalidInterval,
}

/// Bits-per-second in each direction at a point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    pub timestamp: DateTime<Utc>,
    pub in_bps: f64,
    pub out_bps: f64,
}

/// Compute the bit rate between two counter samples.
pub fn rate(prev: &CounterSample, curr: &CounterSample) -> Result<RateSample, RateError> {
    let elapsed = (curr.timestamp - prev.timestamp).num_milliseconds() as f64 / 1000.0;
    if elapsed <= 0.0 {
        return Err(RateError::InvalidInterval);
    }

    if curr.in_octets < prev.in_octets || curr.out_octets < prev.out_octets {
        return Err(RateError::CounterWrap);
    }

    let delta_in = curr.in_octets - prev.in_octets;
    let delta_out = curr.out_octets - prev.out_octets;

    Ok(RateSample {
        timestamp: curr.timestamp,
        in_bps: delta_in as f64 * 8.0 / elapsed,
        out_bps: delta_out as f64 * 8.0 / elapsed,
    })
}

/// Utilization percentage of the busier direction against the interface
/// speed in Mbps. Unknown speed (0) reports 0.
pub fn utilization(in_bps: f64, out_bps: f64, speed_mbps: u64) -> f64 {
    if speed_mbps == 0 {
        return 0.0;
    }
    in_bps.max(out_bps) / (speed_mbps as f64 * 1_000_000.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(secs: i64, in_octets: u64, out_octets: u64) -> CounterSample {
        CounterSample {
            in_octets,
            out_octets,
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
        }
    }

    #[test]
    fn computes_bits_per_second() {
        let prev = sample(0, 1000, 500);
        let curr = sample(10, 2000, 1500);

        let r = rate(&prev, &curr).unwrap();
        assert_eq!(r.in_bps, 800.0);
        assert_eq!(r.out_bps, 800.0);
        assert_eq!(r.timestamp, curr.timestamp);
    }

    #[test]
    fn wrap_on_either_counter() {
        let prev = sample(0, 100, 50);
        assert_eq!(
            rate(&prev, &sample(10, 50, 50)),
            Err(RateError::CounterWrap)
        );
        assert_eq!(
            rate(&prev, &sample(10, 150, 10)),
            Err(RateError::CounterWrap)
        );
    }

    #[test]
    fn non_positive_elapsed_rejected() {
        let prev = sample(10, 100, 100);
        assert_eq!(
            rate(&prev, &sample(10, 200, 200)),
            Err(RateError::InvalidInterval)
        );
        assert_eq!(
            rate(&prev, &sample(5, 200, 200)),
            Err(RateError::InvalidInterval)
        );
    }

    #[test]
    fn sub_second_intervals_use_millisecond_precision() {
        let prev = CounterSample {
            in_octets: 0,
            out_octets: 0,
            timestamp: Utc.timestamp_opt(0, 0).unwrap(),
        };
        let curr = CounterSample {
            in_octets: 100,
            out_octets: 0,
            timestamp: Utc.timestamp_opt(0, 500_000_000).unwrap(),
        };
        let r = rate(&prev, &curr).unwrap();
        assert_eq!(r.in_bps, 1600.0);
    }

    #[test]
    fn utilization_uses_busier_direction() {
        let util = utilization(500_000_000.0, 300_000_000.0, 1000);
        assert!((util - 50.0).abs() < 0.01);

        let util = utilization(100_000_000.0, 900_000_000.0, 1000);
        assert!((util - 90.0).abs() < 0.01);
    }

    #[test]
    fn utilization_of_unknown_speed_is_zero() {
        assert_eq!(utilization(1_000_000.0, 2_000_000.0, 0), 0.0);
    }
}
