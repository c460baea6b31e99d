use tracekit_core::units::BitsPerSec;

/// Parses a bandwidth such as `10G`, `100M`, `5K`, or a plain number of bits per second.
pub fn parse_bandwidth(s: &str) -> Result<BitsPerSec, String> {
    let s = s.trim();
    let (digits, scale) = match s.chars().last() {
        Some('G') => (&s[..s.len() - 1], 1e9),
        Some('M') => (&s[..s.len() - 1], 1e6),
        Some('K') => (&s[..s.len() - 1], 1e3),
        _ => (s, 1.0),
    };
    let value = digits
        .parse::<f64>()
        .map_err(|_| format!("invalid bandwidth: {s:?}"))?;
    let bps = (value * scale).round();
    if !(bps.is_finite() && bps >= 1.0) {
        return Err(format!("bandwidth must be positive: {s:?}"));
    }
    Ok(BitsPerSec::new(bps as u64))
}
