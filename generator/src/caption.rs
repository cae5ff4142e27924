use anyhow::Context;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;

pub fn parse_zone(name: &str) -> anyhow::Result<Tz> {
    name.parse::<Tz>()
        .map_err(|e| anyhow::anyhow!("unknown time zone {:?}: {}", name, e))
}

/// Panel caption: snapshot time in local wall-clock time plus the
/// forecast lead, e.g. `2024-10-09 13:00:00 + 10 mins forecast`.
pub fn forecast_caption(precip_ts: i64, minutes: u32, zone: Tz) -> anyhow::Result<String> {
    let utc = DateTime::<Utc>::from_timestamp(precip_ts, 0)
        .with_context(|| format!("timestamp {} out of range", precip_ts))?;
    let local = utc.with_timezone(&zone);
    Ok(format!("{} + {} mins forecast", local.format("%Y-%m-%d %H:%M:%S"), minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn london_summer_time() {
        let zone = parse_zone("Europe/London").unwrap();
        assert_eq!(
            forecast_caption(1_728_475_200, 10, zone).unwrap(),
            "2024-10-09 13:00:00 + 10 mins forecast"
        );
    }

    #[test]
    fn london_winter_time() {
        let zone = parse_zone("Europe/London").unwrap();
        assert_eq!(
            forecast_caption(1_736_942_400, 30, zone).unwrap(),
            "2025-01-15 12:00:00 + 30 mins forecast"
        );
    }

    #[test]
    fn other_zone() {
        let zone = parse_zone("America/New_York").unwrap();
        assert_eq!(
            forecast_caption(1_736_942_400, 10, zone).unwrap(),
            "2025-01-15 07:00:00 + 10 mins forecast"
        );
    }

    #[test]
    fn bad_zone_and_timestamp() {
        assert!(parse_zone("Mars/Olympus").is_err());
        assert!(forecast_caption(i64::MAX, 10, Tz::UTC).is_err());
    }
}
