use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};

/// Canonical on-disk timestamp format: "2025-01-15T09:30:00.123456Z"
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Offset-less format written by older ledgers, read as UTC
const NAIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Current UTC time truncated to what the ledger stores.
pub(crate) fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a stored timestamp, truncated to the microseconds `format_timestamp` keeps.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let parsed = match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(s, NAIVE_TIMESTAMP_FORMAT)
            .ok()?
            .and_utc(),
    };
    Some(parsed.trunc_subsecs(6))
}

/// Serde adapter for ledger timestamps.
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(crate) fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_timestamp(ts))
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| D::Error::custom(format!("invalid timestamp \"{raw}\"")))
    }
}

/// Serde adapter for nullable ledger timestamps.
pub(crate) mod option_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub(crate) fn serialize<S: Serializer>(
        ts: &Option<DateTime<Utc>>,
        s: S,
    ) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => s.serialize_str(&super::format_timestamp(ts)),
            None => s.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw = Option::<String>::deserialize(d)?;
        raw.map(|raw| {
            super::parse_timestamp(&raw)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp \"{raw}\"")))
        })
        .transpose()
    }
}
