use std::fmt::{Display, Write};
use std::str::FromStr;

use chrono::format::{Item, Parsed, StrftimeItems};
use chrono::{DateTime, FixedOffset, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;

use crate::core::{
    error::{TimeServerError, TimeServerResult},
    utils,
};

/// Stateless time operations backing the MCP tools
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeOperations;

impl TimeOperations {
    pub fn new() -> Self {
        Self
    }

    /// Current time in `timezone`; an empty timezone means UTC.
    ///
    /// Names that pass validation but are missing from the IANA database
    /// (`PST`, `+05:00`) still fail here.
    pub fn current_time(&self, timezone: &str) -> TimeServerResult<DateTime<FixedOffset>> {
        let now = Utc::now();
        if timezone.is_empty() {
            return Ok(now.fixed_offset());
        }

        self.validate_timezone(timezone)?;

        let tz = Tz::from_str(timezone).map_err(|e| {
            TimeServerError::invalid_timezone(timezone, format!("failed to load timezone: {e}"))
        })?;
        Ok(now.with_timezone(&tz).fixed_offset())
    }

    /// Seconds since the Unix epoch
    pub fn unix_timestamp(&self) -> i64 {
        Utc::now().timestamp()
    }

    /// Render `instant` with a token format; an empty format means RFC 3339
    pub fn format_time<T>(&self, instant: &DateTime<T>, format: &str) -> TimeServerResult<String>
    where
        T: TimeZone,
        T::Offset: Display,
    {
        if format.is_empty() {
            return Ok(instant.to_rfc3339_opts(SecondsFormat::Secs, true));
        }

        self.validate_format(format)?;

        let layout = utils::translate_format(format);
        let items = layout_items(format, &layout)?;
        render(instant, &items)
            .ok_or_else(|| TimeServerError::invalid_format(format, "failed to render time"))
    }

    /// Accepts empty, UTC/GMT, numeric offsets, common abbreviations and IANA names
    pub fn validate_timezone(&self, timezone: &str) -> TimeServerResult<()> {
        if timezone.is_empty() || utils::is_recognized_timezone_format(timezone) {
            return Ok(());
        }

        Tz::from_str(timezone)
            .map(|_| ())
            .map_err(|e| TimeServerError::invalid_timezone(timezone, e.to_string()))
    }

    /// Rejects injection-prone patterns, then round-trips the reference instant
    pub fn validate_format(&self, format: &str) -> TimeServerResult<()> {
        if format.is_empty() {
            return Ok(());
        }

        if let Some(pattern) = utils::find_dangerous_pattern(format) {
            tracing::warn!(format, pattern, "Rejected format containing dangerous pattern");
            return Err(TimeServerError::invalid_format(
                format,
                format!("format contains potentially dangerous pattern '{pattern}'"),
            ));
        }

        let layout = utils::translate_format(format);
        let items = layout_items(format, &layout)?;
        let rendered = render(&utils::reference_instant(), &items)
            .ok_or_else(|| TimeServerError::invalid_format(format, "invalid time format"))?;

        let mut parsed = Parsed::new();
        chrono::format::parse(&mut parsed, &rendered, items.iter()).map_err(|e| {
            TimeServerError::invalid_format(format, format!("invalid time format: {e}"))
        })
    }
}

fn layout_items<'a>(format: &str, layout: &'a str) -> TimeServerResult<Vec<Item<'a>>> {
    let items: Vec<Item<'a>> = StrftimeItems::new(layout).collect();
    if items.iter().any(|item| matches!(item, Item::Error)) {
        return Err(TimeServerError::invalid_format(format, "invalid time format"));
    }
    Ok(items)
}

fn render<T>(instant: &DateTime<T>, items: &[Item<'_>]) -> Option<String>
where
    T: TimeZone,
    T::Offset: Display,
{
    let mut out = String::new();
    write!(out, "{}", instant.format_with_items(items.iter())).ok()?;
    Some(out)
}
