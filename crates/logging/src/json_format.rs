// crates/logging/src/json_format.rs

use std::fmt;

use serde_json::{Map, Value};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{Event, Subscriber};
use tracing_serde::{AsSerde, fields::AsMap};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::registry::LookupSpan;

/// Stressor fields promoted from the event to the top level of a line.
const STRESSOR_KEYS: [&str; 3] = ["stressor", "instance", "ops"];

/// One JSON object per event.
///
/// Every line carries `ts`, `level`, `pid` and `target`. The stressor keys
/// and the message (as `msg`) sit next to them so lines written by
/// concurrent instances can be filtered without digging; any other field
/// is kept under `fields`.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl JsonFormatter {
    fn line(event: &Event<'_>) -> Result<Map<String, Value>, serde_json::Error> {
        let meta = event.metadata();
        let mut fields = match serde_json::to_value(event.field_map())? {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        let mut line = Map::new();
        let ts = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        line.insert("ts".into(), ts.into());
        line.insert("level".into(), serde_json::to_value(meta.level().as_serde())?);
        line.insert("pid".into(), std::process::id().into());
        line.insert("target".into(), meta.target().into());
        for key in STRESSOR_KEYS {
            if let Some(value) = fields.remove(key) {
                line.insert(key.into(), value);
            }
        }
        if let Some(msg) = fields.remove("message") {
            line.insert("msg".into(), msg);
        }
        if !fields.is_empty() {
            line.insert("fields".into(), Value::Object(fields));
        }
        Ok(line)
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'writer> FormatFields<'writer> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let line = Self::line(event).map_err(|_| fmt::Error)?;
        let data = serde_json::to_string(&line).map_err(|_| fmt::Error)?;
        writeln!(writer, "{data}")
    }
}
