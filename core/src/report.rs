//! Report shaping: the console table and the per-month JSON document.

use crate::{
    error::CdrResult,
    types::{Month, Msisdn},
    usage_aggregator::{CallTotals, UsageRecord},
};
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use std::{fmt::Write, io};

const SEPARATOR: &str = "-----------------------------------------------";
const HEADER: &str = "| Subscriber  | Month  | Outgoing  | Incoming |";

/// `HH:MM:SS`. Hours wrap at 24, so a total of a day or more loses
/// its day component (90000s renders as 01:00:00).
pub fn format_duration(total_secs: u64) -> String {
    let seconds = total_secs % 60;
    let minutes = (total_secs / 60) % 60;
    let hours = (total_secs / 3600) % 24;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallTime {
    pub total_time: String,
}

impl From<CallTotals> for CallTime {
    fn from(totals: CallTotals) -> Self {
        Self { total_time: format_duration(totals.seconds()) }
    }
}

/// JSON shape of one (subscriber, month) usage artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageDocument {
    pub msisdn:        Msisdn,
    pub incoming_call: CallTime,
    pub outgoing_call: CallTime,
}

impl UsageDocument {
    /// Two-space indented JSON with `"key" : value` separators.
    pub fn to_json_bytes(&self) -> CdrResult<Vec<u8>> {
        let mut buf = Vec::new();
        let formatter = SpacedColonFormatter(PrettyFormatter::with_indent(b"  "));
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }
}

/// Pretty printer that puts a space on both sides of the key/value colon.
struct SpacedColonFormatter<'a>(PrettyFormatter<'a>);

impl Formatter for SpacedColonFormatter<'_> {
    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(&mut self, writer: &mut W, first: bool) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        writer.write_all(b" : ")
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}

impl From<&UsageRecord> for UsageDocument {
    fn from(usage: &UsageRecord) -> Self {
        Self {
            msisdn: usage.msisdn.clone(),
            incoming_call: usage.incoming.into(),
            outgoing_call: usage.outgoing.into(),
        }
    }
}

/// One subscriber's rows, in month order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberReport {
    pub msisdn: Msisdn,
    pub rows:   Vec<(Month, UsageRecord)>,
}

impl SubscriberReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Report for subscriber {}", self.msisdn);
        let _ = writeln!(out, "{SEPARATOR}");
        let _ = writeln!(out, "{HEADER}");
        let _ = writeln!(out, "{SEPARATOR}");
        for (month, usage) in &self.rows {
            let _ = writeln!(
                out,
                "| {:<10} | {:>2}{:<4} | {:>9} | {:>8} |",
                self.msisdn,
                "",
                format!("{month:02}"),
                format_duration(usage.outgoing.seconds()),
                format_duration(usage.incoming.seconds()),
            );
        }
        let _ = writeln!(out, "{SEPARATOR}");
        out.push('\n');
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageReport {
    pub sections: Vec<SubscriberReport>,
}

impl UsageReport {
    pub fn render(&self) -> String {
        self.sections.iter().map(SubscriberReport::render).collect()
    }
}
