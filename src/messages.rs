//! Reader for the channel exporter's JSON-lines message log.
//!
//! Each line is one message, tagged `history` (backfilled, carries `reply_to`)
//! or `new` (received live). The log is append-only; the only ordering is
//! the order lines were appended in.

use std::io::{BufRead, Write};
use std::sync::LazyLock;

use anyhow::Result;
use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::sink::JsonlSink;

static URL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://\S+").unwrap());

const TRAILING_PUNCTUATION: &[char] = &[')', ',', '.', ';', ']'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageRecord {
    History {
        msg_id: i64,
        date: Option<String>,
        from_id: Option<i64>,
        text: String,
        reply_to: Option<i64>,
        #[serde(default)]
        links: Vec<String>,
    },
    New {
        msg_id: i64,
        date: Option<String>,
        from_id: Option<i64>,
        text: String,
        #[serde(default)]
        links: Vec<String>,
    },
}

impl MessageRecord {
    pub fn text(&self) -> &str {
        match self {
            Self::History { text, .. } | Self::New { text, .. } => text,
        }
    }

    pub fn date(&self) -> Option<&str> {
        match self {
            Self::History { date, .. } | Self::New { date, .. } => date.as_deref(),
        }
    }

    pub fn links(&self) -> &[String] {
        match self {
            Self::History { links, .. } | Self::New { links, .. } => links,
        }
    }

    pub fn is_history(&self) -> bool {
        matches!(self, Self::History { .. })
    }

    /// Replace `links` with what `extract_links` finds in `text`.
    pub fn relink(mut self) -> Self {
        let fresh = extract_links(self.text());
        match &mut self {
            Self::History { links, .. } | Self::New { links, .. } => *links = fresh,
        }
        self
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.date().and_then(parse_timestamp)
    }
}

/// Every http(s) URL in `text`, with trailing `),.;]` stripped.
pub fn extract_links(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string())
        .collect()
}

/// RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[derive(Debug, Default)]
pub struct LogSummary {
    pub history: usize,
    pub new: usize,
    pub links: usize,
    pub malformed: usize,
    pub first: Option<DateTime<Utc>>,
    pub last: Option<DateTime<Utc>>,
}

impl LogSummary {
    pub fn total(&self) -> usize {
        self.history + self.new
    }

    fn record(&mut self, msg: &MessageRecord) {
        if msg.is_history() {
            self.history += 1;
        } else {
            self.new += 1;
        }
        self.links += msg.links().len();
        if let Some(ts) = msg.timestamp() {
            self.first = Some(self.first.map_or(ts, |f| f.min(ts)));
            self.last = Some(self.last.map_or(ts, |l| l.max(ts)));
        }
    }

    pub fn print(&self) {
        println!(
            "Read {} messages ({} history, {} new), {} links, {} malformed lines skipped.",
            self.total(),
            self.history,
            self.new,
            self.links,
            self.malformed,
        );
        if let (Some(first), Some(last)) = (self.first, self.last) {
            println!("Span: {} .. {}", first.to_rfc3339(), last.to_rfc3339());
        }
    }
}

/// Read a message log, re-deriving links from each message's text.
/// Well-formed messages are appended to `sink` when one is given; blank
/// and malformed lines are skipped.
pub fn normalize_log<R: BufRead, W: Write>(
    reader: R,
    mut sink: Option<&mut JsonlSink<W>>,
) -> Result<LogSummary> {
    let mut summary = LogSummary::default();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let msg = match serde_json::from_str::<MessageRecord>(&line) {
            Ok(msg) => msg.relink(),
            Err(e) => {
                warn!("Line {}: skipping malformed message: {}", i + 1, e);
                summary.malformed += 1;
                continue;
            }
        };
        summary.record(&msg);
        if let Some(sink) = sink.as_deref_mut() {
            sink.append(&msg)?;
        }
    }

    if let Some(sink) = sink {
        sink.flush()?;
    }
    Ok(summary)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const LOG: &str = r#"{"type": "history", "msg_id": 1, "date": "2023-05-01T10:00:00+00:00", "from_id": null, "text": "See https://example.com/a, and (https://example.com/b).", "reply_to": null, "links": []}
{"type": "history", "msg_id": 2, "date": "2023-05-02T09:30:00+03:00", "from_id": 42, "text": "no links here", "reply_to": 1, "links": ["stale"]}
not json at all

{"type": "new", "msg_id": 3, "date": "2024-01-01T12:00:00.123456", "from_id": null, "text": "fresh http://x.io/path;", "links": []}
{"type": "unknown", "msg_id": 4}
"#;

    #[test]
    fn links_strip_trailing_punctuation() {
        assert_eq!(
            extract_links("Read https://a.com/x). Then http://b.org/y];, ok"),
            vec!["https://a.com/x", "http://b.org/y"]
        );
    }

    #[test]
    fn links_keep_inner_punctuation() {
        assert_eq!(
            extract_links("https://a.com/p?q=1,2&s=(3)"),
            vec!["https://a.com/p?q=1,2&s=(3"]
        );
        assert!(extract_links("").is_empty());
        assert!(extract_links("ftp://nope.example").is_empty());
    }

    #[test]
    fn history_keeps_null_reply_to() {
        let msg = MessageRecord::History {
            msg_id: 9,
            date: None,
            from_id: None,
            text: "t".into(),
            reply_to: None,
            links: vec![],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.starts_with(r#"{"type":"history","msg_id":9"#));
        assert!(json.contains(r#""reply_to":null"#));
    }

    #[test]
    fn new_has_no_reply_to() {
        let msg = MessageRecord::New {
            msg_id: 3,
            date: None,
            from_id: Some(7),
            text: "t".into(),
            links: vec![],
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.starts_with(r#"{"type":"new""#));
        assert!(!json.contains("reply_to"));
    }

    #[test]
    fn timestamps() {
        let utc = parse_timestamp("2023-05-02T09:30:00+03:00").unwrap();
        assert_eq!(utc.to_rfc3339(), "2023-05-02T06:30:00+00:00");
        let naive = parse_timestamp("2024-01-01T12:00:00.123456").unwrap();
        assert_eq!(naive.timestamp(), 1_704_110_400);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn summary_counts() {
        let summary = normalize_log::<_, Vec<u8>>(Cursor::new(LOG), None).unwrap();
        assert_eq!(summary.history, 2);
        assert_eq!(summary.new, 1);
        assert_eq!(summary.total(), 3);
        assert_eq!(summary.links, 3);
        assert_eq!(summary.malformed, 2);
        assert_eq!(summary.first.unwrap().to_rfc3339(), "2023-05-01T10:00:00+00:00");
        assert_eq!(summary.last.unwrap().timestamp(), 1_704_110_400);
    }

    #[test]
    fn normalized_output_relinks() {
        let mut sink = JsonlSink::new(Vec::new());
        normalize_log(Cursor::new(LOG), Some(&mut sink)).unwrap();
        assert_eq!(sink.written(), 3);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let msgs: Vec<MessageRecord> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
        assert_eq!(msgs[0].links(), ["https://example.com/a", "https://example.com/b"]);
        assert!(msgs[1].links().is_empty());
        assert_eq!(msgs[2].links(), ["http://x.io/path"]);
    }
}
