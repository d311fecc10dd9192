//! RSS 2.0 serialization of a [`FeedDocument`].

use super::error::EncodeError;
use super::model::{FeedDocument, FeedItem};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::borrow::Cow;
use std::io::Cursor;

pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

/// RFC 822 date with a numeric zone, as RSS `pubDate` expects
const RFC822_NUMERIC_ZONE: &str = "%a, %d %b %Y %H:%M:%S %z";

/// A feed ready to be written to the client
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeed {
    pub body: Vec<u8>,
    pub content_type: &'static str,
    pub last_modified: String,
}

pub fn format_rfc822(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(RFC822_NUMERIC_ZONE).to_string()
}

/// The zero instant (0001-01-01 00:00:00 UTC), used for `Last-Modified`
/// when a feed has no items.
pub fn zero_time() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(1, 1, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_default()
}

/// Whether `c` matches the XML 1.0 `Char` production
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Replace characters XML 1.0 can't carry with U+FFFD.
fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER })
            .collect(),
    )
}

type XmlWriter = Writer<Cursor<Vec<u8>>>;

fn write(writer: &mut XmlWriter, event: Event<'_>) -> Result<(), EncodeError> {
    writer
        .write_event(event)
        .map_err(|e| EncodeError::Xml(e.to_string()))
}

fn write_text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<(), EncodeError> {
    write(writer, Event::Start(BytesStart::new(name)))?;
    write(writer, Event::Text(BytesText::new(&xml_safe(text))))?;
    write(writer, Event::End(BytesEnd::new(name)))
}

fn write_item(writer: &mut XmlWriter, item: &FeedItem) -> Result<(), EncodeError> {
    write(writer, Event::Start(BytesStart::new("item")))?;
    write_text_element(writer, "guid", &item.guid)?;
    write_text_element(writer, "link", &item.link)?;
    write_text_element(writer, "pubDate", &format_rfc822(&item.pub_date))?;
    write_text_element(writer, "source", &item.source)?;
    write_text_element(writer, "title", &item.title)?;
    write(writer, Event::End(BytesEnd::new("item")))
}

/// Serialize `doc` as an indented RSS 2.0 document.
pub fn encode(doc: &FeedDocument) -> Result<EncodedFeed, EncodeError> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b'\t', 1);

    write(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut rss = BytesStart::new("rss");
    rss.push_attribute(("version", "2.0"));
    write(&mut writer, Event::Start(rss))?;
    write(&mut writer, Event::Start(BytesStart::new("channel")))?;
    write_text_element(&mut writer, "title", &doc.title)?;

    for item in &doc.items {
        write_item(&mut writer, item)?;
    }

    write(&mut writer, Event::End(BytesEnd::new("channel")))?;
    write(&mut writer, Event::End(BytesEnd::new("rss")))?;

    let mut body = writer.into_inner().into_inner();
    body.push(b'\n');

    let last_modified = format_rfc822(&doc.freshness().unwrap_or_else(zero_time));

    Ok(EncodedFeed {
        body,
        content_type: RSS_CONTENT_TYPE,
        last_modified,
    })
}
