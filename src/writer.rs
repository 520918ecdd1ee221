use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::GpxError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, GpxError>;
type XmlWriter = Writer<Vec<u8>>;

/// Serialize a document, XML declaration included, tab-indented.
///
/// Element order and omission rules are fixed: metadata, waypoints, tracks;
/// empty names, missing elevations and missing times produce no tags at all.
pub fn to_xml(gpx: &Gpx) -> Result<String> {
    let mut writer = new_writer();
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut root = BytesStart::new("gpx");
    root.push_attribute(("xmlns", GPX_NAMESPACE));
    root.push_attribute(("xmlns:xsi", XSI_NAMESPACE));
    root.push_attribute(("xsi:schemaLocation", SCHEMA_LOCATION));
    root.push_attribute(("version", GPX_VERSION));
    root.push_attribute(("creator", gpx.creator.as_str()));
    writer.write_event(Event::Start(root))?;

    if let Some(metadata) = &gpx.metadata {
        write_metadata(&mut writer, metadata)?;
    }
    for wpt in &gpx.waypoints {
        write_point(&mut writer, "wpt", wpt)?;
    }
    for trk in &gpx.tracks {
        write_track(&mut writer, trk)?;
    }

    let empty = gpx.metadata.is_none() && gpx.waypoints.is_empty() && gpx.tracks.is_empty();
    close(&mut writer, "gpx", empty)?;
    finish(writer)
}

/// Serialize bare `<trkseg>` elements, newline separated, with no declaration
/// or root element. Used to dump an edited subset of a track.
pub fn segments_to_xml(segments: &[Segment]) -> Result<String> {
    let mut writer = new_writer();
    for seg in segments {
        write_segment(&mut writer, seg)?;
    }
    finish(writer)
}

fn new_writer() -> XmlWriter {
    Writer::new_with_indent(Vec::new(), b'\t', 1)
}

fn finish(writer: XmlWriter) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(|_| GpxError::Transcode { encoding: "UTF-8" })
}

fn write_metadata(writer: &mut XmlWriter, metadata: &Metadata) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("metadata")))?;

    write_optional_element(writer, "name", metadata.name.as_deref())?;
    write_optional_element(writer, "desc", metadata.description.as_deref())?;
    if let Some(author) = &metadata.author {
        write_author(writer, author)?;
    }
    if let Some(link) = &metadata.link {
        write_link(writer, link)?;
    }
    write_optional_element(writer, "time", metadata.timestamp.as_deref())?;

    let empty = metadata.name.is_none()
        && metadata.description.is_none()
        && metadata.author.is_none()
        && metadata.link.is_none()
        && metadata.timestamp.is_none();
    close(writer, "metadata", empty)
}

fn write_author(writer: &mut XmlWriter, author: &Author) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("author")))?;

    write_optional_element(writer, "name", author.name.as_deref())?;
    if let Some(email) = &author.email {
        let mut tag = BytesStart::new("email");
        match email.rsplit_once('@') {
            Some((id, domain)) => {
                tag.push_attribute(("id", id));
                tag.push_attribute(("domain", domain));
            }
            None => tag.push_attribute(("id", email.as_str())),
        }
        writer.write_event(Event::Empty(tag))?;
    }

    close(writer, "author", author.name.is_none() && author.email.is_none())
}

fn write_link(writer: &mut XmlWriter, link: &Link) -> Result<()> {
    let mut tag = BytesStart::new("link");
    tag.push_attribute(("href", link.href.as_str()));
    writer.write_event(Event::Start(tag))?;

    write_optional_element(writer, "text", link.text.as_deref())?;

    close(writer, "link", link.text.is_none())
}

fn write_track(writer: &mut XmlWriter, trk: &Track) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("trk")))?;

    write_text_element(writer, "name", &trk.name)?;
    for seg in &trk.segments {
        write_segment(writer, seg)?;
    }

    close(writer, "trk", trk.name.is_empty() && trk.segments.is_empty())
}

fn write_segment(writer: &mut XmlWriter, seg: &Segment) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("trkseg")))?;
    for pt in &seg.points {
        write_point(writer, "trkpt", pt)?;
    }
    close(writer, "trkseg", seg.points.is_empty())
}

fn write_point(writer: &mut XmlWriter, tag: &str, pt: &Waypoint) -> Result<()> {
    let mut start = BytesStart::new(tag);
    start.push_attribute(("lat", pt.lat.to_string().as_str()));
    start.push_attribute(("lon", pt.lon.to_string().as_str()));
    writer.write_event(Event::Start(start))?;

    if let Some(ele) = pt.ele {
        write_text_element(writer, "ele", &ele.to_string())?;
    }
    write_optional_element(writer, "time", pt.timestamp.as_deref())?;
    write_text_element(writer, "name", &pt.name)?;
    write_text_element(writer, "sym", &pt.sym)?;

    let empty = pt.ele.is_none() && pt.timestamp.is_none() && pt.name.is_empty() && pt.sym.is_empty();
    close(writer, tag, empty)
}

/// `<tag>text</tag>` on one line; nothing at all when `text` is empty.
fn write_text_element(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    write_element(writer, tag, text)
}

/// Present values are always written, so `Some("")` becomes `<tag></tag>`.
fn write_optional_element(writer: &mut XmlWriter, tag: &str, text: Option<&str>) -> Result<()> {
    match text {
        Some(text) => write_element(writer, tag, text),
        None => Ok(()),
    }
}

fn write_element(writer: &mut XmlWriter, tag: &str, text: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn close(writer: &mut XmlWriter, tag: &str, empty: bool) -> Result<()> {
    if empty {
        // An empty text event keeps `</tag>` on the opening line.
        writer.write_event(Event::Text(BytesText::new("")))?;
    }
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}
