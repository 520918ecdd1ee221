use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, UTF_8};
use quick_xml::Reader;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesStart, Event};

use crate::error::GpxError;
use crate::gpx_types::*;

type Result<T> = std::result::Result<T, GpxError>;

/// Read a GPX file from disk, transcoding it to UTF-8 if needed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<Gpx> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_gpx_bytes(&bytes)
}

/// Parse a GPX byte stream in any encoding its declaration (or BOM) names.
pub fn parse_gpx_bytes(bytes: &[u8]) -> Result<Gpx> {
    let xml = to_utf8(bytes)?;
    parse_gpx(&xml)
}

/// Parse a GPX XML string into a [`Gpx`] document.
pub fn parse_gpx(xml: &str) -> Result<Gpx> {
    let mut reader = Reader::from_str(xml);
    let mut gpx = Gpx::new();
    let mut root_open = false;
    let mut root_seen = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"gpx" if !root_seen => {
                    read_root_attributes(&e, &mut gpx)?;
                    root_open = true;
                    root_seen = true;
                }
                b"metadata" if root_open => gpx.metadata = Some(parse_metadata(&mut reader)?),
                b"wpt" if root_open => {
                    if let Some(pt) = parse_point(&e, &mut reader)? {
                        gpx.waypoints.push(pt);
                    }
                }
                b"trk" if root_open => gpx.tracks.push(parse_track(&mut reader)?),
                _ => {
                    // Routes, extensions and anything else we don't model
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"gpx" if !root_seen => {
                    read_root_attributes(&e, &mut gpx)?;
                    root_seen = true;
                }
                b"wpt" if root_open => {
                    if let Some(pt) = point_from_attributes(&e)? {
                        gpx.waypoints.push(pt);
                    }
                }
                b"metadata" if root_open => gpx.metadata = Some(Metadata::default()),
                b"trk" if root_open => gpx.tracks.push(Track::default()),
                _ => {}
            },
            Ok(Event::End(e)) if root_open && e.local_name().as_ref() == b"gpx" => {
                root_open = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    if !root_seen {
        return Err(GpxError::MissingRoot);
    }
    if root_open {
        return Err(GpxError::UnexpectedEof("gpx".to_string()));
    }

    tracing::debug!(
        creator = %gpx.creator,
        waypoints = gpx.waypoints.len(),
        tracks = gpx.tracks.len(),
        "parsed GPX document"
    );
    Ok(gpx)
}

/// Decode raw bytes to UTF-8 text: BOM first, then the XML declaration.
fn to_utf8(bytes: &[u8]) -> Result<Cow<'_, str>> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        return transcode(encoding, &bytes[bom_len..]);
    }

    let encoding = match declared_encoding(bytes)? {
        // output_encoding() maps a UTF-16 label on an ASCII-compatible stream to UTF-8
        Some(label) => Encoding::for_label(label.trim().as_bytes())
            .map(Encoding::output_encoding)
            .ok_or(GpxError::UnsupportedEncoding(label))?,
        None => UTF_8,
    };
    transcode(encoding, bytes)
}

fn transcode<'a>(encoding: &'static Encoding, bytes: &'a [u8]) -> Result<Cow<'a, str>> {
    if encoding == UTF_8 {
        return std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| GpxError::Transcode { encoding: "UTF-8" });
    }

    tracing::debug!(encoding = encoding.name(), "transcoding GPX input to UTF-8");
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .ok_or(GpxError::Transcode {
            encoding: encoding.name(),
        })
}

/// The `encoding` pseudo-attribute of the XML declaration, if there is one.
fn declared_encoding(bytes: &[u8]) -> Result<Option<String>> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();

    match reader.read_event_into(&mut buf)? {
        Event::Decl(decl) => match decl.encoding() {
            Some(label) => {
                let label = label.map_err(|e| GpxError::XmlParse(e.into()))?;
                Ok(Some(String::from_utf8_lossy(&label).into_owned()))
            }
            None => Ok(None),
        },
        _ => Ok(None),
    }
}

fn read_root_attributes(e: &BytesStart<'_>, gpx: &mut Gpx) -> Result<()> {
    for attr in e.attributes() {
        let attr = attr.map_err(|e| GpxError::XmlParse(e.into()))?;
        if attr.key.local_name().as_ref() == b"creator" {
            gpx.creator = attr_text(&attr);
        }
    }
    Ok(())
}

/// Attribute value with XML escapes resolved.
fn attr_text(attr: &Attribute<'_>) -> String {
    let raw = std::str::from_utf8(&attr.value).unwrap_or_default();
    quick_xml::escape::unescape(raw)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}

/// Parse lat/lon attributes from a point element's start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| GpxError::XmlParse(e.into()))?;
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match attr.key.local_name().as_ref() {
            b"lat" => lat = Some(parse_coordinate("lat", val)?),
            b"lon" => lon = Some(parse_coordinate("lon", val)?),
            _ => {}
        }
    }

    let lat = lat.ok_or(GpxError::MissingAttribute {
        element: "point",
        attribute: "lat",
    })?;
    let lon = lon.ok_or(GpxError::MissingAttribute {
        element: "point",
        attribute: "lon",
    })?;

    Ok((lat, lon))
}

fn parse_coordinate(attribute: &'static str, val: &str) -> Result<f64> {
    val.trim()
        .parse::<f64>()
        .map_err(|_| GpxError::InvalidAttribute {
            element: "point",
            attribute,
            value: val.to_string(),
        })
}

/// Coordinates of a point, or `None` when they are missing or unparsable.
/// Malformed attribute syntax is still a hard error.
fn point_coordinates(e: &BytesStart<'_>) -> Result<Option<(f64, f64)>> {
    match parse_lat_lon(e) {
        Ok(coords) => Ok(Some(coords)),
        Err(err @ (GpxError::MissingAttribute { .. } | GpxError::InvalidAttribute { .. })) => {
            tracing::warn!(%err, "skipping point without usable coordinates");
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Self-closing point, e.g. `<trkpt lat=".." lon=".."/>`.
fn point_from_attributes(e: &BytesStart<'_>) -> Result<Option<Waypoint>> {
    Ok(point_coordinates(e)?.map(|(lat, lon)| Waypoint::new(lat, lon)))
}

/// Parse a point element (wpt, trkpt) and its children.
/// Called after receiving Event::Start for the point element.
fn parse_point<'a>(
    start: &BytesStart<'a>,
    reader: &mut Reader<&'a [u8]>,
) -> Result<Option<Waypoint>> {
    let Some((lat, lon)) = point_coordinates(start)? else {
        reader.read_to_end(start.name())?;
        return Ok(None);
    };

    let mut point = Waypoint::new(lat, lon);
    let end_name = start.name().0.to_vec();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"ele" => point.ele = read_text_owned(reader, &e)?.trim().parse::<f64>().ok(),
                b"time" => point.timestamp = Some(read_text_owned(reader, &e)?),
                b"name" => point.name = read_text_owned(reader, &e)?,
                b"sym" => point.sym = read_text_owned(reader, &e)?,
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(start)),
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(Some(point))
}

/// Parse a <metadata> element.
fn parse_metadata<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Metadata> {
    let mut metadata = Metadata::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => metadata.name = Some(read_text_owned(reader, &e)?),
                b"desc" => metadata.description = Some(read_text_owned(reader, &e)?),
                b"time" => metadata.timestamp = Some(read_text_owned(reader, &e)?),
                b"author" => metadata.author = Some(parse_author(reader)?),
                b"link" => metadata.link = Some(parse_link(&e, reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"author" => metadata.author = Some(Author::default()),
                b"link" => metadata.link = Some(link_from_attributes(&e)?),
                _ => {}
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"metadata" => break,
            Ok(Event::Eof) => return Err(GpxError::UnexpectedEof("metadata".to_string())),
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(metadata)
}

/// Parse an <author> element.
fn parse_author<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Author> {
    let mut author = Author::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => author.name = Some(read_text_owned(reader, &e)?),
                b"email" => {
                    let from_attrs = email_from_attributes(&e)?;
                    let text = read_text_owned(reader, &e)?;
                    author.email = from_attrs.or_else(|| {
                        let text = text.trim();
                        (!text.is_empty()).then(|| text.to_string())
                    });
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"email" => {
                author.email = email_from_attributes(&e)?;
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"author" => break,
            Ok(Event::Eof) => return Err(GpxError::UnexpectedEof("author".to_string())),
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(author)
}

/// GPX splits addresses as `<email id="jane" domain="example.com"/>`.
fn email_from_attributes(e: &BytesStart<'_>) -> Result<Option<String>> {
    let mut id: Option<String> = None;
    let mut domain: Option<String> = None;
    for attr in e.attributes() {
        let attr = attr.map_err(|e| GpxError::XmlParse(e.into()))?;
        match attr.key.local_name().as_ref() {
            b"id" => id = Some(attr_text(&attr)),
            b"domain" => domain = Some(attr_text(&attr)),
            _ => {}
        }
    }

    Ok(match (id, domain) {
        (Some(id), Some(domain)) => Some(format!("{id}@{domain}")),
        (Some(id), None) => Some(id),
        _ => None,
    })
}

fn link_from_attributes(start: &BytesStart<'_>) -> Result<Link> {
    let mut link = Link::default();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| GpxError::XmlParse(e.into()))?;
        if attr.key.local_name().as_ref() == b"href" {
            link.href = attr_text(&attr);
        }
    }
    Ok(link)
}

/// Parse a <link> element.
fn parse_link<'a>(start: &BytesStart<'a>, reader: &mut Reader<&'a [u8]>) -> Result<Link> {
    let mut link = link_from_attributes(start)?;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"text" => link.text = Some(read_text_owned(reader, &e)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"link" => break,
            Ok(Event::Eof) => return Err(GpxError::UnexpectedEof("link".to_string())),
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(link)
}

/// Parse a <trk> element.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Track> {
    let mut track = Track::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"name" => track.name = read_text_owned(reader, &e)?,
                b"trkseg" => track.segments.push(parse_segment(reader)?),
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"trkseg" => {
                track.segments.push(Segment::default());
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => return Err(GpxError::UnexpectedEof("trk".to_string())),
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(track)
}

/// Parse a <trkseg> element. Empty segments are kept so that order round-trips.
fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>) -> Result<Segment> {
    let mut segment = Segment::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkpt" => {
                    if let Some(pt) = parse_point(&e, reader)? {
                        segment.points.push(pt);
                    }
                }
                _ => {
                    reader.read_to_end(e.name())?;
                }
            },
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    if let Some(pt) = point_from_attributes(&e)? {
                        segment.points.push(pt);
                    }
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => return Err(GpxError::UnexpectedEof("trkseg".to_string())),
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(segment)
}

/// Read text content of an element as an owned String.
/// Handles regular text, CDATA sections, and entity references (Event::GeneralRef).
fn read_text_owned<'a>(reader: &mut Reader<&'a [u8]>, start: &BytesStart<'_>) -> Result<String> {
    let end_name = start.name().0.to_vec();
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Text(e)) => {
                let raw = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(raw);
            }
            Ok(Event::CData(e)) => {
                let s = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                text.push_str(s);
            }
            Ok(Event::GeneralRef(e)) => {
                // Character references (&#60; &#x3C;) and the predefined entities
                if let Ok(Some(ch)) = e.resolve_char_ref() {
                    text.push(ch);
                } else {
                    let name = std::str::from_utf8(e.as_ref()).unwrap_or_default();
                    match name {
                        "amp" => text.push('&'),
                        "lt" => text.push('<'),
                        "gt" => text.push('>'),
                        "quot" => text.push('"'),
                        "apos" => text.push('\''),
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) if e.name().0 == end_name.as_slice() => break,
            Ok(Event::Eof) => return Err(unexpected_eof(start)),
            Err(e) => return Err(GpxError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(text)
}

fn unexpected_eof(start: &BytesStart<'_>) -> GpxError {
    GpxError::UnexpectedEof(String::from_utf8_lossy(start.name().as_ref()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_waypoint() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="35.6762" lon="139.6503"/>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        assert_eq!(gpx.waypoints.len(), 1);
        assert_eq!(gpx.waypoints[0].lat, 35.6762);
        assert_eq!(gpx.waypoints[0].lon, 139.6503);
        assert_eq!(gpx.waypoints[0].ele, None);
    }

    #[test]
    fn test_waypoint_with_children() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="37.085751" lon="-121.17042">
    <ele>195.440933</ele>
    <time>2012-03-21T21:24:43Z</time>
    <name>001</name>
    <desc>ignored</desc>
    <sym>Flag, Blue</sym>
  </wpt>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        let pt = &gpx.waypoints[0];
        assert_eq!(pt.ele, Some(195.440933));
        assert_eq!(pt.timestamp.as_deref(), Some("2012-03-21T21:24:43Z"));
        assert_eq!(pt.name, "001");
        assert_eq!(pt.sym, "Flag, Blue");
    }

    #[test]
    fn test_creator_and_metadata() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1" version="1.1" creator="eTrex 10">
  <metadata>
    <name>Evening ride</name>
    <desc>Around the lake</desc>
    <author>
      <name>Jane</name>
      <email id="jane" domain="example.com"/>
    </author>
    <link href="http://www.garmin.com"><text>Garmin International</text></link>
    <time>2012-03-17T15:44:18Z</time>
  </metadata>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        assert_eq!(gpx.creator, "eTrex 10");
        let metadata = gpx.metadata.unwrap();
        assert_eq!(metadata.name.as_deref(), Some("Evening ride"));
        assert_eq!(metadata.description.as_deref(), Some("Around the lake"));
        assert_eq!(metadata.timestamp.as_deref(), Some("2012-03-17T15:44:18Z"));
        let author = metadata.author.unwrap();
        assert_eq!(author.name.as_deref(), Some("Jane"));
        assert_eq!(author.email.as_deref(), Some("jane@example.com"));
        let link = metadata.link.unwrap();
        assert_eq!(link.href, "http://www.garmin.com");
        assert_eq!(link.text.as_deref(), Some("Garmin International"));
    }

    #[test]
    fn test_author_without_email() {
        let xml = r#"<gpx><metadata><author><name>Jane</name></author></metadata></gpx>"#;
        let author = parse_gpx(xml).unwrap().metadata.unwrap().author.unwrap();
        assert_eq!(author.name.as_deref(), Some("Jane"));
        assert_eq!(author.email, None);
    }

    #[test]
    fn test_simple_track() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <name>Morning Run</name>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"><ele>10.0</ele></trkpt>
      <trkpt lat="35.001" lon="139.001"><ele>11.0</ele></trkpt>
      <trkpt lat="35.002" lon="139.002"><ele>12.0</ele></trkpt>
    </trkseg>
  </trk>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        assert_eq!(gpx.tracks.len(), 1);
        assert_eq!(gpx.tracks[0].name, "Morning Run");
        assert_eq!(gpx.tracks[0].segments.len(), 1);
        assert_eq!(gpx.tracks[0].segments[0].points.len(), 3);
        assert_eq!(gpx.tracks[0].segments[0].points[2].ele, Some(12.0));
    }

    #[test]
    fn test_empty_segment_kept() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <trk>
    <trkseg></trkseg>
    <trkseg>
      <trkpt lat="35.0" lon="139.0"/>
    </trkseg>
    <trkseg/>
  </trk>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        let segments = &gpx.tracks[0].segments;
        assert_eq!(segments.len(), 3);
        assert!(segments[0].points.is_empty());
        assert_eq!(segments[1].points.len(), 1);
        assert!(segments[2].points.is_empty());
    }

    #[test]
    fn test_extensions_and_routes_skipped() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <rte>
    <name>Route 1</name>
    <rtept lat="35.0" lon="139.0"/>
  </rte>
  <trk>
    <trkseg>
      <trkpt lat="35.0" lon="139.0">
        <extensions>
          <gpxtpx:TrackPointExtension xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1">
            <gpxtpx:hr>150</gpxtpx:hr>
          </gpxtpx:TrackPointExtension>
        </extensions>
      </trkpt>
    </trkseg>
  </trk>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        assert!(gpx.waypoints.is_empty());
        assert_eq!(gpx.tracks.len(), 1);
        assert_eq!(gpx.tracks[0].name, "");
        assert_eq!(gpx.tracks[0].segments[0].points.len(), 1);
    }

    #[test]
    fn test_cdata_and_entities() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="35.0" lon="139.0"><name><![CDATA[Test & Name]]></name></wpt>
  <wpt lat="35.0" lon="139.0"><name>Fish &amp; Chips &#x3C;3</name></wpt>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        assert_eq!(gpx.waypoints[0].name, "Test & Name");
        assert_eq!(gpx.waypoints[1].name, "Fish & Chips <3");
    }

    #[test]
    fn test_missing_lat_lon_skipped() {
        let xml = r#"<?xml version="1.0"?>
<gpx version="1.1">
  <wpt lat="35.0" lon="139.0"><name>Good</name></wpt>
  <wpt><name>Bad - no coords</name></wpt>
  <wpt lat="north" lon="140.0"/>
  <wpt lat="36.0" lon="140.0"><name>Also Good</name></wpt>
</gpx>"#;
        let gpx = parse_gpx(xml).unwrap();
        assert_eq!(gpx.waypoints.len(), 2);
        assert_eq!(gpx.waypoints[0].name, "Good");
        assert_eq!(gpx.waypoints[1].name, "Also Good");
    }

    #[test]
    fn test_empty_gpx() {
        let gpx = parse_gpx(r#"<?xml version="1.0"?><gpx version="1.1"></gpx>"#).unwrap();
        assert!(gpx.waypoints.is_empty());
        assert!(gpx.tracks.is_empty());
        assert!(gpx.metadata.is_none());
        assert_eq!(gpx.creator, DEFAULT_CREATOR);
    }

    #[test]
    fn test_not_xml_is_rejected() {
        assert!(matches!(parse_gpx("just some text"), Err(GpxError::MissingRoot)));
        assert!(matches!(parse_gpx(""), Err(GpxError::MissingRoot)));
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        let xml = r#"<gpx><trk><trkseg></trk></trkseg></gpx>"#;
        assert!(parse_gpx(xml).is_err());
    }

    #[test]
    fn test_malformed_attributes_rejected() {
        let duplicate_root = r#"<gpx creator="a" creator="b"></gpx>"#;
        assert!(matches!(parse_gpx(duplicate_root), Err(GpxError::XmlParse(_))));

        let unquoted_root = r#"<gpx creator=oops></gpx>"#;
        assert!(matches!(parse_gpx(unquoted_root), Err(GpxError::XmlParse(_))));

        let duplicate_lat = r#"<gpx><trk><trkseg>
<trkpt lat="1" lon="2" lat="3"></trkpt>
</trkseg></trk></gpx>"#;
        assert!(matches!(parse_gpx(duplicate_lat), Err(GpxError::XmlParse(_))));

        let self_closing = r#"<gpx><wpt lat="1" lon="2" lon="3"/></gpx>"#;
        assert!(matches!(parse_gpx(self_closing), Err(GpxError::XmlParse(_))));

        let email = r#"<gpx><metadata><author><email id="jane" id="joe"/></author></metadata></gpx>"#;
        assert!(matches!(parse_gpx(email), Err(GpxError::XmlParse(_))));
    }

    #[test]
    fn test_truncated_document_rejected() {
        let xml = r#"<gpx version="1.1"><trk><trkseg><trkpt lat="1" lon="2"><ele>3</ele>"#;
        assert!(parse_gpx(xml).is_err());
    }

    #[test]
    fn test_latin1_declared_encoding() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?>
<gpx version="1.1"><wpt lat="1" lon="2"><name>Caf"#
            .to_vec();
        bytes.push(0xE9);
        bytes.extend_from_slice(b"</name></wpt></gpx>");

        let gpx = parse_gpx_bytes(&bytes).unwrap();
        assert_eq!(gpx.waypoints[0].name, "Caf\u{e9}");
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let xml = br#"<?xml version="1.0" encoding="x-klingon"?><gpx/>"#;
        match parse_gpx_bytes(xml) {
            Err(GpxError::UnsupportedEncoding(label)) => assert_eq!(label, "x-klingon"),
            other => panic!("expected UnsupportedEncoding, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_utf8_rejected() {
        let bytes = b"<?xml version=\"1.0\"?><gpx><wpt lat=\"1\" lon=\"2\"><name>\xff</name></wpt></gpx>";
        assert!(matches!(
            parse_gpx_bytes(bytes),
            Err(GpxError::Transcode { encoding: "UTF-8" })
        ));
    }

    #[test]
    fn test_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(br#"<gpx creator="bom"/>"#);
        assert_eq!(parse_gpx_bytes(&bytes).unwrap().creator, "bom");
    }
}
