//! QuakeML 1.2 catalog writer
//!
//! Serializes the in-memory catalog into the XML event markup understood by
//! seismological tooling. This is the one output path where depth leaves in
//! metres rather than kilometres.

use chrono::SecondsFormat;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::Writer;

use crate::error::{QuakeError, Result};
use crate::models::Event;

const QUAKEML_NS: &str = "http://quakeml.org/xmlns/quakeml/1.2";
const BED_NS: &str = "http://quakeml.org/xmlns/bed/1.2";

/// Serialize a catalog as a QuakeML 1.2 document.
pub fn write(events: &[Event]) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("q:quakeml");
    root.push_attribute(("xmlns:q", QUAKEML_NS));
    root.push_attribute(("xmlns", BED_NS));
    writer.write_event(XmlEvent::Start(root)).map_err(xml_err)?;

    let mut params = BytesStart::new("eventParameters");
    params.push_attribute(("publicID", "smi:local/catalog"));
    writer.write_event(XmlEvent::Start(params)).map_err(xml_err)?;

    for (index, event) in events.iter().enumerate() {
        write_event(&mut writer, event, index)?;
    }

    writer.write_event(XmlEvent::End(BytesEnd::new("eventParameters"))).map_err(xml_err)?;
    writer.write_event(XmlEvent::End(BytesEnd::new("q:quakeml"))).map_err(xml_err)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| QuakeError::Xml(format!("non-UTF8 QuakeML output: {e}")))
}

fn write_event(writer: &mut Writer<Vec<u8>>, event: &Event, index: usize) -> Result<()> {
    let rid = event.resource_id(index);

    let mut ev = BytesStart::new("event");
    ev.push_attribute(("publicID", format!("smi:local/event/{rid}").as_str()));
    writer.write_event(XmlEvent::Start(ev)).map_err(xml_err)?;

    let mut origin = BytesStart::new("origin");
    origin.push_attribute(("publicID", format!("smi:local/origin/{rid}").as_str()));
    writer.write_event(XmlEvent::Start(origin)).map_err(xml_err)?;

    wrapped_value(writer, "time", &event.time.to_rfc3339_opts(SecondsFormat::Micros, true))?;
    wrapped_value(writer, "latitude", &event.latitude.to_string())?;
    wrapped_value(writer, "longitude", &event.longitude.to_string())?;
    // QuakeML depth is metres; the in-memory model is kilometres
    wrapped_value(writer, "depth", &(event.depth_km * 1000.0).to_string())?;

    writer.write_event(XmlEvent::End(BytesEnd::new("origin"))).map_err(xml_err)?;

    let mut magnitude = BytesStart::new("magnitude");
    magnitude.push_attribute(("publicID", format!("smi:local/magnitude/{rid}").as_str()));
    writer.write_event(XmlEvent::Start(magnitude)).map_err(xml_err)?;

    wrapped_value(writer, "mag", &event.magnitude.to_string())?;
    leaf(writer, "type", &event.magnitude_type)?;

    writer.write_event(XmlEvent::End(BytesEnd::new("magnitude"))).map_err(xml_err)?;
    writer.write_event(XmlEvent::End(BytesEnd::new("event"))).map_err(xml_err)?;

    Ok(())
}

/// Writes the QuakeML quantity wrapper, `<name><value>text</value></name>`.
fn wrapped_value(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(XmlEvent::Start(BytesStart::new(name))).map_err(xml_err)?;
    leaf(writer, "value", text)?;
    writer.write_event(XmlEvent::End(BytesEnd::new(name))).map_err(xml_err)?;
    Ok(())
}

fn leaf(writer: &mut Writer<Vec<u8>>, name: &str, text: &str) -> Result<()> {
    writer.write_event(XmlEvent::Start(BytesStart::new(name))).map_err(xml_err)?;
    writer.write_event(XmlEvent::Text(BytesText::new(text))).map_err(xml_err)?;
    writer.write_event(XmlEvent::End(BytesEnd::new(name))).map_err(xml_err)?;
    Ok(())
}

fn xml_err(e: std::io::Error) -> QuakeError {
    QuakeError::Xml(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_event() -> Event {
        Event {
            event_id: Some("EV1".to_string()),
            time: Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            latitude: 1.0,
            longitude: 2.0,
            depth_km: 10.0,
            magnitude: 5.5,
            magnitude_type: "mb".to_string(),
        }
    }

    #[test]
    fn depth_is_written_in_metres() {
        let xml = write(&[sample_event()]).unwrap();
        assert!(xml.contains("<value>10000</value>"));
        assert!(!xml.contains("<value>10</value>"));
    }

    #[test]
    fn document_structure() {
        let xml = write(&[sample_event()]).unwrap();
        assert!(xml.contains("q:quakeml"));
        assert!(xml.contains("publicID=\"smi:local/event/EV1\""));
        assert!(xml.contains("<type>mb</type>"));
        assert!(xml.contains("<value>2023-01-01T00:00:00.000000Z</value>"));
    }

    #[test]
    fn empty_catalog_is_a_valid_document() {
        let xml = write(&[]).unwrap();
        assert!(xml.contains("eventParameters"));
        assert!(!xml.contains("<event "));
    }
}
