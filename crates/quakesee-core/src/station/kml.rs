//! KML station export
//!
//! One Placemark per station with a Point at (lon, lat, elevation), the
//! layout Google Earth expects.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::Writer;

use crate::error::{QuakeError, Result};
use crate::models::Inventory;

const KML_NS: &str = "http://www.opengis.net/kml/2.2";

pub fn write(inventory: &Inventory) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("kml");
    root.push_attribute(("xmlns", KML_NS));
    writer.write_event(XmlEvent::Start(root)).map_err(xml_err)?;
    writer.write_event(XmlEvent::Start(BytesStart::new("Document"))).map_err(xml_err)?;
    leaf(&mut writer, "name", "QuakeSee stations")?;

    for s in inventory.iter() {
        writer.write_event(XmlEvent::Start(BytesStart::new("Placemark"))).map_err(xml_err)?;
        leaf(&mut writer, "name", &s.code())?;
        writer.write_event(XmlEvent::Start(BytesStart::new("Point"))).map_err(xml_err)?;
        leaf(
            &mut writer,
            "coordinates",
            &format!("{},{},{}", s.longitude, s.latitude, s.elevation_m),
        )?;
        writer.write_event(XmlEvent::End(BytesEnd::new("Point"))).map_err(xml_err)?;
        writer.write_event(XmlEvent::End(BytesEnd::new("Placemark"))).map_err(xml_err)?;
    }

    writer.write_event(XmlEvent::End(BytesEnd::new("Document"))).map_err(xml_err)?;
    writer.write_event(XmlEvent::End(BytesEnd::new("kml"))).map_err(xml_err)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| QuakeError::Xml(format!("non-UTF8 KML output: {e}")))
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
