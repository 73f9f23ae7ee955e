//! FDSN StationXML 1.2 reader and writer
//!
//! Only the station-level fields of the data model are handled: network
//! code, station code, latitude, longitude, elevation. Channel subtrees in
//! uploaded documents are skipped.

use chrono::Utc;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event as XmlEvent};
use quick_xml::{Reader, Writer};

use crate::error::{QuakeError, Result};
use crate::models::{Inventory, Station};

const FDSN_NS: &str = "http://www.fdsn.org/xml/station/1";

/// Serialize an inventory as a StationXML document, grouping stations by
/// network code in first-seen order.
pub fn write(inventory: &Inventory) -> Result<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    writer
        .write_event(XmlEvent::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml_err)?;

    let mut root = BytesStart::new("FDSNStationXML");
    root.push_attribute(("xmlns", FDSN_NS));
    root.push_attribute(("schemaVersion", "1.2"));
    writer.write_event(XmlEvent::Start(root)).map_err(xml_err)?;

    leaf(&mut writer, "Source", "QuakeSee")?;
    leaf(&mut writer, "Created", &Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string())?;

    let mut network_order: Vec<&str> = Vec::new();
    for s in inventory.iter() {
        if !network_order.contains(&s.network.as_str()) {
            network_order.push(&s.network);
        }
    }

    for network in network_order {
        let mut net = BytesStart::new("Network");
        net.push_attribute(("code", network));
        writer.write_event(XmlEvent::Start(net)).map_err(xml_err)?;

        for s in inventory.iter().filter(|s| s.network == network) {
            let mut sta = BytesStart::new("Station");
            sta.push_attribute(("code", s.station.as_str()));
            writer.write_event(XmlEvent::Start(sta)).map_err(xml_err)?;

            leaf(&mut writer, "Latitude", &s.latitude.to_string())?;
            leaf(&mut writer, "Longitude", &s.longitude.to_string())?;
            leaf(&mut writer, "Elevation", &s.elevation_m.to_string())?;

            writer.write_event(XmlEvent::Start(BytesStart::new("Site"))).map_err(xml_err)?;
            leaf(&mut writer, "Name", &s.station)?;
            writer.write_event(XmlEvent::End(BytesEnd::new("Site"))).map_err(xml_err)?;

            writer.write_event(XmlEvent::End(BytesEnd::new("Station"))).map_err(xml_err)?;
        }

        writer.write_event(XmlEvent::End(BytesEnd::new("Network"))).map_err(xml_err)?;
    }

    writer.write_event(XmlEvent::End(BytesEnd::new("FDSNStationXML"))).map_err(xml_err)?;

    String::from_utf8(writer.into_inner())
        .map_err(|e| QuakeError::Xml(format!("non-UTF8 StationXML output: {e}")))
}

/// Parse an uploaded StationXML document down to the station level.
pub fn read(body: &str) -> Result<Inventory> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut stations = Vec::new();
    let mut network_code = String::new();
    let mut current: Option<PartialStation> = None;
    let mut channel_depth = 0usize;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event().map_err(|e| QuakeError::Xml(e.to_string()))? {
            XmlEvent::Start(e) => match e.name().as_ref() {
                b"Network" => {
                    network_code = attribute(&e, b"code").unwrap_or_default();
                }
                b"Station" => {
                    current = Some(PartialStation {
                        code: attribute(&e, b"code").unwrap_or_default(),
                        latitude: None,
                        longitude: None,
                        elevation: None,
                    });
                }
                b"Channel" => channel_depth += 1,
                // Latitude/Longitude/Elevation also appear under Channel
                b"Latitude" if channel_depth == 0 && current.is_some() => {
                    field = Some(Field::Latitude)
                }
                b"Longitude" if channel_depth == 0 && current.is_some() => {
                    field = Some(Field::Longitude)
                }
                b"Elevation" if channel_depth == 0 && current.is_some() => {
                    field = Some(Field::Elevation)
                }
                _ => {}
            },
            XmlEvent::Text(t) => {
                if let (Some(field), Some(partial)) = (field, current.as_mut()) {
                    let text = t.unescape().map_err(|e| QuakeError::Xml(e.to_string()))?;
                    let value = text.trim().parse::<f64>().ok();
                    match field {
                        Field::Latitude => partial.latitude = value,
                        Field::Longitude => partial.longitude = value,
                        Field::Elevation => partial.elevation = value,
                    }
                }
            }
            XmlEvent::End(e) => match e.name().as_ref() {
                b"Channel" => channel_depth = channel_depth.saturating_sub(1),
                b"Latitude" | b"Longitude" | b"Elevation" => field = None,
                b"Station" => {
                    if let Some(partial) = current.take() {
                        if let Some(station) = partial.build(&network_code) {
                            stations.push(station);
                        }
                    }
                }
                _ => {}
            },
            XmlEvent::Eof => break,
            _ => {}
        }
    }

    if stations.is_empty() && !body.contains("FDSNStationXML") {
        return Err(QuakeError::StationFormat("not a StationXML document".to_string()));
    }

    Ok(Inventory::new(stations))
}

#[derive(Clone, Copy)]
enum Field {
    Latitude,
    Longitude,
    Elevation,
}

struct PartialStation {
    code: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    elevation: Option<f64>,
}

impl PartialStation {
    fn build(self, network: &str) -> Option<Station> {
        Some(Station {
            network: network.to_string(),
            station: self.code,
            latitude: self.latitude?,
            longitude: self.longitude?,
            elevation_m: self.elevation?,
        })
    }
}

fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == name)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
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
