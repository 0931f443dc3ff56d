//! Connectivity descriptor: patch connections and boundary sets by patch id.
//!
//! Rendered as the `<geometry>` block of an IFEM input file.

use std::fmt::Write as _;

use patchgen_core::{ParametricPatch, PatchId, PatchgenError, Result};
use patchgen_topology::{EntityIndex, EntityKind, PatchKey, PatchRegistry};
use serde::{Deserialize, Serialize};

/// One connection with the lower patch id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub master: PatchId,
    pub midx: u8,
    pub slave: PatchId,
    pub sidx: u8,
    pub reverse: bool,
}

impl ConnectionRecord {
    /// Order the two sides so the smaller patch id is the master.
    pub fn canonical(a: PatchId, a_idx: u8, b: PatchId, b_idx: u8, reverse: bool) -> Self {
        let ((master, midx), (slave, sidx)) = if b < a {
            ((b, b_idx), (a, a_idx))
        } else {
            ((a, a_idx), (b, b_idx))
        };
        Self {
            master,
            midx,
            slave,
            sidx,
            reverse,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetItem {
    pub patch: PatchId,
    pub index: EntityIndex,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologySet {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub items: Vec<SetItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityDescriptor {
    pub dim: usize,
    pub patchfile: String,
    pub topology: Vec<ConnectionRecord>,
    pub topologysets: Vec<TopologySet>,
}

impl ConnectivityDescriptor {
    /// Resolve every patch reference in `registry` to its id.
    pub fn from_registry<P: ParametricPatch>(
        registry: &PatchRegistry<P>,
        patchfile: impl Into<String>,
    ) -> Result<Self> {
        let id = |key: PatchKey| {
            registry
                .id(key)
                .ok_or_else(|| PatchgenError::Geometry(format!("dangling patch key {key:?}")))
        };

        let topology = registry
            .connections()
            .iter()
            .map(|c| {
                Ok(ConnectionRecord::canonical(
                    id(c.master.patch)?,
                    c.master.boundary,
                    id(c.slave.patch)?,
                    c.slave.boundary,
                    c.reversed,
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let topologysets = registry
            .boundary_sets()
            .iter()
            .map(|set| {
                let items = set
                    .items
                    .iter()
                    .map(|item| {
                        Ok(SetItem {
                            patch: id(item.patch)?,
                            index: item.index,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(TopologySet {
                    name: set.name.clone(),
                    kind: set.kind,
                    items,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            dim: registry.dimension(),
            patchfile: patchfile.into(),
            topology,
            topologysets,
        })
    }

    /// Attribute names of the connection sides for this model dimension.
    fn side_attributes(&self) -> (&'static str, &'static str) {
        match self.dim {
            1 => ("mvert", "svert"),
            3 => ("mface", "sface"),
            _ => ("medge", "sedge"),
        }
    }

    pub fn to_xml(&self) -> String {
        let (midx, sidx) = self.side_attributes();
        let mut xml = String::new();
        xml.push_str("<?xml version='1.0' encoding='utf-8'?>\n");
        let _ = writeln!(xml, "<geometry dim=\"{}\">", self.dim);
        let _ = writeln!(xml, "  <patchfile>{}</patchfile>", escape(&self.patchfile));

        if self.topology.is_empty() {
            xml.push_str("  <topology/>\n");
        } else {
            xml.push_str("  <topology>\n");
            for c in &self.topology {
                let _ = writeln!(
                    xml,
                    "    <connection master=\"{}\" {midx}=\"{}\" slave=\"{}\" {sidx}=\"{}\" reverse=\"{}\"/>",
                    c.master, c.midx, c.slave, c.sidx, c.reverse
                );
            }
            xml.push_str("  </topology>\n");
        }

        if self.topologysets.is_empty() {
            xml.push_str("  <topologysets/>\n");
        } else {
            xml.push_str("  <topologysets>\n");
            for set in &self.topologysets {
                let _ = writeln!(
                    xml,
                    "    <set name=\"{}\" type=\"{}\">",
                    escape(&set.name),
                    set.kind
                );
                for item in &set.items {
                    let _ = writeln!(
                        xml,
                        "      <item patch=\"{}\">{}</item>",
                        item.patch, item.index
                    );
                }
                xml.push_str("    </set>\n");
            }
            xml.push_str("  </topologysets>\n");
        }

        xml.push_str("</geometry>\n");
        xml
    }
}

/// Escape text for use in XML content and double-quoted attributes.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> PatchId {
        PatchId::from_index(n - 1)
    }

    #[test]
    fn test_canonical_swaps_sides() {
        let c = ConnectionRecord::canonical(id(2), 2, id(1), 1, false);
        assert_eq!((c.master, c.midx, c.slave, c.sidx), (id(1), 1, id(2), 2));
        let c = ConnectionRecord::canonical(id(1), 4, id(3), 3, true);
        assert_eq!((c.master, c.midx, c.slave, c.sidx, c.reverse), (id(1), 4, id(3), 3, true));
    }

    #[test]
    fn test_xml_rendering() {
        let desc = ConnectivityDescriptor {
            dim: 2,
            patchfile: "run.g2".into(),
            topology: vec![ConnectionRecord::canonical(id(1), 2, id(2), 1, true)],
            topologysets: vec![TopologySet {
                name: "wall & <inlet>".into(),
                kind: EntityKind::Edge,
                items: vec![SetItem {
                    patch: id(2),
                    index: EntityIndex::Single(3),
                }],
            }],
        };
        let xml = desc.to_xml();
        assert!(xml.starts_with("<?xml version='1.0' encoding='utf-8'?>\n<geometry dim=\"2\">\n"));
        assert!(xml.contains("<patchfile>run.g2</patchfile>"));
        assert!(xml.contains(
            "<connection master=\"1\" medge=\"2\" slave=\"2\" sedge=\"1\" reverse=\"true\"/>"
        ));
        assert!(xml.contains("<set name=\"wall &amp; &lt;inlet&gt;\" type=\"edge\">"));
        assert!(xml.contains("<item patch=\"2\">3</item>"));
        assert!(xml.ends_with("</geometry>\n"));
    }

    #[test]
    fn test_volume_attributes_and_pairs() {
        let desc = ConnectivityDescriptor {
            dim: 3,
            patchfile: "box.g2".into(),
            topology: vec![ConnectionRecord::canonical(id(1), 6, id(2), 5, false)],
            topologysets: vec![TopologySet {
                name: "corner".into(),
                kind: EntityKind::Vertex,
                items: vec![SetItem {
                    patch: id(1),
                    index: EntityIndex::Pair(1, 8),
                }],
            }],
        };
        let xml = desc.to_xml();
        assert!(xml.contains("mface=\"6\""));
        assert!(xml.contains("sface=\"5\""));
        assert!(xml.contains("<item patch=\"1\">1 8</item>"));
    }

    #[test]
    fn test_empty_sections() {
        let desc = ConnectivityDescriptor {
            dim: 2,
            patchfile: "lone.g2".into(),
            topology: Vec::new(),
            topologysets: Vec::new(),
        };
        let xml = desc.to_xml();
        assert!(xml.contains("<topology/>"));
        assert!(xml.contains("<topologysets/>"));
    }

    #[test]
    fn test_json_model() {
        let desc = ConnectivityDescriptor {
            dim: 2,
            patchfile: "a.g2".into(),
            topology: vec![ConnectionRecord::canonical(id(3), 1, id(2), 2, false)],
            topologysets: Vec::new(),
        };
        let json = serde_json::to_value(&desc).unwrap();
        assert_eq!(json["topology"][0]["master"], 2);
        assert_eq!(json["topology"][0]["midx"], 2);
        let back: ConnectivityDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, desc);
    }
}
