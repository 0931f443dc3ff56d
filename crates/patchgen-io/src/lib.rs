pub mod export;
pub mod g2;
pub mod xinp;

pub use export::{export, ExportSummary, TopologyExporter};
pub use g2::{read_g2, to_g2_string, write_g2};
pub use xinp::{ConnectionRecord, ConnectivityDescriptor, SetItem, TopologySet};
