//! Zone synthesis engine

mod parser;
mod records;
mod synth;
mod template;
mod writer;

pub use parser::{parse_zone_text, zone_origin, ZoneParseError};
pub use records::{RecordData, RecordKind, RecordSet, ResourceRecord};
pub use synth::{proxy_label, SerialClock, ZoneFile, ZoneSynthesizer};
pub use template::{
    render_seed, render_template, StaticTemplateLoader, TemplateKind, ZoneTemplateLoader,
    DEFAULT_BASE_TEMPLATE,
};
pub use writer::write_zone_text;
