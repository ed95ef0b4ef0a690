//! Type definitions

mod domain;
mod proxy;
mod record;
mod stats;
mod zone;

pub use domain::{
    ClassifiedDomainName, Domain, DomainDetails, DomainUpdate, NewDomain, RegisterDomainRequest,
    RegisteredDomain, UpdateDomainRequest,
};
pub use proxy::{sort_for_listing, ClassifiedIp, IpVersion, NewProxy, Proxy, RegisterProxyRequest};
pub use record::{
    clears_onion_address, CreateRecordRequest, NewRecord, Record, RecordDeletion, RecordType,
};
pub use stats::{fraction, ResolverStats};
pub use zone::{PublishFailure, PublishResult, PublishedZone, ZoneSnapshot};
