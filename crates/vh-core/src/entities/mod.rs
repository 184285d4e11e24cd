//! Entity structs for all VenueHub domain objects.
//!
//! Each entity maps to a table in the libSQL database. `*Detail` structs add
//! the relation sets and owned children returned by the view endpoints.
//! All structs serialize as camelCase JSON.

mod lookup;
mod org_hierarchy;
mod permission;
mod questionnaire;
mod service_offering;
mod service_type;
mod vendor;
mod vendor_room;
mod venue;

pub use lookup::{Client, Menu, PermissionGroup, Profile, Role, Status, WorkItem};
pub use org_hierarchy::{ClientHierarchy, ClientHierarchyDetail, HierarchyLevel};
pub use permission::{Permission, PermissionDetail};
pub use questionnaire::{Answer, Question, QuestionDetail, QuestionOption, QuestionValidation};
pub use service_offering::{ServiceOffering, ServiceOfferingDetail, ServiceTypeLink};
pub use service_type::{ServiceType, ServiceTypeDetail};
pub use vendor::{Vendor, VendorAddress, VendorDetail};
pub use vendor_room::{VendorRoom, VendorRoomDetail};
pub use venue::{VendorVenue, VenueChecklistDetail};
