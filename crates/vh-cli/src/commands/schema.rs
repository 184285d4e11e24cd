use anyhow::bail;
use schemars::schema_for;
use serde_json::Value;
use vh_core::{entities, requests};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

macro_rules! schemas {
    ($($name:literal => $ty:ty),+ $(,)?) => {
        const NAMES: &[&str] = &[$($name),+];

        fn schema_of(name: &str) -> Option<anyhow::Result<Value>> {
            match name {
                $($name => Some(serde_json::to_value(schema_for!($ty)).map_err(Into::into)),)+
                _ => None,
            }
        }
    };
}

schemas! {
    "permission" => entities::PermissionDetail,
    "service_offering" => entities::ServiceOfferingDetail,
    "service_type" => entities::ServiceTypeDetail,
    "vendor" => entities::VendorDetail,
    "vendor_room" => entities::VendorRoomDetail,
    "venue_checklist" => entities::VenueChecklistDetail,
    "org_hierarchy" => entities::ClientHierarchyDetail,
    "question" => entities::QuestionDetail,
    "answer" => entities::Answer,
    "permission_payload" => requests::PermissionPayload,
    "service_offering_payload" => requests::ServiceOfferingPayload,
    "service_type_payload" => requests::ServiceTypePayload,
    "vendor_payload" => requests::VendorPayload,
    "vendor_room_payload" => requests::VendorRoomPayload,
    "venue_checklist_payload" => requests::VenueChecklistPayload,
    "org_hierarchy_payload" => requests::OrgHierarchyPayload,
    "question_payload" => requests::QuestionPayload,
}

/// Handle `vh schema <type>`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let name = args.type_name.replace('-', "_");
    match schema_of(&name) {
        Some(schema) => output(&schema?, flags.format),
        None => bail!(
            "unknown schema type '{}' (known: {})",
            args.type_name,
            NAMES.join(", ")
        ),
    }
}
