//! # vh-api
//!
//! Services and controllers for the VenueHub domains.
//!
//! Each domain has a service holding its business rules over
//! [`vh_db::VenueDb`] and a controller that turns JSON bodies into
//! [`ApiResponse`]s. [`Api`] wires all of them against one database and one
//! image store; a transport (the `vh` CLI, or an HTTP layer) only has to
//! route to the right controller method.

pub mod controllers;
pub mod error;
pub mod response;
pub mod services;

use std::sync::Arc;

use vh_config::VenueConfig;
use vh_db::VenueDb;
use vh_storage::ImageStore;

use controllers::lookup::LookupController;
use controllers::org_hierarchy::OrgHierarchyController;
use controllers::permission::PermissionController;
use controllers::service_offering::ServiceOfferingController;
use controllers::service_type::ServiceTypeController;
use controllers::vendor::VendorController;
use controllers::vendor_room::VendorRoomController;
use controllers::venue::VenueChecklistController;
pub use error::ApiError;
pub use response::ApiResponse;
use services::Limits;
use services::lookup::LookupService;
use services::org_hierarchy::OrgHierarchyService;
use services::permission::PermissionService;
use services::questionnaire::QuestionnaireService;
use services::service_offering::ServiceOfferingService;
use services::service_type::ServiceTypeService;
use services::vendor::VendorService;
use services::vendor_room::VendorRoomService;
use services::venue::VenueChecklistService;

/// Every controller, sharing one database handle.
#[derive(Clone)]
pub struct Api {
    pub permissions: PermissionController,
    pub service_offerings: ServiceOfferingController,
    pub service_types: ServiceTypeController,
    pub vendors: VendorController,
    pub vendor_rooms: VendorRoomController,
    pub venue_checklists: VenueChecklistController,
    pub org_hierarchies: OrgHierarchyController,
    pub lookups: LookupController,
}

impl Api {
    #[must_use]
    pub fn new(db: VenueDb, images: ImageStore, config: &VenueConfig) -> Self {
        let db = Arc::new(db);
        let limits = Limits {
            default_limit: config.general.default_limit,
            max_limit: config.general.max_limit,
        };
        let default_limit = limits.default_limit;
        let questionnaire = QuestionnaireService::new(Arc::clone(&db), images);

        Self {
            permissions: PermissionController::new(
                PermissionService::new(Arc::clone(&db), limits),
                default_limit,
            ),
            service_offerings: ServiceOfferingController::new(
                ServiceOfferingService::new(Arc::clone(&db), limits),
                default_limit,
            ),
            service_types: ServiceTypeController::new(
                ServiceTypeService::new(Arc::clone(&db), limits),
                default_limit,
            ),
            vendors: VendorController::new(VendorService::new(Arc::clone(&db), limits), default_limit),
            vendor_rooms: VendorRoomController::new(
                VendorRoomService::new(Arc::clone(&db), questionnaire.clone(), limits),
                default_limit,
            ),
            venue_checklists: VenueChecklistController::new(
                VenueChecklistService::new(Arc::clone(&db), questionnaire.clone(), limits),
                default_limit,
            ),
            org_hierarchies: OrgHierarchyController::new(
                OrgHierarchyService::new(Arc::clone(&db), limits),
                default_limit,
            ),
            lookups: LookupController::new(LookupService::new(db), questionnaire),
        }
    }
}
