//! `vh <domain> list|create|edit|view|archive|unarchive`.

use serde_json::Value;
use vh_api::ApiResponse;
use vh_api::controllers::org_hierarchy::OrgHierarchyController;
use vh_api::controllers::permission::PermissionController;
use vh_api::controllers::service_offering::ServiceOfferingController;
use vh_api::controllers::service_type::ServiceTypeController;
use vh_api::controllers::vendor::VendorController;
use vh_api::controllers::vendor_room::VendorRoomController;
use vh_api::controllers::venue::VenueChecklistController;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::DomainCommands;
use crate::commands::body::read_body;
use crate::output::respond;

/// The six operations every domain controller offers.
pub(crate) trait Resource {
    async fn list(&self, body: Value) -> ApiResponse;
    async fn create(&self, body: Value, actor: Option<i64>) -> ApiResponse;
    async fn edit(&self, id: i64, body: Value) -> ApiResponse;
    async fn view(&self, id: i64) -> ApiResponse;
    async fn archive(&self, id: i64) -> ApiResponse;
    async fn unarchive(&self, id: i64) -> ApiResponse;
}

macro_rules! resource {
    ($controller:ty, |$this:ident, $body:ident, $actor:ident| $create:expr) => {
        impl Resource for $controller {
            async fn list(&self, body: Value) -> ApiResponse {
                <$controller>::list(self, body).await
            }
            async fn create(&self, $body: Value, $actor: Option<i64>) -> ApiResponse {
                let $this = self;
                $create
            }
            async fn edit(&self, id: i64, body: Value) -> ApiResponse {
                <$controller>::edit(self, id, body).await
            }
            async fn view(&self, id: i64) -> ApiResponse {
                <$controller>::view(self, id).await
            }
            async fn archive(&self, id: i64) -> ApiResponse {
                <$controller>::archive(self, id).await
            }
            async fn unarchive(&self, id: i64) -> ApiResponse {
                <$controller>::unarchive(self, id).await
            }
        }
    };
}

resource!(PermissionController, |c, body, actor| c.create(body, actor).await);
resource!(ServiceOfferingController, |c, body, actor| c.create(body, actor).await);
resource!(ServiceTypeController, |c, body, actor| c.create(body, actor).await);
resource!(VendorController, |c, body, actor| c.create(body, actor).await);
resource!(OrgHierarchyController, |c, body, actor| c.create(body, actor).await);
// Rooms and checklists carry no creator.
resource!(VendorRoomController, |c, body, _actor| c.create(body).await);
resource!(VenueChecklistController, |c, body, _actor| c.create(body).await);

pub(crate) async fn handle<R: Resource>(
    resource: &R,
    action: &DomainCommands,
    flags: &GlobalFlags,
) -> anyhow::Result<bool> {
    let response = match action {
        DomainCommands::List(body) => resource.list(read_body(body)?).await,
        DomainCommands::Create(body) => resource.create(read_body(body)?, flags.profile).await,
        DomainCommands::Edit { id, body } => resource.edit(*id, read_body(body)?).await,
        DomainCommands::View { id } => resource.view(*id).await,
        DomainCommands::Archive { id } => resource.archive(*id).await,
        DomainCommands::Unarchive { id } => resource.unarchive(*id).await,
    };
    respond(&response, flags.format)
}
