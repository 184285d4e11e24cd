use serde_json::Value;
use vh_core::requests::ServiceTypePayload;

use super::{check_id, created, done, parse_body, parse_list, respond};
use crate::response::ApiResponse;
use crate::services::service_type::ServiceTypeService;

const ENTITY: &str = "Service type";

#[derive(Clone)]
pub struct ServiceTypeController {
    service: ServiceTypeService,
    default_limit: u64,
}

impl ServiceTypeController {
    #[must_use]
    pub const fn new(service: ServiceTypeService, default_limit: u64) -> Self {
        Self {
            service,
            default_limit,
        }
    }

    pub async fn list(&self, body: Value) -> ApiResponse {
        let result = async {
            let request = parse_list(body, self.default_limit)?;
            self.service.list(request).await
        }
        .await;
        respond(result, |page| {
            ApiResponse::ok(&format!("{ENTITY} list fetched successfully"), &page)
        })
    }

    /// `actor` is the profile recorded as `createdBy`.
    pub async fn create(&self, body: Value, actor: Option<i64>) -> ApiResponse {
        let result = async {
            let payload: ServiceTypePayload = parse_body(body)?;
            self.service.create(payload, actor).await
        }
        .await;
        created(ENTITY, result)
    }

    pub async fn edit(&self, id: i64, body: Value) -> ApiResponse {
        let result = async {
            let id = check_id(id)?;
            let payload: ServiceTypePayload = parse_body(body)?;
            self.service.edit(id, &payload).await
        }
        .await;
        done(ENTITY, "updated", result)
    }

    pub async fn view(&self, id: i64) -> ApiResponse {
        let result = async { self.service.view(check_id(id)?).await }.await;
        respond(result, |detail| {
            ApiResponse::ok(&format!("{ENTITY} fetched successfully"), &detail)
        })
    }

    pub async fn archive(&self, id: i64) -> ApiResponse {
        let result = async { self.service.archive(check_id(id)?).await }.await;
        done(ENTITY, "archived", result)
    }

    pub async fn unarchive(&self, id: i64) -> ApiResponse {
        let result = async { self.service.unarchive(check_id(id)?).await }.await;
        done(ENTITY, "unarchived", result)
    }
}
