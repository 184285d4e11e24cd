use std::sync::Arc;

use vh_core::entities::{VendorRoom, VendorRoomDetail};
use vh_core::enums::QuestionPurpose;
use vh_core::pagination::Page;
use vh_core::requests::{ListRequest, VendorRoomFilter, VendorRoomPayload};
use vh_db::VenueDb;
use vh_db::repos::lookup::RefTable;

use super::questionnaire::QuestionnaireService;
use super::{Limits, ensure_one, found, page, touched};
use crate::error::ApiError;

const LABEL: &str = "Vendor room";

#[derive(Clone)]
pub struct VendorRoomService {
    db: Arc<VenueDb>,
    questionnaire: QuestionnaireService,
    limits: Limits,
}

impl VendorRoomService {
    #[must_use]
    pub const fn new(db: Arc<VenueDb>, questionnaire: QuestionnaireService, limits: Limits) -> Self {
        Self {
            db,
            questionnaire,
            limits,
        }
    }

    /// # Errors
    ///
    /// Returns `ApiError::Repository` if the query fails.
    pub async fn list(
        &self,
        mut request: ListRequest<VendorRoomFilter>,
    ) -> Result<Page<VendorRoom>, ApiError> {
        self.limits.clamp(&mut request);
        let listing = self.db.list_vendor_rooms(&request).await?;
        Ok(page(listing, &request))
    }

    /// Validate the answers, upload image answers, then write the room and
    /// its answers in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown vendor or question, `Validation`
    /// for a rejected answer, and `ContentLoading` if an upload fails.
    pub async fn create(&self, payload: &VendorRoomPayload) -> Result<i64, ApiError> {
        ensure_one(&self.db, RefTable::Vendors, payload.vendor_id).await?;
        let prepared = self
            .questionnaire
            .prepare(QuestionPurpose::VendorRoom, &payload.answers)
            .await?;
        let result = self.db.create_vendor_room(payload, &prepared.answers).await;
        if result.is_err() {
            self.questionnaire.discard(&prepared).await;
        }
        Ok(result?)
    }

    /// Answers to questions not in the payload are kept.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the room, vendor or a question does not exist.
    pub async fn edit(&self, id: i64, payload: &VendorRoomPayload) -> Result<(), ApiError> {
        if self.db.find_vendor_room(id).await?.is_none() {
            return Err(ApiError::not_found(LABEL, id));
        }
        ensure_one(&self.db, RefTable::Vendors, payload.vendor_id).await?;
        let prepared = self
            .questionnaire
            .prepare(QuestionPurpose::VendorRoom, &payload.answers)
            .await?;
        let result = self.db.update_vendor_room(id, payload, &prepared.answers).await;
        if !matches!(result, Ok(true)) {
            self.questionnaire.discard(&prepared).await;
        }
        touched(result?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the room does not exist.
    pub async fn view(&self, id: i64) -> Result<VendorRoomDetail, ApiError> {
        found(self.db.find_vendor_room(id).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the room does not exist.
    pub async fn archive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_vendor_room_archived(id, true).await?, LABEL, id)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if the room does not exist.
    pub async fn unarchive(&self, id: i64) -> Result<(), ApiError> {
        touched(self.db.set_vendor_room_archived(id, false).await?, LABEL, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{count, seeded};
    use pretty_assertions::assert_eq;
    use vh_core::enums::ValidationType;
    use vh_core::requests::{AnswerInput, QuestionPayload, ValidationInput};
    use vh_storage::ImageStore;

    const LIMITS: Limits = Limits {
        default_limit: 10,
        max_limit: 100,
    };
    const PNG: &str = "iVBORw0KGgoAAAANSUhEUg==";

    async fn setup() -> (VendorRoomService, QuestionnaireService, ImageStore, Arc<VenueDb>) {
        let db = seeded().await;
        let images = ImageStore::in_memory("https://cdn.test", "uploads");
        let questionnaire = QuestionnaireService::new(db.clone(), images.clone());
        for (text, validations) in [
            ("Describe the lighting", vec![]),
            (
                "Upload the floor plan",
                vec![ValidationInput {
                    validation_type: ValidationType::FileFormat,
                    value: Some("png".into()),
                }],
            ),
        ] {
            questionnaire
                .create_question(&QuestionPayload {
                    purpose: QuestionPurpose::VendorRoom,
                    question_text: text.into(),
                    sort_order: 0,
                    options: vec![],
                    validations,
                })
                .await
                .unwrap();
        }
        let service = VendorRoomService::new(db.clone(), questionnaire.clone(), LIMITS);
        (service, questionnaire, images, db)
    }

    fn room(answers: Vec<AnswerInput>) -> VendorRoomPayload {
        VendorRoomPayload {
            vendor_id: 1,
            name: "Ballroom".into(),
            capacity: Some(200),
            description: None,
            answers,
        }
    }

    fn answer(question_id: i64, value: &str) -> AnswerInput {
        AnswerInput {
            question_id,
            question_option_id: None,
            custom_value: Some(value.into()),
        }
    }

    #[tokio::test]
    async fn edit_keeps_unmentioned_answers() {
        let (service, _, _, _) = setup().await;
        let id = service
            .create(&room(vec![answer(1, "Warm"), answer(2, PNG)]))
            .await
            .unwrap();
        service.edit(id, &room(vec![answer(1, "Dimmable")])).await.unwrap();

        let detail = service.view(id).await.unwrap();
        assert_eq!(detail.answers.len(), 2);
        let text = detail.answers.iter().find(|a| a.question_id == 1).unwrap();
        assert_eq!(text.custom_value, "Dimmable");
        let image = detail.answers.iter().find(|a| a.question_id == 2).unwrap();
        assert!(image.file_url.is_some());
    }

    #[tokio::test]
    async fn unknown_room_is_checked_before_upload() {
        let (service, _, _, db) = setup().await;
        let err = service.edit(9, &room(vec![answer(2, PNG)])).await.unwrap_err();
        assert_eq!(err.to_string(), "Vendor room 9 not found");
        assert_eq!(count(&db, "vendor_rooms").await, 0);
    }

    #[tokio::test]
    async fn discard_removes_uploaded_images() {
        let (_, questionnaire, images, _) = setup().await;
        let prepared = questionnaire
            .prepare(QuestionPurpose::VendorRoom, &[answer(2, PNG)])
            .await
            .unwrap();
        assert_eq!(prepared.uploaded.len(), 1);
        let key = &prepared.uploaded[0];
        assert!(images.does_image_exist(key).await.unwrap());

        questionnaire.discard(&prepared).await;
        assert!(!images.does_image_exist(key).await.unwrap());
    }
}
