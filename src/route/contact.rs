use std::sync::Arc;

use poem::web::Data;
use poem_openapi::{payload::Json, OpenApi, Tags};

use crate::{
    core::validation::validate_contact,
    repository::contact_message::create_contact_message,
    schema::{
        common::{BadRequestResponse, InternalServerErrorResponse, MessageResponse},
        contact::{ContactRequest, ContactResponses},
    },
    AppState,
};

#[derive(Tags)]
enum ApiContactTags {
    Contact,
}

pub struct ApiContact;

#[OpenApi]
impl ApiContact {
    #[oai(path = "/contact/", method = "post", tag = "ApiContactTags::Contact")]
    async fn contact_api(
        &self,
        Json(json): Json<ContactRequest>,
        state: Data<&Arc<AppState>>,
    ) -> ContactResponses {
        if let Err(message) = validate_contact(&json.name, &json.email, &json.message) {
            return ContactResponses::BadRequest(Json(BadRequestResponse { message }));
        }

        // Begin db transaction
        let mut tx = match state.db.begin().await {
            Ok(val) => val,
            Err(err) => {
                return ContactResponses::InternalServerError(Json(
                    InternalServerErrorResponse::new(
                        "route.contact",
                        "contact_api",
                        "begin transaction",
                        &err.to_string(),
                    ),
                ));
            }
        };

        if let Err(err) = create_contact_message(
            &mut tx,
            json.name.trim(),
            json.email.trim(),
            json.message.trim(),
            None,
        )
        .await
        {
            return ContactResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.contact",
                "contact_api",
                "create_contact_message",
                &err.to_string(),
            )));
        }
        if let Err(err) = tx.commit().await {
            return ContactResponses::InternalServerError(Json(InternalServerErrorResponse::new(
                "route.contact",
                "contact_api",
                "commit transaction",
                &err.to_string(),
            )));
        }
        ContactResponses::Created(Json(MessageResponse::new(
            "Thanks for reaching out, we will get back to you soon",
        )))
    }
}
