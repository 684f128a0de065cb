use crate::models::seat::SeatCoordinate;
use crate::utils::error::AppError;
use okapi::openapi3::SchemaObject;
use okapi::Map;
use rocket::http::Status;
use rocket_okapi::gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::RefOr;
use rocket_okapi::okapi::openapi3::{MediaType, Response, Responses};
use rocket_okapi::response::OpenApiResponderInner;
use serde_json::json;

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Responses::default();

        // One representative error per status code
        let error_responses = [
            (
                Status::BadRequest,
                "Bad Request",
                AppError::WrongSeatCount {
                    expected: 2,
                    actual: 3,
                },
            ),
            (
                Status::NotFound,
                "Not Found",
                AppError::NotFound("Flight not found".to_string()),
            ),
            (
                Status::Conflict,
                "Conflict",
                AppError::SeatAlreadyTaken {
                    seat: SeatCoordinate::new(12, 'C'),
                    order_id: None,
                    tickets_created: 0,
                },
            ),
            (
                Status::UnprocessableEntity,
                "Business rule violated",
                AppError::CancellationWindowClosed { lead_hours: 36 },
            ),
            (
                Status::ServiceUnavailable,
                "Storage Unavailable",
                AppError::StorageUnavailable("pool timed out".to_string()),
            ),
        ];

        for (status, description, error) in error_responses {
            responses.responses.insert(
                status.code.to_string(),
                RefOr::Object(Response {
                    description: description.to_string(),
                    content: {
                        let mut content = Map::new();
                        content.insert(
                            "application/json".to_string(),
                            MediaType {
                                schema: Some(SchemaObject::default()),
                                example: Some(json!({
                                    "error": error.to_string(),
                                    "kind": error.kind(),
                                })),
                                ..Default::default()
                            },
                        );
                        content
                    },
                    ..Default::default()
                }),
            );
        }

        Ok(responses)
    }
}
