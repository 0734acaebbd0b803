// directory-service/src/api/dto/position_dto.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::service::position_service::CreatePositionCommand;
use crate::utils::validation::{self as rules, position};

/// 役職作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreatePositionRequest {
    #[validate(
        length(
            min = position::NAME_MIN_LENGTH,
            max = position::NAME_MAX_LENGTH,
            code = "value.is.invalid",
            message = "Name must be between 3 and 100 characters"
        ),
        custom(function = rules::validate_not_blank)
    )]
    pub name: String,

    #[validate(length(
        max = position::DESCRIPTION_MAX_LENGTH,
        code = "value.is.invalid",
        message = "Description must be at most 1000 characters"
    ))]
    pub description: Option<String>,

    #[validate(custom(function = rules::validate_id_list))]
    pub department_ids: Vec<Uuid>,
}

impl From<CreatePositionRequest> for CreatePositionCommand {
    fn from(request: CreatePositionRequest) -> Self {
        Self {
            name: request.name,
            description: request.description,
            department_ids: request.department_ids,
        }
    }
}
