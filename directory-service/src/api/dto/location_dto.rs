// directory-service/src/api/dto/location_dto.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::service::location_service::{AddressInput, CreateLocationCommand};
use crate::utils::validation::{self as rules, location};

/// 住所
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddressDto {
    #[validate(custom(function = rules::validate_postal_code))]
    pub postal_code: String,

    #[validate(length(min = 1, max = location::ADDRESS_PART_MAX_LENGTH, code = "value.is.invalid"))]
    pub region: String,

    #[validate(length(min = 1, max = location::ADDRESS_PART_MAX_LENGTH, code = "value.is.invalid"))]
    pub city: String,

    #[validate(length(min = 1, max = location::ADDRESS_PART_MAX_LENGTH, code = "value.is.invalid"))]
    pub street: String,

    #[validate(length(min = 1, max = location::HOUSE_MAX_LENGTH, code = "value.is.invalid"))]
    pub house: String,

    #[validate(length(max = location::HOUSE_MAX_LENGTH, code = "value.is.invalid"))]
    pub apartment: Option<String>,
}

/// 拠点作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateLocationRequest {
    #[validate(
        length(
            min = location::NAME_MIN_LENGTH,
            max = location::NAME_MAX_LENGTH,
            code = "value.is.invalid",
            message = "Name must be between 3 and 120 characters"
        ),
        custom(function = rules::validate_not_blank)
    )]
    pub name: String,

    #[validate(nested)]
    pub address: AddressDto,

    #[validate(custom(function = rules::validate_timezone))]
    pub timezone: String,
}

impl From<CreateLocationRequest> for CreateLocationCommand {
    fn from(request: CreateLocationRequest) -> Self {
        Self {
            name: request.name,
            address: AddressInput {
                postal_code: request.address.postal_code,
                region: request.address.region,
                city: request.address.city,
                street: request.address.street,
                house: request.address.house,
                apartment: request.address.apartment,
            },
            timezone: request.timezone,
        }
    }
}
