// directory-service/src/api/dto/department_dto.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::service::department_hierarchy_service::ReparentDepartmentCommand;
use crate::service::department_location_service::ReplaceLocationsCommand;
use crate::service::department_service::CreateDepartmentCommand;
use crate::utils::validation::{self as rules, department};

// --- リクエストDTO ---

/// 部署作成リクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    #[validate(
        length(
            min = department::NAME_MIN_LENGTH,
            max = department::NAME_MAX_LENGTH,
            code = "value.is.invalid",
            message = "Name must be between 3 and 150 characters"
        ),
        custom(function = rules::validate_not_blank)
    )]
    pub name: String,

    #[validate(custom(function = rules::validate_identifier))]
    pub identifier: String,

    pub parent_id: Option<Uuid>,

    #[validate(custom(function = rules::validate_id_list))]
    pub location_ids: Vec<Uuid>,
}

impl From<CreateDepartmentRequest> for CreateDepartmentCommand {
    fn from(request: CreateDepartmentRequest) -> Self {
        Self {
            name: request.name,
            identifier: request.identifier,
            parent_id: request.parent_id,
            location_ids: request.location_ids,
        }
    }
}

/// 親付け替えリクエスト。`parent_id` が null ならルートに昇格
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateParentRequest {
    #[serde(default)]
    pub parent_id: Option<Uuid>,
}

impl UpdateParentRequest {
    pub fn into_command(self, department_id: Uuid) -> ReparentDepartmentCommand {
        ReparentDepartmentCommand {
            department_id,
            parent_id: self.parent_id,
        }
    }
}

/// 拠点置き換えリクエスト
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReplaceLocationsRequest {
    #[validate(custom(function = rules::validate_id_list))]
    pub location_ids: Vec<Uuid>,
}

impl ReplaceLocationsRequest {
    pub fn into_command(self, department_id: Uuid) -> ReplaceLocationsCommand {
        ReplaceLocationsCommand {
            department_id,
            location_ids: self.location_ids,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, identifier: &str, location_ids: Vec<Uuid>) -> CreateDepartmentRequest {
        CreateDepartmentRequest {
            name: name.to_string(),
            identifier: identifier.to_string(),
            parent_id: None,
            location_ids,
        }
    }

    #[test]
    fn test_valid_create_request() {
        assert!(request("Engineering", "engineering", vec![Uuid::new_v4()])
            .validate()
            .is_ok());
    }

    #[test]
    fn test_invalid_create_request_reports_every_field() {
        let errors = request("ab", "eng-1", vec![]).validate().unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("identifier"));
        assert!(fields.contains_key("location_ids"));
    }

    #[test]
    fn test_replace_locations_rejects_duplicates() {
        let id = Uuid::new_v4();
        let request = ReplaceLocationsRequest {
            location_ids: vec![id, id],
        };

        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_parent_accepts_missing_parent() {
        let request: UpdateParentRequest = serde_json::from_str("{}").unwrap();
        let department_id = Uuid::new_v4();
        let command = request.into_command(department_id);

        assert_eq!(command.department_id, department_id);
        assert_eq!(command.parent_id, None);
    }
}
