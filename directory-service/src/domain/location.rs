// directory-service/src/domain/location.rs

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use uuid::Uuid;

use super::bounded_text;
use super::location_model;
use crate::error::AppResult;
use crate::utils::error_helper::{from_validation_error, value_is_invalid};
use crate::utils::validation::{location as limits, validate_postal_code, validate_timezone};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationName(String);

impl LocationName {
    pub fn new(value: &str) -> AppResult<Self> {
        bounded_text("name", value, limits::NAME_MIN_LENGTH, limits::NAME_MAX_LENGTH).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 住所。全要素を前後の空白を除いて保持する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    postal_code: String,
    region: String,
    city: String,
    street: String,
    house: String,
    apartment: Option<String>,
}

impl Address {
    pub fn new(
        postal_code: &str,
        region: &str,
        city: &str,
        street: &str,
        house: &str,
        apartment: Option<&str>,
    ) -> AppResult<Self> {
        validate_postal_code(postal_code)
            .map_err(|e| from_validation_error("address.postal_code", e))?;

        let part = |field: &str, value: &str, max: u64| bounded_text(field, value, 1, max);
        let apartment = match apartment.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Some(part("address.apartment", value, limits::HOUSE_MAX_LENGTH)?),
            None => None,
        };

        Ok(Self {
            postal_code: postal_code.trim().to_string(),
            region: part("address.region", region, limits::ADDRESS_PART_MAX_LENGTH)?,
            city: part("address.city", city, limits::ADDRESS_PART_MAX_LENGTH)?,
            street: part("address.street", street, limits::ADDRESS_PART_MAX_LENGTH)?,
            house: part("address.house", house, limits::HOUSE_MAX_LENGTH)?,
            apartment,
        })
    }

    pub fn postal_code(&self) -> &str {
        &self.postal_code
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn house(&self) -> &str {
        &self.house
    }

    pub fn apartment(&self) -> Option<&str> {
        self.apartment.as_deref()
    }
}

/// IANA タイムゾーン
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(Tz);

impl Timezone {
    pub fn new(value: &str) -> AppResult<Self> {
        validate_timezone(value).map_err(|e| from_validation_error("timezone", e))?;
        value
            .trim()
            .parse::<Tz>()
            .map(Self)
            .map_err(|_| value_is_invalid("timezone", "Unknown timezone"))
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

#[derive(Debug, Clone)]
pub struct Location {
    id: Uuid,
    name: LocationName,
    address: Address,
    timezone: Timezone,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Location {
    pub fn create(
        name: LocationName,
        address: Address,
        timezone: Timezone,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            address,
            timezone,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &LocationName {
        &self.name
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    pub fn to_model(&self) -> location_model::Model {
        location_model::Model {
            id: self.id,
            name: self.name.as_str().to_string(),
            postal_code: self.address.postal_code.clone(),
            region: self.address.region.clone(),
            city: self.address.city.clone(),
            street: self.address.street.clone(),
            house: self.address.house.clone(),
            apartment: self.address.apartment.clone(),
            timezone: self.timezone.name().to_string(),
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
