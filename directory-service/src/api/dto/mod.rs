// directory-service/src/api/dto/mod.rs

pub mod department_dto;
pub mod location_dto;
pub mod position_dto;
