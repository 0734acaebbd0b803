// directory-service/src/service/mod.rs

pub mod department_hierarchy_service;
pub mod department_location_service;
pub mod department_service;
pub mod location_service;
pub mod position_service;
