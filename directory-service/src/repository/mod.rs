// directory-service/src/repository/mod.rs

pub mod department_repository;
pub mod location_repository;
pub mod position_repository;

pub use department_repository::{
    DepartmentRepository, LockedDepartment, LockedSubtree, SeaOrmDepartmentRepository,
};
pub use location_repository::{LocationRepository, SeaOrmLocationRepository};
pub use position_repository::{PositionRepository, SeaOrmPositionRepository};
