// directory-service/src/api/mod.rs

use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, middleware, Router};
use sea_orm::DatabaseConnection;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::Config;
use crate::logging::{inject_request_context, logging_middleware};
use crate::repository::{SeaOrmDepartmentRepository, SeaOrmLocationRepository, SeaOrmPositionRepository};
use crate::service::{
    department_hierarchy_service::DepartmentHierarchyService,
    department_location_service::DepartmentLocationService,
    department_service::DepartmentService, location_service::LocationService,
    position_service::PositionService,
};
use crate::utils::transaction::DbTransactionManager;

pub mod dto;
pub mod handlers;

pub type DepartmentServiceImpl =
    DepartmentService<DbTransactionManager, SeaOrmDepartmentRepository, SeaOrmLocationRepository>;
pub type HierarchyServiceImpl =
    DepartmentHierarchyService<DbTransactionManager, SeaOrmDepartmentRepository>;
pub type DepartmentLocationServiceImpl = DepartmentLocationService<
    DbTransactionManager,
    SeaOrmDepartmentRepository,
    SeaOrmLocationRepository,
>;
pub type LocationServiceImpl = LocationService<DbTransactionManager, SeaOrmLocationRepository>;
pub type PositionServiceImpl =
    PositionService<DbTransactionManager, SeaOrmPositionRepository, SeaOrmDepartmentRepository>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 統一されたアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub department_service: Arc<DepartmentServiceImpl>,
    pub hierarchy_service: Arc<HierarchyServiceImpl>,
    pub department_location_service: Arc<DepartmentLocationServiceImpl>,
    pub location_service: Arc<LocationServiceImpl>,
    pub position_service: Arc<PositionServiceImpl>,
    pub db: DatabaseConnection,
}

impl AppState {
    /// 接続と設定からサービスを組み立てる
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        let transactions = DbTransactionManager::new(db.clone());
        let departments = SeaOrmDepartmentRepository::new();
        let locations = SeaOrmLocationRepository::new();
        let positions = SeaOrmPositionRepository::new();

        Self {
            department_service: Arc::new(DepartmentService::new(
                transactions.clone(),
                departments,
                locations,
                config.max_department_depth,
            )),
            hierarchy_service: Arc::new(DepartmentHierarchyService::new(
                transactions.clone(),
                departments,
                config.max_department_depth,
            )),
            department_location_service: Arc::new(DepartmentLocationService::new(
                transactions.clone(),
                departments,
                locations,
            )),
            location_service: Arc::new(LocationService::new(transactions.clone(), locations)),
            position_service: Arc::new(PositionService::new(transactions, positions, departments)),
            db,
        }
    }
}

/// 全ルートとミドルウェアを組み立てる
pub fn router(app_state: AppState) -> Router {
    Router::new()
        .merge(handlers::department_handler::department_router(app_state.clone()))
        .merge(handlers::location_handler::location_router(app_state.clone()))
        .merge(handlers::position_handler::position_router(app_state.clone()))
        .merge(handlers::system_handler::system_router(app_state))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(inject_request_context))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(TraceLayer::new_for_http())
}
