//! リポジトリ・トランザクションポートのインメモリ実装
//!
//! トランザクションはテーブル全体のコピーに書き込み、commit 時にだけ反映する。
//! 任意のステップで障害やキャンセルを注入できる。

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DbErr, IsolationLevel};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use directory_service::domain::department::Department;
use directory_service::domain::location::{Address, Location};
use directory_service::domain::path::DepartmentPath;
use directory_service::domain::{department_model, location_model};
use directory_service::error::{AppError, AppResult};
use directory_service::repository::{
    DepartmentRepository, LocationRepository, LockedDepartment, LockedSubtree,
};
use directory_service::utils::transaction::{TransactionManager, TransactionScope};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tables {
    pub departments: BTreeMap<Uuid, department_model::Model>,
    /// (department_id, location_id)
    pub department_locations: BTreeSet<(Uuid, Uuid)>,
    /// (department_id, position_id)
    pub department_positions: BTreeSet<(Uuid, Uuid)>,
    pub locations: BTreeMap<Uuid, location_model::Model>,
}

impl Tables {
    pub fn location_ids_of(&self, department_id: Uuid) -> BTreeSet<Uuid> {
        self.department_locations
            .iter()
            .filter(|(department, _)| *department == department_id)
            .map(|(_, location)| *location)
            .collect()
    }

    fn hydrate(&self, model: &department_model::Model) -> AppResult<Department> {
        let location_ids = self.location_ids_of(model.id).into_iter().collect();
        let position_ids = self
            .department_positions
            .iter()
            .filter(|(department, _)| *department == model.id)
            .map(|(_, position)| *position)
            .collect();
        Department::from_model(model.clone(), location_ids, position_ids)
    }
}

/// リポジトリ呼び出しの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Begin,
    GetLocked,
    GetById,
    IsAncestor,
    LockDescendants,
    Rewrite,
    Save,
    MarkModified,
    Add,
    IdentifierExists,
    DeleteLinks,
    InsertLinks,
    LocationsExist,
    Commit,
}

#[derive(Debug, Default)]
struct Faults {
    fail_on: Option<Step>,
    cancel_on: Option<(Step, CancellationToken)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Step(Step),
    Begin(IsolationLevel),
    Committed,
    RolledBack,
}

/// コミット済みのテーブル。トランザクション外の読み取りにも使う
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<Mutex<Tables>>,
    faults: Arc<Mutex<Faults>>,
    events: Arc<Mutex<Vec<Event>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Tables {
        self.tables.lock().unwrap().clone()
    }

    pub fn with_tables<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        f(&mut self.tables.lock().unwrap())
    }

    pub fn department(&self, id: Uuid) -> department_model::Model {
        self.snapshot().departments[&id].clone()
    }

    /// 指定ステップで DB エラーを発生させる
    pub fn fail_on(&self, step: Step) {
        self.faults.lock().unwrap().fail_on = Some(step);
    }

    /// 指定ステップに到達したらトークンをキャンセルする
    pub fn cancel_on(&self, step: Step, token: CancellationToken) {
        self.faults.lock().unwrap().cancel_on = Some((step, token));
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Step(step) => Some(step),
                _ => None,
            })
            .collect()
    }

    pub fn clear_events(&self) {
        self.events.lock().unwrap().clear();
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn hit(&self, step: Step) -> AppResult<()> {
        self.record(Event::Step(step));

        let faults = self.faults.lock().unwrap();
        if let Some((cancel_step, token)) = &faults.cancel_on {
            if *cancel_step == step {
                token.cancel();
            }
        }
        if faults.fail_on == Some(step) {
            return Err(AppError::from(DbErr::Custom(format!(
                "injected fault at {:?}",
                step
            ))));
        }
        Ok(())
    }
}

pub struct InMemoryTransaction {
    store: InMemoryStore,
    staged: Mutex<Tables>,
}

impl InMemoryTransaction {
    fn with_staged<R>(&self, f: impl FnOnce(&mut Tables) -> R) -> R {
        f(&mut self.staged.lock().unwrap())
    }
}

#[async_trait]
impl TransactionScope for InMemoryTransaction {
    async fn commit(self) -> AppResult<()> {
        self.store.hit(Step::Commit)?;
        let staged = self.staged.into_inner().unwrap();
        *self.store.tables.lock().unwrap() = staged;
        self.store.record(Event::Committed);
        Ok(())
    }

    async fn rollback(self) -> AppResult<()> {
        self.store.record(Event::RolledBack);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct InMemoryTransactionManager {
    store: InMemoryStore,
}

impl InMemoryTransactionManager {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl TransactionManager for InMemoryTransactionManager {
    type Connection = InMemoryStore;
    type Transaction = InMemoryTransaction;

    fn connection(&self) -> &InMemoryStore {
        &self.store
    }

    async fn begin_transaction(&self, isolation: IsolationLevel) -> AppResult<InMemoryTransaction> {
        self.store.hit(Step::Begin)?;
        self.store.record(Event::Begin(isolation));
        Ok(InMemoryTransaction {
            store: self.store.clone(),
            staged: Mutex::new(self.store.snapshot()),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryDepartmentRepository;

/// 保存済みのパス。壊れた値は部分木に含めない
fn stored_path(model: &department_model::Model) -> Option<DepartmentPath> {
    DepartmentPath::parse(&model.path).ok()
}

#[async_trait]
impl DepartmentRepository<InMemoryTransaction> for InMemoryDepartmentRepository {
    async fn get_by_id_locked(
        &self,
        txn: &InMemoryTransaction,
        id: Uuid,
    ) -> AppResult<Option<Department>> {
        txn.store.hit(Step::GetLocked)?;
        txn.with_staged(|tables| {
            tables
                .departments
                .get(&id)
                .filter(|model| model.is_active)
                .map(|model| tables.hydrate(model))
                .transpose()
        })
    }

    async fn get_by_id(&self, txn: &InMemoryTransaction, id: Uuid) -> AppResult<Option<Department>> {
        txn.store.hit(Step::GetById)?;
        txn.with_staged(|tables| {
            tables
                .departments
                .get(&id)
                .filter(|model| model.is_active)
                .map(|model| tables.hydrate(model))
                .transpose()
        })
    }

    async fn is_ancestor(
        &self,
        txn: &InMemoryTransaction,
        ancestor_path: &DepartmentPath,
        candidate_id: Uuid,
    ) -> AppResult<bool> {
        txn.store.hit(Step::IsAncestor)?;
        Ok(txn.with_staged(|tables| {
            tables.departments.get(&candidate_id).is_some_and(|model| {
                model.is_active
                    && stored_path(model)
                        .is_some_and(|path| path.is_self_or_descendant_of(ancestor_path))
            })
        }))
    }

    async fn lock_descendants(
        &self,
        txn: &InMemoryTransaction,
        path: &DepartmentPath,
    ) -> AppResult<LockedSubtree> {
        txn.store.hit(Step::LockDescendants)?;
        let mut rows: Vec<(String, LockedDepartment)> = txn.with_staged(|tables| {
            tables
                .departments
                .values()
                .filter(|model| {
                    model.is_active
                        && stored_path(model).is_some_and(|stored| stored.is_descendant_of(path))
                })
                .map(|model| {
                    (
                        model.path.clone(),
                        LockedDepartment {
                            id: model.id,
                            depth: model.depth,
                        },
                    )
                })
                .collect()
        });
        rows.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(LockedSubtree {
            members: rows.into_iter().map(|(_, member)| member).collect(),
        })
    }

    async fn rewrite_descendant_paths(
        &self,
        txn: &InMemoryTransaction,
        old_path: &DepartmentPath,
        new_path: &DepartmentPath,
    ) -> AppResult<u64> {
        txn.store.hit(Step::Rewrite)?;
        let delta = DepartmentPath::depth_delta(old_path, new_path);
        let now = Utc::now();

        Ok(txn.with_staged(|tables| {
            let mut rewritten = 0;
            for model in tables.departments.values_mut().filter(|model| model.is_active) {
                let rebased = stored_path(model)
                    .filter(|stored| stored.is_descendant_of(old_path))
                    .and_then(|stored| stored.rebase(old_path, new_path));
                if let Some(rebased) = rebased {
                    model.path = rebased.as_str().to_string();
                    model.depth = (i32::from(model.depth) + delta) as i16;
                    model.updated_at = now;
                    rewritten += 1;
                }
            }
            rewritten
        }))
    }

    async fn save(&self, txn: &InMemoryTransaction, department: &Department) -> AppResult<()> {
        txn.store.hit(Step::Save)?;
        txn.with_staged(|tables| match tables.departments.get_mut(&department.id()) {
            Some(row) => {
                let model = department.to_model();
                *row = department_model::Model {
                    created_at: row.created_at,
                    ..model
                };
                Ok(())
            }
            None => Err(AppError::from(DbErr::RecordNotUpdated)),
        })
    }

    async fn mark_modified(&self, txn: &InMemoryTransaction, id: Uuid) -> AppResult<()> {
        txn.store.hit(Step::MarkModified)?;
        let now = Utc::now();
        txn.with_staged(|tables| {
            if let Some(row) = tables.departments.get_mut(&id) {
                row.updated_at = now.max(row.updated_at);
            }
        });
        Ok(())
    }

    async fn add(&self, txn: &InMemoryTransaction, department: &Department) -> AppResult<()> {
        txn.store.hit(Step::Add)?;
        txn.with_staged(|tables| {
            let model = department.to_model();
            let duplicate_identifier = tables
                .departments
                .values()
                .any(|row| row.is_active && row.identifier == model.identifier);
            if tables.departments.contains_key(&model.id) || duplicate_identifier {
                return Err(AppError::from(DbErr::Custom(
                    "duplicate key value violates unique constraint".to_string(),
                )));
            }

            tables.departments.insert(model.id, model);
            for link in department.locations() {
                tables
                    .department_locations
                    .insert((link.department_id, link.location_id));
            }
            for link in department.positions() {
                tables
                    .department_positions
                    .insert((link.department_id, link.position_id));
            }
            Ok(())
        })
    }

    async fn active_identifier_exists(
        &self,
        txn: &InMemoryTransaction,
        identifier: &str,
    ) -> AppResult<bool> {
        txn.store.hit(Step::IdentifierExists)?;
        Ok(txn.with_staged(|tables| {
            tables
                .departments
                .values()
                .any(|row| row.is_active && row.identifier == identifier)
        }))
    }

    async fn active_departments_exist(
        &self,
        txn: &InMemoryTransaction,
        ids: &[Uuid],
    ) -> AppResult<bool> {
        Ok(txn.with_staged(|tables| {
            ids.iter().all(|id| {
                tables
                    .departments
                    .get(id)
                    .is_some_and(|row| row.is_active)
            })
        }))
    }

    async fn delete_location_links(
        &self,
        txn: &InMemoryTransaction,
        department_id: Uuid,
    ) -> AppResult<u64> {
        txn.store.hit(Step::DeleteLinks)?;
        Ok(txn.with_staged(|tables| {
            let before = tables.department_locations.len();
            tables
                .department_locations
                .retain(|(department, _)| *department != department_id);
            (before - tables.department_locations.len()) as u64
        }))
    }

    async fn insert_location_links(
        &self,
        txn: &InMemoryTransaction,
        department_id: Uuid,
        location_ids: &[Uuid],
    ) -> AppResult<()> {
        txn.store.hit(Step::InsertLinks)?;
        txn.with_staged(|tables| {
            for location_id in location_ids {
                if !tables
                    .department_locations
                    .insert((department_id, *location_id))
                {
                    return Err(AppError::from(DbErr::Custom(
                        "duplicate key value violates unique constraint".to_string(),
                    )));
                }
            }
            Ok(())
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InMemoryLocationRepository;

#[async_trait]
impl LocationRepository<InMemoryStore> for InMemoryLocationRepository {
    async fn active_locations_exist(&self, store: &InMemoryStore, ids: &[Uuid]) -> AppResult<bool> {
        store.hit(Step::LocationsExist)?;
        Ok(store.with_tables(|tables| {
            ids.iter()
                .all(|id| tables.locations.get(id).is_some_and(|row| row.is_active))
        }))
    }

    async fn active_name_exists(&self, store: &InMemoryStore, name: &str) -> AppResult<bool> {
        Ok(store.with_tables(|tables| {
            tables
                .locations
                .values()
                .any(|row| row.is_active && row.name == name)
        }))
    }

    async fn active_address_exists(
        &self,
        store: &InMemoryStore,
        address: &Address,
    ) -> AppResult<bool> {
        Ok(store.with_tables(|tables| {
            tables.locations.values().any(|row| {
                row.is_active
                    && row.postal_code == address.postal_code()
                    && row.region == address.region()
                    && row.city == address.city()
                    && row.street == address.street()
                    && row.house == address.house()
                    && row.apartment.as_deref() == address.apartment()
            })
        }))
    }

    async fn add(&self, store: &InMemoryStore, location: &Location) -> AppResult<()> {
        store.with_tables(|tables| {
            let model = location.to_model();
            tables.locations.insert(model.id, model);
        });
        Ok(())
    }
}
