// directory-service/src/repository/department_repository.rs

use async_trait::async_trait;
use sea_orm::prelude::*;
use sea_orm::{
    ActiveValue::{Set, Unchanged},
    Condition, ConnectionTrait, DbBackend, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Statement,
};
use uuid::Uuid;

use crate::domain::department::Department;
use crate::domain::department_location_model::{self, Entity as DepartmentLocationEntity};
use crate::domain::department_model::{self, Entity as DepartmentEntity};
use crate::domain::department_position_model::{self, Entity as DepartmentPositionEntity};
use crate::domain::path::{DepartmentPath, SEPARATOR};
use crate::error::AppResult;

/// 行ロックを取得した子孫部署
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockedDepartment {
    pub id: Uuid,
    pub depth: i16,
}

/// `lock_descendants` の結果。パス順に並ぶ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockedSubtree {
    pub members: Vec<LockedDepartment>,
}

impl LockedSubtree {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// 最も深い子孫の深さ
    pub fn deepest(&self) -> Option<i16> {
        self.members.iter().map(|member| member.depth).max()
    }
}

/// 部署階層の永続化ポート
///
/// 全メソッドは有効（is_active）な部署のみを対象とする。
/// `C` は接続またはトランザクションで、ロック付きの読み取りはトランザクション内で呼ぶこと。
#[async_trait]
pub trait DepartmentRepository<C: Send + Sync>: Send + Sync {
    /// 部署を行ロック付きで取得する
    async fn get_by_id_locked(&self, conn: &C, id: Uuid) -> AppResult<Option<Department>>;

    async fn get_by_id(&self, conn: &C, id: Uuid) -> AppResult<Option<Department>>;

    /// `candidate_id` のパスが `ancestor_path` 自身かその配下なら真
    async fn is_ancestor(
        &self,
        conn: &C,
        ancestor_path: &DepartmentPath,
        candidate_id: Uuid,
    ) -> AppResult<bool>;

    /// `path` の厳密な子孫をすべて行ロックする
    async fn lock_descendants(&self, conn: &C, path: &DepartmentPath) -> AppResult<LockedSubtree>;

    /// `old_path` の厳密な子孫のパスと深さを1文で書き換える。更新件数を返す
    async fn rewrite_descendant_paths(
        &self,
        conn: &C,
        old_path: &DepartmentPath,
        new_path: &DepartmentPath,
    ) -> AppResult<u64>;

    /// 部署1行を保存する（関連レコードは含まない）
    async fn save(&self, conn: &C, department: &Department) -> AppResult<()>;

    /// 部署と関連レコードを追加する
    async fn add(&self, conn: &C, department: &Department) -> AppResult<()>;

    /// 行の updated_at を書き換える
    ///
    /// この書き込みより古いスナップショットで同じ行をロックする付け替えは直列化エラーになる。
    async fn mark_modified(&self, conn: &C, id: Uuid) -> AppResult<()>;

    async fn active_identifier_exists(&self, conn: &C, identifier: &str) -> AppResult<bool>;

    /// すべての ID が有効な部署を指すなら真
    async fn active_departments_exist(&self, conn: &C, ids: &[Uuid]) -> AppResult<bool>;

    async fn delete_location_links(&self, conn: &C, department_id: Uuid) -> AppResult<u64>;

    async fn insert_location_links(
        &self,
        conn: &C,
        department_id: Uuid,
        location_ids: &[Uuid],
    ) -> AppResult<()>;
}

/// PostgreSQL 実装
#[derive(Debug, Clone, Copy, Default)]
pub struct SeaOrmDepartmentRepository;

impl SeaOrmDepartmentRepository {
    pub fn new() -> Self {
        Self
    }

    async fn hydrate<C>(conn: &C, model: department_model::Model) -> AppResult<Department>
    where
        C: ConnectionTrait,
    {
        let location_ids = DepartmentLocationEntity::find()
            .filter(department_location_model::Column::DepartmentId.eq(model.id))
            .all(conn)
            .await?
            .into_iter()
            .map(|link| link.location_id)
            .collect();

        let position_ids = DepartmentPositionEntity::find()
            .filter(department_position_model::Column::DepartmentId.eq(model.id))
            .all(conn)
            .await?
            .into_iter()
            .map(|link| link.position_id)
            .collect();

        Department::from_model(model, location_ids, position_ids)
    }
}

fn descendant_prefix(path: &DepartmentPath) -> String {
    format!("{}{}", path.as_str(), SEPARATOR)
}

#[async_trait]
impl<C> DepartmentRepository<C> for SeaOrmDepartmentRepository
where
    C: ConnectionTrait + Send + Sync,
{
    async fn get_by_id_locked(&self, conn: &C, id: Uuid) -> AppResult<Option<Department>> {
        let model = DepartmentEntity::find_by_id(id)
            .filter(department_model::Column::IsActive.eq(true))
            .lock_exclusive()
            .one(conn)
            .await?;

        match model {
            Some(model) => Ok(Some(Self::hydrate(conn, model).await?)),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, conn: &C, id: Uuid) -> AppResult<Option<Department>> {
        let model = DepartmentEntity::find_by_id(id)
            .filter(department_model::Column::IsActive.eq(true))
            .one(conn)
            .await?;

        match model {
            Some(model) => Ok(Some(Self::hydrate(conn, model).await?)),
            None => Ok(None),
        }
    }

    async fn is_ancestor(
        &self,
        conn: &C,
        ancestor_path: &DepartmentPath,
        candidate_id: Uuid,
    ) -> AppResult<bool> {
        let count = DepartmentEntity::find()
            .filter(department_model::Column::Id.eq(candidate_id))
            .filter(department_model::Column::IsActive.eq(true))
            .filter(
                Condition::any()
                    .add(department_model::Column::Path.eq(ancestor_path.as_str()))
                    .add(department_model::Column::Path.starts_with(descendant_prefix(ancestor_path))),
            )
            .count(conn)
            .await?;

        Ok(count > 0)
    }

    async fn lock_descendants(&self, conn: &C, path: &DepartmentPath) -> AppResult<LockedSubtree> {
        let rows: Vec<(Uuid, i16)> = DepartmentEntity::find()
            .select_only()
            .column(department_model::Column::Id)
            .column(department_model::Column::Depth)
            .filter(department_model::Column::Path.starts_with(descendant_prefix(path)))
            .filter(department_model::Column::IsActive.eq(true))
            .order_by_asc(department_model::Column::Path)
            .lock_exclusive()
            .into_tuple()
            .all(conn)
            .await?;

        tracing::debug!(path = %path, locked = rows.len(), "Locked descendant departments");

        Ok(LockedSubtree {
            members: rows
                .into_iter()
                .map(|(id, depth)| LockedDepartment { id, depth })
                .collect(),
        })
    }

    async fn rewrite_descendant_paths(
        &self,
        conn: &C,
        old_path: &DepartmentPath,
        new_path: &DepartmentPath,
    ) -> AppResult<u64> {
        let depth_delta = DepartmentPath::depth_delta(old_path, new_path);

        // 識別子は英字のみなので LIKE のメタ文字は現れない
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            UPDATE departments
            SET path = $2::text || substr(path, length($1::text) + 1),
                depth = depth + $3,
                updated_at = now()
            WHERE path LIKE $1::text || '.%'
              AND is_active = TRUE
            "#,
            [
                old_path.as_str().into(),
                new_path.as_str().into(),
                depth_delta.into(),
            ],
        );

        let result = conn.execute(statement).await?;
        Ok(result.rows_affected())
    }

    async fn save(&self, conn: &C, department: &Department) -> AppResult<()> {
        let model = department.to_model();
        let active = department_model::ActiveModel {
            id: Unchanged(model.id),
            name: Set(model.name),
            identifier: Set(model.identifier),
            parent_id: Set(model.parent_id),
            path: Set(model.path),
            depth: Set(model.depth),
            is_active: Set(model.is_active),
            created_at: Unchanged(model.created_at),
            updated_at: Set(model.updated_at),
        };

        DepartmentEntity::update(active).exec(conn).await?;
        Ok(())
    }

    async fn add(&self, conn: &C, department: &Department) -> AppResult<()> {
        let model = department.to_model();
        let active = department_model::ActiveModel {
            id: Set(model.id),
            name: Set(model.name),
            identifier: Set(model.identifier),
            parent_id: Set(model.parent_id),
            path: Set(model.path),
            depth: Set(model.depth),
            is_active: Set(model.is_active),
            created_at: Set(model.created_at),
            updated_at: Set(model.updated_at),
        };
        DepartmentEntity::insert(active)
            .exec_without_returning(conn)
            .await?;

        self.insert_location_links(conn, department.id(), &department.location_ids())
            .await?;

        if !department.positions().is_empty() {
            let links = department
                .positions()
                .iter()
                .map(|link| department_position_model::ActiveModel {
                    department_id: Set(link.department_id),
                    position_id: Set(link.position_id),
                });
            DepartmentPositionEntity::insert_many(links)
                .exec_without_returning(conn)
                .await?;
        }

        Ok(())
    }

    async fn mark_modified(&self, conn: &C, id: Uuid) -> AppResult<()> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "UPDATE departments SET updated_at = now() WHERE id = $1",
            [id.into()],
        );

        conn.execute(statement).await?;
        Ok(())
    }

    async fn active_identifier_exists(&self, conn: &C, identifier: &str) -> AppResult<bool> {
        let count = DepartmentEntity::find()
            .filter(department_model::Column::Identifier.eq(identifier))
            .filter(department_model::Column::IsActive.eq(true))
            .count(conn)
            .await?;

        Ok(count > 0)
    }

    async fn active_departments_exist(&self, conn: &C, ids: &[Uuid]) -> AppResult<bool> {
        if ids.is_empty() {
            return Ok(true);
        }

        let count = DepartmentEntity::find()
            .filter(department_model::Column::Id.is_in(ids.iter().copied()))
            .filter(department_model::Column::IsActive.eq(true))
            .count(conn)
            .await?;

        Ok(count == ids.len() as u64)
    }

    async fn delete_location_links(&self, conn: &C, department_id: Uuid) -> AppResult<u64> {
        let result = DepartmentLocationEntity::delete_many()
            .filter(department_location_model::Column::DepartmentId.eq(department_id))
            .exec(conn)
            .await?;

        Ok(result.rows_affected)
    }

    async fn insert_location_links(
        &self,
        conn: &C,
        department_id: Uuid,
        location_ids: &[Uuid],
    ) -> AppResult<()> {
        if location_ids.is_empty() {
            return Ok(());
        }

        let links = location_ids
            .iter()
            .map(|&location_id| department_location_model::ActiveModel {
                department_id: Set(department_id),
                location_id: Set(location_id),
            });

        DepartmentLocationEntity::insert_many(links)
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }
}
