// tests/postgres_repository_test.rs
//
// 実際の PostgreSQL に対して sea-orm 実装を検証する（Docker が必要）。

mod common;

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::Utc;
use common::db::TestDatabase;
use common::fixtures::assert_tree_consistent;
use common::in_memory::Tables;
use directory_service::api::AppState;
use directory_service::config::Config;
use directory_service::domain::department::{Department, DepartmentName, Identifier};
use directory_service::domain::{department_location_model, department_model};
use directory_service::error::ErrorKind;
use directory_service::repository::{DepartmentRepository, SeaOrmDepartmentRepository};
use directory_service::service::department_hierarchy_service::ReparentDepartmentCommand;
use directory_service::service::department_location_service::ReplaceLocationsCommand;
use directory_service::service::department_service::CreateDepartmentCommand;
use directory_service::service::location_service::{AddressInput, CreateLocationCommand};
use directory_service::utils::error_helper::{already_exists, on_unique_violation};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, DbBackend,
    EntityTrait, IntoActiveModel, Statement, TransactionTrait,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

struct Directory {
    _db: TestDatabase,
    connection: DatabaseConnection,
    state: AppState,
    location: Uuid,
}

impl Directory {
    async fn new() -> Self {
        common::init_test_env();
        let db = TestDatabase::new().await;
        let connection = db.connection.clone();
        let state = AppState::new(connection.clone(), &Config::for_testing());

        let location = state
            .location_service
            .create_location(
                CreateLocationCommand {
                    name: "Head office".to_string(),
                    address: AddressInput {
                        postal_code: "101000".to_string(),
                        region: "Moscow".to_string(),
                        city: "Moscow".to_string(),
                        street: "Tverskaya".to_string(),
                        house: "1".to_string(),
                        apartment: None,
                    },
                    timezone: "Europe/Moscow".to_string(),
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        Self {
            _db: db,
            connection,
            state,
            location,
        }
    }

    async fn create(&self, identifier: &str, parent_id: Option<Uuid>) -> Uuid {
        self.state
            .department_service
            .create_department(
                CreateDepartmentCommand {
                    name: format!("Department {}", identifier),
                    identifier: identifier.to_string(),
                    parent_id,
                    location_ids: vec![self.location],
                },
                &CancellationToken::new(),
            )
            .await
            .unwrap()
    }

    /// zero → one → {two → eight, three → four → six}
    async fn seed_tree(&self) -> Vec<(&'static str, Uuid)> {
        let zero = self.create("zero", None).await;
        let one = self.create("one", Some(zero)).await;
        let two = self.create("two", Some(one)).await;
        let three = self.create("three", Some(one)).await;
        let four = self.create("four", Some(three)).await;
        let six = self.create("six", Some(four)).await;
        let eight = self.create("eight", Some(two)).await;
        vec![
            ("zero", zero),
            ("one", one),
            ("two", two),
            ("three", three),
            ("four", four),
            ("six", six),
            ("eight", eight),
        ]
    }

    async fn tables(&self) -> Tables {
        let departments = department_model::Entity::find()
            .all(&self.connection)
            .await
            .unwrap();
        let links = department_location_model::Entity::find()
            .all(&self.connection)
            .await
            .unwrap();

        Tables {
            departments: departments.into_iter().map(|row| (row.id, row)).collect(),
            department_locations: links
                .into_iter()
                .map(|link| (link.department_id, link.location_id))
                .collect(),
            ..Tables::default()
        }
    }

    async fn reparent(&self, department_id: Uuid, parent_id: Option<Uuid>) -> directory_service::AppResult<Uuid> {
        self.state
            .hierarchy_service
            .reparent(
                ReparentDepartmentCommand {
                    department_id,
                    parent_id,
                },
                &CancellationToken::new(),
            )
            .await
    }
}

fn id(tree: &[(&str, Uuid)], identifier: &str) -> Uuid {
    tree.iter()
        .find(|(name, _)| *name == identifier)
        .map(|(_, id)| *id)
        .unwrap()
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_reparent_rewrites_subtree_in_postgres() {
    let directory = Directory::new().await;
    let tree = directory.seed_tree().await;

    directory
        .reparent(id(&tree, "three"), Some(id(&tree, "eight")))
        .await
        .unwrap();

    let tables = directory.tables().await;
    let six = &tables.departments[&id(&tree, "six")];
    assert_eq!(six.path, "zero.one.two.eight.three.four.six");
    assert_eq!(six.depth, 6);
    assert_eq!(
        tables.departments[&id(&tree, "three")].parent_id,
        Some(id(&tree, "eight"))
    );
    assert_tree_consistent(&tables);

    // 集約として読み直しても関連レコードが復元される
    let three = SeaOrmDepartmentRepository::new()
        .get_by_id(&directory.connection, id(&tree, "three"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(three.path().as_str(), "zero.one.two.eight.three");
    assert_eq!(three.depth(), 4);
    assert_eq!(three.location_ids(), vec![directory.location]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_cycle_is_rejected_in_postgres() {
    let directory = Directory::new().await;
    let tree = directory.seed_tree().await;
    let before = directory.tables().await;

    let error = directory
        .reparent(id(&tree, "one"), Some(id(&tree, "six")))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), ErrorKind::Conflict);
    assert_eq!(directory.tables().await, before);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_replace_locations_in_postgres() {
    let directory = Directory::new().await;
    let tree = directory.seed_tree().await;
    let second = directory
        .state
        .location_service
        .create_location(
            CreateLocationCommand {
                name: "Warehouse".to_string(),
                address: AddressInput {
                    postal_code: "101001".to_string(),
                    region: "Moscow".to_string(),
                    city: "Moscow".to_string(),
                    street: "Arbat".to_string(),
                    house: "2".to_string(),
                    apartment: Some("5".to_string()),
                },
                timezone: "Europe/Moscow".to_string(),
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    directory
        .state
        .department_location_service
        .replace_locations(
            ReplaceLocationsCommand {
                department_id: id(&tree, "three"),
                location_ids: vec![second, directory.location],
            },
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    let tables = directory.tables().await;
    assert_eq!(
        tables.location_ids_of(id(&tree, "three")),
        BTreeSet::from([second, directory.location])
    );
    assert_eq!(
        tables.location_ids_of(id(&tree, "four")),
        BTreeSet::from([directory.location])
    );
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_active_identifier_is_unique() {
    let directory = Directory::new().await;
    let alpha = directory.create("alpha", None).await;

    // 一意インデックスがサービスの事前確認をすり抜けた重複も拒否する
    let duplicate = Department::create_root(
        DepartmentName::new("Another alpha").unwrap(),
        Identifier::new("alpha").unwrap(),
        &[directory.location],
        Utc::now(),
    )
    .unwrap();
    let txn = directory.connection.begin().await.unwrap();
    let error = SeaOrmDepartmentRepository::new()
        .add(&txn, &duplicate)
        .await
        .unwrap_err();
    txn.rollback().await.unwrap();

    let error = on_unique_violation(error, || already_exists("identifier", "alpha"));
    assert_eq!(error.code(), "record.already.exist");

    // 無効化された部署の識別子は再利用できる
    let mut row = department_model::Entity::find_by_id(alpha)
        .one(&directory.connection)
        .await
        .unwrap()
        .unwrap()
        .into_active_model();
    row.is_active = Set(false);
    row.update(&directory.connection).await.unwrap();

    directory.create("alpha", None).await;
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_concurrent_reparents_keep_tree_acyclic() {
    let directory = Directory::new().await;
    let tree = directory.seed_tree().await;
    let (two, three) = (id(&tree, "two"), id(&tree, "three"));

    // 互いの配下に入れようとする2つの移動は、両方は成功しない
    let (first, second) = tokio::join!(
        directory.reparent(two, Some(three)),
        directory.reparent(three, Some(two)),
    );

    assert!(first.is_err() || second.is_err());
    let tables = directory.tables().await;
    assert_tree_consistent(&tables);

    for _ in 0..5 {
        let (a, b) = tokio::join!(
            directory.reparent(id(&tree, "six"), Some(id(&tree, "eight"))),
            directory.reparent(id(&tree, "eight"), Some(id(&tree, "zero"))),
        );
        let _ = (a, b);
        assert_tree_consistent(&directory.tables().await);
    }
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_create_under_moving_subtree_keeps_paths_consistent() {
    let directory = Directory::new().await;
    let tree = directory.seed_tree().await;
    let (three, four, eight) = (id(&tree, "three"), id(&tree, "four"), id(&tree, "eight"));

    // 移動先を別セッションでロックし、付け替えを親ロックの手前で待たせる
    let blocker = directory.connection.begin().await.unwrap();
    blocker
        .execute(Statement::from_sql_and_values(
            DbBackend::Postgres,
            "SELECT id FROM departments WHERE id = $1 FOR UPDATE",
            [eight.into()],
        ))
        .await
        .unwrap();

    let concurrent = async {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let child = directory.create("newchild", Some(four)).await;
        blocker.commit().await.unwrap();
        child
    };
    let (moved, newchild) = tokio::join!(directory.reparent(three, Some(eight)), concurrent);

    // 付け替えは作成より古いスナップショットを持つため直列化エラーで中断される
    let error = moved.unwrap_err();
    assert_eq!(error.kind(), ErrorKind::Failure);

    let tables = directory.tables().await;
    assert_tree_consistent(&tables);
    assert_eq!(
        tables.departments[&newchild].path,
        format!("{}.newchild", tables.departments[&four].path)
    );
    assert_eq!(tables.departments[&three].path, "zero.one.three");

    // 競合が解けたあとの再実行は新しい子も含めて移動する
    directory.reparent(three, Some(eight)).await.unwrap();
    let tables = directory.tables().await;
    assert_eq!(
        tables.departments[&newchild].path,
        "zero.one.two.eight.three.four.newchild"
    );
    assert_tree_consistent(&tables);
}
