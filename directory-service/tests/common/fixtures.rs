//! 部署ツリーと拠点のテストデータ
//!
//! ```text
//! zero
//! └── one
//!     ├── two
//!     │   ├── eight
//!     │   └── nine
//!     └── three
//!         ├── four
//!         │   ├── six
//!         │   └── seven
//!         └── five
//! ```

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, Utc};
use uuid::Uuid;

use directory_service::domain::department::{Department, DepartmentName, Identifier};
use directory_service::domain::location::{Address, Location, LocationName, Timezone};

use super::in_memory::{InMemoryStore, Tables};

pub const MAX_DEPTH: i16 = 256;

/// (名前, 識別子, 親の識別子)
const TREE: &[(&str, &str, Option<&str>)] = &[
    ("Zero", "zero", None),
    ("One", "one", Some("zero")),
    ("Two", "two", Some("one")),
    ("Three", "three", Some("one")),
    ("Four", "four", Some("three")),
    ("Five", "five", Some("three")),
    ("Six", "six", Some("four")),
    ("Seven", "seven", Some("four")),
    ("Eight", "eight", Some("two")),
    ("Nine", "nine", Some("two")),
];

pub struct Fixture {
    pub store: InMemoryStore,
    departments: BTreeMap<&'static str, Uuid>,
    pub locations: Vec<Uuid>,
}

impl Fixture {
    /// 拠点3件と部署ツリーを投入したストアを作る
    pub fn seeded() -> Self {
        let store = InMemoryStore::new();
        // 更新時刻の前進を検証できるよう過去時刻で作る
        let created = Utc::now() - Duration::hours(1);

        let locations: Vec<Uuid> = ["Head office", "Warehouse", "Branch office"]
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let location = Location::create(
                    LocationName::new(name).unwrap(),
                    Address::new(
                        &format!("10100{}", index),
                        "Moscow",
                        "Moscow",
                        "Tverskaya",
                        &(index + 1).to_string(),
                        None,
                    )
                    .unwrap(),
                    Timezone::new("Europe/Moscow").unwrap(),
                    created,
                );
                store.with_tables(|tables| {
                    tables.locations.insert(location.id(), location.to_model());
                });
                location.id()
            })
            .collect();

        let mut built: BTreeMap<&'static str, Department> = BTreeMap::new();
        for (name, identifier, parent) in TREE {
            let name = DepartmentName::new(name).unwrap();
            let identifier_value = Identifier::new(identifier).unwrap();
            let department = match parent {
                None => Department::create_root(name, identifier_value, &[locations[0]], created),
                Some(parent) => Department::create_child(
                    name,
                    identifier_value,
                    &built[parent],
                    &[locations[0]],
                    created,
                    MAX_DEPTH,
                ),
            }
            .unwrap();
            built.insert(*identifier, department);
        }

        store.with_tables(|tables| {
            for department in built.values() {
                tables
                    .departments
                    .insert(department.id(), department.to_model());
                for link in department.locations() {
                    tables
                        .department_locations
                        .insert((link.department_id, link.location_id));
                }
            }
        });

        Self {
            store,
            departments: built.iter().map(|(key, d)| (*key, d.id())).collect(),
            locations,
        }
    }

    pub fn id(&self, identifier: &str) -> Uuid {
        self.departments[identifier]
    }

    pub fn path_of(&self, identifier: &str) -> String {
        self.store.department(self.id(identifier)).path
    }

    pub fn depth_of(&self, identifier: &str) -> i16 {
        self.store.department(self.id(identifier)).depth
    }

    pub fn deactivate(&self, identifier: &str) {
        let id = self.id(identifier);
        self.store.with_tables(|tables| {
            if let Some(row) = tables.departments.get_mut(&id) {
                row.is_active = false;
            }
        });
    }

    pub fn deactivate_location(&self, location_id: Uuid) {
        self.store.with_tables(|tables| {
            if let Some(row) = tables.locations.get_mut(&location_id) {
                row.is_active = false;
            }
        });
    }

    pub fn identifiers(&self) -> Vec<&'static str> {
        self.departments.keys().copied().collect()
    }
}

/// 有効な部署について、パス・深さ・親の整合性と非循環を検証する
pub fn assert_tree_consistent(tables: &Tables) {
    let mut seen_paths = HashSet::new();

    for row in tables.departments.values().filter(|row| row.is_active) {
        let segments: Vec<&str> = row.path.split('.').collect();

        assert!(
            seen_paths.insert(row.path.clone()),
            "duplicate path {}",
            row.path
        );
        assert_eq!(
            row.depth as usize,
            segments.len() - 1,
            "depth of {} does not match its path",
            row.path
        );
        assert_eq!(
            segments.last().copied(),
            Some(row.identifier.as_str()),
            "path {} does not end with its identifier",
            row.path
        );

        match row.parent_id {
            None => assert_eq!(row.depth, 0, "root {} must have depth 0", row.path),
            Some(parent_id) => {
                let parent = &tables.departments[&parent_id];
                assert_eq!(
                    format!("{}.{}", parent.path, row.identifier),
                    row.path,
                    "path of {} is not derived from its parent",
                    row.identifier
                );
                assert_eq!(parent.depth + 1, row.depth);
            }
        }

        // 親をたどってルートに到達できること
        let mut current = row.parent_id;
        let mut hops = 0;
        while let Some(id) = current {
            hops += 1;
            assert!(
                hops <= tables.departments.len(),
                "cycle detected at {}",
                row.identifier
            );
            current = tables.departments[&id].parent_id;
        }
    }
}
