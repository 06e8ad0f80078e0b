// src/store/memory.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        exam::Exam,
        group::Group,
        item::{Item, ItemChanges, NewItem},
        score::{NewScoreEvent, ScoreEvent, ScoreTally},
        user::User,
    },
};

use super::Store;

/// In-process store. Data lives as long as the value does.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: Vec<User>,
    exams: Vec<Exam>,
    groups: Vec<Group>,
    items: Vec<Item>,
    score_events: Vec<ScoreEvent>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn live_exam_mut(&mut self, id: i64) -> Option<&mut Exam> {
        self.exams
            .iter_mut()
            .find(|e| e.id == id && e.deleted_at.is_none())
    }

    fn live_group_mut(&mut self, id: i64) -> Option<&mut Group> {
        self.groups
            .iter_mut()
            .find(|g| g.id == id && g.deleted_at.is_none())
    }

    fn live_item_mut(&mut self, id: i64) -> Option<&mut Item> {
        self.items
            .iter_mut()
            .find(|i| i.id == id && i.deleted_at.is_none())
    }

    fn exam_name_taken(&self, user_id: i64, name: &str, except: Option<i64>) -> bool {
        self.exams.iter().any(|e| {
            e.deleted_at.is_none() && e.user_id == user_id && e.name == name && Some(e.id) != except
        })
    }

    fn group_name_taken(&self, exam_id: i64, name: &str, except: Option<i64>) -> bool {
        self.groups.iter().any(|g| {
            g.deleted_at.is_none() && g.exam_id == exam_id && g.name == name && Some(g.id) != except
        })
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }

        let user = User {
            id: tables.next_id(),
            username: username.to_string(),
            password: password_hash.to_string(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_exam(&self, name: &str, user_id: i64) -> Result<Exam, AppError> {
        let mut tables = self.tables.write().await;
        if tables.exam_name_taken(user_id, name, None) {
            return Err(AppError::Conflict(
                "Exam with this name already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let exam = Exam {
            id: tables.next_id(),
            name: name.to_string(),
            user_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.exams.push(exam.clone());
        Ok(exam)
    }

    async fn find_exam(&self, id: i64) -> Result<Option<Exam>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exams
            .iter()
            .find(|e| e.id == id && e.deleted_at.is_none())
            .cloned())
    }

    async fn find_exam_by_owner_and_name(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Option<Exam>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exams
            .iter()
            .find(|e| e.deleted_at.is_none() && e.user_id == user_id && e.name == name)
            .cloned())
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .exams
            .iter()
            .filter(|e| e.deleted_at.is_none())
            .cloned()
            .collect())
    }

    async fn rename_exam(&self, id: i64, name: &str) -> Result<Exam, AppError> {
        let mut tables = self.tables.write().await;
        let owner = tables
            .live_exam_mut(id)
            .map(|e| e.user_id)
            .ok_or(AppError::NotFound("Exam not found".to_string()))?;

        if tables.exam_name_taken(owner, name, Some(id)) {
            return Err(AppError::Conflict(
                "Exam with this name already exists".to_string(),
            ));
        }

        let exam = tables
            .live_exam_mut(id)
            .ok_or(AppError::NotFound("Exam not found".to_string()))?;
        exam.name = name.to_string();
        exam.updated_at = Utc::now();
        Ok(exam.clone())
    }

    async fn delete_exam(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let exam = tables
            .live_exam_mut(id)
            .ok_or(AppError::NotFound("Exam not found".to_string()))?;
        exam.deleted_at = Some(now);

        tables
            .groups
            .iter_mut()
            .filter(|g| g.exam_id == id && g.deleted_at.is_none())
            .for_each(|g| g.deleted_at = Some(now));
        tables
            .items
            .iter_mut()
            .filter(|i| i.exam_id == id && i.deleted_at.is_none())
            .for_each(|i| i.deleted_at = Some(now));
        Ok(())
    }

    async fn create_group(&self, exam_id: i64, name: &str) -> Result<Group, AppError> {
        let mut tables = self.tables.write().await;
        if tables.group_name_taken(exam_id, name, None) {
            return Err(AppError::Conflict(
                "Group with this name already exists in this exam".to_string(),
            ));
        }

        let now = Utc::now();
        let group = Group {
            id: tables.next_id(),
            name: name.to_string(),
            exam_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.groups.push(group.clone());
        Ok(group)
    }

    async fn find_group(&self, id: i64) -> Result<Option<Group>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .find(|g| g.id == id && g.deleted_at.is_none())
            .cloned())
    }

    async fn find_group_by_exam_and_name(
        &self,
        exam_id: i64,
        name: &str,
    ) -> Result<Option<Group>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .find(|g| g.deleted_at.is_none() && g.exam_id == exam_id && g.name == name)
            .cloned())
    }

    async fn list_groups_by_exam(&self, exam_id: i64) -> Result<Vec<Group>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .iter()
            .filter(|g| g.deleted_at.is_none() && g.exam_id == exam_id)
            .cloned()
            .collect())
    }

    async fn rename_group(&self, id: i64, name: &str) -> Result<Group, AppError> {
        let mut tables = self.tables.write().await;
        let exam_id = tables
            .live_group_mut(id)
            .map(|g| g.exam_id)
            .ok_or(AppError::NotFound("Group not found".to_string()))?;

        if tables.group_name_taken(exam_id, name, Some(id)) {
            return Err(AppError::Conflict(
                "Group with this name already exists in this exam".to_string(),
            ));
        }

        let group = tables
            .live_group_mut(id)
            .ok_or(AppError::NotFound("Group not found".to_string()))?;
        group.name = name.to_string();
        group.updated_at = Utc::now();
        Ok(group.clone())
    }

    async fn delete_group(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let group = tables
            .live_group_mut(id)
            .ok_or(AppError::NotFound("Group not found".to_string()))?;
        group.deleted_at = Some(now);

        tables
            .items
            .iter_mut()
            .filter(|i| i.group_id == id && i.deleted_at.is_none())
            .for_each(|i| i.deleted_at = Some(now));
        Ok(())
    }

    async fn create_item(&self, item: NewItem) -> Result<Item, AppError> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let item = Item {
            id: tables.next_id(),
            name: item.name,
            image: item.image,
            exam_id: item.exam_id,
            group_id: item.group_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.items.push(item.clone());
        Ok(item)
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .find(|i| i.id == id && i.deleted_at.is_none())
            .cloned())
    }

    async fn list_items_by_exam(&self, exam_id: i64) -> Result<Vec<Item>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| i.deleted_at.is_none() && i.exam_id == exam_id)
            .cloned()
            .collect())
    }

    async fn update_item(&self, id: i64, changes: ItemChanges) -> Result<Item, AppError> {
        let mut tables = self.tables.write().await;
        let item = tables
            .live_item_mut(id)
            .ok_or(AppError::NotFound("Item not found".to_string()))?;
        item.name = changes.name;
        item.image = changes.image;
        item.group_id = changes.group_id;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    async fn delete_item(&self, id: i64) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let item = tables
            .live_item_mut(id)
            .ok_or(AppError::NotFound("Item not found".to_string()))?;
        item.deleted_at = Some(Utc::now());
        Ok(())
    }

    async fn insert_score_event(&self, event: NewScoreEvent) -> Result<ScoreEvent, AppError> {
        let mut tables = self.tables.write().await;
        let event = ScoreEvent {
            id: tables.next_id(),
            exam_id: event.exam_id,
            item_id: event.item_id,
            user_id: event.user_id,
            correct: event.correct,
            created_at: Utc::now(),
        };
        tables.score_events.push(event.clone());
        Ok(event)
    }

    async fn count_score_events(&self, exam_id: i64) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        let count = tables
            .score_events
            .iter()
            .filter(|e| e.exam_id == exam_id)
            .count();
        Ok(count as i64)
    }

    async fn tally_scores(&self, exam_id: i64) -> Result<Vec<ScoreTally>, AppError> {
        let tables = self.tables.read().await;

        // (correct, wrong) keyed by user id
        let mut counts: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
        for event in tables.score_events.iter().filter(|e| e.exam_id == exam_id) {
            let entry = counts.entry(event.user_id).or_default();
            if event.correct {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }

        // Inner join on users, as the SQL version does.
        Ok(counts
            .into_iter()
            .filter_map(|(user_id, (correct, wrong))| {
                tables
                    .users
                    .iter()
                    .find(|u| u.id == user_id)
                    .map(|u| ScoreTally {
                        user_id,
                        username: u.username.clone(),
                        correct,
                        wrong,
                    })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deleting_a_group_hides_its_items() {
        let store = MemoryStore::new();
        let user = store.create_user("owner", "hash").await.unwrap();
        let exam = store.create_exam("Birds", user.id).await.unwrap();
        let group = store.create_group(exam.id, "Corvids").await.unwrap();
        let item = store
            .create_item(NewItem {
                name: "Crow".into(),
                image: String::new(),
                exam_id: exam.id,
                group_id: group.id,
            })
            .await
            .unwrap();

        store.delete_group(group.id).await.unwrap();

        assert!(store.find_group(group.id).await.unwrap().is_none());
        assert!(store.find_item(item.id).await.unwrap().is_none());
        assert!(store.list_items_by_exam(exam.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_an_exam_hides_its_groups_and_items() {
        let store = MemoryStore::new();
        let user = store.create_user("owner", "hash").await.unwrap();
        let exam = store.create_exam("Birds", user.id).await.unwrap();
        let group = store.create_group(exam.id, "Corvids").await.unwrap();
        let item = store
            .create_item(NewItem {
                name: "Crow".into(),
                image: String::new(),
                exam_id: exam.id,
                group_id: group.id,
            })
            .await
            .unwrap();

        store.delete_exam(exam.id).await.unwrap();

        assert!(store.find_exam(exam.id).await.unwrap().is_none());
        assert!(store.find_group(group.id).await.unwrap().is_none());
        assert!(store.find_item(item.id).await.unwrap().is_none());
        assert!(matches!(
            store.delete_exam(exam.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn exam_names_are_unique_per_owner_only() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "hash").await.unwrap();
        let bob = store.create_user("bob", "hash").await.unwrap();

        store.create_exam("Capitals", alice.id).await.unwrap();
        assert!(matches!(
            store.create_exam("Capitals", alice.id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(store.create_exam("Capitals", bob.id).await.is_ok());
    }

    #[tokio::test]
    async fn soft_deleted_exam_frees_its_name() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "hash").await.unwrap();
        let exam = store.create_exam("Capitals", alice.id).await.unwrap();

        store.delete_exam(exam.id).await.unwrap();

        assert!(store.find_exam(exam.id).await.unwrap().is_none());
        assert!(store.create_exam("Capitals", alice.id).await.is_ok());
        assert!(matches!(
            store.delete_exam(exam.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.create_user("alice", "hash").await.unwrap();
        assert!(matches!(
            store.create_user("alice", "other").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn tally_counts_per_user() {
        let store = MemoryStore::new();
        let alice = store.create_user("alice", "hash").await.unwrap();
        let bob = store.create_user("bob", "hash").await.unwrap();

        for (user_id, correct) in [
            (alice.id, true),
            (alice.id, false),
            (bob.id, true),
            (alice.id, true),
        ] {
            store
                .insert_score_event(NewScoreEvent {
                    exam_id: 1,
                    item_id: 1,
                    user_id,
                    correct,
                })
                .await
                .unwrap();
        }
        // Another exam must not leak into the tally.
        store
            .insert_score_event(NewScoreEvent {
                exam_id: 2,
                item_id: 9,
                user_id: bob.id,
                correct: false,
            })
            .await
            .unwrap();

        let tally = store.tally_scores(1).await.unwrap();
        assert_eq!(
            tally,
            vec![
                ScoreTally { user_id: alice.id, username: "alice".into(), correct: 2, wrong: 1 },
                ScoreTally { user_id: bob.id, username: "bob".into(), correct: 1, wrong: 0 },
            ]
        );
        assert_eq!(store.count_score_events(1).await.unwrap(), 4);
    }
}
