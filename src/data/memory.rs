//! Process-local store used by `--memory` development runs and the tests.

use bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::data::class::db::ClassDbExt;
use crate::data::class::{Class, ClassInfoUpdate, ClassStatus};
use crate::data::payment::db::PaymentDbExt;
use crate::data::payment::Payment;
use crate::data::selection::db::SelectionDbExt;
use crate::data::selection::{Selection, SelectionStatus};
use crate::data::user::db::UserDbExt;
use crate::data::user::User;
use crate::data::DbResult;
use crate::resp::ack::{DeleteAck, InsertAck, UpdateAck};
use crate::role::Role;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    classes: RwLock<Vec<Class>>,
    selections: RwLock<Vec<Selection>>,
    payments: RwLock<Vec<Payment>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

/// Applies `change` to the record with `id`, reporting matched/modified like MongoDB does.
fn update_by_id<T: PartialEq + Clone>(
    records: &mut [T],
    id: ObjectId,
    id_of: impl Fn(&T) -> Option<ObjectId>,
    change: impl FnOnce(&mut T),
) -> UpdateAck {
    match records.iter_mut().find(|it| id_of(it) == Some(id)) {
        Some(record) => {
            let before = record.clone();
            change(&mut *record);
            UpdateAck::new(1, u64::from(*record != before))
        }
        None => UpdateAck::new(0, 0),
    }
}

#[rocket::async_trait]
impl UserDbExt for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|it| it.email == email).cloned())
    }

    async fn insert_user(&self, user: &User) -> DbResult<InsertAck> {
        let id = ObjectId::new();
        self.users.write().await.push(User {
            id: Some(id),
            ..user.clone()
        });
        Ok(InsertAck::new(id))
    }

    async fn list_users(&self) -> DbResult<Vec<User>> {
        Ok(self.users.read().await.clone())
    }

    async fn list_users_with_role(&self, role: Role) -> DbResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().filter(|it| it.role == role).cloned().collect())
    }

    async fn set_user_role(&self, id: ObjectId, role: Role) -> DbResult<UpdateAck> {
        let mut users = self.users.write().await;
        Ok(update_by_id(users.as_mut_slice(), id, |it| it.id, |it| it.role = role))
    }
}

#[rocket::async_trait]
impl ClassDbExt for MemoryStore {
    async fn insert_class(&self, class: &Class) -> DbResult<InsertAck> {
        let id = ObjectId::new();
        self.classes.write().await.push(Class {
            id: Some(id),
            ..class.clone()
        });
        Ok(InsertAck::new(id))
    }

    async fn get_class(&self, id: ObjectId) -> DbResult<Option<Class>> {
        let classes = self.classes.read().await;
        Ok(classes.iter().find(|it| it.id == Some(id)).cloned())
    }

    async fn list_classes(&self) -> DbResult<Vec<Class>> {
        Ok(self.classes.read().await.clone())
    }

    async fn list_classes_by_instructor(&self, email: &str) -> DbResult<Vec<Class>> {
        let classes = self.classes.read().await;
        Ok(classes
            .iter()
            .filter(|it| it.instructor_email == email)
            .cloned()
            .collect())
    }

    async fn list_classes_with_status(&self, status: ClassStatus) -> DbResult<Vec<Class>> {
        let classes = self.classes.read().await;
        Ok(classes
            .iter()
            .filter(|it| it.status == status)
            .cloned()
            .collect())
    }

    async fn set_class_status(&self, id: ObjectId, status: ClassStatus) -> DbResult<UpdateAck> {
        let mut classes = self.classes.write().await;
        Ok(update_by_id(classes.as_mut_slice(), id, |it| it.id, |it| it.status = status))
    }

    async fn set_class_feedback(&self, id: ObjectId, feedback: &str) -> DbResult<UpdateAck> {
        let mut classes = self.classes.write().await;
        Ok(update_by_id(classes.as_mut_slice(), id, |it| it.id, |it| {
            it.feedback = Some(feedback.to_string())
        }))
    }

    async fn update_class_info(&self, id: ObjectId, update: &ClassInfoUpdate) -> DbResult<UpdateAck> {
        let mut classes = self.classes.write().await;
        Ok(update_by_id(classes.as_mut_slice(), id, |it| it.id, |it| update.apply(it)))
    }

    async fn enroll_student(&self, id: ObjectId) -> DbResult<UpdateAck> {
        let mut classes = self.classes.write().await;
        match classes
            .iter_mut()
            .find(|it| it.id == Some(id) && it.available_seats > 0)
        {
            Some(class) => {
                class.available_seats -= 1;
                class.total_student += 1;
                Ok(UpdateAck::new(1, 1))
            }
            None => Ok(UpdateAck::new(0, 0)),
        }
    }
}

#[rocket::async_trait]
impl SelectionDbExt for MemoryStore {
    async fn insert_selection(&self, selection: &Selection) -> DbResult<InsertAck> {
        let id = ObjectId::new();
        self.selections.write().await.push(Selection {
            id: Some(id),
            ..selection.clone()
        });
        Ok(InsertAck::new(id))
    }

    async fn get_selection(&self, id: ObjectId) -> DbResult<Option<Selection>> {
        let selections = self.selections.read().await;
        Ok(selections.iter().find(|it| it.id == Some(id)).cloned())
    }

    async fn list_selections_by_email(&self, email: &str) -> DbResult<Vec<Selection>> {
        let selections = self.selections.read().await;
        Ok(selections
            .iter()
            .filter(|it| it.email == email)
            .cloned()
            .collect())
    }

    async fn mark_selection_paid(&self, id: ObjectId) -> DbResult<UpdateAck> {
        let mut selections = self.selections.write().await;
        Ok(update_by_id(selections.as_mut_slice(), id, |it| it.id, |it| {
            it.status = SelectionStatus::Paid
        }))
    }

    async fn delete_selection(&self, id: ObjectId) -> DbResult<DeleteAck> {
        let mut selections = self.selections.write().await;
        let before = selections.len();
        selections.retain(|it| it.id != Some(id));
        Ok(DeleteAck::new((before - selections.len()) as u64))
    }
}

#[rocket::async_trait]
impl PaymentDbExt for MemoryStore {
    async fn insert_payment(&self, payment: &Payment) -> DbResult<InsertAck> {
        let id = ObjectId::new();
        self.payments.write().await.push(Payment {
            id: Some(id),
            ..payment.clone()
        });
        Ok(InsertAck::new(id))
    }

    async fn list_payments_by_email(&self, email: &str) -> DbResult<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .iter()
            .filter(|it| it.email == email)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::class::ClassCreateData;
    use crate::data::user::db::UserCreated;

    fn user(email: &str) -> User {
        User {
            id: None,
            email: email.to_string(),
            name: "Test".to_string(),
            photo_url: None,
            role: Role::Student,
        }
    }

    fn class(seats: i32) -> Class {
        Class::from(ClassCreateData {
            class_name: "Violin".to_string(),
            class_image: None,
            instructor_name: "Teacher".to_string(),
            instructor_email: "teacher@example.com".to_string(),
            price: 10.0,
            available_seats: seats,
        })
    }

    #[rocket::async_test]
    async fn create_user_is_guarded_by_email() {
        let store = MemoryStore::new();

        let first = store.create_user(user("a@example.com")).await.unwrap();
        assert!(matches!(first, UserCreated::Inserted(_)));

        let second = store.create_user(user("a@example.com")).await.unwrap();
        assert_eq!(second, UserCreated::exists());
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[rocket::async_test]
    async fn role_update_reports_modification() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@example.com")).await.unwrap();
        let id = store.list_users().await.unwrap()[0].id.unwrap();

        assert_eq!(
            store.set_user_role(id, Role::Admin).await.unwrap(),
            UpdateAck::new(1, 1)
        );
        assert_eq!(
            store.set_user_role(id, Role::Admin).await.unwrap(),
            UpdateAck::new(1, 0)
        );
        assert_eq!(
            store.set_user_role(ObjectId::new(), Role::Admin).await.unwrap(),
            UpdateAck::new(0, 0)
        );
        assert!(store.user_has_role("a@example.com", Role::Admin).await.unwrap());
    }

    #[rocket::async_test]
    async fn enrollment_stops_at_zero_seats() {
        let store = MemoryStore::new();
        let ack = store.insert_class(&class(1)).await.unwrap();
        let id = ObjectId::parse_str(&ack.inserted_id).unwrap();

        assert_eq!(store.enroll_student(id).await.unwrap().matched_count, 1);
        assert_eq!(store.enroll_student(id).await.unwrap().matched_count, 0);

        let stored = store.get_class(id).await.unwrap().unwrap();
        assert_eq!(stored.available_seats, 0);
        assert_eq!(stored.total_student, 1);
    }
}
