//! User registration and payment-method bookkeeping.

use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{EngineError, PaymentMethod, ResultEngine, User, payment_methods, users};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

impl Engine {
    /// Returns the user registered under a phone number, creating them on
    /// first contact. An existing user is returned untouched.
    pub async fn ensure_user(&self, phone: &str, name: &str) -> ResultEngine<User> {
        let phone = normalize_required_text(phone, "phone")?;
        let name = normalize_required_text(name, "name")?;

        with_tx!(self, |db_tx| {
            if let Some(existing) = self.user_model_by_phone(&db_tx, &phone).await? {
                return Ok(User::from(existing));
            }

            let model = users::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(name.clone()),
                phone: ActiveValue::Set(phone.clone()),
            }
            .insert(&db_tx)
            .await?;

            tracing::info!(user = model.id, "user registered");
            Ok(User::from(model))
        })
    }

    /// Looks a user up by phone number.
    pub async fn user_by_phone(&self, phone: &str) -> ResultEngine<Option<User>> {
        with_tx!(self, |db_tx| {
            Ok(self
                .user_model_by_phone(&db_tx, phone.trim())
                .await?
                .map(User::from))
        })
    }

    /// Changes a user's display name. The phone identifier never changes.
    pub async fn rename_user(&self, user_id: i32, name: &str) -> ResultEngine<User> {
        let name = normalize_required_text(name, "name")?;

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = users::ActiveModel {
                id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(User::from(model))
        })
    }

    /// Registers a payment method for a user ("how to pay me").
    pub async fn add_payment_method(
        &self,
        user_id: i32,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<PaymentMethod> {
        let name = normalize_required_text(name, "payment method name")?;
        let description = normalize_optional_text(description);

        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;

            let existing = payment_methods::Entity::find()
                .filter(payment_methods::Column::UserId.eq(user_id))
                .filter(payment_methods::Column::Name.eq(name.clone()))
                .one(&db_tx)
                .await?;
            if existing.is_some() {
                return Err(EngineError::Conflict(format!(
                    "payment method '{name}' already registered"
                )));
            }

            let model = payment_methods::ActiveModel {
                id: ActiveValue::NotSet,
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name.clone()),
                description: ActiveValue::Set(description.clone()),
            }
            .insert(&db_tx)
            .await?;
            Ok(PaymentMethod::from(model))
        })
    }

    /// Lists a user's registered payment methods, oldest first.
    pub async fn payment_methods_of(&self, user_id: i32) -> ResultEngine<Vec<PaymentMethod>> {
        with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.payment_method_models_in_tx(&db_tx, user_id).await
        })
    }

    pub(super) async fn payment_method_models_in_tx(
        &self,
        db: &sea_orm::DatabaseTransaction,
        user_id: i32,
    ) -> ResultEngine<Vec<PaymentMethod>> {
        let models = payment_methods::Entity::find()
            .filter(payment_methods::Column::UserId.eq(user_id))
            .order_by_asc(payment_methods::Column::Id)
            .all(db)
            .await?;
        Ok(models.into_iter().map(PaymentMethod::from).collect())
    }
}
