// src/domain/subscription_model.rs
use crate::domain::subscription::Subscription;
use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, DbErr};

/// subscriptions テーブルのエンティティ
///
/// (service_name, user_id) の複合主キー。price は CHECK (price > 0) 付きの integer。
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub service_name: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub price: i32,
    pub start_date: NaiveDate,
    #[sea_orm(nullable)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Subscription {
    type Error = DbErr;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        // CHECK 制約があるので負の値は本来あり得ない
        let price = u32::try_from(model.price).map_err(|_| {
            DbErr::Custom(format!(
                "stored price {} for ({}, {}) is out of range",
                model.price, model.service_name, model.user_id
            ))
        })?;

        Ok(Self {
            service_name: model.service_name,
            user_id: model.user_id,
            price,
            start_date: model.start_date,
            end_date: model.end_date,
        })
    }
}

impl ActiveModel {
    /// 検証済みの価格を受け取って挿入用の ActiveModel を組み立てる
    pub fn for_insert(subscription: Subscription, price: i32) -> Self {
        Self {
            service_name: Set(subscription.service_name),
            user_id: Set(subscription.user_id),
            price: Set(price),
            start_date: Set(subscription.start_date),
            end_date: Set(subscription.end_date),
        }
    }
}
