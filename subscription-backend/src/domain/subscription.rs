// src/domain/subscription.rs
use chrono::NaiveDate;
use uuid::Uuid;

/// 定期サブスクリプション1件
///
/// `(service_name, user_id)` が識別子。`end_date` が `None` なら継続中。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub service_name: String,
    pub user_id: Uuid,
    pub price: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl Subscription {
    /// 有効期間が [start, end] と1日でも重なるか
    ///
    /// 部分的に重なる場合も含む（按分はしない）。
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date <= end && self.end_date.is_none_or(|end_date| end_date >= start)
    }

    /// 識別子以外の可変フィールドを置き換える
    pub fn apply(&mut self, changes: &SubscriptionChanges) {
        self.price = changes.price;
        self.start_date = changes.start_date;
        self.end_date = changes.end_date;
    }
}

/// 更新で置き換えられるフィールド（識別子は含まない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionChanges {
    pub price: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

/// 期間内の合計金額を求めるクエリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceRangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub service_name: Option<String>,
    pub user_id: Option<Uuid>,
}

impl PriceRangeQuery {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            service_name: None,
            user_id: None,
        }
    }

    pub fn with_service_name(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// 空文字のサービス名はフィルタ無効として扱う
    pub fn service_filter(&self) -> Option<&str> {
        self.service_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    pub fn is_valid_range(&self) -> bool {
        self.start <= self.end
    }

    /// 集計対象になるか（期間の重なり + 任意フィルタ）
    pub fn matches(&self, subscription: &Subscription) -> bool {
        subscription.overlaps(self.start, self.end)
            && self
                .service_filter()
                .is_none_or(|name| subscription.service_name == name)
            && self.user_id.is_none_or(|id| subscription.user_id == id)
    }
}
