// src/api/handlers/subscription_handler.rs
use crate::api::dto::subscription_dto::{
    CreateSubscriptionDto, RangePriceRequestDto, RangePriceResponseDto, SubscriptionDto,
    UpdateSubscriptionDto,
};
use crate::api::AppState;
use crate::domain::{PriceRangeQuery, Subscription, SubscriptionChanges};
use crate::error::AppResult;
use crate::extractors::{SubscriptionPath, ValidatedJson};
use crate::types::ApiResponse;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tracing::{debug, info};

// --- CRUD Handlers ---

pub async fn create_subscription_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateSubscriptionDto>,
) -> AppResult<impl IntoResponse> {
    let subscription = Subscription::from(payload);

    info!(
        service_name = %subscription.service_name,
        user_id = %subscription.user_id,
        "Creating subscription"
    );

    app_state.store.create(subscription.clone()).await?;

    info!(
        service_name = %subscription.service_name,
        user_id = %subscription.user_id,
        "Subscription created"
    );

    Ok(ApiResponse::success_with_message(
        "Subscription created",
        SubscriptionDto::from(subscription),
    ))
}

pub async fn get_subscription_handler(
    State(app_state): State<AppState>,
    path: SubscriptionPath,
) -> AppResult<impl IntoResponse> {
    let subscription = app_state
        .store
        .read(&path.service_name, path.user_id)
        .await?;

    Ok(ApiResponse::success(SubscriptionDto::from(subscription)))
}

pub async fn update_subscription_handler(
    State(app_state): State<AppState>,
    path: SubscriptionPath,
    ValidatedJson(payload): ValidatedJson<UpdateSubscriptionDto>,
) -> AppResult<impl IntoResponse> {
    let changes = SubscriptionChanges::from(payload);

    app_state
        .store
        .update(&path.service_name, path.user_id, changes.clone())
        .await?;

    info!(
        service_name = %path.service_name,
        user_id = %path.user_id,
        "Subscription updated"
    );

    let updated = Subscription {
        service_name: path.service_name,
        user_id: path.user_id,
        price: changes.price,
        start_date: changes.start_date,
        end_date: changes.end_date,
    };

    Ok(ApiResponse::success_with_message(
        "Subscription updated",
        SubscriptionDto::from(updated),
    ))
}

pub async fn delete_subscription_handler(
    State(app_state): State<AppState>,
    path: SubscriptionPath,
) -> AppResult<impl IntoResponse> {
    app_state
        .store
        .delete(&path.service_name, path.user_id)
        .await?;

    info!(
        service_name = %path.service_name,
        user_id = %path.user_id,
        "Subscription deleted"
    );

    Ok(ApiResponse::message("Subscription deleted"))
}

pub async fn list_subscriptions_handler(
    State(app_state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let subscriptions = app_state.store.list().await?;

    debug!(count = subscriptions.len(), "Listed subscriptions");

    let dtos: Vec<SubscriptionDto> = subscriptions.into_iter().map(Into::into).collect();
    Ok(ApiResponse::success(dtos))
}

// --- Aggregation ---

pub async fn range_price_handler(
    State(app_state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RangePriceRequestDto>,
) -> AppResult<impl IntoResponse> {
    let query = PriceRangeQuery::from(payload);
    let (start_date, end_date) = (query.start, query.end);

    let price = app_state.store.range_price(query).await?;

    info!(%start_date, %end_date, price, "Calculated range price");

    Ok(ApiResponse::success_with_message(
        "Range price calculated",
        RangePriceResponseDto {
            start_date,
            end_date,
            price,
        },
    ))
}

// --- Router Setup ---

pub fn subscription_router(app_state: AppState) -> Router {
    Router::new()
        .route(
            "/subscriptions",
            get(list_subscriptions_handler).post(create_subscription_handler),
        )
        .route("/subscriptions/range-price", post(range_price_handler))
        .route(
            "/subscriptions/{service_name}/{user_id}",
            get(get_subscription_handler)
                .put(update_subscription_handler)
                .delete(delete_subscription_handler),
        )
        .with_state(app_state)
}
