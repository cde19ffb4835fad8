use async_trait::async_trait;
use chrono::{DateTime, Utc};
use commerce::model::*;
use commerce::storage::{
    BackOfficeStorage, BookingStorage, CartStorage, CatalogStorage, OrderStorage,
};
use sea_orm::sea_query::{Expr, Func, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, IntoActiveModel, IsolationLevel, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RuntimeErr, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::entities::{
    booking, cart_item, media, order, order_item, product, profile, property, setting,
};

pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_storefront.sql");

const DEFAULT_CURRENCY: &str = "NGN";
const SERIALIZATION_FAILURE: &str = "40001";
const EXCLUSION_VIOLATION: &str = "23P01";

/// Postgres-backed storage for every storefront seam.
#[derive(Clone)]
pub struct ProdStorefrontStorage {
    pub db: DatabaseConnection,
}

impl ProdStorefrontStorage {
    pub async fn new(database_url: &str) -> Result<Self, GenericError> {
        let db = Database::connect(database_url).await?;
        Ok(Self { db })
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates missing tables, indexes and the booking exclusion constraint.
    pub async fn apply_schema(&self) -> Result<(), GenericError> {
        self.db.execute_unprepared(SCHEMA_SQL).await?;
        info!("Storefront schema is up to date");
        Ok(())
    }

    async fn conflicts_on<C: ConnectionTrait>(
        conn: &C,
        property_id: ModelId,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, GenericError> {
        booking::Entity::find()
            .filter(booking::Column::PropertyId.eq(property_id))
            .filter(
                booking::Column::Status
                    .is_in(BookingStatus::BLOCKING.iter().map(|s| s.to_string())),
            )
            .filter(overlap_condition(stay))
            .order_by_asc(booking::Column::CheckIn)
            .all(conn)
            .await?
            .into_iter()
            .map(to_booking)
            .collect()
    }

    async fn insert_booking(
        txn: DatabaseTransaction,
        booking: &NewBooking,
    ) -> Result<booking::Model, DbErr> {
        let created = booking::ActiveModel {
            id: NotSet,
            property_id: Set(booking.property_id),
            guest_name: Set(booking.guest_name.clone()),
            guest_email: Set(booking.guest_email.clone()),
            guest_phone: Set(booking.guest_phone.clone()),
            guests: Set(booking.guests),
            check_in: Set(booking.stay.check_in),
            check_out: Set(booking.stay.check_out),
            total_price: Set(booking.total_price),
            status: Set(BookingStatus::Pending.to_string()),
            special_requests: Set(booking.special_requests.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;
        Ok(created)
    }

    async fn with_items(&self, orders: Vec<order::Model>) -> Result<Vec<Order>, GenericError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<ModelId> = orders.iter().map(|o| o.id).collect();
        let mut items: HashMap<ModelId, Vec<order_item::Model>> = HashMap::new();
        for item in order_item::Entity::find()
            .filter(order_item::Column::OrderId.is_in(ids))
            .order_by_asc(order_item::Column::Id)
            .all(&self.db)
            .await?
        {
            items.entry(item.order_id).or_default().push(item);
        }

        orders
            .into_iter()
            .map(|o| {
                let lines = items.remove(&o.id).unwrap_or_default();
                to_order(o, lines)
            })
            .collect()
    }

    async fn load_order(&self, model: Option<order::Model>) -> Result<Option<Order>, GenericError> {
        match model {
            Some(model) => Ok(self.with_items(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }
}

/// Any of: new stay starts inside an existing one, an existing one starts inside the
/// new stay, or the new stay contains an existing one. Ranges are half-open.
fn overlap_condition(stay: &StayRange) -> Condition {
    Condition::any()
        .add(
            Condition::all()
                .add(booking::Column::CheckIn.lte(stay.check_in))
                .add(booking::Column::CheckOut.gt(stay.check_in)),
        )
        .add(
            Condition::all()
                .add(booking::Column::CheckIn.gte(stay.check_in))
                .add(booking::Column::CheckIn.lt(stay.check_out)),
        )
        .add(
            Condition::all()
                .add(booking::Column::CheckIn.gte(stay.check_in))
                .add(booking::Column::CheckOut.lte(stay.check_out)),
        )
}

/// Serialization failures and exclusion violations mean a concurrent booking won the dates.
fn is_lost_booking_race(error: &DbErr) -> bool {
    let source = match error {
        DbErr::Exec(RuntimeErr::SqlxError(e))
        | DbErr::Query(RuntimeErr::SqlxError(e))
        | DbErr::Conn(RuntimeErr::SqlxError(e)) => e,
        _ => return false,
    };
    match source {
        sqlx::Error::Database(db_error) => matches!(
            db_error.code().as_deref(),
            Some(SERIALIZATION_FAILURE) | Some(EXCLUSION_VIOLATION)
        ),
        _ => false,
    }
}

fn to_product(model: product::Model) -> Result<Product, GenericError> {
    Ok(Product {
        id: model.id,
        name: model.name,
        slug: model.slug,
        description: model.description,
        category: model.category,
        price: model.price,
        currency: model.currency,
        stock: model.stock,
        images: serde_json::from_value(model.images)?,
        is_featured: model.is_featured,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn to_listing(
    pair: (property::Model, Option<product::Model>),
) -> Option<Result<PropertyListing, GenericError>> {
    let (property, product) = pair;
    let Some(product) = product else {
        warn!(property_id = property.id, "Property without product, skipping");
        return None;
    };
    Some(to_product(product).map(|product| PropertyListing {
        property: Property {
            id: property.id,
            product_id: property.product_id,
            address: property.address,
            city: property.city,
            bedrooms: property.bedrooms,
            bathrooms: property.bathrooms,
            max_guests: property.max_guests,
        },
        product,
    }))
}

fn to_booking(model: booking::Model) -> Result<Booking, GenericError> {
    Ok(Booking {
        id: model.id,
        property_id: model.property_id,
        guest_name: model.guest_name,
        guest_email: model.guest_email,
        guest_phone: model.guest_phone,
        guests: model.guests,
        check_in: model.check_in,
        check_out: model.check_out,
        total_price: model.total_price,
        status: BookingStatus::from_str(&model.status)?,
        special_requests: model.special_requests,
        created_at: model.created_at,
    })
}

fn to_order(model: order::Model, items: Vec<order_item::Model>) -> Result<Order, GenericError> {
    let items = items
        .into_iter()
        .map(|item| {
            Ok(OrderItem {
                product_id: item.product_id,
                product_name: item.product_name,
                unit_price: item.unit_price,
                quantity: u32::try_from(item.quantity)?,
                line_total: item.line_total,
            })
        })
        .collect::<Result<Vec<_>, GenericError>>()?;

    Ok(Order {
        id: model.id,
        order_number: model.order_number,
        customer_email: model.customer_email,
        status: OrderStatus::from_str(&model.status)?,
        items,
        totals: OrderTotals {
            subtotal: model.subtotal,
            tax: model.tax,
            shipping: model.shipping,
            total: model.total,
        },
        currency: model.currency,
        shipping_address: serde_json::from_value(model.shipping_address)?,
        billing_address: serde_json::from_value(model.billing_address)?,
        payment_reference: model.payment_reference,
        paid_at: model.paid_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn to_media(model: media::Model) -> MediaAsset {
    MediaAsset {
        id: model.id,
        file_name: model.file_name,
        url: model.url,
        mime_type: model.mime_type,
        size_bytes: model.size_bytes,
        alt_text: model.alt_text,
        created_at: model.created_at,
    }
}

fn apply_product_input(
    active: &mut product::ActiveModel,
    input: &ProductInput,
    now: DateTime<Utc>,
) -> Result<(), GenericError> {
    active.name = Set(input.name.trim().to_string());
    active.slug = Set(input.slug.clone());
    active.description = Set(input.description.clone());
    active.category = Set(input.category.trim().to_string());
    active.price = Set(input.price);
    active.currency = Set(input
        .currency
        .clone()
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()));
    active.stock = Set(input.stock);
    active.images = Set(serde_json::to_value(&input.images)?);
    active.is_featured = Set(input.is_featured);
    active.is_active = Set(input.is_active);
    active.updated_at = Set(now);
    Ok(())
}

#[async_trait]
impl CatalogStorage for ProdStorefrontStorage {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, GenericError> {
        let mut select = product::Entity::find();
        if !query.include_inactive {
            select = select.filter(product::Column::IsActive.eq(true));
        }
        if let Some(category) = &query.category {
            select = select.filter(product::Column::Category.eq(category.clone()));
        }
        if let Some(featured) = query.featured {
            select = select.filter(product::Column::IsFeatured.eq(featured));
        }
        if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            let lowered_name = Expr::expr(Func::lower(Expr::col(product::Column::Name)));
            select = select.filter(lowered_name.like(pattern));
        }

        select
            .order_by_asc(product::Column::Id)
            .limit(query.page_limit())
            .offset(query.page_offset())
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_product)
            .collect()
    }

    async fn get_product(&self, product_id: ModelId) -> Result<Option<Product>, GenericError> {
        product::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .map(to_product)
            .transpose()
    }

    async fn get_products(&self, product_ids: &[ModelId]) -> Result<Vec<Product>, GenericError> {
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }
        product::Entity::find()
            .filter(product::Column::Id.is_in(product_ids.to_vec()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_product)
            .collect()
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, GenericError> {
        let now = Utc::now();
        let mut active = product::ActiveModel {
            id: NotSet,
            created_at: Set(now),
            ..Default::default()
        };
        apply_product_input(&mut active, input, now)?;
        let created = active.insert(&self.db).await?;
        debug!(product_id = created.id, slug = %created.slug, "Inserted product");
        to_product(created)
    }

    async fn update_product(
        &self,
        product_id: ModelId,
        input: &ProductInput,
    ) -> Result<Option<Product>, GenericError> {
        let Some(existing) = product::Entity::find_by_id(product_id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        apply_product_input(&mut active, input, Utc::now())?;
        let updated = active.update(&self.db).await?;
        to_product(updated).map(Some)
    }

    async fn delete_product(&self, product_id: ModelId) -> Result<bool, GenericError> {
        let result = product::Entity::delete_by_id(product_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count_products(&self) -> Result<u64, GenericError> {
        Ok(product::Entity::find().count(&self.db).await?)
    }

    async fn list_properties(&self) -> Result<Vec<PropertyListing>, GenericError> {
        property::Entity::find()
            .find_also_related(product::Entity)
            .order_by_asc(property::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .filter_map(to_listing)
            .collect()
    }

    async fn get_property(
        &self,
        property_id: ModelId,
    ) -> Result<Option<PropertyListing>, GenericError> {
        property::Entity::find_by_id(property_id)
            .find_also_related(product::Entity)
            .one(&self.db)
            .await?
            .and_then(to_listing)
            .transpose()
    }
}

#[async_trait]
impl BookingStorage for ProdStorefrontStorage {
    async fn find_conflicting_bookings(
        &self,
        property_id: ModelId,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, GenericError> {
        Self::conflicts_on(&self.db, property_id, stay).await
    }

    async fn create_booking_if_available(
        &self,
        booking: &NewBooking,
    ) -> Result<BookingOutcome, GenericError> {
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        let conflicts = Self::conflicts_on(&txn, booking.property_id, &booking.stay).await?;
        if !conflicts.is_empty() {
            txn.rollback().await?;
            return Ok(BookingOutcome::Conflict(conflicts));
        }

        match Self::insert_booking(txn, booking).await {
            Ok(created) => Ok(BookingOutcome::Created(to_booking(created)?)),
            Err(e) if is_lost_booking_race(&e) => {
                warn!(
                    property_id = booking.property_id,
                    error = %e,
                    "Concurrent booking took the dates first"
                );
                let conflicts =
                    Self::conflicts_on(&self.db, booking.property_id, &booking.stay).await?;
                Ok(BookingOutcome::Conflict(conflicts))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_booking(&self, booking_id: ModelId) -> Result<Option<Booking>, GenericError> {
        booking::Entity::find_by_id(booking_id)
            .one(&self.db)
            .await?
            .map(to_booking)
            .transpose()
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, GenericError> {
        let mut select = booking::Entity::find();
        if let Some(property_id) = filter.property_id {
            select = select.filter(booking::Column::PropertyId.eq(property_id));
        }
        if let Some(status) = filter.status {
            select = select.filter(booking::Column::Status.eq(status.to_string()));
        }
        select
            .order_by_desc(booking::Column::CreatedAt)
            .order_by_desc(booking::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_booking)
            .collect()
    }

    async fn update_booking_status(
        &self,
        booking_id: ModelId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, GenericError> {
        let Some(existing) = booking::Entity::find_by_id(booking_id).one(&self.db).await? else {
            return Ok(None);
        };
        let mut active = existing.into_active_model();
        active.status = Set(status.to_string());
        let updated = active.update(&self.db).await?;
        to_booking(updated).map(Some)
    }
}

#[async_trait]
impl OrderStorage for ProdStorefrontStorage {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, GenericError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;

        let created = order::ActiveModel {
            id: NotSet,
            order_number: Set(order.order_number.clone()),
            customer_email: Set(order.customer_email.clone()),
            status: Set(OrderStatus::Pending.to_string()),
            subtotal: Set(order.totals.subtotal),
            tax: Set(order.totals.tax),
            shipping: Set(order.totals.shipping),
            total: Set(order.totals.total),
            currency: Set(order.currency.clone()),
            shipping_address: Set(serde_json::to_value(&order.shipping_address)?),
            billing_address: Set(serde_json::to_value(&order.billing_address)?),
            payment_reference: Set(None),
            paid_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let line = order_item::ActiveModel {
                id: NotSet,
                order_id: Set(created.id),
                product_id: Set(item.product_id),
                product_name: Set(item.product_name.clone()),
                unit_price: Set(item.unit_price),
                quantity: Set(i32::try_from(item.quantity)?),
                line_total: Set(item.line_total),
            }
            .insert(&txn)
            .await?;
            items.push(line);
        }

        txn.commit().await?;
        debug!(order_id = created.id, items = items.len(), "Inserted order");
        to_order(created, items)
    }

    async fn get_order(&self, order_id: ModelId) -> Result<Option<Order>, GenericError> {
        let model = order::Entity::find_by_id(order_id).one(&self.db).await?;
        self.load_order(model).await
    }

    async fn find_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, GenericError> {
        let model = order::Entity::find()
            .filter(order::Column::OrderNumber.eq(order_number))
            .one(&self.db)
            .await?;
        self.load_order(model).await
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, GenericError> {
        let mut select = order::Entity::find();
        if let Some(status) = filter.status {
            select = select.filter(order::Column::Status.eq(status.to_string()));
        }
        if let Some(email) = &filter.customer_email {
            select = select.filter(order::Column::CustomerEmail.eq(email.trim().to_lowercase()));
        }
        let orders = select
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id)
            .all(&self.db)
            .await?;
        self.with_items(orders).await
    }

    async fn update_order_status(
        &self,
        order_id: ModelId,
        status: OrderStatus,
    ) -> Result<Option<Order>, GenericError> {
        let result = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(status.to_string()))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get_order(order_id).await
    }

    async fn mark_order_paid(
        &self,
        order_id: ModelId,
        payment_reference: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, GenericError> {
        // Only a pending, unpaid order moves; a concurrent confirmation finds it already paid.
        let result = order::Entity::update_many()
            .col_expr(order::Column::Status, Expr::value(OrderStatus::Processing.to_string()))
            .col_expr(order::Column::PaymentReference, Expr::value(payment_reference.to_string()))
            .col_expr(order::Column::PaidAt, Expr::value(paid_at))
            .col_expr(order::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(order::Column::Id.eq(order_id))
            .filter(order::Column::Status.eq(OrderStatus::Pending.to_string()))
            .filter(order::Column::PaidAt.is_null())
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            debug!(order_id, "Order was not pending, payment mark skipped");
        }
        self.get_order(order_id).await
    }
}

#[async_trait]
impl CartStorage for ProdStorefrontStorage {
    async fn get_cart(&self, user_email: &str) -> Result<Vec<CartEntry>, GenericError> {
        cart_item::Entity::find()
            .filter(cart_item::Column::UserEmail.eq(user_email))
            .order_by_asc(cart_item::Column::UpdatedAt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| {
                Ok(CartEntry {
                    product_id: row.product_id,
                    quantity: u32::try_from(row.quantity)?,
                })
            })
            .collect()
    }

    async fn set_cart_item(
        &self,
        user_email: &str,
        product_id: ModelId,
        quantity: u32,
    ) -> Result<(), GenericError> {
        if quantity == 0 {
            return self.remove_cart_item(user_email, product_id).await;
        }
        let row = cart_item::ActiveModel {
            user_email: Set(user_email.to_string()),
            product_id: Set(product_id),
            quantity: Set(i32::try_from(quantity)?),
            updated_at: Set(Utc::now()),
        };
        cart_item::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([cart_item::Column::UserEmail, cart_item::Column::ProductId])
                    .update_columns([cart_item::Column::Quantity, cart_item::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn remove_cart_item(
        &self,
        user_email: &str,
        product_id: ModelId,
    ) -> Result<(), GenericError> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserEmail.eq(user_email))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn clear_cart(&self, user_email: &str) -> Result<(), GenericError> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserEmail.eq(user_email))
            .exec(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl BackOfficeStorage for ProdStorefrontStorage {
    async fn list_users(&self) -> Result<Vec<UserProfile>, GenericError> {
        let users = profile::Entity::find()
            .order_by_asc(profile::Column::CreatedAt)
            .order_by_asc(profile::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| UserProfile {
                id: row.id,
                email: row.email,
                full_name: row.full_name,
                phone: row.phone,
                created_at: row.created_at,
            })
            .collect();
        Ok(users)
    }

    async fn list_media(&self) -> Result<Vec<MediaAsset>, GenericError> {
        let assets = media::Entity::find()
            .order_by_desc(media::Column::CreatedAt)
            .order_by_desc(media::Column::Id)
            .all(&self.db)
            .await?;
        Ok(assets.into_iter().map(to_media).collect())
    }

    async fn create_media(&self, asset: &NewMediaAsset) -> Result<MediaAsset, GenericError> {
        let created = media::ActiveModel {
            id: NotSet,
            file_name: Set(asset.file_name.trim().to_string()),
            url: Set(asset.url.clone()),
            mime_type: Set(asset.mime_type.clone()),
            size_bytes: Set(asset.size_bytes),
            alt_text: Set(asset.alt_text.clone()),
            created_at: Set(Utc::now()),
        }
        .insert(&self.db)
        .await?;
        Ok(to_media(created))
    }

    async fn delete_media(&self, media_id: ModelId) -> Result<bool, GenericError> {
        let result = media::Entity::delete_by_id(media_id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn get_settings(&self) -> Result<StoreSettings, GenericError> {
        let settings = setting::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| (row.key, row.value))
            .collect();
        Ok(settings)
    }

    async fn upsert_settings(
        &self,
        settings: &StoreSettings,
    ) -> Result<StoreSettings, GenericError> {
        let now = Utc::now();
        let txn = self.db.begin().await?;
        for (key, value) in settings {
            let row = setting::ActiveModel {
                key: Set(key.clone()),
                value: Set(value.clone()),
                updated_at: Set(now),
            };
            setting::Entity::insert(row)
                .on_conflict(
                    OnConflict::column(setting::Column::Key)
                        .update_columns([setting::Column::Value, setting::Column::UpdatedAt])
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;
        }
        txn.commit().await?;
        self.get_settings().await
    }
}
