#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::StatusCode};
use chrono::{DateTime, NaiveDate, Utc};
use http_body_util::BodyExt;
use mockall::mock;
use rust_decimal::Decimal;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tower::ServiceExt;

use commerce::{
    api::{AppState, router},
    auth::AccessPolicy,
    error::CommerceResult,
    model::*,
    payment::{PaymentGateway, PaymentRequest, PaymentSession, PaymentVerification},
    pricing::PricingPolicy,
    storage::*,
};

pub const ADMIN_EMAIL: &str = "owner@maison.ng";
pub const CUSTOMER_EMAIL: &str = "adaeze@example.ng";
pub const IDENTITY_HEADER: &str = "x-user-email";
pub const CALLBACK_URL: &str = "https://maison.ng/checkout/callback";

mock! {
    pub Gateway {}

    #[async_trait]
    impl PaymentGateway for Gateway {
        async fn initialize(&self, request: &PaymentRequest) -> CommerceResult<PaymentSession>;
        async fn verify(&self, reference: &str) -> CommerceResult<PaymentVerification>;
    }
}

/// Gateway that must not be reached by the test.
pub fn idle_gateway() -> MockGateway {
    MockGateway::new()
}

/// Gateway that hands out a hosted payment page for every order.
pub fn accepting_gateway() -> MockGateway {
    let mut gateway = MockGateway::new();
    gateway.expect_initialize().returning(|request| {
        Ok(PaymentSession {
            authorization_url: format!("https://checkout.paystack.com/{}", request.reference),
            access_code: "ac_test".to_string(),
            reference: request.reference.clone(),
        })
    });
    gateway
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub fn lagos_address() -> Address {
    Address {
        full_name: "Adaeze Okafor".to_string(),
        line1: "12 Bourdillon Road".to_string(),
        line2: Some("Ikoyi".to_string()),
        city: "Lagos".to_string(),
        state: "Lagos".to_string(),
        postal_code: Some("101233".to_string()),
        country: "NG".to_string(),
        phone: Some("+2348000000000".to_string()),
    }
}

pub fn product_input(name: &str, category: &str, price: i64, stock: i32) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        slug: name.to_lowercase().replace(' ', "-"),
        description: Some(format!("{} from the atelier", name)),
        category: category.to_string(),
        price: Decimal::from(price),
        currency: None,
        stock,
        images: vec![],
        is_featured: false,
        is_active: true,
    }
}

#[derive(Default)]
struct Inner {
    next_id: ModelId,
    products: BTreeMap<ModelId, Product>,
    properties: BTreeMap<ModelId, Property>,
    bookings: BTreeMap<ModelId, Booking>,
    orders: BTreeMap<ModelId, Order>,
    carts: HashMap<String, Vec<CartEntry>>,
    users: Vec<UserProfile>,
    media: BTreeMap<ModelId, MediaAsset>,
    settings: StoreSettings,
}

impl Inner {
    fn next_id(&mut self) -> ModelId {
        self.next_id += 1;
        self.next_id
    }

    fn listing(&self, property: &Property) -> Option<PropertyListing> {
        self.products.get(&property.product_id).map(|product| PropertyListing {
            property: property.clone(),
            product: product.clone(),
        })
    }
}

/// In-memory store behind every storage trait. Booking check and insert share one lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    broken: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every subsequent call fails like a lost database connection.
    pub fn break_connection(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, GenericError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err("connection refused".into());
        }
        Ok(self.inner.lock().expect("store lock poisoned"))
    }

    pub fn seed_product(&self, input: ProductInput) -> Product {
        let mut inner = self.inner.lock().expect("store lock");
        let id = inner.next_id();
        let product = to_product(id, &input, Utc::now());
        inner.products.insert(id, product.clone());
        product
    }

    pub fn seed_property(
        &self,
        name: &str,
        nightly_price: i64,
        max_guests: i32,
    ) -> PropertyListing {
        let product = self.seed_product(product_input(name, "real-estate", nightly_price, 1));
        let mut inner = self.inner.lock().expect("store lock");
        let id = inner.next_id();
        let property = Property {
            id,
            product_id: product.id,
            address: "4 Banana Island Road".to_string(),
            city: "Lagos".to_string(),
            bedrooms: 4,
            bathrooms: 5,
            max_guests,
        };
        inner.properties.insert(id, property.clone());
        PropertyListing { property, product }
    }

    pub fn seed_booking(
        &self,
        property_id: ModelId,
        check_in: NaiveDate,
        check_out: NaiveDate,
        status: BookingStatus,
    ) -> Booking {
        let mut inner = self.inner.lock().expect("store lock");
        let id = inner.next_id();
        let booking = Booking {
            id,
            property_id,
            guest_name: "Existing Guest".to_string(),
            guest_email: "existing@example.ng".to_string(),
            guest_phone: None,
            guests: 2,
            check_in,
            check_out,
            total_price: Decimal::from(100_000),
            status,
            special_requests: None,
            created_at: Utc::now(),
        };
        inner.bookings.insert(id, booking.clone());
        booking
    }

    pub fn seed_user(&self, email: &str) -> UserProfile {
        let mut inner = self.inner.lock().expect("store lock");
        let id = inner.next_id();
        let user = UserProfile {
            id,
            email: email.to_string(),
            full_name: None,
            phone: None,
            created_at: Utc::now(),
        };
        inner.users.push(user.clone());
        user
    }

    pub fn bookings(&self) -> Vec<Booking> {
        self.inner.lock().expect("store lock").bookings.values().cloned().collect()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.inner.lock().expect("store lock").orders.values().cloned().collect()
    }

    /// Changes an order behind the service's back, like a concurrent admin edit.
    pub fn set_order_status(&self, order_number: &str, status: OrderStatus) {
        let mut inner = self.inner.lock().expect("store lock");
        if let Some(order) = inner.orders.values_mut().find(|o| o.order_number == order_number) {
            order.status = status;
        }
    }

    pub fn set_product_active(&self, product_id: ModelId, is_active: bool) {
        let mut inner = self.inner.lock().expect("store lock");
        if let Some(product) = inner.products.get_mut(&product_id) {
            product.is_active = is_active;
        }
    }

    pub fn cart(&self, email: &str) -> Vec<CartEntry> {
        self.inner
            .lock()
            .expect("store lock")
            .carts
            .get(email)
            .cloned()
            .unwrap_or_default()
    }
}

fn to_product(id: ModelId, input: &ProductInput, now: DateTime<Utc>) -> Product {
    Product {
        id,
        name: input.name.clone(),
        slug: input.slug.clone(),
        description: input.description.clone(),
        category: input.category.clone(),
        price: input.price,
        currency: input.currency.clone().unwrap_or_else(|| "NGN".to_string()),
        stock: input.stock,
        images: input.images.clone(),
        is_featured: input.is_featured,
        is_active: input.is_active,
        created_at: now,
        updated_at: now,
    }
}

#[async_trait]
impl CatalogStorage for MemoryStore {
    async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>, GenericError> {
        let inner = self.lock()?;
        let search = query.search.as_deref().map(str::to_lowercase);
        Ok(inner
            .products
            .values()
            .filter(|p| query.include_inactive || p.is_active)
            .filter(|p| query.category.as_deref().is_none_or(|c| p.category == c))
            .filter(|p| query.featured.is_none_or(|f| p.is_featured == f))
            .filter(|p| search.as_deref().is_none_or(|s| p.name.to_lowercase().contains(s)))
            .skip(query.page_offset() as usize)
            .take(query.page_limit() as usize)
            .cloned()
            .collect())
    }

    async fn get_product(&self, product_id: ModelId) -> Result<Option<Product>, GenericError> {
        Ok(self.lock()?.products.get(&product_id).cloned())
    }

    async fn get_products(&self, product_ids: &[ModelId]) -> Result<Vec<Product>, GenericError> {
        let inner = self.lock()?;
        Ok(product_ids
            .iter()
            .filter_map(|id| inner.products.get(id).cloned())
            .collect())
    }

    async fn create_product(&self, input: &ProductInput) -> Result<Product, GenericError> {
        let mut inner = self.lock()?;
        let id = inner.next_id();
        let product = to_product(id, input, Utc::now());
        inner.products.insert(id, product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        product_id: ModelId,
        input: &ProductInput,
    ) -> Result<Option<Product>, GenericError> {
        let mut inner = self.lock()?;
        let Some(existing) = inner.products.get(&product_id).cloned() else {
            return Ok(None);
        };
        let mut product = to_product(product_id, input, Utc::now());
        product.created_at = existing.created_at;
        inner.products.insert(product_id, product.clone());
        Ok(Some(product))
    }

    async fn delete_product(&self, product_id: ModelId) -> Result<bool, GenericError> {
        Ok(self.lock()?.products.remove(&product_id).is_some())
    }

    async fn count_products(&self) -> Result<u64, GenericError> {
        Ok(self.lock()?.products.len() as u64)
    }

    async fn list_properties(&self) -> Result<Vec<PropertyListing>, GenericError> {
        let inner = self.lock()?;
        Ok(inner
            .properties
            .values()
            .filter_map(|p| inner.listing(p))
            .collect())
    }

    async fn get_property(
        &self,
        property_id: ModelId,
    ) -> Result<Option<PropertyListing>, GenericError> {
        let inner = self.lock()?;
        Ok(inner.properties.get(&property_id).and_then(|p| inner.listing(p)))
    }
}

#[async_trait]
impl BookingStorage for MemoryStore {
    async fn find_conflicting_bookings(
        &self,
        property_id: ModelId,
        stay: &StayRange,
    ) -> Result<Vec<Booking>, GenericError> {
        let inner = self.lock()?;
        Ok(inner
            .bookings
            .values()
            .filter(|b| b.conflicts_with(property_id, stay))
            .cloned()
            .collect())
    }

    async fn create_booking_if_available(
        &self,
        booking: &NewBooking,
    ) -> Result<BookingOutcome, GenericError> {
        let mut inner = self.lock()?;
        let conflicts: Vec<Booking> = inner
            .bookings
            .values()
            .filter(|b| b.conflicts_with(booking.property_id, &booking.stay))
            .cloned()
            .collect();
        if !conflicts.is_empty() {
            return Ok(BookingOutcome::Conflict(conflicts));
        }

        let id = inner.next_id();
        let created = Booking {
            id,
            property_id: booking.property_id,
            guest_name: booking.guest_name.clone(),
            guest_email: booking.guest_email.clone(),
            guest_phone: booking.guest_phone.clone(),
            guests: booking.guests,
            check_in: booking.stay.check_in,
            check_out: booking.stay.check_out,
            total_price: booking.total_price,
            status: BookingStatus::Pending,
            special_requests: booking.special_requests.clone(),
            created_at: Utc::now(),
        };
        inner.bookings.insert(id, created.clone());
        Ok(BookingOutcome::Created(created))
    }

    async fn get_booking(&self, booking_id: ModelId) -> Result<Option<Booking>, GenericError> {
        Ok(self.lock()?.bookings.get(&booking_id).cloned())
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, GenericError> {
        let inner = self.lock()?;
        Ok(inner.bookings.values().filter(|b| filter.matches(b)).cloned().collect())
    }

    async fn update_booking_status(
        &self,
        booking_id: ModelId,
        status: BookingStatus,
    ) -> Result<Option<Booking>, GenericError> {
        let mut inner = self.lock()?;
        Ok(inner.bookings.get_mut(&booking_id).map(|booking| {
            booking.status = status;
            booking.clone()
        }))
    }
}

#[async_trait]
impl OrderStorage for MemoryStore {
    async fn create_order(&self, order: &NewOrder) -> Result<Order, GenericError> {
        let mut inner = self.lock()?;
        let id = inner.next_id();
        let now = Utc::now();
        let created = Order {
            id,
            order_number: order.order_number.clone(),
            customer_email: order.customer_email.clone(),
            status: OrderStatus::Pending,
            items: order.items.clone(),
            totals: order.totals,
            currency: order.currency.clone(),
            shipping_address: order.shipping_address.clone(),
            billing_address: order.billing_address.clone(),
            payment_reference: None,
            paid_at: None,
            created_at: now,
            updated_at: now,
        };
        inner.orders.insert(id, created.clone());
        Ok(created)
    }

    async fn get_order(&self, order_id: ModelId) -> Result<Option<Order>, GenericError> {
        Ok(self.lock()?.orders.get(&order_id).cloned())
    }

    async fn find_order_by_number(
        &self,
        order_number: &str,
    ) -> Result<Option<Order>, GenericError> {
        Ok(self
            .lock()?
            .orders
            .values()
            .find(|o| o.order_number == order_number)
            .cloned())
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, GenericError> {
        let inner = self.lock()?;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_order_status(
        &self,
        order_id: ModelId,
        status: OrderStatus,
    ) -> Result<Option<Order>, GenericError> {
        let mut inner = self.lock()?;
        Ok(inner.orders.get_mut(&order_id).map(|order| {
            order.status = status;
            order.updated_at = Utc::now();
            order.clone()
        }))
    }

    async fn mark_order_paid(
        &self,
        order_id: ModelId,
        payment_reference: &str,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Order>, GenericError> {
        let mut inner = self.lock()?;
        Ok(inner.orders.get_mut(&order_id).map(|order| {
            if order.status == OrderStatus::Pending && order.paid_at.is_none() {
                order.status = OrderStatus::Processing;
                order.payment_reference = Some(payment_reference.to_string());
                order.paid_at = Some(paid_at);
                order.updated_at = Utc::now();
            }
            order.clone()
        }))
    }
}

#[async_trait]
impl CartStorage for MemoryStore {
    async fn get_cart(&self, user_email: &str) -> Result<Vec<CartEntry>, GenericError> {
        Ok(self.lock()?.carts.get(user_email).cloned().unwrap_or_default())
    }

    async fn set_cart_item(
        &self,
        user_email: &str,
        product_id: ModelId,
        quantity: u32,
    ) -> Result<(), GenericError> {
        let mut inner = self.lock()?;
        let cart = inner.carts.entry(user_email.to_string()).or_default();
        cart.retain(|entry| entry.product_id != product_id);
        if quantity > 0 {
            cart.push(CartEntry { product_id, quantity });
        }
        Ok(())
    }

    async fn remove_cart_item(
        &self,
        user_email: &str,
        product_id: ModelId,
    ) -> Result<(), GenericError> {
        let mut inner = self.lock()?;
        if let Some(cart) = inner.carts.get_mut(user_email) {
            cart.retain(|entry| entry.product_id != product_id);
        }
        Ok(())
    }

    async fn clear_cart(&self, user_email: &str) -> Result<(), GenericError> {
        self.lock()?.carts.remove(user_email);
        Ok(())
    }
}

#[async_trait]
impl BackOfficeStorage for MemoryStore {
    async fn list_users(&self) -> Result<Vec<UserProfile>, GenericError> {
        Ok(self.lock()?.users.clone())
    }

    async fn list_media(&self) -> Result<Vec<MediaAsset>, GenericError> {
        Ok(self.lock()?.media.values().cloned().collect())
    }

    async fn create_media(&self, asset: &NewMediaAsset) -> Result<MediaAsset, GenericError> {
        let mut inner = self.lock()?;
        let id = inner.next_id();
        let media = MediaAsset {
            id,
            file_name: asset.file_name.clone(),
            url: asset.url.clone(),
            mime_type: asset.mime_type.clone(),
            size_bytes: asset.size_bytes,
            alt_text: asset.alt_text.clone(),
            created_at: Utc::now(),
        };
        inner.media.insert(id, media.clone());
        Ok(media)
    }

    async fn delete_media(&self, media_id: ModelId) -> Result<bool, GenericError> {
        Ok(self.lock()?.media.remove(&media_id).is_some())
    }

    async fn get_settings(&self) -> Result<StoreSettings, GenericError> {
        Ok(self.lock()?.settings.clone())
    }

    async fn upsert_settings(
        &self,
        settings: &StoreSettings,
    ) -> Result<StoreSettings, GenericError> {
        let mut inner = self.lock()?;
        inner.settings.extend(settings.clone());
        Ok(inner.settings.clone())
    }
}

pub fn test_state(store: Arc<MemoryStore>, gateway: MockGateway) -> AppState {
    let access =
        AccessPolicy::new(IDENTITY_HEADER, &[ADMIN_EMAIL.to_string()]).expect("access policy");
    AppState::new(
        store,
        Arc::new(gateway),
        PricingPolicy::default(),
        CALLBACK_URL.to_string(),
        access,
    )
}

pub fn test_app(store: Arc<MemoryStore>, gateway: MockGateway) -> Router {
    router(test_state(store, gateway))
}

/// Sends a request through the router and decodes the JSON body (Null when empty).
pub async fn send(app: &Router, request: http::Request<String>) -> (StatusCode, Value) {
    let (parts, body) = request.into_parts();
    let request = http::Request::from_parts(parts, Body::from(body));
    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body collects")
        .to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, json)
}

pub fn as_decimal(value: &Value) -> Decimal {
    let number = value.as_f64().expect("numeric amount");
    Decimal::try_from(number).expect("finite amount")
}
