use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM Product Entity
pub mod product {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "products")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub name: String,
        #[sea_orm(unique)]
        pub slug: String,
        pub description: Option<String>,
        pub category: String,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub price: Decimal,
        pub currency: String,
        pub stock: i32,
        #[sea_orm(column_type = "JsonBinary")]
        pub images: Json,
        pub is_featured: bool,
        pub is_active: bool,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_one = "super::property::Entity")]
        Property,
    }

    impl Related<super::property::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Property.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Property Entity
pub mod property {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "properties")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub product_id: i64,
        pub address: String,
        pub city: String,
        pub bedrooms: i32,
        pub bathrooms: i32,
        pub max_guests: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::product::Entity",
            from = "Column::ProductId",
            to = "super::product::Column::Id"
        )]
        Product,
        #[sea_orm(has_many = "super::booking::Entity")]
        Bookings,
    }

    impl Related<super::product::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Product.def()
        }
    }

    impl Related<super::booking::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Bookings.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Booking Entity
pub mod booking {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "bookings")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub property_id: i64,
        pub guest_name: String,
        pub guest_email: String,
        pub guest_phone: Option<String>,
        pub guests: i32,
        pub check_in: Date,
        pub check_out: Date,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub total_price: Decimal,
        pub status: String,
        pub special_requests: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::property::Entity",
            from = "Column::PropertyId",
            to = "super::property::Column::Id"
        )]
        Property,
    }

    impl Related<super::property::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Property.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Order Entity
pub mod order {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "orders")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub order_number: String,
        pub customer_email: String,
        pub status: String,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub subtotal: Decimal,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub tax: Decimal,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub shipping: Decimal,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub total: Decimal,
        pub currency: String,
        #[sea_orm(column_type = "JsonBinary")]
        pub shipping_address: Json,
        #[sea_orm(column_type = "JsonBinary")]
        pub billing_address: Json,
        pub payment_reference: Option<String>,
        pub paid_at: Option<DateTimeUtc>,
        pub created_at: DateTimeUtc,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::order_item::Entity")]
        OrderItems,
    }

    impl Related<super::order_item::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::OrderItems.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Order Item Entity
pub mod order_item {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "order_items")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub order_id: i64,
        pub product_id: i64,
        pub product_name: String,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub unit_price: Decimal,
        pub quantity: i32,
        #[sea_orm(column_type = "Decimal(Some((14, 2)))")]
        pub line_total: Decimal,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::order::Entity",
            from = "Column::OrderId",
            to = "super::order::Column::Id"
        )]
        Order,
    }

    impl Related<super::order::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Order.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// SeaORM Cart Item Entity, keyed by customer email and product
pub mod cart_item {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "cart_items")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_email: String,
        #[sea_orm(primary_key, auto_increment = false)]
        pub product_id: i64,
        pub quantity: i32,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod profile {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "profiles")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        #[sea_orm(unique)]
        pub email: String,
        pub full_name: Option<String>,
        pub phone: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod media {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "media")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub file_name: String,
        pub url: String,
        pub mime_type: String,
        pub size_bytes: i64,
        pub alt_text: Option<String>,
        pub created_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod setting {
    use super::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "settings")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub key: String,
        #[sea_orm(column_type = "JsonBinary")]
        pub value: Json,
        pub updated_at: DateTimeUtc,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
