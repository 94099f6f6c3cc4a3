use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    cart::CartLine,
    dto::{
        cart::{AddToCartRequest, CartView},
        items::{CategoryList, CreateCategoryRequest, CreateItemRequest, ItemList, UpdateItemRequest},
        orders::{AdminOrderList, OrderList, OrderWithItems, PlaceOrderRequest},
        payments::{AccessTokenResponse, CreatePaymentRequest},
    },
    models::{CartEntry, Category, Item, Order, OrderItem, Payment, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, cart, catalog, health, orders, params},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        catalog::list_menu,
        catalog::item_detail,
        catalog::list_categories,
        cart::view_cart,
        cart::add_to_cart,
        cart::remove_from_cart,
        orders::list_orders,
        orders::place_order,
        orders::get_order,
        orders::cancel_order,
        orders::create_payment,
        admin::create_item,
        admin::update_item,
        admin::delete_item,
        admin::create_category,
        admin::delete_category,
        admin::list_all_orders,
        admin::update_order_status,
        admin::delete_order,
        admin::list_users,
        admin::promote_user,
        admin::payment_token
    ),
    components(
        schemas(
            User,
            Category,
            Item,
            CartEntry,
            CartLine,
            Order,
            OrderItem,
            Payment,
            AddToCartRequest,
            CartView,
            CreateItemRequest,
            UpdateItemRequest,
            CreateCategoryRequest,
            ItemList,
            CategoryList,
            PlaceOrderRequest,
            OrderList,
            OrderWithItems,
            AdminOrderList,
            CreatePaymentRequest,
            AccessTokenResponse,
            admin::UpdateOrderStatusRequest,
            admin::PromoteUserRequest,
            admin::UserList,
            params::Pagination,
            params::MenuQuery,
            params::OrderListQuery,
            Meta,
            ApiResponse<Item>,
            ApiResponse<ItemList>,
            ApiResponse<CartView>,
            ApiResponse<OrderWithItems>,
            ApiResponse<OrderList>,
            ApiResponse<AdminOrderList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Catalog", description = "Menu and category endpoints"),
        (name = "Cart", description = "Cart endpoints"),
        (name = "Orders", description = "Order and payment endpoints"),
        (name = "Admin", description = "Dashboard endpoints"),
        (name = "Auth", description = "Authentication endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
