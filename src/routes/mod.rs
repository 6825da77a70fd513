mod cart;
mod categories;
mod health;
mod login;
mod orders;
mod products;
mod register;
mod upload;
mod users;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{AppState, middleware::auth_middleware};

pub fn create_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api", api_router(state))
        .nest_service("/uploads", ServeDir::new(&state.upload.dir))
        .fallback(health::not_found)
}

fn api_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_router(state))
        .nest("/users", users_router())
        .nest("/products", products_router())
        .nest("/categories", categories_router())
        .nest("/cart", cart_router())
        .nest("/orders", orders_router())
        .nest("/upload", upload_router())
}

fn auth_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/register", post(register::register_user))
        .route("/login", post(login::login_user))
        .route(
            "/me",
            get(login::current_user).route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
}

fn users_router() -> Router<AppState> {
    Router::new()
        .route(
            "/profile/{user_id}",
            get(users::get_profile).put(users::update_profile),
        )
        .route("/password/{user_id}", put(users::change_password))
        .route("/login-history", post(users::add_login_history))
        .route("/login-history/{user_id}", get(users::get_login_history))
        .route("/products/{user_id}", get(users::get_user_products))
        .route("/categories/{user_id}", get(users::get_user_categories))
}

fn products_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(products::list_products).post(products::create_product),
        )
        .route("/category/{category_id}", get(products::list_by_category))
        .route(
            "/{id}",
            get(products::get_product).put(products::update_product),
        )
}

fn categories_router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(categories::get_all_categories).post(categories::create_category),
        )
        .route(
            "/{id}",
            get(categories::get_category).put(categories::update_category),
        )
}

fn cart_router() -> Router<AppState> {
    Router::new()
        .route("/{user_id}", get(cart::get_cart))
        .route("/{user_id}/add", post(cart::add_item))
        .route("/{user_id}/update/{product_id}", put(cart::update_item))
        .route(
            "/{user_id}/remove/{product_id}",
            delete(cart::remove_item),
        )
        .route("/{user_id}/promo", post(cart::apply_promo))
}

fn orders_router() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::get_all_orders))
        .route("/create", post(orders::create_order))
        .route("/user/{user_id}", get(orders::get_user_orders))
        .route("/{id}", get(orders::get_order))
        .route("/{id}/status", put(orders::update_order_status))
}

fn upload_router() -> Router<AppState> {
    Router::new()
        .route("/image", post(upload::upload_image))
        .route("/images", post(upload::upload_images))
        .route(
            "/{filename}",
            get(upload::get_file).delete(upload::delete_file),
        )
}
