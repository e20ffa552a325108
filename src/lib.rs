pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::{OrderService, ProductService};
use domain::ports::Store;
use handlers::{inventories, orders};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    conn.run_pending_migrations(MIGRATIONS)?;
    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        orders::list_orders,
        orders::create_order,
        orders::get_order,
        orders::update_order,
        orders::delete_order,
        orders::add_order_item,
        orders::remove_order_item,
        inventories::list_inventories,
        inventories::create_inventory,
        inventories::get_inventory,
        inventories::update_inventory,
        inventories::delete_inventory,
    ),
    tags(
        (name = "orders", description = "Orders and their line items"),
        (name = "inventories", description = "Inventory items and stock"),
    )
)]
pub struct ApiDoc;

/// Registers services and routes on top of `store`.
pub fn configure(store: Arc<dyn Store>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(OrderService::new(store.clone())))
            .app_data(web::Data::new(ProductService::new(store)))
            .app_data(handlers::json_config())
            .service(
                web::scope("/orders")
                    .service(
                        web::resource("")
                            .route(web::get().to(orders::list_orders))
                            .route(web::post().to(orders::create_order)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(orders::get_order))
                            .route(web::put().to(orders::update_order))
                            .route(web::delete().to(orders::delete_order)),
                    )
                    .service(
                        web::resource("/{id}/order_item")
                            .route(web::post().to(orders::add_order_item))
                            .route(web::delete().to(orders::remove_order_item)),
                    ),
            )
            .service(
                web::scope("/inventories")
                    .service(
                        web::resource("")
                            .route(web::get().to(inventories::list_inventories))
                            .route(web::post().to(inventories::create_inventory)),
                    )
                    .service(
                        web::resource("/{slug}")
                            .route(web::get().to(inventories::get_inventory))
                            .route(web::put().to(inventories::update_inventory))
                            .route(web::delete().to(inventories::delete_inventory)),
                    ),
            );
    }
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    store: Arc<dyn Store>,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let openapi = ApiDoc::openapi();
    Ok(HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .configure(configure(store.clone()))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
