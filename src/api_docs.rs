use crate::api;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::health::health_check,
        api::setup::setup,
        api::books::list_books,
        api::books::get_book,
        api::books::create_book,
        api::books::update_book,
        api::books::delete_book,
        api::orders::create_order,
        api::orders::update_order_status,
        api::upload::upload_image,
    ),
    tags(
        (name = "sefer-store", description = "Sefer Store API")
    )
)]
pub struct ApiDoc;
