pub mod order_flow_api;
pub mod product_api;

pub use order_flow_api::OrderFlowApi;
pub use product_api::ProductApi;
