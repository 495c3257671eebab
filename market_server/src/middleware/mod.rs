mod hmac;

pub use hmac::{HmacMiddlewareFactory, HmacMiddlewareService};
