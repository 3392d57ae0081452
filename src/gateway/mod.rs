pub mod client;

pub use client::{AsaasClient, GatewayError, PaymentStatus, PixCharge};
