//! Adapters behind the domain ports: stores, the payment gateway client and
//! notification delivery.

pub mod in_memory;
pub mod notifier;
pub mod razorpay;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
