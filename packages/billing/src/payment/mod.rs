pub mod service;
pub mod storage;
pub mod toss;
pub mod types;

pub use service::PaymentService;
pub use storage::PaymentStorage;
pub use toss::{TossClient, TossPayment};
pub use types::{CancelPaymentInput, ConfirmPaymentInput, CreatePaymentInput, Payment, PaymentList};
