pub mod market;
pub mod mturk_client;
pub mod mturk_request;

pub use market::LaborMarket;
pub use mturk_client::MTurkClient;
