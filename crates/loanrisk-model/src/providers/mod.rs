pub mod http;
pub mod logistic;

pub use http::HttpClassifierProvider;
pub use logistic::LogisticClassifierProvider;
