pub mod binance;
pub mod bybit;
pub mod gate;
pub mod kucoin;
pub mod okx;

pub use binance::BinanceAdapter;
pub use bybit::BybitAdapter;
pub use gate::GateAdapter;
pub use kucoin::KucoinAdapter;
pub use okx::OkxAdapter;
