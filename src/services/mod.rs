pub mod broadcast;
pub mod historical;
pub mod repository;
pub mod runner;
pub mod signals;
pub mod store;

pub use broadcast::{BroadcastHub, StrategyBroadcaster};
pub use historical::{
    FallbackHistory, HistoryProvider, JsonFileHistory, MemoryHistory, SyntheticHistory,
};
pub use repository::SymbolRepository;
pub use runner::SignalRunner;
pub use signals::{analyze, BreakoutEngine};
pub use store::{MemoryStrategyStore, StrategySink};
