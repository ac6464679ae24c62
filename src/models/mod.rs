mod candle;
mod instrument;
mod metric_record;
mod quote;

pub use candle::Candle;
pub use instrument::Instrument;
pub use metric_record::{MetricRecord, Partition};
pub use quote::QuoteSnapshot;
