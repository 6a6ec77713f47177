// One module per tool flow; each wires parsers and adapters into a reconciler or a batch job.

pub mod alarm;
pub mod cisco_sync;
pub mod elop;
pub mod nozomi;
pub mod switch_check;
pub mod tcc;

pub use alarm::{AlarmIndexer, IndexSummary};
pub use cisco_sync::CiscoSync;
pub use nozomi::{NozomiCheck, NozomiVlanCheck};
pub use switch_check::{DeviceCheck, PortCheck};
pub use tcc::TccCheck;
