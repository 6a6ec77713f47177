// Adapters layer: clients for the external systems the tools talk to, and the terminal.

pub mod elastic;
pub mod netbox;
pub mod prompt;
pub mod stid;
