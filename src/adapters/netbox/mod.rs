pub mod client;
pub mod types;

pub use client::NetboxClient;
pub use types::{InterfacePatch, NbInterface, NbIpAddress, NbVlan};
