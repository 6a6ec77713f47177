// Domain layer: records shared by every tool and the seams (ports) the tools are written against.

pub mod device;
pub mod model;
pub mod ports;
