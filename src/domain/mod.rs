// Domain layer: grant/maDMP models, the funder table and the ports the
// workflows talk to.

pub mod funder;
pub mod madmp;
pub mod model;
pub mod ports;
