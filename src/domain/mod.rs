// Domain layer: plan types and the ports the controller talks to.

pub mod model;
pub mod ports;
