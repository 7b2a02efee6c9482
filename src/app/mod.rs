// Application layer: ports the library drives and the adapters in `infra` implement

pub mod ports;
