pub mod coordinate;
pub mod device;
pub mod trip;

pub use coordinate::Coordinate;
pub use device::{BatteryLevel, Device, DeviceKind, DeviceStatus};
pub use trip::Trip;
