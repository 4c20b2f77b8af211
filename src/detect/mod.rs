mod adapter;
mod annotate;
mod backend;
mod backends;
mod result;

pub use adapter::{decode_image, detect_vehicles, DetectionOutput};
#[cfg(feature = "backend-tract")]
pub use adapter::shared_backend;
pub use backend::DetectorBackend;
pub use backends::StubBackend;
#[cfg(feature = "backend-tract")]
pub use backends::TractBackend;
pub use result::{suppress_overlaps, Detection, COCO_CLASSES, VEHICLE_CLASS_IDS};
