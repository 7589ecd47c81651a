//! Standard-mapping layer.
//!
//! Converts the canonical domain vocabulary (invoice type, tax category,
//! electronic-address scheme, output format) to and from the wire codes of
//! each supported e-invoicing standard. Forward mappings are **total**: an
//! unmapped domain value falls back to the standard's documented default and
//! is logged, never an error. Reverse mappings of unknown codes fall back to
//! the canonical defaults (`Invoice` / `Standard`).

pub mod en16931;
pub mod mapper;
pub mod peppol;
pub mod registry;
pub mod us;
pub mod xrechnung;

pub use en16931::En16931Mapper;
pub use mapper::StandardMapper;
pub use peppol::PeppolBisMapper;
pub use registry::MapperRegistry;
pub use us::UsStandardMapper;
pub use xrechnung::XRechnungMapper;
