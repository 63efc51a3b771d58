//! Record types
//!
//! - [`ProductionBatch`] - a production lot with its nominal dimensions
//! - [`SampleMeasurement`] - one laboratory sample tested at one stage
//! - [`IsoStandard`] - a reference standards catalog row
//! - [`EnergyConsumption`], [`WasteRecord`], [`RawMaterial`] - plant resource logs

pub mod batch;
pub mod energy;
pub mod material;
pub mod quantity;
pub mod sample;
pub mod standard;
pub mod waste;

pub use batch::{BatchStatus, NominalBatchDimensions, ProductFormat, ProductionBatch};
pub use energy::{EnergyConsumption, EnergySource};
pub use material::RawMaterial;
pub use quantity::QuantityError;
pub use sample::{EvaluationMode, Outcome, PeiClass, SampleMeasurement, TestStage};
pub use standard::{default_catalog, IsoStandard, StandardCatalog};
pub use waste::{DisposalMethod, WasteRecord, WasteType};
