//! The metrics that ship with appraise.
//!
//! Every metric reads only the resolved local copy of an artifact, or of the code or
//! dataset linked to it.

mod bus_factor;
mod code_quality;
mod dataset_and_code;
mod dataset_quality;
mod license;
mod performance_claims;
mod ramp_up_time;
pub(crate) mod readme;
mod size;

pub use bus_factor::BusFactorMetric;
pub use code_quality::CodeQualityMetric;
pub use dataset_and_code::DatasetAndCodeMetric;
pub use dataset_quality::DatasetQualityMetric;
pub use license::LicenseMetric;
pub use performance_claims::PerformanceClaimsMetric;
pub use ramp_up_time::RampUpTimeMetric;
pub use size::SizeMetric;
