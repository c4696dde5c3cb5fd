//! Ice rheology: the flow-rate factor `A` of Glen's flow law.
//!
//! The velocity solve consumes `A` per cell and layer. It is produced by a
//! [`FlowLaw`] from temperature and overburden pressure; the law is chosen
//! once at configuration time.

mod flow_law;

pub use flow_law::{
    ConstantFlowLaw, CuffeyPaterson2010, FlowLaw, FlowParamAMethod, GAS_CONSTANT, MELTING_POINT,
    MELTING_POINT_PRESSURE_SLOPE, PatersonBudd1982, RheologyError, SECONDS_PER_YEAR,
    compute_flow_param_a, homologous_temperature,
};

#[cfg(feature = "parallel")]
pub use flow_law::compute_flow_param_a_parallel;
