pub mod error;
pub mod mock;
pub mod orchestrator;
pub mod policy;
pub mod replica;
pub mod types;

pub use error::{ReplicaError, ReplicaResult, Step, StopError, StopResult};
pub use mock::{Call, MockReplica, Op};
pub use orchestrator::{Phase, SafeStop, StopReport};
pub use policy::StopPolicy;
pub use replica::Replica;
pub use types::{
    Channel, Dialect, PositionWaitResult, ReplicationStatus, SourcePosition, SslMode,
    WAIT_TIMED_OUT, ZERO_LAG,
};
