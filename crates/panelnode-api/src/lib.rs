// panelnode-api: panel client bootstrap for proxy nodes
//
// Validates node identity, builds the authenticated HTTP client, and loads
// the node's local destination rules into the same model the panel's
// rules use.

pub mod client;
pub mod error;
pub mod local_rules;
pub mod node;
pub mod report;
pub mod rule;
pub mod transport;

pub use client::{ClientConfig, PanelClient};
pub use error::Error;
pub use local_rules::load_local_rules;
pub use node::NodeType;
pub use report::{MemoryReporter, Reporter, Severity, TracingReporter};
pub use rule::{DestinationRule, LOCAL_RULE_ID, RuleList, RuleOrigin};
pub use transport::{DEFAULT_TIMEOUT, RetryPolicy, TransportConfig};
