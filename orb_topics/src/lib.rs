//! Generated ORB topic definitions.
//!
//! One module per message definition. Each record is a `#[repr(C)]` struct
//! whose field order matches its descriptor string, with a compile-time size
//! check against the descriptor's computed layout.
//!
//! [`build_registry`] registers every topic of this build and returns the
//! sealed registry.

pub mod adc_report;
pub mod ids;
pub mod mavlink_log;

pub use adc_report::AdcReport;
pub use ids::OrbId;
pub use mavlink_log::MavlinkLog;

use orb::registry::{DescriptorPolicy, RegistryError, TopicRegistry};
use tracing::{info, warn};

/// Register every generated topic into `registry`.
///
/// # Errors
///
/// Any registration failure. A duplicate name or id here is a build defect.
pub fn register_all(registry: &mut TopicRegistry) -> Result<(), RegistryError> {
    let registrations = [
        registry.register_topic::<MavlinkLog>()?,
        registry.register_topic::<AdcReport>()?,
    ];
    for reg in registrations.iter().filter(|r| !r.is_clean()) {
        if let Some(topic) = OrbId::from_u16(reg.numeric_id) {
            warn!(topic = topic.name(), "generated topic registered with descriptor issue");
        }
    }
    Ok(())
}

/// Build and seal the registry for this build's topics.
///
/// # Errors
///
/// See [`register_all`]. Startup must abort on any error.
pub fn build_registry(policy: DescriptorPolicy) -> Result<TopicRegistry, RegistryError> {
    let mut registry = TopicRegistry::with_policy(policy);
    register_all(&mut registry)?;
    registry.seal();
    info!(topics = registry.len(), ?policy, "generated topics registered");
    Ok(registry)
}
