//! Workstead Engine — identity provisioning, tenant lifecycle and
//! work-policy orchestration.
//!
//! Services here are generic over the `workstead-core` repository and
//! collaborator traits. Every mutating operation re-resolves the role
//! policy and validates its input before any write reaches storage;
//! multi-entity writes go through the transactional provisioning
//! repository; side effects (email, realtime fan-out) run after commit
//! and never roll anything back.

pub mod input;
pub mod lifecycle;
pub mod provisioner;
pub mod work_policy;
