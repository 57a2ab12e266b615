//! SurrealDB repository implementations for the `workstead-core`
//! repository traits.

mod directory;
mod org_unit;
mod organization;
mod provisioning;
mod token;
mod user;
mod work_policy;

pub use directory::SurrealDirectoryRepository;
pub use org_unit::SurrealOrgUnitRepository;
pub use organization::SurrealOrganizationRepository;
pub use provisioning::SurrealProvisioningRepository;
pub use token::SurrealTokenRepository;
pub use user::SurrealUserRepository;
pub use work_policy::SurrealWorkPolicyRepository;
