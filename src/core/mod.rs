/// Acting-user context and role checks
pub mod access;
/// Priority-weighted budget allocation
pub mod budget;
/// Build submission and assembly lifecycle
pub mod build;
/// Category management
pub mod category;
/// Compatibility rules over a set of parts
pub mod compatibility;
/// Component catalog operations
pub mod component;
/// Interactive build composition
pub mod composer;
/// Normalized part records fed to the checker and allocator
pub mod part;
/// Catalog seeding
pub mod seed;
/// Budget-filtered candidate selection
pub mod selection;
/// User registry
pub mod user;
