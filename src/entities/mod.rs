//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod build;
pub mod category;
pub mod component;
pub mod user;

// Re-export specific types to avoid conflicts
pub use build::{
    AssemblyStatus, BuildComponent, BuildComponents, Column as BuildColumn, Entity as Build,
    Model as BuildModel,
};
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use component::{Column as ComponentColumn, Entity as Component, Model as ComponentModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel, Role};
