//! Category business logic - admin-managed component groupings.
//!
//! Names are trimmed and upper-cased before they are stored or compared. A category cannot
//! be deleted while any component still refers to it; deactivating it instead keeps it out
//! of budget allocation without touching the catalog.

use crate::{
    core::{access::Actor, budget::MAX_PRIORITY, part::normalize_category},
    entities::{Category, Component, Role, category, component},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, warn};

/// Fields an admin may change on a category; `None` leaves the field as is
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    /// New name
    pub name: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New active flag
    pub is_active: Option<bool>,
    /// New priority, at least 1
    pub priority: Option<i32>,
}

/// Lists categories ordered by name; inactive ones only when asked for.
pub async fn list_categories(
    db: &DatabaseConnection,
    include_inactive: bool,
) -> Result<Vec<category::Model>> {
    let mut query = Category::find();
    if !include_inactive {
        query = query.filter(category::Column::IsActive.eq(true));
    }
    query
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by id.
pub async fn get_category_by_id(
    db: &DatabaseConnection,
    category_id: i64,
) -> Result<Option<category::Model>> {
    Category::find_by_id(category_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a category by name (case-insensitive).
pub async fn get_category_by_name<C>(db: &C, name: &str) -> Result<Option<category::Model>>
where
    C: ConnectionTrait,
{
    Category::find()
        .filter(category::Column::Name.eq(normalize_category(name)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a category. Admin only.
///
/// # Errors
/// Returns an error if the name is blank, the priority is below 1, the name is taken, or the
/// insert fails.
pub async fn create_category(
    db: &DatabaseConnection,
    actor: &Actor,
    name: String,
    description: Option<String>,
    is_active: Option<bool>,
    priority: Option<i32>,
) -> Result<category::Model> {
    actor.require_any(&[Role::Admin], "create categories")?;

    let name = normalize_category(&name);
    if name.is_empty() {
        return Err(Error::validation("Category name is required"));
    }
    let priority = validate_priority(priority.unwrap_or(1))?;

    if get_category_by_name(db, &name).await?.is_some() {
        return Err(Error::Conflict {
            message: "Category already exists".to_string(),
        });
    }

    let now = chrono::Utc::now();
    let category = category::ActiveModel {
        name: Set(name),
        description: Set(description.unwrap_or_default()),
        is_active: Set(is_active.unwrap_or(true)),
        priority: Set(priority),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let created = category.insert(db).await?;
    info!(category = %created.name, priority = created.priority, "Created category");
    Ok(created)
}

/// Applies `update` to a category. Admin only.
///
/// Renaming re-labels every component filed under the old name in the same transaction, so
/// components never point at a name that no longer exists.
pub async fn update_category(
    db: &DatabaseConnection,
    actor: &Actor,
    category_id: i64,
    update: CategoryUpdate,
) -> Result<category::Model> {
    actor.require_any(&[Role::Admin], "update categories")?;

    let txn = db.begin().await?;

    let existing = Category::find_by_id(category_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_id.to_string(),
        })?;
    let old_name = existing.name.clone();
    let mut category: category::ActiveModel = existing.into();

    let mut renamed_to = None;
    if let Some(name) = update.name.as_deref().map(normalize_category) {
        if !name.is_empty() && name != old_name {
            let taken = Category::find()
                .filter(category::Column::Name.eq(name.as_str()))
                .filter(category::Column::Id.ne(category_id))
                .one(&txn)
                .await?;
            if taken.is_some() {
                return Err(Error::Conflict {
                    message: "Category name already exists".to_string(),
                });
            }
            category.name = Set(name.clone());
            renamed_to = Some(name);
        }
    }
    if let Some(description) = update.description {
        category.description = Set(description);
    }
    if let Some(is_active) = update.is_active {
        category.is_active = Set(is_active);
    }
    if let Some(priority) = update.priority {
        category.priority = Set(validate_priority(priority)?);
    }
    category.updated_at = Set(chrono::Utc::now());

    let updated = category.update(&txn).await?;

    if let Some(new_name) = renamed_to {
        let relabeled = Component::update_many()
            .col_expr(component::Column::Category, Expr::value(new_name.clone()))
            .filter(component::Column::Category.eq(old_name.as_str()))
            .exec(&txn)
            .await?;
        info!(
            from = %old_name,
            to = %new_name,
            components = relabeled.rows_affected,
            "Renamed category"
        );
    }

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a category that no component refers to. Admin only.
///
/// # Errors
/// Returns [`Error::Conflict`] with the number of referencing components when the category
/// is still in use.
pub async fn delete_category(
    db: &DatabaseConnection,
    actor: &Actor,
    category_id: i64,
) -> Result<()> {
    actor.require_any(&[Role::Admin], "delete categories")?;

    let category = get_category_by_id(db, category_id)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: category_id.to_string(),
        })?;

    let in_use = crate::core::component::count_components_in_category(db, &category.name).await?;
    if in_use > 0 {
        warn!(category = %category.name, in_use, "Refusing to delete category in use");
        return Err(Error::Conflict {
            message: format!(
                "Cannot delete category. It is being used by {in_use} component(s). Please remove or reassign those components first."
            ),
        });
    }

    Category::delete_by_id(category_id).exec(db).await?;
    info!(category = %category.name, "Deleted category");
    Ok(())
}

fn validate_priority(priority: i32) -> Result<i32> {
    if !(1..=MAX_PRIORITY).contains(&priority) {
        return Err(Error::validation(format!(
            "Category priority must be between 1 and {MAX_PRIORITY}"
        )));
    }
    Ok(priority)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::component::{delete_component, get_component_by_id};
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_category_normalizes_and_rejects_duplicates() -> Result<()> {
        let (db, admin) = setup_with_admin().await?;

        let created =
            create_category(&db, &admin, "  gpu ".to_string(), None, None, Some(4)).await?;
        assert_eq!(created.name, "GPU");
        assert_eq!(created.priority, 4);
        assert!(created.is_active);
        assert_eq!(created.description, "");

        let dup = create_category(&db, &admin, "Gpu".to_string(), None, None, None).await;
        assert!(matches!(dup, Err(Error::Conflict { .. })));

        let blank = create_category(&db, &admin, "   ".to_string(), None, None, None).await;
        assert!(matches!(blank, Err(Error::Validation { .. })));

        let zero = create_category(&db, &admin, "RAM".to_string(), None, None, Some(0)).await;
        assert!(matches!(zero, Err(Error::Validation { .. })));

        let huge =
            create_category(&db, &admin, "RAM".to_string(), None, None, Some(i32::MAX)).await;
        assert!(matches!(huge, Err(Error::Validation { .. })));

        let capped = update_category(
            &db,
            &admin,
            created.id,
            CategoryUpdate {
                priority: Some(MAX_PRIORITY + 1),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(capped, Err(Error::Validation { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_non_admin_cannot_manage_categories() -> Result<()> {
        let db = setup_test_db().await?;
        let supplier = create_test_user(&db, "supplier", Role::Supplier).await?;

        let supplier = Actor::from(&supplier);
        let result = create_category(&db, &supplier, "CPU".to_string(), None, None, None).await;
        assert!(matches!(result, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_hides_inactive_by_default() -> Result<()> {
        let (db, admin) = setup_with_admin().await?;
        create_category(&db, &admin, "PSU".to_string(), None, Some(false), None).await?;
        create_category(&db, &admin, "CPU".to_string(), None, None, None).await?;
        create_category(&db, &admin, "CASE".to_string(), None, None, None).await?;

        let active = list_categories(&db, false).await?;
        let names: Vec<&str> = active.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["CASE", "CPU"]);

        let all = list_categories(&db, true).await?;
        assert_eq!(all.len(), 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_category_rename_relabels_components() -> Result<()> {
        let (db, admin) = setup_with_admin().await?;
        let case = create_test_category(&db, "CASE").await?;
        create_test_category(&db, "GPU").await?;
        let component = create_test_component(&db, "Tower", "CASE", 90.0).await?;

        let clash = update_category(
            &db,
            &admin,
            case.id,
            CategoryUpdate {
                name: Some("gpu".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(clash, Err(Error::Conflict { .. })));

        let updated = update_category(
            &db,
            &admin,
            case.id,
            CategoryUpdate {
                name: Some("chassis".to_string()),
                is_active: Some(false),
                priority: Some(2),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name, "CHASSIS");
        assert!(!updated.is_active);
        assert_eq!(updated.priority, 2);

        let relabeled = get_component_by_id(&db, component.id).await?.unwrap();
        assert_eq!(relabeled.category, "CHASSIS");
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_blocked_while_in_use() -> Result<()> {
        let (db, admin) = setup_with_admin().await?;
        let cpu = create_test_category(&db, "CPU").await?;
        let component = create_test_component(&db, "Ryzen", "CPU", 300.0).await?;

        let blocked = delete_category(&db, &admin, cpu.id).await.unwrap_err();
        assert!(matches!(blocked, Error::Conflict { .. }));
        assert!(blocked.to_string().contains("1 component(s)"));

        delete_component(&db, &admin, component.id).await?;
        delete_category(&db, &admin, cpu.id).await?;
        assert!(get_category_by_id(&db, cpu.id).await?.is_none());

        let missing = delete_category(&db, &admin, cpu.id).await;
        assert!(matches!(missing, Err(Error::CategoryNotFound { .. })));
        Ok(())
    }
}
