//! Build business logic - submission, assembly lifecycle and role-scoped reads.
//!
//! A build is created from a list of component ids. The ids are resolved against the catalog,
//! checked for compatibility once, and copied into an immutable snapshot. From then on only the
//! assembly status and assembler assignment change:
//!
//! ```text
//! Pending -> Assembling -> Completed
//!               |
//!               +-> Pending
//! ```
//!
//! Status writes are plain read-modify-write; two actors updating the same build concurrently
//! resolve as last-write-wins.

use crate::{
    core::{
        access::Actor,
        compatibility::{CompatibilityVerdict, check_compatibility},
        component::get_in_stock_components,
        part::Part,
        user::get_user_by_id,
    },
    entities::{AssemblyStatus, Build, BuildComponent, BuildComponents, Role, build},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{info, instrument, warn};

/// Result of a successful submission: the stored build and the verdict frozen onto it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedBuild {
    /// The persisted build
    pub data: build::Model,
    /// Compatibility verdict computed at creation
    pub compatibility: CompatibilityVerdict,
}

/// Creates a build from catalog component ids. Only role `user` may submit builds.
///
/// All ids must resolve to distinct, in-stock components with at most one component per
/// category; otherwise nothing is written.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty list, duplicate ids, unknown or out-of-stock ids,
/// or two components in the same category.
#[instrument(skip(db))]
pub async fn create_build(
    db: &DatabaseConnection,
    actor: &Actor,
    component_ids: &[i64],
) -> Result<CreatedBuild> {
    actor.require_any(&[Role::User], "create builds")?;

    if component_ids.is_empty() {
        return Err(Error::validation("Please provide an array of component IDs"));
    }

    let txn = db.begin().await?;

    let found = get_in_stock_components(&txn, component_ids).await?;
    if found.len() != component_ids.len() {
        warn!(
            requested = component_ids.len(),
            resolved = found.len(),
            "Rejecting build with unresolved components"
        );
        return Err(Error::validation("One or more components not found or out of stock"));
    }

    // Keep the caller's order in the snapshot.
    let mut parts = Vec::with_capacity(component_ids.len());
    for id in component_ids {
        let model = found
            .iter()
            .find(|c| c.id == *id)
            .ok_or_else(|| {
                Error::validation("One or more components not found or out of stock")
            })?;
        parts.push(Part::from(model));
    }

    let mut seen = HashSet::new();
    if let Some(dup) = parts.iter().find(|p| !seen.insert(p.category.as_str())) {
        return Err(Error::validation(format!(
            "Only one component per category is allowed (duplicate {})",
            dup.category
        )));
    }

    let compatibility = check_compatibility(&parts);
    let snapshot = BuildComponents(
        parts
            .iter()
            .map(|p| BuildComponent {
                component_id: p.id,
                component_name: p.name.clone(),
                category: p.category.clone(),
                price: p.price,
            })
            .collect(),
    );

    let now = chrono::Utc::now();
    let build = build::ActiveModel {
        user_id: Set(actor.user_id),
        total_price: Set(snapshot.total_price()),
        components: Set(snapshot),
        assembly_status: Set(AssemblyStatus::Pending),
        assembler_id: Set(None),
        is_compatible: Set(compatibility.is_compatible),
        compatibility_check: Set(compatibility.clone()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let data = build.insert(&txn).await?;

    txn.commit().await?;

    info!(
        build_id = data.id,
        total_price = data.total_price,
        is_compatible = data.is_compatible,
        "Created build"
    );
    Ok(CreatedBuild {
        data,
        compatibility,
    })
}

/// Fetches a build the actor is allowed to see.
///
/// Users see their own builds, assemblers the builds assigned to them, admins everything.
pub async fn get_build(
    db: &DatabaseConnection,
    actor: &Actor,
    build_id: i64,
) -> Result<build::Model> {
    let build = find_build(db, build_id).await?;
    let visible = match actor.role {
        Role::Admin => true,
        Role::User => build.user_id == actor.user_id,
        Role::Assembler => build.assembler_id == Some(actor.user_id),
        Role::Supplier => false,
    };
    if !visible {
        return Err(Error::forbidden("You do not have access to this build"));
    }
    Ok(build)
}

/// Lists the builds visible to the actor, newest first, optionally filtered by status.
pub async fn list_builds(
    db: &DatabaseConnection,
    actor: &Actor,
    status: Option<AssemblyStatus>,
) -> Result<Vec<build::Model>> {
    let mut query = Build::find();
    match actor.role {
        Role::Admin => {}
        Role::User => query = query.filter(build::Column::UserId.eq(actor.user_id)),
        Role::Assembler => query = query.filter(build::Column::AssemblerId.eq(actor.user_id)),
        Role::Supplier => return Err(Error::forbidden("Suppliers cannot view builds")),
    }
    if let Some(status) = status {
        query = query.filter(build::Column::AssemblyStatus.eq(status));
    }
    query
        .order_by_desc(build::Column::CreatedAt)
        .order_by_desc(build::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Moves a build to `status`. Assembler or admin only.
///
/// An assembler may only touch builds assigned to them, except that starting an unassigned
/// build (moving it to `Assembling`) claims it. Admins may update any build and never become
/// its assembler by doing so.
///
/// # Errors
/// Returns [`Error::InvalidStatus`] for an unknown status name, [`Error::Forbidden`] for role or
/// ownership mismatches and [`Error::InvalidTransition`] when the lifecycle forbids the move.
#[instrument(skip(db))]
pub async fn update_build_status(
    db: &DatabaseConnection,
    actor: &Actor,
    build_id: i64,
    status: &str,
) -> Result<build::Model> {
    let next: AssemblyStatus = status.parse()?;
    actor.require_any(&[Role::Assembler, Role::Admin], "update build status")?;

    let existing = find_build(db, build_id).await?;
    let current = existing.assembly_status;

    let mut claim = false;
    if actor.role == Role::Assembler && existing.assembler_id != Some(actor.user_id) {
        if existing.assembler_id.is_none() && next == AssemblyStatus::Assembling {
            claim = true;
        } else {
            warn!(
                build_id,
                assembler = actor.user_id,
                "Assembler tried to update unassigned build"
            );
            return Err(Error::forbidden("You can only update assigned builds"));
        }
    }

    if !current.can_transition_to(next) {
        return Err(Error::InvalidTransition {
            from: current.to_string(),
            to: next.to_string(),
        });
    }

    let mut build: build::ActiveModel = existing.into();
    build.assembly_status = Set(next);
    if claim {
        build.assembler_id = Set(Some(actor.user_id));
    }
    build.updated_at = Set(chrono::Utc::now());
    let updated = build.update(db).await?;

    info!(
        build_id,
        from = %current,
        to = %next,
        claimed = claim,
        "Updated build status"
    );
    Ok(updated)
}

/// Assigns an assembler to a build. Admin only.
///
/// A pending build moves to `Assembling` as part of the assignment.
///
/// # Errors
/// Returns [`Error::UserNotFound`] if the assembler does not exist and [`Error::Validation`] if
/// the user is not an assembler.
#[instrument(skip(db))]
pub async fn assign_build(
    db: &DatabaseConnection,
    actor: &Actor,
    build_id: i64,
    assembler_id: i64,
) -> Result<build::Model> {
    actor.require_any(&[Role::Admin], "assign builds")?;

    let assembler = get_user_by_id(db, assembler_id)
        .await?
        .ok_or(Error::UserNotFound { id: assembler_id })?;
    if assembler.role != Role::Assembler {
        return Err(Error::validation("Invalid assembler ID"));
    }

    let existing = find_build(db, build_id).await?;
    let was_pending = existing.assembly_status == AssemblyStatus::Pending;

    let mut build: build::ActiveModel = existing.into();
    build.assembler_id = Set(Some(assembler_id));
    if was_pending {
        build.assembly_status = Set(AssemblyStatus::Assembling);
    }
    build.updated_at = Set(chrono::Utc::now());
    let updated = build.update(db).await?;

    info!(build_id, assembler_id, started = was_pending, "Assigned build");
    Ok(updated)
}

/// Deletes a build. Owner or admin only.
#[instrument(skip(db))]
pub async fn delete_build(db: &DatabaseConnection, actor: &Actor, build_id: i64) -> Result<()> {
    let build = find_build(db, build_id).await?;
    if !actor.is_admin() && build.user_id != actor.user_id {
        return Err(Error::forbidden("You can only delete your own builds"));
    }

    Build::delete_by_id(build_id).exec(db).await?;
    info!(build_id, "Deleted build");
    Ok(())
}

async fn find_build<C>(db: &C, build_id: i64) -> Result<build::Model>
where
    C: ConnectionTrait,
{
    Build::find_by_id(build_id)
        .one(db)
        .await?
        .ok_or(Error::BuildNotFound { id: build_id })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    struct Fixture {
        db: DatabaseConnection,
        admin: Actor,
        user: Actor,
        cpu: i64,
        board: i64,
        psu: i64,
    }

    async fn fixture() -> Result<Fixture> {
        let (db, admin) = setup_with_admin().await?;
        let user = create_test_user(&db, "builder", Role::User).await?;
        for name in ["CPU", "MOTHERBOARD", "PSU"] {
            create_test_category(&db, name).await?;
        }
        let cpu = create_test_component(&db, "Ryzen 7 7700X", "CPU", 399.99).await?;
        let board = create_test_component(&db, "B650 Board", "MOTHERBOARD", 189.99).await?;
        let psu = create_test_component(&db, "650W PSU", "PSU", 89.99).await?;
        Ok(Fixture {
            db,
            admin,
            user: Actor::from(&user),
            cpu: cpu.id,
            board: board.id,
            psu: psu.id,
        })
    }

    #[tokio::test]
    async fn test_create_build_snapshots_components() -> Result<()> {
        let f = fixture().await?;

        let created = create_build(&f.db, &f.user, &[f.psu, f.cpu, f.board]).await?;
        let build = &created.data;
        assert_eq!(build.user_id, f.user.user_id);
        assert_eq!(build.assembly_status, AssemblyStatus::Pending);
        assert_eq!(build.assembler_id, None);
        assert_eq!(build.components.0.len(), 3);
        assert_eq!(build.components.0[0].component_id, f.psu);
        assert_eq!(build.components.0[1].category, "CPU");
        assert!((build.total_price - (399.99 + 189.99 + 89.99)).abs() < 1e-9);
        assert_eq!(build.total_price, build.components.total_price());
        assert_eq!(build.compatibility_check, created.compatibility);
        assert_eq!(build.is_compatible, created.compatibility.is_compatible);
        Ok(())
    }

    #[tokio::test]
    async fn test_snapshot_survives_catalog_changes() -> Result<()> {
        let f = fixture().await?;
        let created = create_build(&f.db, &f.user, &[f.cpu]).await?;

        crate::core::component::delete_component(&f.db, &f.admin, f.cpu).await?;

        let stored = get_build(&f.db, &f.user, created.data.id).await?;
        assert_eq!(stored.components.0[0].component_name, "Ryzen 7 7700X");
        assert_eq!(stored.total_price, 399.99);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_build_is_all_or_nothing() -> Result<()> {
        let f = fixture().await?;
        create_test_category(&f.db, "GPU").await?;
        let gpu = create_test_component(&f.db, "RTX 4070", "GPU", 599.0).await?;
        set_stock(&f.db, gpu.id, false).await?;

        let result = create_build(&f.db, &f.user, &[f.cpu, f.board, f.psu, gpu.id]).await;
        assert!(matches!(result, Err(Error::Validation { .. })));

        let unknown = create_build(&f.db, &f.user, &[f.cpu, 999]).await;
        assert!(matches!(unknown, Err(Error::Validation { .. })));

        let duplicate = create_build(&f.db, &f.user, &[f.cpu, f.cpu]).await;
        assert!(matches!(duplicate, Err(Error::Validation { .. })));

        assert!(list_builds(&f.db, &f.admin, None).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_create_build_rejects_bad_requests() -> Result<()> {
        let f = fixture().await?;
        let second_cpu = create_test_component(&f.db, "Core i7", "CPU", 350.0).await?;

        let empty = create_build(&f.db, &f.user, &[]).await.unwrap_err();
        assert!(empty.to_string().contains("array of component IDs"));

        let same_category = create_build(&f.db, &f.user, &[f.cpu, second_cpu.id]).await;
        assert!(matches!(same_category, Err(Error::Validation { .. })));

        let by_admin = create_build(&f.db, &f.admin, &[f.cpu]).await;
        assert!(matches!(by_admin, Err(Error::Forbidden { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_incompatible_build_is_still_stored() -> Result<()> {
        let (db, _admin) = setup_with_admin().await?;
        let user = Actor::from(&create_test_user(&db, "builder", Role::User).await?);
        create_test_category(&db, "CPU").await?;
        create_test_category(&db, "MOTHERBOARD").await?;
        let cpu = create_structured_component(&db, "Ryzen", "CPU", 300.0, Some("AM5")).await?;
        let board =
            create_structured_component(&db, "Old board", "MOTHERBOARD", 100.0, Some("AM4")).await?;

        let created = create_build(&db, &user, &[cpu.id, board.id]).await?;
        assert!(!created.data.is_compatible);
        assert_eq!(created.compatibility.summary, "Compatibility issues found");
        assert!(created.compatibility.issues[0].contains("socket"));
        Ok(())
    }

    #[tokio::test]
    async fn test_lifecycle_claim_and_ownership() -> Result<()> {
        let f = fixture().await?;
        let a = Actor::from(&create_test_user(&f.db, "assembler-a", Role::Assembler).await?);
        let b = Actor::from(&create_test_user(&f.db, "assembler-b", Role::Assembler).await?);
        let build_id = create_build(&f.db, &f.user, &[f.cpu]).await?.data.id;

        let claimed = update_build_status(&f.db, &a, build_id, "Assembling").await?;
        assert_eq!(claimed.assembly_status, AssemblyStatus::Assembling);
        assert_eq!(claimed.assembler_id, Some(a.user_id));

        let stolen = update_build_status(&f.db, &b, build_id, "Completed").await;
        assert!(matches!(stolen, Err(Error::Forbidden { .. })));
        let reverted = update_build_status(&f.db, &b, build_id, "Pending").await;
        assert!(matches!(reverted, Err(Error::Forbidden { .. })));

        let back = update_build_status(&f.db, &a, build_id, "Pending").await?;
        assert_eq!(back.assembly_status, AssemblyStatus::Pending);
        assert_eq!(back.assembler_id, Some(a.user_id));

        update_build_status(&f.db, &a, build_id, "Assembling").await?;
        let done = update_build_status(&f.db, &a, build_id, "Completed").await?;
        assert_eq!(done.assembly_status, AssemblyStatus::Completed);

        let reopen = update_build_status(&f.db, &f.admin, build_id, "Pending").await;
        assert!(matches!(reopen, Err(Error::InvalidTransition { .. })));

        let again = update_build_status(&f.db, &a, build_id, "Completed").await?;
        assert_eq!(again.assembly_status, AssemblyStatus::Completed);
        Ok(())
    }

    #[tokio::test]
    async fn test_status_update_validation() -> Result<()> {
        let f = fixture().await?;
        let a = Actor::from(&create_test_user(&f.db, "assembler", Role::Assembler).await?);
        let build_id = create_build(&f.db, &f.user, &[f.cpu]).await?.data.id;

        let bad = update_build_status(&f.db, &f.admin, build_id, "shipped").await;
        assert!(matches!(bad, Err(Error::InvalidStatus { .. })));

        let by_owner = update_build_status(&f.db, &f.user, build_id, "Assembling").await;
        assert!(matches!(by_owner, Err(Error::Forbidden { .. })));

        let skip = update_build_status(&f.db, &f.admin, build_id, "Completed").await;
        assert!(matches!(skip, Err(Error::InvalidTransition { .. })));

        // Unassigned builds can only be claimed by starting them.
        let complete_unassigned = update_build_status(&f.db, &a, build_id, "Completed").await;
        assert!(matches!(complete_unassigned, Err(Error::Forbidden { .. })));

        let by_admin = update_build_status(&f.db, &f.admin, build_id, "Assembling").await?;
        assert_eq!(by_admin.assembler_id, None);

        let missing = update_build_status(&f.db, &f.admin, 999, "Pending").await;
        assert!(matches!(missing, Err(Error::BuildNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_assign_build() -> Result<()> {
        let f = fixture().await?;
        let assembler = create_test_user(&f.db, "assembler", Role::Assembler).await?;
        let supplier = create_test_user(&f.db, "supplier", Role::Supplier).await?;
        let build_id = create_build(&f.db, &f.user, &[f.cpu]).await?.data.id;

        let missing = assign_build(&f.db, &f.admin, build_id, 999).await;
        assert!(matches!(missing, Err(Error::UserNotFound { id: 999 })));

        let wrong_role = assign_build(&f.db, &f.admin, build_id, supplier.id).await;
        assert!(matches!(wrong_role, Err(Error::Validation { .. })));

        let not_admin = assign_build(&f.db, &f.user, build_id, assembler.id).await;
        assert!(matches!(not_admin, Err(Error::Forbidden { .. })));

        let assigned = assign_build(&f.db, &f.admin, build_id, assembler.id).await?;
        assert_eq!(assigned.assembler_id, Some(assembler.id));
        assert_eq!(assigned.assembly_status, AssemblyStatus::Assembling);

        let mine = list_builds(&f.db, &Actor::from(&assembler), None).await?;
        assert_eq!(mine.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_reads_are_role_scoped() -> Result<()> {
        let f = fixture().await?;
        let other = Actor::from(&create_test_user(&f.db, "other", Role::User).await?);
        let assembler = Actor::from(&create_test_user(&f.db, "assembler", Role::Assembler).await?);
        let supplier = Actor::from(&create_test_user(&f.db, "supplier", Role::Supplier).await?);

        let first = create_build(&f.db, &f.user, &[f.cpu]).await?.data;
        let second = create_build(&f.db, &f.user, &[f.board]).await?.data;
        create_build(&f.db, &other, &[f.psu]).await?;

        let own = list_builds(&f.db, &f.user, None).await?;
        let ids: Vec<i64> = own.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
        assert_eq!(list_builds(&f.db, &f.admin, None).await?.len(), 3);
        assert!(list_builds(&f.db, &assembler, None).await?.is_empty());
        assert!(matches!(
            list_builds(&f.db, &supplier, None).await,
            Err(Error::Forbidden { .. })
        ));

        assert!(get_build(&f.db, &f.user, first.id).await.is_ok());
        assert!(matches!(
            get_build(&f.db, &other, first.id).await,
            Err(Error::Forbidden { .. })
        ));
        assert!(matches!(
            get_build(&f.db, &assembler, first.id).await,
            Err(Error::Forbidden { .. })
        ));

        update_build_status(&f.db, &assembler, first.id, "Assembling").await?;
        assert!(get_build(&f.db, &assembler, first.id).await.is_ok());

        let assembling =
            list_builds(&f.db, &f.admin, Some(AssemblyStatus::Assembling)).await?;
        assert_eq!(assembling.len(), 1);
        assert_eq!(assembling[0].id, first.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_build_owner_or_admin() -> Result<()> {
        let f = fixture().await?;
        let other = Actor::from(&create_test_user(&f.db, "other", Role::User).await?);
        let first = create_build(&f.db, &f.user, &[f.cpu]).await?.data.id;
        let second = create_build(&f.db, &f.user, &[f.board]).await?.data.id;

        let denied = delete_build(&f.db, &other, first).await;
        assert!(matches!(denied, Err(Error::Forbidden { .. })));

        delete_build(&f.db, &f.user, first).await?;
        delete_build(&f.db, &f.admin, second).await?;
        assert!(list_builds(&f.db, &f.admin, None).await?.is_empty());

        let missing = delete_build(&f.db, &f.admin, first).await;
        assert!(matches!(missing, Err(Error::BuildNotFound { .. })));
        Ok(())
    }
}
