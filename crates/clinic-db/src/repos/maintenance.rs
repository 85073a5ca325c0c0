//! Robot maintenance repository.
//!
//! A maintenance order tracks one robot's stay in the workshop. Opening an
//! order can hold the robot (`operational_status = maintenance`); closing it
//! with [`ClinicService::close_maintenance_and_release`] hands the robot back
//! (`available`). Orders have no clinic column: visibility follows the
//! robot's clinic.

use clinic_core::audit_detail::StatusChangedDetail;
use clinic_core::entities::MaintenanceOrder;
use clinic_core::enums::{AuditAction, EntityType, MaintenanceKind, MaintenanceStatus};
use clinic_core::ids::PREFIX_MAINTENANCE;

use crate::error::DatabaseError;
use crate::helpers::{
    SetClause, SqlFilter, fmt_datetime, get_bool, get_opt_string, opt_text, parse_datetime, parse_enum,
    parse_optional_datetime, require_text, utc_now,
};
use crate::service::ClinicService;
use crate::updates::maintenance::MaintenanceUpdate;

/// `robots.operational_status` while an order holds the robot.
pub const ROBOT_IN_MAINTENANCE: &str = "maintenance";
/// `robots.operational_status` after release.
pub const ROBOT_AVAILABLE: &str = "available";

const SELECT_COLS: &str = "m.id, m.robot_id, m.kind, m.status, m.reported_defect, m.diagnosis, \
     m.solution, m.total_cost_cents, m.billed_to_client, m.opened_at, m.closed_at, m.updated_at";

/// Input for opening a maintenance order.
#[derive(Debug, Clone)]
pub struct NewMaintenanceOrder {
    pub robot_id: String,
    pub kind: MaintenanceKind,
    pub reported_defect: String,
    /// Mark the robot as in maintenance while the order is open.
    pub hold_robot: bool,
}

/// Which orders to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MaintenanceFilter {
    #[default]
    All,
    /// Every order not yet completed or cancelled.
    Active,
    Status(MaintenanceStatus),
}

fn row_to_order(row: &libsql::Row) -> Result<MaintenanceOrder, DatabaseError> {
    Ok(MaintenanceOrder {
        id: row.get(0)?,
        robot_id: row.get(1)?,
        kind: parse_enum(&row.get::<String>(2)?)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        reported_defect: row.get(4)?,
        diagnosis: get_opt_string(row, 5)?,
        solution: get_opt_string(row, 6)?,
        total_cost_cents: row.get(7)?,
        billed_to_client: get_bool(row, 8)?,
        opened_at: parse_datetime(&row.get::<String>(9)?)?,
        closed_at: parse_optional_datetime(get_opt_string(row, 10)?.as_deref())?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

impl ClinicService {
    /// Open an order for a robot, optionally holding the robot out of service.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for an empty defect description and
    /// `DatabaseError::NotFound` for robots outside the actor's clinic.
    pub async fn open_maintenance_order(
        &self,
        new: &NewMaintenanceOrder,
    ) -> Result<MaintenanceOrder, DatabaseError> {
        self.require_admin()?;
        let robot = self.get_robot(&new.robot_id).await?;
        let defect = require_text("reported defect", &new.reported_defect)?;

        let now = utc_now();
        let id = self.db().generate_id(PREFIX_MAINTENANCE).await?;

        let tx = self.db().conn().transaction().await?;
        self.db()
            .execute(
                "INSERT INTO robot_maintenance
                     (id, robot_id, kind, status, reported_defect, opened_at, updated_at)
                 VALUES (?1, ?2, ?3, 'open', ?4, ?5, ?5)",
                libsql::params![
                    id.as_str(),
                    robot.id.as_str(),
                    new.kind.as_str(),
                    defect,
                    fmt_datetime(&now)
                ],
            )
            .await?;
        if new.hold_robot {
            self.set_robot_operational_status(&robot.id, ROBOT_IN_MAINTENANCE)
                .await?;
        }
        self.record_audit_with(
            EntityType::MaintenanceOrder,
            &id,
            AuditAction::Created,
            &serde_json::json!({ "robot_id": robot.id, "hold_robot": new.hold_robot }),
        )
        .await?;
        tx.commit().await?;

        tracing::info!(order = %id, robot = %robot.id, kind = %new.kind, "maintenance order opened");
        Ok(MaintenanceOrder {
            id,
            robot_id: robot.id,
            kind: new.kind,
            status: MaintenanceStatus::Open,
            reported_defect: defect.to_string(),
            diagnosis: None,
            solution: None,
            total_cost_cents: 0,
            billed_to_client: false,
            opened_at: now,
            closed_at: None,
            updated_at: now,
        })
    }

    fn maintenance_filter(&self) -> Result<SqlFilter, DatabaseError> {
        self.scoped_filter("r.clinic_id")
    }

    async fn query_orders(&self, filter: SqlFilter, tail: &str) -> Result<Vec<MaintenanceOrder>, DatabaseError> {
        let sql = format!(
            "SELECT {SELECT_COLS} FROM robot_maintenance m
             JOIN robots r ON r.id = m.robot_id
             {} {tail}",
            filter.where_clause()
        );
        let mut rows = self
            .db()
            .query(&sql, libsql::params_from_iter(filter.into_params()))
            .await?;
        let mut orders = Vec::new();
        while let Some(row) = rows.next().await? {
            orders.push(row_to_order(&row)?);
        }
        Ok(orders)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for unknown orders or orders on
    /// another clinic's robot.
    pub async fn get_maintenance_order(&self, id: &str) -> Result<MaintenanceOrder, DatabaseError> {
        let mut filter = self.maintenance_filter()?;
        filter.push("m.id =", id);
        self.query_orders(filter, "")
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DatabaseError::not_found(EntityType::MaintenanceOrder, id))
    }

    /// Orders across the visible fleet, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_maintenance_orders(
        &self,
        which: MaintenanceFilter,
        limit: u32,
    ) -> Result<Vec<MaintenanceOrder>, DatabaseError> {
        let mut filter = self.maintenance_filter()?;
        match which {
            MaintenanceFilter::All => {}
            MaintenanceFilter::Active => {
                let open: Vec<String> = MaintenanceStatus::ACTIVE
                    .iter()
                    .map(|s| format!("'{}'", s.as_str()))
                    .collect();
                filter.push_raw(format!("m.status IN ({})", open.join(", ")));
            }
            MaintenanceFilter::Status(status) => filter.push("m.status =", status.as_str()),
        }
        self.query_orders(
            filter,
            &format!("ORDER BY m.opened_at DESC, m.rowid DESC LIMIT {limit}"),
        )
        .await
    }

    /// Every order of one robot, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` for robots outside the actor's clinic.
    pub async fn robot_maintenance_history(&self, robot_id: &str) -> Result<Vec<MaintenanceOrder>, DatabaseError> {
        self.get_robot(robot_id).await?;
        let mut filter = self.maintenance_filter()?;
        filter.push("m.robot_id =", robot_id);
        self.query_orders(filter, "ORDER BY m.opened_at DESC, m.rowid DESC")
            .await
    }

    /// Update the workshop fields of an order. Moving to `completed` or
    /// `cancelled` stamps `closed_at`; the robot's status is left alone.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a status change out of a
    /// closed order and `DatabaseError::Validation` for a negative cost.
    pub async fn update_maintenance_order(
        &self,
        id: &str,
        update: MaintenanceUpdate,
    ) -> Result<MaintenanceOrder, DatabaseError> {
        self.require_admin()?;
        let current = self.get_maintenance_order(id).await?;

        let now = utc_now();
        let mut sets = SetClause::new();
        if let Some(status) = update.status
            && status != current.status
        {
            if !current.status.can_transition_to(status) {
                return Err(DatabaseError::InvalidState(format!(
                    "maintenance order {id} is {} and cannot move to {status}",
                    current.status
                )));
            }
            sets.set("status", status.as_str());
            if status.is_closed() {
                sets.set("closed_at", fmt_datetime(&now));
            }
        }
        if let Some(ref diagnosis) = update.diagnosis {
            sets.set("diagnosis", opt_text(diagnosis.as_deref()));
        }
        if let Some(ref solution) = update.solution {
            sets.set("solution", opt_text(solution.as_deref()));
        }
        if let Some(cost) = update.total_cost_cents {
            if cost < 0 {
                return Err(DatabaseError::Validation(
                    "maintenance cost cannot be negative".into(),
                ));
            }
            sets.set("total_cost_cents", cost);
        }
        if let Some(billed) = update.billed_to_client {
            sets.set("billed_to_client", i64::from(billed));
        }

        if sets.is_empty() {
            return Ok(current);
        }
        sets.set("updated_at", fmt_datetime(&now));
        let (sql, params) = sets.into_update("robot_maintenance", id);
        self.db()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        self.record_audit_with(EntityType::MaintenanceOrder, id, AuditAction::Updated, &update)
            .await?;
        self.get_maintenance_order(id).await
    }

    /// Complete an order and mark its robot available again, in one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if the order is already closed.
    pub async fn close_maintenance_and_release(&self, id: &str) -> Result<MaintenanceOrder, DatabaseError> {
        self.require_admin()?;
        let current = self.get_maintenance_order(id).await?;
        if current.status.is_closed() {
            return Err(DatabaseError::InvalidState(format!(
                "maintenance order {id} is already {}",
                current.status
            )));
        }

        let now = utc_now();
        let tx = self.db().conn().transaction().await?;
        self.db()
            .execute(
                "UPDATE robot_maintenance SET status = 'completed', closed_at = ?1, updated_at = ?1
                 WHERE id = ?2",
                libsql::params![fmt_datetime(&now), id],
            )
            .await?;
        self.set_robot_operational_status(&current.robot_id, ROBOT_AVAILABLE)
            .await?;
        self.record_audit_with(
            EntityType::MaintenanceOrder,
            id,
            AuditAction::StatusChanged,
            &StatusChangedDetail {
                from: current.status.to_string(),
                to: MaintenanceStatus::Completed.to_string(),
                reason: Some("robot released".into()),
            },
        )
        .await?;
        tx.commit().await?;

        tracing::info!(order = %id, robot = %current.robot_id, "maintenance closed, robot released");
        Ok(MaintenanceOrder {
            status: MaintenanceStatus::Completed,
            closed_at: Some(now),
            updated_at: now,
            ..current
        })
    }

    async fn set_robot_operational_status(&self, robot_id: &str, status: &str) -> Result<(), DatabaseError> {
        self.db()
            .execute(
                "UPDATE robots SET operational_status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![status, fmt_datetime(&utc_now()), robot_id],
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::robot::NewRobot;
    use crate::test_support::helpers::{seed_therapist, test_service};
    use crate::updates::maintenance::MaintenanceUpdateBuilder;
    use pretty_assertions::assert_eq;

    async fn seed_robot(svc: &ClinicService, mac: &str) -> String {
        svc.register_robot(&NewRobot {
            mac_address: mac.into(),
            name: "Bolinha".into(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id
    }

    fn order(robot_id: &str, hold_robot: bool) -> NewMaintenanceOrder {
        NewMaintenanceOrder {
            robot_id: robot_id.into(),
            kind: MaintenanceKind::Corrective,
            reported_defect: "Servo do braço travando".into(),
            hold_robot,
        }
    }

    #[tokio::test]
    async fn open_holds_robot_and_close_releases_it() {
        let svc = test_service().await;
        let robot_id = seed_robot(&svc, "aa:bb:cc:dd:ee:10").await;

        let opened = svc.open_maintenance_order(&order(&robot_id, true)).await.unwrap();
        assert_eq!(opened.status, MaintenanceStatus::Open);
        assert_eq!(svc.get_maintenance_order(&opened.id).await.unwrap(), opened);
        assert_eq!(
            svc.get_robot(&robot_id).await.unwrap().operational_status.as_deref(),
            Some(ROBOT_IN_MAINTENANCE)
        );

        let closed = svc.close_maintenance_and_release(&opened.id).await.unwrap();
        assert_eq!(closed.status, MaintenanceStatus::Completed);
        assert!(closed.closed_at.is_some());
        assert_eq!(svc.get_maintenance_order(&opened.id).await.unwrap(), closed);
        assert_eq!(
            svc.get_robot(&robot_id).await.unwrap().operational_status.as_deref(),
            Some(ROBOT_AVAILABLE)
        );

        let again = svc.close_maintenance_and_release(&opened.id).await;
        assert!(matches!(again, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn open_without_hold_leaves_robot_status() {
        let svc = test_service().await;
        let robot_id = seed_robot(&svc, "aa:bb:cc:dd:ee:11").await;
        svc.open_maintenance_order(&order(&robot_id, false)).await.unwrap();
        assert_eq!(svc.get_robot(&robot_id).await.unwrap().operational_status, None);

        let blank = svc
            .open_maintenance_order(&NewMaintenanceOrder {
                reported_defect: "  ".into(),
                ..order(&robot_id, false)
            })
            .await;
        assert!(matches!(blank, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn update_tracks_workshop_progress() {
        let svc = test_service().await;
        let robot_id = seed_robot(&svc, "aa:bb:cc:dd:ee:12").await;
        let opened = svc.open_maintenance_order(&order(&robot_id, true)).await.unwrap();

        let waiting = svc
            .update_maintenance_order(
                &opened.id,
                MaintenanceUpdateBuilder::new()
                    .status(MaintenanceStatus::AwaitingPart)
                    .diagnosis(Some("Engrenagem gasta".into()))
                    .total_cost_cents(4_500)
                    .build(),
            )
            .await
            .unwrap();
        assert_eq!(waiting.status, MaintenanceStatus::AwaitingPart);
        assert_eq!(waiting.diagnosis.as_deref(), Some("Engrenagem gasta"));
        assert_eq!(waiting.total_cost_cents, 4_500);
        assert_eq!(waiting.closed_at, None);

        let negative = svc
            .update_maintenance_order(
                &opened.id,
                MaintenanceUpdateBuilder::new().total_cost_cents(-1).build(),
            )
            .await;
        assert!(matches!(negative, Err(DatabaseError::Validation(_))));

        let cancelled = svc
            .update_maintenance_order(
                &opened.id,
                MaintenanceUpdateBuilder::new()
                    .status(MaintenanceStatus::Cancelled)
                    .build(),
            )
            .await
            .unwrap();
        assert!(cancelled.closed_at.is_some());

        let reopen = svc
            .update_maintenance_order(
                &opened.id,
                MaintenanceUpdateBuilder::new().status(MaintenanceStatus::Open).build(),
            )
            .await;
        assert!(matches!(reopen, Err(DatabaseError::InvalidState(_))));
    }

    #[tokio::test]
    async fn list_filters_and_history() {
        let svc = test_service().await;
        let first = seed_robot(&svc, "aa:bb:cc:dd:ee:13").await;
        let second = seed_robot(&svc, "aa:bb:cc:dd:ee:14").await;

        let a = svc.open_maintenance_order(&order(&first, true)).await.unwrap();
        let b = svc.open_maintenance_order(&order(&first, false)).await.unwrap();
        svc.open_maintenance_order(&order(&second, false)).await.unwrap();
        svc.close_maintenance_and_release(&a.id).await.unwrap();

        let all = svc.list_maintenance_orders(MaintenanceFilter::All, 10).await.unwrap();
        assert_eq!(all.len(), 3);
        let active = svc
            .list_maintenance_orders(MaintenanceFilter::Active, 10)
            .await
            .unwrap();
        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|o| !o.status.is_closed()));
        let completed = svc
            .list_maintenance_orders(MaintenanceFilter::Status(MaintenanceStatus::Completed), 10)
            .await
            .unwrap();
        assert_eq!(completed.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(), [a.id.as_str()]);

        let history = svc.robot_maintenance_history(&first).await.unwrap();
        assert_eq!(
            history.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            [b.id.as_str(), a.id.as_str()]
        );
    }

    #[tokio::test]
    async fn therapists_cannot_open_orders() {
        let mut svc = test_service().await;
        let robot_id = seed_robot(&svc, "aa:bb:cc:dd:ee:15").await;
        let sam = seed_therapist(&svc, "Samuel Rocha").await;
        svc.act_as(&sam.id).await.unwrap();

        let result = svc.open_maintenance_order(&order(&robot_id, true)).await;
        assert!(matches!(result, Err(DatabaseError::Forbidden(_))));
    }
}
